use anyhow::Result;
use clap::ArgMatches;
use log::LevelFilter;
use std::path::PathBuf;

use menarche_cli::cli::build_cli;
use menarche_cli::predict::input::PredictRequest;
use menarche_cli::predict::run::run_prediction;
use menarche_cli::study::input::StudyConfig;
use menarche_cli::study::run::run_study;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("MENARCHE_LOG", "error,menarche=info"))
        .init();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("study", sub_m)) => handle_study(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_study(matches: &ArgMatches) -> Result<()> {
    let config_path = match matches.get_one::<PathBuf>("config") {
        Some(path) => path,
        None => {
            eprintln!(
                "[menarche::study] No config file provided; printing the default configuration template."
            );
            println!("{}", serde_json::to_string_pretty(&StudyConfig::default())?);
            return Ok(());
        }
    };
    log::info!("[menarche::study] Running study from config: {:?}", config_path);

    let config = StudyConfig::from_arguments(config_path, matches)?;

    match run_study(&config) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Study failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let request = PredictRequest::from_arguments(matches)?;

    match run_prediction(&request) {
        Ok(prediction) => {
            println!("{}", serde_json::to_string_pretty(&prediction)?);
            Ok(())
        }
        Err(e) => {
            log::error!("Prediction failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
