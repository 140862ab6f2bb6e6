use clap::{Arg, ArgAction, Command, ValueHint};
use std::path::PathBuf;

/// Command line definition of the `menarche` binary.
pub fn build_cli() -> Command {
    Command::new("menarche")
        .version(clap::crate_version!())
        .about("Age-of-menarche category classifier study: train, compare and serve models")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("study")
                .about("Preprocess a survey table, evaluate every configured model and save the run")
                .arg(
                    Arg::new("config")
                        .help(
                            "Path to the study JSON configuration file. \
                             Without it the default configuration is printed.",
                        )
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the survey table (*.csv or *.tsv). \
                             Overrides `data_path` in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output-dir")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Directory the metrics, artifacts and report are written to. \
                             Overrides `output_dir` in the configuration file.",
                        )
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(clap::value_parser!(u64))
                        .help("Seed of the train/test split.")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("model_type")
                        .long("model-type")
                        .help("Evaluate only this model type, with default hyper-parameters.")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("rank_by")
                        .long("rank-by")
                        .help("Metric used to rank models.")
                        .value_parser(["accuracy", "precision", "recall", "f1", "kappa"])
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("parallel")
                        .long("parallel")
                        .help("Evaluate models concurrently.")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("no_report")
                        .long("no-report")
                        .help("Disable HTML report generation.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Classify one survey record with the models of a saved run")
                .arg(
                    Arg::new("artifacts")
                        .help("Artifact directory written by `menarche study`")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("model")
                        .short('m')
                        .long("model")
                        .help("Name of the model to use. Defaults to the best ranked model of the run.")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .help("JSON file holding one record as an object of column -> value")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath)
                        .conflicts_with("set"),
                )
                .arg(
                    Arg::new("set")
                        .long("set")
                        .help("Record field as COLUMN=VALUE; repeat for every column")
                        .action(ArgAction::Append)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::Other),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
}
