use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::Instant;

use menarche_classifiers::artifacts::save_artifacts;
use menarche_classifiers::pipeline::run_study_from_path;
use menarche_classifiers::report::report::write_html_report;
use menarche_classifiers::report::MetricsTable;

use crate::study::input::StudyConfig;
use crate::util::write_bytes_to_file;

pub const METRICS_TSV: &str = "metrics.tsv";
pub const METRICS_JSON: &str = "metrics.json";
pub const CONFIG_SNAPSHOT: &str = "menarche_study_config.json";
pub const REPORT_HTML: &str = "menarche_study_report.html";

/// Run preprocessing and the model comparison, then write the ranked
/// metrics, artifacts, config snapshot and (optionally) the HTML report.
pub fn run_study(config: &StudyConfig) -> Result<MetricsTable> {
    let start_time = Instant::now();
    log::info!("Loading survey table: {}", config.data_path);

    let result = run_study_from_path(&config.data_path, &config.pipeline, &config.models)
        .with_context(|| format!("Study on {} failed", config.data_path))?;

    let mut table = result.table.clone();
    table.sort_by(config.rank_by, true);
    println!("{}", table);

    let output_dir = Path::new(&config.output_dir);
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    table.write_tsv(output_dir.join(METRICS_TSV))?;
    write_bytes_to_file(output_dir.join(METRICS_JSON), &serde_json::to_vec_pretty(&table)?)?;

    let manifest = save_artifacts(output_dir, &result, config.rank_by)
        .with_context(|| format!("Failed to save artifacts to {}", output_dir.display()))?;
    if let Some(best) = &manifest.best_model {
        log::info!("Best model by {}: {}", config.rank_by, best);
    }

    let config_json = serde_json::to_string_pretty(config)?;
    write_bytes_to_file(output_dir.join(CONFIG_SNAPSHOT), config_json.as_bytes())?;

    if config.report {
        let path = output_dir.join(REPORT_HTML);
        write_html_report(&table, &config_json, &path)?;
        log::info!("Report written to: {}", path.display());
    }

    log::info!(
        "Study {} completed in {:?}",
        table.run.run_id,
        start_time.elapsed()
    );
    Ok(table)
}
