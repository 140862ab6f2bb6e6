use std::fs;
use std::path::Path;

use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;

use crate::error::{MenarcheError, Result};
use crate::report::plots::{plot_confusion_matrix, plot_metric_bars};
use crate::report::MetricsTable;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

const STYLE: &str = "
body { font-family: sans-serif; margin: 2em; color: #222; }
table.metrics { border-collapse: collapse; }
table.metrics th, table.metrics td { border: 1px solid #ccc; padding: 4px 10px; text-align: right; }
table.metrics td.name { text-align: left; }
.code-container {
    background-color: #f5f5f5;
    padding: 10px;
    border-radius: 5px;
    overflow-x: auto;
    font-family: monospace;
    white-space: pre-wrap;
}";

/// A titled block of HTML and plots.
pub struct ReportSection {
    title: String,
    content: Vec<Markup>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            content: Vec::new(),
        }
    }

    pub fn add_content(&mut self, content: Markup) {
        self.content.push(content);
    }

    pub fn add_plot(&mut self, plot: Plot) {
        let div_id = format!(
            "plot-{}-{}",
            self.title.to_lowercase().replace(' ', "-"),
            self.content.len()
        );
        self.content
            .push(PreEscaped(plot.to_inline_html(Some(div_id.as_str()))));
    }

    fn render(&self) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.content {
                    div { (block) }
                }
            }
        }
    }
}

/// Standalone HTML page assembled from sections.
pub struct Report {
    title: String,
    subtitle: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(title: &str, subtitle: &str) -> Self {
        Report {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> String {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_CDN) {}
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    h1 { (self.title) }
                    p { (self.subtitle) }
                    @for section in &self.sections {
                        (section.render())
                    }
                }
            }
        }
        .into_string()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render()).map_err(|e| MenarcheError::io(path, e))
    }
}

fn metrics_markup(table: &MetricsTable) -> Markup {
    html! {
        table class="metrics" {
            tr {
                th { "rank" } th { "model" } th { "accuracy" } th { "precision" }
                th { "recall" } th { "f1" } th { "kappa" }
            }
            @for (rank, row) in table.rows.iter().enumerate() {
                tr {
                    td { (rank + 1) }
                    td class="name" { (row.model) }
                    td { (format!("{:.4}", row.metrics.accuracy)) }
                    td { (format!("{:.4}", row.metrics.precision)) }
                    td { (format!("{:.4}", row.metrics.recall)) }
                    td { (format!("{:.4}", row.metrics.f1)) }
                    td { (format!("{:.4}", row.metrics.kappa)) }
                }
            }
        }
        @if !table.failures.is_empty() {
            h3 { "Failed models" }
            ul {
                @for failure in &table.failures {
                    li { (failure.model) ": " (failure.reason) }
                }
            }
        }
    }
}

fn json_markup(json: &str) -> Markup {
    html! {
        div class="code-container" {
            pre {
                code { (json) }
            }
        }
    }
}

/// Build the study report: ranked metrics, confusion matrices and the
/// configuration the run was started with.
pub fn build_study_report(table: &MetricsTable, config_json: &str) -> Report {
    let mut report = Report::new(
        "Menarche age-category classifier study",
        &format!(
            "Run {} created {} ({} training rows, {} test rows, seed {})",
            table.run.run_id,
            table.run.created_at,
            table.run.n_train,
            table.run.n_test,
            table.run.seed
        ),
    );

    /* Section 1: Overview */
    {
        let mut overview = ReportSection::new("Overview");
        overview.add_content(html! {
            p {
                "Models were fitted on the training partition and scored on the held-out test partition. "
                "The positive class is early onset (age 12 or younger). Rows are ranked by "
                (table.ranked_by.as_str()) "."
            }
        });
        overview.add_content(metrics_markup(table));
        if !table.rows.is_empty() {
            overview.add_plot(plot_metric_bars(table));
        }
        report.add_section(overview);
    }

    /* Section 2: Confusion matrices */
    {
        let mut confusion = ReportSection::new("Confusion matrices");
        for row in &table.rows {
            confusion.add_content(html! {
                pre { (row.confusion.classification_report()) }
            });
            confusion.add_plot(plot_confusion_matrix(&row.confusion, &row.model));
        }
        report.add_section(confusion);
    }

    /* Section 3: Configuration */
    {
        let mut config_section = ReportSection::new("Configuration");
        config_section.add_content(json_markup(config_json));
        report.add_section(config_section);
    }

    report
}

/// Render the study report and write it to `path`.
pub fn write_html_report<P: AsRef<Path>>(
    table: &MetricsTable,
    config_json: &str,
    path: P,
) -> Result<()> {
    build_study_report(table, config_json).save_to_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handling::{Partition, SplitConfig};
    use crate::metrics::BinaryMetrics;
    use crate::report::MetricsRecord;
    use crate::run_info::RunInfo;

    #[test]
    fn report_contains_models_and_escaped_config() {
        let (metrics, confusion) = BinaryMetrics::from_labels(&[1, 0], &[1, 1]).unwrap();
        let partition = Partition {
            train: vec![0, 1],
            test: vec![2, 3],
        };
        let table = MetricsTable::new(
            RunInfo::new(&SplitConfig::default(), &partition, None),
            vec![MetricsRecord {
                model: "gbdt_small".to_string(),
                kind: "gbdt".to_string(),
                metrics,
                confusion,
                fit_seconds: 0.1,
                predict_seconds: 0.0,
            }],
            Vec::new(),
        );

        let html = build_study_report(&table, "{\"note\": \"<b>\"}").render();
        assert!(html.contains("gbdt_small"));
        assert!(html.contains("Confusion matrices"));
        assert!(html.contains("&lt;b&gt;"));
    }
}
