use plotly::layout::{Axis, BarMode, Layout};
use plotly::{Bar, HeatMap, Plot};

use crate::metrics::{class_name, ConfusionMatrix};
use crate::preprocessing::{EARLY_LABEL, LATE_LABEL};
use crate::report::{MetricsTable, RankMetric};

/// Heatmap of a confusion matrix, true class on the y axis.
pub fn plot_confusion_matrix(cm: &ConfusionMatrix, title: &str) -> Plot {
    let classes = vec![
        class_name(LATE_LABEL).to_string(),
        class_name(EARLY_LABEL).to_string(),
    ];
    let z: Vec<Vec<usize>> = cm.as_rows().iter().map(|row| row.to_vec()).collect();

    let trace = HeatMap::new(classes.clone(), classes, z);

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Predicted"))
        .y_axis(Axis::new().title("True"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Grouped bars of every metric, one group per model, in table order.
pub fn plot_metric_bars(table: &MetricsTable) -> Plot {
    let models: Vec<String> = table.model_names();

    let mut plot = Plot::new();
    for metric in RankMetric::ALL {
        let values: Vec<f64> = table
            .rows
            .iter()
            .map(|row| metric.value(&row.metrics))
            .collect();
        plot.add_trace(Bar::new(models.clone(), values).name(metric.as_str()));
    }

    let layout = Layout::new()
        .title("Test-set metrics per model")
        .bar_mode(BarMode::Group)
        .x_axis(Axis::new().title("Model"))
        .y_axis(Axis::new().title("Score"));
    plot.set_layout(layout);
    plot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confusion_heatmap_renders() {
        let cm = ConfusionMatrix::from_labels(&[1, 0, 1], &[1, 0, 0]).unwrap();
        let html = plot_confusion_matrix(&cm, "baseline").to_inline_html(Some("cm"));
        assert!(html.contains("cm"));
    }
}
