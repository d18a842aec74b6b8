use crate::catalog::transform::{Charts, Feature, FeaturePoint};
use comfy_table::Table;

const BAR_WIDTH: f64 = 40.0;

#[derive(Debug, clap::Parser)]
pub struct ChartsArgs {
    /// Restrict the charts to a title search
    #[arg(long)]
    pub title: Option<String>,
    /// Feature shown in the selectable bar chart
    #[arg(long, value_enum, default_value_t = Feature::Acousticness)]
    pub feature: Feature,
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let width = (value / max).min(1.0) * BAR_WIDTH;
    "█".repeat(width.round() as usize)
}

fn max_value(points: &[FeaturePoint]) -> f64 {
    points.iter().map(|p| p.value).fold(0.0, f64::max)
}

/// Bar chart as a table. `scale` fixes the axis maximum, otherwise the
/// largest value is used.
fn bar_chart(points: &[FeaturePoint], value_header: &str, scale: Option<f64>) -> Table {
    let max = scale.unwrap_or_else(|| max_value(points));
    let mut table = Table::new();
    table.set_header(vec!["Song", value_header, ""]);
    for point in points.iter() {
        table.add_row(vec![
            point.label.chars().take(30).collect::<String>(),
            point.value.to_string(),
            bar(point.value, max),
        ]);
    }
    table
}

pub fn render_charts(charts: &Charts) -> Vec<(String, Table)> {
    let mut scatter = Table::new();
    scatter.set_header(vec!["Song Index", "Title", "Danceability", ""]);
    for point in charts.scatter.iter() {
        scatter.add_row(vec![
            point.index.to_string(),
            point.title.clone().unwrap_or_default(),
            point.danceability.to_string(),
            bar(point.danceability, 1.0),
        ]);
    }

    let max_count = charts.histogram.iter().map(|b| b.count).max().unwrap_or(0);
    let mut histogram = Table::new();
    histogram.set_header(vec!["Duration (s)", "Count", ""]);
    for bin in charts.histogram.iter() {
        histogram.add_row(vec![
            bin.label.clone(),
            bin.count.to_string(),
            bar(bin.count as f64, max_count as f64),
        ]);
    }

    vec![
        ("Scatter Plot: Danceability of Songs".to_string(), scatter),
        ("Histogram: Song Duration (seconds)".to_string(), histogram),
        (
            "Bar Chart: Acousticness of Songs".to_string(),
            bar_chart(&charts.acousticness, "Acousticness", Some(1.0)),
        ),
        (
            "Bar Chart: Tempo of Songs".to_string(),
            bar_chart(&charts.tempo, "Tempo (BPM)", None),
        ),
        (
            format!("Bar Chart: Select Feature ({})", charts.feature.key()),
            bar_chart(&charts.selected, charts.feature.label(), None),
        ),
    ]
}

pub fn print_charts(charts: &Charts) {
    for (title, table) in render_charts(charts) {
        println!("{}", title);
        println!("{}\n", table);
    }
}
