//! SVG bar charts for the report

use crate::aggregate::TargetCounts;
use crate::error::ReportError;
use crate::stability::Category;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;

type ChartResult = Result<(), Box<dyn Error>>;

const PASS_FAIL_SIZE: (u32, u32) = (1200, 600);
const STABILITY_SIZE: (u32, u32) = (1000, 600);

/// Stacked pass/fail bars, one per target, failed at the bottom
pub fn render_pass_fail(path: &Path, counts: &TargetCounts) -> Result<(), ReportError> {
    draw_pass_fail(path, counts).map_err(|e| render_error(path, e.as_ref()))?;
    tracing::info!("Rendered pass/fail chart for {} targets to {}", counts.len(), path.display());
    Ok(())
}

/// One bar per stability category
pub fn render_stability(path: &Path, by_category: &BTreeMap<Category, usize>) -> Result<(), ReportError> {
    draw_stability(path, by_category).map_err(|e| render_error(path, e.as_ref()))?;
    tracing::info!("Rendered stability chart to {}", path.display());
    Ok(())
}

fn render_error(path: &Path, err: &dyn Error) -> ReportError {
    ReportError::Render {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

fn draw_pass_fail(path: &Path, counts: &TargetCounts) -> ChartResult {
    let labels: Vec<&str> = counts.keys().map(|url| short_label(url)).collect();
    let y_max = counts.values().map(|c| c.total()).max().unwrap_or(0) + 1;

    let root = SVGBackend::new(path, PASS_FAIL_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Flaky Test Results", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d((0..labels.len()).into_segmented(), 0u64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Test URL")
        .y_desc("Test Count")
        .x_labels(labels.len())
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(i) => labels.get(*i).map(|s| s.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    let failed_bars = counts.values().enumerate().map(|(i, count)| {
        bar(i, 0, count.failed, RED.filled())
    });
    chart
        .draw_series(failed_bars)?
        .label("Failed")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], RED.filled()));

    let passed_bars = counts.values().enumerate().map(|(i, count)| {
        bar(i, count.failed, count.total(), GREEN.filled())
    });
    chart
        .draw_series(passed_bars)?
        .label("Passed")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], GREEN.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_stability(path: &Path, by_category: &BTreeMap<Category, usize>) -> ChartResult {
    let rows: Vec<(Category, u64)> = by_category
        .iter()
        .map(|(category, n)| (*category, *n as u64))
        .collect();
    let y_max = rows.iter().map(|(_, n)| *n).max().unwrap_or(0) + 1;

    let root = SVGBackend::new(path, STABILITY_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Test Stability Analysis", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..rows.len()).into_segmented(), 0u64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Test Category")
        .y_desc("Number of Tests")
        .x_labels(rows.len())
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(i) => rows.get(*i).map(|(c, _)| c.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(
        rows.iter()
            .enumerate()
            .map(|(i, (category, n))| bar(i, 0, *n, category_color(*category).filled())),
    )?;

    root.present()?;
    Ok(())
}

fn bar(index: usize, from: u64, to: u64, style: ShapeStyle) -> Rectangle<(SegmentValue<usize>, u64)> {
    let mut rect = Rectangle::new(
        [
            (SegmentValue::Exact(index), from),
            (SegmentValue::Exact(index + 1), to),
        ],
        style,
    );
    rect.set_margin(0, 0, 8, 8);
    rect
}

fn category_color(category: Category) -> RGBColor {
    match category {
        Category::Stable => GREEN,
        Category::Flaky => RGBColor(255, 165, 0),
        Category::Problematic => RED,
    }
}

/// Drop the scheme so axis labels stay short
fn short_label(url: &str) -> &str {
    url.split_once("://").map_or(url, |(_, rest)| rest)
}
