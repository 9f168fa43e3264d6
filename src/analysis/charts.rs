//! SVG charts of the analysis battery.
//!
//! Every chart is drawn from figures the analysis already computes (group
//! summaries, monthly means, the cluster correlation matrix and the yearly
//! cluster split), so the printed report and the charts never disagree.

use crate::analysis::descriptive::{GroupSummary, summarize};
use crate::analysis::temporal::{
    ClusterSplit, CorrelationMatrix, cluster_correlation_matrix, monthly_means,
    yearly_means_by_cluster,
};
use crate::analysis::{AnalysisGroup, AnalysisGroups};
use crate::constants::{CLUSTER_LABEL, charts};
use crate::error::{Result, RidershipError};
use crate::models::Reading;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

const CHART_SIZE: (u32, u32) = (960, 640);
const HEATMAP_SIZE: (u32, u32) = (860, 760);
const FONT: &str = "sans-serif";

/// One colour per comparison group, in [`AnalysisGroup::ALL`] order
const GROUP_COLORS: [RGBColor; 3] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn group_color(index: usize) -> RGBColor {
    GROUP_COLORS[index % GROUP_COLORS.len()]
}

/// Label of a categorical axis tick; ticks between categories stay blank
fn category_label(labels: &[String], position: f64) -> String {
    let index = position.round();
    if (position - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

fn month_label(position: f64) -> String {
    let names: Vec<String> = MONTHS.iter().map(|m| m.to_string()).collect();
    category_label(&names, position - 1.0)
}

/// Value axis upper bound with some headroom
fn value_ceiling(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values.into_iter().fold(0.0, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

/// Diverging white-centred colour for a correlation coefficient
fn heat_color(value: Option<f64>) -> RGBColor {
    let Some(r) = value else {
        return RGBColor(0xdd, 0xdd, 0xdd);
    };
    let t = r.clamp(-1.0, 1.0).abs();
    let (red, green, blue) = if r >= 0.0 { (178.0, 24.0, 43.0) } else { (33.0, 102.0, 172.0) };
    let blend = |target: f64| (247.0 + (target - 247.0) * t).round() as u8;
    RGBColor(blend(red), blend(green), blend(blue))
}

fn draw_to(path: &Path, draw: impl FnOnce(&Path) -> DrawResult) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    draw(path).map_err(|e| RidershipError::Chart {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    debug!("Chart written to {}", path.display());
    Ok(())
}

/// Bar chart of the mean daily flow of each group
pub fn plot_group_means(path: &Path, groups: &[(String, f64)]) -> Result<()> {
    if groups.is_empty() {
        return Err(RidershipError::insufficient_data("group means chart", "no groups"));
    }

    draw_to(path, |path| {
        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let labels: Vec<String> = groups.iter().map(|(label, _)| label.clone()).collect();
        let ceiling = value_ceiling(groups.iter().map(|(_, mean)| *mean));

        let mut chart = ChartBuilder::on(&root)
            .caption("Mean daily flow by group", (FONT, 24))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(-0.5f64..(groups.len() as f64 - 0.5), 0f64..ceiling)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(groups.len())
            .x_label_formatter(&|x| category_label(&labels, *x))
            .y_desc("Mean daily flow (passengers)")
            .draw()?;

        chart.draw_series(groups.iter().enumerate().map(|(i, (_, mean))| {
            let x = i as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, *mean)], group_color(i).filled())
        }))?;

        chart.draw_series(groups.iter().enumerate().map(|(i, (_, mean))| {
            Text::new(format!("{:.0}", mean), (i as f64 - 0.12, *mean), (FONT, 14))
        }))?;

        root.present()?;
        Ok(())
    })
}

/// One line per group of mean flow by calendar month
pub fn plot_monthly_trends(path: &Path, series: &[(String, BTreeMap<u32, f64>)]) -> Result<()> {
    if series.iter().all(|(_, monthly)| monthly.is_empty()) {
        return Err(RidershipError::insufficient_data("monthly chart", "no monthly means"));
    }

    draw_to(path, |path| {
        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let ceiling = value_ceiling(series.iter().flat_map(|(_, m)| m.values().copied()));

        let mut chart = ChartBuilder::on(&root)
            .caption("Monthly mean flow", (FONT, 24))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(0.5f64..12.5f64, 0f64..ceiling)?;

        chart
            .configure_mesh()
            .x_labels(12)
            .x_label_formatter(&|x| month_label(*x))
            .x_desc("Month")
            .y_desc("Mean flow (passengers)")
            .draw()?;

        for (i, (label, monthly)) in series.iter().enumerate() {
            let color = group_color(i);
            let points: Vec<(f64, f64)> = monthly.iter().map(|(m, v)| (*m as f64, *v)).collect();

            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
                .label(label.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            chart.draw_series(points.into_iter().map(|p| Circle::new(p, 4, color.filled())))?;
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    })
}

/// Annotated heatmap of the cluster correlation matrix
pub fn plot_cluster_correlation(path: &Path, matrix: &CorrelationMatrix) -> Result<()> {
    if matrix.stations.is_empty() {
        return Err(RidershipError::insufficient_data(
            "correlation chart",
            "no cluster stations",
        ));
    }

    draw_to(path, |path| {
        let root = SVGBackend::new(path, HEATMAP_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let size = matrix.stations.len();
        let n = size as f64;

        let mut chart = ChartBuilder::on(&root)
            .caption("Cluster station correlation (Pearson)", (FONT, 24))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(140)
            .build_cartesian_2d(0f64..n, 0f64..n)?;

        // Cell centres sit at half-integer positions; row 0 is drawn on top
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(size * 2 + 1)
            .y_labels(size * 2 + 1)
            .x_label_formatter(&|x| category_label(&matrix.stations, *x - 0.5))
            .y_label_formatter(&|y| category_label(&matrix.stations, n - 0.5 - *y))
            .draw()?;

        let cells = matrix.values.iter().enumerate().flat_map(|(i, row)| {
            row.iter().enumerate().map(move |(j, value)| {
                let (x, y) = (j as f64, n - i as f64 - 1.0);
                (x, y, *value)
            })
        });

        chart.draw_series(cells.clone().map(|(x, y, value)| {
            Rectangle::new([(x, y), (x + 1.0, y + 1.0)], heat_color(value).filled())
        }))?;

        chart.draw_series(cells.map(|(x, y, value)| {
            let text = value.map(|r| format!("{:.2}", r)).unwrap_or_else(|| "-".to_string());
            Text::new(text, (x + 0.4, y + 0.5), (FONT, 16))
        }))?;

        root.present()?;
        Ok(())
    })
}

/// Box-and-whisker chart from each group's five-number summary
pub fn plot_group_boxplot(path: &Path, groups: &[(String, GroupSummary)]) -> Result<()> {
    if groups.is_empty() {
        return Err(RidershipError::insufficient_data("boxplot chart", "no groups"));
    }

    draw_to(path, |path| {
        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let labels: Vec<String> = groups.iter().map(|(label, _)| label.clone()).collect();
        let ceiling = value_ceiling(groups.iter().map(|(_, s)| s.max));

        let mut chart = ChartBuilder::on(&root)
            .caption("Daily flow distribution by group", (FONT, 24))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(-0.5f64..(groups.len() as f64 - 0.5), 0f64..ceiling)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(groups.len())
            .x_label_formatter(&|x| category_label(&labels, *x))
            .y_desc("Daily flow (passengers)")
            .draw()?;

        for (i, (_, summary)) in groups.iter().enumerate() {
            let x = i as f64;
            let color = group_color(i);

            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - 0.3, summary.q1), (x + 0.3, summary.q3)],
                color.mix(0.7).filled(),
            )))?;

            chart.draw_series([
                PathElement::new(
                    vec![(x - 0.3, summary.median), (x + 0.3, summary.median)],
                    BLACK.stroke_width(2),
                ),
                PathElement::new(vec![(x, summary.q3), (x, summary.max)], BLACK.stroke_width(1)),
                PathElement::new(vec![(x, summary.q1), (x, summary.min)], BLACK.stroke_width(1)),
                PathElement::new(
                    vec![(x - 0.15, summary.max), (x + 0.15, summary.max)],
                    BLACK.stroke_width(1),
                ),
                PathElement::new(
                    vec![(x - 0.15, summary.min), (x + 0.15, summary.min)],
                    BLACK.stroke_width(1),
                ),
            ])?;
        }

        root.present()?;
        Ok(())
    })
}

/// Yearly mean flow of cluster and non-cluster stations
pub fn plot_interannual(path: &Path, by_year: &BTreeMap<i32, ClusterSplit>) -> Result<()> {
    let (Some(first), Some(last)) = (by_year.keys().next(), by_year.keys().next_back()) else {
        return Err(RidershipError::insufficient_data("interannual chart", "no years"));
    };
    let (first, last) = (*first as f64, *last as f64);

    draw_to(path, |path| {
        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let ceiling = value_ceiling(
            by_year
                .values()
                .flat_map(|split| [split.cluster, split.non_cluster])
                .flatten(),
        );

        let mut chart = ChartBuilder::on(&root)
            .caption("Interannual mean flow: cluster vs network", (FONT, 24))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d((first - 0.5)..(last + 0.5), 0f64..ceiling)?;

        chart
            .configure_mesh()
            .x_labels(by_year.len() * 2 + 1)
            .x_label_formatter(&|x| {
                if (x - x.round()).abs() < 1e-6 {
                    format!("{:.0}", x)
                } else {
                    String::new()
                }
            })
            .x_desc("Year")
            .y_desc("Mean daily flow (passengers)")
            .draw()?;

        let lines: [(&str, fn(&ClusterSplit) -> Option<f64>, RGBColor); 2] = [
            (CLUSTER_LABEL, |s: &ClusterSplit| s.cluster, group_color(0)),
            ("Non-cluster", |s: &ClusterSplit| s.non_cluster, group_color(2)),
        ];

        for (label, select, color) in lines {
            let points: Vec<(f64, f64)> = by_year
                .iter()
                .filter_map(|(year, split)| select(split).map(|v| (*year as f64, v)))
                .collect();

            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
                .label(label)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            chart.draw_series(points.into_iter().map(|p| Circle::new(p, 4, color.filled())))?;
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    })
}

/// Render every chart into `output_dir`.
///
/// Group charts come from `readings`; the interannual chart comes from
/// `historical`. A chart without data is skipped with a warning.
pub fn render_charts(
    readings: &[Reading],
    historical: &[Reading],
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let groups = AnalysisGroups::from_readings(readings);
    let mut written = Vec::new();

    let mut keep = |name: &str, outcome: Result<()>| -> Result<()> {
        match outcome {
            Ok(()) => {
                written.push(output_dir.join(name));
                Ok(())
            }
            Err(RidershipError::InsufficientData { test, reason }) => {
                warn!("Skipping {}: {}", test, reason);
                Ok(())
            }
            Err(e) => Err(e),
        }
    };

    let summaries: Vec<(String, GroupSummary)> = AnalysisGroup::ALL
        .iter()
        .filter_map(|group| {
            summarize(&groups.flows(*group))
                .ok()
                .map(|summary| (group.label().to_string(), summary))
        })
        .collect();
    let means: Vec<(String, f64)> = summaries
        .iter()
        .map(|(label, summary)| (label.clone(), summary.mean))
        .collect();

    keep(
        charts::GROUP_MEANS,
        plot_group_means(&output_dir.join(charts::GROUP_MEANS), &means),
    )?;
    keep(
        charts::GROUP_BOXPLOT,
        plot_group_boxplot(&output_dir.join(charts::GROUP_BOXPLOT), &summaries),
    )?;

    let monthly: Vec<(String, BTreeMap<u32, f64>)> = AnalysisGroup::ALL
        .iter()
        .map(|group| {
            (
                group.label().to_string(),
                monthly_means(groups.get(*group).iter().copied()),
            )
        })
        .collect();
    keep(
        charts::MONTHLY_TRENDS,
        plot_monthly_trends(&output_dir.join(charts::MONTHLY_TRENDS), &monthly),
    )?;

    keep(
        charts::CLUSTER_CORRELATION,
        plot_cluster_correlation(
            &output_dir.join(charts::CLUSTER_CORRELATION),
            &cluster_correlation_matrix(readings),
        ),
    )?;

    keep(
        charts::INTERANNUAL,
        plot_interannual(
            &output_dir.join(charts::INTERANNUAL),
            &yearly_means_by_cluster(historical),
        ),
    )?;

    info!("{} charts written to {}", written.len(), output_dir.display());
    Ok(written)
}
