//! Analyze command implementation
//!
//! Loads a clean dataset and prints the comparison battery: group
//! summaries, hypothesis tests, cluster correlations, monthly trends and,
//! when a multi-year file is given, the interannual view. With `--charts`
//! the same figures are also drawn as SVG files.

use super::shared::format_optional;
use crate::analysis::charts::render_charts;
use crate::analysis::descriptive::summarize;
use crate::analysis::inferential::{
    TestResult, cohens_d, eta_squared, interpret_cohens_d, interpret_eta_squared, mann_whitney_u,
    one_way_anova, shapiro_wilk, welch_t_test,
};
use crate::analysis::temporal::{
    cluster_correlation_matrix, cluster_share_by_year, monthly_means, percentage_change,
    yearly_means, yearly_means_by_cluster,
};
use crate::analysis::{ANOVA_LINES, AnalysisGroup, AnalysisGroups, flows_for_lines};
use crate::cli::args::AnalyzeArgs;
use crate::error::RidershipError;
use crate::processor::writer::load_dataset;
use anyhow::{Context, Result};
use colored::*;
use tracing::{info, warn};

fn section(title: &str) {
    println!("\n{}", "=".repeat(50));
    println!("{}", title.bright_green().bold());
    println!("{}", "=".repeat(50));
}

fn print_test(name: &str, result: &std::result::Result<TestResult, RidershipError>) {
    println!("\n{}", name.bright_cyan());
    match result {
        Ok(r) => {
            let verdict = if r.is_significant() {
                "significant".bright_red().bold()
            } else {
                "not significant".bright_white()
            };
            println!(
                "  statistic {:.4} | p-value {:.6} | {}",
                r.statistic, r.p_value, verdict
            );
        }
        Err(e) => {
            warn!("{} skipped: {}", name, e);
            println!("  {}", e.to_string().bright_yellow());
        }
    }
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let readings = load_dataset(&args.dataset)
        .with_context(|| format!("Failed to load {}", args.dataset.display()))?;
    info!("Loaded {} readings for analysis", readings.len());

    let groups = AnalysisGroups::from_readings(&readings);

    section("Group comparison");
    for group in AnalysisGroup::ALL {
        let flows = groups.flows(group);
        println!("\n{}", group.label().bright_cyan().bold());
        match summarize(&flows) {
            Ok(s) => {
                println!("  Observations: {}", s.count);
                println!("  Daily mean: {:.0} passengers", s.mean);
                println!("  Std deviation: {}", format_optional(s.std_dev, 0));
                println!(
                    "  Min {:.0} | Q1 {:.0} | Median {:.0} | Q3 {:.0} | Max {:.0}",
                    s.min, s.q1, s.median, s.q3, s.max
                );
            }
            Err(e) => println!("  {}", e.to_string().bright_yellow()),
        }
    }

    section("Inferential tests");
    for group in AnalysisGroup::ALL {
        print_test(
            &format!("Shapiro-Wilk - {}", group),
            &shapiro_wilk(&groups.flows(group)),
        );
    }

    let cluster = groups.flows(AnalysisGroup::Cluster);
    let line_2 = groups.flows(AnalysisGroup::Line2WithoutCluster);
    let pair = format!(
        "{} vs {}",
        AnalysisGroup::Cluster,
        AnalysisGroup::Line2WithoutCluster
    );

    print_test(&format!("Welch t-test - {}", pair), &welch_t_test(&cluster, &line_2));
    print_test(&format!("Mann-Whitney U - {}", pair), &mann_whitney_u(&cluster, &line_2));

    println!("\n{}", format!("Cohen's d - {}", pair).bright_cyan());
    match cohens_d(&cluster, &line_2) {
        Ok(d) => println!("  d = {:.4} ({})", d, interpret_cohens_d(d)),
        Err(e) => println!("  {}", e.to_string().bright_yellow()),
    }

    let by_line = flows_for_lines(&readings, &ANOVA_LINES);
    let line_groups: Vec<&[f64]> = by_line.iter().map(|(_, flows)| flows.as_slice()).collect();
    let line_names: Vec<String> = by_line.iter().map(|(line, _)| line.to_string()).collect();
    print_test(
        &format!("ANOVA - {}", line_names.join(", ")),
        &one_way_anova(&line_groups),
    );

    println!("\n{}", "Eta squared - ANOVA".bright_cyan());
    match eta_squared(&line_groups) {
        Ok(eta) => println!("  eta^2 = {:.4} ({})", eta, interpret_eta_squared(eta)),
        Err(e) => println!("  {}", e.to_string().bright_yellow()),
    }

    section("Cluster correlation (Pearson)");
    let matrix = cluster_correlation_matrix(&readings);
    print!("{:>16}", "");
    for station in &matrix.stations {
        print!("{:>16}", station);
    }
    println!();
    for (station, row) in matrix.stations.iter().zip(&matrix.values) {
        print!("{:>16}", station);
        for value in row {
            print!("{:>16}", format_optional(*value, 4));
        }
        println!();
    }

    section("Monthly mean and change");
    for group in AnalysisGroup::ALL {
        let monthly = monthly_means(groups.get(group).iter().copied());
        println!("\n{}", group.label().bright_cyan().bold());
        for (month, change) in percentage_change(&monthly) {
            println!(
                "  {:>2}: {:>12.0} | {:>8}%",
                month,
                monthly[&month],
                format_optional(change, 2)
            );
        }
    }

    let loaded_historical = match &args.historical {
        Some(path) => Some(
            load_dataset(path).with_context(|| format!("Failed to load {}", path.display()))?,
        ),
        None => None,
    };
    let historical = loaded_historical.as_deref().unwrap_or(&readings);

    section("Interannual");
    let yearly = yearly_means(historical);
    let split = yearly_means_by_cluster(historical);
    let share = cluster_share_by_year(historical);
    println!(
        "  {:>6} {:>12} {:>14} {:>12} {:>10}",
        "Year", "Mean", "Non-cluster", "Cluster", "Share %"
    );
    for (year, mean) in &yearly {
        let split = split.get(year).copied().unwrap_or_default();
        println!(
            "  {:>6} {:>12.0} {:>14} {:>12} {:>10}",
            year,
            mean,
            format_optional(split.non_cluster, 0),
            format_optional(split.cluster, 0),
            format_optional(share.get(year).copied().flatten(), 2)
        );
    }

    if let Some(dir) = &args.charts_dir {
        let written = render_charts(&readings, historical, dir)
            .with_context(|| format!("Failed to render charts into {}", dir.display()))?;

        section("Charts");
        for path in &written {
            println!("  {}", path.display().to_string().bright_white());
        }
    }

    Ok(())
}
