//! Full pipeline: sanity checks, rates, intervals and the robustness battery.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use ppg_analysis::{
    interval::{self, IntervalTable},
    metric::Denominator,
    sanity::{ColumnMissingness, OutlierReport},
    sensitivity::{SensitivityReport, SensitivityRunner},
};
use serde::Serialize;

use crate::{
    command::{common::ConfigArg, estimate, rates, sanity, sensitivity},
    util::{self, Output, Report},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    /// Path to the roster CSV file
    pub roster: PathBuf,

    /// Directory for every output file
    #[arg(long, default_value = "out")]
    pub output_dir: PathBuf,

    /// Skip the per-player resample distribution files
    #[arg(long)]
    pub no_distributions: bool,

    #[clap(flatten)]
    pub config: ConfigArg,
}

#[derive(Debug, Serialize)]
struct AnalysisReport<'a> {
    missingness: &'a [ColumnMissingness],
    goals_per_game_outliers: Option<&'a OutlierReport>,
    intervals: &'a IntervalTable,
    sensitivity: &'a SensitivityReport,
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let config = arg.config.load()?;
    let (table, roster) = util::read_roster_file(&arg.roster)?;
    let dir = &arg.output_dir;
    util::create_dir(dir)?;

    let (missingness, outliers) = sanity::check(&table, &roster);
    sanity::save(dir, &missingness, outliers.as_ref())?;
    println!();

    let leaders = rates::eligible_leaders(&roster, Denominator::Games, config.min_games);
    rates::print_rate_table(&leaders, Denominator::Games);
    rates::save_rate_table(&dir.join("ppg.csv"), &roster, &leaders)?;
    println!();

    eprintln!("Bootstrapping intervals...");
    let intervals = interval::interval_table(&roster, &config)
        .context("Failed to estimate confidence intervals")?;
    estimate::print_interval_table(&intervals);
    estimate::save_interval_table(&dir.join("ppg_ci.csv"), &intervals)?;
    if !arg.no_distributions {
        estimate::save_distributions(dir, &intervals)?;
    }
    println!();

    eprintln!("Running robustness battery...");
    let report = SensitivityRunner::new(&roster, &config).run();
    sensitivity::print_scenarios(&report);
    sensitivity::save_report_tables(dir, &roster, &report)?;

    Output::save_json(
        &Report::now(AnalysisReport {
            missingness: &missingness,
            goals_per_game_outliers: outliers.as_ref(),
            intervals: &intervals,
            sensitivity: &report,
        }),
        Some(dir.join("report.json")),
    )?;
    Ok(())
}
