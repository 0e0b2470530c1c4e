use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use ppg_analysis::interval::{self, IntervalTable};
use serde::Serialize;

use crate::{
    command::common::ConfigArg,
    util::{self, Output, Report},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct EstimateArg {
    /// Path to the roster CSV file
    pub roster: PathBuf,

    /// Write the interval table as CSV to this path
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write each player's resample means to `bootstrap_<player>.csv` in this directory
    #[arg(long)]
    pub distribution_dir: Option<PathBuf>,

    /// Write the interval table as JSON to this path, or to stdout for `-`
    #[arg(long, value_name = "PATH|-")]
    pub json: Option<PathBuf>,

    #[clap(flatten)]
    pub config: ConfigArg,
}

/// One row of `ppg_ci.csv`.
#[derive(Debug, Serialize)]
struct IntervalCsvRow<'a> {
    player: &'a str,
    mean_ppg: Option<f64>,
    ci_lower: Option<f64>,
    ci_upper: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ResampleRow {
    mean: f64,
}

pub(crate) fn run(arg: &EstimateArg) -> anyhow::Result<()> {
    let config = arg.config.load()?;
    let (_, roster) = util::read_roster_file(&arg.roster)?;

    eprintln!(
        "Bootstrapping {}% intervals ({} resamples, seed {})...",
        config.confidence_level, config.resample_count, config.seed
    );
    let table = interval::interval_table(&roster, &config)
        .context("Failed to estimate confidence intervals")?;
    let json_target = arg.json.as_deref().map(util::json_target);
    // Keep stdout clean when the JSON report goes there.
    if !matches!(json_target, Some(None)) {
        print_interval_table(&table);
    }

    if let Some(path) = &arg.output {
        save_interval_table(path, &table)?;
    }
    if let Some(dir) = &arg.distribution_dir {
        save_distributions(dir, &table)?;
    }
    if let Some(target) = json_target {
        Output::save_json(&Report::now(&table), target)?;
    }
    Ok(())
}

pub(crate) fn print_interval_table(table: &IntervalTable) {
    println!(
        "PPG {}% bootstrap intervals ({} resamples, seed {})",
        table.confidence_level, table.resample_count, table.seed
    );
    println!(
        "  {:<24} {:>6} {:>8} {:>8} {:>8} {:>8}",
        "Player", "Games", "PPG", "Mean", "Lower", "Upper"
    );
    println!("  {}", "-".repeat(67));
    for row in &table.rows {
        println!(
            "  {:<24} {:>6} {:>8} {:>8} {:>8} {:>8}",
            row.player,
            util::fmt_opt(row.games, 0),
            util::fmt_opt(row.ppg, 3),
            util::fmt_opt(row.mean, 3),
            util::fmt_opt(row.lower, 3),
            util::fmt_opt(row.upper, 3),
        );
        if let Some(error) = &row.error {
            println!("  {:<24} {error}", "");
        }
    }
}

pub(crate) fn save_interval_table(path: &Path, table: &IntervalTable) -> anyhow::Result<()> {
    util::save_csv(
        path,
        table.rows.iter().map(|row| IntervalCsvRow {
            player: &row.player,
            mean_ppg: util::round3(row.mean),
            ci_lower: util::round3(row.lower),
            ci_upper: util::round3(row.upper),
        }),
    )
}

pub(crate) fn save_distributions(dir: &Path, table: &IntervalTable) -> anyhow::Result<()> {
    util::create_dir(dir)?;
    for row in table.rows.iter().filter(|row| !row.resample_means.is_empty()) {
        let path = dir.join(format!("bootstrap_{}.csv", util::file_stem(&row.player)));
        util::save_csv(
            &path,
            row.resample_means.iter().map(|&mean| ResampleRow { mean }),
        )?;
    }
    Ok(())
}
