use std::path::{Path, PathBuf};

use clap::Args;
use ppg_analysis::{
    roster::Roster,
    sensitivity::{SensitivityReport, SensitivityRunner},
};

use crate::{
    command::{common::ConfigArg, rates},
    util::{self, Output, Report},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct SensitivityArg {
    /// Path to the roster CSV file
    pub roster: PathBuf,

    /// Write `scenarios.csv` and the leaders tables to this directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Write the full report as JSON to this path, or to stdout for `-`
    #[arg(long, value_name = "PATH|-")]
    pub json: Option<PathBuf>,

    #[clap(flatten)]
    pub config: ConfigArg,
}

pub(crate) fn run(arg: &SensitivityArg) -> anyhow::Result<()> {
    let config = arg.config.load()?;
    let (_, roster) = util::read_roster_file(&arg.roster)?;

    eprintln!("Running robustness battery...");
    let report = SensitivityRunner::new(&roster, &config).run();
    eprintln!("Evaluated {} scenarios", report.scenarios.len());
    let json_target = arg.json.as_deref().map(util::json_target);
    // Keep stdout clean when the JSON report goes there.
    if !matches!(json_target, Some(None)) {
        print_scenarios(&report);
    }

    if let Some(dir) = &arg.output_dir {
        save_report_tables(dir, &roster, &report)?;
    }
    if let Some(target) = json_target {
        Output::save_json(&Report::now(&report), target)?;
    }
    Ok(())
}

pub(crate) fn print_scenarios(report: &SensitivityReport) {
    println!("Robustness scenarios");
    println!(
        "  {:<36} {:>8} {:>8} {:>8} {:>9} {:>6}",
        "Scenario", "r", "p", "rho", "CI width", "N"
    );
    println!("  {}", "-".repeat(80));
    for row in report.rows() {
        println!(
            "  {:<36} {:>8} {:>8} {:>8} {:>9} {:>6}",
            row.scenario,
            util::fmt_opt(row.r, 3),
            util::fmt_opt(row.p, 4),
            util::fmt_opt(row.rho, 3),
            util::fmt_opt(row.ci_width, 4),
            row.remaining.map_or_else(|| "-".to_owned(), |n| n.to_string()),
        );
        if let Some(note) = &row.note {
            println!("  {:<36} {note}", "");
        }
    }
}

pub(crate) fn save_report_tables(
    dir: &Path,
    roster: &Roster,
    report: &SensitivityReport,
) -> anyhow::Result<()> {
    util::create_dir(dir)?;
    util::save_csv(&dir.join("scenarios.csv"), report.rows())?;
    rates::save_rate_table(
        &dir.join("leaders_baseline.csv"),
        roster,
        &report.baseline_leaders,
    )?;
    for table in &report.leave_out_leaders {
        rates::save_rate_table(
            &dir.join(format!("leaders_{}.csv", table.label)),
            roster,
            &table.leaders,
        )?;
    }
    Ok(())
}
