use std::path::{Path, PathBuf};

use clap::Args;
use ppg_analysis::{
    roster::{Roster, RosterTable},
    sanity::{self, ColumnMissingness, OutlierReport},
};

use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct SanityArg {
    /// Path to the roster CSV file
    pub roster: PathBuf,

    /// Write `missingness.csv` and `gpg_outliers.csv` to this directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

pub(crate) fn run(arg: &SanityArg) -> anyhow::Result<()> {
    let (table, roster) = util::read_roster_file(&arg.roster)?;
    let (missing, outliers) = check(&table, &roster);
    if let Some(dir) = &arg.output_dir {
        save(dir, &missing, outliers.as_ref())?;
    }
    Ok(())
}

/// Runs and prints both checks.
pub(crate) fn check(
    table: &RosterTable,
    roster: &Roster,
) -> (Vec<ColumnMissingness>, Option<OutlierReport>) {
    let missing = sanity::missingness(table);
    println!("Missing values ({} rows)", table.rows.len());
    for m in &missing {
        if m.present {
            println!("  {:<12} {:>6}", m.column.to_string(), m.missing);
        } else {
            println!("  {:<12} {:>6}", m.column.to_string(), "absent");
        }
    }
    println!();

    let outliers = sanity::goals_per_game_outliers(roster);
    match &outliers {
        Some(report) => {
            println!(
                "Goals per game: Q1 {:.3}, Q3 {:.3}, fences [{:.3}, {:.3}]",
                report.q1, report.q3, report.lower_bound, report.upper_bound
            );
            if report.outliers.is_empty() {
                println!("  no outliers");
            }
            for o in &report.outliers {
                println!("  {:<24} {:>8.3}", o.player, o.gpg);
            }
        }
        None => println!("Goals per game: no player with a positive game count"),
    }
    (missing, outliers)
}

pub(crate) fn save(
    dir: &Path,
    missing: &[ColumnMissingness],
    outliers: Option<&OutlierReport>,
) -> anyhow::Result<()> {
    util::create_dir(dir)?;
    util::save_csv(&dir.join("missingness.csv"), missing)?;
    util::save_csv(
        &dir.join("gpg_outliers.csv"),
        outliers.into_iter().flat_map(|report| &report.outliers),
    )?;
    Ok(())
}
