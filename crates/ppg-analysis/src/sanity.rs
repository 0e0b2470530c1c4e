//! Data sanity checks run before the analysis.
//!
//! Neither check changes the roster; they only report what a reader should
//! look at before trusting the rates.

use ppg_stats::percentiles;
use serde::Serialize;

use crate::{
    metric,
    roster::{Column, Roster, RosterTable},
};

/// Multiplier of the interquartile range for Tukey fences.
pub const TUKEY_FENCE: f64 = 1.5;

/// How many rows lack a value for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMissingness {
    pub column: Column,
    /// Whether the header carried this column at all.
    pub present: bool,
    pub missing: usize,
}

/// Counts missing values per known column.
///
/// An absent column counts every row as missing.
///
/// ```
/// use ppg_analysis::{roster::{Column, RosterTable}, sanity};
///
/// let csv = "Player,Goals,GP\nA,10,5\nB,6,\n";
/// let table = RosterTable::from_reader(csv.as_bytes())?;
/// let games = sanity::missingness(&table)
///     .into_iter()
///     .find(|m| m.column == Column::Games)
///     .unwrap();
/// assert_eq!(games.missing, 1);
/// # Ok::<(), ppg_analysis::roster::RosterError>(())
/// ```
#[must_use]
pub fn missingness(table: &RosterTable) -> Vec<ColumnMissingness> {
    Column::ALL
        .into_iter()
        .map(|column| ColumnMissingness {
            column,
            present: table.columns.contains(&column),
            missing: table.rows.iter().filter(|row| row.is_missing(column)).count(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalsPerGame {
    pub player: String,
    pub goals: f64,
    pub games: Option<f64>,
    pub gpg: f64,
}

/// Tukey fences over goals per game and the players outside them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Players strictly outside the fences, in roster order.
    pub outliers: Vec<GoalsPerGame>,
}

/// Flags players whose goals per game fall outside the Tukey fences.
///
/// Players without a positive game count are skipped. Returns `None` when no
/// player has a defined goals-per-game value.
#[must_use]
pub fn goals_per_game_outliers(roster: &Roster) -> Option<OutlierReport> {
    let values = roster
        .players()
        .iter()
        .filter_map(|p| {
            Some(GoalsPerGame {
                player: p.name.clone(),
                goals: p.goals,
                games: p.games,
                gpg: metric::rate(p.goals, p.games)?,
            })
        })
        .collect::<Vec<_>>();
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.iter().map(|v| v.gpg).collect::<Vec<_>>();
    sorted.sort_by(f64::total_cmp);
    let q1 = percentiles::compute_percentile(&sorted, 25.0);
    let q3 = percentiles::compute_percentile(&sorted, 75.0);
    let iqr = q3 - q1;
    let lower_bound = q1 - TUKEY_FENCE * iqr;
    let upper_bound = q3 + TUKEY_FENCE * iqr;

    let outliers = values
        .into_iter()
        .filter(|v| v.gpg < lower_bound || v.gpg > upper_bound)
        .collect();

    Some(OutlierReport {
        q1,
        q3,
        iqr,
        lower_bound,
        upper_bound,
        outliers,
    })
}
