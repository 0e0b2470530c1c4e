use std::path::PathBuf;

use clap::Args;
use ppg_analysis::{
    metric::{self, Denominator, RateMetric},
    roster::Roster,
};
use serde::Serialize;

use crate::{command::common::ConfigArg, util};

#[derive(Debug, Clone, Args)]
pub(crate) struct RatesArg {
    /// Path to the roster CSV file
    pub roster: PathBuf,

    /// Count to normalize points by
    #[arg(long, default_value = "games")]
    pub denominator: Denominator,

    /// Write the table as CSV to this path
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[clap(flatten)]
    pub config: ConfigArg,
}

/// One row of `ppg.csv`; `ppg` is always per game, whatever the table order.
#[derive(Debug, Serialize)]
pub(crate) struct RateRow<'a> {
    pub player: &'a str,
    pub games: Option<f64>,
    pub points: f64,
    pub ppg: Option<f64>,
}

pub(crate) fn run(arg: &RatesArg) -> anyhow::Result<()> {
    let config = arg.config.load()?;
    let (_, roster) = util::read_roster_file(&arg.roster)?;

    let denominator = arg.denominator.resolve(&roster);
    let leaders = eligible_leaders(&roster, denominator, config.min_games);
    print_rate_table(&leaders, denominator);

    if let Some(path) = &arg.output {
        save_rate_table(path, &roster, &leaders)?;
    }
    Ok(())
}

/// Leaders table without players below `min_games`.
///
/// Players with an unknown game count are kept unless a minimum is set.
pub(crate) fn eligible_leaders(
    roster: &Roster,
    denominator: Denominator,
    min_games: f64,
) -> Vec<RateMetric> {
    metric::leaders(metric::derive_rates(roster, denominator))
        .into_iter()
        .filter(|m| {
            let games = roster.get(&m.player).and_then(|p| p.games);
            min_games <= 0.0 || games.is_some_and(|g| g >= min_games)
        })
        .collect()
}

pub(crate) fn save_rate_table(
    path: &std::path::Path,
    roster: &Roster,
    leaders: &[RateMetric],
) -> anyhow::Result<()> {
    util::save_csv(
        path,
        leaders.iter().map(|m| RateRow {
            player: &m.player,
            games: roster.get(&m.player).and_then(|p| p.games),
            points: m.points,
            ppg: roster
                .get(&m.player)
                .and_then(|p| metric::rate(p.points(), p.games)),
        }),
    )
}

pub(crate) fn print_rate_table(leaders: &[RateMetric], denominator: Denominator) {
    let header = format!("Pts/{denominator}");
    println!(
        "  {:>4} {:<24} {:>10} {:>8} {:>12}",
        "#",
        "Player",
        denominator.to_string(),
        "Points",
        header
    );
    println!("  {}", "-".repeat(62));
    for (i, m) in leaders.iter().enumerate() {
        let rank = if m.value.is_some() {
            (i + 1).to_string()
        } else {
            "-".to_owned()
        };
        println!(
            "  {:>4} {:<24} {:>10} {:>8.0} {:>12}",
            rank,
            m.player,
            util::fmt_opt(m.denominator, 0),
            m.points,
            util::fmt_opt(m.value, 3),
        );
    }
}

#[cfg(test)]
mod tests {
    use ppg_analysis::roster::PlayerRecord;

    use super::*;

    #[test]
    fn min_games_filters_rate_table() {
        let roster = Roster::new(vec![
            PlayerRecord::new("A", 10.0, 5.0, Some(5.0)),
            PlayerRecord::new("B", 6.0, 2.0, Some(4.0)),
            PlayerRecord::new("C", 1.0, 0.0, None),
        ])
        .unwrap();
        let names = |min_games| {
            eligible_leaders(&roster, Denominator::Games, min_games)
                .into_iter()
                .map(|m| m.player)
                .collect::<Vec<_>>()
        };
        assert_eq!(names(0.0), ["A", "B", "C"]);
        assert_eq!(names(5.0), ["A"]);
    }
}
