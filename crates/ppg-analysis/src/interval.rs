//! Bootstrap confidence intervals for players' points per game.
//!
//! A player's sample is their season PPG repeated once per game played, so
//! each game counts as a trial at a single steady rate. The resulting
//! interval reflects resampling of a constant and is therefore degenerate
//! (lower = upper = PPG) whenever the sample is built this way.
//!
//! # Examples
//!
//! ```
//! use ppg_analysis::{
//!     config::AnalysisConfig,
//!     interval,
//!     roster::{PlayerRecord, Roster},
//! };
//!
//! let roster = Roster::new(vec![
//!     PlayerRecord::new("A", 10.0, 5.0, Some(5.0)),
//!     PlayerRecord::new("B", 6.0, 2.0, Some(4.0)),
//! ])?;
//! let table = interval::interval_table(&roster, &AnalysisConfig::default())?;
//!
//! assert_eq!(table.rows[0].player, "A");
//! assert_eq!(table.rows[0].lower, Some(3.0));
//! assert_eq!(table.rows[0].upper, Some(3.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use ppg_stats::bootstrap::{self, BootstrapEstimate, BootstrapError, BootstrapSample};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    config::AnalysisConfig,
    metric::{self, Denominator},
    ranking::Ranking,
    roster::{PlayerRecord, Roster},
};

/// One player's interval.
#[derive(Debug, Clone, Serialize)]
pub struct IntervalRow {
    pub player: String,
    pub games: Option<f64>,
    /// Points per game; `None` when undefined.
    pub ppg: Option<f64>,
    pub mean: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    /// Why the estimate is missing although the PPG is defined.
    pub error: Option<String>,
    /// Every resample mean, for distribution exports.
    #[serde(skip)]
    pub resample_means: Vec<f64>,
}

/// Intervals for the featured players, with the settings that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct IntervalTable {
    pub confidence_level: f64,
    pub resample_count: usize,
    pub seed: u64,
    pub rows: Vec<IntervalRow>,
}

/// Builds the repeated-rate bootstrap sample for a player.
///
/// Returns `Ok(None)` when the player's PPG is undefined. The game count is
/// truncated to a whole number of trials.
///
/// # Errors
///
/// Fails with [`BootstrapError::SampleTooLarge`] when the game count exceeds
/// [`bootstrap::MAX_SAMPLE_LEN`].
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn player_sample(record: &PlayerRecord) -> Result<Option<BootstrapSample>, BootstrapError> {
    let Some(ppg) = metric::rate(record.points(), record.games) else {
        return Ok(None);
    };
    // Saturates on huge counts, which the length check then rejects.
    let trials = record.games.map(|games| games.trunc() as usize);
    BootstrapSample::repeated(ppg, trials).map(Some)
}

/// Bootstraps one player's PPG interval.
///
/// `Ok(None)` means the player's PPG is undefined.
pub fn estimate_player(
    record: &PlayerRecord,
    resample_count: usize,
    confidence_level: f64,
    seed: u64,
) -> Result<Option<BootstrapEstimate>, BootstrapError> {
    bootstrap::validate_params(resample_count, confidence_level)?;
    let Some(sample) = player_sample(record)? else {
        return Ok(None);
    };
    bootstrap::estimate(&sample, resample_count, confidence_level, seed).map(Some)
}

/// Selects the players to report intervals for.
///
/// When `names` is non-empty and every name is on the roster, those players
/// are returned in roster order. Otherwise the top `top_k` players by points
/// per game are returned.
#[must_use]
pub fn featured_players<'a>(
    roster: &'a Roster,
    names: &[String],
    top_k: usize,
) -> Vec<&'a PlayerRecord> {
    if !names.is_empty() && names.iter().all(|name| roster.get(name).is_some()) {
        return roster
            .players()
            .iter()
            .filter(|p| names.contains(&p.name))
            .collect();
    }
    if !names.is_empty() {
        debug!("featured players not all on roster, using top {top_k} by PPG");
    }

    let ranking = Ranking::from_metrics(&metric::derive_rates(roster, Denominator::Games));
    ranking
        .players()
        .iter()
        .take(top_k)
        .filter_map(|name| roster.get(name))
        .collect()
}

/// Computes the interval table for the featured players.
///
/// A player whose sample cannot be built keeps a row with no estimate and
/// the reason in `error`.
///
/// # Errors
///
/// Fails when the configured resample count or confidence level is invalid.
pub fn interval_table(
    roster: &Roster,
    config: &AnalysisConfig,
) -> Result<IntervalTable, BootstrapError> {
    bootstrap::validate_params(config.resample_count, config.confidence_level)?;

    let rows = featured_players(roster, &config.featured_players, config.featured_top_k)
        .into_iter()
        .map(|record| {
            let (estimate, error) = match estimate_player(
                record,
                config.resample_count,
                config.confidence_level,
                config.seed,
            ) {
                Ok(estimate) => (estimate, None),
                Err(e) => {
                    warn!(player = %record.name, "{e}");
                    (None, Some(e.to_string()))
                }
            };
            debug!(player = %record.name, defined = estimate.is_some(), "estimated PPG interval");
            IntervalRow {
                player: record.name.clone(),
                games: record.games,
                ppg: metric::rate(record.points(), record.games),
                mean: estimate.as_ref().map(|e| e.mean),
                lower: estimate.as_ref().map(|e| e.lower),
                upper: estimate.as_ref().map(|e| e.upper),
                error,
                resample_means: estimate.map(|e| e.resample_means).unwrap_or_default(),
            }
        })
        .collect();

    Ok(IntervalTable {
        confidence_level: config.confidence_level,
        resample_count: config.resample_count,
        seed: config.seed,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::new(vec![
            PlayerRecord::new("A", 10.0, 5.0, Some(5.0)),
            PlayerRecord::new("B", 6.0, 2.0, Some(4.0)),
            PlayerRecord::new("C", 20.0, 0.0, Some(0.0)),
            PlayerRecord::new("D", 9.0, 9.0, Some(4.5)),
        ])
        .unwrap()
    }

    #[test]
    fn sample_repeats_ppg_per_game() {
        let sample = player_sample(roster().get("A").unwrap()).unwrap().unwrap();
        assert_eq!(sample.as_slice(), &[3.0; 5]);
        // 4.5 games truncate to 4 trials
        let sample = player_sample(roster().get("D").unwrap()).unwrap().unwrap();
        assert_eq!(sample.len(), 4);
        assert!(player_sample(roster().get("C").unwrap()).unwrap().is_none());
    }

    #[test]
    fn end_to_end_interval_is_degenerate() {
        let estimate = estimate_player(roster().get("A").unwrap(), 10_000, 95.0, 42)
            .unwrap()
            .unwrap();
        assert_eq!(estimate.mean, 3.0);
        assert_eq!(estimate.lower, 3.0);
        assert_eq!(estimate.upper, 3.0);
        assert_eq!(estimate.resample_means.len(), 10_000);
    }

    #[test]
    fn undefined_ppg_has_no_estimate() {
        let estimate = estimate_player(roster().get("C").unwrap(), 100, 95.0, 42).unwrap();
        assert!(estimate.is_none());
    }

    #[test]
    fn invalid_parameters_fail_even_for_undefined_ppg() {
        let record = roster().get("C").unwrap().clone();
        assert!(estimate_player(&record, 0, 95.0, 42).is_err());
    }

    #[test]
    fn featured_players_by_name_or_top_k() {
        let roster = roster();
        let named = featured_players(&roster, &["B".to_owned(), "A".to_owned()], 2);
        let names = named.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["A", "B"]);

        let fallback = featured_players(&roster, &["A".to_owned(), "Nobody".to_owned()], 2);
        let names = fallback.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
        // D has 18 / 4.5 = 4.0 PPG
        assert_eq!(names, ["D", "A"]);
    }

    #[test]
    fn table_uses_config() {
        let config = AnalysisConfig {
            featured_top_k: 3,
            resample_count: 200,
            ..AnalysisConfig::default()
        };
        let table = interval_table(&roster(), &config).unwrap();
        assert_eq!(table.resample_count, 200);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[2].player, "B");
        assert_eq!(table.rows[2].ppg, Some(2.0));
        assert_eq!(table.rows[2].resample_means.len(), 200);
    }

    #[test]
    fn table_rejects_bad_confidence_level() {
        let config = AnalysisConfig {
            confidence_level: 100.0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            interval_table(&roster(), &config),
            Err(BootstrapError::InvalidConfidenceLevel { .. })
        ));
    }

    #[test]
    fn huge_game_count_is_an_error_not_a_crash() {
        let record = PlayerRecord::new("A", 10.0, 5.0, Some(1e19));
        assert!(matches!(
            player_sample(&record),
            Err(BootstrapError::SampleTooLarge { .. })
        ));
        assert!(estimate_player(&record, 100, 95.0, 42).is_err());
    }

    #[test]
    fn table_keeps_row_for_oversized_sample() {
        let roster = Roster::new(vec![
            PlayerRecord::new("A", 3e19, 0.0, Some(1e19)),
            PlayerRecord::new("B", 6.0, 2.0, Some(4.0)),
        ])
        .unwrap();
        let config = AnalysisConfig {
            resample_count: 200,
            ..AnalysisConfig::default()
        };
        let table = interval_table(&roster, &config).unwrap();
        assert_eq!(table.rows[0].player, "A");
        assert_eq!(table.rows[0].ppg, Some(3.0));
        assert_eq!(table.rows[0].lower, None);
        assert!(table.rows[0].error.as_deref().unwrap().contains("exceeds"));
        assert_eq!(table.rows[1].lower, Some(2.0));
        assert_eq!(table.rows[1].error, None);
    }
}
