//! Robustness battery: how much do the conclusions move under perturbation?
//!
//! [`SensitivityRunner::run`] evaluates a fixed battery of scenarios against
//! the baseline roster and returns them in this order:
//!
//! | Label                              | Perturbation                                   | Reports            |
//! |------------------------------------|------------------------------------------------|--------------------|
//! | `baseline`                         | none                                           | Pearson r, p       |
//! | `remove_top{N}`                    | drop the N players with the highest influence  | Pearson r, p       |
//! | `rank_stability`                   | points per possession instead of per game      | Spearman rho       |
//! | `ci_width/seed={s}/resamples={b}`  | bootstrap seed and resample count              | CI width of leader |
//!
//! The correlation is between two configured fields (shots and goals by
//! default). The influence field is shots, or goals when no shots are
//! recorded. The rate ranking falls back to games when no possessions are
//! recorded. The interval sweep targets the baseline PPG leader.
//!
//! Every scenario reads the baseline roster and nothing else, so scenarios
//! share no state. Sweep cells run on scoped threads, at most one per
//! available core at a time, each with its own generator, and are collected
//! back in battery order. When no sweep resample counts are configured the
//! sweep uses [`DEFAULT_SWEEP_RESAMPLE_COUNT`](crate::config::DEFAULT_SWEEP_RESAMPLE_COUNT).
//!
//! # Examples
//!
//! ```
//! use ppg_analysis::{
//!     config::AnalysisConfig,
//!     roster::{PlayerRecord, Roster},
//!     sensitivity::{ScenarioOutcome, SensitivityRunner},
//! };
//!
//! let roster = Roster::new(vec![
//!     PlayerRecord::new("A", 10.0, 5.0, Some(5.0)),
//!     PlayerRecord::new("B", 6.0, 2.0, Some(4.0)),
//! ])?;
//! let config = AnalysisConfig::default();
//! let report = SensitivityRunner::new(&roster, &config).run();
//!
//! assert_eq!(report.scenarios[0].label, "baseline");
//! // Removing A leaves a single player: the correlation is undefined.
//! let remove_top1 = &report.scenarios[1];
//! assert_eq!(remove_top1.label, "remove_top1");
//! assert!(matches!(
//!     remove_top1.outcome,
//!     ScenarioOutcome::Correlation { coefficient: None, remaining: 1, .. }
//! ));
//! # Ok::<(), ppg_analysis::roster::RosterError>(())
//! ```

use std::{collections::HashSet, num::NonZeroUsize, panic, thread};

use ppg_stats::correlation::{self, Correlation};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    config::AnalysisConfig,
    interval,
    metric::{self, Denominator, RateMetric},
    ranking::{self, Ranking},
    roster::{Field, PlayerRecord, Roster},
};

/// What a scenario measured.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    /// Pearson correlation between two fields over a (possibly reduced) roster.
    Correlation {
        x: Field,
        y: Field,
        /// Players removed before correlating, most influential first.
        removed: Vec<String>,
        /// Players left after removal.
        remaining: usize,
        coefficient: Option<f64>,
        p_value: Option<f64>,
    },
    /// Spearman correlation between the baseline ranking and a re-normalized one.
    RankCorrelation {
        denominator: Denominator,
        rho: Option<f64>,
    },
    /// Confidence interval width for one player under one seed/resample pair.
    IntervalWidth {
        player: Option<String>,
        seed: u64,
        resample_count: usize,
        width: Option<f64>,
        /// Why `width` is missing when the estimate failed.
        error: Option<String>,
    },
}

/// One scenario of the battery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub label: String,
    #[serde(flatten)]
    pub outcome: ScenarioOutcome,
}

/// Flat, tabular form of a [`ScenarioResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioRow {
    pub scenario: String,
    pub kind: &'static str,
    pub r: Option<f64>,
    pub p: Option<f64>,
    pub rho: Option<f64>,
    pub ci_width: Option<f64>,
    pub player: Option<String>,
    pub seed: Option<u64>,
    pub resamples: Option<usize>,
    pub remaining: Option<usize>,
    pub note: Option<String>,
}

impl From<&ScenarioResult> for ScenarioRow {
    fn from(result: &ScenarioResult) -> Self {
        let mut row = Self {
            scenario: result.label.clone(),
            kind: "",
            r: None,
            p: None,
            rho: None,
            ci_width: None,
            player: None,
            seed: None,
            resamples: None,
            remaining: None,
            note: None,
        };
        match &result.outcome {
            ScenarioOutcome::Correlation {
                x,
                y,
                removed,
                remaining,
                coefficient,
                p_value,
            } => {
                row.kind = "correlation";
                row.r = *coefficient;
                row.p = *p_value;
                row.remaining = Some(*remaining);
                let mut note = format!("{x} vs {y}");
                if !removed.is_empty() {
                    note.push_str("; removed ");
                    note.push_str(&removed.join(" / "));
                }
                row.note = Some(note);
            }
            ScenarioOutcome::RankCorrelation { denominator, rho } => {
                row.kind = "rank_correlation";
                row.rho = *rho;
                row.note = Some(format!("points per game vs points per {denominator}"));
            }
            ScenarioOutcome::IntervalWidth {
                player,
                seed,
                resample_count,
                width,
                error,
            } => {
                row.kind = "interval_width";
                row.ci_width = *width;
                row.player.clone_from(player);
                row.seed = Some(*seed);
                row.resamples = Some(*resample_count);
                row.note.clone_from(error);
            }
        }
        row
    }
}

/// Leaders table of one roster variant.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderTable {
    pub label: String,
    pub leaders: Vec<RateMetric>,
}

/// Everything the battery produced.
#[derive(Debug, Clone, Serialize)]
pub struct SensitivityReport {
    /// Every player by descending PPG, undefined rates last.
    pub baseline_leaders: Vec<RateMetric>,
    /// Leaders table of each leave-out remainder, in battery order.
    pub leave_out_leaders: Vec<LeaderTable>,
    /// Ranking under the (resolved) alternate denominator.
    pub rate_ranking: Ranking,
    pub scenarios: Vec<ScenarioResult>,
}

impl SensitivityReport {
    #[must_use]
    pub fn rows(&self) -> Vec<ScenarioRow> {
        self.scenarios.iter().map(ScenarioRow::from).collect()
    }
}

/// Pearson correlation between two fields, skipping players missing either.
///
/// `None` when a field is unavailable, fewer than two players have both
/// values, or either field has no variance.
#[must_use]
pub fn correlate(roster: &Roster, x: Field, y: Field) -> Option<Correlation> {
    if !roster.has_field(x) || !roster.has_field(y) {
        return None;
    }
    let (xs, ys): (Vec<f64>, Vec<f64>) = roster
        .players()
        .iter()
        .filter_map(|p| Some((p.value(x)?, p.value(y)?)))
        .unzip();
    correlation::pearson(&xs, &ys)
}

/// The field leave-out scenarios rank by: `preferred` if available, else goals.
#[must_use]
pub fn influence_field(roster: &Roster, preferred: Field) -> Field {
    if roster.has_field(preferred) {
        preferred
    } else {
        info!("{preferred} not available, ranking influence by goals");
        Field::Goals
    }
}

/// Names of the `n` players with the highest `field` value.
///
/// Missing values rank below every present value; ties keep roster order.
#[must_use]
pub fn top_players(roster: &Roster, field: Field, n: usize) -> Vec<String> {
    let mut players = roster.players().iter().collect::<Vec<_>>();
    players.sort_by(|a, b| match (a.value(field), b.value(field)) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    players.into_iter().take(n).map(|p| p.name.clone()).collect()
}

/// Drives the scenario battery over one baseline roster.
#[derive(Debug, Clone, Copy)]
pub struct SensitivityRunner<'a> {
    roster: &'a Roster,
    config: &'a AnalysisConfig,
}

impl<'a> SensitivityRunner<'a> {
    #[must_use]
    pub fn new(roster: &'a Roster, config: &'a AnalysisConfig) -> Self {
        Self { roster, config }
    }

    /// Runs every scenario and collects the results in battery order.
    #[must_use]
    pub fn run(&self) -> SensitivityReport {
        let baseline_metrics = metric::derive_rates(self.roster, Denominator::Games);
        let baseline_ranking = Ranking::from_metrics(&baseline_metrics);

        let mut scenarios = vec![self.baseline()];

        let influence = influence_field(self.roster, self.config.influence_field);
        let mut leave_out_leaders = Vec::with_capacity(self.config.leave_out_counts.len());
        for &n in &self.config.leave_out_counts {
            let (scenario, leaders) = self.leave_top_out(influence, n);
            scenarios.push(scenario);
            leave_out_leaders.push(leaders);
        }

        let (scenario, rate_ranking) = self.rank_stability(&baseline_ranking);
        scenarios.push(scenario);

        scenarios.extend(self.interval_sweep(baseline_ranking.leader()));

        SensitivityReport {
            baseline_leaders: metric::leaders(baseline_metrics),
            leave_out_leaders,
            rate_ranking,
            scenarios,
        }
    }

    fn correlation_outcome(&self, roster: &Roster, removed: Vec<String>) -> ScenarioOutcome {
        let (x, y) = (self.config.correlation_x, self.config.correlation_y);
        let corr = correlate(roster, x, y);
        ScenarioOutcome::Correlation {
            x,
            y,
            removed,
            remaining: roster.len(),
            coefficient: corr.map(|c| c.coefficient),
            p_value: corr.map(|c| c.p_value),
        }
    }

    fn baseline(&self) -> ScenarioResult {
        debug!(scenario = "baseline", "evaluating scenario");
        ScenarioResult {
            label: "baseline".to_owned(),
            outcome: self.correlation_outcome(self.roster, vec![]),
        }
    }

    fn leave_top_out(&self, influence: Field, n: usize) -> (ScenarioResult, LeaderTable) {
        let label = format!("remove_top{n}");
        debug!(scenario = %label, %influence, "evaluating scenario");

        let removed = top_players(self.roster, influence, n);
        let names = removed.iter().map(String::as_str).collect::<HashSet<_>>();
        let remainder = self.roster.without(&names);
        if remainder.len() < 2 {
            debug!(scenario = %label, remaining = remainder.len(), "too few players left to correlate");
        }

        let leaders = LeaderTable {
            label: label.clone(),
            leaders: metric::leaders(metric::derive_rates(&remainder, Denominator::Games)),
        };
        let outcome = self.correlation_outcome(&remainder, removed);
        (ScenarioResult { label, outcome }, leaders)
    }

    fn rank_stability(&self, baseline: &Ranking) -> (ScenarioResult, Ranking) {
        debug!(scenario = "rank_stability", "evaluating scenario");
        let denominator = Denominator::Possessions.resolve(self.roster);
        let rate_ranking = Ranking::from_metrics(&metric::derive_rates(self.roster, denominator));
        let rho = ranking::compare(baseline, &rate_ranking);
        let result = ScenarioResult {
            label: "rank_stability".to_owned(),
            outcome: ScenarioOutcome::RankCorrelation { denominator, rho },
        };
        (result, rate_ranking)
    }

    fn interval_sweep(&self, leader: Option<&str>) -> Vec<ScenarioResult> {
        let record = leader.and_then(|name| self.roster.get(name));
        if record.is_none() {
            warn!("no player with a defined PPG, interval sweep has no target");
        }
        let confidence_level = self.config.confidence_level;

        let cells = self
            .config
            .sweep_seeds
            .iter()
            .flat_map(|&seed| {
                self.config
                    .effective_sweep_resample_counts()
                    .iter()
                    .map(move |&resample_count| (seed, resample_count))
            })
            .collect::<Vec<_>>();

        let workers = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        cells
            .chunks(workers)
            .flat_map(|chunk| {
                thread::scope(|s| {
                    let handles = chunk
                        .iter()
                        .map(|&(seed, resample_count)| {
                            s.spawn(move || {
                                sweep_cell(record, seed, resample_count, confidence_level)
                            })
                        })
                        .collect::<Vec<_>>();
                    handles
                        .into_iter()
                        .map(|handle| {
                            handle
                                .join()
                                .unwrap_or_else(|payload| panic::resume_unwind(payload))
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect()
    }
}

fn sweep_cell(
    record: Option<&PlayerRecord>,
    seed: u64,
    resample_count: usize,
    confidence_level: f64,
) -> ScenarioResult {
    let label = format!("ci_width/seed={seed}/resamples={resample_count}");
    debug!(scenario = %label, "evaluating scenario");
    let (width, error) = match record
        .map(|r| interval::estimate_player(r, resample_count, confidence_level, seed))
    {
        Some(Ok(estimate)) => (estimate.map(|e| e.width()), None),
        Some(Err(e)) => {
            warn!(scenario = %label, "{e}");
            (None, Some(e.to_string()))
        }
        None => (None, None),
    };
    ScenarioResult {
        label,
        outcome: ScenarioOutcome::IntervalWidth {
            player: record.map(|r| r.name.clone()),
            seed,
            resample_count,
            width,
            error,
        },
    }
}
