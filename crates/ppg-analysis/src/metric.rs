//! Per-player rate metrics (points per game, points per possession).
//!
//! A rate is `points / denominator`. It is undefined (`None`) when the
//! denominator is missing, zero, negative or not finite; undefined rates are
//! kept in every output table but never ranked or correlated.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::roster::{Field, PlayerRecord, Roster};

/// Which count normalizes a player's points.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Denominator {
    #[default]
    #[display("games")]
    Games,
    #[display("possessions")]
    Possessions,
}

impl Denominator {
    #[must_use]
    pub fn field(self) -> Field {
        match self {
            Self::Games => Field::Games,
            Self::Possessions => Field::Possessions,
        }
    }

    /// Falls back to [`Denominator::Games`] when no player in `roster` has a
    /// possession count.
    #[must_use]
    pub fn resolve(self, roster: &Roster) -> Self {
        match self {
            Self::Possessions if !roster.has_field(Field::Possessions) => {
                info!("no possession counts available, normalizing by games instead");
                Self::Games
            }
            other => other,
        }
    }
}

/// A player's rate under one denominator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateMetric {
    pub player: String,
    /// Goals plus assists.
    pub points: f64,
    /// The raw denominator value, if any.
    pub denominator: Option<f64>,
    /// `points / denominator`, or `None` when undefined.
    pub value: Option<f64>,
}

impl RateMetric {
    #[must_use]
    pub fn from_record(record: &PlayerRecord, denominator: Denominator) -> Self {
        let points = record.points();
        let count = record.value(denominator.field());
        Self {
            player: record.name.clone(),
            points,
            denominator: count,
            value: rate(points, count),
        }
    }
}

/// Divides `numerator` by `denominator` when the denominator is a positive
/// finite number.
///
/// ```
/// use ppg_analysis::metric::rate;
///
/// assert_eq!(rate(15.0, Some(5.0)), Some(3.0));
/// assert_eq!(rate(15.0, Some(0.0)), None);
/// assert_eq!(rate(15.0, None), None);
/// ```
#[must_use]
pub fn rate(numerator: f64, denominator: Option<f64>) -> Option<f64> {
    denominator
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| numerator / d)
        .filter(|v| v.is_finite())
}

/// Computes a rate for every player, in roster order.
///
/// The denominator is used as given; call [`Denominator::resolve`] first to
/// apply the possession fallback.
#[must_use]
pub fn derive_rates(roster: &Roster, denominator: Denominator) -> Vec<RateMetric> {
    roster
        .players()
        .iter()
        .map(|record| RateMetric::from_record(record, denominator))
        .collect()
}

/// Sorts metrics by descending value, undefined values last.
///
/// The sort is stable, so ties keep roster order.
#[must_use]
pub fn leaders(mut metrics: Vec<RateMetric>) -> Vec<RateMetric> {
    metrics.sort_by(|a, b| match (a.value, b.value) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    metrics
}
