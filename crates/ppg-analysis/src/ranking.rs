//! Player rankings and rank comparison.

use std::collections::HashMap;

use ppg_stats::correlation;
use serde::Serialize;

use crate::metric::{self, RateMetric};

/// Player names ordered by descending rate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ranking {
    players: Vec<String>,
}

impl Ranking {
    /// Creates a ranking from names already in rank order.
    #[must_use]
    pub fn new(players: Vec<String>) -> Self {
        Self { players }
    }

    /// Ranks players with a defined metric by descending value.
    ///
    /// Ties keep their order in `metrics`; undefined metrics are left out.
    ///
    /// ```
    /// use ppg_analysis::{metric::RateMetric, ranking::Ranking};
    ///
    /// let metric = |player: &str, value| RateMetric {
    ///     player: player.to_owned(),
    ///     points: 0.0,
    ///     denominator: None,
    ///     value,
    /// };
    /// let ranking = Ranking::from_metrics(&[
    ///     metric("A", Some(1.0)),
    ///     metric("B", None),
    ///     metric("C", Some(2.0)),
    /// ]);
    /// assert_eq!(ranking.players(), ["C", "A"]);
    /// ```
    #[must_use]
    pub fn from_metrics(metrics: &[RateMetric]) -> Self {
        let players = metric::leaders(metrics.to_vec())
            .into_iter()
            .filter(|m| m.value.is_some())
            .map(|m| m.player)
            .collect();
        Self { players }
    }

    #[must_use]
    pub fn players(&self) -> &[String] {
        &self.players
    }

    /// The top-ranked player.
    #[must_use]
    pub fn leader(&self) -> Option<&str> {
        self.players.first().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn positions(&self) -> HashMap<&str, usize> {
        self.players
            .iter()
            .enumerate()
            .map(|(position, name)| (name.as_str(), position))
            .collect()
    }
}

/// Spearman's rho between two rankings over the players both contain.
///
/// Each player's 0-based position is its rank value. Players present in only
/// one ranking are ignored. Returns `None` when fewer than two players are
/// shared.
///
/// ```
/// use ppg_analysis::ranking::{self, Ranking};
///
/// let names = |names: &[&str]| Ranking::new(names.iter().map(|&n| n.to_owned()).collect());
/// let a = names(&["A", "B", "C"]);
///
/// assert_eq!(ranking::compare(&a, &a), Some(1.0));
/// assert_eq!(ranking::compare(&a, &names(&["C", "B", "A"])), Some(-1.0));
/// assert_eq!(ranking::compare(&a, &names(&["A", "X"])), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn compare(a: &Ranking, b: &Ranking) -> Option<f64> {
    let positions_b = b.positions();
    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .players
        .iter()
        .enumerate()
        .filter_map(|(position_a, name)| {
            positions_b
                .get(name.as_str())
                .map(|&position_b| (position_a as f64, position_b as f64))
        })
        .unzip();
    if xs.len() < 2 {
        return None;
    }
    correlation::spearman(&xs, &ys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(names: &[&str]) -> Ranking {
        Ranking::new(names.iter().map(|&n| n.to_owned()).collect())
    }

    #[test]
    fn identical_rankings() {
        let a = ranking(&["A", "B", "C", "D"]);
        assert_eq!(compare(&a, &a), Some(1.0));
    }

    #[test]
    fn reversed_rankings() {
        let a = ranking(&["A", "B"]);
        let b = ranking(&["B", "A"]);
        assert_eq!(compare(&a, &b), Some(-1.0));
    }

    #[test]
    fn only_shared_players_count() {
        // Overlap A, B, C in the same relative order despite extra players.
        let a = ranking(&["X", "A", "B", "Y", "C"]);
        let b = ranking(&["A", "Z", "B", "C"]);
        let rho = compare(&a, &b).unwrap();
        assert!((rho - 1.0).abs() < 1e-12);
    }

    #[test]
    fn partial_disagreement() {
        // Ranks (0,1,2,3) vs (0,2,1,3): d^2 sum = 2, rho = 1 - 6*2/(4*15) = 0.8
        let a = ranking(&["A", "B", "C", "D"]);
        let b = ranking(&["A", "C", "B", "D"]);
        let rho = compare(&a, &b).unwrap();
        assert!((rho - 0.8).abs() < 1e-12);
    }

    #[test]
    fn insufficient_overlap() {
        assert_eq!(compare(&ranking(&["A", "B"]), &ranking(&["B", "C"])), None);
        assert_eq!(compare(&ranking(&[]), &ranking(&[])), None);
    }

    #[test]
    fn leader_is_first() {
        assert_eq!(ranking(&["A", "B"]).leader(), Some("A"));
        assert_eq!(Ranking::default().leader(), None);
    }
}
