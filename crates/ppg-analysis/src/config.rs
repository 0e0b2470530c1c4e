//! Analysis settings.
//!
//! Every field has a default, so a JSON config file only needs the keys it
//! overrides:
//!
//! ```json
//! {
//!   "confidence_level": 90.0,
//!   "sweep_seeds": [1, 2, 3]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::roster::Field;

pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 95.0;
pub const DEFAULT_RESAMPLE_COUNT: usize = 10_000;
/// Sweep resample count used when none are configured.
pub const DEFAULT_SWEEP_RESAMPLE_COUNT: usize = 5_000;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_LEAVE_OUT_COUNTS: [usize; 2] = [1, 2];
pub const DEFAULT_SWEEP_SEEDS: [u64; 3] = [11, 42, 20_250_929];
pub const DEFAULT_SWEEP_RESAMPLE_COUNTS: [usize; 2] = [2_000, 10_000];
pub const DEFAULT_FEATURED_TOP_K: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Confidence level in percent, strictly between 0 and 100.
    pub confidence_level: f64,
    /// Bootstrap resamples for per-player interval estimation.
    pub resample_count: usize,
    /// Seed for per-player interval estimation.
    pub seed: u64,
    /// How many top players each leave-out scenario removes.
    pub leave_out_counts: Vec<usize>,
    pub sweep_seeds: Vec<u64>,
    /// Empty means [`DEFAULT_SWEEP_RESAMPLE_COUNT`] alone.
    pub sweep_resample_counts: Vec<usize>,
    /// First field of the robustness correlation.
    pub correlation_x: Field,
    /// Second field of the robustness correlation.
    pub correlation_y: Field,
    /// Field whose top values the leave-out scenarios remove.
    /// Falls back to goals when unavailable.
    pub influence_field: Field,
    /// Players to estimate intervals for; when any is missing from the roster
    /// the top `featured_top_k` players by points per game are used instead.
    pub featured_players: Vec<String>,
    pub featured_top_k: usize,
    /// Players with fewer games are omitted from the per-player rate table.
    pub min_games: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            resample_count: DEFAULT_RESAMPLE_COUNT,
            seed: DEFAULT_SEED,
            leave_out_counts: DEFAULT_LEAVE_OUT_COUNTS.to_vec(),
            sweep_seeds: DEFAULT_SWEEP_SEEDS.to_vec(),
            sweep_resample_counts: DEFAULT_SWEEP_RESAMPLE_COUNTS.to_vec(),
            correlation_x: Field::Shots,
            correlation_y: Field::Goals,
            influence_field: Field::Shots,
            featured_players: vec![],
            featured_top_k: DEFAULT_FEATURED_TOP_K,
            min_games: 0.0,
        }
    }
}

impl AnalysisConfig {
    /// The sweep resample counts, falling back to
    /// [`DEFAULT_SWEEP_RESAMPLE_COUNT`] when the list is empty.
    #[must_use]
    pub fn effective_sweep_resample_counts(&self) -> &[usize] {
        if self.sweep_resample_counts.is_empty() {
            &[DEFAULT_SWEEP_RESAMPLE_COUNT]
        } else {
            &self.sweep_resample_counts
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"confidence_level": 90.0, "sweep_seeds": [1, 2]}"#).unwrap();
        assert_eq!(config.confidence_level, 90.0);
        assert_eq!(config.sweep_seeds, [1, 2]);
        assert_eq!(config.resample_count, DEFAULT_RESAMPLE_COUNT);
        assert_eq!(config.influence_field, Field::Shots);
    }

    #[test]
    fn field_names_are_snake_case() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"correlation_x": "possessions"}"#).unwrap();
        assert_eq!(config.correlation_x, Field::Possessions);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<AnalysisConfig>(r#"{"confidence": 90}"#).is_err());
    }

    #[test]
    fn empty_sweep_counts_fall_back_to_single_default() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"sweep_resample_counts": []}"#).unwrap();
        assert_eq!(
            config.effective_sweep_resample_counts(),
            [DEFAULT_SWEEP_RESAMPLE_COUNT]
        );
        assert_eq!(
            AnalysisConfig::default().effective_sweep_resample_counts(),
            DEFAULT_SWEEP_RESAMPLE_COUNTS
        );
    }
}
