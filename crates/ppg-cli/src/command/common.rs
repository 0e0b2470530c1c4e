use std::path::PathBuf;

use clap::Args;
use ppg_analysis::{config::AnalysisConfig, roster::Field};

use crate::util;

/// Analysis settings: an optional JSON file, then individual overrides.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct ConfigArg {
    /// JSON file with analysis settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Confidence level in percent
    #[arg(long)]
    pub confidence_level: Option<f64>,

    /// Bootstrap resamples for interval estimation
    #[arg(long)]
    pub resamples: Option<usize>,

    /// Seed for interval estimation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Players to estimate intervals for (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub players: Option<Vec<String>>,

    /// Number of top players to estimate when --players does not match
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Leave-top-N-out counts (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub leave_out: Option<Vec<usize>>,

    /// Seeds of the interval width sweep (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub sweep_seeds: Option<Vec<u64>>,

    /// Resample counts of the interval width sweep (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub sweep_resamples: Option<Vec<usize>>,

    /// First field of the robustness correlation
    #[arg(long)]
    pub correlate_x: Option<Field>,

    /// Second field of the robustness correlation
    #[arg(long)]
    pub correlate_y: Option<Field>,

    /// Field whose top players are left out
    #[arg(long)]
    pub influence: Option<Field>,

    /// Hide players with fewer games from the rate table
    #[arg(long)]
    pub min_games: Option<f64>,
}

impl ConfigArg {
    pub fn load(&self) -> anyhow::Result<AnalysisConfig> {
        let config = match &self.config {
            Some(path) => util::read_json_file("config", path)?,
            None => AnalysisConfig::default(),
        };
        Ok(self.apply(config))
    }

    fn apply(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        let Self {
            config: _,
            confidence_level,
            resamples,
            seed,
            players,
            top_k,
            leave_out,
            sweep_seeds,
            sweep_resamples,
            correlate_x,
            correlate_y,
            influence,
            min_games,
        } = self.clone();

        if let Some(v) = confidence_level {
            config.confidence_level = v;
        }
        if let Some(v) = resamples {
            config.resample_count = v;
        }
        if let Some(v) = seed {
            config.seed = v;
        }
        if let Some(v) = players {
            config.featured_players = v;
        }
        if let Some(v) = top_k {
            config.featured_top_k = v;
        }
        if let Some(v) = leave_out {
            config.leave_out_counts = v;
        }
        if let Some(v) = sweep_seeds {
            config.sweep_seeds = v;
        }
        if let Some(v) = sweep_resamples {
            config.sweep_resample_counts = v;
        }
        if let Some(v) = correlate_x {
            config.correlation_x = v;
        }
        if let Some(v) = correlate_y {
            config.correlation_y = v;
        }
        if let Some(v) = influence {
            config.influence_field = v;
        }
        if let Some(v) = min_games {
            config.min_games = v;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use ppg_analysis::config::DEFAULT_RESAMPLE_COUNT;

    use super::*;

    #[test]
    fn flags_override_config() {
        let base = AnalysisConfig {
            confidence_level: 90.0,
            seed: 1,
            ..AnalysisConfig::default()
        };
        let arg = ConfigArg {
            seed: Some(7),
            sweep_seeds: Some(vec![1, 2]),
            influence: Some(Field::Goals),
            ..ConfigArg::default()
        };
        let config = arg.apply(base);
        assert_eq!(config.confidence_level, 90.0);
        assert_eq!(config.seed, 7);
        assert_eq!(config.sweep_seeds, [1, 2]);
        assert_eq!(config.influence_field, Field::Goals);
        assert_eq!(config.resample_count, DEFAULT_RESAMPLE_COUNT);
    }
}
