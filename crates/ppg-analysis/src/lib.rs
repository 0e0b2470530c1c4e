//! Scoring-rate analysis for a team roster.
//!
//! This crate turns a season roster (goals, assists, games, and optionally
//! shots and possessions per player) into points-per-game estimates and
//! checks how robust the conclusions drawn from them are.
//!
//! # Overview
//!
//! ## Estimation Workflow
//!
//! 1. **Load Roster** ([`roster::RosterTable`]): Read a CSV with flexible headers
//! 2. **Validate** ([`roster::Roster`]): Check required columns and unique names
//! 3. **Derive Rates** ([`metric::derive_rates`]): Points per game or per possession
//! 4. **Estimate Intervals** ([`interval::interval_table`]): Bootstrap confidence
//!    intervals for the featured players
//!
//! ## Robustness Workflow
//!
//! 1. **Configure** ([`config::AnalysisConfig`]): Leave-out counts, sweep seeds and
//!    resample counts, correlated fields
//! 2. **Run Battery** ([`sensitivity::SensitivityRunner`]): Baseline correlation,
//!    leave-top-N-out, alternate normalization, interval sweep
//! 3. **Compare Rankings** ([`ranking::compare`]): Spearman's rho over shared players
//!
//! ## Sanity Checks
//!
//! - [`sanity::missingness`]: Missing values per column
//! - [`sanity::goals_per_game_outliers`]: Tukey outliers on goals per game
//!
//! # Missing Values
//!
//! A rate whose denominator is missing, zero or negative is `None`. Such
//! players stay in every output table but are never ranked or correlated.
//!
//! # Examples
//!
//! ```
//! use ppg_analysis::{
//!     config::AnalysisConfig,
//!     metric::{self, Denominator},
//!     roster::RosterTable,
//!     sensitivity::SensitivityRunner,
//! };
//!
//! let csv = "Player,Goals,Assists,Games\nA,10,5,5\nB,6,2,4\n";
//! let roster = RosterTable::from_reader(csv.as_bytes())?.to_roster()?;
//!
//! let leaders = metric::leaders(metric::derive_rates(&roster, Denominator::Games));
//! assert_eq!(leaders[0].player, "A");
//! assert_eq!(leaders[0].value, Some(3.0));
//!
//! let report = SensitivityRunner::new(&roster, &AnalysisConfig::default()).run();
//! assert_eq!(report.scenarios[0].label, "baseline");
//! # Ok::<(), ppg_analysis::roster::RosterError>(())
//! ```

pub mod config;
pub mod interval;
pub mod metric;
pub mod ranking;
pub mod roster;
pub mod sanity;
pub mod sensitivity;
