use clap::{Parser, Subcommand};

use self::{
    analyze::AnalyzeArg, estimate::EstimateArg, rates::RatesArg, sanity::SanityArg,
    sensitivity::SensitivityArg,
};

mod analyze;
mod common;
mod estimate;
mod rates;
mod sanity;
mod sensitivity;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Show debug logs (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Show per-player scoring rates
    Rates(#[clap(flatten)] RatesArg),
    /// Estimate bootstrap confidence intervals of points per game
    Estimate(#[clap(flatten)] EstimateArg),
    /// Run the robustness battery
    Sensitivity(#[clap(flatten)] SensitivityArg),
    /// Check the roster for missing values and outliers
    Sanity(#[clap(flatten)] SanityArg),
    /// Run every analysis and write all outputs to a directory
    Analyze(#[clap(flatten)] AnalyzeArg),
}

pub fn run(args: CommandArgs) -> anyhow::Result<()> {
    match args.mode {
        Mode::Rates(arg) => rates::run(&arg)?,
        Mode::Estimate(arg) => estimate::run(&arg)?,
        Mode::Sensitivity(arg) => sensitivity::run(&arg)?,
        Mode::Sanity(arg) => sanity::run(&arg)?,
        Mode::Analyze(arg) => analyze::run(&arg)?,
    }
    Ok(())
}
