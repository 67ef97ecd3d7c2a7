use crate::compare::CompareArgs;
use crate::estimate::EstimateArgs;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Architecture cost calculator", long_about = None)]
pub struct Cli {
    /// Also write a daily-rolling log file into this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate a single architecture
    Estimate(EstimateArgs),

    /// Compare several architectures side by side (Default: all presets)
    Compare(CompareArgs),

    /// List built-in presets
    Presets,
}
