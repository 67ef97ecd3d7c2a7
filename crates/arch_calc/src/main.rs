use anyhow::Result;
use arch_calc::cli::{Cli, Commands};
use arch_calc::compare::CompareArgs;
use arch_calc::{compare, estimate, logging, presets};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init(cli.log_dir.as_deref());
    logging::install_panic_hook();

    tracing::debug!("arch_calc started");

    match cli.command {
        Some(Commands::Compare(args)) => compare::run(args)?,
        None => compare::run(CompareArgs {
            file: None,
            presets: Vec::new(),
            format: compare::TableFormat::Text,
            output: None,
        })?,
        Some(Commands::Estimate(args)) => estimate::run(args)?,
        Some(Commands::Presets) => presets::run(),
    }

    Ok(())
}
