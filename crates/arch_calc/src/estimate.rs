use crate::config::{ArchitectureArgs, ArchitectureFile};
use anyhow::{bail, Context, Result};
use clap::Args;
use cost_engine::{ArchitectureConfig, ComparisonRow, RawArchitecture};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub arch: ArchitectureArgs,

    /// Take the architecture from a JSON architecture file; dimension flags
    /// override the entry's fields
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Entry to pick from --file (Default: first)
    #[arg(long, requires = "file")]
    pub name: Option<String>,

    /// Print the estimate as JSON instead of text
    #[arg(long, action)]
    pub json: bool,
}

/// Resolves the single architecture described by `args`.
pub fn resolve(args: &EstimateArgs) -> Result<(String, ArchitectureConfig)> {
    if let Some(path) = &args.file {
        let file = ArchitectureFile::load(path)?;
        let entry = match &args.name {
            Some(name) => file
                .find(name)
                .with_context(|| format!("No architecture named '{}' in {:?}", name, path))?,
            None => &file.architectures[0],
        };
        if args.arch.preset.is_some() {
            bail!("--preset cannot be combined with --file; set \"preset\" in the entry instead");
        }
        let overrides = args.arch.overrides();
        let config = entry.resolve_with(&overrides)?;
        let name = if overrides == RawArchitecture::default() {
            entry.name.clone()
        } else {
            info!("Applying command-line overrides to '{}'", entry.name);
            format!("{} (custom)", entry.name)
        };
        return Ok((name, config));
    }

    if args.arch.is_empty() {
        bail!("Nothing to estimate: pass --preset, --family with dimensions, or --file");
    }
    let config = args.arch.to_raw()?.resolve()?;
    Ok((args.arch.label(), config))
}

pub fn run(args: EstimateArgs) -> Result<()> {
    let (name, config) = resolve(&args)?;
    info!("Estimating '{}' ({})", name, config.family());

    let row = ComparisonRow::new(name, &config);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&row)?);
    } else {
        println!("{}", row.summary());
    }
    Ok(())
}
