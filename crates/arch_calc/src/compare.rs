use crate::config::{lookup_preset, ArchitectureEntry, ArchitectureFile};
use anyhow::Result;
use clap::{Args, ValueEnum};
use cost_engine::{Comparison, ComparisonReport};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFormat {
    #[default]
    Text,
    Markdown,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// JSON architecture file; rows follow file order
    #[arg(long, conflicts_with = "presets")]
    pub file: Option<PathBuf>,

    /// Comma-separated preset names (Default: all presets)
    #[arg(long, value_delimiter = ',')]
    pub presets: Vec<String>,

    #[arg(long, value_enum, default_value_t = TableFormat::Text)]
    pub format: TableFormat,

    /// Write the comparison as a JSON report
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Builds the comparison in the order the inputs list architectures.
pub fn build(args: &CompareArgs) -> Result<Comparison> {
    let source = match &args.file {
        Some(path) => ArchitectureFile::load(path)?,
        None if !args.presets.is_empty() => {
            let mut file = ArchitectureFile::default();
            for name in &args.presets {
                let preset = lookup_preset(name)?;
                file.architectures.push(ArchitectureEntry::from_preset(preset));
            }
            file
        }
        None => ArchitectureFile::from_presets(),
    };

    let mut comparison = Comparison::new();
    for entry in &source.architectures {
        let config = entry.resolve()?;
        comparison.push(entry.name.clone(), &config);
    }
    Ok(comparison)
}

pub fn run(args: CompareArgs) -> Result<()> {
    let comparison = build(&args)?;
    info!("Compared {} architectures", comparison.len());

    match args.format {
        TableFormat::Text => print!("{}", comparison.render()),
        TableFormat::Markdown => print!("{}", comparison.render_markdown()),
    }

    if let Some(path) = &args.output {
        if path.exists() {
            warn!("Overwriting existing report at {:?}", path);
        }
        let report = ComparisonReport::new(chrono::Local::now().to_rfc3339(), comparison);
        report.save(path)?;
        info!("Report written to {:?}", path);
    }
    Ok(())
}
