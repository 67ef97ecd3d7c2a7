//! Comparison Aggregator
//!
//! Collects one row per evaluated architecture into an owned, append-only
//! table. Rows keep the raw integer estimates; MiB and GFLOPs are derived at
//! render time so repeated renders (and JSON round trips) never drift.

use crate::config::{ArchitectureConfig, ArchitectureFamily};
use crate::estimate::CostEstimate;
use crate::format::{fixed2, thousands};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const COLUMNS: [&str; 5] = [
    "Model",
    "Total Parameters",
    "Model Size (MiB)",
    "KV-Cache (MiB)",
    "FLOPs per Forward (GFLOPs)",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub name: String,
    pub family: ArchitectureFamily,
    #[serde(flatten)]
    pub estimate: CostEstimate,
}

impl ComparisonRow {
    pub fn new(name: impl Into<String>, config: &ArchitectureConfig) -> Self {
        Self {
            name: name.into(),
            family: config.family(),
            estimate: CostEstimate::of(config),
        }
    }

    pub fn total_parameters(&self) -> u64 {
        self.estimate.total_parameters
    }

    pub fn model_size_mib(&self) -> f64 {
        self.estimate.model_size_mib()
    }

    pub fn kv_cache_mib(&self) -> f64 {
        self.estimate.kv_cache_mib()
    }

    pub fn forward_gflops(&self) -> f64 {
        self.estimate.forward_gflops()
    }

    /// Display cells in [`COLUMNS`] order.
    pub fn cells(&self) -> [String; 5] {
        [
            self.name.clone(),
            thousands(self.total_parameters()),
            fixed2(self.model_size_mib()),
            fixed2(self.kv_cache_mib()),
            fixed2(self.forward_gflops()),
        ]
    }

    /// Multi-line summary for a single architecture.
    pub fn summary(&self) -> String {
        format!(
            "{} ({})\n  Total parameters : {}\n  Model size       : {} MiB\n  KV-cache         : {} MiB\n  Forward FLOPs    : {} GFLOPs",
            self.name,
            self.family,
            thousands(self.total_parameters()),
            fixed2(self.model_size_mib()),
            fixed2(self.kv_cache_mib()),
            fixed2(self.forward_gflops()),
        )
    }
}

/// Ordered side-by-side comparison. Rows are only ever appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Comparison {
    rows: Vec<ComparisonRow>,
}

impl Comparison {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates `config` and appends its row; earlier rows are untouched.
    pub fn push(&mut self, name: impl Into<String>, config: &ArchitectureConfig) -> &ComparisonRow {
        let row = ComparisonRow::new(name, config);
        tracing::debug!(name = %row.name, index = self.rows.len(), "appended comparison row");
        self.rows.push(row);
        &self.rows[self.rows.len() - 1]
    }

    /// Appends every `(name, config)` pair in the given order.
    pub fn extend<'a, N, I>(&mut self, architectures: I)
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, &'a ArchitectureConfig)>,
    {
        for (name, config) in architectures {
            self.push(name, config);
        }
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn grid(&self) -> (Vec<[String; 5]>, [usize; 5]) {
        let cells: Vec<[String; 5]> = self.rows.iter().map(|r| r.cells()).collect();
        // `format!` pads by char count, so widths are measured the same way.
        let mut widths = COLUMNS.map(|c| c.chars().count());
        for row in &cells {
            for (w, cell) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(cell.chars().count());
            }
        }
        (cells, widths)
    }

    /// Fixed-width text table; the name column is left aligned, numbers right.
    pub fn render(&self) -> String {
        let (cells, widths) = self.grid();
        let line = |row: &[String]| -> String {
            row.iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i == 0 {
                        format!("{:<w$}", cell, w = widths[i])
                    } else {
                        format!("{:>w$}", cell, w = widths[i])
                    }
                })
                .collect::<Vec<_>>()
                .join("  ")
        };

        let header: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

        let mut out = String::new();
        out.push_str(&line(&header[..]));
        out.push('\n');
        out.push_str(&rule.join("  "));
        out.push('\n');
        for row in &cells {
            out.push_str(&line(&row[..]));
            out.push('\n');
        }
        out
    }

    /// Markdown pipe table.
    pub fn render_markdown(&self) -> String {
        let (cells, _) = self.grid();
        let mut out = format!("| {} |\n", COLUMNS.join(" | "));
        out.push_str("|---|---:|---:|---:|---:|\n");
        for row in &cells {
            let escaped: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
            out.push_str(&format!("| {} |\n", escaped.join(" | ")));
        }
        out
    }
}

/// A comparison stamped with its generation time, for JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub generated_at: String,
    pub rows: Comparison,
}

impl ComparisonReport {
    pub fn new(generated_at: impl Into<String>, rows: Comparison) -> Self {
        Self {
            generated_at: generated_at.into(),
            rows,
        }
    }

    /// Save report to JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load report from JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let report = serde_json::from_str(&json)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::Preset;

    fn all_presets() -> anyhow::Result<Comparison> {
        let mut comparison = Comparison::new();
        for preset in Preset::ALL {
            comparison.push(preset.display_name(), &preset.config()?);
        }
        Ok(comparison)
    }

    #[test]
    fn test_rows_keep_insertion_order() -> anyhow::Result<()> {
        let comparison = all_presets()?;
        let names: Vec<&str> = comparison.rows().iter().map(|r| r.name.as_str()).collect();
        let expected: Vec<&str> = Preset::ALL.iter().map(|p| p.display_name()).collect();
        assert_eq!(names, expected);
        Ok(())
    }

    #[test]
    fn test_extend_does_not_touch_prior_rows() -> anyhow::Result<()> {
        let mut comparison = Comparison::new();
        let dense = Preset::Gpt2Small.config()?;
        comparison.push("first", &dense);
        let before = comparison.rows()[0].clone();

        let gqa = Preset::Gpt2SmallGqa.config()?;
        let ssm = Preset::StateSpaceSmall.config()?;
        comparison.extend([("second", &gqa), ("third", &ssm)]);

        assert_eq!(comparison.len(), 3);
        assert_eq!(comparison.rows()[0], before);
        assert_eq!(comparison.rows()[2].name, "third");
        Ok(())
    }

    #[test]
    fn test_render_is_stable() -> anyhow::Result<()> {
        let comparison = all_presets()?;
        let first = comparison.render();
        let second = comparison.render();
        assert_eq!(first, second);

        let lines: Vec<&str> = first.lines().collect();
        assert_eq!(lines.len(), 2 + Preset::ALL.len());
        assert!(lines[0].starts_with("Model"));
        assert!(lines[0].contains("FLOPs per Forward (GFLOPs)"));
        assert!(lines[2].contains("124,318,464"));
        assert!(lines[2].contains("237.12"));
        assert!(lines[2].contains("36.00"));
        assert!(lines[2].contains("291.65"));
        Ok(())
    }

    #[test]
    fn test_render_markdown() -> anyhow::Result<()> {
        let comparison = all_presets()?;
        let md = comparison.render_markdown();
        assert!(md.starts_with("| Model | Total Parameters |"));
        assert!(md.contains("| GQA (4 KV groups) | 114,881,280 | 219.12 | 12.00 | 272.32 |"));
        Ok(())
    }

    #[test]
    fn test_summary_lines() -> anyhow::Result<()> {
        let row = ComparisonRow::new("GPT-2 small", &Preset::Gpt2Small.config()?);
        let summary = row.summary();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines[0], "GPT-2 small (dense)");
        assert_eq!(lines[1], "  Total parameters : 124,318,464");
        assert_eq!(lines[2], "  Model size       : 237.12 MiB");
        assert_eq!(lines[3], "  KV-cache         : 36.00 MiB");
        assert_eq!(lines[4], "  Forward FLOPs    : 291.65 GFLOPs");
        Ok(())
    }

    #[test]
    fn test_render_aligns_non_ascii_names() -> anyhow::Result<()> {
        let mut comparison = Comparison::new();
        comparison.push("Zustandsraum-Größe", &Preset::StateSpaceSmall.config()?);
        comparison.push("plain", &Preset::Gpt2Small.config()?);

        let table = comparison.render();
        let widths: Vec<usize> = table.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{}", table);
        Ok(())
    }

    #[test]
    fn test_render_markdown_escapes_pipes() -> anyhow::Result<()> {
        let mut comparison = Comparison::new();
        comparison.push("A|B", &Preset::Gpt2Small.config()?);
        let md = comparison.render_markdown();
        assert!(md.contains("| A\\|B | 124,318,464 |"), "{}", md);
        Ok(())
    }

    #[test]
    fn test_empty_comparison_renders_header() {
        let comparison = Comparison::new();
        assert!(comparison.is_empty());
        assert_eq!(comparison.render().lines().count(), 2);
    }

    #[test]
    fn test_report_save_and_load() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("report.json");

        let report = ComparisonReport::new("2024-01-01T00:00:00+00:00", all_presets()?);
        report.save(&path)?;
        let loaded = ComparisonReport::load(&path)?;

        assert_eq!(loaded, report);
        assert_eq!(loaded.rows.render(), report.rows.render());
        Ok(())
    }
}
