//! Architecture inputs: CLI flags and JSON architecture files.
//!
//! Both surfaces produce a [`RawArchitecture`]; validation is left to the
//! engine's resolver so error messages name the offending field.

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use cost_engine::{ArchitectureConfig, ArchitectureFamily, Preset, RawArchitecture};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hyperparameter flags of the `estimate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ArchitectureArgs {
    /// Start from a built-in preset (see `presets`)
    #[arg(long)]
    pub preset: Option<String>,

    /// Architecture family: dense | grouped_query | state_space | gated_linear
    #[arg(long)]
    pub family: Option<ArchitectureFamily>,

    #[arg(long, allow_negative_numbers = true)]
    pub sequence_length: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub vocab_size: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub hidden_dim: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub num_layers: Option<i64>,

    /// Storage width per parameter and cache slot (2 = 16-bit)
    #[arg(long, allow_negative_numbers = true)]
    pub bytes_per_element: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub num_heads: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub head_dim: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub ffn_dim: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub num_kv_groups: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub expansion_ratio: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub state_size: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub key_dim: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub value_dim: Option<i64>,
}

impl ArchitectureArgs {
    /// True when no hyperparameter was given on the command line.
    pub fn is_empty(&self) -> bool {
        self.preset.is_none() && self.overrides() == RawArchitecture::default()
    }

    /// Flags given explicitly, without any preset applied.
    pub fn overrides(&self) -> RawArchitecture {
        RawArchitecture {
            family: self.family,
            sequence_length: self.sequence_length,
            vocab_size: self.vocab_size,
            hidden_dim: self.hidden_dim,
            num_layers: self.num_layers,
            bytes_per_element: self.bytes_per_element,
            num_heads: self.num_heads,
            head_dim: self.head_dim,
            ffn_dim: self.ffn_dim,
            num_kv_groups: self.num_kv_groups,
            expansion_ratio: self.expansion_ratio,
            state_size: self.state_size,
            key_dim: self.key_dim,
            value_dim: self.value_dim,
        }
    }

    /// Flags layered over the selected preset (if any).
    pub fn to_raw(&self) -> Result<RawArchitecture> {
        let base = match &self.preset {
            Some(name) => lookup_preset(name)?.raw(),
            None => RawArchitecture::default(),
        };
        Ok(self.overrides().or(&base))
    }

    /// Label for reports: the preset's display name, or the family.
    pub fn label(&self) -> String {
        if let Some(preset) = self.preset.as_deref().and_then(Preset::from_name) {
            if self.overrides() == RawArchitecture::default() {
                return preset.display_name().to_string();
            }
            return format!("{} (custom)", preset.display_name());
        }
        match self.family {
            Some(family) => format!("custom {}", family),
            None => "custom".to_string(),
        }
    }
}

pub fn lookup_preset(name: &str) -> Result<Preset> {
    Preset::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
        anyhow!("Unknown preset '{}' (known: {})", name, known.join(", "))
    })
}

/// One named architecture inside an architecture file.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ArchitectureEntry {
    pub name: String,
    /// Optional preset the fields below override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(flatten)]
    pub fields: RawArchitecture,
}

impl ArchitectureEntry {
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            name: preset.display_name().to_string(),
            preset: Some(preset.name().to_string()),
            fields: RawArchitecture::default(),
        }
    }

    pub fn resolve(&self) -> Result<ArchitectureConfig> {
        self.resolve_with(&RawArchitecture::default())
    }

    /// Resolves with `overrides` taking precedence over the entry's fields,
    /// which in turn take precedence over its preset.
    pub fn resolve_with(&self, overrides: &RawArchitecture) -> Result<ArchitectureConfig> {
        let base = match &self.preset {
            Some(name) => lookup_preset(name)?.raw(),
            None => RawArchitecture::default(),
        };
        let config = overrides
            .clone()
            .or(&self.fields.clone().or(&base))
            .resolve()
            .with_context(|| format!("Architecture '{}' is invalid", self.name))?;
        Ok(config)
    }
}

/// JSON file listing architectures in evaluation order.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ArchitectureFile {
    pub architectures: Vec<ArchitectureEntry>,
}

impl ArchitectureFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read architecture file at {:?}", path))?;
        let file: ArchitectureFile = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse architecture file at {:?}", path))?;
        if file.architectures.is_empty() {
            bail!("Architecture file {:?} lists no architectures", path);
        }
        Ok(file)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&ArchitectureEntry> {
        self.architectures.iter().find(|e| e.name == name)
    }

    /// Every preset, in table order.
    pub fn from_presets() -> Self {
        Self {
            architectures: Preset::ALL
                .into_iter()
                .map(ArchitectureEntry::from_preset)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_preset() -> Result<()> {
        let args = ArchitectureArgs {
            preset: Some("gpt2-small".to_string()),
            num_layers: Some(24),
            ..Default::default()
        };
        let config = args.to_raw()?.resolve()?;
        assert_eq!(config.num_layers(), 24);
        assert_eq!(config.hidden_dim(), 768);
        assert_eq!(args.label(), "Dense MHA (GPT-2 small) (custom)");
        Ok(())
    }

    #[test]
    fn test_unknown_preset() {
        let args = ArchitectureArgs {
            preset: Some("gpt5".to_string()),
            ..Default::default()
        };
        let err = args.to_raw().unwrap_err().to_string();
        assert!(err.contains("gpt5"));
        assert!(err.contains("gpt2-small"));
    }

    #[test]
    fn test_is_empty() {
        assert!(ArchitectureArgs::default().is_empty());
        let args = ArchitectureArgs {
            hidden_dim: Some(512),
            ..Default::default()
        };
        assert!(!args.is_empty());
    }

    #[test]
    fn test_entry_resolve_reports_name_and_field() {
        let entry = ArchitectureEntry {
            name: "broken".to_string(),
            preset: Some("gpt2-small".to_string()),
            fields: RawArchitecture {
                hidden_dim: Some(-1),
                ..Default::default()
            },
        };
        let err = format!("{:#}", entry.resolve().unwrap_err());
        assert!(err.contains("broken"));
        assert!(err.contains("hidden_dim"));
    }

    #[test]
    fn test_from_presets_resolves() -> Result<()> {
        let file = ArchitectureFile::from_presets();
        assert_eq!(file.architectures.len(), Preset::ALL.len());
        for entry in &file.architectures {
            entry.resolve()?;
        }
        Ok(())
    }
}
