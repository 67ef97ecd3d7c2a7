//! Architecture configuration and the resolver that validates it.
//!
//! Hyperparameters arrive as a [`RawArchitecture`] (every field optional and
//! signed, so that both missing and non-positive values can be reported by
//! name) and leave as an immutable [`ArchitectureConfig`].

use crate::estimate::CostEstimate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Storage width used when a preset or CLI flag does not specify one (16-bit).
pub const DEFAULT_BYTES_PER_ELEMENT: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },
}

impl ConfigError {
    fn missing(field: &'static str) -> Self {
        ConfigError::InvalidConfiguration {
            field,
            reason: "is required".to_string(),
        }
    }

    fn non_positive(field: &'static str, value: i64) -> Self {
        ConfigError::InvalidConfiguration {
            field,
            reason: format!("must be a positive integer (got {})", value),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::InvalidConfiguration { field, .. } => field,
        }
    }
}

/// Architecture families known to the cost model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchitectureFamily {
    /// Standard multi-head attention transformer.
    Dense,
    /// Query heads share a smaller set of key/value groups.
    GroupedQuery,
    /// Linear state-space block, no attention and no positional table.
    StateSpace,
    /// Gated linear attention.
    GatedLinear,
}

impl ArchitectureFamily {
    pub const ALL: [ArchitectureFamily; 4] = [
        ArchitectureFamily::Dense,
        ArchitectureFamily::GroupedQuery,
        ArchitectureFamily::StateSpace,
        ArchitectureFamily::GatedLinear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArchitectureFamily::Dense => "dense",
            ArchitectureFamily::GroupedQuery => "grouped_query",
            ArchitectureFamily::StateSpace => "state_space",
            ArchitectureFamily::GatedLinear => "gated_linear",
        }
    }
}

impl fmt::Display for ArchitectureFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArchitectureFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "dense" | "mha" => Ok(ArchitectureFamily::Dense),
            "grouped_query" | "gqa" => Ok(ArchitectureFamily::GroupedQuery),
            "state_space" | "ssm" => Ok(ArchitectureFamily::StateSpace),
            "gated_linear" | "gla" => Ok(ArchitectureFamily::GatedLinear),
            other => Err(format!("unknown architecture family: {}", other)),
        }
    }
}

/// Head layout shared by the attention-style variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttentionDims {
    pub num_heads: u64,
    pub head_dim: u64,
    pub ffn_dim: u64,
}

/// Family-specific hyperparameters of a resolved configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Dense(AttentionDims),
    GroupedQuery {
        attention: AttentionDims,
        num_kv_groups: u64,
    },
    StateSpace {
        expansion_ratio: u64,
        /// Carried for completeness; no formula consumes it.
        state_size: u64,
    },
    GatedLinear {
        key_dim: u64,
        value_dim: u64,
        ffn_dim: u64,
    },
}

impl Variant {
    pub fn family(&self) -> ArchitectureFamily {
        match self {
            Variant::Dense(_) => ArchitectureFamily::Dense,
            Variant::GroupedQuery { .. } => ArchitectureFamily::GroupedQuery,
            Variant::StateSpace { .. } => ArchitectureFamily::StateSpace,
            Variant::GatedLinear { .. } => ArchitectureFamily::GatedLinear,
        }
    }
}

/// Validated, immutable hyperparameters of one architecture.
///
/// Only obtainable through [`RawArchitecture::resolve`], so every dimension
/// is known to be positive. Convert into a [`RawArchitecture`] to serialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchitectureConfig {
    sequence_length: u64,
    vocab_size: u64,
    hidden_dim: u64,
    num_layers: u64,
    bytes_per_element: u64,
    variant: Variant,
}

impl ArchitectureConfig {
    pub fn sequence_length(&self) -> u64 {
        self.sequence_length
    }

    pub fn vocab_size(&self) -> u64 {
        self.vocab_size
    }

    pub fn hidden_dim(&self) -> u64 {
        self.hidden_dim
    }

    pub fn num_layers(&self) -> u64 {
        self.num_layers
    }

    pub fn bytes_per_element(&self) -> u64 {
        self.bytes_per_element
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn family(&self) -> ArchitectureFamily {
        self.variant.family()
    }

    /// Every `(field, value)` pair consumed by at least one formula.
    pub fn dimensions(&self) -> Vec<(&'static str, u64)> {
        let mut dims = vec![
            ("sequence_length", self.sequence_length),
            ("vocab_size", self.vocab_size),
            ("hidden_dim", self.hidden_dim),
            ("num_layers", self.num_layers),
            ("bytes_per_element", self.bytes_per_element),
        ];
        match self.variant {
            Variant::Dense(a) => dims.extend([
                ("num_heads", a.num_heads),
                ("head_dim", a.head_dim),
                ("ffn_dim", a.ffn_dim),
            ]),
            Variant::GroupedQuery {
                attention,
                num_kv_groups,
            } => dims.extend([
                ("head_dim", attention.head_dim),
                ("ffn_dim", attention.ffn_dim),
                ("num_kv_groups", num_kv_groups),
            ]),
            Variant::StateSpace {
                expansion_ratio, ..
            } => dims.push(("expansion_ratio", expansion_ratio)),
            Variant::GatedLinear {
                key_dim,
                value_dim,
                ffn_dim,
            } => dims.extend([
                ("key_dim", key_dim),
                ("value_dim", value_dim),
                ("ffn_dim", ffn_dim),
            ]),
        }
        dims
    }
}

/// Unvalidated hyperparameters as supplied by a caller, a preset, or a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArchitecture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<ArchitectureFamily>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocab_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_dim: Option<i64>,
    #[serde(alias = "n_layers")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_layers: Option<i64>,
    #[serde(alias = "bytes_per_param")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_per_element: Option<i64>,
    #[serde(alias = "n_heads")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_heads: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_dim: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffn_dim: Option<i64>,
    #[serde(alias = "n_kv_heads")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_kv_groups: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expansion_ratio: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_dim: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_dim: Option<i64>,
}

fn positive(field: &'static str, value: Option<i64>) -> Result<u64, ConfigError> {
    match value {
        None => Err(ConfigError::missing(field)),
        Some(v) if v <= 0 => Err(ConfigError::non_positive(field, v)),
        Some(v) => Ok(v as u64),
    }
}

impl RawArchitecture {
    pub fn new(family: ArchitectureFamily) -> Self {
        Self {
            family: Some(family),
            ..Default::default()
        }
    }

    /// Fills every field left unset here from `base`.
    pub fn or(self, base: &RawArchitecture) -> Self {
        Self {
            family: self.family.or(base.family),
            sequence_length: self.sequence_length.or(base.sequence_length),
            vocab_size: self.vocab_size.or(base.vocab_size),
            hidden_dim: self.hidden_dim.or(base.hidden_dim),
            num_layers: self.num_layers.or(base.num_layers),
            bytes_per_element: self.bytes_per_element.or(base.bytes_per_element),
            num_heads: self.num_heads.or(base.num_heads),
            head_dim: self.head_dim.or(base.head_dim),
            ffn_dim: self.ffn_dim.or(base.ffn_dim),
            num_kv_groups: self.num_kv_groups.or(base.num_kv_groups),
            expansion_ratio: self.expansion_ratio.or(base.expansion_ratio),
            state_size: self.state_size.or(base.state_size),
            key_dim: self.key_dim.or(base.key_dim),
            value_dim: self.value_dim.or(base.value_dim),
        }
    }

    /// Validates every field the family needs and builds the config.
    ///
    /// Fields the family does not use are ignored, even when non-positive.
    pub fn resolve(&self) -> Result<ArchitectureConfig, ConfigError> {
        let family = self.family.ok_or_else(|| ConfigError::missing("family"))?;

        let sequence_length = positive("sequence_length", self.sequence_length)?;
        let vocab_size = positive("vocab_size", self.vocab_size)?;
        let hidden_dim = positive("hidden_dim", self.hidden_dim)?;
        let num_layers = positive("num_layers", self.num_layers)?;
        let bytes_per_element = positive("bytes_per_element", self.bytes_per_element)?;

        let attention = || -> Result<AttentionDims, ConfigError> {
            Ok(AttentionDims {
                num_heads: positive("num_heads", self.num_heads)?,
                head_dim: positive("head_dim", self.head_dim)?,
                ffn_dim: positive("ffn_dim", self.ffn_dim)?,
            })
        };

        let variant = match family {
            ArchitectureFamily::Dense => Variant::Dense(attention()?),
            ArchitectureFamily::GroupedQuery => {
                let attention = attention()?;
                let num_kv_groups = positive("num_kv_groups", self.num_kv_groups)?;
                if num_kv_groups > attention.num_heads {
                    return Err(ConfigError::InvalidConfiguration {
                        field: "num_kv_groups",
                        reason: format!(
                            "must not exceed num_heads ({} > {})",
                            num_kv_groups, attention.num_heads
                        ),
                    });
                }
                if attention.num_heads % num_kv_groups != 0 {
                    return Err(ConfigError::InvalidConfiguration {
                        field: "num_kv_groups",
                        reason: format!(
                            "must divide num_heads evenly ({} % {} != 0)",
                            attention.num_heads, num_kv_groups
                        ),
                    });
                }
                Variant::GroupedQuery {
                    attention,
                    num_kv_groups,
                }
            }
            ArchitectureFamily::StateSpace => Variant::StateSpace {
                expansion_ratio: positive("expansion_ratio", self.expansion_ratio)?,
                state_size: positive("state_size", self.state_size)?,
            },
            ArchitectureFamily::GatedLinear => Variant::GatedLinear {
                key_dim: positive("key_dim", self.key_dim)?,
                value_dim: positive("value_dim", self.value_dim)?,
                ffn_dim: positive("ffn_dim", self.ffn_dim)?,
            },
        };

        let config = ArchitectureConfig {
            sequence_length,
            vocab_size,
            hidden_dim,
            num_layers,
            bytes_per_element,
            variant,
        };

        if CostEstimate::checked(&config).is_none() {
            // Blame the largest dimension the formulas consume.
            let (field, value) = config
                .dimensions()
                .into_iter()
                .max_by_key(|(_, v)| *v)
                .unwrap_or(("hidden_dim", hidden_dim));
            return Err(ConfigError::InvalidConfiguration {
                field,
                reason: format!("is too large ({}): estimates overflow 64 bits", value),
            });
        }

        Ok(config)
    }
}

impl From<&ArchitectureConfig> for RawArchitecture {
    fn from(config: &ArchitectureConfig) -> Self {
        let mut raw = RawArchitecture {
            family: Some(config.family()),
            sequence_length: Some(config.sequence_length as i64),
            vocab_size: Some(config.vocab_size as i64),
            hidden_dim: Some(config.hidden_dim as i64),
            num_layers: Some(config.num_layers as i64),
            bytes_per_element: Some(config.bytes_per_element as i64),
            ..Default::default()
        };
        let set_attention = |raw: &mut RawArchitecture, a: &AttentionDims| {
            raw.num_heads = Some(a.num_heads as i64);
            raw.head_dim = Some(a.head_dim as i64);
            raw.ffn_dim = Some(a.ffn_dim as i64);
        };
        match config.variant {
            Variant::Dense(a) => set_attention(&mut raw, &a),
            Variant::GroupedQuery {
                attention,
                num_kv_groups,
            } => {
                set_attention(&mut raw, &attention);
                raw.num_kv_groups = Some(num_kv_groups as i64);
            }
            Variant::StateSpace {
                expansion_ratio,
                state_size,
            } => {
                raw.expansion_ratio = Some(expansion_ratio as i64);
                raw.state_size = Some(state_size as i64);
            }
            Variant::GatedLinear {
                key_dim,
                value_dim,
                ffn_dim,
            } => {
                raw.key_dim = Some(key_dim as i64);
                raw.value_dim = Some(value_dim as i64);
                raw.ffn_dim = Some(ffn_dim as i64);
            }
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense() -> RawArchitecture {
        RawArchitecture {
            family: Some(ArchitectureFamily::Dense),
            sequence_length: Some(1024),
            vocab_size: Some(50257),
            hidden_dim: Some(768),
            num_layers: Some(12),
            bytes_per_element: Some(2),
            num_heads: Some(12),
            head_dim: Some(64),
            ffn_dim: Some(3072),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_dense() {
        let config = dense().resolve().unwrap();
        assert_eq!(config.family(), ArchitectureFamily::Dense);
        assert_eq!(config.hidden_dim(), 768);
        assert_eq!(
            *config.variant(),
            Variant::Dense(AttentionDims {
                num_heads: 12,
                head_dim: 64,
                ffn_dim: 3072
            })
        );
    }

    #[test]
    fn test_missing_field_is_named() {
        let mut raw = dense();
        raw.ffn_dim = None;
        let err = raw.resolve().unwrap_err();
        assert_eq!(err.field(), "ffn_dim");
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn test_non_positive_field_is_named() {
        let mut raw = dense();
        raw.num_layers = Some(0);
        assert_eq!(raw.resolve().unwrap_err().field(), "num_layers");

        raw.num_layers = Some(12);
        raw.vocab_size = Some(-5);
        let err = raw.resolve().unwrap_err();
        assert_eq!(err.field(), "vocab_size");
        assert!(err.to_string().contains("-5"));
    }

    #[test]
    fn test_missing_family() {
        let mut raw = dense();
        raw.family = None;
        assert_eq!(raw.resolve().unwrap_err().field(), "family");
    }

    #[test]
    fn test_kv_groups_must_divide_heads() {
        let mut raw = dense();
        raw.family = Some(ArchitectureFamily::GroupedQuery);
        raw.num_kv_groups = Some(5);
        assert_eq!(raw.resolve().unwrap_err().field(), "num_kv_groups");

        raw.num_kv_groups = Some(24);
        assert_eq!(raw.resolve().unwrap_err().field(), "num_kv_groups");

        raw.num_kv_groups = Some(4);
        assert!(raw.resolve().is_ok());
    }

    #[test]
    fn test_overflowing_dimensions_are_rejected() {
        let mut raw = dense();
        raw.vocab_size = Some(i64::MAX);
        let err = raw.resolve().unwrap_err();
        assert_eq!(err.field(), "vocab_size");
        assert!(err.to_string().contains("overflow"));

        let mut raw = dense();
        raw.family = Some(ArchitectureFamily::StateSpace);
        raw.expansion_ratio = Some(2);
        raw.state_size = Some(16);
        raw.sequence_length = Some(8_388_608);
        raw.hidden_dim = Some(65_536);
        let err = raw.resolve().unwrap_err();
        assert_eq!(err.field(), "sequence_length");
    }

    #[test]
    fn test_unused_fields_are_ignored() {
        let mut raw = dense();
        raw.expansion_ratio = Some(-1);
        raw.key_dim = Some(0);
        assert!(raw.resolve().is_ok());
    }

    #[test]
    fn test_or_fills_unset_fields() {
        let overrides = RawArchitecture {
            num_layers: Some(24),
            ..Default::default()
        };
        let merged = overrides.or(&dense());
        assert_eq!(merged.num_layers, Some(24));
        assert_eq!(merged.hidden_dim, Some(768));
        assert_eq!(merged.family, Some(ArchitectureFamily::Dense));
    }

    #[test]
    fn test_raw_round_trip_through_config() {
        let config = dense().resolve().unwrap();
        let raw = RawArchitecture::from(&config);
        assert_eq!(raw.resolve().unwrap(), config);
    }

    #[test]
    fn test_family_parsing() {
        assert_eq!("gqa".parse(), Ok(ArchitectureFamily::GroupedQuery));
        assert_eq!("state-space".parse(), Ok(ArchitectureFamily::StateSpace));
        assert!("rnn".parse::<ArchitectureFamily>().is_err());
    }

    #[test]
    fn test_deserialize_with_aliases() -> anyhow::Result<()> {
        let raw: RawArchitecture = serde_json::from_str(
            r#"{"family":"grouped_query","sequence_length":1024,"vocab_size":50257,
                "hidden_dim":768,"n_layers":12,"bytes_per_param":2,"n_heads":12,
                "head_dim":64,"ffn_dim":3072,"n_kv_heads":4}"#,
        )?;
        let config = raw.resolve()?;
        assert_eq!(config.num_layers(), 12);
        assert_eq!(config.family(), ArchitectureFamily::GroupedQuery);
        Ok(())
    }
}
