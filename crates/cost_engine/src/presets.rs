//! Architecture Presets - reference configurations at GPT-2-small scale

use crate::config::{
    ArchitectureConfig, ArchitectureFamily, ConfigError, RawArchitecture, DEFAULT_BYTES_PER_ELEMENT,
};

/// Built-in architectures sharing sequence length, vocabulary, width and depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preset {
    /// GPT-2 small: 12 layers, 12 heads of 64, FFN 3072
    #[default]
    Gpt2Small,
    /// GPT-2 small with 4 key/value groups
    Gpt2SmallGqa,
    /// State-space block at the same width, expansion 2
    StateSpaceSmall,
    /// Gated linear attention at the same width
    GatedLinearSmall,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Gpt2Small,
        Preset::Gpt2SmallGqa,
        Preset::StateSpaceSmall,
        Preset::GatedLinearSmall,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Gpt2Small => "gpt2-small",
            Preset::Gpt2SmallGqa => "gpt2-small-gqa",
            Preset::StateSpaceSmall => "ssm-small",
            Preset::GatedLinearSmall => "gla-small",
        }
    }

    /// Label used in comparison tables.
    pub fn display_name(&self) -> &'static str {
        match self {
            Preset::Gpt2Small => "Dense MHA (GPT-2 small)",
            Preset::Gpt2SmallGqa => "GQA (4 KV groups)",
            Preset::StateSpaceSmall => "State-Space (E=2)",
            Preset::GatedLinearSmall => "Gated Linear Attention",
        }
    }

    pub fn family(&self) -> ArchitectureFamily {
        match self {
            Preset::Gpt2Small => ArchitectureFamily::Dense,
            Preset::Gpt2SmallGqa => ArchitectureFamily::GroupedQuery,
            Preset::StateSpaceSmall => ArchitectureFamily::StateSpace,
            Preset::GatedLinearSmall => ArchitectureFamily::GatedLinear,
        }
    }

    pub fn from_name(name: &str) -> Option<Preset> {
        Preset::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Raw hyperparameters, suitable for overriding before resolution.
    pub fn raw(&self) -> RawArchitecture {
        let base = RawArchitecture {
            family: Some(self.family()),
            sequence_length: Some(1024),
            vocab_size: Some(50257),
            hidden_dim: Some(768),
            num_layers: Some(12),
            bytes_per_element: Some(DEFAULT_BYTES_PER_ELEMENT),
            ..Default::default()
        };
        match self {
            Preset::Gpt2Small => RawArchitecture {
                num_heads: Some(12),
                head_dim: Some(64),
                ffn_dim: Some(3072),
                ..base
            },
            Preset::Gpt2SmallGqa => RawArchitecture {
                num_heads: Some(12),
                head_dim: Some(64),
                ffn_dim: Some(3072),
                num_kv_groups: Some(4),
                ..base
            },
            Preset::StateSpaceSmall => RawArchitecture {
                expansion_ratio: Some(2),
                state_size: Some(16),
                ..base
            },
            Preset::GatedLinearSmall => RawArchitecture {
                key_dim: Some(384),
                value_dim: Some(768),
                ffn_dim: Some(3072),
                ..base
            },
        }
    }

    pub fn config(&self) -> Result<ArchitectureConfig, ConfigError> {
        self.raw().resolve()
    }
}
