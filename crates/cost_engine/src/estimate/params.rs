//! Parameter counter.
//!
//! Normalization weights, biases and gating scalars are not counted.

use super::{product, sum};
use crate::config::{ArchitectureConfig, AttentionDims, Variant};

/// Total trainable parameters: embeddings, positional table (if any), and
/// `num_layers` blocks.
pub fn total_parameters(config: &ArchitectureConfig) -> u64 {
    checked_total_parameters(config).unwrap_or(u64::MAX)
}

pub(crate) fn checked_total_parameters(config: &ArchitectureConfig) -> Option<u64> {
    sum(&[
        checked_embedding_parameters(config),
        checked_positional_parameters(config),
        checked_per_layer_parameters(config).and_then(|p| p.checked_mul(config.num_layers())),
    ])
}

/// Token embedding table, `vocab_size * hidden_dim`.
pub fn embedding_parameters(config: &ArchitectureConfig) -> u64 {
    checked_embedding_parameters(config).unwrap_or(u64::MAX)
}

fn checked_embedding_parameters(config: &ArchitectureConfig) -> Option<u64> {
    product(&[config.vocab_size(), config.hidden_dim()])
}

/// Learned positional table, `sequence_length * hidden_dim`.
///
/// The state-space variant is position-free and has none.
pub fn positional_parameters(config: &ArchitectureConfig) -> u64 {
    checked_positional_parameters(config).unwrap_or(u64::MAX)
}

fn checked_positional_parameters(config: &ArchitectureConfig) -> Option<u64> {
    match config.variant() {
        Variant::StateSpace { .. } => Some(0),
        _ => product(&[config.sequence_length(), config.hidden_dim()]),
    }
}

/// Parameters in one block.
pub fn per_layer_parameters(config: &ArchitectureConfig) -> u64 {
    checked_per_layer_parameters(config).unwrap_or(u64::MAX)
}

fn checked_per_layer_parameters(config: &ArchitectureConfig) -> Option<u64> {
    let d = config.hidden_dim();
    match *config.variant() {
        Variant::Dense(AttentionDims { ffn_dim, .. }) => {
            // Q, K, V, O + FFN up/down
            sum(&[product(&[4, d, d]), product(&[2, d, ffn_dim])])
        }
        Variant::GroupedQuery {
            attention,
            num_kv_groups,
        } => {
            // Q and O stay full width, K and V shrink to the group width
            sum(&[
                product(&[2, d, d]),
                product(&[2, d, num_kv_groups, attention.head_dim]),
                product(&[2, d, attention.ffn_dim]),
            ])
        }
        Variant::StateSpace {
            expansion_ratio, ..
        } => sum(&[
            product(&[4, d, d]),
            product(&[2, d, expansion_ratio, d]),
        ]),
        Variant::GatedLinear { ffn_dim, .. } => {
            // QKVO use hidden_dim uniformly, key_dim/value_dim only shape the scores
            sum(&[product(&[4, d, d]), product(&[2, d, ffn_dim])])
        }
    }
}
