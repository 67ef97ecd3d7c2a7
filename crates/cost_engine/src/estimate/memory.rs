//! Memory estimator: static weights and inference KV-cache.
//!
//! Batch size is fixed at 1; the cache figure is the cost of one in-flight
//! sequence at full `sequence_length`.

use super::product;
use crate::config::{ArchitectureConfig, Variant};

/// Static model footprint in bytes.
pub fn model_bytes(total_parameters: u64, bytes_per_element: u64) -> u64 {
    total_parameters.saturating_mul(bytes_per_element)
}

/// `(effective_heads, head_dim)` used for cache sizing.
///
/// Recurrent variants are treated as a single head of width `hidden_dim`.
pub fn cache_layout(config: &ArchitectureConfig) -> (u64, u64) {
    match *config.variant() {
        Variant::Dense(attention) => (attention.num_heads, attention.head_dim),
        Variant::GroupedQuery {
            attention,
            num_kv_groups,
        } => (num_kv_groups, attention.head_dim),
        Variant::StateSpace { .. } | Variant::GatedLinear { .. } => (1, config.hidden_dim()),
    }
}

/// KV-cache footprint in bytes:
/// `2 * num_layers * effective_heads * sequence_length * head_dim * bytes_per_element`.
pub fn kv_cache_bytes(config: &ArchitectureConfig) -> u64 {
    checked_kv_cache_bytes(config).unwrap_or(u64::MAX)
}

pub(crate) fn checked_kv_cache_bytes(config: &ArchitectureConfig) -> Option<u64> {
    let (heads, head_dim) = cache_layout(config);
    product(&[
        2,
        config.num_layers(),
        heads,
        config.sequence_length(),
        head_dim,
        config.bytes_per_element(),
    ])
}
