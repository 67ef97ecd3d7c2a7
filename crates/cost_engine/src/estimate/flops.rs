//! Compute estimator: forward-pass FLOPs.
//!
//! A matmul of shapes (a x b) . (b x c) costs `2 * a * b * c`.

use super::{product, sum};
use crate::config::{ArchitectureConfig, Variant};

pub fn matmul_flops(a: u64, b: u64, c: u64) -> u64 {
    checked_matmul(a, b, c).unwrap_or(u64::MAX)
}

fn checked_matmul(a: u64, b: u64, c: u64) -> Option<u64> {
    product(&[2, a, b, c])
}

/// Total forward FLOPs: `num_layers` blocks plus the vocabulary head.
pub fn forward_flops(config: &ArchitectureConfig) -> u64 {
    checked_forward_flops(config).unwrap_or(u64::MAX)
}

pub(crate) fn checked_forward_flops(config: &ArchitectureConfig) -> Option<u64> {
    sum(&[
        checked_per_layer_flops(config).and_then(|f| f.checked_mul(config.num_layers())),
        checked_output_head_flops(config),
    ])
}

/// Projection to the vocabulary, `2 * L * d * V`.
///
/// Not charged for the state-space variant.
pub fn output_head_flops(config: &ArchitectureConfig) -> u64 {
    checked_output_head_flops(config).unwrap_or(u64::MAX)
}

fn checked_output_head_flops(config: &ArchitectureConfig) -> Option<u64> {
    match config.variant() {
        Variant::StateSpace { .. } => Some(0),
        _ => checked_matmul(
            config.sequence_length(),
            config.hidden_dim(),
            config.vocab_size(),
        ),
    }
}

/// FLOPs for one block over the full sequence.
pub fn per_layer_flops(config: &ArchitectureConfig) -> u64 {
    checked_per_layer_flops(config).unwrap_or(u64::MAX)
}

fn checked_per_layer_flops(config: &ArchitectureConfig) -> Option<u64> {
    let l = config.sequence_length();
    let d = config.hidden_dim();

    match *config.variant() {
        Variant::Dense(attention) => sum(&[
            // QKV, scores + weighted sum, output, FFN up/down
            product(&[3, 2, l, d, d]),
            attention_core_flops(l, d),
            checked_matmul(l, d, d),
            product(&[2, 2, l, d, attention.ffn_dim]),
        ]),
        Variant::GroupedQuery {
            attention,
            num_kv_groups,
        } => {
            let kv_dim = product(&[num_kv_groups, attention.head_dim])?;
            sum(&[
                checked_matmul(l, d, d),
                product(&[2, 2, l, d, kv_dim]),
                attention_core_flops(l, d),
                checked_matmul(l, d, d),
                product(&[2, 2, l, d, attention.ffn_dim]),
            ])
        }
        Variant::StateSpace {
            expansion_ratio, ..
        } => sum(&[
            product(&[8, l, d, d]),
            product(&[4, l, l, d]),
            product(&[4, expansion_ratio, l, d, d]),
        ]),
        Variant::GatedLinear {
            key_dim,
            value_dim,
            ffn_dim,
        } => sum(&[
            product(&[3, 2, l, d, d]),
            checked_matmul(l, d, d),
            checked_matmul(l, key_dim, l),
            checked_matmul(l, l, value_dim),
            checked_matmul(l, d, ffn_dim),
            checked_matmul(l, ffn_dim, d),
        ]),
    }
}

/// Scores plus weighted sum, `4 * d * L^2`.
fn attention_core_flops(l: u64, d: u64) -> Option<u64> {
    sum(&[checked_matmul(l, d, l), checked_matmul(l, l, d)])
}
