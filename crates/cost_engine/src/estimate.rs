//! Estimate Module - closed-form cost estimators
//!
//! Every estimator is a pure function of a resolved [`ArchitectureConfig`]:
//! - params: trainable parameter count
//! - memory: static footprint and inference KV-cache footprint
//! - flops: forward-pass compute cost
//!
//! Arithmetic is checked. The public `u64` functions saturate at `u64::MAX`,
//! which a resolved configuration never reaches.

use crate::config::ArchitectureConfig;
use serde::{Deserialize, Serialize};

pub mod flops;
pub mod memory;
pub mod params;

pub use flops::{forward_flops, matmul_flops};
pub use memory::{kv_cache_bytes, model_bytes};
pub use params::total_parameters;

/// Bytes in one mebibyte.
pub const BYTES_PER_MIB: f64 = (1u64 << 20) as f64;

/// FLOPs in one GFLOP (decimal).
pub const FLOPS_PER_GFLOP: f64 = 1e9;

/// Product of `factors`, or `None` when it leaves the `u64` range.
pub(crate) fn product(factors: &[u64]) -> Option<u64> {
    factors.iter().try_fold(1u64, |acc, f| acc.checked_mul(*f))
}

/// Sum of `terms`, or `None` when any term or the total overflows.
pub(crate) fn sum(terms: &[Option<u64>]) -> Option<u64> {
    terms
        .iter()
        .try_fold(0u64, |acc, t| t.and_then(|t| acc.checked_add(t)))
}

/// Every estimate for one configuration, in raw units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub total_parameters: u64,
    pub model_bytes: u64,
    pub kv_cache_bytes: u64,
    pub forward_flops: u64,
}

impl CostEstimate {
    /// Never fails: [`RawArchitecture::resolve`] only admits configurations
    /// whose estimates fit in `u64`.
    ///
    /// [`RawArchitecture::resolve`]: crate::config::RawArchitecture::resolve
    pub fn of(config: &ArchitectureConfig) -> Self {
        let total_parameters = total_parameters(config);
        let estimate = Self {
            total_parameters,
            model_bytes: model_bytes(total_parameters, config.bytes_per_element()),
            kv_cache_bytes: kv_cache_bytes(config),
            forward_flops: forward_flops(config),
        };
        tracing::debug!(family = %config.family(), ?estimate, "estimated architecture cost");
        estimate
    }

    /// `None` if any estimate would overflow `u64`.
    pub fn checked(config: &ArchitectureConfig) -> Option<Self> {
        let total_parameters = params::checked_total_parameters(config)?;
        Some(Self {
            total_parameters,
            model_bytes: total_parameters.checked_mul(config.bytes_per_element())?,
            kv_cache_bytes: memory::checked_kv_cache_bytes(config)?,
            forward_flops: flops::checked_forward_flops(config)?,
        })
    }

    pub fn model_size_mib(&self) -> f64 {
        self.model_bytes as f64 / BYTES_PER_MIB
    }

    pub fn kv_cache_mib(&self) -> f64 {
        self.kv_cache_bytes as f64 / BYTES_PER_MIB
    }

    pub fn forward_gflops(&self) -> f64 {
        self.forward_flops as f64 / FLOPS_PER_GFLOP
    }
}
