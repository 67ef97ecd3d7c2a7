//! Cost Engine
//!
//! Closed-form cost model for transformer and state-space architectures.
//! Maps an architecture's hyperparameters to parameter count, static memory
//! footprint, inference KV-cache footprint and forward-pass FLOPs, and
//! collects the results into an ordered comparison table.
//!
//! Nothing here allocates tensors or touches hardware; every figure is a
//! theoretical estimate.

pub mod compare;
pub mod config;
pub mod estimate;
pub mod format;
pub mod presets;

pub use compare::{Comparison, ComparisonReport, ComparisonRow};
pub use config::{
    ArchitectureConfig, ArchitectureFamily, AttentionDims, ConfigError, RawArchitecture, Variant,
};
pub use estimate::CostEstimate;
pub use presets::Preset;
