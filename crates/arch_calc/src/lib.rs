pub mod cli;
pub mod compare;
pub mod config;
pub mod estimate;
pub mod logging;
pub mod presets;
