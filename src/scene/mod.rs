//! Parameter records and presets.

/// Still and motion parameter records.
pub mod params;
/// Built-in and saved presets.
pub mod preset;
