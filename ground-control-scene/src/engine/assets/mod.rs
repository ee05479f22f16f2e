//! Dashboard configuration assets.
//!
//! The manifest names the scene file, the reveal clip, the navigation table
//! and layout overrides. Anything it leaves out falls back to `constants`.

/// Dashboard manifest asset and its validated runtime configuration.
pub mod dashboard_manifest;
