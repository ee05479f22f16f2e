//! Loading pipeline for the dashboard scene.
//!
//! Manifest first, then the scene description it names, then the mount.
//! Any failure is recorded in [`progress::LoadingProgress`] and ends in
//! `AppState::Unavailable` with nothing spawned.

/// Loading progress tracking resource for state transitions.
pub mod progress;

/// Manifest and scene description loading, arena build and mount.
pub mod scene_loader;
