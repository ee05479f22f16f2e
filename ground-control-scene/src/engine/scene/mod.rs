//! Scene data and its presence in the Bevy world.
//!
//! The arena ([`graph`]) is the single source of truth for node hierarchy,
//! visibility and hover scale. Render entities only mirror it.

/// Keyframed transform clips and sampling.
pub mod animation;

/// JSON scene description and the arena it builds into.
pub mod description;

/// Node arena with parent/child index relations and a name index.
pub mod graph;

/// Render entities copied from the arena each frame.
pub mod mirror;

/// Mounted scene ownership, status reporting and unmount.
pub mod mount;

/// Slowly rotating sky backdrop.
pub mod sky;
