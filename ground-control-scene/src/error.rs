//! Error taxonomy for the scene engine.
//!
//! None of these escape to the hosting application: systems turn them into
//! degraded state, log lines and host notifications.

use thiserror::Error;

pub type SceneResult<T> = Result<T, SceneError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("scene asset unavailable: {0}")]
    AssetUnavailable(String),

    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    #[error("animation clip '{0}' missing from scene asset")]
    MissingAnimationClip(String),

    #[error("node '{node}' maps to both '{first_route}' and '{second_route}'")]
    AmbiguousNavigationRule {
        node: String,
        first_route: String,
        second_route: String,
    },

    #[error("invalid navigation rule: {0}")]
    InvalidNavigationRule(String),

    #[error("duplicate scene node name '{0}'")]
    DuplicateNodeName(String),

    #[error("scene node name '{0}' uses the reserved prefix")]
    ReservedNodeName(String),

    #[error("unknown scene node '{0}'")]
    UnknownNode(String),

    #[error("invalid geometry on '{node}': {reason}")]
    InvalidGeometry { node: String, reason: String },
}
