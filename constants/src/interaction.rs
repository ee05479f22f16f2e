/// Render scale multiplier applied on top of a hovered node's base scale.
pub const HOVER_SCALE_FACTOR: f32 = 1.1;

/// Name of the clip that reveals the satellite sub-components.
pub const REVEAL_CLIP_NAME: &str = "Timeline";

/// Scene files may not name nodes with this prefix; it is kept for nodes the
/// engine inserts itself.
pub const RESERVED_NODE_PREFIX: &str = "__";

/// Name given to the synthetic node that carries the layout transform.
pub const MODEL_ROOT_NAME: &str = "__model_root";

/// Distance tolerance when deciding whether two hits coincide.
pub const HIT_DISTANCE_EPSILON: f32 = 1e-4;
