use bevy::math::Vec3;

/// Viewport width (logical pixels) below which the narrow preset applies.
pub const LAYOUT_BREAKPOINT: f32 = 768.0;

/// Uniform model scale on narrow (mobile) viewports.
pub const NARROW_MODEL_SCALE: Vec3 = Vec3::new(6.0, 6.0, 6.0);

/// Uniform model scale on wide viewports.
pub const WIDE_MODEL_SCALE: Vec3 = Vec3::new(10.0, 10.0, 10.0);

/// Model placement, shared by both presets.
pub const MODEL_POSITION: Vec3 = Vec3::new(-2.0, 3.0, -3.0);

/// Model orientation as XYZ euler angles in radians, shared by both presets.
pub const MODEL_ROTATION_EULER: [f32; 3] = [2.0, -0.5, 1.0];
