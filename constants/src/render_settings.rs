use bevy::math::Vec3;

pub const CAMERA_FOV_DEGREES: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.01;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, 5.0);

/// Sky dome spin about Y, radians per second (0.002 per frame at 60 Hz).
pub const SKY_ROTATION_SPEED: f32 = 0.12;
pub const SKY_RADIUS: f32 = 400.0;

pub const AMBIENT_BRIGHTNESS: f32 = 400.0;
