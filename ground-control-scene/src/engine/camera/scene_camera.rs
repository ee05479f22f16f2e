use bevy::prelude::*;

use constants::render_settings::{
    AMBIENT_BRIGHTNESS, CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR, CAMERA_POSITION,
};

/// The camera picks are cast from.
#[derive(Component)]
pub struct SceneCamera;

pub fn spawn_scene_camera(commands: &mut Commands) {
    commands.spawn((
        Name::new("scene_camera"),
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            ..default()
        }),
        Transform::from_translation(CAMERA_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
        SceneCamera,
    ));
}

pub fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(5.0, 5.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.insert_resource(AmbientLight {
        brightness: AMBIENT_BRIGHTNESS,
        ..default()
    });
}
