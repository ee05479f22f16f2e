use bevy::prelude::*;

use super::mount::SceneEntity;
use constants::render_settings::{SKY_RADIUS, SKY_ROTATION_SPEED};

#[derive(Component)]
pub struct SkyDome;

/// Inside-out sphere around the scene, unlit so lighting never touches it.
pub fn spawn_sky_dome(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.02, 0.02, 0.06),
        unlit: true,
        cull_mode: None,
        ..default()
    });

    commands.spawn((
        Name::new("sky"),
        SkyDome,
        SceneEntity,
        Mesh3d(meshes.add(Sphere::new(SKY_RADIUS).mesh().uv(48, 24))),
        MeshMaterial3d(material),
        Transform::IDENTITY,
    ));
}

pub fn rotate_sky_dome(time: Res<Time>, mut skies: Query<&mut Transform, With<SkyDome>>) {
    let angle = SKY_ROTATION_SPEED * time.delta_secs();
    for mut transform in &mut skies {
        transform.rotate_y(angle);
    }
}
