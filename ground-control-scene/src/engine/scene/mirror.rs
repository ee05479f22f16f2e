use std::collections::HashMap;
use std::sync::Arc;

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;

use super::graph::{Geometry, NodeId, SceneGraph};
use super::mount::{ActiveScene, SceneEntity};

/// Render entity standing in for one mesh node of the arena.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneNodeMirror(pub NodeId);

/// Flat, non-indexed triangle list with per-face normals.
pub fn geometry_to_mesh(geometry: &Geometry) -> Mesh {
    let positions: Vec<[f32; 3]> = geometry
        .triangles()
        .flat_map(|tri| tri.map(|p| p.to_array()))
        .collect();

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_computed_flat_normals()
}

/// Spawns one flat entity per mesh node. The arena stays authoritative:
/// transforms and visibility are copied over every frame.
pub fn spawn_scene_mirror(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    graph: &SceneGraph,
) -> usize {
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.78, 0.8, 0.85),
        metallic: 0.6,
        perceptual_roughness: 0.35,
        ..default()
    });

    // Shared geometry gets one mesh asset.
    let mut mesh_handles: HashMap<*const Geometry, Handle<Mesh>> = HashMap::new();
    let mut spawned = 0;

    for (id, node) in graph.iter() {
        let Some(geometry) = node.geometry.as_ref() else {
            continue;
        };
        let mesh = mesh_handles
            .entry(Arc::as_ptr(geometry))
            .or_insert_with(|| meshes.add(geometry_to_mesh(geometry)))
            .clone();

        commands.spawn((
            Name::new(node.name.clone()),
            SceneNodeMirror(id),
            SceneEntity,
            Mesh3d(mesh),
            MeshMaterial3d(material.clone()),
            Transform::from_matrix(graph.world_matrix(id)),
            visibility_for(graph, id),
        ));
        spawned += 1;
    }
    spawned
}

fn visibility_for(graph: &SceneGraph, id: NodeId) -> Visibility {
    if graph.is_visible_in_tree(id) {
        Visibility::Visible
    } else {
        Visibility::Hidden
    }
}

pub fn sync_scene_mirror(
    scene: Option<Res<ActiveScene>>,
    mut mirrors: Query<(&SceneNodeMirror, &mut Transform, &mut Visibility)>,
) {
    let Some(active) = scene else {
        return;
    };
    let graph = active.scene.graph();

    for (mirror, mut transform, mut visibility) in &mut mirrors {
        let world = Transform::from_matrix(graph.world_matrix(mirror.0));
        if *transform != world {
            *transform = world;
        }
        let wanted = visibility_for(graph, mirror.0);
        if *visibility != wanted {
            *visibility = wanted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_mesh_has_three_vertices_per_triangle() {
        let mesh = geometry_to_mesh(&Geometry::cuboid(Vec3::ONE));
        assert_eq!(mesh.count_vertices(), 36);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
    }

    #[test]
    fn hidden_ancestor_hides_the_mirror() {
        let mut graph = SceneGraph::new();
        let group = graph.add_group("group", Transform::IDENTITY, None).unwrap();
        let part = graph
            .add_mesh("part", Transform::IDENTITY, Arc::new(Geometry::cuboid(Vec3::ONE)), Some(group))
            .unwrap();

        assert_eq!(visibility_for(&graph, part), Visibility::Visible);
        graph.set_visible(group, false);
        assert_eq!(visibility_for(&graph, part), Visibility::Hidden);
    }
}
