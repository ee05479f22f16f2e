use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::animation::{AnimationClip, LoopMode, TransformTrack};
use super::graph::{Geometry, NodeId, SceneGraph};
use crate::error::{SceneError, SceneResult};
use constants::interaction::{MODEL_ROOT_NAME, RESERVED_NODE_PREFIX};

/// Geometry of a node as written in the scene file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum GeometryDescription {
    Cuboid([f32; 3]),
    Triangles {
        positions: Vec<[f32; 3]>,
        indices: Vec<u32>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDescription {
    /// Unique within the scene. Names starting with `__` are reserved.
    pub name: String,
    #[serde(default)]
    pub translation: [f32; 3],
    /// Quaternion as `[x, y, z, w]`.
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryDescription>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDescription>,
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoopModeDescription {
    #[default]
    Once,
    Repeat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyframeDescription {
    pub time: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackDescription {
    pub target: String,
    pub keyframes: Vec<KeyframeDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipDescription {
    pub name: String,
    pub duration: f32,
    #[serde(default)]
    pub loop_mode: LoopModeDescription,
    #[serde(default)]
    pub tracks: Vec<TrackDescription>,
}

/// Scene file as a Bevy asset, mirroring the JSON layout.
#[derive(Asset, TypePath, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneDescription {
    pub nodes: Vec<NodeDescription>,
    #[serde(default)]
    pub animations: Vec<ClipDescription>,
}

/// A loaded scene: the arena, the synthetic model root that carries the
/// layout transform, and the clips shipped with the asset.
#[derive(Debug, Clone)]
pub struct SceneAsset {
    pub graph: SceneGraph,
    pub root: NodeId,
    pub clips: Vec<AnimationClip>,
}

impl SceneAsset {
    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|clip| clip.name == name)
    }

    /// Removes and returns the named clip.
    pub fn take_clip(&mut self, name: &str) -> Option<AnimationClip> {
        let index = self.clips.iter().position(|clip| clip.name == name)?;
        Some(self.clips.swap_remove(index))
    }
}

impl SceneDescription {
    /// Builds the arena. Every top-level node is parented to a synthetic
    /// model root so layout and whole-model hover have a single target.
    pub fn build(&self) -> SceneResult<SceneAsset> {
        let mut graph = SceneGraph::new();
        let root = graph.add_group(MODEL_ROOT_NAME, Transform::IDENTITY, None)?;

        for node in &self.nodes {
            add_node(&mut graph, node, root)?;
        }

        let clips = self.animations.iter().map(build_clip).collect();
        Ok(SceneAsset { graph, root, clips })
    }
}

fn add_node(graph: &mut SceneGraph, desc: &NodeDescription, parent: NodeId) -> SceneResult<()> {
    if desc.name.starts_with(RESERVED_NODE_PREFIX) {
        return Err(SceneError::ReservedNodeName(desc.name.clone()));
    }
    let transform = Transform {
        translation: Vec3::from_array(desc.translation),
        rotation: Quat::from_array(desc.rotation).normalize(),
        scale: Vec3::from_array(desc.scale),
    };

    let id = match &desc.geometry {
        Some(geometry) => {
            let geometry = build_geometry(&desc.name, geometry)?;
            graph.add_mesh(desc.name.clone(), transform, Arc::new(geometry), Some(parent))?
        }
        None => graph.add_group(desc.name.clone(), transform, Some(parent))?,
    };

    for child in &desc.children {
        add_node(graph, child, id)?;
    }
    Ok(())
}

fn build_geometry(node: &str, desc: &GeometryDescription) -> SceneResult<Geometry> {
    match desc {
        GeometryDescription::Cuboid(size) => {
            let size = Vec3::from_array(*size);
            if !size.is_finite() || size.min_element() <= 0.0 {
                return Err(SceneError::InvalidGeometry {
                    node: node.to_string(),
                    reason: format!("cuboid size {size} must be positive"),
                });
            }
            Ok(Geometry::cuboid(size))
        }
        GeometryDescription::Triangles { positions, indices } => Geometry::new(
            positions.iter().copied().map(Vec3::from_array).collect(),
            indices.clone(),
        )
        .map_err(|reason| SceneError::InvalidGeometry {
            node: node.to_string(),
            reason,
        }),
    }
}

fn build_clip(desc: &ClipDescription) -> AnimationClip {
    let mut clip = AnimationClip::new(desc.name.clone(), desc.duration);
    clip.loop_mode = match desc.loop_mode {
        LoopModeDescription::Once => LoopMode::Once,
        LoopModeDescription::Repeat => LoopMode::Repeat,
    };

    for track_desc in &desc.tracks {
        let mut track = TransformTrack::new(track_desc.target.clone());
        for key in &track_desc.keyframes {
            if let Some(t) = key.translation {
                track.translation.push((key.time, Vec3::from_array(t)));
            }
            if let Some(r) = key.rotation {
                track.rotation.push((key.time, Quat::from_array(r).normalize()));
            }
            if let Some(s) = key.scale {
                track.scale.push((key.time, Vec3::from_array(s)));
            }
        }
        clip = clip.with_track(track);
    }
    clip
}
