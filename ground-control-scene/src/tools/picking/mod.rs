//! Screen-space pointer → world-space ray → ordered scene hits.
//!
//! ## Pipeline
//!
//! ```text
//! pointer (px, top-left origin)
//!   └─> NDC: nx = (px/w)*2 - 1, ny = -(py/h)*2 + 1
//!       └─> unproject near (z = 1) and far (z = ε) points, reverse-Z
//!           └─> depth-first traversal of visible nodes
//!               ├─> ray into node-local space (inverse world matrix)
//!               ├─> slab test against local bounds (cheap reject)
//!               └─> triangle test (authoritative)
//! ```
//!
//! Invisible nodes are skipped together with their whole subtree, so a
//! hidden part can never be picked even if its geometry is in front.

/// Ray primitives: slab AABB and Möller–Trumbore triangle tests.
pub mod ray;

use bevy::prelude::*;

use crate::engine::scene::graph::{Geometry, NodeId, SceneGraph};
use crate::error::{SceneError, SceneResult};
use ray::{ray_aabb_hit_t, ray_triangle_hit_t};

/// Viewport size in the same pixel space as pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn validate(self) -> SceneResult<Self> {
        let valid = self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0;
        if valid {
            Ok(self)
        } else {
            Err(SceneError::InvalidViewport {
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Pointer position to normalised device coordinates; y grows upward.
    pub fn to_ndc(self, pointer: Vec2) -> Vec2 {
        Vec2::new(
            (pointer.x / self.width) * 2.0 - 1.0,
            -(pointer.y / self.height) * 2.0 + 1.0,
        )
    }
}

/// Camera matrices needed to unproject a pointer. Uses Bevy's reverse-Z
/// convention: NDC depth 1 is the near plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickCamera {
    pub world_from_view: Mat4,
    pub clip_from_view: Mat4,
}

impl PickCamera {
    pub fn new(world_from_view: Mat4, clip_from_view: Mat4) -> Self {
        Self {
            world_from_view,
            clip_from_view,
        }
    }

    /// Perspective camera at `eye` looking at `target`, built the way Bevy's
    /// `PerspectiveProjection` builds its matrix.
    pub fn perspective(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32, near: f32) -> Self {
        let world_from_view = Transform::from_translation(eye)
            .looking_at(target, Vec3::Y)
            .compute_matrix();
        let clip_from_view = Mat4::perspective_infinite_reverse_rh(fov_y, aspect, near);
        Self::new(world_from_view, clip_from_view)
    }

    /// Ray from the near plane through the given NDC point.
    pub fn ray_through_ndc(&self, ndc: Vec2) -> Option<Ray3d> {
        let world_from_clip = self.world_from_view * self.clip_from_view.inverse();
        let near = world_from_clip.project_point3(ndc.extend(1.0));
        let far = world_from_clip.project_point3(ndc.extend(f32::EPSILON));
        if !near.is_finite() || !far.is_finite() {
            return None;
        }
        let direction = Dir3::new(far - near).ok()?;
        Some(Ray3d::new(near, direction))
    }

    /// Pixel position of a world point, or `None` when it is behind the camera.
    pub fn world_to_viewport(&self, viewport: Viewport, world: Vec3) -> Option<Vec2> {
        let view = self.world_from_view.inverse().transform_point3(world);
        if view.z >= 0.0 {
            return None;
        }
        let ndc = self.clip_from_view.project_point3(view);
        if !ndc.is_finite() {
            return None;
        }
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.width,
            (1.0 - ndc.y) * 0.5 * viewport.height,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    pub distance: f32,
}

/// Hits sorted nearest first. Empty means nothing was under the pointer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickResult {
    hits: Vec<PickHit>,
}

impl PickResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_hits(mut hits: Vec<PickHit>) -> Self {
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Self { hits }
    }

    pub fn nearest(&self) -> Option<PickHit> {
        self.hits.first().copied()
    }

    pub fn hits(&self) -> &[PickHit] {
        &self.hits
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.hits.iter().any(|hit| hit.node == node)
    }
}

/// Picks against the visible scene; an unusable viewport is an error.
pub fn try_pick(
    pointer: Vec2,
    viewport: Viewport,
    camera: &PickCamera,
    graph: &SceneGraph,
) -> SceneResult<PickResult> {
    let viewport = viewport.validate()?;
    let Some(ray) = camera.ray_through_ndc(viewport.to_ndc(pointer)) else {
        return Ok(PickResult::empty());
    };
    Ok(intersect_scene(ray, graph))
}

/// Same as [`try_pick`] but drops the request on an invalid viewport.
pub fn pick(pointer: Vec2, viewport: Viewport, camera: &PickCamera, graph: &SceneGraph) -> PickResult {
    try_pick(pointer, viewport, camera, graph).unwrap_or_else(|err| {
        debug!("Pick dropped: {}", err);
        PickResult::empty()
    })
}

/// Tests the ray against every visible mesh node, descending through groups.
pub fn intersect_scene(ray: Ray3d, graph: &SceneGraph) -> PickResult {
    let origin = ray.origin;
    let direction = ray.direction.as_vec3();
    let mut hits = Vec::new();

    // (node, parent world matrix)
    let mut stack: Vec<(NodeId, Mat4)> = graph
        .roots()
        .iter()
        .rev()
        .map(|&root| (root, Mat4::IDENTITY))
        .collect();

    while let Some((id, parent_world)) = stack.pop() {
        let Some(node) = graph.get(id) else { continue };
        if !node.visible {
            continue;
        }

        let world = parent_world * node.render_transform().compute_matrix();
        if let Some(geometry) = node.geometry.as_deref() {
            if let Some(distance) = intersect_geometry(origin, direction, world, geometry) {
                hits.push(PickHit { node: id, distance });
            }
        }

        stack.extend(node.children().iter().rev().map(|&child| (child, world)));
    }

    PickResult::from_hits(hits)
}

fn intersect_geometry(
    origin: Vec3,
    direction: Vec3,
    world: Mat4,
    geometry: &Geometry,
) -> Option<f32> {
    if world.determinant().abs() <= f32::EPSILON {
        return None;
    }
    let inv = world.inverse();
    let o_local = inv.transform_point3(origin);
    let d_local = inv.transform_vector3(direction);

    // With a unit world direction the local ray parameter is the world distance.
    let (min, max) = geometry.bounds();
    ray_aabb_hit_t(o_local, d_local, min, max)?;

    geometry
        .triangles()
        .filter_map(|tri| ray_triangle_hit_t(o_local, d_local, tri))
        .min_by(f32::total_cmp)
}
