use std::collections::HashMap;
use std::sync::Arc;

use bevy::prelude::*;

use crate::error::{SceneError, SceneResult};

/// Stable index of a node inside its [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Mesh,
}

/// Local-space triangle list with precomputed axis-aligned bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    min: Vec3,
    max: Vec3,
}

impl Geometry {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Result<Self, String> {
        if positions.is_empty() || indices.is_empty() {
            return Err("geometry has no triangles".to_string());
        }
        if indices.len() % 3 != 0 {
            return Err(format!("index count {} is not a multiple of 3", indices.len()));
        }
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(format!("index {bad} out of range for {} positions", positions.len()));
        }
        if positions.iter().any(|p| !p.is_finite()) {
            return Err("non-finite vertex position".to_string());
        }

        let (min, max) = positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );

        Ok(Self {
            positions,
            indices,
            min,
            max,
        })
    }

    /// Axis-aligned box centred on the local origin.
    pub fn cuboid(size: Vec3) -> Self {
        let he = size * 0.5;
        let positions = vec![
            Vec3::new(-he.x, -he.y, -he.z),
            Vec3::new(he.x, -he.y, -he.z),
            Vec3::new(he.x, he.y, -he.z),
            Vec3::new(-he.x, he.y, -he.z),
            Vec3::new(-he.x, -he.y, he.z),
            Vec3::new(he.x, -he.y, he.z),
            Vec3::new(he.x, he.y, he.z),
            Vec3::new(-he.x, he.y, he.z),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 3, 2, 0, 2, 1, // -z
            4, 5, 6, 4, 6, 7, // +z
            0, 4, 7, 0, 7, 3, // -x
            1, 2, 6, 1, 6, 5, // +x
            0, 1, 5, 0, 5, 4, // -y
            3, 7, 6, 3, 6, 2, // +y
        ];
        Self {
            positions,
            indices,
            min: -he,
            max: he,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.min, self.max)
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            ]
        })
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub geometry: Option<Arc<Geometry>>,
    /// Base transform: asset placement, layout preset or animated pose.
    pub transform: Transform,
    /// Transient multiplier written by the hover tracker.
    pub hover_scale: f32,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Base transform with the hover multiplier folded into the scale.
    pub fn render_transform(&self) -> Transform {
        let mut transform = self.transform;
        transform.scale *= self.hover_scale;
        transform
    }
}

/// Arena holding every node of a loaded scene. The tree is expressed through
/// parent/child ids; the name index lives alongside so there is exactly one
/// source of truth per node.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    by_name: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        parent: Option<NodeId>,
    ) -> SceneResult<NodeId> {
        self.insert(name.into(), NodeKind::Group, None, transform, parent)
    }

    pub fn add_mesh(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        geometry: Arc<Geometry>,
        parent: Option<NodeId>,
    ) -> SceneResult<NodeId> {
        self.insert(name.into(), NodeKind::Mesh, Some(geometry), transform, parent)
    }

    fn insert(
        &mut self,
        name: String,
        kind: NodeKind,
        geometry: Option<Arc<Geometry>>,
        transform: Transform,
        parent: Option<NodeId>,
    ) -> SceneResult<NodeId> {
        if self.by_name.contains_key(&name) {
            return Err(SceneError::DuplicateNodeName(name));
        }
        if let Some(parent) = parent {
            if parent.index() >= self.nodes.len() {
                return Err(SceneError::UnknownNode(format!("#{}", parent.index())));
            }
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SceneNode {
            name: name.clone(),
            kind,
            geometry,
            transform,
            hover_scale: 1.0,
            visible: true,
            parent,
            children: Vec::new(),
        });
        self.by_name.insert(name, id);

        match parent {
            Some(parent) => self.nodes[parent.index()].children.push(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.index())
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|node| node.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Parent chain, starting at the node's direct parent.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(id).and_then(SceneNode::parent), |&current| {
            self.get(current).and_then(SceneNode::parent)
        })
    }

    /// Root of the tree containing `id`.
    pub fn top_level(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Pre-order listing of `id` and all of its descendants.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Mesh children of every group strictly below `root`.
    pub fn group_parts(&self, root: NodeId) -> Vec<NodeId> {
        self.subtree(root)
            .into_iter()
            .filter(|&id| id != root)
            .filter_map(|id| self.get(id).filter(|node| node.kind == NodeKind::Group))
            .flat_map(|group| group.children.iter().copied())
            .filter(|&child| {
                self.get(child)
                    .is_some_and(|node| node.kind == NodeKind::Mesh)
            })
            .collect()
    }

    /// A node is rendered and pickable only if it and every ancestor is visible.
    pub fn is_visible_in_tree(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|node| node.visible)
            && self
                .ancestors(id)
                .all(|ancestor| self.nodes[ancestor.index()].visible)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.get_mut(id) {
            node.visible = visible;
        }
    }

    pub fn set_hover_scale(&mut self, id: NodeId, factor: f32) {
        if let Some(node) = self.get_mut(id) {
            node.hover_scale = factor;
        }
    }

    /// World matrix including every hover multiplier along the chain.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let Some(node) = self.get(id) else {
            return Mat4::IDENTITY;
        };
        let local = node.render_transform().compute_matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    /// World-space axis-aligned bounds of a node's own geometry.
    pub fn world_bounds(&self, id: NodeId) -> Option<(Vec3, Vec3)> {
        let geometry = self.get(id)?.geometry.as_ref()?;
        let world = self.world_matrix(id);
        let (min, max) = geometry.bounds();

        let corners = [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(min.x, max.y, max.z),
            Vec3::new(max.x, max.y, max.z),
        ];
        Some(corners.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(lo, hi), corner| {
                let p = world.transform_point3(*corner);
                (lo.min(p), hi.max(p))
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Arc<Geometry> {
        Arc::new(Geometry::cuboid(Vec3::ONE))
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut graph = SceneGraph::new();
        graph.add_group("root", Transform::IDENTITY, None).unwrap();
        let err = graph
            .add_group("root", Transform::IDENTITY, None)
            .unwrap_err();
        assert_eq!(err, SceneError::DuplicateNodeName("root".into()));
    }

    #[test]
    fn hidden_ancestor_hides_descendants() {
        let mut graph = SceneGraph::new();
        let root = graph.add_group("root", Transform::IDENTITY, None).unwrap();
        let group = graph
            .add_group("group", Transform::IDENTITY, Some(root))
            .unwrap();
        let part = graph
            .add_mesh("part", Transform::IDENTITY, unit_box(), Some(group))
            .unwrap();

        assert!(graph.is_visible_in_tree(part));
        graph.set_visible(group, false);
        assert!(!graph.is_visible_in_tree(part));
        assert!(graph.is_visible_in_tree(root));
    }

    #[test]
    fn group_parts_skips_the_root_and_non_mesh_children() {
        let mut graph = SceneGraph::new();
        let root = graph.add_group("root", Transform::IDENTITY, None).unwrap();
        let body = graph
            .add_mesh("body", Transform::IDENTITY, unit_box(), Some(root))
            .unwrap();
        let group = graph
            .add_group("parts", Transform::IDENTITY, Some(root))
            .unwrap();
        let a = graph
            .add_mesh("a", Transform::IDENTITY, unit_box(), Some(group))
            .unwrap();
        graph
            .add_group("nested", Transform::IDENTITY, Some(group))
            .unwrap();
        let b = graph
            .add_mesh("b", Transform::IDENTITY, unit_box(), Some(group))
            .unwrap();

        let parts = graph.group_parts(root);
        assert_eq!(parts, vec![a, b]);
        assert!(!parts.contains(&body));
        assert_eq!(graph.top_level(b), root);
    }

    #[test]
    fn world_matrix_composes_parent_scale_and_hover() {
        let mut graph = SceneGraph::new();
        let root = graph
            .add_group("root", Transform::from_scale(Vec3::splat(10.0)), None)
            .unwrap();
        let part = graph
            .add_mesh(
                "part",
                Transform::from_xyz(1.0, 0.0, 0.0),
                unit_box(),
                Some(root),
            )
            .unwrap();

        let centre = graph.world_matrix(part).transform_point3(Vec3::ZERO);
        assert!((centre - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-5);

        graph.set_hover_scale(root, 1.1);
        let (min, max) = graph.world_bounds(part).unwrap();
        assert!(((max.x - min.x) - 11.0).abs() < 1e-4);
    }

    #[test]
    fn geometry_validation() {
        assert!(Geometry::new(vec![Vec3::ZERO; 3], vec![0, 1]).is_err());
        assert!(Geometry::new(vec![Vec3::ZERO; 3], vec![0, 1, 3]).is_err());
        let tri = Geometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2]).unwrap();
        assert_eq!(tri.bounds(), (Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0)));
        assert_eq!(tri.triangles().count(), 1);
    }
}
