use std::collections::HashMap;

use bevy::prelude::*;

use crate::engine::scene::graph::{NodeId, SceneGraph};
use crate::tools::picking::PickResult;
use constants::interaction::{HIT_DISTANCE_EPSILON, HOVER_SCALE_FACTOR};

/// Cursor the host page should show over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorAffordance {
    #[default]
    Default,
    Pointer,
}

impl CursorAffordance {
    pub fn as_css(self) -> &'static str {
        match self {
            CursorAffordance::Default => "default",
            CursorAffordance::Pointer => "pointer",
        }
    }
}

/// What a hover update changed. Empty when the pointer stayed on the same target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoverChange {
    pub entered: Vec<NodeId>,
    pub left: Vec<NodeId>,
    pub cursor: Option<CursorAffordance>,
}

impl HoverChange {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.left.is_empty() && self.cursor.is_none()
    }
}

/// Per-node hover flags. Only hovered nodes have an entry; leaving removes it.
/// Hovered nodes get [`HOVER_SCALE_FACTOR`] written into their hover scale,
/// which multiplies whatever base scale the layout gave them.
#[derive(Debug, Default)]
pub struct HoverTracker {
    hovered: HashMap<NodeId, bool>,
    cursor: CursorAffordance,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> CursorAffordance {
        self.cursor
    }

    pub fn is_hovered(&self, node: NodeId) -> bool {
        self.hovered.get(&node).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.hovered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hovered.is_empty()
    }

    /// Hovered nodes in id order.
    pub fn hovered(&self) -> Vec<NodeId> {
        let mut nodes: Vec<_> = self.hovered.keys().copied().collect();
        nodes.sort();
        nodes
    }

    /// Moves the hover to the target of the nearest hit. `resolve_target`
    /// maps a hit node to the node that should react (a part, or the whole
    /// model). Hits that coincide with the nearest one, same distance and same
    /// world bounds, are hovered alongside it.
    pub fn on_pointer_move(
        &mut self,
        pick: &PickResult,
        graph: &mut SceneGraph,
        resolve_target: impl Fn(&SceneGraph, NodeId) -> NodeId,
    ) -> HoverChange {
        let mut targets = Vec::new();
        if let Some(nearest) = pick.nearest() {
            let bounds = graph.world_bounds(nearest.node);
            for hit in pick.hits() {
                if hit.distance - nearest.distance > HIT_DISTANCE_EPSILON {
                    break;
                }
                if hit.node != nearest.node && graph.world_bounds(hit.node) != bounds {
                    continue;
                }
                let target = resolve_target(&*graph, hit.node);
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
        }

        let left: Vec<_> = self
            .hovered()
            .into_iter()
            .filter(|node| !targets.contains(node))
            .collect();
        for &node in &left {
            self.unhover(node, graph);
        }

        let entered: Vec<_> = targets
            .into_iter()
            .filter(|node| !self.hovered.contains_key(node))
            .collect();
        for &node in &entered {
            self.hovered.insert(node, true);
            graph.set_hover_scale(node, HOVER_SCALE_FACTOR);
        }

        HoverChange {
            entered,
            left,
            cursor: self.refresh_cursor(),
        }
    }

    pub fn on_pointer_leave(&mut self, node: NodeId, graph: &mut SceneGraph) -> HoverChange {
        let left = if self.hovered.contains_key(&node) {
            self.unhover(node, graph);
            vec![node]
        } else {
            Vec::new()
        };
        HoverChange {
            entered: Vec::new(),
            left,
            cursor: self.refresh_cursor(),
        }
    }

    /// Drops every entry and restores the default cursor.
    pub fn clear(&mut self, graph: &mut SceneGraph) -> HoverChange {
        let left = self.hovered();
        for &node in &left {
            self.unhover(node, graph);
        }
        HoverChange {
            entered: Vec::new(),
            left,
            cursor: self.refresh_cursor(),
        }
    }

    fn unhover(&mut self, node: NodeId, graph: &mut SceneGraph) {
        self.hovered.remove(&node);
        graph.set_hover_scale(node, 1.0);
    }

    /// Returns the new cursor if it changed.
    fn refresh_cursor(&mut self) -> Option<CursorAffordance> {
        let cursor = if self.hovered.is_empty() {
            CursorAffordance::Default
        } else {
            CursorAffordance::Pointer
        };
        (std::mem::replace(&mut self.cursor, cursor) != cursor).then_some(cursor)
    }
}
