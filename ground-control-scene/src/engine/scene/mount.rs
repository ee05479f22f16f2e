//! A mounted dashboard scene: the arena plus every controller that touches it.
//!
//! [`DashboardScene`] is plain data and can be driven without an `App`.
//! [`ActiveScene`] is the resource wrapper that also holds the input
//! subscriptions, so removing the resource tears both down together.

use bevy::prelude::*;
use serde::Serialize;

use super::description::SceneAsset;
use super::graph::{NodeId, SceneGraph};
use crate::engine::assets::dashboard_manifest::{InteractionMode, SceneConfig};
use crate::error::SceneError;
use crate::tools::hover::{CursorAffordance, HoverChange, HoverTracker};
use crate::tools::interaction::PointerEvent;
use crate::tools::interaction::subscription::{ListenerKind, ListenerRegistry, Subscription};
use crate::tools::layout::{LayoutPolicy, LayoutTransform, ViewportClass};
use crate::tools::navigation::{NavigationTable, Router};
use crate::tools::picking::{PickCamera, PickResult, Viewport, pick};
use crate::tools::reveal::{CommitOutcome, RevealAnimationController, RevealPhase};

/// Everything one pointer event caused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionOutcome {
    pub hover: HoverChange,
    pub commit: Option<CommitOutcome>,
    pub route: Option<String>,
}

#[derive(Debug)]
pub struct DashboardScene {
    graph: SceneGraph,
    root: NodeId,
    reveal: RevealAnimationController,
    /// Parts that react to hover individually.
    parts: Vec<NodeId>,
    hover: HoverTracker,
    navigation: NavigationTable,
    navigation_error: Option<SceneError>,
    layout: LayoutPolicy,
    viewport_width: f32,
}

impl DashboardScene {
    /// Consumes a loaded asset. The reveal clip moves into the controller and
    /// the model root takes the layout transform for `viewport_width`.
    pub fn mount(mut asset: SceneAsset, config: &SceneConfig, viewport_width: f32) -> Self {
        let clip = asset.take_clip(&config.reveal_clip);
        if clip.is_none() {
            let err = SceneError::MissingAnimationClip(config.reveal_clip.clone());
            warn!("{}, sub-components stay hidden", err);
        }

        let mut graph = asset.graph;
        let parts = revealed_set(&graph, asset.root, config.revealed.as_deref());
        let revealed = match config.interaction {
            InteractionMode::Gated => parts.clone(),
            InteractionMode::Always => Vec::new(),
        };
        let reveal = RevealAnimationController::new(clip, revealed, &mut graph);

        let mut scene = Self {
            graph,
            root: asset.root,
            reveal,
            parts,
            hover: HoverTracker::new(),
            navigation: config.navigation.clone(),
            navigation_error: config.navigation_error.clone(),
            layout: config.layout,
            viewport_width,
        };
        scene.resize(viewport_width);

        info!(
            "✓ Scene mounted: {} nodes, {} parts, {} hidden until reveal",
            scene.graph.len(),
            scene.parts.len(),
            scene.reveal.revealed().len()
        );
        scene
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn reveal(&self) -> &RevealAnimationController {
        &self.reveal
    }

    pub fn parts(&self) -> &[NodeId] {
        &self.parts
    }

    pub fn hover(&self) -> &HoverTracker {
        &self.hover
    }

    pub fn navigation(&self) -> &NavigationTable {
        &self.navigation
    }

    pub fn viewport_class(&self) -> ViewportClass {
        self.layout.classify(self.viewport_width)
    }

    /// Re-applies the layout for a new width. Hover stays multiplicative
    /// because it lives in a separate factor on the node.
    pub fn resize(&mut self, viewport_width: f32) -> LayoutTransform {
        let layout = self.layout.compute_transform(viewport_width);
        if self.layout.classify(viewport_width) != self.layout.classify(self.viewport_width) {
            info!(
                "→ Layout {:?} → {:?} at {}px",
                self.viewport_class(),
                self.layout.classify(viewport_width),
                viewport_width
            );
        }
        self.viewport_width = viewport_width;
        if let Some(root) = self.graph.get_mut(self.root) {
            root.transform = layout.into();
        }
        layout
    }

    /// Advances the reveal. Returns `true` on the frame it completes.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.reveal.advance(dt, &mut self.graph)
    }

    pub fn pick(&self, pointer: Vec2, viewport: Viewport, camera: &PickCamera) -> PickResult {
        pick(pointer, viewport, camera, &self.graph)
    }

    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        viewport: Viewport,
        camera: &PickCamera,
        router: &mut dyn Router,
    ) -> InteractionOutcome {
        match event {
            PointerEvent::Move(position) => {
                let pick = self.pick(position, viewport, camera);
                InteractionOutcome {
                    hover: self.update_hover(&pick),
                    ..default()
                }
            }
            PointerEvent::Click(position) => self.click(position, viewport, camera, router),
            PointerEvent::Leave => InteractionOutcome {
                hover: self.hover.clear(&mut self.graph),
                ..default()
            },
        }
    }

    fn update_hover(&mut self, pick: &PickResult) -> HoverChange {
        let parts = &self.parts;
        let root = self.root;
        self.hover.on_pointer_move(pick, &mut self.graph, |graph, node| {
            interactive_target(graph, parts, root, node)
        })
    }

    /// Fresh pick at the click position. Any hit on the model commits the
    /// reveal; a hit that resolves to a route clears hover, then navigates.
    fn click(
        &mut self,
        position: Vec2,
        viewport: Viewport,
        camera: &PickCamera,
        router: &mut dyn Router,
    ) -> InteractionOutcome {
        let pick = self.pick(position, viewport, camera);
        let Some(nearest) = pick.nearest() else {
            return InteractionOutcome::default();
        };

        let commit = self.reveal.commit();
        if commit == CommitOutcome::Started {
            info!("→ Reveal started");
        }

        let route = std::iter::once(nearest.node)
            .chain(self.graph.ancestors(nearest.node))
            .filter_map(|id| self.graph.name(id))
            .find_map(|name| self.navigation.resolve(name))
            .map(str::to_string);

        let mut hover = HoverChange::default();
        if let Some(route) = &route {
            hover = self.hover.clear(&mut self.graph);
            info!("→ Navigating to {}", route);
            router.navigate_to(route);
        }

        InteractionOutcome {
            hover,
            commit: Some(commit),
            route,
        }
    }

    pub fn status(&self) -> SceneStatus {
        let phase = match self.reveal.phase() {
            RevealPhase::Idle => "idle",
            RevealPhase::Playing { .. } => "playing",
            RevealPhase::Completed => "completed",
        };
        SceneStatus {
            mounted: true,
            reveal_phase: phase.to_string(),
            reveal_degraded: self.reveal.is_degraded(),
            interactive: self.reveal.gate().is_open() || self.reveal.revealed().is_empty(),
            hovered: self.hovered_names(),
            cursor: self.hover.cursor().as_css().to_string(),
            viewport_class: match self.viewport_class() {
                ViewportClass::Narrow => "narrow",
                ViewportClass::Wide => "wide",
            }
            .to_string(),
            navigation_error: self.navigation_error.as_ref().map(ToString::to_string),
        }
    }

    pub fn hovered_names(&self) -> Vec<String> {
        self.hover
            .hovered()
            .into_iter()
            .filter_map(|id| self.graph.name(id).map(str::to_string))
            .collect()
    }

    pub fn cursor(&self) -> CursorAffordance {
        self.hover.cursor()
    }
}

/// Part under the pointer, else the part containing it, else the whole model.
fn interactive_target(graph: &SceneGraph, parts: &[NodeId], root: NodeId, node: NodeId) -> NodeId {
    std::iter::once(node)
        .chain(graph.ancestors(node))
        .find(|id| parts.contains(id))
        .unwrap_or(root)
}

/// Configured names, or every mesh child of a group when none are given.
fn revealed_set(graph: &SceneGraph, root: NodeId, names: Option<&[String]>) -> Vec<NodeId> {
    match names {
        Some(names) => names
            .iter()
            .filter_map(|name| {
                let id = graph.find(name);
                if id.is_none() {
                    warn!("{}, not revealed", SceneError::UnknownNode(name.clone()));
                }
                id
            })
            .collect(),
        None => graph.group_parts(root),
    }
}

/// Snapshot reported to the host through `get_scene_status`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SceneStatus {
    pub mounted: bool,
    pub reveal_phase: String,
    pub reveal_degraded: bool,
    pub interactive: bool,
    pub hovered: Vec<String>,
    pub cursor: String,
    pub viewport_class: String,
    pub navigation_error: Option<String>,
}

impl SceneStatus {
    pub fn unmounted() -> Self {
        Self {
            mounted: false,
            reveal_phase: "idle".to_string(),
            reveal_degraded: false,
            interactive: false,
            hovered: Vec::new(),
            cursor: CursorAffordance::Default.as_css().to_string(),
            viewport_class: String::new(),
            navigation_error: None,
        }
    }
}

/// The mounted scene plus the listeners it holds. Removing this resource is
/// the unmount: the reveal can no longer complete and the listeners drop.
#[derive(Resource)]
pub struct ActiveScene {
    pub scene: DashboardScene,
    subscriptions: Vec<Subscription>,
}

impl ActiveScene {
    pub fn new(scene: DashboardScene, registry: &ListenerRegistry) -> Self {
        Self {
            scene,
            subscriptions: vec![
                registry.subscribe(ListenerKind::Pointer),
                registry.subscribe(ListenerKind::Resize),
            ],
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

/// Marker on every entity spawned for the mounted scene.
#[derive(Component)]
pub struct SceneEntity;

/// Removes the scene and despawns everything spawned for it.
pub fn unmount_scene(commands: &mut Commands, entities: impl IntoIterator<Item = Entity>) {
    commands.remove_resource::<ActiveScene>();
    for entity in entities {
        commands.entity(entity).despawn();
    }
    info!("→ Scene unmounted");
}

/// Host request to tear the scene down.
#[derive(Event, Debug, Clone, Copy)]
pub struct UnmountSceneRequest;

pub fn handle_unmount_requests(
    mut commands: Commands,
    mut requests: EventReader<UnmountSceneRequest>,
    scene: Option<Res<ActiveScene>>,
    entities: Query<Entity, With<SceneEntity>>,
) {
    if requests.read().count() == 0 {
        return;
    }
    if scene.is_none() {
        debug!("Unmount requested with no scene mounted");
        return;
    }
    unmount_scene(&mut commands, &entities);
}
