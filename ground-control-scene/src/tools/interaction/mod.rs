//! Window input → scene interaction, once per frame.
//!
//! ## Frame order
//!
//! ```text
//! collect_pointer_input    WindowEvent: move / left press / leave → PointerEvent (arrival order)
//!   └─> sync_pick_camera   Camera + GlobalTransform → PickCameraState
//!       └─> track_viewport WindowResized → ViewportInfo + layout
//!           └─> advance_reveal_animation
//!               └─> process_pointer_events   pick, hover, commit, navigate
//!                   └─> sync_scene_mirror    arena → render entities
//! ```
//!
//! The reveal advances before pointer processing, so a reveal completing in
//! a frame is already visible to that frame's picks. Intake systems only
//! forward while the mounted scene holds its listener subscriptions.

/// Scoped listener registry and RAII subscription guards.
pub mod subscription;

use bevy::prelude::*;
use bevy::input::ButtonState;
use bevy::window::{PrimaryWindow, SystemCursorIcon, WindowEvent, WindowResized};
use bevy::winit::cursor::CursorIcon;

use crate::engine::camera::scene_camera::SceneCamera;
use crate::engine::core::app_state::AppState;
use crate::engine::scene::mirror::sync_scene_mirror;
use crate::engine::scene::mount::ActiveScene;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::hover::{CursorAffordance, HoverChange};
use crate::tools::navigation::{RecordingRouter, RouteChanged, Router};
use crate::tools::picking::{PickCamera, Viewport};
use constants::render_settings::{CAMERA_FOV_DEGREES, CAMERA_NEAR, CAMERA_POSITION};
use subscription::{ListenerKind, ListenerRegistry};

/// Pointer input in window pixels, top-left origin.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move(Vec2),
    Click(Vec2),
    Leave,
}

/// Logical size of the primary window. Zero until the window reports in,
/// which makes picks drop as invalid.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportInfo {
    pub width: f32,
    pub height: f32,
}

impl ViewportInfo {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

/// Camera matrices used for picking, refreshed every frame.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PickCameraState(pub PickCamera);

impl Default for PickCameraState {
    fn default() -> Self {
        Self(PickCamera::perspective(
            CAMERA_POSITION,
            Vec3::ZERO,
            CAMERA_FOV_DEGREES.to_radians(),
            1.0,
            CAMERA_NEAR,
        ))
    }
}

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ListenerRegistry>()
            .init_resource::<ViewportInfo>()
            .init_resource::<PickCameraState>()
            .add_event::<PointerEvent>()
            .add_event::<RouteChanged>()
            .add_systems(
                Update,
                (
                    collect_pointer_input,
                    sync_pick_camera,
                    track_viewport,
                    advance_reveal_animation,
                    process_pointer_events,
                    sync_scene_mirror,
                )
                    .chain()
                    .run_if(in_state(AppState::Running)),
            );
    }
}

/// Forwards window input as [`PointerEvent`]s in the order it arrived. A
/// click takes the latest position seen before it, or the window's cursor
/// position when no move has been seen yet.
pub fn collect_pointer_input(
    registry: Res<ListenerRegistry>,
    mut window_events: EventReader<WindowEvent>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut last_position: Local<Option<Vec2>>,
    mut pointer_events: EventWriter<PointerEvent>,
) {
    if !registry.is_listening(ListenerKind::Pointer) {
        window_events.clear();
        return;
    }

    for event in window_events.read() {
        match event {
            WindowEvent::CursorMoved(moved) => {
                *last_position = Some(moved.position);
                pointer_events.write(PointerEvent::Move(moved.position));
            }
            WindowEvent::MouseButtonInput(input)
                if input.button == MouseButton::Left && input.state == ButtonState::Pressed =>
            {
                let position = last_position.or_else(|| {
                    windows
                        .single()
                        .ok()
                        .and_then(|window| window.cursor_position())
                });
                if let Some(position) = position {
                    pointer_events.write(PointerEvent::Click(position));
                }
            }
            WindowEvent::CursorLeft(_) => {
                *last_position = None;
                pointer_events.write(PointerEvent::Leave);
            }
            _ => {}
        }
    }
}

pub fn sync_pick_camera(
    cameras: Query<(&Camera, &GlobalTransform), With<SceneCamera>>,
    mut pick_camera: ResMut<PickCameraState>,
) {
    let Ok((camera, transform)) = cameras.single() else {
        return;
    };
    let clip_from_view = camera.clip_from_view();
    // Projection is not computed until the camera has been through one frame.
    if clip_from_view.determinant().abs() <= f32::EPSILON {
        return;
    }
    pick_camera.0 = PickCamera::new(transform.compute_matrix(), clip_from_view);
}

pub fn track_viewport(
    registry: Res<ListenerRegistry>,
    mut resized: EventReader<WindowResized>,
    mut viewport: ResMut<ViewportInfo>,
    scene: Option<ResMut<ActiveScene>>,
) {
    if !registry.is_listening(ListenerKind::Resize) {
        resized.clear();
        return;
    }
    let Some(latest) = resized.read().last() else {
        return;
    };

    viewport.width = latest.width;
    viewport.height = latest.height;
    if let Some(mut active) = scene {
        active.scene.resize(latest.width);
    }
}

pub fn advance_reveal_animation(
    time: Res<Time>,
    scene: Option<ResMut<ActiveScene>>,
    rpc: Option<ResMut<WebRpcInterface>>,
) {
    let Some(mut active) = scene else {
        return;
    };
    if active.scene.advance(time.delta_secs()) {
        info!("✓ Reveal completed, sub-components are interactive");
        if let Some(mut rpc) = rpc {
            rpc.send_notification("reveal_completed", serde_json::json!({}));
        }
    }
}

pub fn process_pointer_events(
    mut commands: Commands,
    mut pointer_events: EventReader<PointerEvent>,
    scene: Option<ResMut<ActiveScene>>,
    viewport: Res<ViewportInfo>,
    pick_camera: Res<PickCameraState>,
    mut rpc: Option<ResMut<WebRpcInterface>>,
    mut route_events: EventWriter<RouteChanged>,
    windows: Query<Entity, With<PrimaryWindow>>,
) {
    // Nothing mounted: drop input without touching any scene logic.
    let Some(mut active) = scene else {
        pointer_events.clear();
        return;
    };

    for &event in pointer_events.read() {
        let mut router = RecordingRouter::default();
        let outcome =
            active
                .scene
                .handle_pointer(event, viewport.viewport(), &pick_camera.0, &mut router);

        // Hover reset reaches the host before the route change.
        if !outcome.hover.is_empty() {
            notify_hover(&outcome.hover, &active, rpc.as_deref_mut());
        }
        if let Some(cursor) = outcome.hover.cursor {
            if let Ok(window) = windows.single() {
                commands.entity(window).insert(cursor_icon(cursor));
            }
        }

        for route in router.routes {
            if let Some(rpc) = rpc.as_deref_mut() {
                rpc.navigate_to(&route);
            }
            route_events.write(RouteChanged { route });
        }
    }
}

fn notify_hover(change: &HoverChange, active: &ActiveScene, rpc: Option<&mut WebRpcInterface>) {
    let Some(rpc) = rpc else {
        return;
    };
    if !change.entered.is_empty() || !change.left.is_empty() {
        rpc.send_notification(
            "hover_changed",
            serde_json::json!({ "hovered": active.scene.hovered_names() }),
        );
    }
    if let Some(cursor) = change.cursor {
        rpc.send_notification(
            "cursor_changed",
            serde_json::json!({ "cursor": cursor.as_css() }),
        );
    }
}

fn cursor_icon(cursor: CursorAffordance) -> CursorIcon {
    match cursor {
        CursorAffordance::Default => CursorIcon::from(SystemCursorIcon::Default),
        CursorAffordance::Pointer => CursorIcon::from(SystemCursorIcon::Pointer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::dashboard_manifest::{InteractionMode, SceneConfig};
    use crate::engine::scene::description::SceneDescription;
    use crate::engine::scene::mount::DashboardScene;
    use bevy::ecs::event::Events;
    use bevy::input::mouse::MouseButtonInput;
    use bevy::window::{CursorLeft, CursorMoved};

    const SCENE: &str = r#"{
        "nodes": [
            { "name": "Parts", "children": [
                { "name": "part11-1_-_Part_2", "geometry": { "cuboid": [0.2, 0.2, 0.2] } }
            ] }
        ],
        "animations": [ { "name": "Timeline", "duration": 0.5 } ]
    }"#;

    fn app(interaction: InteractionMode) -> App {
        let asset = serde_json::from_str::<SceneDescription>(SCENE)
            .unwrap()
            .build()
            .unwrap();
        let mut config = SceneConfig::default();
        config.layout.position = Vec3::ZERO;
        config.interaction = interaction;

        let registry = ListenerRegistry::default();
        let scene = DashboardScene::mount(asset, &config, 1024.0);

        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<WindowEvent>()
            .add_event::<PointerEvent>()
            .add_event::<RouteChanged>()
            .insert_resource(ViewportInfo {
                width: 1024.0,
                height: 1024.0,
            })
            .insert_resource(PickCameraState::default())
            .insert_resource(ActiveScene::new(scene, &registry))
            .insert_resource(registry)
            .add_systems(Update, (collect_pointer_input, process_pointer_events).chain());
        app
    }

    fn moved(x: f32, y: f32) -> WindowEvent {
        WindowEvent::CursorMoved(CursorMoved {
            window: Entity::PLACEHOLDER,
            position: Vec2::new(x, y),
            delta: None,
        })
    }

    fn left_press() -> WindowEvent {
        WindowEvent::MouseButtonInput(MouseButtonInput {
            button: MouseButton::Left,
            state: ButtonState::Pressed,
            window: Entity::PLACEHOLDER,
        })
    }

    fn cursor_left() -> WindowEvent {
        WindowEvent::CursorLeft(CursorLeft {
            window: Entity::PLACEHOLDER,
        })
    }

    fn send_window_events(app: &mut App, events: impl IntoIterator<Item = WindowEvent>) {
        for event in events {
            app.world_mut().send_event(event);
        }
        app.update();
    }

    fn routes(app: &mut App) -> Vec<String> {
        app.world_mut()
            .resource_mut::<Events<RouteChanged>>()
            .drain()
            .map(|event| event.route)
            .collect()
    }

    #[test]
    fn click_on_a_mapped_part_emits_a_route() {
        let mut app = app(InteractionMode::Always);
        app.world_mut()
            .send_event(PointerEvent::Click(Vec2::new(512.0, 512.0)));
        app.update();
        assert_eq!(routes(&mut app), vec!["/solar".to_string()]);
    }

    #[test]
    fn moves_hover_and_leave_clears() {
        let mut app = app(InteractionMode::Always);
        app.world_mut()
            .send_event(PointerEvent::Move(Vec2::new(512.0, 512.0)));
        app.update();
        let hovered = app.world().resource::<ActiveScene>().scene.hovered_names();
        assert_eq!(hovered, vec!["part11-1_-_Part_2".to_string()]);

        app.world_mut().send_event(PointerEvent::Leave);
        app.update();
        assert!(app.world().resource::<ActiveScene>().scene.hover().is_empty());
    }

    #[test]
    fn unmounted_scene_ignores_input() {
        let mut app = app(InteractionMode::Always);
        app.world_mut().remove_resource::<ActiveScene>();
        assert!(!app
            .world()
            .resource::<ListenerRegistry>()
            .is_listening(ListenerKind::Pointer));

        app.world_mut()
            .send_event(PointerEvent::Click(Vec2::new(512.0, 512.0)));
        app.update();
        assert!(routes(&mut app).is_empty());
    }

    #[test]
    fn reentry_after_leave_in_one_frame_keeps_hover() {
        let mut app = app(InteractionMode::Always);
        send_window_events(&mut app, [moved(512.0, 512.0)]);
        send_window_events(&mut app, [cursor_left(), moved(512.0, 512.0)]);

        let hovered = app.world().resource::<ActiveScene>().scene.hovered_names();
        assert_eq!(hovered, vec!["part11-1_-_Part_2".to_string()]);
    }

    #[test]
    fn click_uses_the_position_before_it() {
        let mut app = app(InteractionMode::Always);
        send_window_events(&mut app, [moved(512.0, 512.0), left_press(), moved(5.0, 5.0)]);

        assert_eq!(routes(&mut app), vec!["/solar".to_string()]);
        assert!(app.world().resource::<ActiveScene>().scene.hover().is_empty());
    }

    #[test]
    fn click_without_moves_uses_the_window_cursor() {
        let mut app = app(InteractionMode::Always);
        let mut window = Window::default();
        window.set_cursor_position(Some(Vec2::new(512.0, 512.0)));
        app.world_mut().spawn((window, PrimaryWindow));

        send_window_events(&mut app, [left_press()]);
        assert_eq!(routes(&mut app), vec!["/solar".to_string()]);
    }
}
