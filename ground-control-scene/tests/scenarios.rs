use bevy::ecs::event::Events;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::window::{WindowEvent, WindowResized};

use constants::layout::{MODEL_POSITION, MODEL_ROTATION_EULER, NARROW_MODEL_SCALE, WIDE_MODEL_SCALE};
use ground_control_scene::engine::assets::dashboard_manifest::{DashboardManifest, SceneConfig};
use ground_control_scene::engine::core::app_state::{AppState, transition_to_unavailable};
use ground_control_scene::engine::loading::progress::LoadingProgress;
use ground_control_scene::engine::scene::description::{SceneAsset, SceneDescription};
use ground_control_scene::engine::scene::mount::{ActiveScene, DashboardScene};
use ground_control_scene::error::SceneError;
use ground_control_scene::rpc::web_rpc::WebRpcInterface;
use ground_control_scene::tools::hover::CursorAffordance;
use ground_control_scene::tools::interaction::subscription::{ListenerKind, ListenerRegistry};
use ground_control_scene::tools::interaction::{InteractionPlugin, PointerEvent};
use ground_control_scene::tools::layout::ViewportClass;
use ground_control_scene::tools::navigation::{RecordingRouter, RouteChanged};
use ground_control_scene::tools::picking::{PickCamera, Viewport, pick};
use ground_control_scene::tools::reveal::{CommitOutcome, RevealPhase};

const SCENE: &str = include_str!("../assets/scenes/satellite.scene.json");
const MANIFEST: &str = include_str!("../assets/dashboard.manifest.json");

const VIEWPORT: Viewport = Viewport {
    width: 1024.0,
    height: 768.0,
};
const EMPTY_SPACE: Vec2 = Vec2::new(5.0, 5.0);

fn asset() -> SceneAsset {
    serde_json::from_str::<SceneDescription>(SCENE)
        .unwrap()
        .build()
        .unwrap()
}

/// The shipped manifest as the dashboard loads it, layout untouched.
fn config() -> SceneConfig {
    let manifest: DashboardManifest = serde_json::from_str(MANIFEST).unwrap();
    manifest.to_config()
}

/// The scene camera with the aspect of a 1024x768 canvas.
fn camera() -> PickCamera {
    PickCamera::perspective(
        Vec3::new(0.0, 0.0, 5.0),
        Vec3::ZERO,
        45f32.to_radians(),
        VIEWPORT.width / VIEWPORT.height,
        0.01,
    )
}

/// Pixel under the centre of a node's world bounds.
fn screen_position(scene: &DashboardScene, name: &str) -> Vec2 {
    let node = scene.graph().find(name).unwrap();
    let (min, max) = scene.graph().world_bounds(node).unwrap();
    camera().world_to_viewport(VIEWPORT, (min + max) * 0.5).unwrap()
}

fn click(scene: &mut DashboardScene, router: &mut RecordingRouter, at: Vec2) -> Option<String> {
    scene
        .handle_pointer(PointerEvent::Click(at), VIEWPORT, &camera(), router)
        .route
}

fn revealed_scene() -> DashboardScene {
    let mut scene = DashboardScene::mount(asset(), &config(), VIEWPORT.width);
    let mut router = RecordingRouter::default();
    let body = screen_position(&scene, "Body");
    click(&mut scene, &mut router, body);
    assert!(scene.advance(5.0));
    scene
}

#[test]
fn shipped_assets_are_consistent() {
    let asset = asset();
    let config = config();
    assert!(config.navigation_error.is_none());

    for rule in config.navigation.rules() {
        for node in &rule.nodes {
            assert!(asset.graph.find(node).is_some(), "{node} missing from scene");
        }
    }
    let clip = asset.clip(&config.reveal_clip).unwrap();
    for target in clip.targets() {
        assert!(asset.graph.find(target).is_some(), "{target} missing from scene");
    }
}

#[test]
fn shipped_layout_places_the_model_off_centre() {
    let scene = DashboardScene::mount(asset(), &config(), VIEWPORT.width);
    let root = scene.graph().get(scene.root()).unwrap();
    let [x, y, z] = MODEL_ROTATION_EULER;

    assert_eq!(root.transform.translation, MODEL_POSITION);
    assert!(root.transform.rotation.angle_between(Quat::from_euler(EulerRot::XYZ, x, y, z)) < 1e-5);
    assert_eq!(root.transform.scale, WIDE_MODEL_SCALE);
}

#[test]
fn every_routed_part_is_clickable_after_the_reveal() {
    let mut scene = revealed_scene();
    let rules = scene.navigation().rules().to_vec();
    let mut clicked = 0;

    for rule in &rules {
        for node in &rule.nodes {
            let at = screen_position(&scene, node);
            assert!(
                at.x > 0.0 && at.x < VIEWPORT.width && at.y > 0.0 && at.y < VIEWPORT.height,
                "{node} projects off-screen at {at}"
            );

            let nearest = scene.pick(at, VIEWPORT, &camera()).nearest().unwrap();
            assert_eq!(scene.graph().name(nearest.node), Some(node.as_str()), "{node} is covered");

            let mut router = RecordingRouter::default();
            assert_eq!(click(&mut scene, &mut router, at).as_deref(), Some(rule.route.as_str()));
            clicked += 1;
        }
    }
    assert_eq!(clicked, 4);
}

#[test]
fn click_on_power_part_navigates_only_after_reveal() {
    let mut scene = DashboardScene::mount(asset(), &config(), VIEWPORT.width);
    let mut router = RecordingRouter::default();
    assert_eq!(scene.viewport_class(), ViewportClass::Wide);
    let body = screen_position(&scene, "Body");

    // Hidden part is skipped; the click lands on the body and commits.
    assert_eq!(click(&mut scene, &mut router, body), None);
    assert!(matches!(scene.reveal().phase(), RevealPhase::Playing { .. }));
    assert!(router.routes.is_empty());

    assert!(!scene.advance(1.0));
    assert_eq!(click(&mut scene, &mut router, body), None);

    assert!(scene.advance(1.5));
    // The power module now sits between the camera and the body.
    assert_eq!(click(&mut scene, &mut router, body).as_deref(), Some("/power"));
    assert_eq!(router.routes, vec!["/power"]);
}

#[test]
fn narrow_viewport_and_live_resize_use_the_scale_presets() {
    let scene = DashboardScene::mount(asset(), &config(), 500.0);
    assert_eq!(scene.viewport_class(), ViewportClass::Narrow);
    let root = scene.graph().get(scene.root()).unwrap();
    assert_eq!(root.transform.scale, NARROW_MODEL_SCALE);

    let mut scene = DashboardScene::mount(asset(), &config(), VIEWPORT.width);
    let root_id = scene.root();
    assert_eq!(scene.graph().get(root_id).unwrap().transform.scale, WIDE_MODEL_SCALE);

    let layout = scene.resize(500.0);
    assert_eq!(layout.scale, NARROW_MODEL_SCALE);
    assert_eq!(scene.graph().get(root_id).unwrap().transform.scale, NARROW_MODEL_SCALE);
    assert_eq!(scene.root(), root_id);
}

#[test]
fn hover_follows_pointer_onto_empty_space() {
    let mut scene = revealed_scene();
    let mut router = RecordingRouter::default();
    let panel = scene.graph().find("part11-1_-_Part_2").unwrap();
    let on_panel = screen_position(&scene, "part11-1_-_Part_2");

    let entered = scene.handle_pointer(PointerEvent::Move(on_panel), VIEWPORT, &camera(), &mut router);
    assert_eq!(entered.hover.entered, vec![panel]);
    assert_eq!(scene.hovered_names(), vec!["part11-1_-_Part_2".to_string()]);
    assert_eq!(scene.cursor(), CursorAffordance::Pointer);

    let left = scene.handle_pointer(PointerEvent::Move(EMPTY_SPACE), VIEWPORT, &camera(), &mut router);
    assert_eq!(left.hover.left, vec![panel]);
    assert_eq!(left.hover.cursor, Some(CursorAffordance::Default));
    assert!(scene.hover().is_empty());
    assert_eq!(scene.graph().get(panel).unwrap().hover_scale, 1.0);
}

#[test]
fn hover_holds_at_most_the_nearest_part() {
    let mut scene = revealed_scene();
    let mut router = RecordingRouter::default();
    let on_module = screen_position(&scene, "part15-2_-_Part");

    // The ray crosses the power module and the body behind it.
    assert!(scene.pick(on_module, VIEWPORT, &camera()).hits().len() >= 2);
    scene.handle_pointer(PointerEvent::Move(on_module), VIEWPORT, &camera(), &mut router);
    assert_eq!(scene.hovered_names(), vec!["part15-2_-_Part".to_string()]);
    assert_eq!(scene.hover().len(), 1);
}

#[test]
fn pointer_outside_viewport_is_well_defined() {
    let scene = DashboardScene::mount(asset(), &config(), VIEWPORT.width);
    for pointer in [
        Vec2::new(-50.0, 384.0),
        Vec2::new(2048.0, 2048.0),
        Vec2::new(512.0, -1.0),
        Vec2::new(f32::MAX, f32::MIN),
    ] {
        let result = scene.pick(pointer, VIEWPORT, &camera());
        assert!(result.hits().windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    let body = screen_position(&scene, "Body");
    let degenerate = pick(body, Viewport::new(0.0, 0.0), &camera(), scene.graph());
    assert!(degenerate.is_empty());
}

#[test]
fn repeated_commits_do_not_restart_the_reveal() {
    let mut scene = DashboardScene::mount(asset(), &config(), VIEWPORT.width);
    let mut router = RecordingRouter::default();
    let body = screen_position(&scene, "Body");

    let first = scene.handle_pointer(PointerEvent::Click(body), VIEWPORT, &camera(), &mut router);
    assert_eq!(first.commit, Some(CommitOutcome::Started));
    scene.advance(0.5);

    let second = scene.handle_pointer(PointerEvent::Click(body), VIEWPORT, &camera(), &mut router);
    assert_eq!(second.commit, Some(CommitOutcome::AlreadyPlaying));
    assert_eq!(scene.reveal().phase(), RevealPhase::Playing { elapsed: 0.5 });
}

#[test]
fn gate_opens_once_and_parts_stay_visible() {
    let mut scene = revealed_scene();
    let mut router = RecordingRouter::default();
    assert!(scene.reveal().gate().is_open());
    let body = screen_position(&scene, "Body");

    assert!(!scene.advance(1.0));
    let outcome = scene.handle_pointer(PointerEvent::Click(body), VIEWPORT, &camera(), &mut router);
    assert_eq!(outcome.commit, Some(CommitOutcome::AlreadyCompleted));
    scene.handle_pointer(PointerEvent::Leave, VIEWPORT, &camera(), &mut router);

    assert!(scene.reveal().gate().is_open());
    for &part in scene.reveal().revealed() {
        assert!(scene.graph().get(part).unwrap().visible);
    }
}

#[test]
fn failed_load_runs_no_interaction() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .init_state::<AppState>()
        .add_event::<WindowEvent>()
        .add_event::<WindowResized>()
        .init_resource::<WebRpcInterface>()
        .init_resource::<LoadingProgress>()
        .add_plugins(InteractionPlugin)
        .add_systems(
            Update,
            transition_to_unavailable.run_if(in_state(AppState::Loading)),
        );

    app.world_mut()
        .resource_mut::<LoadingProgress>()
        .fail(SceneError::AssetUnavailable("scenes/missing.scene.json".into()));
    app.update();
    app.update();

    assert_eq!(
        *app.world().resource::<State<AppState>>().get(),
        AppState::Unavailable
    );
    assert!(!app.world().contains_resource::<ActiveScene>());
    assert!(!app
        .world()
        .resource::<ListenerRegistry>()
        .is_listening(ListenerKind::Pointer));

    app.world_mut().send_event(PointerEvent::Click(Vec2::new(512.0, 384.0)));
    app.update();

    assert!(app.world().resource::<Events<RouteChanged>>().is_empty());
    let methods: Vec<_> = app
        .world()
        .resource::<WebRpcInterface>()
        .pending_notifications()
        .iter()
        .map(|n| n.method.clone())
        .collect();
    assert_eq!(methods, vec!["scene_unavailable".to_string()]);
}
