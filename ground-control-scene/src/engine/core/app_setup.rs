use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

// Crate engine modules
use crate::engine::assets::dashboard_manifest::DashboardManifest;
use crate::engine::camera::scene_camera::{spawn_lighting, spawn_scene_camera};
use crate::engine::core::app_state::{AppState, transition_to_running, transition_to_unavailable};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::loading::scene_loader::{
    SceneLoader, load_manifest_system, load_scene_system, mount_scene_when_ready, start_loading,
};
use crate::engine::scene::description::SceneDescription;
use crate::engine::scene::mount::handle_unmount_requests;
use crate::engine::scene::sky::rotate_sky_dome;
// Crate tools modules
use crate::tools::interaction::InteractionPlugin;
// Web RPC
use crate::rpc::web_rpc::WebRpcPlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Distinct extensions so each JSON loader only sees its own files.
        .add_plugins(JsonAssetPlugin::<DashboardManifest>::new(&["manifest.json"]))
        .add_plugins(JsonAssetPlugin::<SceneDescription>::new(&["scene.json"]))
        .add_plugins(WebRpcPlugin)
        .add_plugins(InteractionPlugin);

    app.init_resource::<LoadingProgress>()
        .init_resource::<SceneLoader>()
        .insert_resource(ClearColor(Color::srgb(0.01, 0.01, 0.03)));

    app.add_systems(Startup, (setup, start_loading).chain())
        .add_systems(
            Update,
            (
                load_manifest_system,
                load_scene_system,
                mount_scene_when_ready,
                transition_to_running,
                transition_to_unavailable,
            )
                .chain()
                .run_if(in_state(AppState::Loading)),
        )
        .add_systems(
            Update,
            rotate_sky_dome.run_if(in_state(AppState::Running)),
        )
        .add_systems(Update, handle_unmount_requests);

    app
}

fn setup(mut commands: Commands) {
    spawn_scene_camera(&mut commands);
    spawn_lighting(&mut commands);
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    let log_config = LogPlugin {
        filter: "wgpu=error,naga=warn,ground_control_scene=debug".into(),
        ..default()
    };

    DefaultPlugins
        .set(window_config)
        .set(asset_config)
        .set(log_config)
}
