use bevy::asset::{LoadState, UntypedAssetId};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::engine::assets::dashboard_manifest::{DashboardManifest, SceneConfig};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::scene::description::{SceneAsset, SceneDescription};
use crate::engine::scene::mirror::spawn_scene_mirror;
use crate::engine::scene::mount::{ActiveScene, DashboardScene};
use crate::engine::scene::sky::spawn_sky_dome;
use crate::error::SceneError;
use crate::tools::interaction::ViewportInfo;
use crate::tools::interaction::subscription::ListenerRegistry;
use constants::path::{DASHBOARD_MANIFEST_PATH, DEFAULT_SCENE_PATH};

#[derive(Resource, Default)]
pub struct SceneLoader {
    manifest: Option<Handle<DashboardManifest>>,
    scene: Option<Handle<SceneDescription>>,
    scene_path: String,
    config: Option<SceneConfig>,
    built: Option<SceneAsset>,
}

impl SceneLoader {
    pub fn config(&self) -> Option<&SceneConfig> {
        self.config.as_ref()
    }
}

pub fn start_loading(mut loader: ResMut<SceneLoader>, asset_server: Res<AssetServer>) {
    println!("Loading dashboard manifest from: {}", DASHBOARD_MANIFEST_PATH);
    loader.manifest = Some(asset_server.load(DASHBOARD_MANIFEST_PATH));
}

fn load_failed(asset_server: &AssetServer, id: impl Into<UntypedAssetId>) -> bool {
    matches!(asset_server.get_load_state(id), Some(LoadState::Failed(_)))
}

/// Reads the manifest and starts the scene load. A missing manifest falls
/// back to the built-in configuration.
pub fn load_manifest_system(
    mut loader: ResMut<SceneLoader>,
    mut progress: ResMut<LoadingProgress>,
    asset_server: Res<AssetServer>,
    manifests: Res<Assets<DashboardManifest>>,
) {
    if progress.manifest_loaded {
        return;
    }
    let Some(handle) = loader.manifest.clone() else {
        return;
    };

    let manifest = if let Some(manifest) = manifests.get(&handle) {
        println!("✓ Dashboard manifest loaded");
        manifest.clone()
    } else if load_failed(&asset_server, handle.id()) {
        warn!(
            "Dashboard manifest '{}' unavailable, using built-in defaults",
            DASHBOARD_MANIFEST_PATH
        );
        DashboardManifest::default()
    } else {
        return;
    };

    let scene_path = if manifest.scene.is_empty() {
        DEFAULT_SCENE_PATH.to_string()
    } else {
        manifest.scene.clone()
    };
    println!("Loading scene from: {}", scene_path);

    loader.config = Some(manifest.to_config());
    loader.scene = Some(asset_server.load(&scene_path));
    loader.scene_path = scene_path;
    progress.manifest_loaded = true;
}

/// Builds the arena once the scene description is in. A failed load or an
/// invalid description is reported as `AssetUnavailable`.
pub fn load_scene_system(
    mut loader: ResMut<SceneLoader>,
    mut progress: ResMut<LoadingProgress>,
    asset_server: Res<AssetServer>,
    descriptions: Res<Assets<SceneDescription>>,
) {
    if !progress.manifest_loaded || progress.scene_loaded || progress.failure.is_some() {
        return;
    }
    let Some(handle) = loader.scene.clone() else {
        return;
    };

    if let Some(description) = descriptions.get(&handle) {
        match description.build() {
            Ok(asset) => {
                println!("✓ Scene built: {} nodes", asset.graph.len());
                loader.built = Some(asset);
                progress.scene_loaded = true;
            }
            Err(err) => progress.fail(SceneError::AssetUnavailable(format!(
                "{}: {}",
                loader.scene_path, err
            ))),
        }
    } else if load_failed(&asset_server, handle.id()) {
        progress.fail(SceneError::AssetUnavailable(loader.scene_path.clone()));
    }
}

/// Mounts the built scene, spawns its render entities and acquires the
/// input listeners.
pub fn mount_scene_when_ready(
    mut commands: Commands,
    mut loader: ResMut<SceneLoader>,
    mut progress: ResMut<LoadingProgress>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut viewport: ResMut<ViewportInfo>,
    registry: Res<ListenerRegistry>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    if !progress.scene_loaded || progress.scene_mounted {
        return;
    }
    let Some(asset) = loader.built.take() else {
        return;
    };
    let config = loader.config.clone().unwrap_or_default();

    if let Ok(window) = windows.single() {
        viewport.width = window.width();
        viewport.height = window.height();
    }

    let scene = DashboardScene::mount(asset, &config, viewport.width);
    let spawned = spawn_scene_mirror(&mut commands, &mut meshes, &mut materials, scene.graph());
    spawn_sky_dome(&mut commands, &mut meshes, &mut materials);
    println!("✓ Spawned {} scene meshes", spawned);

    commands.insert_resource(ActiveScene::new(scene, &registry));
    progress.scene_mounted = true;
}
