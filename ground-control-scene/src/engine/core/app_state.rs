use bevy::prelude::*;

use crate::engine::loading::progress::LoadingProgress;
use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
    /// The scene could not be loaded. Nothing is mounted and no interaction
    /// systems run.
    Unavailable,
}

pub fn transition_to_running(
    loading_progress: Res<LoadingProgress>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if loading_progress.scene_mounted {
        println!("→ Scene mounted, transitioning to Running state");
        next_state.set(AppState::Running);
    }
}

pub fn transition_to_unavailable(
    loading_progress: Res<LoadingProgress>,
    mut next_state: ResMut<NextState<AppState>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let Some(err) = loading_progress.failure.as_ref() else {
        return;
    };
    println!("→ Scene unavailable, transitioning to Unavailable state");
    rpc_interface.send_notification(
        "scene_unavailable",
        serde_json::json!({ "reason": err.to_string() }),
    );
    next_state.set(AppState::Unavailable);
}
