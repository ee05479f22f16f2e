use bevy::prelude::*;

use crate::error::SceneError;

#[derive(Resource, Default)]
pub struct LoadingProgress {
    pub manifest_loaded: bool,
    pub scene_loaded: bool,
    pub scene_mounted: bool,
    /// First fatal loading error; moves the app to `Unavailable`.
    pub failure: Option<SceneError>,
}

impl LoadingProgress {
    pub fn fail(&mut self, err: SceneError) {
        if self.failure.is_none() {
            error!("Scene loading failed: {}", err);
            self.failure = Some(err);
        }
    }
}
