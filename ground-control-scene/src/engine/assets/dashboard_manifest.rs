use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::tools::layout::{LayoutOverride, LayoutPolicy};
use crate::tools::navigation::{NavigationRule, NavigationTable, default_rules};
use constants::interaction::REVEAL_CLIP_NAME;
use constants::path::DEFAULT_SCENE_PATH;

/// Whether sub-components wait for the reveal before they can be picked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// Revealed parts stay hidden, and unpickable, until the reveal completes.
    #[default]
    Gated,
    /// Every part is visible and pickable from mount.
    Always,
}

/// Dashboard configuration as a Bevy asset. Every field is optional in JSON.
#[derive(Asset, TypePath, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardManifest {
    #[serde(default = "default_scene_path")]
    pub scene: String,
    #[serde(default = "default_reveal_clip")]
    pub reveal_clip: String,
    /// Node names to hide until the reveal completes. Defaults to every mesh
    /// child of a group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revealed: Option<Vec<String>>,
    #[serde(default = "default_rules")]
    pub navigation: Vec<NavigationRule>,
    #[serde(default)]
    pub layout: LayoutOverride,
    #[serde(default)]
    pub interaction: InteractionMode,
}

fn default_scene_path() -> String {
    DEFAULT_SCENE_PATH.to_string()
}

fn default_reveal_clip() -> String {
    REVEAL_CLIP_NAME.to_string()
}

impl Default for DashboardManifest {
    fn default() -> Self {
        Self {
            scene: default_scene_path(),
            reveal_clip: default_reveal_clip(),
            revealed: None,
            navigation: default_rules(),
            layout: LayoutOverride::default(),
            interaction: InteractionMode::default(),
        }
    }
}

/// Validated settings a scene is mounted with.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub reveal_clip: String,
    pub revealed: Option<Vec<String>>,
    pub navigation: NavigationTable,
    /// Why navigation is disabled, if the table was rejected.
    pub navigation_error: Option<SceneError>,
    pub layout: LayoutPolicy,
    pub interaction: InteractionMode,
}

impl Default for SceneConfig {
    fn default() -> Self {
        DashboardManifest::default().to_config()
    }
}

impl DashboardManifest {
    /// Validates the manifest. A rejected navigation table disables
    /// navigation for the mount instead of failing it.
    pub fn to_config(&self) -> SceneConfig {
        let (navigation, navigation_error) = match NavigationTable::new(self.navigation.clone()) {
            Ok(table) => (table, None),
            Err(err) => {
                error!("Navigation table rejected, clicks will not navigate: {}", err);
                (NavigationTable::empty(), Some(err))
            }
        };

        SceneConfig {
            reveal_clip: self.reveal_clip.clone(),
            revealed: self.revealed.clone(),
            navigation,
            navigation_error,
            layout: LayoutPolicy::default().with_overrides(&self.layout),
            interaction: self.interaction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::layout::WIDE_MODEL_SCALE;

    #[test]
    fn empty_manifest_uses_built_in_defaults() {
        let manifest: DashboardManifest = serde_json::from_str("{}").unwrap();
        assert_eq!(manifest, DashboardManifest::default());

        let config = manifest.to_config();
        assert_eq!(config.reveal_clip, REVEAL_CLIP_NAME);
        assert_eq!(config.navigation.resolve("part11-1_-_Part_2"), Some("/solar"));
        assert_eq!(config.layout.compute_transform(1024.0).scale, WIDE_MODEL_SCALE);
        assert_eq!(config.interaction, InteractionMode::Gated);
    }

    #[test]
    fn ambiguous_navigation_disables_navigation_only() {
        let manifest: DashboardManifest = serde_json::from_str(
            r#"{
                "navigation": [
                    { "route": "/power", "nodes": ["part15-2_-_Part"] },
                    { "route": "/solar", "nodes": ["part15-2_-_Part"] }
                ],
                "layout": { "wide_scale": 8.0 },
                "interaction": "always"
            }"#,
        )
        .unwrap();

        let config = manifest.to_config();
        assert!(config.navigation.is_empty());
        assert!(matches!(
            config.navigation_error,
            Some(SceneError::AmbiguousNavigationRule { .. })
        ));
        assert_eq!(config.layout.compute_transform(1024.0).scale, Vec3::splat(8.0));
        assert_eq!(config.interaction, InteractionMode::Always);
    }
}
