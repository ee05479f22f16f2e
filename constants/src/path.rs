/// Dashboard manifest, relative to the asset root.
pub const DASHBOARD_MANIFEST_PATH: &str = "dashboard.manifest.json";

/// Satellite scene used when the manifest does not name one.
pub const DEFAULT_SCENE_PATH: &str = "scenes/satellite.scene.json";
