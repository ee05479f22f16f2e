use bevy::prelude::*;
use bevy::window::PresentMode;

pub fn create_window_config() -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            title: "Ground Control".into(),
            canvas: Some("#bevy".into()),
            fit_canvas_to_parent: true,
            // Pointer events reach the page too, the host listens at document level.
            prevent_default_event_handling: false,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            title: "Ground Control".into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}
