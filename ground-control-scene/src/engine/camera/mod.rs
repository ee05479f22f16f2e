//! Fixed perspective camera and lights for the dashboard scene.
//!
//! The camera never moves; the model is placed by the layout policy instead.

/// Scene camera marker, camera spawn and lighting.
pub mod scene_camera;
