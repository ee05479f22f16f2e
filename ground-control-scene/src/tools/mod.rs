//! Interaction tools for the dashboard scene.
//!
//! Each tool is plain data driven by the mounted scene and testable without
//! an `App`. The [`interaction`] module is the only one that touches Bevy
//! events and windows.
//!
//! ## Pointer Flow
//!
//! ```text
//! CursorMoved / click / CursorLeft
//!   └─> PointerEvent
//!       └─> DashboardScene::handle_pointer()
//!           ├─> picking: ray from the camera, nearest hit first
//!           ├─> hover: highlight set, cursor affordance
//!           ├─> reveal: first click on the model commits the animation
//!           └─> navigation: part name → route → Router
//! ```
//!
//! ## Gating
//!
//! Parts of the revealed set stay hidden until the reveal animation has
//! finished. Hidden nodes are skipped by picking, so before that point
//! hover and clicks land on the model body and no route resolves.

/// Hover highlight set with multiplicative scale and cursor affordance.
pub mod hover;

/// Window input intake, per-frame systems and scoped listener subscriptions.
pub mod interaction;

/// Viewport breakpoint and model transform presets.
pub mod layout;

/// Declarative part-name to route table and the router seam.
pub mod navigation;

/// Screen-space ray picking against the scene arena.
pub mod picking;

/// One-shot reveal animation with its completion gate.
pub mod reveal;
