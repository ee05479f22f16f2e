//! JSON-RPC 2.0 communication layer for the dashboard frontend.
//!
//! Implements bidirectional messaging between the Bevy engine and the host page via
//! iframe postMessage, supporting both request-response and notification patterns.
//!
//! ## Message Flow
//!
//! ```text
//! Dashboard (parent)    <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Process request
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! Unknown methods answer `-32601`; malformed messages are logged and dropped.
//!
//! ## Methods
//!
//! ### Scene
//! - `get_scene_status`: Mount state, reveal phase, hover and cursor snapshot
//! - `get_navigation_routes`: Route table and whether navigation is enabled
//! - `unmount_scene`: Tear the scene down and release its input listeners
//!
//! ### Diagnostics
//! - `get_fps`: Retrieve current frame rate
//!
//! ## Notifications
//!
//! - `route_changed {route}`: A clicked part maps to a dashboard route
//! - `hover_changed {hovered}`: Names of the highlighted nodes
//! - `cursor_changed {cursor}`: CSS cursor for the canvas
//! - `reveal_completed {}`: Sub-components became interactive
//! - `scene_unavailable {reason}`: The scene asset could not be loaded

/// JSON-RPC 2.0 bidirectional communication system for the dashboard frontend.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
