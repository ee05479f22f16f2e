use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::loading::scene_loader::SceneLoader;
use crate::engine::scene::mount::{ActiveScene, SceneStatus, UnmountSceneRequest};
use crate::tools::navigation::{NavigationRule, Router, default_rules};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication between the dashboard
/// frontend and Bevy.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the frontend without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the frontend.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }

    pub fn pending_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }
}

/// The host's router owns the URL; the engine only announces the target.
impl Router for WebRpcInterface {
    fn navigate_to(&mut self, route: &str) {
        self.send_notification("route_changed", serde_json::json!({ "route": route }));
    }
}

/// Plugin establishing WebRPC communication layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_event::<UnmountSceneRequest>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    let Some(window) = window() else {
        error!("Window object not available, RPC listener not registered");
        return;
    };
    if let Err(e) =
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
    {
        error!("Failed to register message listener: {:?}", e);
        return;
    }

    // Listener lives as long as the page.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing incoming RPC message from the frontend.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Read-only view of the engine state that request handlers answer from.
struct RpcContext<'a> {
    scene: Option<&'a ActiveScene>,
    loader: Option<&'a SceneLoader>,
    diagnostics: Option<&'a DiagnosticsStore>,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    diagnostics: Option<Res<DiagnosticsStore>>,
    scene: Option<Res<ActiveScene>>,
    loader: Option<Res<SceneLoader>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut unmount_events: EventWriter<UnmountSceneRequest>,
) {
    let context = RpcContext {
        scene: scene.as_deref(),
        loader: loader.as_deref(),
        diagnostics: diagnostics.as_deref(),
    };

    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("Processing RPC method: {}", request.method);
                if let Some(response) =
                    handle_rpc_request(&request, &context, &mut unmount_events)
                {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("RPC parse error: {}", parse_error);
                rpc_interface.send_notification(
                    "debug_message",
                    serde_json::json!({
                        "message": format!("Parse error: {}", parse_error)
                    }),
                );
            }
        }
    }
}

/// Handle individual RPC request and generate response based on method.
fn handle_rpc_request(
    request: &RpcRequest,
    context: &RpcContext,
    unmount_events: &mut EventWriter<UnmountSceneRequest>,
) -> Option<RpcResponse> {
    // Notifications from the host carry no ID and get no response.
    let id = request.id.clone()?;

    let result = match request.method.as_str() {
        "get_scene_status" => handle_get_scene_status(context),
        "get_navigation_routes" => handle_get_navigation_routes(context),
        "unmount_scene" => handle_unmount_scene(context, unmount_events),
        "get_fps" => handle_get_fps(context.diagnostics),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            return Some(create_error_response(
                id,
                -32601,
                "Method not found",
                Some(serde_json::json!({"method": request.method})),
            ));
        }
    };

    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

fn handle_get_scene_status(context: &RpcContext) -> Result<serde_json::Value, RpcError> {
    let status = context
        .scene
        .map(|active| active.scene.status())
        .unwrap_or_else(SceneStatus::unmounted);

    serde_json::to_value(status).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Routes of the mounted scene, or the configured table before mount.
fn handle_get_navigation_routes(context: &RpcContext) -> Result<serde_json::Value, RpcError> {
    let (rules, enabled): (Vec<NavigationRule>, bool) = match (context.scene, context.loader) {
        (Some(active), _) => (
            active.scene.navigation().rules().to_vec(),
            active.scene.status().navigation_error.is_none(),
        ),
        (None, Some(loader)) => match loader.config() {
            Some(config) => (
                config.navigation.rules().to_vec(),
                config.navigation_error.is_none(),
            ),
            None => (default_rules(), true),
        },
        (None, None) => (default_rules(), true),
    };

    Ok(serde_json::json!({
        "enabled": enabled,
        "routes": rules
    }))
}

fn handle_unmount_scene(
    context: &RpcContext,
    unmount_events: &mut EventWriter<UnmountSceneRequest>,
) -> Result<serde_json::Value, RpcError> {
    let was_mounted = context.scene.is_some();
    if was_mounted {
        unmount_events.write(UnmountSceneRequest);
    }

    Ok(serde_json::json!({
        "success": true,
        "was_mounted": was_mounted
    }))
}

/// Handle FPS retrieval with diagnostic system integration.
fn handle_get_fps(diagnostics: Option<&DiagnosticsStore>) -> Result<serde_json::Value, RpcError> {
    let fps = diagnostics
        .and_then(|store| store.get(&FrameTimeDiagnosticsPlugin::FPS))
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32;

    Ok(serde_json::json!({
        "fps": fps
    }))
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Send queued notifications and responses to the frontend.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Responses after notifications so state changes land first.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to parent window (dashboard frontend).
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::dashboard_manifest::SceneConfig;
    use crate::engine::scene::description::SceneDescription;
    use crate::engine::scene::mount::DashboardScene;
    use crate::tools::interaction::subscription::ListenerRegistry;
    use bevy::ecs::event::Events;

    const SCENE: &str = r#"{
        "nodes": [
            { "name": "Parts", "children": [
                { "name": "part11-1_-_Part_2", "geometry": { "cuboid": [0.2, 0.2, 0.2] } }
            ] }
        ],
        "animations": [ { "name": "Timeline", "duration": 0.5 } ]
    }"#;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_event::<UnmountSceneRequest>()
            .add_systems(Update, handle_rpc_messages);
        app
    }

    fn mount(app: &mut App) {
        let asset = serde_json::from_str::<SceneDescription>(SCENE)
            .unwrap()
            .build()
            .unwrap();
        let registry = ListenerRegistry::default();
        let scene = DashboardScene::mount(asset, &SceneConfig::default(), 1024.0);
        app.insert_resource(ActiveScene::new(scene, &registry))
            .insert_resource(registry);
    }

    fn call(app: &mut App, method: &str) -> RpcResponse {
        let request = serde_json::json!({ "jsonrpc": "2.0", "method": method, "id": 7 });
        app.world_mut().send_event(IncomingRpcMessage {
            content: request.to_string(),
        });
        app.update();
        let mut rpc = app.world_mut().resource_mut::<WebRpcInterface>();
        rpc.outgoing_responses.pop().unwrap()
    }

    #[test]
    fn unknown_method_is_method_not_found() {
        let mut app = app();
        let response = call(&mut app, "tool_selection");
        assert_eq!(response.error.unwrap().code, -32601);
        assert_eq!(response.id, Some(serde_json::json!(7)));
    }

    #[test]
    fn notifications_get_no_response() {
        let mut app = app();
        app.world_mut().send_event(IncomingRpcMessage {
            content: r#"{"jsonrpc":"2.0","method":"get_fps"}"#.to_string(),
        });
        app.update();
        assert!(app.world().resource::<WebRpcInterface>().outgoing_responses.is_empty());
    }

    #[test]
    fn status_reports_unmounted_then_mounted() {
        let mut app = app();
        let response = call(&mut app, "get_scene_status");
        assert_eq!(response.result.unwrap()["mounted"], false);

        mount(&mut app);
        let status = call(&mut app, "get_scene_status").result.unwrap();
        assert_eq!(status["mounted"], true);
        assert_eq!(status["reveal_phase"], "idle");
        assert_eq!(status["cursor"], "default");
    }

    #[test]
    fn navigation_routes_fall_back_to_defaults() {
        let mut app = app();
        let result = call(&mut app, "get_navigation_routes").result.unwrap();
        assert_eq!(result["enabled"], true);
        assert_eq!(result["routes"].as_array().unwrap().len(), default_rules().len());
    }

    #[test]
    fn unmount_dispatches_a_request_only_when_mounted() {
        let mut app = app();
        let result = call(&mut app, "unmount_scene").result.unwrap();
        assert_eq!(result["was_mounted"], false);

        mount(&mut app);
        let result = call(&mut app, "unmount_scene").result.unwrap();
        assert_eq!(result["was_mounted"], true);
        let requests = app
            .world_mut()
            .resource_mut::<Events<UnmountSceneRequest>>()
            .drain()
            .count();
        assert_eq!(requests, 1);
    }

    #[test]
    fn router_announces_route_changes() {
        let mut rpc = WebRpcInterface::default();
        rpc.navigate_to("/antenna");
        let sent = rpc.pending_notifications();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, "route_changed");
        assert_eq!(sent[0].params["route"], "/antenna");
    }
}
