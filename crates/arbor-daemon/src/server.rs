//! Web server setup and routing

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api;
use crate::state::AppState;

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/devices", post(api::register_device).get(api::list_devices))
        .route("/devices/topology", get(api::get_topology))
        .route("/devices/topology/{mac_address}", get(api::get_device_topology))
        .route("/devices/{mac_address}", get(api::get_device))
        .route("/config", get(api::get_config))
        .route("/health", get(api::health))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server until it fails or the process is stopped
pub async fn run(state: Arc<AppState>, bind: &str) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(address = %bind, protocol = "HTTP", "Starting web server");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use arbor_core::MemoryStore;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const GATEWAY_MAC: &str = "70:1A:2B:3C:4D:5E";
    const AP_MAC: &str = "AA:BB:CC:DD:EE:FF";

    fn test_router() -> Router {
        let state = AppState::with_store(Arc::new(MemoryStore::new()), Config::default());
        router(Arc::new(state))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_json(app: &Router, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/devices")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = test_router();
        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_config_endpoint() {
        let app = test_router();
        let (status, body) = get(&app, "/config").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["daemon"]["bind"], "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn test_register_and_fetch_topology() {
        let app = test_router();

        let (status, gateway) = post_json(
            &app,
            json!({"deviceType": "GATEWAY", "macAddress": GATEWAY_MAC}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(gateway["macAddress"], GATEWAY_MAC);
        assert!(gateway["id"].is_string());
        assert!(gateway.get("uplinkMacAddress").is_none());

        let (status, ap) = post_json(
            &app,
            json!({"deviceType": "ACCESS_POINT", "macAddress": AP_MAC, "uplinkMacAddress": GATEWAY_MAC}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(ap["uplinkMacAddress"], GATEWAY_MAC);

        let (status, forest) = get(&app, "/devices/topology").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            forest,
            json!([{
                "macAddress": GATEWAY_MAC,
                "children": [{"macAddress": AP_MAC, "children": []}]
            }])
        );

        let (status, subtree) = get(&app, &format!("/devices/topology/{}", AP_MAC)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(subtree, json!({"macAddress": AP_MAC, "children": []}));
    }

    #[tokio::test]
    async fn test_list_and_lookup_devices() {
        let app = test_router();
        post_json(&app, json!({"deviceType": "ACCESS_POINT", "macAddress": AP_MAC})).await;
        post_json(&app, json!({"deviceType": "GATEWAY", "macAddress": GATEWAY_MAC})).await;

        let (status, devices) = get(&app, "/devices").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            devices,
            json!([
                {"deviceType": "GATEWAY", "macAddress": GATEWAY_MAC},
                {"deviceType": "ACCESS_POINT", "macAddress": AP_MAC}
            ])
        );

        let (status, device) = get(&app, &format!("/devices/{}", AP_MAC)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(device, json!({"deviceType": "ACCESS_POINT", "macAddress": AP_MAC}));
    }

    #[tokio::test]
    async fn test_not_found_errors() {
        let app = test_router();

        let (status, body) = get(&app, "/devices").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"status": 404, "message": "No device(s) found"}));

        let (status, body) = get(&app, "/devices/topology").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "No device(s) found in network topology");

        let (status, body) = get(&app, &format!("/devices/topology/{}", AP_MAC)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["message"],
            format!("Topology with device MAC {} not found", AP_MAC)
        );

        let (status, body) = get(&app, &format!("/devices/{}", AP_MAC)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], format!("Device with MAC {} not found", AP_MAC));
    }

    #[tokio::test]
    async fn test_unknown_uplink_is_not_found() {
        let app = test_router();
        let (status, body) = post_json(
            &app,
            json!({"deviceType": "SWITCH", "macAddress": AP_MAC, "uplinkMacAddress": GATEWAY_MAC}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["message"],
            format!("Parent device with MAC {} not found", GATEWAY_MAC)
        );

        let (status, _) = get(&app, "/devices").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_deep_topology_is_server_error() {
        let mut config = Config::default();
        config.topology.max_depth = 2;
        let state = AppState::with_store(Arc::new(MemoryStore::new()), config);
        let app = router(Arc::new(state));

        let macs = [
            "02:00:00:00:00:01",
            "02:00:00:00:00:02",
            "02:00:00:00:00:03",
            "02:00:00:00:00:04",
        ];
        let mut uplink: Option<&str> = None;
        for mac in macs {
            let (status, _) = post_json(
                &app,
                json!({"deviceType": "SWITCH", "macAddress": mac, "uplinkMacAddress": uplink}),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            uplink = Some(mac);
        }

        let (status, body) = get(&app, "/devices/topology").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], 500);
        assert_eq!(
            body["message"],
            "Network topology deeper than 2 levels at device MAC 02:00:00:00:00:04"
        );

        // Service stays up and shallower subtrees still resolve
        let (status, body) = get(&app, "/devices/topology/02:00:00:00:00:02").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["children"][0]["children"][0]["macAddress"], "02:00:00:00:00:04");
    }

    #[tokio::test]
    async fn test_duplicate_mac_is_conflict() {
        let app = test_router();
        let device = json!({"deviceType": "GATEWAY", "macAddress": GATEWAY_MAC});
        let (status, _) = post_json(&app, device.clone()).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = post_json(&app, device).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status"], 409);
    }

    #[tokio::test]
    async fn test_invalid_input_is_bad_request() {
        let app = test_router();

        let (status, body) = post_json(
            &app,
            json!({"deviceType": "GATEWAY", "macAddress": "not-a-mac"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().starts_with("macAddress: "));

        let (status, body) = post_json(
            &app,
            json!({"deviceType": "ROUTER", "macAddress": GATEWAY_MAC}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("JSON parser error."));

        let (status, _) = post_json(&app, json!({"deviceType": "GATEWAY"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
