//! REST API handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use arbor_core::{
    DeviceSummary, Error, ErrorKind, RegisterDeviceRequest, RegisteredDevice, TopologyNode,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::state::AppState;
use crate::validate::validate_registration;

/// API error response
#[derive(Debug, Serialize)]
struct ErrorBody {
    status: u16,
    message: String,
}

/// Core error carried to the HTTP boundary
#[derive(Debug)]
pub struct ApiError(Error);

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::CycleDetected | ErrorKind::DepthExceeded | ErrorKind::Storage => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::Validation(format!(
            "JSON parser error. {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self.0, "Request failed");
        } else {
            debug!(status = status.as_u16(), error = %self.0, "Request rejected");
        }

        let body = ErrorBody {
            status: status.as_u16(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Register a device
pub async fn register_device(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterDeviceRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisteredDevice>)> {
    let Json(request) = payload?;
    validate_registration(&request)?;

    info!(mac = %request.mac_address, "Device registration requested");
    let registered = state.registry.register(request)?;
    Ok((StatusCode::CREATED, Json(registered)))
}

/// List all devices ordered by type
pub async fn list_devices(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<DeviceSummary>>> {
    Ok(Json(state.registry.list_all()?))
}

/// Get a specific device by MAC address
pub async fn get_device(
    State(state): State<Arc<AppState>>,
    Path(mac_address): Path<String>,
) -> ApiResult<Json<DeviceSummary>> {
    Ok(Json(state.registry.get_by_mac(&mac_address)?))
}

/// Get the whole network topology, one tree per root device
pub async fn get_topology(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<TopologyNode>>> {
    Ok(Json(state.topology.assemble_all()?))
}

/// Get the topology below a specific device
pub async fn get_device_topology(
    State(state): State<Arc<AppState>>,
    Path(mac_address): Path<String>,
) -> ApiResult<Json<TopologyNode>> {
    Ok(Json(state.topology.assemble_from(&mac_address)?))
}

/// Get current configuration
pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.config.clone())
}

/// Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}
