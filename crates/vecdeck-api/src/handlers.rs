//! Route handlers and request/response DTOs.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use tracing::info;

use vecdeck_client::Credentials;
use vecdeck_conn::ConnError;
use vecdeck_poller::ToggleAction;

use crate::ApiState;

/// Stable error body for every failure path.
#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(ErrorBody {
            message: message.to_string(),
        }),
    )
        .into_response()
}

fn conn_error_response(err: &ConnError) -> axum::response::Response {
    let status = match err {
        ConnError::ConnectFailed(_) => StatusCode::BAD_REQUEST,
        ConnError::NotConnected => StatusCode::FORBIDDEN,
    };
    error_response(status, &err.to_string())
}

// ── Version ────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub sdk: &'static str,
    pub app_version: &'static str,
}

/// GET /version
pub async fn version(State(state): State<ApiState>) -> impl IntoResponse {
    Json(VersionResponse {
        sdk: state.sdk_version,
        app_version: env!("CARGO_PKG_VERSION"),
    })
}

// ── Connect / check / disconnect ───────────────────────────────

#[derive(Deserialize)]
pub struct ConnectRequest {
    pub address: String,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub ssl: bool,
}

#[derive(Serialize)]
pub struct ConnectResponse {
    pub address: String,
}

/// POST /connect
pub async fn connect(
    State(state): State<ApiState>,
    Json(req): Json<ConnectRequest>,
) -> impl IntoResponse {
    let credentials = Credentials {
        username: req.username,
        password: req.password,
        tls: req.ssl,
    };

    match state.manager.connect(&req.address, &credentials).await {
        Ok(address) => Json(ConnectResponse { address }).into_response(),
        Err(e) => conn_error_response(&e),
    }
}

#[derive(Deserialize)]
pub struct CheckParams {
    pub address: String,
}

#[derive(Serialize)]
pub struct CheckResponse {
    pub connected: bool,
}

/// GET /check?address=...
///
/// Absence is a normal outcome — this never fails for "not connected".
pub async fn check(
    State(state): State<ApiState>,
    Query(params): Query<CheckParams>,
) -> impl IntoResponse {
    let connected = state.manager.check_connection(&params.address).await;
    Json(CheckResponse { connected })
}

#[derive(Serialize)]
pub struct DisconnectResponse {
    pub result: &'static str,
}

/// POST /disconnect — best-effort, always 200.
pub async fn disconnect(State(state): State<ApiState>) -> impl IntoResponse {
    state.manager.disconnect().await;
    Json(DisconnectResponse {
        result: "disconnected",
    })
}

// ── Cron toggle ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CronToggleRequest {
    pub name: String,
    /// 0 = start, 1 = stop.
    #[serde(rename = "type")]
    pub toggle_type: u8,
}

#[derive(Serialize)]
pub struct CronToggleResponse {
    pub result: &'static str,
}

/// PUT /crons
pub async fn toggle_cron(
    State(state): State<ApiState>,
    Json(req): Json<CronToggleRequest>,
) -> impl IntoResponse {
    let action = match req.toggle_type {
        0 => ToggleAction::Start,
        1 => ToggleAction::Stop,
        other => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("invalid toggle type {other}"),
            );
        }
    };

    // Jobs are scoped to the active connection.
    let Some(scope) = state.manager.active_address().await else {
        return match action {
            ToggleAction::Start => conn_error_response(&ConnError::NotConnected),
            // Never connected means never registered.
            ToggleAction::Stop => {
                error_response(StatusCode::BAD_REQUEST, "No existed job entity")
            }
        };
    };

    match state.poller.toggle(&scope, &req.name, action).await {
        Ok(()) => {
            info!(%scope, name = %req.name, ?action, "cron toggled");
            Json(CronToggleResponse { result: "ok" }).into_response()
        }
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}
