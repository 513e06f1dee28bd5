//! HTTP routes

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use uuid::Uuid;

use finai_core::analysis::RecurringPayment;
use finai_core::tool::{ToolContext, ToolResult};
use finai_core::transactions::to_api;

use crate::state::SharedState;

/// Header carrying the caller's user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Build the application router
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/alerts", get(alerts_handler))
        .route("/api/transactions", get(transactions_handler))
        .route("/api/recurring-payments", get(recurring_handler))
        .route("/api/tools", get(list_tools_handler))
        .route("/api/tools/:name", post(invoke_tool_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

/// Health check handler.
async fn health_handler() -> &'static str {
    "OK"
}

/// Alerts from the retention window, oldest first.
async fn alerts_handler(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.board.recent(state.alert_retention_hours))
}

async fn transactions_handler(State(state): State<SharedState>) -> Response {
    match state.feed.load().await {
        Ok(transactions) => Json(to_api(&transactions)).into_response(),
        Err(e) => {
            error!("Failed to read transactions: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read transactions").into_response()
        }
    }
}

#[derive(Debug, Serialize)]
struct RecurringResponse {
    detected: bool,
    payments: Vec<RecurringPayment>,
}

async fn recurring_handler(State(state): State<SharedState>) -> impl IntoResponse {
    Json(RecurringResponse {
        detected: state.recurring.is_detected(),
        payments: state.recurring.payments(),
    })
}

async fn list_tools_handler(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.tools.definitions().await)
}

#[derive(Debug, Default, Deserialize)]
struct InvokeParams {
    #[serde(default)]
    confirmed: bool,
}

fn tool_context(headers: &HeaderMap) -> ToolContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    ToolContext {
        user_id: header(USER_ID_HEADER).unwrap_or_default(),
        request_id: Uuid::new_v4().to_string(),
        auth_token: header(AUTHORIZATION.as_str())
            .and_then(|v| v.strip_prefix("Bearer ").map(str::to_string)),
    }
}

/// Run one tool; the body is the raw JSON argument object.
async fn invoke_tool_handler(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(params): Query<InvokeParams>,
    headers: HeaderMap,
    body: String,
) -> Json<ToolResult> {
    if let Some(tool) = state.tools.get(&name) {
        if tool.definition().await.requires_confirmation && !params.confirmed {
            info!(tool = %name, "Refusing unconfirmed call");
            return Json(ToolResult::err(format!(
                "{} requires confirmation; retry with ?confirmed=true",
                name
            )));
        }
    }

    let ctx = tool_context(&headers);
    Json(state.tools.invoke(&ctx, &name, &body).await)
}
