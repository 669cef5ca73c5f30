//! Transaction screen endpoints - HTMX partials and JSON
//!
//! Endpoints:
//! - htmx_screen_filter: Apply a date range (cached view now, reconcile in background)
//! - htmx_screen_view: Poll for a frame newer than `since`
//! - htmx_screen_close: Discard a screen
//! - api_screen: Screen state and latest frame (JSON)
//! - api_screen_filter: Apply a date range (JSON)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Form, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use custweb_core::{FilterRange, Notice, ViewFrame};
use serde::Deserialize;

use super::page::render_screen_view;
use crate::error::JsonResult;
use crate::{ApiError, ApiResult, AppState, Screen};

/// Longest a poll may wait for a newer frame
const MAX_POLL_WAIT_MS: u64 = 10_000;

async fn find_screen(state: &AppState, screen_id: &str) -> ApiResult<Arc<Screen>> {
    state.screens.read().await.get(screen_id).ok_or_else(|| ApiError::NotFound {
        resource: format!("screen {}", screen_id),
    })
}

/// HTMX: apply a filter range
///
/// Answers with the range rendered from cached records and spawns the
/// range-scoped fetch; its frame is picked up by the next poll.
pub async fn htmx_screen_filter(
    state: axum::extract::State<AppState>,
    path: axum::extract::Path<String>,
    form: Form<HashMap<String, String>>,
) -> ApiResult<axum::response::Html<String>> {
    let screen = find_screen(&state, &path.0).await?;

    let from = form.get("from").map(String::as_str).unwrap_or("");
    let to = form.get("to").map(String::as_str).unwrap_or("");
    let range = match FilterRange::parse(from, to) {
        Ok(range) => range,
        Err(e) => {
            let latest = screen.frames.latest();
            let notice = Notice::warning(format!("日期格式错误：{}", e));
            return Ok(axum::response::Html(render_screen_view(&screen.id, latest.as_ref(), &[notice])));
        }
    };

    let frame = screen.sync.show(range);
    screen.sync.spawn_reconcile(range);
    let notices = screen.frames.take_notices();

    Ok(axum::response::Html(render_screen_view(&screen.id, Some(&frame), &notices)))
}

/// HTMX: newest frame if newer than `since`, otherwise 204.
///
/// Pending notices are delivered with the latest frame even when no newer
/// frame exists. `wait_ms` lets the caller wait for a frame.
pub async fn htmx_screen_view(
    state: axum::extract::State<AppState>,
    path: axum::extract::Path<String>,
    params: Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let screen = find_screen(&state, &path.0).await?;
    let since: u64 = params.get("since").and_then(|s| s.parse().ok()).unwrap_or(0);
    let wait_ms: u64 = params
        .get("wait_ms")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
        .min(MAX_POLL_WAIT_MS);

    let mut newer = screen.frames.newer_than(since);
    if newer.is_none() && wait_ms > 0 {
        newer = tokio::time::timeout(Duration::from_millis(wait_ms), screen.frames.wait_newer_than(since))
            .await
            .ok()
            .flatten();
    }
    let notices = screen.frames.take_notices();

    if newer.is_none() && notices.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let frame = newer.or_else(|| screen.frames.latest());
    Ok(axum::response::Html(render_screen_view(&screen.id, frame.as_ref(), &notices)).into_response())
}

/// HTMX: close a screen
pub async fn htmx_screen_close(
    state: axum::extract::State<AppState>,
    path: axum::extract::Path<String>,
) -> StatusCode {
    match state.screens.write().await.remove(&path.0) {
        Some(screen) => {
            log::debug!(target: "custweb::api", "Closed screen {}", screen.id);
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

/// Screen state (JSON API)
pub async fn api_screen(
    state: axum::extract::State<AppState>,
    path: axum::extract::Path<String>,
) -> JsonResult<serde_json::Value> {
    let screen = find_screen(&state, &path.0).await?;
    Ok(Json(serde_json::json!({
        "screen": screen.id,
        "customer_id": screen.customer.id,
        "range": screen.sync.current_range(),
        "cached": screen.sync.cached_count(),
        "frame": screen.frames.latest(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub from: String,
    pub to: String,
}

/// Apply a date range (JSON API)
///
/// Same two steps as the HTMX form: answers with the cached frame, and the
/// reconciled frame shows up in `/api/screens/:screen`.
pub async fn api_screen_filter(
    state: axum::extract::State<AppState>,
    path: axum::extract::Path<String>,
    request: Json<FilterRequest>,
) -> JsonResult<ViewFrame> {
    let screen = find_screen(&state, &path.0).await?;
    let range = FilterRange::parse(&request.from, &request.to)?;

    let frame = screen.sync.show(range);
    screen.sync.spawn_reconcile(range);
    Ok(Json(frame))
}
