use crate::collectors::collect_report;
use crate::config::Config;
use crate::evaluator::evaluate;
use crate::render::{render_html, render_plain};
use axum::extract::State;
use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::{routing::get, Json, Router};
use std::sync::Arc;

#[derive(Clone)]
pub struct HttpAppState {
    pub config: Arc<Config>,
}

pub fn build_router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/status", get(status_handler))
        .route("/api/report", get(report_handler))
        .route("/healthz", get(healthz))
        .with_state(HttpAppState { config })
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Full collect → evaluate → render cycle, scoped to this request.
async fn dashboard_handler(State(state): State<HttpAppState>) -> impl IntoResponse {
    let report = collect_report(&state.config.database).await;
    let issues = evaluate(&report);
    Html(render_html(&report, &issues, StatusCode::OK.as_u16()))
}

async fn status_handler(State(state): State<HttpAppState>) -> impl IntoResponse {
    let report = collect_report(&state.config.database).await;
    let issues = evaluate(&report);
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_plain(&issues),
    )
}

async fn report_handler(State(state): State<HttpAppState>) -> impl IntoResponse {
    let report = collect_report(&state.config.database).await;
    Json(report)
}
