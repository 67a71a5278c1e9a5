//! HTTP request handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    response::Html,
    Form, Json,
};
use tracing::warn;

use crate::inference::{FormFields, PredictionOutcome};

use super::page;
use super::state::AppState;

// ============================================================================
// UI Handlers
// ============================================================================

pub async fn serve_index() -> Html<String> {
    Html(page::render(None, &FormFields::new()))
}

/// Predict from the submitted form. Failures render as `Error: ...` in the
/// page with a 200 status; nothing here returns an error response.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Html<String> {
    let (fields, outcome) = match form {
        Ok(Form(values)) => {
            let fields = FormFields::from(values);
            // Forest evaluation is CPU-bound; keep it off the async workers
            let engine = state.engine.clone();
            let submitted = fields.clone();
            let outcome = tokio::task::spawn_blocking(move || engine.respond(&submitted))
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Prediction task failed");
                    PredictionOutcome::Failure(format!("prediction task failed: {}", e))
                });
            (fields, outcome)
        }
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable prediction form");
            (FormFields::new(), PredictionOutcome::Failure(rejection.body_text()))
        }
    };

    Html(page::render(Some(&outcome), &fields))
}

// ============================================================================
// System Handlers
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let store = state.engine.store();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": store.predictor().describe(),
        "features": store.feature_order().len(),
        "encoders": store.encoders().len(),
        "artifacts_dir": state.config.artifacts.dir.display().to_string(),
        "listen": format!("{}:{}", state.config.host, state.config.port),
        "uptime_secs": state.uptime_secs(),
    }))
}
