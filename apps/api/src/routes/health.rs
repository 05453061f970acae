use axum::{extract::State, Json};
use serde_json::{json, Map, Value};

use crate::state::AppState;

/// GET /health
/// Reports credential presence and, when chat credentials are set, probes every
/// candidate model with a minimal request.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let azure = &state.config.azure;

    let mut body = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "openai_configured": state.llm.is_configured(),
        "env_check": {
            "api_key_present": azure.api_key.is_some(),
            "endpoint_present": azure.endpoint.is_some(),
        },
        "itglue_configured": state.itglue.is_configured(),
    });

    if state.llm.is_configured() {
        let availability: Map<String, Value> = state
            .llm
            .probe_models()
            .await
            .into_iter()
            .map(|(model, status)| (model, Value::String(status.label())))
            .collect();
        body["model_availability"] = Value::Object(availability);
    }

    Json(body)
}
