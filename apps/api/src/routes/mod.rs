pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::itglue::handlers as itglue;
use crate::policy::handlers as policy;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/generate_policy", post(policy::handle_generate_policy))
        // IT Glue organization picker
        .route(
            "/api/itglue/organizations",
            get(itglue::handle_list_organizations),
        )
        .route(
            "/api/itglue/organizations/:id/profile",
            get(itglue::handle_get_profile),
        )
        .route(
            "/api/itglue/organizations/:id/policies",
            post(itglue::handle_save_policy),
        )
        .with_state(state)
}
