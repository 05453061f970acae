//! Axum route handlers for the IT Glue organization picker.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::itglue::client::{AssetSource, PolicyUpload, SaveOutcome};
use crate::itglue::mapping::{map_profile_to_form, FormPrefill};
use crate::itglue::profile::{active_organizations, fetch_profile, OrganizationProfile, OrganizationSummary};
use crate::state::AppState;

#[derive(Serialize)]
pub struct OrganizationListResponse {
    pub organizations: Vec<OrganizationSummary>,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub profile: OrganizationProfile,
    pub form_data: FormPrefill,
}

#[derive(Debug, Deserialize)]
pub struct SavePolicyRequest {
    pub policy_name: String,
    #[serde(default)]
    pub policy_content: String,
    #[serde(default)]
    pub policy_type: String,
    #[serde(default)]
    pub compliance_frameworks: Vec<String>,
}

fn require_configured(source: &dyn AssetSource) -> Result<(), AppError> {
    if source.is_configured() {
        Ok(())
    } else {
        Err(AppError::IntegrationUnavailable(
            "IT Glue API key not configured".to_string(),
        ))
    }
}

/// GET /api/itglue/organizations
pub async fn handle_list_organizations(
    State(state): State<AppState>,
) -> Result<Json<OrganizationListResponse>, AppError> {
    require_configured(state.itglue.as_ref())?;
    let organizations = active_organizations(state.itglue.as_ref()).await;
    Ok(Json(OrganizationListResponse { organizations }))
}

/// GET /api/itglue/organizations/:id/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(org_id): Path<u64>,
) -> Result<Json<ProfileResponse>, AppError> {
    require_configured(state.itglue.as_ref())?;

    let profile = fetch_profile(state.itglue.as_ref(), org_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Organization {org_id} not found")))?;

    let form_data = map_profile_to_form(&profile);
    info!(
        "Mapped {} form fields for organization {org_id}",
        form_data.len()
    );

    Ok(Json(ProfileResponse { profile, form_data }))
}

/// POST /api/itglue/organizations/:id/policies
pub async fn handle_save_policy(
    State(state): State<AppState>,
    Path(org_id): Path<u64>,
    Json(req): Json<SavePolicyRequest>,
) -> Result<Json<SaveOutcome>, AppError> {
    require_configured(state.itglue.as_ref())?;

    if req.policy_name.trim().is_empty() {
        return Err(AppError::Validation("policy_name is required".to_string()));
    }

    let outcome = state
        .itglue
        .save_policy(PolicyUpload {
            org_id,
            policy_name: &req.policy_name,
            policy_content: &req.policy_content,
            policy_type: &req.policy_type,
            compliance_frameworks: &req.compliance_frameworks,
        })
        .await;

    Ok(Json(outcome))
}
