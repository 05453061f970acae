//! IT Glue REST client (JSON:API over HTTPS, `x-api-key` auth).
//!
//! Read-only from this service's point of view; the save-back call is a stub.
//! Pages are capped at 500 items and never followed: larger tenants are silently
//! truncated.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ItGlueConfig;
use crate::itglue::models::{Configuration, Document, Organization};

const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const PAGE_SIZE: u32 = 500;

pub const SAVE_STUB_MESSAGE: &str =
    "Policy generation logged. Document upload to IT Glue available upon request.";

#[derive(Debug, Error)]
pub enum ItGlueError {
    #[error("IT Glue API key not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Result of the save-back call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveOutcome {
    pub success: bool,
    pub message: String,
    pub document_id: Option<String>,
}

/// Generated policy offered for upload back to the organization's records.
#[derive(Debug, Clone)]
pub struct PolicyUpload<'a> {
    pub org_id: u64,
    pub policy_name: &'a str,
    pub policy_content: &'a str,
    pub policy_type: &'a str,
    pub compliance_frameworks: &'a [String],
}

/// The asset-management data source. `ItGlueClient` is the production implementation.
#[async_trait]
pub trait AssetSource: Send + Sync {
    fn is_configured(&self) -> bool;

    /// First page of organizations, sorted by name.
    async fn organizations(&self) -> Result<Vec<Organization>, ItGlueError>;

    async fn organization(&self, org_id: u64) -> Result<Organization, ItGlueError>;

    /// First page of configurations belonging to `org_id`.
    async fn configurations(&self, org_id: u64) -> Result<Vec<Configuration>, ItGlueError>;

    /// Upload is not implemented yet: the request is logged and reported as accepted.
    // TODO: write the policy as a flexible asset once a policy asset type exists in IT Glue.
    async fn save_policy(&self, upload: PolicyUpload<'_>) -> SaveOutcome {
        info!(
            "Policy save requested for org {}: {} ({}, {} chars, frameworks: {:?})",
            upload.org_id,
            upload.policy_name,
            upload.policy_type,
            upload.policy_content.len(),
            upload.compliance_frameworks
        );
        SaveOutcome {
            success: true,
            message: SAVE_STUB_MESSAGE.to_string(),
            document_id: None,
        }
    }
}

pub struct ItGlueClient {
    client: Client,
    config: ItGlueConfig,
}

impl ItGlueClient {
    pub fn new(config: ItGlueConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            config,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, ItGlueError> {
        let api_key = self.config.api_key.as_deref().ok_or(ItGlueError::NotConfigured)?;

        let response = self
            .client
            .get(self.url(endpoint))
            .query(query)
            .header("x-api-key", api_key)
            .header("Content-Type", JSON_API_MEDIA_TYPE)
            .header("Accept", JSON_API_MEDIA_TYPE)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ItGlueError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("IT Glue GET {endpoint} -> {status}");
        Ok(response.json().await?)
    }
}

#[async_trait]
impl AssetSource for ItGlueClient {
    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn organizations(&self) -> Result<Vec<Organization>, ItGlueError> {
        let doc: Document<Vec<Organization>> = self
            .get(
                "/organizations",
                &[
                    ("page[size]", PAGE_SIZE.to_string()),
                    ("sort", "name".to_string()),
                ],
            )
            .await?;
        Ok(doc.data)
    }

    async fn organization(&self, org_id: u64) -> Result<Organization, ItGlueError> {
        let doc: Document<Organization> = self.get(&format!("/organizations/{org_id}"), &[]).await?;
        Ok(doc.data)
    }

    async fn configurations(&self, org_id: u64) -> Result<Vec<Configuration>, ItGlueError> {
        let doc: Document<Vec<Configuration>> = self
            .get(
                "/configurations",
                &[
                    ("filter[organization_id]", org_id.to_string()),
                    ("page[size]", PAGE_SIZE.to_string()),
                ],
            )
            .await?;
        Ok(doc.data)
    }
}
