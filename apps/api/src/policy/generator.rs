//! Policy generation: orchestrates the full pipeline for one form submission.
//!
//! Flow: build prompt → chat completion with model fallback → sanitize →
//!       lay out blocks → write .docx → name the download.
//!
//! Failures come back as `AppError::Generation` or `AppError::Render`; no partial
//! document is ever produced.

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::form::FormData;
use crate::policy::prompts::{build_policy_prompt, POLICY_SYSTEM};
use crate::policy::sanitizer::{sanitize, PolicyText};
use crate::render::{docx, RenderedDocument};

/// A rendered policy ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct GeneratedPolicy {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Prompts the model and returns the sanitized policy body.
pub async fn generate_policy_text(llm: &LlmClient, form: &FormData) -> Result<PolicyText, AppError> {
    let prompt = build_policy_prompt(form);

    info!(
        "Generating {} for {} ({} chars of prompt)",
        form.policy_type,
        form.client_name,
        prompt.len()
    );

    let raw = llm
        .complete(&prompt, POLICY_SYSTEM)
        .await
        .map_err(|e| AppError::Generation(e.to_string()))?;

    let policy = sanitize(&raw);
    if policy.is_empty() {
        warn!(
            "Sanitized policy for {} is empty ({} raw chars)",
            form.client_name,
            raw.len()
        );
    }

    Ok(policy)
}

/// Runs generation and rendering end to end.
pub async fn generate_policy_document(
    llm: &LlmClient,
    form: &FormData,
    now: NaiveDateTime,
) -> Result<GeneratedPolicy, AppError> {
    let policy = generate_policy_text(llm, form).await?;

    let document = RenderedDocument::build(form, &policy, now.date());
    let bytes = docx::to_bytes(&document)?;

    let filename = download_filename(form, now);
    info!(
        "Rendered {} ({} body blocks, {} bytes)",
        filename,
        document.body.len(),
        bytes.len()
    );

    Ok(GeneratedPolicy { filename, bytes })
}

/// `<client>_<policy-type>_<YYYYmmdd_HHMM>.docx` with unsafe characters removed.
pub fn download_filename(form: &FormData, now: NaiveDateTime) -> String {
    format!(
        "{}_{}_{}.docx",
        safe_filename_part(&form.client_name),
        safe_filename_part(&form.policy_type),
        now.format("%Y%m%d_%H%M")
    )
}

/// Keeps alphanumerics, space, `-` and `_`, then drops trailing whitespace.
fn safe_filename_part(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim_end()
        .to_string()
}
