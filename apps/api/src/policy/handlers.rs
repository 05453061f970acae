//! Axum route handlers for policy generation.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Form,
};

use crate::errors::AppError;
use crate::models::form::{FormData, PolicyForm};
use crate::policy::generator::{generate_policy_document, GeneratedPolicy};
use crate::render::docx::DOCX_MIME;
use crate::state::AppState;

/// POST /generate_policy
///
/// Validates the form before any outbound call, then runs the generation
/// pipeline and streams the `.docx` back as an attachment.
pub async fn handle_generate_policy(
    State(state): State<AppState>,
    Form(form): Form<PolicyForm>,
) -> Result<Response, AppError> {
    let form = FormData::try_from(form)?;

    let now = chrono::Local::now().naive_local();
    let generated = generate_policy_document(&state.llm, &form, now).await?;

    attachment(generated)
}

fn attachment(generated: GeneratedPolicy) -> Result<Response, AppError> {
    let disposition = HeaderValue::from_str(&content_disposition(&generated.filename))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid download filename: {e}")))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(DOCX_MIME)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        generated.bytes,
    )
        .into_response())
}

/// `attachment` disposition with an ASCII fallback name plus the RFC 5987 UTF-8 form.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() && c != '"' { c } else { '_' })
        .collect();

    let encoded = urlencoding::encode(filename);
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
