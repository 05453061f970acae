// Policy generation: prompt → chat completion → sanitize → render.
// All LLM calls go through llm_client; no direct Azure calls here.

pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod sanitizer;

/// The managed service provider named in prompts, cover pages and footers.
pub const PROVIDER_NAME: &str = "Crimson IT";
