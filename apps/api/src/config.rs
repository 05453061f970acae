use anyhow::{Context, Result};

const DEFAULT_API_VERSION: &str = "2024-12-01-preview";
const DEFAULT_DEPLOYMENTS: &str = "gpt-5-chat,gpt-4o";
const DEFAULT_ITGLUE_BASE_URL: &str = "https://api.itglue.com";

/// Credentials and deployment list for the Azure OpenAI chat endpoint.
///
/// Built once at startup and handed to the completion client. Missing credentials
/// are not a startup failure: `/health` reports them and generation fails per request.
#[derive(Debug, Clone)]
pub struct AzureOpenAiConfig {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub api_version: String,
    /// Candidate deployment names, tried in order.
    pub deployments: Vec<String>,
}

impl AzureOpenAiConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.endpoint.is_some()
    }
}

/// IT Glue connection settings. `api_key == None` means the integration is unconfigured.
#[derive(Debug, Clone)]
pub struct ItGlueConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub azure: AzureOpenAiConfig,
    pub itglue: ItGlueConfig,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let deployments = get("AZURE_OPENAI_DEPLOYMENTS")
            .unwrap_or_else(|| DEFAULT_DEPLOYMENTS.to_string())
            .split(',')
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();

        Ok(Config {
            azure: AzureOpenAiConfig {
                api_key: get("AZURE_OPENAI_API_KEY"),
                endpoint: get("AZURE_OPENAI_ENDPOINT"),
                api_version: get("AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
                deployments,
            },
            itglue: ItGlueConfig {
                api_key: get("ITGLUE_API_KEY"),
                base_url: get("ITGLUE_API_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_ITGLUE_BASE_URL.to_string()),
            },
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
