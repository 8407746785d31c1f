use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::AzureOpenAiSettings;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub azure_openai_endpoint: String,
    pub azure_openai_api_key: String,
    pub azure_openai_api_version: String,
    pub azure_openai_deployment: String,
    pub llm_timeout_secs: u64,
    pub upload_folder: String,
    pub max_content_length: usize,
    pub cors_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            azure_openai_endpoint: require_env("AZURE_OPENAI_ENDPOINT")?,
            azure_openai_api_key: require_env("AZURE_OPENAI_API_KEY")?,
            azure_openai_api_version: require_env("AZURE_OPENAI_API_VERSION")?,
            azure_openai_deployment: require_env("AZURE_OPENAI_DEPLOYMENT_NAME")?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            upload_folder: std::env::var("UPLOAD_FOLDER").unwrap_or_else(|_| "uploads".to_string()),
            max_content_length: parse_env("MAX_CONTENT_LENGTH", 10 * 1024 * 1024)?,
            cors_origins: parse_origins(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".to_string()),
            ),
            port: parse_env("PORT", 5000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Settings for the single chat-completion client built at startup.
    pub fn llm_settings(&self) -> AzureOpenAiSettings {
        AzureOpenAiSettings {
            endpoint: self.azure_openai_endpoint.clone(),
            api_key: self.azure_openai_api_key.clone(),
            api_version: self.azure_openai_api_version.clone(),
            deployment: self.azure_openai_deployment.clone(),
            timeout: Duration::from_secs(self.llm_timeout_secs),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number")),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_splits_and_trims() {
        assert_eq!(
            parse_origins("http://localhost:5173, https://app.example.com ,,"),
            vec!["http://localhost:5173", "https://app.example.com"]
        );
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u16 = parse_env("VERIFY_API_TEST_UNSET_PORT", 5000).unwrap();
        assert_eq!(value, 5000);
    }
}
