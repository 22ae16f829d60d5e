use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClaimsError, Result};

pub const DEFAULT_API_VERSION: &str = "2025-03-01-preview";
pub const DEFAULT_OUTPUT_FILE: &str = "gpt4_statement_results.json";

/// Connection settings for the hosted multimodal model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub endpoint: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

impl ExtractionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub output_file: String,
    pub max_concurrency: usize,
}

impl BatchConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub extraction: ExtractionConfig,
    pub batch: BatchConfig,
    pub server_host: String,
    pub server_port: u16,
    pub service_name: String,
}

impl AppConfig {
    /// Resolve the configuration once from the process environment.
    pub fn from_env() -> Self {
        Self {
            extraction: ExtractionConfig {
                endpoint: std::env::var("AZURE_OPENAI_ENDPOINT").unwrap_or_default(),
                api_key: std::env::var("AZURE_OPENAI_KEY").unwrap_or_default(),
                deployment: std::env::var("AZURE_OPENAI_DEPLOYMENT_NAME").unwrap_or_default(),
                api_version: std::env::var("AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(|_| DEFAULT_API_VERSION.into()),
                max_output_tokens: env_parse("EXTRACTION_MAX_OUTPUT_TOKENS").unwrap_or(2000),
                timeout_secs: env_parse("EXTRACTION_TIMEOUT_SECS").unwrap_or(120),
            },
            batch: BatchConfig {
                input_dir: std::env::var("STATEMENTS_IMAGE_FOLDER")
                    .unwrap_or_else(|_| "data/statements".into())
                    .into(),
                output_dir: std::env::var("STATEMENTS_OUTPUT_LOCATION")
                    .unwrap_or_else(|_| "output/gpt".into())
                    .into(),
                output_file: std::env::var("STATEMENTS_OUTPUT_FILE")
                    .unwrap_or_else(|_| DEFAULT_OUTPUT_FILE.into()),
                max_concurrency: env_parse::<usize>("BATCH_MAX_CONCURRENCY")
                    .unwrap_or(4)
                    .max(1),
            },
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: env_parse("SERVER_PORT").unwrap_or(8080),
            service_name: std::env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "claims-processing-api".into()),
        }
    }

    /// Check that everything the extraction client needs is present.
    pub fn validate(&self) -> Result<()> {
        let extraction = &self.extraction;
        if extraction.endpoint.trim().is_empty() {
            return Err(ClaimsError::Config("AZURE_OPENAI_ENDPOINT is not set".into()));
        }
        Url::parse(&extraction.endpoint).map_err(|e| {
            ClaimsError::Config(format!(
                "AZURE_OPENAI_ENDPOINT '{}' is not a valid URL: {e}",
                extraction.endpoint
            ))
        })?;
        if extraction.api_key.trim().is_empty() {
            return Err(ClaimsError::Config("AZURE_OPENAI_KEY is not set".into()));
        }
        if extraction.deployment.trim().is_empty() {
            return Err(ClaimsError::Config(
                "AZURE_OPENAI_DEPLOYMENT_NAME is not set".into(),
            ));
        }
        if self.batch.max_concurrency == 0 {
            return Err(ClaimsError::Config(
                "BATCH_MAX_CONCURRENCY must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
