use std::sync::Arc;
use std::time::Duration;

use claims_core::{AppConfig, ClaimExtractor};
use claims_extraction::AzureOpenAiExtractor;

#[derive(Clone)]
pub struct AppState {
    pub service_name: String,
    /// `None` when the extraction configuration is incomplete.
    pub extractor: Option<Arc<dyn ClaimExtractor>>,
    pub config_error: Option<String>,
    pub call_timeout: Duration,
}

impl AppState {
    pub fn new(service_name: impl Into<String>, extractor: Arc<dyn ClaimExtractor>) -> Self {
        Self {
            service_name: service_name.into(),
            extractor: Some(extractor),
            config_error: None,
            call_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Build the state from configuration.
    ///
    /// An invalid extraction configuration does not stop the server; health
    /// reports it and claim endpoints refuse work.
    pub fn from_config(config: &AppConfig) -> Self {
        let built = config
            .validate()
            .and_then(|_| AzureOpenAiExtractor::new(&config.extraction));

        let (extractor, config_error) = match built {
            Ok(extractor) => (Some(Arc::new(extractor) as Arc<dyn ClaimExtractor>), None),
            Err(e) => {
                tracing::warn!(error = %e, "Extraction client unavailable");
                (None, Some(e.to_string()))
            }
        };

        Self {
            service_name: config.service_name.clone(),
            extractor,
            config_error,
            call_timeout: config.extraction.timeout(),
        }
    }
}
