use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use claims_core::config::ExtractionConfig;
use claims_core::error::{ClaimsError, Result};
use claims_core::extraction::{ClaimExtractor, ImagePayload};

use crate::prompts::{SINGLE_IMAGE_PROMPT, STATEMENT_PAIR_PROMPT};

const RESPONSES_PATH: &str = "openai/responses";

/// Claim extraction through the Azure OpenAI Responses API.
pub struct AzureOpenAiExtractor {
    client: reqwest::Client,
    responses_url: String,
    api_key: String,
    api_version: String,
    deployment: String,
    max_output_tokens: u32,
}

// ── Responses API request/response types ────────────────────────────────────

#[derive(Debug, Serialize)]
struct ResponsesRequest {
    model: String,
    input: Vec<InputMessage>,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct InputMessage {
    role: &'static str,
    content: Vec<InputContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InputContent {
    InputText { text: String },
    InputImage { image_url: String },
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    output_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesResponse {
    /// All `output_text` parts of all message items, concatenated.
    fn text(&self) -> Option<String> {
        if let Some(text) = self.output_text.as_deref().filter(|t| !t.is_empty()) {
            return Some(text.to_string());
        }

        let text: String = self
            .output
            .iter()
            .filter(|item| item.item_type == "message")
            .flat_map(|item| item.content.iter())
            .filter(|part| part.content_type == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect();

        (!text.is_empty()).then_some(text)
    }
}

// ── Implementation ──────────────────────────────────────────────────────────

impl AzureOpenAiExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            responses_url: format!(
                "{}/{RESPONSES_PATH}",
                config.endpoint.trim_end_matches('/')
            ),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            deployment: config.deployment.clone(),
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn data_url(image: &ImagePayload) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
        format!("data:{};base64,{encoded}", image.media_type())
    }

    fn build_request(&self, prompt: &str, images: &[&ImagePayload]) -> ResponsesRequest {
        let mut content = Vec::with_capacity(images.len() + 1);
        content.push(InputContent::InputText {
            text: prompt.to_string(),
        });
        content.extend(images.iter().map(|image| InputContent::InputImage {
            image_url: Self::data_url(image),
        }));

        ResponsesRequest {
            model: self.deployment.clone(),
            input: vec![InputMessage {
                role: "user",
                content,
            }],
            max_output_tokens: self.max_output_tokens,
        }
    }

    async fn call_responses(&self, request: &ResponsesRequest) -> Result<String> {
        tracing::debug!(
            deployment = %self.deployment,
            images = request.input.iter().map(|m| m.content.len() - 1).sum::<usize>(),
            "Sending extraction request to Azure OpenAI"
        );

        let response = self
            .client
            .post(&self.responses_url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ClaimsError::Extraction(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(ClaimsError::Extraction(format!(
                "Azure OpenAI returned status {status}: {body}"
            )));
        }

        let api_response: ResponsesResponse = response
            .json()
            .await
            .map_err(|e| ClaimsError::Extraction(format!("Failed to parse API response: {e}")))?;

        let text = api_response.text().ok_or_else(|| {
            ClaimsError::Extraction(format!(
                "No output text in API response (status: {})",
                api_response.status.as_deref().unwrap_or("unknown")
            ))
        })?;

        tracing::debug!(
            status = ?api_response.status,
            response_len = text.len(),
            "Received extraction response from Azure OpenAI"
        );

        Ok(text)
    }
}

#[async_trait]
impl ClaimExtractor for AzureOpenAiExtractor {
    async fn extract_pair(&self, front: &ImagePayload, back: &ImagePayload) -> Result<String> {
        let request = self.build_request(STATEMENT_PAIR_PROMPT, &[front, back]);
        self.call_responses(&request).await
    }

    async fn extract_single(&self, image: &ImagePayload) -> Result<String> {
        let request = self.build_request(SINGLE_IMAGE_PROMPT, &[image]);
        self.call_responses(&request).await
    }
}
