mod client;
mod parse;
pub mod prompts;

pub use client::AzureOpenAiExtractor;
pub use parse::{parse_claim_data, parse_model_json, strip_code_fences};
