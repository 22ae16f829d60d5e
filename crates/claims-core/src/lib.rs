pub mod api_types;
pub mod batch;
pub mod claim;
pub mod config;
pub mod error;
pub mod extraction;

pub use api_types::{ClaimData, HealthResponse, ProcessClaimResponse};
pub use batch::{BatchReport, BatchResult, ClaimOutcome};
pub use claim::{
    group_claims, is_supported_image, ClaimGroups, ClaimImages, ImageFormat, ImageReference,
    ImageSide,
};
pub use config::{AppConfig, BatchConfig, ExtractionConfig};
pub use error::{ClaimsError, Result};
pub use extraction::{ClaimExtractor, ImagePayload};
