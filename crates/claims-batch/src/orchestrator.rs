use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tracing::{error, info, warn};
use uuid::Uuid;

use claims_core::batch::{BatchReport, BatchResult, ClaimOutcome};
use claims_core::claim::{group_claims, ClaimGroups, ImageFormat, ImageSide};
use claims_core::error::{ClaimsError, Result};
use claims_core::extraction::{ClaimExtractor, ImagePayload};

use crate::persist::write_results;
use crate::scan::list_images;

const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Drives one extraction call per complete front/back pair in a directory.
pub struct BatchOrchestrator {
    extractor: Arc<dyn ClaimExtractor>,
    max_concurrency: usize,
    call_timeout: Option<Duration>,
}

impl BatchOrchestrator {
    pub fn new(extractor: Arc<dyn ClaimExtractor>) -> Self {
        Self {
            extractor,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            call_timeout: None,
        }
    }

    /// Upper bound on extraction calls in flight. `1` runs claims one by one.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Scan `input_dir`, extract every complete pair and write the result
    /// document to `output_path`.
    ///
    /// Per-claim failures are recorded in the report. Only an unreadable input
    /// directory or a failed write is returned as an error.
    pub async fn run(&self, input_dir: &Path, output_path: &Path) -> Result<BatchReport> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        info!(run_id = %run_id, input_dir = %input_dir.display(), "Starting batch run");

        let files = list_images(input_dir).await?;
        let groups = group_claims(&files);
        info!(
            run_id = %run_id,
            files = files.len(),
            claims = groups.len(),
            complete_pairs = groups.complete_pairs(),
            unparsable = groups.unparsable.len(),
            "Grouped statement images"
        );

        let (results, claims) = self.process_groups(input_dir, &groups).await;

        write_results(output_path, &results).await.map_err(|e| {
            error!(run_id = %run_id, error = %e, "Failed to persist batch results");
            e
        })?;

        let report = BatchReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            input_dir: input_dir.to_path_buf(),
            output_path: output_path.to_path_buf(),
            files_scanned: files.len(),
            unparsable_files: groups.unparsable,
            claims,
            results,
        };

        info!(
            run_id = %report.run_id,
            processed = report.processed(),
            attempted = report.attempted(),
            total = report.total_claims(),
            "Batch run complete"
        );

        Ok(report)
    }

    /// Extract every complete pair in `groups`, reading images from `input_dir`.
    ///
    /// Never fails as a whole: each claim ends up with exactly one outcome and
    /// only `Processed` claims appear in the returned result.
    pub async fn process_groups(
        &self,
        input_dir: &Path,
        groups: &ClaimGroups,
    ) -> (BatchResult, BTreeMap<String, ClaimOutcome>) {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set = JoinSet::new();
        let mut task_claims: HashMap<task::Id, String> = HashMap::new();
        let mut outcomes = BTreeMap::new();

        for (claim_id, images) in &groups.claims {
            let Some((front, back)) = images.complete_pair() else {
                let missing = images.missing_side().unwrap_or(ImageSide::Back);
                info!(claim_id = %claim_id, missing = %missing, "Skipping incomplete claim");
                outcomes.insert(claim_id.clone(), ClaimOutcome::SkippedIncomplete { missing });
                continue;
            };

            let claim_id = claim_id.clone();
            let task_claim_id = claim_id.clone();
            let front = input_dir.join(front);
            let back = input_dir.join(back);
            let extractor = self.extractor.clone();
            let semaphore = semaphore.clone();
            let call_timeout = self.call_timeout;

            let handle = join_set.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        info!(claim_id = %claim_id, "Processing claim");
                        extract_claim(extractor.as_ref(), &front, &back, call_timeout).await
                    }
                    Err(e) => Err(ClaimsError::Internal(format!("semaphore closed: {e}"))),
                };
                (claim_id, result)
            });
            task_claims.insert(handle.id(), task_claim_id);
        }

        let mut results = BatchResult::new();
        while let Some(joined) = join_set.join_next_with_id().await {
            match joined {
                Ok((_, (claim_id, Ok(raw)))) => {
                    info!(claim_id = %claim_id, response_len = raw.len(), "Completed claim");
                    results.insert(claim_id.clone(), raw);
                    outcomes.insert(claim_id, ClaimOutcome::Processed);
                }
                Ok((_, (claim_id, Err(e)))) => {
                    warn!(claim_id = %claim_id, error = %e, "Extraction failed, skipping claim");
                    outcomes.insert(
                        claim_id,
                        ClaimOutcome::SkippedExtractionFailed {
                            error: e.to_string(),
                        },
                    );
                }
                Err(join_err) => {
                    let claim_id = task_claims
                        .remove(&join_err.id())
                        .unwrap_or_else(|| "<unknown>".to_string());
                    error!(claim_id = %claim_id, error = %join_err, "Extraction task panicked");
                    outcomes.insert(
                        claim_id,
                        ClaimOutcome::SkippedExtractionFailed {
                            error: format!("extraction task panicked: {join_err}"),
                        },
                    );
                }
            }
        }

        (results, outcomes)
    }
}

async fn extract_claim(
    extractor: &dyn ClaimExtractor,
    front: &Path,
    back: &Path,
    call_timeout: Option<Duration>,
) -> Result<String> {
    let front = read_image(front).await?;
    let back = read_image(back).await?;

    let call = extractor.extract_pair(&front, &back);
    match call_timeout {
        Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
            ClaimsError::Extraction(format!("timed out after {}s", limit.as_secs_f32()))
        })?,
        None => call.await,
    }
}

async fn read_image(path: &Path) -> Result<ImagePayload> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        ClaimsError::Extraction(format!("cannot read {}: {e}", path.display()))
    })?;
    let format = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(ImageFormat::from_file_name)
        .unwrap_or(ImageFormat::Jpeg);
    Ok(ImagePayload::new(bytes, format))
}
