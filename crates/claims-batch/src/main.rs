use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use claims_batch::BatchOrchestrator;
use claims_core::{AppConfig, BatchReport, Result};
use claims_extraction::AzureOpenAiExtractor;

const DEFAULT_LOG_FILTER: &str = "claims_batch=info,claims_extraction=info,claims_core=info";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    // Usage: claims-batch [INPUT_DIR] [OUTPUT_FILE]
    let mut config = AppConfig::from_env();
    let mut args = std::env::args().skip(1);
    if let Some(input_dir) = args.next() {
        config.batch.input_dir = PathBuf::from(input_dir);
    }
    let output_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.batch.output_path());

    match run(&config, &output_path).await {
        Ok(report) => {
            print_summary(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Batch run failed");
            eprintln!("Batch run failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &AppConfig, output_path: &std::path::Path) -> Result<BatchReport> {
    config.validate()?;
    info!(
        endpoint = %config.extraction.endpoint,
        deployment = %config.extraction.deployment,
        api_version = %config.extraction.api_version,
        max_concurrency = config.batch.max_concurrency,
        "Configuration loaded, using Responses API"
    );

    let extractor = Arc::new(AzureOpenAiExtractor::new(&config.extraction)?);
    let orchestrator = BatchOrchestrator::new(extractor)
        .with_max_concurrency(config.batch.max_concurrency)
        .with_call_timeout(config.extraction.timeout());

    orchestrator.run(&config.batch.input_dir, output_path).await
}

fn print_summary(report: &BatchReport) {
    println!(
        "Processed {} of {} claims ({} complete pairs attempted)",
        report.processed(),
        report.total_claims(),
        report.attempted()
    );
    for (claim_id, error) in report.failed() {
        println!("  failed      {claim_id}: {error}");
    }
    for claim_id in report.incomplete() {
        println!("  incomplete  {claim_id}");
    }
    for file in &report.unparsable_files {
        println!("  unparsable  {file}");
    }
    println!("Results saved to {}", report.output_path.display());
}
