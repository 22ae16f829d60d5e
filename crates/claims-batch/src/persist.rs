use std::path::Path;

use claims_core::batch::BatchResult;
use claims_core::error::{ClaimsError, Result};

/// Write the batch result document, replacing any previous one.
///
/// Written to a sibling `.tmp` file first, then renamed over `path`.
pub async fn write_results(path: &Path, results: &BatchResult) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ClaimsError::Persistence {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|source| ClaimsError::Persistence {
            path: tmp_path.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|source| ClaimsError::Persistence {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!(path = %path.display(), claims = results.len(), "Results saved");
    Ok(())
}
