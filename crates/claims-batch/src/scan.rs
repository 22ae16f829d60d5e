use std::path::Path;

use claims_core::error::{ClaimsError, Result};
use claims_core::is_supported_image;

/// List the supported image files directly inside `dir`, sorted by name.
///
/// Sorting makes duplicate (claim, side) resolution independent of the
/// platform's directory order.
pub async fn list_images(dir: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        ClaimsError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot read input directory {}: {e}", dir.display()),
        ))
    })?;

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        // Follows symlinks, so a linked image counts as a regular file.
        match tokio::fs::metadata(entry.path()).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(file = ?file_name, error = %e, "Skipping unreadable directory entry");
                continue;
            }
        }
        let Some(name) = file_name.to_str() else {
            tracing::warn!(file = ?file_name, "Skipping file with non UTF-8 name");
            continue;
        };
        if is_supported_image(name) {
            names.push(name.to_string());
        } else {
            tracing::debug!(file = %name, "Skipping unsupported file");
        }
    }

    names.sort();
    Ok(names)
}
