use std::path::Path;

use anyhow::{Context, Result};

use fit28_core::photo::{mime_for_path, to_data_url};

/// Read an image file and embed it as a data URL.
pub(crate) async fn load_photo(path: &Path) -> Result<String> {
    let mime = mime_for_path(path)?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read photo {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded photo");
    Ok(to_data_url(&bytes, mime))
}

/// [`load_photo`] for an optional `--photo` argument.
pub(crate) async fn load_optional(path: Option<&Path>) -> Result<Option<String>> {
    match path {
        Some(p) => load_photo(p).await.map(Some),
        None => Ok(None),
    }
}
