use std::path::Path;

use anyhow::{Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Image MIME type guessed from a file extension.
pub fn mime_for_path(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        "bmp" => Ok("image/bmp"),
        "svg" => Ok("image/svg+xml"),
        _ => bail!(
            "Unsupported photo type '{}'. Use jpg, png, gif, webp, bmp, or svg",
            path.display()
        ),
    }
}

/// Embed image bytes as a `data:` URL, the form photos are stored in.
#[must_use]
pub fn to_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Check that `s` is a base64 image data URL.
pub fn validate_data_url(s: &str) -> Result<()> {
    let Some(rest) = s.strip_prefix("data:image/") else {
        bail!("Photo must be an image data URL");
    };
    let Some((_, payload)) = rest.split_once(";base64,") else {
        bail!("Photo data URL must be base64 encoded");
    };
    if STANDARD.decode(payload).is_err() {
        bail!("Photo data URL has an invalid base64 payload");
    }
    Ok(())
}
