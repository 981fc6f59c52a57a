//! URL resolution for requests handed to the worker by the host.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<UrlError> for smarttask_core::Error {
    fn from(err: UrlError) -> Self {
        smarttask_core::Error::InvalidUrl(err.to_string())
    }
}

/// Resolve a URL string against the worker's origin.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Absolute URLs (containing `://`) are kept, whatever their scheme
/// 3. Anything else is joined onto `base`
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn resolve(base: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let joined = if trimmed.contains("://") { Url::parse(trimmed) } else { base.join(trimmed) };
    let mut parsed = joined.map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    parsed.set_fragment(None);

    Ok(parsed)
}
