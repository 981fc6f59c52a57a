//! Cache key generation for stored entries.

use sha2::{Digest, Sha256};
use url::Url;

/// Normalized URL used as the key material: the fragment never reaches the server,
/// so two requests differing only in fragment share an entry.
pub fn normalize_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

/// Compute the cache key for a request.
pub fn compute_cache_key(method: &str, url: &Url) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(normalize_url(url).as_bytes());
    hex::encode(hasher.finalize())
}
