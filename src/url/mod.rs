//! URL handling module for Sitesift
//!
//! This module provides seed URL validation and the same-host scope check that
//! decides which discovered links the crawler follows.

mod scope;

use crate::{UrlError, UrlResult};
use url::Url;

pub use scope::{host_of, ScopeDomain};

/// Parses and validates a seed URL
///
/// The seed must be an absolute `http` or `https` URL with a host.
///
/// # Examples
///
/// ```
/// use sitesift::url::parse_seed_url;
///
/// assert!(parse_seed_url("https://example.com/").is_ok());
/// assert!(parse_seed_url("mailto:admin@example.com").is_err());
/// assert!(parse_seed_url("/relative/path").is_err());
/// ```
pub fn parse_seed_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}
