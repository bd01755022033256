use crate::{UrlError, UrlResult};
use url::Url;

/// The network location every in-scope URL must share with the seed
///
/// A URL is in scope when its host and explicit port are exactly those of the seed.
/// Subdomains are separate sites: `blog.example.com` is out of scope for a crawl
/// seeded at `example.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeDomain {
    host: String,
    port: Option<u16>,
}

impl ScopeDomain {
    /// Captures the scope of a crawl from its seed URL
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use sitesift::url::ScopeDomain;
    ///
    /// let seed = Url::parse("https://Example.com/start").unwrap();
    /// let scope = ScopeDomain::from_seed(&seed).unwrap();
    ///
    /// assert!(scope.contains(&Url::parse("https://example.com/about").unwrap()));
    /// assert!(!scope.contains(&Url::parse("https://other.com/").unwrap()));
    /// ```
    pub fn from_seed(seed: &Url) -> UrlResult<Self> {
        let host = host_of(seed).ok_or(UrlError::MissingHost)?;
        Ok(Self {
            host,
            port: seed.port(),
        })
    }

    /// Returns true if `url` lives on the same host and port as the seed
    pub fn contains(&self, url: &Url) -> bool {
        match url.host_str() {
            Some(host) => host.eq_ignore_ascii_case(&self.host) && url.port() == self.port,
            None => false,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Extracts the lowercase host from a URL
///
/// Returns `None` for URLs without a host such as `mailto:` links.
pub fn host_of(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
