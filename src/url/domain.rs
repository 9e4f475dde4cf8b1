use url::Url;

/// Extracts the host from a URL, lowercased
///
/// Returns `None` if the URL has no host, which cannot happen for URLs that
/// passed through [`normalize_url`](crate::url::normalize_url).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scuttle::url::extract_host;
///
/// let url = Url::parse("https://Example.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
