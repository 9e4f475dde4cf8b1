use crate::UrlError;
use url::Url;

/// Normalizes a raw link into a canonical absolute URL
///
/// # Normalization Steps
///
/// 1. Resolve the link against `base` if one is given, otherwise parse it as
///    an absolute URL; reject if malformed
/// 2. Require an `http` or `https` scheme
/// 3. Require a host
/// 4. Strip the fragment (everything after `#`)
///
/// The `url` crate performs the remaining canonicalization on parse: the
/// scheme and host are lowercased, default ports (80/443) are elided, dot
/// segments are resolved, and an empty path becomes `/`. The result is
/// idempotent: normalizing an already-normalized URL is a no-op.
///
/// # Arguments
///
/// * `raw` - The raw link text, absolute or relative
/// * `base` - The URL of the page the link was found on, used to resolve
///   relative references
///
/// # Returns
///
/// * `Ok(Url)` - The canonical absolute URL
/// * `Err(UrlError)` - The link is malformed or out of protocol scope;
///   callers drop the link and log at most a debug message
///
/// # Examples
///
/// ```
/// use scuttle::url::normalize_url;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/index.html").unwrap();
/// let url = normalize_url("../page#section", Some(&base)).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_url(raw: &str, base: Option<&Url>) -> Result<Url, UrlError> {
    let mut url = match base {
        Some(base) => base
            .join(raw.trim())
            .map_err(|e| UrlError::Parse(e.to_string()))?,
        None => Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?,
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}
