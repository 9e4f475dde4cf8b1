//! Persistence sink: writes fetched page bodies to the output directory
//!
//! Storage keys preserve the URL's full path as a directory tree under the
//! output root, so `/docs/a.html` and `/guides/a.html` never collide the way
//! a last-segment naming scheme would. Every path segment becomes a
//! directory and the body lands in an `index.html` file inside it, so a page
//! URL never occupies a name a deeper page needs as a directory: `/docs`
//! stores at `docs/index.html` and `/docs/a.html` at
//! `docs/a.html/index.html`, in either crawl order. URLs with a query string
//! get a short content-independent hash suffix so that `/search?q=a` and
//! `/search?q=b` land in distinct files.

use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

/// File name used for URLs whose path ends in `/`
const INDEX_FILE: &str = "index.html";

/// Longest sanitized path segment the sink will produce
const MAX_SEGMENT_LEN: usize = 128;

/// Writes page bodies under a root directory, keyed by URL
#[derive(Debug, Clone)]
pub struct PersistenceSink {
    root: PathBuf,
}

impl PersistenceSink {
    /// Creates a sink rooted at `root`, creating the directory if needed
    ///
    /// Failing to create the root is a configuration error and fatal to the
    /// crawl; failures on individual writes later are not.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The output root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `content` to the file keyed by `url`, creating parent
    /// directories as needed
    ///
    /// Writes for different keys are independent and may run concurrently
    /// from multiple workers without coordination.
    ///
    /// # Returns
    ///
    /// * `Ok(path)` - The file the content was written to
    /// * `Err(e)` - Permission or disk failure; the caller logs and continues
    pub fn store(&self, url: &Url, content: &[u8]) -> io::Result<PathBuf> {
        let path = self.root.join(key_for(url));

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// Derives the relative storage key for a URL
///
/// Every non-empty path segment becomes a sanitized directory and the body
/// is stored as `index.html` inside the deepest one. Directory names are
/// never equal to `index.html` (sanitization reserves it), so no page's
/// file can block another page's directory regardless of store order. A
/// query string appends an 8-hex-character hash of the full URL to the
/// file stem.
pub fn key_for(url: &Url) -> PathBuf {
    let mut key = PathBuf::new();

    if let Some(segments) = url.path_segments() {
        for segment in segments {
            if !segment.is_empty() {
                key.push(sanitize_segment(segment));
            }
        }
    }

    let file_name = match url.query() {
        Some(query) if !query.is_empty() => append_hash(INDEX_FILE, url.as_str()),
        _ => INDEX_FILE.to_string(),
    };

    key.push(file_name);
    key
}

/// Replaces filesystem-hostile characters and truncates over-long segments
///
/// The `url` crate has already resolved `.` and `..` segments before this
/// point, so sanitization only needs to handle characters. The output is
/// always usable as a directory name: never empty, never only dots, and
/// never the reserved `index.html` file name.
fn sanitize_segment(segment: &str) -> String {
    let mut cleaned: String = segment
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.len() > MAX_SEGMENT_LEN {
        cleaned.truncate(MAX_SEGMENT_LEN);
    }

    // A segment of only dots would escape or hide the file
    if cleaned.chars().all(|c| c == '.') {
        cleaned = "_".to_string();
    }

    // The index file name is reserved for page bodies
    if cleaned == INDEX_FILE {
        cleaned.push('_');
    }

    cleaned
}

/// Inserts a short URL hash before the file extension
fn append_hash(file_name: &str, full_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(full_url.as_bytes());
    let digest = hex::encode(hasher.finalize());
    let short = &digest[..8];

    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, short, ext),
        _ => format!("{}-{}", file_name, short),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_key_preserves_full_path() {
        assert_eq!(
            key_for(&url("https://example.com/docs/guide/intro.html")),
            PathBuf::from("docs/guide/intro.html/index.html")
        );
    }

    #[test]
    fn test_key_no_basename_collision() {
        // The source scheme this replaces kept only the last segment,
        // which would map both of these to "a.html"
        let k1 = key_for(&url("https://example.com/docs/a.html"));
        let k2 = key_for(&url("https://example.com/guides/a.html"));
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_key_directory_url_becomes_index() {
        assert_eq!(
            key_for(&url("https://example.com/")),
            PathBuf::from("index.html")
        );
        assert_eq!(
            key_for(&url("https://example.com/docs/")),
            PathBuf::from("docs/index.html")
        );
        // With or without the trailing slash, a path maps to the same key
        assert_eq!(
            key_for(&url("https://example.com/docs")),
            PathBuf::from("docs/index.html")
        );
    }

    #[test]
    fn test_key_prefix_path_never_occupies_directory_name() {
        // "/docs" must not claim the name "docs" as a file, or "/docs/a.html"
        // could never create the "docs" directory
        let parent = key_for(&url("https://example.com/docs"));
        let child = key_for(&url("https://example.com/docs/a.html"));

        assert_eq!(parent, PathBuf::from("docs/index.html"));
        assert_eq!(child, PathBuf::from("docs/a.html/index.html"));
    }

    #[test]
    fn test_key_index_segment_reserved() {
        // A path segment literally named "index.html" must not collide with
        // the file the parent directory URL stores into
        let dir_url = key_for(&url("https://example.com/"));
        let page = key_for(&url("https://example.com/index.html"));

        assert_eq!(dir_url, PathBuf::from("index.html"));
        assert_eq!(page, PathBuf::from("index.html_/index.html"));
    }

    #[test]
    fn test_key_query_gets_hash_suffix() {
        let k1 = key_for(&url("https://example.com/search?q=a"));
        let k2 = key_for(&url("https://example.com/search?q=b"));
        let plain = key_for(&url("https://example.com/search"));

        assert_ne!(k1, k2);
        assert_ne!(k1, plain);
        assert_eq!(plain, PathBuf::from("search/index.html"));
    }

    #[test]
    fn test_key_query_hash_before_extension() {
        let key = key_for(&url("https://example.com/page.html?v=2"));
        let name = key.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("index-"));
        assert!(name.ends_with(".html"));
    }

    #[test]
    fn test_key_is_deterministic() {
        let u = url("https://example.com/search?q=rust");
        assert_eq!(key_for(&u), key_for(&u));
    }

    #[test]
    fn test_sanitize_hostile_characters() {
        let key = key_for(&url("https://example.com/a%20b/c:d.html"));
        let s = key.to_str().unwrap();
        assert!(!s.contains(' '));
        assert!(!s.contains(':'));
        assert!(!s.contains('%'));
    }

    #[test]
    fn test_store_writes_file() {
        let dir = TempDir::new().unwrap();
        let sink = PersistenceSink::new(dir.path()).unwrap();

        let path = sink
            .store(&url("https://example.com/docs/a.html"), b"<html></html>")
            .unwrap();

        assert!(path.starts_with(dir.path()));
        assert_eq!(std::fs::read(&path).unwrap(), b"<html></html>");
    }

    #[test]
    fn test_store_prefix_path_then_child() {
        let dir = TempDir::new().unwrap();
        let sink = PersistenceSink::new(dir.path()).unwrap();

        let parent = sink.store(&url("https://example.com/docs"), b"parent").unwrap();
        let child = sink
            .store(&url("https://example.com/docs/a.html"), b"child")
            .unwrap();

        assert_eq!(std::fs::read(&parent).unwrap(), b"parent");
        assert_eq!(std::fs::read(&child).unwrap(), b"child");
    }

    #[test]
    fn test_store_child_then_prefix_path() {
        let dir = TempDir::new().unwrap();
        let sink = PersistenceSink::new(dir.path()).unwrap();

        let child = sink
            .store(&url("https://example.com/docs/a.html"), b"child")
            .unwrap();
        let parent = sink.store(&url("https://example.com/docs"), b"parent").unwrap();

        assert_eq!(std::fs::read(&parent).unwrap(), b"parent");
        assert_eq!(std::fs::read(&child).unwrap(), b"child");
    }

    #[test]
    fn test_store_creates_nested_dirs() {
        let dir = TempDir::new().unwrap();
        let sink = PersistenceSink::new(dir.path()).unwrap();

        let path = sink
            .store(&url("https://example.com/a/b/c/d.html"), b"x")
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_store_overwrites_same_key() {
        let dir = TempDir::new().unwrap();
        let sink = PersistenceSink::new(dir.path()).unwrap();
        let u = url("https://example.com/page.html");

        sink.store(&u, b"old").unwrap();
        let path = sink.store(&u, b"new").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_new_creates_root() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out/pages");
        let sink = PersistenceSink::new(&nested).unwrap();
        assert!(sink.root().exists());
    }

    #[test]
    fn test_new_fails_on_unwritable_root() {
        let result = PersistenceSink::new("/proc/scuttle-no-such-dir");
        assert!(result.is_err());
    }
}
