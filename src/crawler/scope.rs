//! Scope policy: which discovered links are crawl-eligible
//!
//! The policy is a pure predicate derived once from the seed URL and the
//! configuration. It is evaluated before the frontier's admit so that
//! out-of-scope URLs never pollute the seen-set.

use url::Url;

/// Decides whether a discovered link may be admitted to the frontier
#[derive(Debug, Clone)]
pub struct ScopePolicy {
    /// Host of the seed URL, lowercased
    seed_host: String,

    /// Port of the seed URL (the known default for the scheme when not
    /// explicit). Two servers on the same host but different ports are
    /// different sites.
    seed_port: Option<u16>,

    /// Maximum crawl depth
    max_depth: u32,

    /// Whether hosts below the seed host (e.g. `blog.` under `example.com`)
    /// are in scope. Off by default: hosts are compared exactly.
    include_subdomains: bool,

    /// Optional path suffix filter (e.g. ".html"). The root path is always
    /// allowed so that a filtered crawl can still start from `/`.
    path_filter: Option<String>,
}

impl ScopePolicy {
    /// Derives the scope from the seed URL
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed URL; its host and port define the domain boundary
    /// * `max_depth` - Maximum depth at which tasks may be admitted
    /// * `include_subdomains` - Admit hosts that are subdomains of the seed host
    /// * `path_filter` - Optional required path suffix for admitted links
    pub fn new(
        seed: &Url,
        max_depth: u32,
        include_subdomains: bool,
        path_filter: Option<String>,
    ) -> Self {
        Self {
            seed_host: seed.host_str().unwrap_or_default().to_lowercase(),
            seed_port: seed.port_or_known_default(),
            max_depth,
            include_subdomains,
            path_filter,
        }
    }

    /// True iff a link at the given depth may enter the frontier
    ///
    /// Pure and side-effect-free: same host (and port) as the seed, depth
    /// within the limit, and path matching the optional filter.
    pub fn is_eligible(&self, url: &Url, depth: u32) -> bool {
        if depth > self.max_depth {
            return false;
        }

        if !self.host_in_scope(url) {
            return false;
        }

        if url.port_or_known_default() != self.seed_port {
            return false;
        }

        if let Some(filter) = &self.path_filter {
            let path = url.path();
            if path != "/" && !path.ends_with(filter.as_str()) {
                return false;
            }
        }

        true
    }

    fn host_in_scope(&self, url: &Url) -> bool {
        let host = match url.host_str() {
            Some(h) => h.to_lowercase(),
            None => return false,
        };

        if host == self.seed_host {
            return true;
        }

        self.include_subdomains && host.ends_with(&format!(".{}", self.seed_host))
    }
}
