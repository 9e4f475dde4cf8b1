//! Crawl coordinator: worker pool orchestration over the frontier
//!
//! The coordinator wires the pipeline together: workers pull tasks from the
//! frontier, fetch them, persist successful bodies through the sink, extract
//! links, filter them through the scope policy, and admit survivors back into
//! the frontier. The crawl ends when the frontier is drained or the cancel
//! token fires; either way a summary is produced.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, FetchResult, Fetcher};
use crate::crawler::parser::extract_links;
use crate::crawler::scope::ScopePolicy;
use crate::frontier::{CrawlTask, Frontier};
use crate::sink::PersistenceSink;
use crate::url::normalize_url;
use crate::{ConfigError, ScuttleError};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// User agent sent with every request
const USER_AGENT: &str = concat!("scuttle/", env!("CARGO_PKG_VERSION"));

/// How long an idle worker sleeps before re-polling the frontier
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Crawl-wide cancellation signal
///
/// Cloneable handle observable by every worker. After [`cancel`] is called
/// no new task is dispatched and no new URL is admitted; fetches already in
/// flight are allowed to finish.
///
/// [`cancel`]: CancelToken::cancel
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation to every holder of a clone
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once [`cancel`](CancelToken::cancel) has been called
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Counters shared by all workers, folded into the final summary
#[derive(Debug, Default)]
struct CrawlStats {
    pages_fetched: AtomicU64,
    pages_skipped: AtomicU64,
    http_errors: AtomicU64,
    network_errors: AtomicU64,
    timeouts: AtomicU64,
    store_failures: AtomicU64,
    bytes_stored: AtomicU64,
    max_depth_reached: AtomicU32,
}

impl CrawlStats {
    fn record_depth(&self, depth: u32) {
        self.max_depth_reached.fetch_max(depth, Ordering::Relaxed);
    }
}

/// Final report of a crawl run
///
/// Always produced, even when every individual fetch failed or the crawl was
/// cancelled midway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Pages fetched and stored successfully
    pub pages_fetched: u64,

    /// Pages that failed (HTTP errors, network errors, timeouts)
    pub pages_failed: u64,

    /// Pages skipped because their Content-Type was not HTML
    pub pages_skipped: u64,

    /// Non-2xx responses
    pub http_errors: u64,

    /// Connection and protocol failures
    pub network_errors: u64,

    /// Fetches that exceeded the timeout
    pub timeouts: u64,

    /// Pages fetched but not persisted because the sink failed
    pub store_failures: u64,

    /// Total bytes written to the sink
    pub bytes_stored: u64,

    /// Deepest depth at which a page was actually fetched
    pub max_depth_reached: u32,

    /// Distinct URLs admitted to the frontier over the whole run
    pub urls_seen: u64,
}

/// State shared between the coordinator and its workers
struct CrawlShared {
    frontier: Frontier,
    fetcher: Fetcher,
    scope: ScopePolicy,
    sink: PersistenceSink,
    cancel: CancelToken,
    max_depth: u32,
    stats: CrawlStats,
}

/// Main crawl orchestrator
///
/// Constructed in the `Idle` state with the seed admitted at depth 0;
/// [`run`](Coordinator::run) moves through `Running` and `Draining` and
/// returns the summary once `Done`.
pub struct Coordinator {
    shared: Arc<CrawlShared>,
    concurrency: u32,
}

impl Coordinator {
    /// Creates a coordinator for one crawl run
    ///
    /// All fatal errors surface here, before anything is fetched: an
    /// unusable seed URL or an output directory that cannot be created.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration
    /// * `seed` - The seed URL; its host defines the domain scope
    pub fn new(config: Config, seed: Url) -> Result<Self, ScuttleError> {
        let seed = normalize_url(seed.as_str(), None)
            .map_err(|e| ConfigError::InvalidSeed(e.to_string()))?;

        let sink = PersistenceSink::new(&config.output.directory)
            .map_err(|e| ConfigError::OutputDir(format!("{}: {}", config.output.directory, e)))?;

        let client = build_http_client(USER_AGENT, config.crawler.timeout())?;
        let fetcher = Fetcher::new(client, config.crawler.retries);

        let scope = ScopePolicy::new(
            &seed,
            config.crawler.max_depth,
            config.crawler.include_subdomains,
            config.crawler.scope_filter.clone(),
        );

        let frontier = Frontier::new();
        frontier.try_admit(CrawlTask::new(seed, 0));

        Ok(Self {
            shared: Arc::new(CrawlShared {
                frontier,
                fetcher,
                scope,
                sink,
                cancel: CancelToken::new(),
                max_depth: config.crawler.max_depth,
                stats: CrawlStats::default(),
            }),
            concurrency: config.crawler.concurrency,
        })
    }

    /// Returns a handle that can cancel this crawl from outside
    pub fn cancel_token(&self) -> CancelToken {
        self.shared.cancel.clone()
    }

    /// Runs the crawl to completion and returns the summary
    ///
    /// Spawns the worker pool and waits for every worker to exit. Workers
    /// exit when the frontier is drained or the cancel token fires. Per-task
    /// failures never propagate out of this method.
    pub async fn run(self) -> Result<CrawlSummary, ScuttleError> {
        let started = Instant::now();
        tracing::info!(
            "Starting crawl with {} workers, max depth {}",
            self.concurrency,
            self.shared.max_depth
        );

        let mut handles = Vec::with_capacity(self.concurrency as usize);
        for worker_id in 0..self.concurrency {
            let shared = Arc::clone(&self.shared);
            handles.push(tokio::spawn(worker_loop(shared, worker_id)));
        }

        for handle in handles {
            handle.await?;
        }

        let summary = self.shared.summary();
        tracing::info!(
            "Crawl finished in {:?}: {} fetched, {} failed, {} skipped, max depth {}",
            started.elapsed(),
            summary.pages_fetched,
            summary.pages_failed,
            summary.pages_skipped,
            summary.max_depth_reached
        );

        Ok(summary)
    }
}

/// Worker loop: take, process, repeat until drained or cancelled
async fn worker_loop(shared: Arc<CrawlShared>, worker_id: u32) {
    loop {
        if shared.cancel.is_cancelled() {
            tracing::debug!("Worker {} stopping: crawl cancelled", worker_id);
            break;
        }

        match shared.frontier.take() {
            Some(task) => {
                process_task(&shared, task).await;
                shared.frontier.complete();
            }
            None => {
                if shared.frontier.is_drained() {
                    tracing::debug!("Worker {} stopping: frontier drained", worker_id);
                    break;
                }
                // Another worker is mid-page and may still admit children
                tokio::time::sleep(IDLE_POLL_INTERVAL).await;
            }
        }
    }
}

/// Processes one task end to end
///
/// Every failure here is local: logged, counted, and dropped. Nothing a
/// single page does can abort the crawl.
async fn process_task(shared: &CrawlShared, task: CrawlTask) {
    tracing::debug!("Fetching {} at depth {}", task.url, task.depth);
    shared.stats.record_depth(task.depth);

    match shared.fetcher.fetch(&task.url).await {
        FetchResult::Success { body, .. } => {
            shared.stats.pages_fetched.fetch_add(1, Ordering::Relaxed);

            match shared.sink.store(&task.url, body.as_bytes()) {
                Ok(path) => {
                    shared
                        .stats
                        .bytes_stored
                        .fetch_add(body.len() as u64, Ordering::Relaxed);
                    tracing::debug!("Stored {} -> {}", task.url, path.display());
                }
                Err(e) => {
                    shared.stats.store_failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!("Failed to store {}: {}", task.url, e);
                }
            }

            admit_links(shared, &task, &body);
        }

        FetchResult::SkippedNonHtml { content_type } => {
            shared.stats.pages_skipped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Skipping {}: content type {}", task.url, content_type);
        }

        FetchResult::HttpError { status_code } => {
            shared.stats.http_errors.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("HTTP {} for {}", status_code, task.url);
        }

        FetchResult::NetworkError { error } => {
            shared.stats.network_errors.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Network error for {}: {}", task.url, error);
        }

        FetchResult::Timeout => {
            shared.stats.timeouts.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Timeout fetching {}", task.url);
        }
    }
}

/// Extracts links from a fetched page and admits the eligible ones
///
/// A page at `depth == max_depth` is fetched and stored, but its children
/// land at `depth + 1` and the scope policy rejects them; the depth bound is
/// enforced entirely here, before admission, so no over-deep task is ever
/// fetched.
fn admit_links(shared: &CrawlShared, task: &CrawlTask, body: &str) {
    let child_depth = task.depth + 1;

    for link in extract_links(body, &task.url) {
        // No admissions after cancellation
        if shared.cancel.is_cancelled() {
            return;
        }

        if !shared.scope.is_eligible(&link, child_depth) {
            continue;
        }

        if shared.frontier.try_admit(CrawlTask::new(link, child_depth)) {
            tracing::trace!("Admitted child of {} at depth {}", task.url, child_depth);
        }
    }
}

impl CrawlShared {
    fn summary(&self) -> CrawlSummary {
        let http_errors = self.stats.http_errors.load(Ordering::Relaxed);
        let network_errors = self.stats.network_errors.load(Ordering::Relaxed);
        let timeouts = self.stats.timeouts.load(Ordering::Relaxed);

        CrawlSummary {
            pages_fetched: self.stats.pages_fetched.load(Ordering::Relaxed),
            pages_failed: http_errors + network_errors + timeouts,
            pages_skipped: self.stats.pages_skipped.load(Ordering::Relaxed),
            http_errors,
            network_errors,
            timeouts,
            store_failures: self.stats.store_failures.load(Ordering::Relaxed),
            bytes_stored: self.stats.bytes_stored.load(Ordering::Relaxed),
            max_depth_reached: self.stats.max_depth_reached.load(Ordering::Relaxed),
            urls_seen: self.frontier.seen_len() as u64,
        }
    }
}
