//! URL frontier: the seen-set and work queue driving the crawl
//!
//! The frontier owns the only mutable state shared between workers: the set
//! of URLs ever admitted, the queue of tasks waiting to be fetched, and the
//! count of tasks currently being processed. All three live behind a single
//! mutex so that admit/take/complete are atomic with respect to concurrent
//! workers; duplicate admission would violate the at-most-once fetch
//! guarantee.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use url::Url;

/// A unit of crawl work: a canonical URL and the depth it was discovered at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Canonical URL to fetch
    pub url: Url,

    /// Link distance from the seed (the seed itself is depth 0)
    pub depth: u32,
}

impl CrawlTask {
    /// Creates a new task
    pub fn new(url: Url, depth: u32) -> Self {
        Self { url, depth }
    }
}

#[derive(Debug, Default)]
struct FrontierInner {
    /// Every URL ever admitted, keyed by canonical string form.
    /// A URL enters this set exactly once, at the moment it is enqueued.
    seen: HashSet<String>,

    /// Tasks waiting to be fetched, FIFO. FIFO order makes the crawl
    /// breadth-first and deterministic for a fixed seed under a single
    /// worker.
    pending: VecDeque<CrawlTask>,

    /// Tasks taken but not yet completed
    in_flight: usize,
}

/// Concurrency-safe frontier shared by all crawl workers
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically admits a task if its URL has never been seen
    ///
    /// The check against the seen-set and the insertion into the queue happen
    /// under one lock acquisition, so two workers racing on the same URL
    /// admit it exactly once.
    ///
    /// # Returns
    ///
    /// * `true` - The URL was new and the task is now queued
    /// * `false` - The URL was already admitted earlier; no-op
    pub fn try_admit(&self, task: CrawlTask) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.seen.insert(task.url.as_str().to_string()) {
            inner.pending.push_back(task);
            true
        } else {
            false
        }
    }

    /// Takes the next pending task, marking it in-flight
    ///
    /// Returns `None` when nothing is queued right now. That does not mean
    /// the crawl is over: another worker may still be processing a page that
    /// will admit new tasks. Callers should check [`is_drained`] before
    /// treating an empty take as completion.
    ///
    /// [`is_drained`]: Frontier::is_drained
    pub fn take(&self) -> Option<CrawlTask> {
        let mut inner = self.inner.lock().unwrap();
        let task = inner.pending.pop_front()?;
        inner.in_flight += 1;
        Some(task)
    }

    /// Marks a previously taken task as finished
    ///
    /// Must be called exactly once per successful [`take`](Frontier::take),
    /// after any links the task produced have been admitted.
    pub fn complete(&self) {
        let mut inner = self.inner.lock().unwrap();
        debug_assert!(inner.in_flight > 0, "complete() without matching take()");
        inner.in_flight = inner.in_flight.saturating_sub(1);
    }

    /// True when no tasks are pending and none are in flight
    ///
    /// Once drained the frontier can never refill, because new tasks are only
    /// admitted while some task is in flight.
    pub fn is_drained(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.pending.is_empty() && inner.in_flight == 0
    }

    /// Number of tasks waiting to be taken
    pub fn pending_len(&self) -> usize {
        self.inner.lock().unwrap().pending.len()
    }

    /// Number of distinct URLs ever admitted
    pub fn seen_len(&self) -> usize {
        self.inner.lock().unwrap().seen.len()
    }
}
