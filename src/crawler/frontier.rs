//! FIFO crawl frontier with visited/in-queue bookkeeping.
//!
//! Invariants: a URL is enqueued at most once and fetched at most once per
//! crawl session. `in_queue` covers every URL currently queued; `visited`
//! covers every URL already handed out by [`Frontier::dequeue`]. The two
//! sets are disjoint except for the in-flight URL, which moves from
//! `in_queue` to `visited` at dequeue time.

use std::collections::{HashSet, VecDeque};

/// Breadth-first frontier of candidate URLs
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    visited: HashSet<String>,
    in_queue: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate URL unless it was already queued or visited.
    ///
    /// Returns true when the URL was actually enqueued.
    pub fn enqueue(&mut self, url: &str) -> bool {
        if self.visited.contains(url) || !self.in_queue.insert(url.to_string()) {
            return false;
        }
        self.queue.push_back(url.to_string());
        true
    }

    /// Take the next URL in FIFO order, marking it visited.
    ///
    /// Returns None when the frontier is exhausted.
    pub fn dequeue(&mut self) -> Option<String> {
        let url = self.queue.pop_front()?;
        self.in_queue.remove(&url);
        self.visited.insert(url.clone());
        Some(url)
    }

    /// Whether a URL has already been dequeued this session
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of URLs waiting in the queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of URLs dequeued so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
