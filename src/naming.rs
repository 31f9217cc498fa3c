//! Scheduling for name lookups keyed by the current notation.
//!
//! Lookups go to an outside service and are slow, so nothing here blocks editing. Each edit hands
//! over the new notation; the scheduler waits for the sketch to settle, sends at most one request
//! at a time, and drops answers for anything that isn't current anymore. The clock is passed in, so
//! the whole thing runs the same under test as live.

use ahash::AHashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingConfig {
    /// Wait after an edit that follows a quiet period
    pub idle_delay: Duration,
    /// Wait after an edit that's part of a burst
    pub burst_delay: Duration,
    /// Edits closer together than this count as a burst
    pub burst_window: Duration,
    pub cache_capacity: usize,
    /// At most this many requests go out per `rate_window`
    pub max_requests: usize,
    pub rate_window: Duration,
}
impl NamingConfig {
    pub const fn new() -> Self {
        Self {
            idle_delay: Duration::from_millis(300),
            burst_delay: Duration::from_millis(1000),
            burst_window: Duration::from_secs(2),
            cache_capacity: 256,
            max_requests: 30,
            rate_window: Duration::from_secs(60),
        }
    }
    pub const fn with_delays(mut self, idle: Duration, burst: Duration) -> Self {
        self.idle_delay = idle;
        self.burst_delay = burst;
        self
    }
    pub const fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
    pub const fn with_rate_limit(mut self, max_requests: usize, window: Duration) -> Self {
        self.max_requests = max_requests;
        self.rate_window = window;
        self
    }
}
impl Default for NamingConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The request was called off. Never shown to the user.
    #[error("lookup cancelled")]
    Cancelled,
    #[error("network error: {0}")]
    Network(String),
    #[error("lookup timed out")]
    Timeout,
    #[error("the naming service is rate limiting us")]
    RateLimited,
}

/// The outside naming service
pub trait NameLookup {
    fn lookup(&mut self, key: &str) -> Result<Vec<String>, LookupError>;
}
impl<F: FnMut(&str) -> Result<Vec<String>, LookupError>> NameLookup for F {
    fn lookup(&mut self, key: &str) -> Result<Vec<String>, LookupError> {
        self(key)
    }
}

/// Identifies one request. An answer is only accepted for the ticket that's currently out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    /// Edit counter when the request was sent
    pub edit: u64,
    pub seq: u64,
}

/// A request the host should send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub ticket: Ticket,
    pub key: String,
}

/// Something to show the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Names { key: String, names: Vec<String> },
    NoName { key: String },
    Failed { key: String, error: LookupError },
}
impl Notice {
    fn from_names(key: String, names: Vec<String>) -> Self {
        if names.is_empty() {
            Self::NoName { key }
        } else {
            Self::Names { key, names }
        }
    }
    pub fn key(&self) -> &str {
        match self {
            Self::Names { key, .. } | Self::NoName { key } | Self::Failed { key, .. } => key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    /// Nothing to do yet
    Wait,
    /// Send this request
    Dispatch(Dispatch),
    /// Answered from the cache
    Publish(Notice),
}

#[derive(Debug, Clone)]
struct Pending {
    key: String,
    due: Instant,
}

#[derive(Debug, Clone)]
struct InFlight {
    ticket: Ticket,
    key: String,
}

#[derive(Debug, Clone, Default)]
pub struct NamingScheduler {
    pub cfg: NamingConfig,
    edit: u64,
    seq: u64,
    current: Option<String>,
    last_edit: Option<Instant>,
    pending: Option<Pending>,
    in_flight: Option<InFlight>,
    cache: AHashMap<String, Vec<String>>,
    cache_order: VecDeque<String>,
    sent: VecDeque<Instant>,
}
impl NamingScheduler {
    pub fn new(cfg: NamingConfig) -> Self {
        Self {
            cfg,
            ..Self::default()
        }
    }

    /// The notation the next answer has to be for
    pub fn current_key(&self) -> Option<&str> {
        self.current.as_deref()
    }
    pub fn edit_count(&self) -> u64 {
        self.edit
    }
    pub fn in_flight(&self) -> Option<Ticket> {
        self.in_flight.as_ref().map(|f| f.ticket)
    }
    /// When [`Self::poll`] next has something to do
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Record an edit that left the sketch with notation `key`. An empty key means there's nothing
    /// to name.
    pub fn notify_edit(&mut self, key: &str, now: Instant) {
        self.edit += 1;
        let in_burst = self
            .last_edit
            .is_some_and(|t| now.saturating_duration_since(t) < self.cfg.burst_window);
        self.last_edit = Some(now);
        if self.in_flight.as_ref().is_some_and(|f| f.key != key) {
            debug!(edit = self.edit, "structure changed, cancelling lookup");
            self.in_flight = None;
        }
        if key.is_empty() {
            self.current = None;
            self.pending = None;
            return;
        }
        let delay = if in_burst {
            self.cfg.burst_delay
        } else {
            self.cfg.idle_delay
        };
        trace!(edit = self.edit, key, ?delay, "lookup scheduled");
        self.current = Some(key.to_string());
        self.pending = Some(Pending {
            key: key.to_string(),
            due: now + delay,
        });
    }

    pub fn poll(&mut self, now: Instant) -> Poll {
        let Some(pending) = &mut self.pending else {
            return Poll::Wait;
        };
        if now < pending.due {
            return Poll::Wait;
        }
        if let Some(names) = self.cache.get(&pending.key) {
            let names = names.clone();
            let key = std::mem::take(&mut pending.key);
            self.pending = None;
            trace!(%key, "answered from cache");
            return Poll::Publish(Notice::from_names(key, names));
        }
        if let Some(f) = &self.in_flight {
            if f.key == pending.key {
                trace!(key = %f.key, "already in flight");
                self.pending = None;
            }
            return Poll::Wait;
        }
        while self
            .sent
            .front()
            .is_some_and(|&t| now.saturating_duration_since(t) >= self.cfg.rate_window)
        {
            self.sent.pop_front();
        }
        if self.sent.len() >= self.cfg.max_requests {
            if let Some(&oldest) = self.sent.front() {
                pending.due = oldest + self.cfg.rate_window;
            }
            warn!(sent = self.sent.len(), "rate limit reached, deferring lookup");
            return Poll::Wait;
        }
        let key = std::mem::take(&mut pending.key);
        self.pending = None;
        self.sent.push_back(now);
        self.seq += 1;
        let ticket = Ticket {
            edit: self.edit,
            seq: self.seq,
        };
        debug!(%key, seq = ticket.seq, "dispatching lookup");
        self.in_flight = Some(InFlight {
            ticket,
            key: key.clone(),
        });
        Poll::Dispatch(Dispatch { ticket, key })
    }

    /// Hand back the answer for a dispatched request. Answers for tickets that were cancelled or
    /// superseded are dropped, as are cancellations.
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<String>, LookupError>,
    ) -> Option<Notice> {
        if self.in_flight.as_ref().map(|f| f.ticket) != Some(ticket) {
            debug!(seq = ticket.seq, "dropping stale answer");
            return None;
        }
        let InFlight { key, .. } = self.in_flight.take()?;
        if self.current.as_deref() != Some(key.as_str()) {
            return None;
        }
        match result {
            Ok(names) => {
                self.remember(key.clone(), names.clone());
                Some(Notice::from_names(key, names))
            }
            Err(LookupError::Cancelled) => None,
            Err(error) => {
                warn!(%error, %key, "lookup failed");
                Some(Notice::Failed { key, error })
            }
        }
    }

    /// Drop anything scheduled or in flight
    pub fn cancel(&mut self) {
        if self.pending.is_some() || self.in_flight.is_some() {
            debug!("lookups cancelled");
        }
        self.pending = None;
        self.in_flight = None;
    }

    /// One poll, and if a request is due, run it through `lookup` right away
    pub fn drive<L: NameLookup + ?Sized>(&mut self, lookup: &mut L, now: Instant) -> Option<Notice> {
        match self.poll(now) {
            Poll::Wait => None,
            Poll::Publish(notice) => Some(notice),
            Poll::Dispatch(Dispatch { ticket, key }) => {
                let result = lookup.lookup(&key);
                self.resolve(ticket, result)
            }
        }
    }

    fn remember(&mut self, key: String, names: Vec<String>) {
        if self.cfg.cache_capacity == 0 {
            return;
        }
        if self.cache.insert(key.clone(), names).is_none() {
            self.cache_order.push_back(key);
        }
        while self.cache_order.len() > self.cfg.cache_capacity {
            if let Some(old) = self.cache_order.pop_front() {
                self.cache.remove(&old);
            }
        }
    }
}
