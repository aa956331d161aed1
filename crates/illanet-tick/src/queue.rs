//! Queue of decoded messages waiting to be applied on the main loop.
//!
//! The receive loop decodes, the main loop executes. Between the two sits
//! an [`ExecutionQueue`]: once per tick the main loop calls
//! [`run_tick`](ExecutionQueue::run_tick), which hands queued items to an
//! executor in FIFO order. The executor answers with a [`Progress`]:
//!
//! ```text
//!            push                 run_tick
//! Decoded ─────────► Queued ─────────────────► Executing ──► Complete ─► gone
//!                      ▲                           │
//!                      └─────────── Retry ─────────┘
//!                                                  └──────► Dropped ──► gone
//! ```
//!
//! A `Retry` keeps the item queued for the next tick. How long that may go
//! on is a [`RetryPolicy`] decision; what happens to the items *behind* a
//! retrying one is a [`RetryOrder`] decision.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, error, trace, warn};

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Outcome of one execute attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Fully applied; remove from the queue.
    Complete,
    /// World state is not ready yet; try again on a later tick.
    Retry,
    /// Not applicable and never will be; remove without retrying.
    Dropped,
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// When a retrying item gives up.
///
/// Both limits are optional. With neither set, an item retries for as long
/// as its executor keeps answering [`Progress::Retry`]. The default gives up
/// after [`DEFAULT_MAX_AGE`](Self::DEFAULT_MAX_AGE), so a message whose
/// world state never shows up cannot hold the queue forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Drop after this many execute attempts (the first attempt counts).
    pub max_attempts: Option<u32>,
    /// Drop once the item has been queued for this long.
    pub max_age: Option<Duration>,
}

impl RetryPolicy {
    /// Queue age after which the default policy drops a retrying item.
    pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30);

    /// Retry forever.
    pub const UNLIMITED: Self = Self {
        max_attempts: None,
        max_age: None,
    };

    fn is_exhausted(&self, attempts: u32, age: Duration) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
            || self.max_age.is_some_and(|max| age >= max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            max_age: Some(Self::DEFAULT_MAX_AGE),
        }
    }
}

/// What happens to items queued behind one that asked for a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RetryOrder {
    /// The retrying item blocks the queue until the next tick. Execution
    /// order always equals arrival order.
    #[default]
    HeadOfLine,
    /// Later items still run this tick. A retrying item can end up applied
    /// after messages that arrived behind it.
    Deferred,
}

// ---------------------------------------------------------------------------
// TickReport
// ---------------------------------------------------------------------------

/// Counts from one [`ExecutionQueue::run_tick`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Execute attempts made this tick.
    pub executed: usize,
    pub completed: usize,
    /// Attempts that answered `Retry` and stay queued.
    pub retried: usize,
    /// Items removed without completing: executor said `Dropped`, the
    /// retry policy ran out, or the executor panicked.
    pub dropped: usize,
}

impl TickReport {
    /// `true` if nothing was attempted.
    pub fn is_idle(&self) -> bool {
        self.executed == 0
    }
}

// ---------------------------------------------------------------------------
// ExecutionQueue
// ---------------------------------------------------------------------------

struct Entry<T> {
    item: T,
    attempts: u32,
    enqueued_at: Instant,
}

/// FIFO of items awaiting execution on the main loop.
///
/// Single-owner: the main loop holds it by value and feeds it from a
/// channel, so no locking is needed around it.
pub struct ExecutionQueue<T> {
    entries: VecDeque<Entry<T>>,
    policy: RetryPolicy,
    order: RetryOrder,
    ticks: u64,
}

impl<T> ExecutionQueue<T> {
    pub fn new(policy: RetryPolicy, order: RetryOrder) -> Self {
        Self {
            entries: VecDeque::new(),
            policy,
            order,
            ticks: 0,
        }
    }

    /// Appends an item; it is first attempted on the next tick.
    pub fn push(&mut self, item: T) {
        self.entries.push_back(Entry {
            item,
            attempts: 0,
            enqueued_at: Instant::now(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of `run_tick` calls so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn order(&self) -> RetryOrder {
        self.order
    }

    /// Discards everything queued. Returns how many items were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        if n > 0 {
            debug!(discarded = n, "execution queue cleared");
        }
        n
    }

    /// Runs one tick: attempts queued items in FIFO order.
    ///
    /// A panic inside `execute` is caught, logged, and counts as a drop for
    /// that item only; the rest of the tick proceeds normally.
    pub fn run_tick<F>(&mut self, mut execute: F) -> TickReport
    where
        F: FnMut(&T) -> Progress,
    {
        self.ticks += 1;
        let mut report = TickReport::default();
        let mut retained = VecDeque::new();

        while let Some(mut entry) = self.entries.pop_front() {
            entry.attempts += 1;
            report.executed += 1;

            let progress = match panic::catch_unwind(AssertUnwindSafe(|| execute(&entry.item))) {
                Ok(progress) => progress,
                Err(_) => {
                    error!(
                        tick = self.ticks,
                        attempt = entry.attempts,
                        "execute step panicked, dropping item"
                    );
                    Progress::Dropped
                }
            };

            match progress {
                Progress::Complete => report.completed += 1,
                Progress::Dropped => report.dropped += 1,
                Progress::Retry => {
                    let age = entry.enqueued_at.elapsed();
                    if self.policy.is_exhausted(entry.attempts, age) {
                        warn!(
                            attempts = entry.attempts,
                            age_ms = age.as_millis() as u64,
                            "retry limit reached, dropping item"
                        );
                        report.dropped += 1;
                        continue;
                    }

                    trace!(attempt = entry.attempts, "item not ready, retrying later");
                    report.retried += 1;
                    match self.order {
                        RetryOrder::HeadOfLine => {
                            self.entries.push_front(entry);
                            break;
                        }
                        RetryOrder::Deferred => retained.push_back(entry),
                    }
                }
            }
        }

        // Deferred retries go back in front of anything not yet attempted,
        // keeping their relative order.
        while let Some(entry) = retained.pop_back() {
            self.entries.push_front(entry);
        }

        report
    }
}

impl<T> Default for ExecutionQueue<T> {
    fn default() -> Self {
        Self::new(RetryPolicy::default(), RetryOrder::default())
    }
}

impl<T> std::fmt::Debug for ExecutionQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionQueue")
            .field("len", &self.entries.len())
            .field("policy", &self.policy)
            .field("order", &self.order)
            .field("ticks", &self.ticks)
            .finish()
    }
}
