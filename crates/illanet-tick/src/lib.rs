//! Main-loop scheduling for illanet.
//!
//! Two pieces live here:
//!
//! - [`ExecutionQueue`]: decoded messages wait here until the main loop
//!   applies them. Each apply attempt reports [`Progress`]; messages that
//!   are not ready yet stay queued under a [`RetryPolicy`].
//! - [`UpdateClock`]: a fixed-rate tick source for loops that are not
//!   driven by a renderer.
//!
//! # Integration
//!
//! ```ignore
//! let mut queue = ExecutionQueue::new(RetryPolicy::UNLIMITED, RetryOrder::HeadOfLine);
//! loop {
//!     clock.wait_for_tick().await;
//!     while let Ok(msg) = rx.try_recv() {
//!         queue.push(msg);
//!     }
//!     let report = queue.run_tick(|msg| apply(msg));
//! }
//! ```

mod clock;
mod queue;

pub use clock::{ClockTick, UpdateClock};
pub use queue::{ExecutionQueue, Progress, RetryOrder, RetryPolicy, TickReport};
