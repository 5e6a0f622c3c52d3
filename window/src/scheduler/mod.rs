//! Deliver refill requests from a [crate::Cursor] to its [crate::Window].
//!
//! A [crate::Cursor] never refills its window itself. When the cursor comes close
//! to an edge of the cached window, it hands a [Direction] to a [Scheduler] (after
//! releasing the window lock) and returns immediately. The scheduler decides where
//! the refill runs:
//!
//! - [Inline] runs it on the caller's stack before `request_fill` returns, so the
//!   consumer never observes starvation (at the cost of blocking on store I/O).
//! - [Worker] hands it to a dedicated thread, overlapping store I/O with
//!   consumption.
//!
//! Refills re-check the fill level under the window lock before touching the store,
//! so duplicate or late requests are harmless.

use crate::Error;
use std::sync::Arc;
use tracing::warn;

mod worker;
pub use worker::Worker;

/// Edge of the window that should be extended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Load records after the top of the window.
    Up,
    /// Load records before the bottom of the window.
    Down,
}

/// Something that can be refilled in a given [Direction].
pub trait Fill: Send + Sync {
    fn fill(&self, direction: Direction) -> Result<(), Error>;
}

/// Receiver of fire-and-forget refill requests.
///
/// Implementations must eventually invoke [Fill::fill] for the requested
/// direction, on any thread.
pub trait Scheduler {
    fn request_fill(&self, direction: Direction);
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
    fn request_fill(&self, direction: Direction) {
        (**self).request_fill(direction)
    }
}

/// [Scheduler] that runs each refill synchronously on the requesting thread.
pub struct Inline<W: Fill> {
    target: Arc<W>,
}

impl<W: Fill> Inline<W> {
    /// Create a scheduler that refills `target` on the requesting thread.
    pub fn new(target: Arc<W>) -> Self {
        Self { target }
    }
}

impl<W: Fill> Scheduler for Inline<W> {
    fn request_fill(&self, direction: Direction) {
        if let Err(err) = self.target.fill(direction) {
            warn!(?err, ?direction, "fill failed");
        }
    }
}
