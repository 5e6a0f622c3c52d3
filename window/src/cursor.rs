//! Move through a [Window] one record at a time.
//!
//! A [Cursor] sits between two records (like a text cursor): [Cursor::get_next]
//! returns the record after it and moves past it, [Cursor::get_prev] moves back
//! over the record before it and returns it. Calling one right after the other
//! therefore returns the same record twice.
//!
//! Every movement reports a [Status]. When a movement leaves the cursor close to an
//! edge of the window, a refill is requested from the cursor's [Scheduler] once the
//! window lock has been released (so a scheduler may refill synchronously).
//!
//! # Starvation
//!
//! If refills do not keep up with the consumer, movements report
//! [Status::StarvedAhead] or [Status::StarvedBehind]. The record returned with such a
//! status is still valid, but the consumer should give the scheduler a chance to
//! run before moving further in the same direction. A cursor that has no cached
//! record left in the requested direction does not move: it returns the record it
//! returned last, reports starvation again and repeats the refill request.

use crate::{
    scheduler::{Direction, Scheduler},
    Error, Record, Store, Window,
};
use std::sync::Arc;
use tracing::debug;

/// Outcome of a cursor movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// A record was returned and more are cached in the same direction.
    Ok,
    /// No record is cached ahead of the cursor although the store has more.
    StarvedAhead,
    /// At most one record is cached behind the cursor although the store has more.
    StarvedBehind,
    /// The last record of the store was returned.
    ///
    /// Reported only once the end of the store has been discovered. If the store
    /// ends exactly on a refill boundary, the end is discovered by a later (empty)
    /// refill: a consumer outrunning an asynchronous [Scheduler] may then receive
    /// the last record with [Status::StarvedAhead] and see [Status::Overflow] on
    /// the next call instead.
    EndOfForwardData,
    /// The first record of the store was returned.
    EndOfBackwardData,
    /// There is no record in the requested direction; the cursor did not move.
    Overflow,
}

/// The single consumer of a [Window].
///
/// Movements take `&mut self`: a cursor cannot be shared between consumers.
pub struct Cursor<T: Record, S: Store<T>, F: Scheduler> {
    window: Arc<Window<T, S>>,
    scheduler: F,
}

impl<T: Record, S: Store<T>, F: Scheduler> Cursor<T, S, F> {
    /// Create a cursor that reads `window` and sends refill requests to `scheduler`.
    ///
    /// The cursor starts wherever the window's cursor is (the first record after
    /// [Window::init] or [Window::reset]).
    pub fn new(window: Arc<Window<T, S>>, scheduler: F) -> Self {
        Self { window, scheduler }
    }

    /// The window read by this cursor.
    pub fn window(&self) -> &Arc<Window<T, S>> {
        &self.window
    }

    /// The scheduler receiving this cursor's refill requests.
    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    /// Return the record last returned by [Cursor::get_next] or [Cursor::get_prev]
    /// without moving (the first record before any movement).
    ///
    /// Returns `None` if that record is not cached (the store is empty).
    pub fn get_current(&self) -> Option<T> {
        let state = self.window.lock();
        (state.bottom..state.top)
            .contains(&state.current)
            .then(|| state.record(state.current))
    }

    /// Return the record after the cursor and move past it.
    pub fn get_next(&mut self) -> (T, Status) {
        let (record, status, request) = {
            let mut state = self.window.lock();
            if state.fill_level_up() == 0 {
                // Nothing to return: repeat the last record
                let record = state.record(state.base.saturating_sub(1));
                if state.at_end() {
                    (record, Status::Overflow, false)
                } else {
                    (record, Status::StarvedAhead, true)
                }
            } else {
                let record = state.record(state.base);
                state.current = state.base;
                state.base += 1;
                if let Some(end) = state.top_of_file {
                    assert!(state.top <= end, "window exceeds store: {} > {end}", state.top);
                }
                let status = if state.at_end() && state.base == state.top {
                    Status::EndOfForwardData
                } else if state.fill_level_up() == 0 && !state.at_end() {
                    Status::StarvedAhead
                } else {
                    Status::Ok
                };
                (record, status, self.window.wants_up(&state))
            }
        };
        if status == Status::StarvedAhead {
            self.window.metrics.starvations.inc();
            debug!("cursor starved ahead");
        }

        // The lock is released: the scheduler may refill on this stack
        if request {
            self.scheduler.request_fill(Direction::Up);
        }
        (record, status)
    }

    /// Move back over the record before the cursor and return it.
    pub fn get_prev(&mut self) -> (T, Status) {
        let (record, status, request) = {
            let mut state = self.window.lock();
            if state.base == 0 {
                // Already before the first record of the store
                (state.record(0), Status::Overflow, false)
            } else if state.fill_level_down() == 0 {
                // Nothing to return: repeat the last record
                (state.record(state.base), Status::StarvedBehind, true)
            } else {
                state.base -= 1;
                state.current = state.base;
                let record = state.record(state.base);
                let status = if state.bottom == 0 && state.base == 0 {
                    Status::EndOfBackwardData
                } else if state.fill_level_down() <= 1 && state.bottom > 0 {
                    Status::StarvedBehind
                } else {
                    Status::Ok
                };
                (record, status, self.window.wants_down(&state))
            }
        };
        if status == Status::StarvedBehind {
            self.window.metrics.starvations.inc();
            debug!("cursor starved behind");
        }

        // The lock is released: the scheduler may refill on this stack
        if request {
            self.scheduler.request_fill(Direction::Down);
        }
        (record, status)
    }

    /// Return to the first record of the store (see [Window::reset]).
    pub fn reset(&mut self) -> Result<(), Error> {
        self.window.reset()
    }
}
