//! Cache a sliding window of a [Store] in a fixed-capacity ring.
//!
//! # Layout
//!
//! A [Window] holds at most `N` (the capacity) consecutive records of the store.
//! Record `i` always lives in ring slot `i mod N`, so the window can slide in
//! either direction by overwriting the slots that fall out of it:
//!
//! ```text
//!            bottom            base                top
//!              |                 |                   |
//!  store: .... [ 512 | 513 | ... | 700 | ... | 1535 ] 1536 ....
//!  slot:         512   513   ...   700   ...   511
//! ```
//!
//! The window `[bottom, top)` always satisfies `top - bottom <= N`. The cursor
//! `base` sits between `bottom` and `top`: `top - base` records are cached ahead of
//! it ([Window::fill_level_up]) and `base - bottom` behind it
//! ([Window::fill_level_down]).
//!
//! # Refills
//!
//! A refill extends the window by a quarter of its capacity in one direction
//! (evicting the same number of records from the opposite edge once the ring is
//! full). It only runs when the cursor is within a quarter of the edge being
//! extended, which makes repeated requests free. Refills are normally triggered by
//! a [crate::Cursor] through a [crate::Scheduler].
//!
//! # End of Store
//!
//! The number of records in the store is not known up front. It is discovered the
//! first time a read returns fewer records than requested and never changes
//! afterwards: every later read is clipped so it cannot run past it.
//!
//! # Store Position
//!
//! The window remembers where the store is positioned and issues a single relative
//! seek only when the next read does not start there. Scanning forward therefore
//! never seeks, while scanning backward seeks once per refill.

use crate::{
    scheduler::{Direction, Fill},
    Error, Record, Store,
};
use prometheus_client::registry::Registry;
use std::{
    num::NonZeroUsize,
    sync::{Mutex, MutexGuard},
};
use tracing::{debug, trace};

mod metrics;
mod ring;

use metrics::Metrics;
use ring::Ring;

/// Configuration for a [Window].
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of records cached at once.
    ///
    /// Must be a power of two and at least 4.
    pub capacity: NonZeroUsize,
}

/// Position of a [Window] over its store.
#[cfg(any(test, feature = "testing"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    /// Logical index of the lowest cached record.
    pub bottom: u64,
    /// Logical index of the cursor (the next record returned by moving forward).
    pub base: u64,
    /// Logical index one past the highest cached record.
    pub top: u64,
    /// Logical index the store will read next, if known.
    pub store_cursor: Option<u64>,
    /// Number of records in the store, once discovered.
    pub top_of_file: Option<u64>,
}

/// State guarded by the window lock.
pub(crate) struct State<T: Record, S: Store<T>> {
    store: S,
    ring: Ring<T>,

    /// Logical index of the lowest cached record.
    pub(crate) bottom: u64,
    /// Logical index of the cursor.
    pub(crate) base: u64,
    /// Logical index of the record last returned by the cursor (0 before any move).
    pub(crate) current: u64,
    /// Logical index one past the highest cached record.
    pub(crate) top: u64,
    /// Logical index the store will read next (`None` after a failed store call).
    store_cursor: Option<u64>,
    /// Number of records in the store, once discovered.
    pub(crate) top_of_file: Option<u64>,
}

impl<T: Record, S: Store<T>> State<T, S> {
    /// Records cached ahead of the cursor.
    pub(crate) fn fill_level_up(&self) -> u64 {
        self.top - self.base
    }

    /// Records cached behind the cursor.
    pub(crate) fn fill_level_down(&self) -> u64 {
        self.base - self.bottom
    }

    /// The record cached for logical index `index`.
    ///
    /// Indices outside of `[bottom, top)` return whatever the slot holds.
    pub(crate) fn record(&self, index: u64) -> T {
        self.ring.get(index)
    }

    /// Whether the window reaches the end of the store.
    pub(crate) fn at_end(&self) -> bool {
        self.top_of_file == Some(self.top)
    }

    /// Read store records `start..start + count` into their ring slots.
    ///
    /// Returns the number of records read (only that many slots are written).
    fn load(&mut self, start: u64, count: usize) -> Result<usize, Error> {
        let Self {
            store,
            ring,
            store_cursor,
            ..
        } = self;

        // Position the store, seeking only if it is not already there
        let position = match store_cursor.take() {
            Some(position) => position,
            None => {
                store.rewind()?;
                0
            }
        };
        if position != start {
            let offset = start.wrapping_sub(position) as i64;
            trace!(position, start, offset, "seeking store");
            if let Err(err) = store.seek(offset) {
                *store_cursor = Some(position);
                return Err(err);
            }
        }
        *store_cursor = Some(start);

        // Copy into the ring, in two parts if the span wraps
        let (first, second) = ring.regions(start, count);
        let mut read = store.read(first).inspect_err(|_| *store_cursor = None)?;
        if read == first.len() && !second.is_empty() {
            read += store.read(second).inspect_err(|_| *store_cursor = None)?;
        }
        *store_cursor = Some(start + read as u64);
        Ok(read)
    }

    /// Read up to `count` records starting at `top`, never past the end of the store.
    ///
    /// A short read pins the end of the store.
    fn load_up(&mut self, count: u64) -> Result<u64, Error> {
        let count = match self.top_of_file {
            Some(end) => {
                assert!(self.top <= end, "window exceeds store: {} > {end}", self.top);
                count.min(end - self.top)
            }
            None => count,
        };
        if count == 0 {
            return Ok(0);
        }

        let read = self.load(self.top, count as usize)? as u64;
        if read < count {
            assert!(
                self.top_of_file.is_none(),
                "end of store discovered twice: {:?} then {}",
                self.top_of_file,
                self.top + read
            );
            self.top_of_file = Some(self.top + read);
            debug!(records = self.top + read, "discovered end of store");
        }
        Ok(read)
    }
}

/// A fixed-capacity, bidirectionally readable cache over a [Store].
///
/// Read it with a [crate::Cursor]. The window itself only exposes its fill levels
/// and the refill operations, which are safe to invoke from any thread (they take
/// the window lock for their whole duration, including store I/O).
pub struct Window<T: Record, S: Store<T>> {
    state: Mutex<State<T, S>>,
    quarter: u64,
    pub(crate) metrics: Metrics,
}

impl<T: Record, S: Store<T>> Window<T, S> {
    /// Create a window over `store` and load the first half of its capacity.
    ///
    /// # Panics
    ///
    /// Panics if the capacity is not a power of two (or is less than 4) or if
    /// [Record::SIZE] is not a power of two.
    pub fn init(store: S, cfg: Config, registry: &mut Registry) -> Result<Self, Error> {
        let capacity = cfg.capacity.get();
        assert!(
            capacity.is_power_of_two(),
            "capacity must be a power of two: {capacity}"
        );
        assert!(capacity >= 4, "capacity must be at least 4: {capacity}");
        assert!(
            T::SIZE.is_power_of_two(),
            "record size must be a power of two: {}",
            T::SIZE
        );

        let window = Self {
            state: Mutex::new(State {
                store,
                ring: Ring::new(capacity),
                bottom: 0,
                base: 0,
                current: 0,
                top: 0,
                store_cursor: None,
                top_of_file: None,
            }),
            quarter: capacity as u64 / 4,
            metrics: Metrics::init(registry),
        };
        window.reset()?;
        Ok(window)
    }

    /// Rewind the store and cache its first `N/2` records, placing the cursor on
    /// the first record.
    ///
    /// The end of the store, if already discovered, is retained.
    pub fn reset(&self) -> Result<(), Error> {
        let mut state = self.lock();
        let half = state.ring.capacity() / 2;

        // Empty the window before the slots are overwritten
        state.bottom = 0;
        state.base = 0;
        state.current = 0;
        state.top = 0;
        state.store_cursor = None;
        state.store.rewind()?;
        state.store_cursor = Some(0);

        let read = state.load_up(half)?;
        state.top = read;
        self.metrics.records_loaded.inc_by(read);
        self.update_gauges(&state);
        debug!(top = state.top, top_of_file = ?state.top_of_file, "reset window");
        Ok(())
    }

    /// Maximum number of records cached at once.
    pub fn capacity(&self) -> usize {
        self.quarter as usize * 4
    }

    /// Records cached ahead of the cursor.
    ///
    /// Computed on logical indices (`top - base`), so a full ring ahead of the
    /// cursor reads as the capacity rather than 0 (which the slot positions alone
    /// cannot distinguish from an empty one).
    pub fn fill_level_up(&self) -> u64 {
        self.lock().fill_level_up()
    }

    /// Records cached behind the cursor.
    ///
    /// Computed on logical indices (`base - bottom`), so a full ring behind the
    /// cursor reads as the capacity rather than 0.
    pub fn fill_level_down(&self) -> u64 {
        self.lock().fill_level_down()
    }

    /// Number of records in the store, if the end has been reached.
    pub fn top_of_file(&self) -> Option<u64> {
        self.lock().top_of_file
    }

    /// Whether an upward refill would load anything right now.
    pub(crate) fn wants_up(&self, state: &State<T, S>) -> bool {
        !state.at_end() && state.fill_level_up() < self.quarter
    }

    /// Whether a downward refill would load anything right now.
    pub(crate) fn wants_down(&self, state: &State<T, S>) -> bool {
        state.bottom > 0 && state.fill_level_down() < self.quarter
    }

    /// Extend the window by a quarter of its capacity past `top`.
    ///
    /// Does nothing if the window already reaches the end of the store or if at
    /// least a quarter of the capacity is cached ahead of the cursor. Once the ring
    /// is full, the lowest records are evicted.
    pub fn fill_upwards(&self) -> Result<(), Error> {
        let mut state = self.lock();
        if !self.wants_up(&state) {
            self.metrics.fills_skipped.inc();
            trace!(level = state.fill_level_up(), "skipping upward fill");
            return Ok(());
        }
        let capacity = state.ring.capacity();

        // Evict the records whose slots may be overwritten before reading (the
        // read can fail part way)
        let bottom = state.bottom;
        state.bottom = bottom.max((state.top + self.quarter).saturating_sub(capacity));

        let read = state.load_up(self.quarter)?;
        state.top += read;
        state.bottom = bottom.max(state.top.saturating_sub(capacity));
        self.metrics.fills_up.inc();
        self.metrics.records_loaded.inc_by(read);
        self.update_gauges(&state);
        trace!(
            read,
            bottom = state.bottom,
            top = state.top,
            "filled upwards"
        );
        Ok(())
    }

    /// Extend the window by a quarter of its capacity below `bottom` (or down to
    /// the first record).
    ///
    /// Does nothing if the window already starts at the first record or if at
    /// least a quarter of the capacity is cached behind the cursor. Once the ring
    /// is full, the highest records are evicted.
    pub fn fill_downwards(&self) -> Result<(), Error> {
        let mut state = self.lock();
        if !self.wants_down(&state) {
            self.metrics.fills_skipped.inc();
            trace!(
                level = state.fill_level_down(),
                bottom = state.bottom,
                "skipping downward fill"
            );
            return Ok(());
        }
        let capacity = state.ring.capacity();
        let count = self.quarter.min(state.bottom);
        let start = state.bottom - count;

        // Evict the records whose slots will be overwritten
        state.top = state.top.min(start + capacity);

        let read = state.load(start, count as usize)? as u64;
        if read < count {
            return Err(Error::Truncated {
                requested: count,
                read,
            });
        }
        state.bottom = start;
        self.metrics.fills_down.inc();
        self.metrics.records_loaded.inc_by(read);
        self.update_gauges(&state);
        trace!(
            read,
            bottom = state.bottom,
            top = state.top,
            "filled downwards"
        );
        Ok(())
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, State<T, S>> {
        self.state.lock().unwrap()
    }

    fn update_gauges(&self, state: &State<T, S>) {
        self.metrics.top.set(state.top as i64);
        self.metrics.bottom.set(state.bottom as i64);
    }

    /// Current position of the window over its store.
    #[cfg(any(test, feature = "testing"))]
    pub fn bounds(&self) -> Bounds {
        let state = self.lock();
        Bounds {
            bottom: state.bottom,
            base: state.base,
            top: state.top,
            store_cursor: state.store_cursor,
            top_of_file: state.top_of_file,
        }
    }
}

impl<T: Record, S: Store<T>> Fill for Window<T, S> {
    fn fill(&self, direction: Direction) -> Result<(), Error> {
        match direction {
            Direction::Up => self.fill_upwards(),
            Direction::Down => self.fill_downwards(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Memory, Metered};
    use commonware_macros::test_traced;
    use prometheus_client::encoding::text::encode;
    use std::sync::Arc;

    fn config(capacity: usize) -> Config {
        Config {
            capacity: NonZeroUsize::new(capacity).unwrap(),
        }
    }

    fn init(
        capacity: usize,
        len: u32,
    ) -> (
        Window<u32, Metered<Memory<u32>>>,
        Arc<crate::store::Metrics>,
        Registry,
    ) {
        let mut registry = Registry::default();
        let store = Metered::new((0..len).collect::<Memory<_>>(), &mut registry);
        let store_metrics = store.metrics();
        let window = Window::init(store, config(capacity), &mut registry).unwrap();
        (window, store_metrics, registry)
    }

    /// Place the cursor without going through a [crate::Cursor].
    fn set_base(window: &Window<u32, Metered<Memory<u32>>>, base: u64) {
        let mut state = window.lock();
        assert!(state.bottom <= base && base <= state.top);
        state.base = base;
    }

    /// Every record in the window holds its own index.
    fn assert_contents(window: &Window<u32, Metered<Memory<u32>>>) {
        let state = window.lock();
        for index in state.bottom..state.top {
            assert_eq!(state.record(index), index as u32, "index {index}");
        }
    }

    #[test_traced]
    fn test_init_loads_half() {
        let (window, store, _) = init(1024, 8192);
        assert_eq!(window.capacity(), 1024);
        assert_eq!(
            window.bounds(),
            Bounds {
                bottom: 0,
                base: 0,
                top: 512,
                store_cursor: Some(512),
                top_of_file: None,
            }
        );
        assert_eq!(window.fill_level_up(), 512);
        assert_eq!(window.fill_level_down(), 0);
        assert_eq!(store.rewinds.get(), 1);
        assert_eq!(store.reads.get(), 1);
        assert_eq!(store.seeks.get(), 0);
        assert_contents(&window);
    }

    #[test_traced]
    fn test_init_short_store() {
        let (window, _, _) = init(16, 5);
        let bounds = window.bounds();
        assert_eq!(bounds.top, 5);
        assert_eq!(bounds.top_of_file, Some(5));
        assert_eq!(window.top_of_file(), Some(5));
        assert_contents(&window);
    }

    #[test_traced]
    fn test_init_empty_store() {
        let (window, _, _) = init(16, 0);
        let bounds = window.bounds();
        assert_eq!(bounds.top, 0);
        assert_eq!(bounds.top_of_file, Some(0));

        // Nothing to load in either direction
        window.fill_upwards().unwrap();
        window.fill_downwards().unwrap();
        assert_eq!(window.bounds(), bounds);
    }

    #[test_traced]
    #[should_panic(expected = "capacity must be a power of two")]
    fn test_capacity_not_power_of_two() {
        init(24, 64);
    }

    #[test_traced]
    #[should_panic(expected = "capacity must be at least 4")]
    fn test_capacity_too_small() {
        init(2, 64);
    }

    #[test_traced]
    #[should_panic(expected = "record size must be a power of two")]
    fn test_record_size_not_power_of_two() {
        let mut registry = Registry::default();
        let store = (0..4).map(|_| [0u8; 3]).collect::<Memory<_>>();
        let _ = Window::init(store, config(16), &mut registry);
    }

    #[test_traced]
    fn test_fill_upwards_quarter() {
        let (window, store, _) = init(16, 64);
        assert_eq!(window.bounds().top, 8);

        // Cursor far from the top: nothing to do
        window.fill_upwards().unwrap();
        assert_eq!(window.bounds().top, 8);
        assert_eq!(store.reads.get(), 1);

        // Within a quarter of the top: load a quarter
        set_base(&window, 5);
        window.fill_upwards().unwrap();
        let bounds = window.bounds();
        assert_eq!((bounds.bottom, bounds.top), (0, 12));
        assert_eq!(bounds.store_cursor, Some(12));
        assert_eq!(store.reads.get(), 2);
        assert_eq!(store.seeks.get(), 0);
        assert_contents(&window);

        // Fill the ring and keep going: the bottom is evicted
        for base in [9, 13, 17] {
            set_base(&window, base);
            window.fill_upwards().unwrap();
        }
        let bounds = window.bounds();
        assert_eq!((bounds.bottom, bounds.top), (8, 24));
        assert_eq!(store.seeks.get(), 0);
        assert_contents(&window);
    }

    #[test_traced]
    fn test_unaligned_end_split_copies() {
        // A store that ends off a quarter boundary shifts the window so that later
        // refills straddle the physical end of the ring
        let (window, store, _) = init(16, 62);
        while window.top_of_file().is_none() {
            let top = window.bounds().top;
            set_base(&window, top - 3);
            window.fill_upwards().unwrap();
        }
        let bounds = window.bounds();
        assert_eq!((bounds.bottom, bounds.top), (46, 62));
        assert_contents(&window);

        // Walk down to 30..34, which lands in slots 14, 15, 0 and 1
        for (bottom, top) in [(42, 58), (38, 54), (34, 50)] {
            set_base(&window, window.bounds().bottom + 3);
            window.fill_downwards().unwrap();
            let bounds = window.bounds();
            assert_eq!((bounds.bottom, bounds.top), (bottom, top));
            assert_contents(&window);
        }
        let reads = store.reads.get();
        set_base(&window, 37);
        window.fill_downwards().unwrap();
        let bounds = window.bounds();
        assert_eq!((bounds.bottom, bounds.top), (30, 46));
        assert_eq!(store.reads.get(), reads + 2);
        assert_contents(&window);

        // Turn around: 46..50 is split the same way
        let reads = store.reads.get();
        set_base(&window, 43);
        window.fill_upwards().unwrap();
        let bounds = window.bounds();
        assert_eq!((bounds.bottom, bounds.top), (34, 50));
        assert_eq!(bounds.store_cursor, Some(50));
        assert_eq!(store.reads.get(), reads + 2);
        assert_contents(&window);
    }

    #[test_traced]
    fn test_fill_levels_full_ring() {
        let (window, store, _) = init(16, 64);
        for base in [5, 9] {
            set_base(&window, base);
            window.fill_upwards().unwrap();
        }
        let bounds = window.bounds();
        assert_eq!((bounds.bottom, bounds.top), (0, 16));

        // The whole ring is ahead of the cursor (both edges map to slot 0)
        set_base(&window, 0);
        assert_eq!(window.fill_level_up(), 16);
        assert_eq!(window.fill_level_down(), 0);

        // So nothing is loaded
        let reads = store.reads.get();
        window.fill_upwards().unwrap();
        assert_eq!(store.reads.get(), reads);
        assert_eq!(window.bounds().top, 16);

        // And the whole ring behind it
        set_base(&window, 16);
        assert_eq!(window.fill_level_up(), 0);
        assert_eq!(window.fill_level_down(), 16);
        window.fill_downwards().unwrap();
        assert_eq!(store.reads.get(), reads);
        assert_contents(&window);
    }

    #[test_traced]
    fn test_fill_upwards_idempotent() {
        let (window, store, registry) = init(1024, 8192);
        set_base(&window, 300);

        window.fill_upwards().unwrap();
        assert_eq!(store.reads.get(), 2);
        assert_eq!(store.seeks.get(), 0);
        let bounds = window.bounds();

        // Second call without cursor movement does no I/O
        window.fill_upwards().unwrap();
        assert_eq!(store.reads.get(), 2);
        assert_eq!(store.seeks.get(), 0);
        assert_eq!(window.bounds(), bounds);

        let mut buffer = String::new();
        encode(&mut buffer, &registry).unwrap();
        assert!(buffer.contains("fills_up_total 1"));
        assert!(buffer.contains("fills_skipped_total 1"));
        assert!(buffer.contains("records_loaded_total 768"));
        assert!(buffer.contains("window_top 768"));
    }

    #[test_traced]
    fn test_fill_upwards_pins_end() {
        let (window, store, _) = init(16, 22);
        for base in [5, 9, 13] {
            set_base(&window, base);
            window.fill_upwards().unwrap();
        }
        assert_eq!(window.bounds().top, 20);
        assert_eq!(window.top_of_file(), None);

        // Only 2 of 4 records remain
        set_base(&window, 17);
        window.fill_upwards().unwrap();
        let bounds = window.bounds();
        assert_eq!(bounds.top, 22);
        assert_eq!(bounds.bottom, 6);
        assert_eq!(bounds.top_of_file, Some(22));
        assert_contents(&window);

        // Reads are clipped from now on (no store access at all)
        let reads = store.reads.get();
        set_base(&window, 21);
        window.fill_upwards().unwrap();
        window.fill_upwards().unwrap();
        assert_eq!(store.reads.get(), reads);
        assert_eq!(window.bounds().top, 22);
    }

    #[test_traced]
    fn test_fill_upwards_exact_end() {
        // The store ends on a refill boundary: the end is found by an empty read
        let (window, _, _) = init(16, 12);
        set_base(&window, 5);
        window.fill_upwards().unwrap();
        assert_eq!(window.bounds().top, 12);
        assert_eq!(window.top_of_file(), None);

        set_base(&window, 9);
        window.fill_upwards().unwrap();
        assert_eq!(window.bounds().top, 12);
        assert_eq!(window.top_of_file(), Some(12));
    }

    #[test_traced]
    #[should_panic(expected = "end of store discovered twice")]
    fn test_store_shrinks_after_end() {
        let (window, _, _) = init(16, 10);
        set_base(&window, 5);
        window.fill_upwards().unwrap();
        assert_eq!(window.top_of_file(), Some(10));

        // Forge a stale end beyond the real one
        {
            let mut state = window.lock();
            state.top_of_file = Some(12);
            state.base = 9;
        }
        window.fill_upwards().unwrap();
    }

    #[test_traced]
    fn test_fill_downwards() {
        let (window, store, _) = init(16, 64);

        // At the first record there is nothing below
        window.fill_downwards().unwrap();
        assert_eq!(store.seeks.get(), 0);

        // Move the window up to [16, 32)
        for base in [5, 9, 13, 17, 21, 25] {
            set_base(&window, base);
            window.fill_upwards().unwrap();
        }
        let bounds = window.bounds();
        assert_eq!((bounds.bottom, bounds.top), (16, 32));
        assert_eq!(bounds.store_cursor, Some(32));

        // Cursor far from the bottom: nothing to do
        set_base(&window, 20);
        window.fill_downwards().unwrap();
        assert_eq!(window.bounds().bottom, 16);

        // Within a quarter of the bottom: seek back and load 12..16
        set_base(&window, 19);
        window.fill_downwards().unwrap();
        let bounds = window.bounds();
        assert_eq!((bounds.bottom, bounds.top), (12, 28));
        assert_eq!(bounds.store_cursor, Some(16));
        assert_eq!(store.seeks.get(), 1);
        assert_contents(&window);

        // Going down again only needs a seek back over what was just read
        set_base(&window, 15);
        window.fill_downwards().unwrap();
        let bounds = window.bounds();
        assert_eq!((bounds.bottom, bounds.top), (8, 24));
        assert_eq!(bounds.store_cursor, Some(12));
        assert_eq!(store.seeks.get(), 2);
        assert_contents(&window);

        // Turning around seeks forward to the top
        set_base(&window, 21);
        window.fill_upwards().unwrap();
        let bounds = window.bounds();
        assert_eq!((bounds.bottom, bounds.top), (12, 28));
        assert_eq!(bounds.store_cursor, Some(28));
        assert_eq!(store.seeks.get(), 3);
        assert_contents(&window);
    }

    #[test_traced]
    fn test_fill_downwards_clamped_at_start() {
        let (window, _, _) = init(16, 64);
        for base in [5, 9, 13, 17] {
            set_base(&window, base);
            window.fill_upwards().unwrap();
        }
        let bounds = window.bounds();
        assert_eq!((bounds.bottom, bounds.top), (8, 24));

        // Shift the window off quarter alignment so a partial quarter remains below
        {
            let mut state = window.lock();
            state.bottom = 10;
            state.base = 10;
        }
        window.fill_downwards().unwrap();
        window.lock().base = 7;
        window.fill_downwards().unwrap();
        let bounds = window.bounds();
        assert_eq!(bounds.bottom, 2);
        assert_eq!(bounds.top, 18);

        // Only 2 records remain below
        window.lock().base = 3;
        window.fill_downwards().unwrap();
        let bounds = window.bounds();
        assert_eq!((bounds.bottom, bounds.top), (0, 16));
        assert_contents(&window);
    }

    #[test_traced]
    fn test_fill_downwards_idempotent() {
        let (window, store, _) = init(16, 64);
        for base in [5, 9, 13, 17, 21] {
            set_base(&window, base);
            window.fill_upwards().unwrap();
        }
        set_base(&window, 14);
        window.fill_downwards().unwrap();
        let (reads, seeks) = (store.reads.get(), store.seeks.get());
        let bounds = window.bounds();

        window.fill_downwards().unwrap();
        window.fill(Direction::Down).unwrap();
        assert_eq!(store.reads.get(), reads);
        assert_eq!(store.seeks.get(), seeks);
        assert_eq!(window.bounds(), bounds);
    }

    #[test_traced]
    fn test_reset_keeps_end() {
        let (window, store, _) = init(16, 10);
        set_base(&window, 5);
        window.fill_upwards().unwrap();
        assert_eq!(window.top_of_file(), Some(10));

        window.reset().unwrap();
        assert_eq!(
            window.bounds(),
            Bounds {
                bottom: 0,
                base: 0,
                top: 8,
                store_cursor: Some(8),
                top_of_file: Some(10),
            }
        );
        assert_eq!(store.rewinds.get(), 2);
        assert_contents(&window);
    }

    /// A store that fails a configurable call.
    struct Faulty {
        inner: Memory<u32>,
        fail_read: bool,
        fail_seek: bool,
    }

    impl Store<u32> for Faulty {
        fn rewind(&mut self) -> Result<(), Error> {
            self.inner.rewind()
        }

        fn read(&mut self, buf: &mut [u32]) -> Result<usize, Error> {
            if self.fail_read {
                return Err(Error::Io(std::io::Error::other("read failed")));
            }
            self.inner.read(buf)
        }

        fn seek(&mut self, offset: i64) -> Result<(), Error> {
            if self.fail_seek {
                return Err(Error::Io(std::io::Error::other("seek failed")));
            }
            self.inner.seek(offset)
        }
    }

    #[test_traced]
    fn test_failed_read_recovers() {
        let mut registry = Registry::default();
        let store = Faulty {
            inner: (0..64).collect(),
            fail_read: false,
            fail_seek: false,
        };
        let window = Window::init(store, config(16), &mut registry).unwrap();

        // A failed read leaves the window usable and the store position unknown
        window.lock().store.fail_read = true;
        window.lock().base = 5;
        assert!(matches!(window.fill_upwards(), Err(Error::Io(_))));
        let bounds = window.bounds();
        assert_eq!(bounds.top, 8);
        assert_eq!(bounds.store_cursor, None);

        // The next fill rewinds and seeks to where it needs to read
        window.lock().store.fail_read = false;
        window.fill_upwards().unwrap();
        let bounds = window.bounds();
        assert_eq!(bounds.top, 12);
        assert_eq!(bounds.store_cursor, Some(12));
        let state = window.lock();
        for index in state.bottom..state.top {
            assert_eq!(state.record(index), index as u32);
        }
    }

    #[test_traced]
    fn test_failed_seek_keeps_position() {
        let mut registry = Registry::default();
        let store = Faulty {
            inner: (0..64).collect(),
            fail_read: false,
            fail_seek: false,
        };
        let window = Window::init(store, config(16), &mut registry).unwrap();
        for base in [5, 9, 13, 17] {
            window.lock().base = base;
            window.fill_upwards().unwrap();
        }

        window.lock().store.fail_seek = true;
        window.lock().base = 9;
        assert!(matches!(window.fill_downwards(), Err(Error::Io(_))));
        let bounds = window.bounds();
        assert_eq!(bounds.bottom, 8);
        assert_eq!(bounds.store_cursor, Some(24));

        window.lock().store.fail_seek = false;
        window.fill_downwards().unwrap();
        assert_eq!(window.bounds().bottom, 4);
    }

    #[test_traced]
    fn test_truncated_store() {
        let mut registry = Registry::default();
        let store = Faulty {
            inner: (0..64).collect(),
            fail_read: false,
            fail_seek: false,
        };
        let window = Window::init(store, config(16), &mut registry).unwrap();
        for base in [5, 9, 13, 17] {
            window.lock().base = base;
            window.fill_upwards().unwrap();
        }

        // Replace the store contents with fewer records than the window expects
        {
            let mut state = window.lock();
            state.store.inner = (0..6).collect();
            state.store.inner.seek(24).unwrap();
            state.base = 9;
        }
        assert!(matches!(
            window.fill_downwards(),
            Err(Error::Truncated {
                requested: 4,
                read: 2
            })
        ));
    }
}
