//! Scan a store of fixed-size records forwards and backwards through a prefetching ring cache.
//!
//! A [Window] caches up to `N` consecutive records of a [Store] in a ring and slides
//! over the store by a quarter of its capacity at a time. A single [Cursor] reads
//! from the window one record at a time in either direction, reporting a [Status]
//! with every movement and asking a [Scheduler] to refill the window before it
//! runs dry.
//!
//! # Status
//!
//! `commonware-window` is **ALPHA** software and is not yet recommended for production use. Developers should
//! expect breaking changes and occasional instability.
//!
//! # Example
//!
//! ```rust
//! use commonware_window::{store::Memory, Config, Cursor, Inline, Status, Window};
//! use prometheus_client::registry::Registry;
//! use std::{num::NonZeroUsize, sync::Arc};
//!
//! // Cache 64 records of a store holding 1000
//! let store = (0..1000u32).collect::<Memory<_>>();
//! let cfg = Config {
//!     capacity: NonZeroUsize::new(64).unwrap(),
//! };
//! let window = Arc::new(Window::init(store, cfg, &mut Registry::default()).unwrap());
//!
//! // Refill on the consumer's thread
//! let mut cursor = Cursor::new(window.clone(), Inline::new(window));
//! assert_eq!(cursor.get_next(), (0, Status::Ok));
//! assert_eq!(cursor.get_next(), (1, Status::Ok));
//! assert_eq!(cursor.get_prev(), (1, Status::Ok));
//! assert_eq!(cursor.get_prev(), (0, Status::EndOfBackwardData));
//! ```

use thiserror::Error;

mod cursor;
mod record;
mod scheduler;
pub mod store;
mod window;

pub use cursor::{Cursor, Status};
pub use record::Record;
pub use scheduler::{Direction, Fill, Inline, Scheduler, Worker};
pub use store::Store;
#[cfg(any(test, feature = "testing"))]
pub use window::Bounds;
pub use window::{Config, Window};

/// Errors that can occur when reading a [Store].
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("seek out of range: {offset} from {position}")]
    SeekOutOfRange { position: u64, offset: i64 },
    #[error("store truncated: read {read} of {requested} records")]
    Truncated { requested: u64, read: u64 },
}
