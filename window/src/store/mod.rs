//! Sequential sources of fixed-size records.
//!
//! A [Store] is positioned like a file: reads start at the current position and
//! advance it, while [Store::seek] moves it relative to where it is. Stores are
//! forward-biased (reading ahead is cheap, moving back requires a seek), which is
//! why [crate::Window] remembers where the store is positioned and only seeks
//! when it must.

use crate::{Error, Record};

mod file;
mod memory;
mod metered;

pub use file::File;
pub use memory::Memory;
pub use metered::{Metered, Metrics};

/// Interface that any record source must implement to back a [crate::Window].
pub trait Store<T: Record>: Send {
    /// Reposition the store at the first record.
    fn rewind(&mut self) -> Result<(), Error>;

    /// Read up to `buf.len()` records from the current position into `buf`.
    ///
    /// Returns the number of records read. A count smaller than `buf.len()` means
    /// the end of the store was reached. Only the first `count` slots of `buf` are
    /// written.
    fn read(&mut self, buf: &mut [T]) -> Result<usize, Error>;

    /// Move the current position by `offset` records (negative values move back).
    fn seek(&mut self, offset: i64) -> Result<(), Error>;
}

impl<T: Record, S: Store<T> + ?Sized> Store<T> for Box<S> {
    fn rewind(&mut self) -> Result<(), Error> {
        (**self).rewind()
    }

    fn read(&mut self, buf: &mut [T]) -> Result<usize, Error> {
        (**self).read(buf)
    }

    fn seek(&mut self, offset: i64) -> Result<(), Error> {
        (**self).seek(offset)
    }
}

/// Resolve a relative seek against an absolute position.
pub(crate) fn resolve(position: u64, offset: i64) -> Result<u64, Error> {
    position
        .checked_add_signed(offset)
        .ok_or(Error::SeekOutOfRange { position, offset })
}
