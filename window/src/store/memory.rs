use super::{resolve, Store};
use crate::{Error, Record};

/// In-memory [Store] backed by a vector of records.
#[derive(Clone, Debug, Default)]
pub struct Memory<T> {
    records: Vec<T>,
    position: u64,
}

impl<T> Memory<T> {
    /// Create a store holding `records`, positioned at the first one.
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            position: 0,
        }
    }

    /// Number of records held by the store.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current read position, in records.
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl<T> FromIterator<T> for Memory<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T: Record> Store<T> for Memory<T> {
    fn rewind(&mut self) -> Result<(), Error> {
        self.position = 0;
        Ok(())
    }

    fn read(&mut self, buf: &mut [T]) -> Result<usize, Error> {
        // A position past the end (allowed, like a file) reads nothing
        let start = usize::try_from(self.position)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        let count = buf.len().min(self.records.len() - start);
        buf[..count].copy_from_slice(&self.records[start..start + count]);
        self.position += count as u64;
        Ok(count)
    }

    fn seek(&mut self, offset: i64) -> Result<(), Error> {
        self.position = resolve(self.position, offset)?;
        Ok(())
    }
}
