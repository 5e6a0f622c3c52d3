use super::{resolve, Store};
use crate::{Error, Record};
use bytes::Buf;
use std::{
    fs,
    io::{BufReader, Read, Seek},
    marker::PhantomData,
    path::Path,
};
use tracing::debug;

/// [Store] over a file of packed records.
///
/// The file is read through a [BufReader], so the small relative seeks issued
/// when a [crate::Window] changes direction are often served without a syscall.
/// A trailing partial record (a file whose length is not a multiple of
/// [Record::SIZE]) is treated as the end of the store.
pub struct File<T: Record> {
    reader: BufReader<fs::File>,
    position: u64,
    scratch: Vec<u8>,
    _record: PhantomData<T>,
}

impl<T: Record> File<T> {
    /// Wrap an already opened file, positioned at its first record.
    pub fn new(file: fs::File) -> Self {
        Self {
            reader: BufReader::new(file),
            position: 0,
            scratch: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Open the file at `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = fs::File::open(path.as_ref())?;
        debug!(path = ?path.as_ref(), "opened record file");
        Ok(Self::new(file))
    }

    /// Current read position, in records.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Release the underlying file.
    pub fn into_inner(self) -> fs::File {
        self.reader.into_inner()
    }
}

impl<T: Record> Store<T> for File<T> {
    fn rewind(&mut self) -> Result<(), Error> {
        self.reader.rewind()?;
        self.position = 0;
        Ok(())
    }

    fn read(&mut self, buf: &mut [T]) -> Result<usize, Error> {
        // Read as many whole bytes as are available (up to the request)
        let want = (buf.len() * T::SIZE) as u64;
        self.scratch.clear();
        let read = (&mut self.reader).take(want).read_to_end(&mut self.scratch)?;

        // Step back over any partial record so the position stays aligned
        let partial = read % T::SIZE;
        if partial > 0 {
            self.reader.seek_relative(-(partial as i64))?;
            debug!(bytes = partial, "ignoring trailing partial record");
        }

        // Decode whole records
        let count = read / T::SIZE;
        let mut raw = &self.scratch[..count * T::SIZE];
        for slot in buf[..count].iter_mut() {
            *slot = T::read(&mut raw);
        }
        debug_assert!(!raw.has_remaining());
        self.position += count as u64;
        Ok(count)
    }

    fn seek(&mut self, offset: i64) -> Result<(), Error> {
        let position = resolve(self.position, offset)?;
        let bytes = offset
            .checked_mul(T::SIZE as i64)
            .ok_or(Error::SeekOutOfRange {
                position: self.position,
                offset,
            })?;
        self.reader.seek_relative(bytes)?;
        self.position = position;
        Ok(())
    }
}
