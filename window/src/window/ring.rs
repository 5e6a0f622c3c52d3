//! Fixed-capacity storage addressed by logical record index.

use crate::Record;

/// Slots for `capacity` records where logical index `i` lives in slot `i mod capacity`.
pub(crate) struct Ring<T> {
    slots: Box<[T]>,
    mask: u64,
}

impl<T: Record> Ring<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of two.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity.is_power_of_two(),
            "capacity must be a power of two: {capacity}"
        );
        Self {
            slots: vec![T::default(); capacity].into_boxed_slice(),
            mask: capacity as u64 - 1,
        }
    }

    pub fn capacity(&self) -> u64 {
        self.mask + 1
    }

    #[inline]
    pub fn slot(&self, index: u64) -> usize {
        (index & self.mask) as usize
    }

    #[inline]
    pub fn get(&self, index: u64) -> T {
        self.slots[self.slot(index)]
    }

    /// Returns the slots backing logical indices `start..start + count`, in order.
    ///
    /// The span is split in two when it wraps past the physical end of the ring
    /// (the second region is empty otherwise).
    pub fn regions(&mut self, start: u64, count: usize) -> (&mut [T], &mut [T]) {
        assert!(count <= self.slots.len(), "span exceeds capacity: {count}");
        let first = self.slot(start);
        let (head, tail) = self.slots.split_at_mut(first);
        let upper = count.min(tail.len());
        (&mut tail[..upper], &mut head[..count - upper])
    }
}
