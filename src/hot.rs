use crate::codec::Sample;

/// The newest, not yet sealed samples of a window.
///
/// Samples are stored oldest first in one pre-sized vector; "front" in this
/// API means the newest end. Once `len() == capacity` the buffer reports
/// itself sealed and must be drained with [`HotBuffer::into_chronological`].
#[derive(Debug, Clone)]
pub struct HotBuffer {
    samples: Vec<Sample>,
    capacity: usize,
    sealed: bool,
}

impl HotBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            sealed: false,
        }
    }

    /// Adds `sample` as the newest entry.
    #[inline]
    pub fn push(&mut self, sample: Sample) {
        debug_assert!(!self.sealed, "push into a sealed hot buffer");
        self.samples.push(sample);
        self.sealed = self.samples.len() >= self.capacity;
    }

    /// Iterates newest to oldest.
    pub fn newest(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter().rev()
    }

    /// The first `n` samples, newest first.
    pub fn front(&self, n: usize) -> Vec<Sample> {
        self.newest().take(n).copied().collect()
    }

    /// The most recent sample.
    pub fn latest(&self) -> Option<Sample> {
        self.samples.last().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Consumes the buffer, returning its samples oldest first.
    pub fn into_chronological(self) -> Vec<Sample> {
        self.samples
    }
}
