use std::collections::VecDeque;

use crate::codec::{Codec, DecodeError, Sample, SealedBlock};

/// One sealed run of samples plus the timestamp it starts at.
#[derive(Debug, Clone)]
pub struct CompressedBlock<B> {
    start: i64,
    stream: B,
}

impl<B: SealedBlock> CompressedBlock<B> {
    /// Encodes `samples`, which must be in chronological order, with a fresh
    /// codec seeded by the oldest timestamp.
    pub fn seal<C>(samples: &[Sample]) -> Self
    where
        C: Codec<Sealed = B>,
    {
        let start = samples.first().map_or(0, |s| s.timestamp);
        let mut codec = C::new(start);
        for sample in samples {
            codec.push(*sample);
        }
        Self {
            start,
            stream: codec.finish(),
        }
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn len(&self) -> usize {
        self.stream.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stream.is_empty()
    }

    pub fn size_bytes(&self) -> usize {
        self.stream.size_bytes()
    }

    pub fn stream(&self) -> &B {
        &self.stream
    }

    /// Decodes the block and returns its newest `n` samples, newest first.
    ///
    /// The whole stream is decoded since the codec only reads forward.
    /// A stream that yields fewer samples than it claims to hold is reported
    /// as [`DecodeError::UnexpectedEnd`].
    pub fn newest(&self, n: usize) -> Result<Vec<Sample>, DecodeError> {
        let len = self.stream.len();
        let take = n.min(len);
        // 1-based positions above `len - take` are kept.
        let threshold = len - take;

        let mut kept = Vec::with_capacity(take);
        let mut seen = 0;
        for sample in self.stream.iter() {
            let sample = sample?;
            seen += 1;
            if seen > threshold {
                kept.push(sample);
            }
        }
        if seen != len {
            return Err(DecodeError::UnexpectedEnd);
        }
        kept.reverse();
        Ok(kept)
    }
}

/// Sealed blocks, newest at the head.
#[derive(Debug, Clone)]
pub struct BlockChain<B> {
    blocks: VecDeque<CompressedBlock<B>>,
}

impl<B> Default for BlockChain<B> {
    fn default() -> Self {
        Self {
            blocks: VecDeque::new(),
        }
    }
}

impl<B: SealedBlock> BlockChain<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `block` as the newest.
    pub fn push_front(&mut self, block: CompressedBlock<B>) {
        self.blocks.push_front(block);
    }

    /// Removes the oldest block.
    pub fn pop_back(&mut self) -> Option<CompressedBlock<B>> {
        self.blocks.pop_back()
    }

    pub fn head(&self) -> Option<&CompressedBlock<B>> {
        self.blocks.front()
    }

    /// Iterates newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &CompressedBlock<B>> + '_ {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn size_bytes(&self) -> usize {
        self.blocks.iter().map(CompressedBlock::size_bytes).sum()
    }
}
