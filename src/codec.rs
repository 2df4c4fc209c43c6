//! The contract between the window and the point-compression codec.
//!
//! A codec instance is seeded with a timestamp, receives samples in
//! chronological order, and is then frozen with [`Codec::finish`] into an
//! immutable [`SealedBlock`]. The window only ever reads a sealed block
//! through its forward iterator, so any lossless scheme fits behind these
//! traits. [`GorillaEncoder`](crate::GorillaEncoder) is the default;
//! [`PlainCodec`] stores samples uncompressed.

use std::{iter, slice};

use thiserror::Error;

/// One time-series sample: a timestamp and an `f64` value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    pub timestamp: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Error produced while decoding a sealed stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The stream ended in the middle of a sample.
    #[error("unexpected end of compressed stream")]
    UnexpectedEnd,
    /// The stream does not even carry its header.
    #[error("compressed stream is empty")]
    Empty,
}

/// An append-only encoder for one block.
pub trait Codec: Sized {
    type Sealed: SealedBlock;

    /// Starts a new stream. `seed` is the timestamp of the oldest sample
    /// that will be pushed.
    fn new(seed: i64) -> Self;

    /// Appends a sample. Samples must arrive oldest first.
    fn push(&mut self, sample: Sample);

    /// Number of samples pushed so far.
    fn count(&self) -> usize;

    /// Freezes the stream.
    fn finish(self) -> Self::Sealed;
}

/// An immutable, decodable stream produced by [`Codec::finish`].
pub trait SealedBlock {
    type Iter<'a>: Iterator<Item = Result<Sample, DecodeError>>
    where
        Self: 'a;

    /// Returns a fresh cursor that yields the samples oldest to newest.
    fn iter(&self) -> Self::Iter<'_>;

    /// Number of samples in the stream.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Heap bytes held by the encoded stream.
    fn size_bytes(&self) -> usize;
}

type CopyOk = fn(&Sample) -> Result<Sample, DecodeError>;

fn copy_ok(sample: &Sample) -> Result<Sample, DecodeError> {
    Ok(*sample)
}

/// A codec that keeps samples as-is.
#[derive(Debug, Clone, Default)]
pub struct PlainCodec {
    samples: Vec<Sample>,
}

/// The sealed form of [`PlainCodec`].
#[derive(Debug, Clone)]
pub struct PlainBlock {
    samples: Box<[Sample]>,
}

impl Codec for PlainCodec {
    type Sealed = PlainBlock;

    fn new(_seed: i64) -> Self {
        Self::default()
    }

    fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    fn count(&self) -> usize {
        self.samples.len()
    }

    fn finish(self) -> PlainBlock {
        PlainBlock {
            samples: self.samples.into_boxed_slice(),
        }
    }
}

impl SealedBlock for PlainBlock {
    type Iter<'a> = iter::Map<slice::Iter<'a, Sample>, CopyOk>;

    fn iter(&self) -> Self::Iter<'_> {
        self.samples.iter().map(copy_ok as CopyOk)
    }

    fn len(&self) -> usize {
        self.samples.len()
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of_val(&*self.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_codec_preserves_order() {
        let mut codec = PlainCodec::new(10);
        for t in 10..15 {
            codec.push(Sample::new(t, t as f64 / 2.0));
        }
        assert_eq!(codec.count(), 5);
        let block = codec.finish();
        assert_eq!(block.len(), 5);
        assert_eq!(block.size_bytes(), 5 * 16);

        let out: Vec<Sample> = block.iter().map(|r| r.unwrap()).collect();
        let expected: Vec<Sample> = (10..15).map(|t| Sample::new(t, t as f64 / 2.0)).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_sealed_iter_restarts() {
        let mut codec = PlainCodec::new(0);
        codec.push(Sample::new(0, 1.0));
        codec.push(Sample::new(1, 2.0));
        let block = codec.finish();

        let mut first = block.iter();
        first.next();
        // A partially consumed cursor does not affect a new one.
        assert_eq!(block.iter().count(), 2);
        assert_eq!(first.count(), 1);
    }

    #[test]
    fn test_decode_error_messages() {
        assert_eq!(
            DecodeError::UnexpectedEnd.to_string(),
            "unexpected end of compressed stream"
        );
        assert_eq!(DecodeError::Empty.to_string(), "compressed stream is empty");
    }
}
