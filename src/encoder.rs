use crate::bitbuffer::BitBuffer;
use crate::codec::{Codec, Sample};

/// Marker written after the last sample: the `1111` prefix followed by 64
/// one-bits. A real delta-of-delta of -1 always takes the 7-bit bucket, so
/// the pattern is unambiguous.
pub(crate) const END_OF_STREAM: u64 = u64::MAX;

/// The Gorilla compressor for one sealed block.
///
/// - **Timestamps**: a 64-bit seed header, then delta-of-delta with
///   variable-length prefixes. The first sample's delta is taken against
///   the seed with a previous delta of zero.
/// - **Values**: the first value raw, then XOR against the previous value
///   with leading/trailing zero window reuse.
///
/// # Example
/// ```
/// use gorilla_window::{Codec, GorillaEncoder, Sample, SealedBlock};
///
/// let mut encoder = GorillaEncoder::new(1609459200);
/// encoder.push(Sample::new(1609459200, 12.0));
/// encoder.push(Sample::new(1609459260, 12.5));
/// let block = encoder.finish();
///
/// assert_eq!(block.len(), 2);
/// assert_eq!(block.decode().unwrap()[1], Sample::new(1609459260, 12.5));
/// ```
#[derive(Debug, Clone)]
pub struct GorillaEncoder {
    buf: BitBuffer,
    seed: i64,
    count: usize,
    prev_timestamp: i64,
    prev_delta: i64,
    prev_value_bits: u64,
    prev_leading_zeros: u8,
    prev_trailing_zeros: u8,
}

impl GorillaEncoder {
    fn encode_timestamp(&mut self, timestamp: i64) {
        let delta = timestamp.wrapping_sub(self.prev_timestamp);
        self.encode_delta_of_delta(delta.wrapping_sub(self.prev_delta));
        self.prev_delta = delta;
        self.prev_timestamp = timestamp;
    }

    /// | dod              | encoding              | bits |
    /// |------------------|-----------------------|------|
    /// | 0                | `0`                   | 1    |
    /// | [-64, 63]        | `10` + 7-bit value    | 9    |
    /// | [-256, 255]      | `110` + 9-bit value   | 12   |
    /// | [-2048, 2047]    | `1110` + 12-bit value | 16   |
    /// | otherwise        | `1111` + 64-bit value | 68   |
    fn encode_delta_of_delta(&mut self, dod: i64) {
        match dod {
            0 => self.buf.write_bit(false),
            -64..=63 => {
                self.buf.write_bits(0b10, 2);
                self.buf.write_bits(dod as u64 & 0x7F, 7);
            }
            -256..=255 => {
                self.buf.write_bits(0b110, 3);
                self.buf.write_bits(dod as u64 & 0x1FF, 9);
            }
            -2048..=2047 => {
                self.buf.write_bits(0b1110, 4);
                self.buf.write_bits(dod as u64 & 0xFFF, 12);
            }
            _ => {
                self.buf.write_bits(0b1111, 4);
                self.buf.write_bits(dod as u64, 64);
            }
        }
    }

    fn encode_value(&mut self, value: f64) {
        let bits = value.to_bits();
        let xor = bits ^ self.prev_value_bits;
        self.prev_value_bits = bits;

        if xor == 0 {
            self.buf.write_bit(false);
            return;
        }
        self.buf.write_bit(true);

        let leading = xor.leading_zeros() as u8;
        let trailing = xor.trailing_zeros() as u8;

        if leading >= self.prev_leading_zeros && trailing >= self.prev_trailing_zeros {
            // Fits the previous window.
            self.buf.write_bit(false);
            let meaningful = 64 - self.prev_leading_zeros - self.prev_trailing_zeros;
            self.buf
                .write_bits(xor >> self.prev_trailing_zeros, meaningful);
        } else {
            self.buf.write_bit(true);
            let meaningful = 64 - leading - trailing;
            self.buf.write_bits(leading as u64, 6);
            self.buf.write_bits((meaningful - 1) as u64, 6);
            self.buf.write_bits(xor >> trailing, meaningful);

            self.prev_leading_zeros = leading;
            self.prev_trailing_zeros = trailing;
        }
    }
}

impl Codec for GorillaEncoder {
    type Sealed = GorillaBlock;

    fn new(seed: i64) -> Self {
        let mut buf = BitBuffer::with_capacity(64);
        buf.write_bits(seed as u64, 64);
        Self {
            buf,
            seed,
            count: 0,
            prev_timestamp: seed,
            prev_delta: 0,
            prev_value_bits: 0,
            // No window yet: the first non-zero XOR always opens one.
            prev_leading_zeros: 64,
            prev_trailing_zeros: 64,
        }
    }

    fn push(&mut self, sample: Sample) {
        self.encode_timestamp(sample.timestamp);
        if self.count == 0 {
            self.prev_value_bits = sample.value.to_bits();
            self.buf.write_bits(self.prev_value_bits, 64);
        } else {
            self.encode_value(sample.value);
        }
        self.count += 1;
    }

    fn count(&self) -> usize {
        self.count
    }

    fn finish(mut self) -> GorillaBlock {
        self.buf.write_bits(0b1111, 4);
        self.buf.write_bits(END_OF_STREAM, 64);
        GorillaBlock {
            seed: self.seed,
            count: self.count,
            total_bits: self.buf.len_bits(),
            bytes: self.buf.into_bytes().into_boxed_slice(),
        }
    }
}

/// A sealed Gorilla stream. Decode it with [`SealedBlock::iter`] or
/// [`GorillaBlock::decode`].
#[derive(Debug, Clone)]
pub struct GorillaBlock {
    pub(crate) bytes: Box<[u8]>,
    pub(crate) total_bits: usize,
    pub(crate) count: usize,
    pub(crate) seed: i64,
}

impl GorillaBlock {
    /// The timestamp the stream was seeded with.
    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn total_bits(&self) -> usize {
        self.total_bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SealedBlock;

    #[test]
    fn test_empty_stream_is_header_and_marker() {
        let block = GorillaEncoder::new(42).finish();
        assert_eq!(block.len(), 0);
        assert_eq!(block.total_bits(), 64 + 68);
        assert_eq!(block.seed(), 42);
    }

    #[test]
    fn test_regular_interval_identical_values() {
        let mut enc = GorillaEncoder::new(1_000);
        for i in 0..10 {
            enc.push(Sample::new(1_000 + i * 60, 42.0));
        }
        let block = enc.finish();
        // header + first dod (delta 0 from the seed) + raw value
        // + second dod (60, 7-bit bucket) + 8 zero dods + 9 repeated values + marker
        assert_eq!(block.total_bits(), 64 + 1 + 64 + 9 + 8 + 9 + 68);
        assert_eq!(block.len(), 10);
    }

    #[test]
    fn test_bucket_edges() {
        // Deltas chosen so the delta-of-delta hits each bucket boundary.
        let mut enc = GorillaEncoder::new(0);
        let mut input = Vec::new();
        let mut t = 0i64;
        let mut prev_delta = 0i64;
        for dod in [63, -64, 255, -256, 2047, -2048, 2048, -2049, 0, 64, -65] {
            let delta = prev_delta + dod;
            t += delta;
            prev_delta = delta;
            let sample = Sample::new(t, 1.0);
            enc.push(sample);
            input.push(sample);
        }
        let block = enc.finish();
        assert_eq!(block.len(), input.len());
        assert_eq!(block.decode().unwrap(), input);
    }
}
