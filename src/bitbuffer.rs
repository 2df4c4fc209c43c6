/// A growable, append-only bit buffer. Bits are packed most-significant
/// first into each byte.
///
/// Sealed Gorilla blocks are written once and never grow afterwards, so the
/// buffer has no byte limit and writes cannot fail.
#[derive(Debug, Clone, Default)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    /// Number of bits already used in the last byte (0..8). Zero means the
    /// last byte is full, or the buffer is empty.
    used: u8,
}

impl BitBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with `capacity` bytes pre-allocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            used: 0,
        }
    }

    /// Returns the total number of bits written.
    #[inline]
    pub fn len_bits(&self) -> usize {
        match self.used {
            0 => self.bytes.len() * 8,
            used => (self.bytes.len() - 1) * 8 + used as usize,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shrinks the allocation to the written length and returns the bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.bytes.shrink_to_fit();
        self.bytes
    }

    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(bit as u64, 1);
    }

    /// Writes the lowest `n` bits of `value`, most significant first.
    /// `n` must be at most 64.
    pub fn write_bits(&mut self, value: u64, n: u8) {
        debug_assert!(n <= 64);
        let mut left = n;
        while left > 0 {
            if self.used == 0 {
                self.bytes.push(0);
            }
            let free = 8 - self.used;
            let take = free.min(left);
            // Top `take` bits of the still-unwritten tail of `value`.
            let chunk = ((value >> (left - take)) & ((1u64 << take) - 1)) as u8;
            let last = self.bytes.len() - 1;
            self.bytes[last] |= chunk << (free - take);
            self.used = (self.used + take) % 8;
            left -= take;
        }
    }
}

/// A forward cursor over a bit buffer.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    total_bits: usize,
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(buffer: &'a BitBuffer) -> Self {
        Self::from_raw(buffer.as_bytes(), buffer.len_bits())
    }

    /// Creates a reader over `bytes`, of which only the first `total_bits`
    /// bits are meaningful.
    pub fn from_raw(bytes: &'a [u8], total_bits: usize) -> Self {
        debug_assert!(total_bits <= bytes.len() * 8);
        Self {
            bytes,
            total_bits,
            pos: 0,
        }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.total_bits - self.pos
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.total_bits
    }

    /// Reads one bit, or `None` at the end of the stream.
    #[inline]
    pub fn read_bit(&mut self) -> Option<bool> {
        self.read_bits(1).map(|bit| bit == 1)
    }

    /// Reads `n` bits (at most 64) into the low bits of a `u64`. Returns
    /// `None` without consuming anything if fewer than `n` bits remain.
    pub fn read_bits(&mut self, n: u8) -> Option<u64> {
        debug_assert!(n <= 64);
        if self.remaining() < n as usize {
            return None;
        }
        let mut value: u64 = 0;
        let mut left = n;
        while left > 0 {
            let offset = (self.pos % 8) as u8;
            let avail = 8 - offset;
            let take = avail.min(left);
            let byte = self.bytes[self.pos / 8];
            let chunk = (byte >> (avail - take)) & (((1u16 << take) - 1) as u8);
            value = (value << take) | chunk as u64;
            self.pos += take as usize;
            left -= take;
        }
        Some(value)
    }
}
