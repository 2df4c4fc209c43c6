use crate::bitbuffer::BitReader;
use crate::codec::{DecodeError, Sample, SealedBlock};
use crate::encoder::{GorillaBlock, END_OF_STREAM};

impl GorillaBlock {
    /// Decodes every sample, oldest first.
    pub fn decode(&self) -> Result<Vec<Sample>, DecodeError> {
        let mut out = Vec::with_capacity(self.count);
        for sample in self.iter() {
            out.push(sample?);
        }
        Ok(out)
    }
}

impl SealedBlock for GorillaBlock {
    type Iter<'a> = GorillaIter<'a>;

    fn iter(&self) -> GorillaIter<'_> {
        GorillaIter {
            reader: BitReader::from_raw(&self.bytes, self.total_bits),
            state: IterState::Header,
            prev_timestamp: 0,
            prev_delta: 0,
            prev_value_bits: 0,
            prev_leading_zeros: 0,
            prev_trailing_zeros: 0,
        }
    }

    fn len(&self) -> usize {
        self.count
    }

    fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IterState {
    Header,
    First,
    Subsequent,
    Done,
}

/// A lazy cursor over a [`GorillaBlock`], yielding samples oldest to
/// newest. After an error or the end marker it keeps returning `None`.
#[derive(Debug, Clone)]
pub struct GorillaIter<'a> {
    reader: BitReader<'a>,
    state: IterState,
    prev_timestamp: i64,
    prev_delta: i64,
    prev_value_bits: u64,
    prev_leading_zeros: u8,
    prev_trailing_zeros: u8,
}

impl GorillaIter<'_> {
    fn step(&mut self) -> Result<Option<Sample>, DecodeError> {
        if self.state == IterState::Header {
            self.prev_timestamp = self.reader.read_bits(64).ok_or(DecodeError::Empty)? as i64;
            self.state = IterState::First;
        }

        let dod = match self.read_delta_of_delta()? {
            Some(dod) => dod,
            None => return Ok(None),
        };
        self.prev_delta = self.prev_delta.wrapping_add(dod);
        self.prev_timestamp = self.prev_timestamp.wrapping_add(self.prev_delta);

        if self.state == IterState::First {
            self.prev_value_bits = self.read(64)?;
            self.state = IterState::Subsequent;
        } else {
            self.read_value()?;
        }

        Ok(Some(Sample::new(
            self.prev_timestamp,
            f64::from_bits(self.prev_value_bits),
        )))
    }

    #[inline]
    fn read(&mut self, n: u8) -> Result<u64, DecodeError> {
        self.reader.read_bits(n).ok_or(DecodeError::UnexpectedEnd)
    }

    /// Returns `None` on the end-of-stream marker.
    fn read_delta_of_delta(&mut self) -> Result<Option<i64>, DecodeError> {
        // Count leading one-bits of the prefix, up to four.
        let mut ones = 0;
        while ones < 4 && self.read(1)? == 1 {
            ones += 1;
        }
        let dod = match ones {
            0 => 0,
            1 => sign_extend(self.read(7)?, 7),
            2 => sign_extend(self.read(9)?, 9),
            3 => sign_extend(self.read(12)?, 12),
            _ => match self.read(64)? {
                END_OF_STREAM => return Ok(None),
                raw => raw as i64,
            },
        };
        Ok(Some(dod))
    }

    fn read_value(&mut self) -> Result<(), DecodeError> {
        if self.read(1)? == 0 {
            return Ok(());
        }
        if self.read(1)? == 1 {
            let leading = self.read(6)? as u8;
            let meaningful = self.read(6)? as u8 + 1;
            if leading + meaningful > 64 {
                return Err(DecodeError::UnexpectedEnd);
            }
            self.prev_leading_zeros = leading;
            self.prev_trailing_zeros = 64 - leading - meaningful;
        }
        let meaningful = 64 - self.prev_leading_zeros - self.prev_trailing_zeros;
        let xor = self.read(meaningful)? << self.prev_trailing_zeros;
        self.prev_value_bits ^= xor;
        Ok(())
    }
}

impl Iterator for GorillaIter<'_> {
    type Item = Result<Sample, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == IterState::Done {
            return None;
        }
        match self.step() {
            Ok(Some(sample)) => Some(Ok(sample)),
            Ok(None) => {
                self.state = IterState::Done;
                None
            }
            Err(err) => {
                self.state = IterState::Done;
                Some(Err(err))
            }
        }
    }
}

/// Sign-extends the low `bits` bits of `value`.
#[inline]
fn sign_extend(value: u64, bits: u8) -> i64 {
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}
