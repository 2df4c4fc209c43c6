use std::fmt;
use std::marker::PhantomData;
use std::mem;

use log::{debug, error, info, trace};
use parking_lot::Mutex;

use crate::chain::{BlockChain, CompressedBlock};
use crate::codec::{Codec, DecodeError, Sample, SealedBlock};
use crate::config::{ConfigError, WindowBuilder, WindowConfig};
use crate::encoder::GorillaEncoder;
use crate::hot::HotBuffer;

/// A point-in-time view of a window's internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStats {
    /// Samples currently retained, hot and sealed.
    pub total: usize,
    pub hot_len: usize,
    pub blocks: usize,
    pub compressed_bytes: usize,
    pub limit: usize,
    pub overflow: usize,
}

struct State<B> {
    hot: HotBuffer,
    chain: BlockChain<B>,
    capacity: usize,
    limit: usize,
    total: usize,
    fast_mode: bool,
    /// Raw copy of the chain head, oldest first. Only kept in fast mode.
    recent: Option<Vec<Sample>>,
}

impl<B: SealedBlock> State<B> {
    fn seal<C: Codec<Sealed = B>>(&mut self) {
        let full = mem::replace(&mut self.hot, HotBuffer::new(self.capacity));
        let samples = full.into_chronological();
        let block = CompressedBlock::seal::<C>(&samples);
        debug_assert_eq!(block.len(), self.capacity);
        trace!(
            "sealed block start={} samples={} bytes={}",
            block.start(),
            block.len(),
            block.size_bytes()
        );
        self.chain.push_front(block);
        self.recent = self.fast_mode.then_some(samples);
    }

    /// Drops whole blocks from the tail until `total <= limit + capacity`.
    fn evict(&mut self) {
        let bound = self.limit.saturating_add(self.capacity);
        let mut evicted = 0;
        while self.total > bound {
            if self.chain.pop_back().is_none() {
                break;
            }
            self.total -= self.capacity;
            evicted += 1;
        }
        if evicted > 0 {
            if self.chain.is_empty() {
                self.recent = None;
            }
            debug!(
                "evicted {} block(s), total={} limit={}",
                evicted, self.total, self.limit
            );
        }
    }

    fn collect(&self, n: usize) -> Result<Vec<Sample>, DecodeError> {
        let n = n.min(self.limit);
        if n == 0 {
            return Ok(Vec::new());
        }
        let hot_len = self.hot.len();
        if n <= self.capacity && hot_len >= n {
            return Ok(self.hot.front(n));
        }

        let mut out = Vec::with_capacity(n.min(self.total));
        out.extend(self.hot.newest().copied());
        // hot never holds a full block, so n > hot_len here.
        let mut remaining = n - hot_len;

        if let Some(recent) = &self.recent {
            if remaining <= recent.len() {
                out.extend(recent.iter().rev().take(remaining).copied());
                return Ok(out);
            }
        }

        for block in self.chain.iter() {
            if remaining == 0 {
                break;
            }
            out.extend(block.newest(remaining)?);
            remaining = remaining.saturating_sub(self.capacity);
        }
        Ok(out)
    }

    fn latest(&self) -> Result<Option<Sample>, DecodeError> {
        if let Some(sample) = self.hot.latest() {
            return Ok(Some(sample));
        }
        if let Some(recent) = &self.recent {
            return Ok(recent.last().copied());
        }
        match self.chain.head() {
            Some(block) => Ok(block.newest(1)?.first().copied()),
            None => Ok(None),
        }
    }
}

/// A bounded sliding window over one time series.
///
/// New samples go into an uncompressed hot buffer. Every `overflow` samples
/// the hot buffer is sealed into an immutable block encoded with `C`. Whole
/// blocks are evicted from the old end once more than `limit + overflow`
/// samples are held. Reads return the newest samples first and decode only
/// the blocks they reach.
///
/// Every method takes `&self` and holds one internal lock for its whole
/// duration, so a window can be shared across threads behind an `Arc`.
///
/// ```
/// use gorilla_window::{Sample, SlidingWindow};
///
/// let window = SlidingWindow::new(100);
/// for t in 1..=1024 {
///     window.push(t, t as f64 * 3.14);
/// }
/// assert_eq!(window.len(), 100);
/// assert_eq!(window.get_n(1), vec![Sample::new(1024, 1024.0 * 3.14)]);
/// assert_eq!(window.get_n(100)[99].timestamp, 925);
/// ```
pub struct SlidingWindow<C: Codec = GorillaEncoder> {
    state: Mutex<State<C::Sealed>>,
    codec: PhantomData<fn() -> C>,
}

impl SlidingWindow<GorillaEncoder> {
    /// Creates a Gorilla-backed window with the default overflow.
    pub fn new(limit: usize) -> Self {
        let config = WindowConfig::new(limit);
        Self::from_valid(&config)
    }

    pub fn builder(limit: usize) -> WindowBuilder<GorillaEncoder> {
        WindowBuilder::new(limit)
    }
}

impl<C: Codec> SlidingWindow<C> {
    pub fn with_config(config: WindowConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(&config))
    }

    fn from_valid(config: &WindowConfig) -> Self {
        Self {
            state: Mutex::new(State {
                hot: HotBuffer::new(config.overflow),
                chain: BlockChain::default(),
                capacity: config.overflow,
                limit: config.limit,
                total: 0,
                fast_mode: config.fast_mode,
                recent: None,
            }),
            codec: PhantomData,
        }
    }

    /// Appends a sample. Timestamps are taken as given; feed them in
    /// non-decreasing order if the output must be chronological.
    pub fn push(&self, timestamp: i64, value: f64) {
        let mut state = self.state.lock();
        state.total += 1;
        state.hot.push(Sample::new(timestamp, value));
        if state.hot.is_sealed() {
            state.seal::<C>();
        }
        state.evict();
    }

    /// Changes the retention target. Lowering it evicts immediately.
    pub fn reset_limit(&self, limit: usize) {
        let mut state = self.state.lock();
        info!("reset limit {} -> {}", state.limit, limit);
        state.limit = limit;
        state.evict();
    }

    /// Retained samples, capped at the limit.
    pub fn len(&self) -> usize {
        let state = self.state.lock();
        state.total.min(state.limit)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The configured ceiling `limit + overflow`, not the live count.
    pub fn cap(&self) -> usize {
        let state = self.state.lock();
        state.limit.saturating_add(state.capacity)
    }

    pub fn limit(&self) -> usize {
        self.state.lock().limit
    }

    pub fn overflow(&self) -> usize {
        self.state.lock().capacity
    }

    /// Returns up to `n` of the newest samples, newest first. `n` is clamped
    /// to the limit and to what the window holds.
    ///
    /// # Panics
    ///
    /// If a sealed block fails to decode, which means the codec broke its
    /// lossless contract.
    pub fn get_n(&self, n: usize) -> Vec<Sample> {
        let state = self.state.lock();
        state.collect(n).unwrap_or_else(corrupt)
    }

    /// Same as `get_n(limit)`.
    pub fn get_all(&self) -> Vec<Sample> {
        let state = self.state.lock();
        state.collect(state.limit).unwrap_or_else(corrupt)
    }

    /// The newest sample, if the window holds any.
    pub fn latest(&self) -> Option<Sample> {
        let state = self.state.lock();
        if state.limit == 0 {
            return None;
        }
        state.latest().unwrap_or_else(corrupt)
    }

    pub fn stats(&self) -> WindowStats {
        let state = self.state.lock();
        WindowStats {
            total: state.total,
            hot_len: state.hot.len(),
            blocks: state.chain.len(),
            compressed_bytes: state.chain.size_bytes(),
            limit: state.limit,
            overflow: state.capacity,
        }
    }
}

impl<C: Codec> fmt::Debug for SlidingWindow<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlidingWindow")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cold]
fn corrupt<T>(err: DecodeError) -> T {
    error!("sealed block failed to decode: {}", err);
    panic!("sealed block failed to decode: {err}");
}
