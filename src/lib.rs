//! # gorilla-window
//!
//! A bounded, append-only sliding window over one time series that keeps
//! its newest samples raw and packs older ones into Gorilla-compressed
//! blocks.
//!
//! ## Layout
//!
//! - **Hot buffer**: the newest `overflow` samples, uncompressed, so short
//!   reads never decode anything.
//! - **Block chain**: once the hot buffer fills up it is sealed into an
//!   immutable block. Blocks are kept newest first and dropped whole from
//!   the old end once the window holds more than `limit + overflow` samples.
//!
//! Reads walk the hot buffer, then as many blocks as they need, and return
//! samples newest first.
//!
//! ## Example
//!
//! ```rust
//! use gorilla_window::SlidingWindow;
//!
//! let window = SlidingWindow::builder(100).overflow(20).build().unwrap();
//! for t in 0..500 {
//!     window.push(1_609_459_200 + t * 60, 20.0 + (t % 7) as f64);
//! }
//!
//! let recent = window.get_n(30);
//! assert_eq!(recent.len(), 30);
//! assert_eq!(recent[0].timestamp, 1_609_459_200 + 499 * 60);
//! assert!(recent.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
//! ```
//!
//! ## Codecs
//!
//! Blocks are encoded through the [`Codec`] trait. [`GorillaEncoder`]
//! (delta-of-delta timestamps, XOR values) is the default and
//! [`PlainCodec`] stores samples as they are:
//!
//! ```rust
//! use gorilla_window::{PlainCodec, SlidingWindow};
//!
//! let window = SlidingWindow::builder(10)
//!     .codec::<PlainCodec>()
//!     .build()
//!     .unwrap();
//! window.push(1, 1.0);
//! assert_eq!(window.len(), 1);
//! ```

pub mod bitbuffer;
pub mod chain;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod hot;
pub mod window;

pub use chain::{BlockChain, CompressedBlock};
pub use codec::{Codec, DecodeError, PlainBlock, PlainCodec, Sample, SealedBlock};
pub use config::{ConfigError, WindowBuilder, WindowConfig, DEFAULT_OVERFLOW};
pub use decoder::GorillaIter;
pub use encoder::{GorillaBlock, GorillaEncoder};
pub use hot::HotBuffer;
pub use window::{SlidingWindow, WindowStats};
