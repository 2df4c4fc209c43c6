use std::marker::PhantomData;

use thiserror::Error;

use crate::codec::Codec;
use crate::encoder::GorillaEncoder;
use crate::window::SlidingWindow;

/// Block size used when no overflow is configured.
pub const DEFAULT_OVERFLOW: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("overflow (block size) must be at least 1")]
    ZeroOverflow,
}

/// Settings of a [`SlidingWindow`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WindowConfig {
    /// Number of samples the window reports and serves.
    pub limit: usize,
    /// Samples per sealed block. The window may hold up to this many
    /// samples beyond `limit` before it evicts.
    pub overflow: usize,
    /// Keep a raw copy of the latest sealed block so short reads never
    /// decode.
    pub fast_mode: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            limit: 0,
            overflow: DEFAULT_OVERFLOW,
            fast_mode: false,
        }
    }
}

impl WindowConfig {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.overflow == 0 {
            return Err(ConfigError::ZeroOverflow);
        }
        Ok(())
    }

    /// `limit + overflow`: the most samples a window with this config can hold.
    pub fn ceiling(&self) -> usize {
        self.limit.saturating_add(self.overflow)
    }
}

/// Builder returned by [`SlidingWindow::builder`].
///
/// ```
/// use gorilla_window::SlidingWindow;
///
/// let window = SlidingWindow::builder(100)
///     .overflow(25)
///     .fast_mode(true)
///     .build()
///     .unwrap();
/// assert_eq!(window.cap(), 125);
/// ```
#[derive(Debug, Clone)]
pub struct WindowBuilder<C = GorillaEncoder> {
    config: WindowConfig,
    codec: PhantomData<fn() -> C>,
}

impl<C: Codec> WindowBuilder<C> {
    pub fn new(limit: usize) -> Self {
        Self {
            config: WindowConfig::new(limit),
            codec: PhantomData,
        }
    }

    pub fn overflow(mut self, overflow: usize) -> Self {
        self.config.overflow = overflow;
        self
    }

    pub fn fast_mode(mut self, enabled: bool) -> Self {
        self.config.fast_mode = enabled;
        self
    }

    /// Switches the block codec.
    pub fn codec<D: Codec>(self) -> WindowBuilder<D> {
        WindowBuilder {
            config: self.config,
            codec: PhantomData,
        }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn build(self) -> Result<SlidingWindow<C>, ConfigError> {
        SlidingWindow::with_config(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PlainCodec;

    #[test]
    fn test_defaults() {
        let config = WindowConfig::new(50);
        assert_eq!(config.overflow, DEFAULT_OVERFLOW);
        assert!(!config.fast_mode);
        assert_eq!(config.ceiling(), 70);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_overflow_rejected() {
        let err = WindowBuilder::<GorillaEncoder>::new(10).overflow(0).build().unwrap_err();
        assert_eq!(err, ConfigError::ZeroOverflow);
        assert_eq!(err.to_string(), "overflow (block size) must be at least 1");
    }

    #[test]
    fn test_builder_sets_fields() {
        let builder = WindowBuilder::<GorillaEncoder>::new(7)
            .overflow(3)
            .fast_mode(true)
            .codec::<PlainCodec>();
        assert_eq!(
            builder.config(),
            &WindowConfig {
                limit: 7,
                overflow: 3,
                fast_mode: true,
            }
        );
        let window = builder.build().unwrap();
        assert_eq!(window.cap(), 10);
    }

    #[test]
    fn test_ceiling_saturates() {
        let config = WindowConfig {
            limit: usize::MAX,
            ..WindowConfig::default()
        };
        assert_eq!(config.ceiling(), usize::MAX);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_from_json_fills_defaults() {
        let config: WindowConfig = serde_json::from_str(r#"{"limit": 240}"#).unwrap();
        assert_eq!(config, WindowConfig::new(240));
    }
}
