//! Parser limits and key handling.

use crate::error::{Error, ErrorKind, Result};

/// Default maximum element nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default maximum input size (16 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 16 * 1024 * 1024;

/// Configuration for a [`Parser`](crate::Parser).
///
/// ```
/// use activeresource_xml::ParserConfig;
///
/// let config = ParserConfig::default()
///     .max_depth(32)
///     .undasherize_keys(true);
/// assert_eq!(config.max_depth, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum element nesting depth, root included.
    pub max_depth: usize,
    /// Maximum input size in bytes.
    pub max_input_bytes: usize,
    /// Replace `-` with `_` in dictionary keys, the way Rails undasherizes
    /// tag names such as `<first-name>`.
    pub undasherize_keys: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            undasherize_keys: false,
        }
    }
}

impl ParserConfig {
    /// Sets the maximum nesting depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the maximum input size in bytes.
    pub fn max_input_bytes(mut self, bytes: usize) -> Self {
        self.max_input_bytes = bytes;
        self
    }

    /// Enables or disables key undasherizing.
    pub fn undasherize_keys(mut self, enabled: bool) -> Self {
        self.undasherize_keys = enabled;
        self
    }

    /// Rejects inputs larger than `max_input_bytes`.
    pub fn validate_input(&self, input: &[u8]) -> Result<()> {
        if input.len() > self.max_input_bytes {
            return Err(Error::new(ErrorKind::InputTooLarge {
                size: input.len(),
                limit: self.max_input_bytes,
            }));
        }
        Ok(())
    }

    /// Maps an element name to its dictionary key.
    pub(crate) fn key_for(&self, name: &str) -> String {
        if self.undasherize_keys {
            name.replace('-', "_")
        } else {
            name.to_string()
        }
    }
}
