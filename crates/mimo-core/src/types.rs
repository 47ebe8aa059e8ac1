//! Core types for the MIMO link
//!
//! The link carries QPSK symbols end to end. A source bitstream is cut into
//! 2-bit [`SymbolIndex`] values, each index becomes one complex point, and the
//! flat symbol sequence is spread across parallel spatial streams
//! ([`LayeredStreams`]) for the spatial-multiplexing stages.
//!
//! ```text
//!   indices ─► symbols ─► layers[stream][t] ─► ... ─► layers ─► symbols ─► indices
//!   [0..=3]    Complex64   num_streams × len            flat       [0..=3]
//! ```

use num_complex::Complex64;
use serde::Serialize;
use std::ops::Index;
use std::path::PathBuf;

/// Type alias for complex numbers using f64 precision
pub type Complex = Complex64;

/// A 2-bit QPSK symbol index, always in `0..=3`
pub type SymbolIndex = u8;

/// An ordered sequence of complex symbols
pub type SymbolSequence = Vec<Complex64>;

/// Result type for link operations
pub type MimoResult<T> = Result<T, MimoError>;

/// Errors that can occur while configuring or running the link
#[derive(Debug, thiserror::Error)]
pub enum MimoError {
    /// Symbol index outside the QPSK alphabet
    #[error("symbol index {index} at position {position} is outside 0..=3")]
    InvalidSymbolIndex { index: u8, position: usize },

    /// Stream, antenna or sequence dimensions do not fit together
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A singular value too small to invert reached the equalizer
    #[error("degenerate channel: singular value {value:e} of stream {stream} is below {threshold:e}")]
    DegenerateChannel {
        stream: usize,
        value: f64,
        threshold: f64,
    },

    /// The SVD provider failed or broke its output contract
    #[error("decomposition failed: {0}")]
    Decomposition(String),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input or output file could not be accessed
    #[error("cannot access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MimoError {
    /// Shorthand for a [`MimoError::DimensionMismatch`].
    pub fn dimension(msg: impl Into<String>) -> Self {
        MimoError::DimensionMismatch(msg.into())
    }

    /// Check if this error comes from a rank-deficient channel realization
    pub fn is_degenerate(&self) -> bool {
        matches!(self, MimoError::DegenerateChannel { .. })
    }
}

/// Per-stream symbol buffers for the spatial-multiplexing stages.
///
/// Row `s` holds the symbols carried by stream (or antenna) `s`. Every row
/// has the same length, so `num_streams() * stream_len()` is the number of
/// symbols in the frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayeredStreams {
    streams: Vec<SymbolSequence>,
    stream_len: usize,
}

impl LayeredStreams {
    /// Build from per-stream buffers, rejecting ragged input.
    pub fn from_streams(streams: Vec<SymbolSequence>) -> MimoResult<Self> {
        let stream_len = streams.first().map_or(0, Vec::len);
        if let Some((idx, bad)) = streams
            .iter()
            .enumerate()
            .find(|(_, s)| s.len() != stream_len)
        {
            return Err(MimoError::dimension(format!(
                "stream {} has {} symbols, stream 0 has {}",
                idx,
                bad.len(),
                stream_len
            )));
        }
        Ok(Self {
            streams,
            stream_len,
        })
    }

    /// All-zero buffers of `num_streams × stream_len`.
    pub fn zeros(num_streams: usize, stream_len: usize) -> Self {
        Self {
            streams: vec![vec![Complex64::new(0.0, 0.0); stream_len]; num_streams],
            stream_len,
        }
    }

    /// Number of streams (rows).
    pub fn num_streams(&self) -> usize {
        self.streams.len()
    }

    /// Symbols per stream.
    pub fn stream_len(&self) -> usize {
        self.stream_len
    }

    /// Total symbols across all streams.
    pub fn total_len(&self) -> usize {
        self.num_streams() * self.stream_len
    }

    /// Borrow one stream.
    pub fn stream(&self, idx: usize) -> &[Complex64] {
        &self.streams[idx]
    }

    /// Iterate over the streams in index order.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolSequence> {
        self.streams.iter()
    }

    /// Mutably borrow one stream. The length is fixed.
    pub fn stream_mut(&mut self, idx: usize) -> &mut [Complex64] {
        &mut self.streams[idx]
    }

    /// Consume into the raw per-stream buffers.
    pub fn into_streams(self) -> Vec<SymbolSequence> {
        self.streams
    }
}

impl Index<usize> for LayeredStreams {
    type Output = [Complex64];

    fn index(&self, idx: usize) -> &Self::Output {
        &self.streams[idx]
    }
}
