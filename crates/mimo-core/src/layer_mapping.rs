//! Layer Mapper / Demapper
//!
//! Round-robin interleaving of a flat symbol sequence across spatial
//! streams: symbol `i` lands in stream `i % num_streams` at position
//! `i / num_streams`.
//!
//! ```text
//!   [s0 s1 s2 s3 s4 s5]  ── num_streams = 2 ──►  stream 0: [s0 s2 s4]
//!                                                stream 1: [s1 s3 s5]
//! ```
//!
//! Sequences whose length is not a multiple of the stream count are
//! rejected; pad the frame first (see [`crate::plan::LinkPlan`]).

use num_complex::Complex64;

use crate::types::{LayeredStreams, MimoError, MimoResult};

/// Flat sequence → per-stream layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerMapper {
    num_streams: usize,
}

impl LayerMapper {
    pub fn new(num_streams: usize) -> MimoResult<Self> {
        if num_streams == 0 {
            return Err(MimoError::dimension("layer mapper needs at least one stream"));
        }
        Ok(Self { num_streams })
    }

    pub fn num_streams(&self) -> usize {
        self.num_streams
    }

    /// Interleave `symbols` across the streams.
    pub fn map(&self, symbols: &[Complex64]) -> MimoResult<LayeredStreams> {
        if symbols.len() % self.num_streams != 0 {
            return Err(MimoError::dimension(format!(
                "{} symbols do not divide evenly into {} streams",
                symbols.len(),
                self.num_streams
            )));
        }
        let stream_len = symbols.len() / self.num_streams;
        let mut layers = LayeredStreams::zeros(self.num_streams, stream_len);
        for (i, &s) in symbols.iter().enumerate() {
            layers.stream_mut(i % self.num_streams)[i / self.num_streams] = s;
        }
        Ok(layers)
    }
}

/// Per-stream layers → flat sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerDemapper;

impl LayerDemapper {
    /// Read the layers back in flat order.
    pub fn demap(&self, layers: &LayeredStreams) -> Vec<Complex64> {
        let n = layers.num_streams();
        let total = layers.total_len();
        let mut out = Vec::with_capacity(total);
        for i in 0..total {
            out.push(layers[i % n][i / n]);
        }
        out
    }
}
