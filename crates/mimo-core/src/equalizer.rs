//! Zero-forcing equalizer for SVD-separated streams
//!
//! After combining, stream `s` arrives scaled by its singular value `S[s]`;
//! the equalizer divides it back out:
//!
//! ```text
//! output[s][n] = combined[s][n] / S[s]
//! ```
//!
//! Singular values at or below [`DEGENERATE_SINGULAR_VALUE`] are rejected
//! when the equalizer is built, so `equalize` never produces inf or NaN.
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::equalizer::ZfEqualizer;
//! use mimo_core::types::MimoError;
//!
//! assert!(ZfEqualizer::new(&[2.0, 0.5]).is_ok());
//! let err = ZfEqualizer::new(&[2.0, 0.0]).unwrap_err();
//! assert!(matches!(err, MimoError::DegenerateChannel { stream: 1, .. }));
//! ```

use num_complex::Complex64;

use crate::types::{LayeredStreams, MimoError, MimoResult};

/// Smallest singular value the equalizer will invert.
pub const DEGENERATE_SINGULAR_VALUE: f64 = 1e-9;

/// Per-stream zero-forcing equalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct ZfEqualizer {
    /// Reciprocal gain per stream.
    inv_gains: Vec<f64>,
}

impl ZfEqualizer {
    /// Build from the singular values feeding the combined streams.
    pub fn new(singular_values: &[f64]) -> MimoResult<Self> {
        for (stream, &value) in singular_values.iter().enumerate() {
            if !value.is_finite() || value.abs() <= DEGENERATE_SINGULAR_VALUE {
                return Err(MimoError::DegenerateChannel {
                    stream,
                    value,
                    threshold: DEGENERATE_SINGULAR_VALUE,
                });
            }
        }
        Ok(Self {
            inv_gains: singular_values.iter().map(|s| 1.0 / s).collect(),
        })
    }

    pub fn num_streams(&self) -> usize {
        self.inv_gains.len()
    }

    /// Divide each stream by its gain.
    ///
    /// # Panics
    ///
    /// If `combined` does not carry `num_streams()` streams.
    pub fn equalize(&self, combined: &LayeredStreams) -> LayeredStreams {
        assert_eq!(
            combined.num_streams(),
            self.num_streams(),
            "equalizer expects {} streams",
            self.num_streams()
        );
        let mut out = LayeredStreams::zeros(self.num_streams(), combined.stream_len());
        for (s, &inv) in self.inv_gains.iter().enumerate() {
            for (dst, &src) in out.stream_mut(s).iter_mut().zip(combined.stream(s)) {
                *dst = src * Complex64::new(inv, 0.0);
            }
        }
        out
    }
}
