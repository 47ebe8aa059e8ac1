//! SVD Precoder - maps spatial streams onto transmit antennas
//!
//! The transmit block is `X = V · S` with `V` the right singular vectors of
//! the channel. Stored as `V^H`, this is
//!
//! ```text
//! output[tx][n] = sum_s conj(V^H[s][tx]) * symbols[s][n]
//! ```
//!
//! so after the channel `H X = U Σ S` and the combiner only has to undo
//! `U`, leaving one scaled copy of each stream.
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::decomposition::Decomposition;
//! use mimo_core::precoder::Precoder;
//! use mimo_core::types::LayeredStreams;
//!
//! let precoder = Precoder::new(&Decomposition::identity(2));
//! let streams = LayeredStreams::zeros(2, 3);
//! let tx = precoder.precode(&streams);
//! assert_eq!(tx.num_streams(), 2); // 2 TX antennas
//! assert_eq!(tx.stream_len(), 3);
//! ```

use nalgebra::DMatrix;

use crate::decomposition::Decomposition;
use crate::linalg;
use crate::types::LayeredStreams;

/// Precoder built from the right factor of a decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct Precoder {
    /// `V^H`, dimensions `[num_streams][num_tx]`.
    v_h: DMatrix<f64>,
}

impl Precoder {
    pub fn new(decomposition: &Decomposition) -> Self {
        Self {
            v_h: decomposition.v_h().clone(),
        }
    }

    /// Streams expected on input.
    pub fn num_streams(&self) -> usize {
        self.v_h.nrows()
    }

    /// Transmit antennas produced on output.
    pub fn num_tx(&self) -> usize {
        self.v_h.ncols()
    }

    /// Precode `[num_streams][N]` symbols into `[num_tx][N]` antenna samples.
    pub fn precode(&self, symbols: &LayeredStreams) -> LayeredStreams {
        linalg::hermitian_apply(&self.v_h, symbols)
    }
}
