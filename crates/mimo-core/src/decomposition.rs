//! Singular Value Decomposition of the channel
//!
//! Wraps nalgebra's SVD and normalizes its output into the layout the
//! precoder, combiner and equalizer consume:
//!
//! ```text
//!   H  =  U · diag(S) · V^H
//!  Nr×Nt  Nr×k   k×k    k×Nt        k = min(Nr, Nt)
//! ```
//!
//! `U` keeps the receive dimension on its rows and `V^H` keeps the transmit
//! dimension on its columns, matching [`ChannelMatrix`]. Singular values
//! are sorted descending and the factor columns/rows follow that order.
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::channel_matrix::ChannelMatrix;
//! use mimo_core::decomposition::Decomposer;
//!
//! let h = ChannelMatrix::from_rows(&[vec![3.0, 0.0], vec![0.0, 4.0]]).unwrap();
//! let svd = Decomposer::default().decompose(&h).unwrap();
//! assert!((svd.singular_values()[0] - 4.0).abs() < 1e-12);
//! assert!((svd.singular_values()[1] - 3.0).abs() < 1e-12);
//! ```

use nalgebra::{DMatrix, DVector, SVD};

use crate::channel_matrix::ChannelMatrix;
use crate::types::{MimoError, MimoResult};

/// Largest entry-wise deviation from `I` accepted for `UᵀU` and `V^H·V`.
pub const ORTHONORMAL_TOLERANCE: f64 = 1e-6;

/// Largest `|G - I|` entry of a Gram matrix, if above tolerance.
fn gram_deviation(gram: &DMatrix<f64>) -> Option<f64> {
    let deviation = gram
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let (r, c) = (i % gram.nrows(), i / gram.nrows());
            let expected = if r == c { 1.0 } else { 0.0 };
            (g - expected).abs()
        })
        .fold(0.0, f64::max);
    (deviation > ORTHONORMAL_TOLERANCE).then_some(deviation)
}

/// `U`, `S`, `V^H` of one channel realization.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    u: DMatrix<f64>,
    s: Vec<f64>,
    v_h: DMatrix<f64>,
}

impl Decomposition {
    /// Assemble from factors, checking shapes, ordering and orthonormality.
    ///
    /// `u` is `rows × k`, `s` has length `k`, `v_h` is `k × cols`, and `s`
    /// must be finite, non-negative and non-increasing. `UᵀU` and `V^H·V`
    /// must both be within [`ORTHONORMAL_TOLERANCE`] of `I_k`.
    pub fn from_parts(u: DMatrix<f64>, s: Vec<f64>, v_h: DMatrix<f64>) -> MimoResult<Self> {
        let k = s.len();
        if u.ncols() != k || v_h.nrows() != k {
            return Err(MimoError::Decomposition(format!(
                "factor shapes U {}x{}, S {}, V^H {}x{} do not agree",
                u.nrows(),
                u.ncols(),
                k,
                v_h.nrows(),
                v_h.ncols()
            )));
        }
        if k != u.nrows().min(v_h.ncols()) {
            return Err(MimoError::Decomposition(format!(
                "expected {} singular values for a {}x{} matrix, got {}",
                u.nrows().min(v_h.ncols()),
                u.nrows(),
                v_h.ncols(),
                k
            )));
        }
        if s.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(MimoError::Decomposition(
                "singular values must be finite and non-negative".to_string(),
            ));
        }
        if s.windows(2).any(|w| w[0] < w[1]) {
            return Err(MimoError::Decomposition(
                "singular values must be sorted in descending order".to_string(),
            ));
        }
        if u.iter().chain(v_h.iter()).any(|x| !x.is_finite()) {
            return Err(MimoError::Decomposition(
                "singular vectors contain non-finite entries".to_string(),
            ));
        }
        if let Some(deviation) = gram_deviation(&(u.transpose() * &u)) {
            return Err(MimoError::Decomposition(format!(
                "columns of U are not orthonormal (|UᵀU - I| = {:.3e})",
                deviation
            )));
        }
        if let Some(deviation) = gram_deviation(&(&v_h * v_h.transpose())) {
            return Err(MimoError::Decomposition(format!(
                "rows of V^H are not orthonormal (|V^H·V - I| = {:.3e})",
                deviation
            )));
        }
        Ok(Self { u, s, v_h })
    }

    /// `U = I`, `S = 1`, `V = I` for an `n × n` identity channel.
    pub fn identity(n: usize) -> Self {
        Self {
            u: DMatrix::identity(n, n),
            s: vec![1.0; n],
            v_h: DMatrix::identity(n, n),
        }
    }

    /// Left factor, `rows × k`.
    pub fn u(&self) -> &DMatrix<f64> {
        &self.u
    }

    /// Singular values, descending.
    pub fn singular_values(&self) -> &[f64] {
        &self.s
    }

    /// Right factor as stored, `V^H` (`k × cols`).
    pub fn v_h(&self) -> &DMatrix<f64> {
        &self.v_h
    }

    /// Right factor `V` (`cols × k`).
    pub fn v(&self) -> DMatrix<f64> {
        self.v_h.transpose()
    }

    /// Number of spatial streams the decomposition supports.
    pub fn num_streams(&self) -> usize {
        self.s.len()
    }

    /// Row count of the decomposed matrix (receive antennas).
    pub fn rows(&self) -> usize {
        self.u.nrows()
    }

    /// Column count of the decomposed matrix (transmit antennas).
    pub fn cols(&self) -> usize {
        self.v_h.ncols()
    }

    /// `U · diag(S) · V^H`.
    pub fn reconstruct(&self) -> DMatrix<f64> {
        let sigma = DMatrix::from_diagonal(&DVector::from_column_slice(&self.s));
        &self.u * sigma * &self.v_h
    }

    /// Ratio of largest to smallest singular value.
    pub fn condition_number(&self) -> f64 {
        match (self.s.first(), self.s.last()) {
            (Some(&max), Some(&min)) if min > 0.0 => max / min,
            _ => f64::INFINITY,
        }
    }
}

/// SVD front end.
#[derive(Debug, Clone, Copy)]
pub struct Decomposer {
    /// Convergence tolerance passed to the SVD iteration.
    pub eps: f64,
    /// Iteration cap, 0 runs until convergence.
    pub max_iterations: usize,
}

impl Default for Decomposer {
    fn default() -> Self {
        Self {
            eps: f64::EPSILON,
            max_iterations: 0,
        }
    }
}

impl Decomposer {
    /// Decompose a channel matrix as stored (rows = receive antennas).
    pub fn decompose(&self, channel: &ChannelMatrix) -> MimoResult<Decomposition> {
        self.decompose_matrix(channel.as_matrix())
    }

    /// Decompose an arbitrary real matrix.
    pub fn decompose_matrix(&self, m: &DMatrix<f64>) -> MimoResult<Decomposition> {
        let (rows, cols) = m.shape();
        if rows == 0 || cols == 0 {
            return Err(MimoError::Decomposition(format!(
                "cannot decompose an empty {}x{} matrix",
                rows, cols
            )));
        }

        let svd = SVD::try_new(m.clone(), true, true, self.eps, self.max_iterations)
            .ok_or_else(|| MimoError::Decomposition("SVD did not converge".to_string()))?;
        let u = svd
            .u
            .ok_or_else(|| MimoError::Decomposition("left singular vectors missing".to_string()))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| MimoError::Decomposition("right singular vectors missing".to_string()))?;
        let sv = svd.singular_values;

        // Provider order is not guaranteed; permute factors to descending S.
        let k = sv.len();
        let mut order: Vec<usize> = (0..k).collect();
        order.sort_by(|&a, &b| sv[b].total_cmp(&sv[a]));

        let s = order.iter().map(|&i| sv[i]).collect();
        let u = DMatrix::from_fn(rows, k, |r, c| u[(r, order[c])]);
        let v_h = DMatrix::from_fn(k, cols, |r, c| v_t[(order[r], c)]);

        let decomposition = Decomposition::from_parts(u, s, v_h)?;
        tracing::debug!(
            rows,
            cols,
            singular_values = ?decomposition.singular_values(),
            "channel decomposed"
        );
        Ok(decomposition)
    }
}
