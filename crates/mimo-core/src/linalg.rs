//! Matrix × stream kernels
//!
//! The spatial stages all multiply a small real matrix into a block of
//! complex streams, one time index at a time:
//!
//! ```text
//! apply:            out[i][j] = sum_k       M[i][k]  * data[k][j]    (M · X)
//! hermitian_apply:  out[i][j] = sum_k  conj(M[k][i]) * data[k][j]    (M^H · X)
//! ```
//!
//! Factors stay real; they are lifted to `Complex64` and multiplied as
//! complex scalars, so the imaginary part of the data is never dropped.

use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::types::LayeredStreams;

#[inline]
fn lift(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

/// `M · X` for an `rows × cols` matrix and `cols` input streams.
///
/// # Panics
///
/// If `data` does not have `m.ncols()` streams.
pub fn apply(m: &DMatrix<f64>, data: &LayeredStreams) -> LayeredStreams {
    assert_eq!(
        m.ncols(),
        data.num_streams(),
        "matrix has {} columns but {} streams were supplied",
        m.ncols(),
        data.num_streams()
    );
    let len = data.stream_len();
    let mut out = LayeredStreams::zeros(m.nrows(), len);
    for i in 0..m.nrows() {
        let row = out.stream_mut(i);
        for k in 0..m.ncols() {
            let gain = lift(m[(i, k)]);
            for (acc, &x) in row.iter_mut().zip(data.stream(k)) {
                *acc += gain * x;
            }
        }
    }
    out
}

/// `M^H · X` for an `rows × cols` matrix and `rows` input streams.
///
/// # Panics
///
/// If `data` does not have `m.nrows()` streams.
pub fn hermitian_apply(m: &DMatrix<f64>, data: &LayeredStreams) -> LayeredStreams {
    assert_eq!(
        m.nrows(),
        data.num_streams(),
        "matrix has {} rows but {} streams were supplied",
        m.nrows(),
        data.num_streams()
    );
    let len = data.stream_len();
    let mut out = LayeredStreams::zeros(m.ncols(), len);
    for i in 0..m.ncols() {
        let row = out.stream_mut(i);
        for k in 0..m.nrows() {
            let gain = lift(m[(k, i)]).conj();
            for (acc, &x) in row.iter_mut().zip(data.stream(k)) {
                *acc += gain * x;
            }
        }
    }
    out
}
