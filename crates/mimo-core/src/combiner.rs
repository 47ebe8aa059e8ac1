//! SVD Combiner - separates received antenna samples into streams
//!
//! ```text
//! output[s][n] = sum_rx conj(U[rx][s]) * received[rx][n]      (U^H · Y)
//! ```

use nalgebra::DMatrix;

use crate::decomposition::Decomposition;
use crate::linalg;
use crate::types::LayeredStreams;

/// Receive-side combiner built from the left factor of a decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct Combiner {
    /// `U`, dimensions `[num_rx][num_streams]`.
    u: DMatrix<f64>,
}

impl Combiner {
    pub fn new(decomposition: &Decomposition) -> Self {
        Self {
            u: decomposition.u().clone(),
        }
    }

    pub fn num_rx(&self) -> usize {
        self.u.nrows()
    }

    pub fn num_streams(&self) -> usize {
        self.u.ncols()
    }

    /// Combine `[num_rx][N]` received samples into `[num_streams][N]`.
    pub fn combine(&self, received: &LayeredStreams) -> LayeredStreams {
        linalg::hermitian_apply(&self.u, received)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposition::Decomposer;
    use crate::precoder::Precoder;
    use num_complex::Complex64;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_diagonalizes_channel() {
        // Combiner(H · Precoder(x)) = diag(S) · x
        for (nr, nt) in [(2, 2), (4, 2), (2, 4), (3, 3)] {
            let h = DMatrix::from_fn(nr, nt, |r, c| {
                ((r * nt + c) as f64 * 0.7).sin() + if r == c { 1.5 } else { 0.0 }
            });
            let d = Decomposer::default().decompose_matrix(&h).unwrap();
            let k = d.num_streams();

            let x = LayeredStreams::from_streams(
                (0..k)
                    .map(|s| vec![Complex64::new(1.0 + s as f64, -(s as f64))])
                    .collect(),
            )
            .unwrap();
            let tx = Precoder::new(&d).precode(&x);
            let rx = linalg::apply(&h, &tx);
            let combined = Combiner::new(&d).combine(&rx);

            assert_eq!(combined.num_streams(), k);
            for s in 0..k {
                let expected = x[s][0] * d.singular_values()[s];
                assert!(
                    (combined[s][0] - expected).norm() < EPS,
                    "{nr}x{nt} stream {s}: {} vs {}",
                    combined[s][0],
                    expected
                );
            }
        }
    }

    #[test]
    fn test_dimensions() {
        let h = DMatrix::from_row_slice(4, 2, &[0.1, 0.2, 0.3, -0.4, 0.5, 0.6, -0.7, 0.8]);
        let d = Decomposer::default().decompose_matrix(&h).unwrap();
        let combiner = Combiner::new(&d);
        assert_eq!(combiner.num_rx(), 4);
        assert_eq!(combiner.num_streams(), 2);
        let out = combiner.combine(&LayeredStreams::zeros(4, 7));
        assert_eq!(out.num_streams(), 2);
        assert_eq!(out.stream_len(), 7);
    }
}
