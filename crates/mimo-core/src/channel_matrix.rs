//! Channel matrix for MIMO (Nr x Nt)
//!
//! The orientation is fixed: row `r` belongs to receive antenna `r`, column
//! `c` to transmit antenna `c`, so `y = H x` with `x` one sample per transmit
//! antenna. Every stage that touches the channel (transmission, SVD,
//! precoding, combining) reads it in this orientation.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::types::{MimoError, MimoResult};

/// Real-valued, frequency-flat channel gains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMatrix {
    gains: DMatrix<f64>,
}

impl ChannelMatrix {
    /// Wrap an `nr × nt` gain matrix.
    pub fn new(gains: DMatrix<f64>) -> MimoResult<Self> {
        if gains.nrows() == 0 || gains.ncols() == 0 {
            return Err(MimoError::dimension(format!(
                "channel matrix must be non-empty, got {}x{}",
                gains.nrows(),
                gains.ncols()
            )));
        }
        if gains.iter().any(|g| !g.is_finite()) {
            return Err(MimoError::InvalidConfig(
                "channel gains must be finite".to_string(),
            ));
        }
        Ok(Self { gains })
    }

    /// Build from row slices, one row per receive antenna.
    pub fn from_rows(rows: &[Vec<f64>]) -> MimoResult<Self> {
        let nr = rows.len();
        let nt = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != nt) {
            return Err(MimoError::dimension("channel rows have different lengths"));
        }
        Self::new(DMatrix::from_fn(nr, nt, |r, c| rows[r][c]))
    }

    /// Identity channel (`n × n`).
    pub fn identity(n: usize) -> Self {
        Self {
            gains: DMatrix::identity(n, n),
        }
    }

    /// Number of receive antennas.
    pub fn nr(&self) -> usize {
        self.gains.nrows()
    }

    /// Number of transmit antennas.
    pub fn nt(&self) -> usize {
        self.gains.ncols()
    }

    /// Get element H[r][c].
    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.gains[(r, c)]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.gains
    }

    /// Frobenius norm.
    pub fn frobenius_norm(&self) -> f64 {
        self.gains.norm()
    }

    /// Rows as nested vectors, for reports.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.nr())
            .map(|r| (0..self.nt()).map(|c| self.get(r, c)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_orientation() {
        let h = ChannelMatrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(h.nr(), 2);
        assert_eq!(h.nt(), 3);
        assert_eq!(h.get(1, 0), 4.0);
        assert_eq!(h.to_rows()[0], vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_identity() {
        let h = ChannelMatrix::identity(3);
        assert_eq!(h.get(1, 1), 1.0);
        assert_eq!(h.get(0, 2), 0.0);
        assert!((h.frobenius_norm() - 3f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_empty_and_ragged() {
        assert!(ChannelMatrix::from_rows(&[]).is_err());
        assert!(ChannelMatrix::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        let err = ChannelMatrix::from_rows(&[vec![f64::NAN]]).unwrap_err();
        assert!(matches!(err, MimoError::InvalidConfig(_)));
    }
}
