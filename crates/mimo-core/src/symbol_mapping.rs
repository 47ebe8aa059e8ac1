//! Symbol Mapper / Demapper
//!
//! Maps 2-bit indices to the link's QPSK constellation and demaps received
//! samples back to indices with a nearest-point hard decision.
//!
//! ```text
//!          Q
//!   0 (-1,+1) │ 2 (+1,+1)
//!   ──────────┼──────────► I
//!   1 (-1,-1) │ 3 (+1,-1)
//! ```
//!
//! The first index bit selects the sign of I, the second the sign of Q.
//! Points are not normalized to unit energy.
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::symbol_mapping::{SymbolDemapper, SymbolMapper};
//!
//! let symbols = SymbolMapper.map(&[0, 1, 2, 3]).unwrap();
//! let indices = SymbolDemapper.demap(&symbols);
//! assert_eq!(indices, vec![0, 1, 2, 3]);
//! ```

use num_complex::Complex64;

use crate::types::{MimoError, MimoResult, SymbolIndex};

/// Constellation points indexed by symbol index.
pub const QPSK_CONSTELLATION: [Complex64; 4] = [
    Complex64::new(-1.0, 1.0),
    Complex64::new(-1.0, -1.0),
    Complex64::new(1.0, 1.0),
    Complex64::new(1.0, -1.0),
];

/// Bits carried by one symbol.
pub const BITS_PER_SYMBOL: usize = 2;

/// Index → constellation point mapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolMapper;

impl SymbolMapper {
    /// Map a single index.
    pub fn map_one(&self, index: SymbolIndex) -> Option<Complex64> {
        QPSK_CONSTELLATION.get(index as usize).copied()
    }

    /// Fail on the first index outside the constellation.
    pub fn check(&self, indices: &[SymbolIndex]) -> MimoResult<()> {
        match indices.iter().position(|&i| i as usize >= QPSK_CONSTELLATION.len()) {
            Some(position) => Err(MimoError::InvalidSymbolIndex {
                index: indices[position],
                position,
            }),
            None => Ok(()),
        }
    }

    /// Map an index sequence to symbols.
    ///
    /// The whole input is checked first; an index above 3 fails with
    /// [`MimoError::InvalidSymbolIndex`] and nothing is produced.
    pub fn map(&self, indices: &[SymbolIndex]) -> MimoResult<Vec<Complex64>> {
        self.check(indices)?;
        Ok(indices
            .iter()
            .map(|&i| QPSK_CONSTELLATION[i as usize])
            .collect())
    }
}

/// Nearest-point hard-decision demapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolDemapper;

impl SymbolDemapper {
    /// Demap one received sample.
    ///
    /// Scans the constellation in index order and keeps a point only if it
    /// is strictly closer, so ties resolve to the lowest index. A non-finite
    /// sample never compares closer and demaps to 0.
    pub fn demap_one(&self, sample: Complex64) -> SymbolIndex {
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (idx, point) in QPSK_CONSTELLATION.iter().enumerate() {
            let dist = (sample - point).norm();
            if dist < best_dist {
                best_dist = dist;
                best = idx;
            }
        }
        best as SymbolIndex
    }

    /// Demap a received sequence.
    pub fn demap(&self, samples: &[Complex64]) -> Vec<SymbolIndex> {
        samples.iter().map(|&s| self.demap_one(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_map_table() {
        let symbols = SymbolMapper.map(&[0, 1, 2, 3]).unwrap();
        assert_eq!(
            symbols,
            vec![c(-1.0, 1.0), c(-1.0, -1.0), c(1.0, 1.0), c(1.0, -1.0)]
        );
    }

    #[test]
    fn test_demap_exact_points() {
        let symbols = vec![c(-1.0, 1.0), c(-1.0, -1.0), c(1.0, 1.0), c(1.0, -1.0)];
        assert_eq!(SymbolDemapper.demap(&symbols), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_roundtrip_every_index() {
        for i in 0..4u8 {
            let s = SymbolMapper.map_one(i).unwrap();
            assert_eq!(SymbolDemapper.demap_one(s), i);
        }
    }

    #[test]
    fn test_invalid_index() {
        let err = SymbolMapper.map(&[0, 3, 4, 1]).unwrap_err();
        match err {
            MimoError::InvalidSymbolIndex { index, position } => {
                assert_eq!(index, 4);
                assert_eq!(position, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(SymbolMapper.map_one(7).is_none());
    }

    #[test]
    fn test_demap_noisy() {
        let noisy = vec![c(-0.7, 0.4), c(-1.3, -0.2), c(0.1, 2.0), c(0.9, -0.05)];
        assert_eq!(SymbolDemapper.demap(&noisy), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_tie_breaks_to_lowest_index() {
        // Origin is equidistant from all four points.
        assert_eq!(SymbolDemapper.demap_one(c(0.0, 0.0)), 0);
        // On the I axis left of origin: equidistant from 0 and 1.
        assert_eq!(SymbolDemapper.demap_one(c(-0.5, 0.0)), 0);
        // On the Q axis below origin: equidistant from 1 and 3.
        assert_eq!(SymbolDemapper.demap_one(c(0.0, -0.5)), 1);
        // On the I axis right of origin: equidistant from 2 and 3.
        assert_eq!(SymbolDemapper.demap_one(c(0.5, 0.0)), 2);
    }

    #[test]
    fn test_non_finite_sample() {
        assert_eq!(SymbolDemapper.demap_one(c(f64::NAN, 1.0)), 0);
    }

    #[test]
    fn test_empty() {
        assert!(SymbolMapper.map(&[]).unwrap().is_empty());
        assert!(SymbolDemapper.demap(&[]).is_empty());
    }
}
