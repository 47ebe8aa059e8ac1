//! Padder / Depadder
//!
//! Appends zero symbols to the tail of a frame so its length fits the
//! antenna and stream layout, and strips them again on receive.
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::padding::{pad_count, Depadder, Padder};
//! use num_complex::Complex64;
//!
//! let count = pad_count(4, 2).unwrap();
//! assert_eq!(count, 2);
//!
//! let frame = vec![Complex64::new(1.0, 1.0); 6];
//! let padded = Padder::new(count).pad(&frame);
//! assert_eq!(padded.len(), 8);
//! assert_eq!(Depadder::new(count).depad(&padded).unwrap(), frame);
//! ```

use num_complex::Complex64;

use crate::types::{MimoError, MimoResult};

/// Zero symbols appended for `nt` transmit antennas carrying `num_streams`
/// streams.
///
/// Fails when there are more streams than transmit antennas, which would
/// otherwise ask for a negative pad.
pub fn pad_count(nt: usize, num_streams: usize) -> MimoResult<usize> {
    nt.checked_sub(num_streams).ok_or_else(|| {
        MimoError::dimension(format!(
            "{} streams cannot be carried by {} transmit antennas",
            num_streams, nt
        ))
    })
}

/// Appends a fixed number of zero symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padder {
    count: usize,
}

impl Padder {
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    /// Number of symbols appended.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Copy `symbols` and append the zero tail.
    pub fn pad(&self, symbols: &[Complex64]) -> Vec<Complex64> {
        let mut out = Vec::with_capacity(symbols.len() + self.count);
        out.extend_from_slice(symbols);
        out.resize(symbols.len() + self.count, Complex64::new(0.0, 0.0));
        out
    }
}

/// Removes a fixed number of symbols from the tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depadder {
    count: usize,
}

impl Depadder {
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    /// Number of symbols removed.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Copy `symbols` without the tail.
    pub fn depad(&self, symbols: &[Complex64]) -> MimoResult<Vec<Complex64>> {
        let keep = symbols.len().checked_sub(self.count).ok_or_else(|| {
            MimoError::dimension(format!(
                "cannot remove {} padding symbols from a {}-symbol frame",
                self.count,
                symbols.len()
            ))
        })?;
        Ok(symbols[..keep].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(len: usize) -> Vec<Complex64> {
        (0..len)
            .map(|i| Complex64::new(i as f64, -(i as f64)))
            .collect()
    }

    #[test]
    fn test_pad_count() {
        assert_eq!(pad_count(8, 8).unwrap(), 0);
        assert_eq!(pad_count(4, 2).unwrap(), 2);
    }

    #[test]
    fn test_pad_count_rejects_negative() {
        let err = pad_count(2, 3).unwrap_err();
        assert!(matches!(err, MimoError::DimensionMismatch(_)));
    }

    #[test]
    fn test_pad_appends_zeros() {
        let padded = Padder::new(3).pad(&frame(2));
        assert_eq!(padded.len(), 5);
        assert_eq!(&padded[..2], &frame(2)[..]);
        assert!(padded[2..].iter().all(|s| *s == Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn test_depad_inverts_pad() {
        for len in [0, 1, 5, 16] {
            for n in 0..6 {
                let seq = frame(len);
                let padded = Padder::new(n).pad(&seq);
                assert_eq!(Depadder::new(n).depad(&padded).unwrap(), seq);
            }
        }
    }

    #[test]
    fn test_depad_too_short() {
        let err = Depadder::new(4).depad(&frame(3)).unwrap_err();
        assert!(matches!(err, MimoError::DimensionMismatch(_)));
    }

    #[test]
    fn test_pad_leaves_input_untouched() {
        let seq = frame(4);
        let before = seq.clone();
        let _ = Padder::new(2).pad(&seq);
        assert_eq!(seq, before);
    }
}
