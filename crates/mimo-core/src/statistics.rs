//! Symbol and bit error statistics
//!
//! Compares transmitted and recovered index sequences position by position.
//! Each index carries two bits, so a symbol error costs one or two bit
//! errors depending on how far the decision landed.
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::statistics::StatisticsCollector;
//!
//! let stats = StatisticsCollector::compare(&[0, 1, 2, 3], &[0, 1, 2, 2]).unwrap();
//! assert_eq!(stats.symbol_errors, 1);
//! assert_eq!(stats.total_symbols, 4);
//! assert!((stats.error_percentage() - 25.0).abs() < 1e-12);
//! assert_eq!(stats.to_string(), "1 of 4 symbols in error (25.00%)");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::symbol_mapping::BITS_PER_SYMBOL;
use crate::types::{MimoError, MimoResult, SymbolIndex};

/// Error counts for one or more frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStatistics {
    /// Symbols compared.
    pub total_symbols: u64,
    /// Positions where the recovered index differs.
    pub symbol_errors: u64,
    /// Differing bits across all compared indices.
    pub bit_errors: u64,
}

impl LinkStatistics {
    /// Percentage of symbols in error (0 for an empty frame).
    pub fn error_percentage(&self) -> f64 {
        self.symbol_error_rate() * 100.0
    }

    /// Symbol error rate in `[0, 1]`.
    pub fn symbol_error_rate(&self) -> f64 {
        if self.total_symbols == 0 {
            return 0.0;
        }
        self.symbol_errors as f64 / self.total_symbols as f64
    }

    /// Bits compared.
    pub fn total_bits(&self) -> u64 {
        self.total_symbols * BITS_PER_SYMBOL as u64
    }

    /// Bit error rate in `[0, 1]`.
    pub fn bit_error_rate(&self) -> f64 {
        let bits = self.total_bits();
        if bits == 0 {
            return 0.0;
        }
        self.bit_errors as f64 / bits as f64
    }

    /// Fold another frame's counts into this one.
    pub fn merge(&mut self, other: &LinkStatistics) {
        self.total_symbols += other.total_symbols;
        self.symbol_errors += other.symbol_errors;
        self.bit_errors += other.bit_errors;
    }

    /// Normal-approximation confidence interval on the symbol error rate.
    ///
    /// Only 0.90, 0.95 and 0.99 are tabulated; other levels fall back to
    /// 0.95.
    pub fn confidence_interval(&self, confidence: f64) -> (f64, f64) {
        if self.total_symbols == 0 {
            return (0.0, 1.0);
        }
        let z = match () {
            _ if (confidence - 0.90).abs() < 0.001 => 1.645,
            _ if (confidence - 0.99).abs() < 0.001 => 2.576,
            _ => 1.960,
        };
        let p = self.symbol_error_rate();
        let margin = z * (p * (1.0 - p) / self.total_symbols as f64).sqrt();
        ((p - margin).max(0.0), (p + margin).min(1.0))
    }
}

impl fmt::Display for LinkStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} symbols in error ({:.2}%)",
            self.symbol_errors,
            self.total_symbols,
            self.error_percentage()
        )
    }
}

/// Transmitted-vs-recovered comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsCollector;

impl StatisticsCollector {
    /// Count mismatches between two index sequences of equal length.
    pub fn compare(tx: &[SymbolIndex], rx: &[SymbolIndex]) -> MimoResult<LinkStatistics> {
        if tx.len() != rx.len() {
            return Err(MimoError::dimension(format!(
                "cannot compare {} transmitted indices with {} recovered",
                tx.len(),
                rx.len()
            )));
        }
        let mut stats = LinkStatistics {
            total_symbols: tx.len() as u64,
            ..Default::default()
        };
        for (&a, &b) in tx.iter().zip(rx) {
            let diff = a ^ b;
            if diff != 0 {
                stats.symbol_errors += 1;
                stats.bit_errors += diff.count_ones() as u64;
            }
        }
        Ok(stats)
    }
}
