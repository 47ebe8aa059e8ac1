//! # MIMO Core Link Library
//!
//! Building blocks for an SVD-precoded spatial-multiplexing link over a
//! real-valued, frequency-flat MIMO channel.
//!
//! ## Overview
//!
//! The channel `H` (Nr × Nt) is split by singular value decomposition into
//! `H = U · diag(S) · V^H`. Precoding with `V` on transmit and combining with
//! `U^H` on receive turns the channel into `min(Nr, Nt)` independent scalar
//! sub-channels with gains `S`, which a zero-forcing equalizer divides out.
//!
//! ## Signal Flow
//!
//! ```text
//! TX: Indices → QPSK Map → Pad → Layer Map → Precode (V)
//!                                                 │
//!                                            H · x + n
//!                                                 │
//! RX: Indices ← QPSK Demap ← Depad ← Layer Demap ← Equalize (1/S) ← Combine (U^H)
//! ```
//!
//! Channel generation and noise live in `mimo-sim`; this crate holds the
//! deterministic stages, their dimension bookkeeping, and shared config.
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::prelude::*;
//!
//! let h = ChannelMatrix::identity(2);
//! let d = Decomposer::default().decompose(&h).unwrap();
//!
//! let symbols = SymbolMapper.map(&[0, 1, 2, 3]).unwrap();
//! let layers = LayerMapper::new(2).unwrap().map(&symbols).unwrap();
//! let tx = Precoder::new(&d).precode(&layers);
//! let rx = Combiner::new(&d).combine(&tx);
//! let eq = ZfEqualizer::new(d.singular_values()).unwrap().equalize(&rx);
//! let recovered = SymbolDemapper.demap(&LayerDemapper.demap(&eq));
//! assert_eq!(recovered, vec![0, 1, 2, 3]);
//! ```

pub mod bit_packing;
pub mod channel_matrix;
pub mod combiner;
pub mod config;
pub mod decomposition;
pub mod equalizer;
pub mod layer_mapping;
pub mod linalg;
pub mod logging;
pub mod padding;
pub mod plan;
pub mod precoder;
pub mod statistics;
pub mod symbol_mapping;
pub mod types;

// Re-export main types
pub use bit_packing::{read_index_file, write_index_file, IndexPacker};
pub use channel_matrix::ChannelMatrix;
pub use combiner::Combiner;
pub use config::{LinkConfig, MimoConfig};
pub use decomposition::{Decomposer, Decomposition};
pub use equalizer::ZfEqualizer;
pub use layer_mapping::{LayerDemapper, LayerMapper};
pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
pub use padding::{pad_count, Depadder, Padder};
pub use plan::LinkPlan;
pub use precoder::Precoder;
pub use statistics::{LinkStatistics, StatisticsCollector};
pub use symbol_mapping::{SymbolDemapper, SymbolMapper, QPSK_CONSTELLATION};
pub use types::{Complex, LayeredStreams, MimoError, MimoResult, SymbolIndex, SymbolSequence};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::channel_matrix::ChannelMatrix;
    pub use crate::combiner::Combiner;
    pub use crate::config::LinkConfig;
    pub use crate::decomposition::{Decomposer, Decomposition};
    pub use crate::equalizer::ZfEqualizer;
    pub use crate::layer_mapping::{LayerDemapper, LayerMapper};
    pub use crate::padding::{Depadder, Padder};
    pub use crate::precoder::Precoder;
    pub use crate::symbol_mapping::{SymbolDemapper, SymbolMapper};
    pub use crate::types::{Complex, LayeredStreams, MimoError, MimoResult};
}
