//! # MIMO Link Simulation
//!
//! Random channel realizations, additive noise, and drivers that push whole
//! frames through the `mimo-core` stages.
//!
//! - [`channel`]: channel matrix generation and `H·x + n` transmission
//! - [`simulator`]: one frame over one channel, with optional stage trace
//! - [`monte_carlo`]: many frames over independent channels
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::config::LinkConfig;
//! use mimo_sim::LinkSimulator;
//!
//! let config = LinkConfig::new(4, 4, 0.0, 0.0).with_seed(7);
//! let mut sim = LinkSimulator::new(config).unwrap();
//! let report = sim.run(&[0, 1, 2, 3, 3, 2, 1, 0]).unwrap();
//! assert_eq!(report.statistics.symbol_errors, 0);
//! ```

pub mod channel;
pub mod monte_carlo;
pub mod simulator;

pub use channel::{resolve_seed, rng_from_seed, ChannelModel, ChannelTransmitter, NoiseBounds};
pub use monte_carlo::{MonteCarlo, MonteCarloReport, TrialResult};
pub use simulator::{LinkReport, LinkSimulator, LinkTrace};
