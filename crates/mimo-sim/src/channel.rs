//! Flat-fading MIMO channel and additive noise
//!
//! ## Channel Effects
//!
//! Each transmit block passes through
//!
//! ```text
//! y[rx][n] = sum_tx H[rx][tx] * x[tx][n] + noise[rx][n]
//! ```
//!
//! 1. **Channel matrix**: real gains drawn once per realization, uniform in
//!    `[-1, 1]` by default
//! 2. **Noise**: independent uniform draws for the real and imaginary part
//!    of every received sample
//!
//! ## Usage
//!
//! ```rust
//! use mimo_sim::channel::{rng_from_seed, ChannelModel, ChannelTransmitter, NoiseBounds};
//! use mimo_core::types::LayeredStreams;
//!
//! let mut rng = rng_from_seed(Some(42));
//! let h = ChannelModel::default().generate(4, 2, &mut rng).unwrap();
//! assert_eq!((h.nr(), h.nt()), (4, 2));
//!
//! let tx = ChannelTransmitter::new(h, NoiseBounds::new(-0.1, 0.1).unwrap());
//! let y = tx.transmit(&LayeredStreams::zeros(2, 16), &mut rng);
//! assert_eq!(y.num_streams(), 4);
//! ```

use mimo_core::channel_matrix::ChannelMatrix;
use mimo_core::config::LinkConfig;
use mimo_core::linalg;
use mimo_core::types::{Complex, LayeredStreams, MimoError, MimoResult};
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded RNG, or one seeded from OS entropy when `seed` is `None`.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Keep an explicit seed, or draw one from OS entropy.
///
/// Lets several simulators share one realization sequence even when the
/// caller gave no seed.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random)
}

/// Source of channel realizations.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelModel {
    /// Independent real gains, uniform in `[low, high]`
    Uniform { low: f64, high: f64 },
    /// The same matrix for every realization
    Fixed(ChannelMatrix),
}

impl Default for ChannelModel {
    fn default() -> Self {
        Self::Uniform {
            low: -1.0,
            high: 1.0,
        }
    }
}

impl ChannelModel {
    /// Draw an `nr × nt` channel.
    ///
    /// A fixed model must already have the requested shape.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        nr: usize,
        nt: usize,
        rng: &mut R,
    ) -> MimoResult<ChannelMatrix> {
        match self {
            ChannelModel::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low > high {
                    return Err(MimoError::InvalidConfig(format!(
                        "channel gain range [{}, {}] is empty",
                        low, high
                    )));
                }
                // Row-major draw order: H[0][0], H[0][1], ...
                let mut gains = DMatrix::zeros(nr, nt);
                for r in 0..nr {
                    for c in 0..nt {
                        gains[(r, c)] = rng.gen_range(*low..=*high);
                    }
                }
                ChannelMatrix::new(gains)
            }
            ChannelModel::Fixed(h) => {
                if h.nr() != nr || h.nt() != nt {
                    return Err(MimoError::dimension(format!(
                        "fixed channel is {}x{}, link needs {}x{}",
                        h.nr(),
                        h.nt(),
                        nr,
                        nt
                    )));
                }
                Ok(h.clone())
            }
        }
    }
}

/// Closed range for the real and imaginary noise draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseBounds {
    min: f64,
    max: f64,
}

impl NoiseBounds {
    pub fn new(min: f64, max: f64) -> MimoResult<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(MimoError::InvalidConfig(format!(
                "invalid noise bounds [{}, {}]",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    /// No noise.
    pub fn none() -> Self {
        Self { min: 0.0, max: 0.0 }
    }

    pub fn from_config(config: &LinkConfig) -> MimoResult<Self> {
        Self::new(config.noise_min, config.noise_max)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Degenerate range: every draw is `min`, and the RNG is left untouched.
    pub fn is_constant(&self) -> bool {
        self.min == self.max
    }

    /// One complex noise sample.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Complex {
        if self.is_constant() {
            return Complex::new(self.min, self.min);
        }
        let re = rng.gen_range(self.min..=self.max);
        let im = rng.gen_range(self.min..=self.max);
        Complex::new(re, im)
    }
}

/// One channel realization plus its noise model.
#[derive(Debug, Clone)]
pub struct ChannelTransmitter {
    channel: ChannelMatrix,
    noise: NoiseBounds,
}

impl ChannelTransmitter {
    pub fn new(channel: ChannelMatrix, noise: NoiseBounds) -> Self {
        Self { channel, noise }
    }

    pub fn channel(&self) -> &ChannelMatrix {
        &self.channel
    }

    pub fn noise(&self) -> NoiseBounds {
        self.noise
    }

    /// `H · x + n` for `[nt][N]` transmit samples, giving `[nr][N]`.
    ///
    /// Noise is drawn receive antenna by receive antenna, in time order.
    ///
    /// # Panics
    ///
    /// If `transmitted` does not carry one stream per transmit antenna.
    pub fn transmit<R: Rng + ?Sized>(
        &self,
        transmitted: &LayeredStreams,
        rng: &mut R,
    ) -> LayeredStreams {
        let mut received = linalg::apply(self.channel.as_matrix(), transmitted);
        for rx in 0..received.num_streams() {
            for sample in received.stream_mut(rx) {
                *sample += self.noise.sample(rng);
            }
        }
        received
    }
}
