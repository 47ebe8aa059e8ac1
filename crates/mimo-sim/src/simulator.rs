//! End-to-end link simulator
//!
//! Runs one frame of symbol indices through the full transmit, channel and
//! receive chain:
//!
//! ```text
//! map → pad → layer map → precode → H·x + n → combine → equalize
//!     → layer demap → depad → demap → statistics
//! ```
//!
//! Every buffer size is fixed by a [`LinkPlan`] and every stage object is
//! built (including the equalizer, which rejects degenerate channels)
//! before the first symbol is processed.

use mimo_core::channel_matrix::ChannelMatrix;
use mimo_core::combiner::Combiner;
use mimo_core::config::LinkConfig;
use mimo_core::decomposition::{Decomposer, Decomposition};
use mimo_core::equalizer::ZfEqualizer;
use mimo_core::layer_mapping::{LayerDemapper, LayerMapper};
use mimo_core::padding::{Depadder, Padder};
use mimo_core::plan::LinkPlan;
use mimo_core::precoder::Precoder;
use mimo_core::statistics::{LinkStatistics, StatisticsCollector};
use mimo_core::symbol_mapping::{SymbolDemapper, SymbolMapper};
use mimo_core::types::{LayeredStreams, MimoError, MimoResult, SymbolIndex, SymbolSequence};
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::channel::{rng_from_seed, ChannelModel, ChannelTransmitter, NoiseBounds};

/// Every intermediate buffer of one run, in stage order, plus the SVD
/// factors it was precoded and combined with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkTrace {
    /// `U` by rows (`nr × k`).
    pub u: Vec<Vec<f64>>,
    /// `V` by rows (`nt × k`).
    pub v: Vec<Vec<f64>>,
    pub symbols: SymbolSequence,
    pub padded: SymbolSequence,
    pub layered: LayeredStreams,
    pub precoded: LayeredStreams,
    pub received: LayeredStreams,
    pub combined: LayeredStreams,
    pub equalized: LayeredStreams,
    pub delayered: SymbolSequence,
    pub depadded: SymbolSequence,
}

/// Outcome of one frame.
#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    pub plan: LinkPlan,
    pub channel: Vec<Vec<f64>>,
    pub singular_values: Vec<f64>,
    pub condition_number: f64,
    pub statistics: LinkStatistics,
    #[serde(skip)]
    pub recovered: Vec<SymbolIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<LinkTrace>,
}

/// Single-link simulator.
///
/// Holds one RNG for both channel draws and noise, so consecutive runs see
/// independent realizations while a fixed seed replays the whole sequence.
#[derive(Debug)]
pub struct LinkSimulator {
    config: LinkConfig,
    noise: NoiseBounds,
    model: ChannelModel,
    decomposer: Decomposer,
    rng: StdRng,
    trace: bool,
}

impl LinkSimulator {
    /// Validate `config` and build a simulator with the default channel model.
    pub fn new(config: LinkConfig) -> MimoResult<Self> {
        Self::with_channel_model(config, ChannelModel::default())
    }

    pub fn with_channel_model(config: LinkConfig, model: ChannelModel) -> MimoResult<Self> {
        config.validate()?;
        let noise = NoiseBounds::from_config(&config)?;
        let rng = rng_from_seed(config.seed);
        Ok(Self {
            config,
            noise,
            model,
            decomposer: Decomposer::default(),
            rng,
            trace: false,
        })
    }

    /// Keep every intermediate buffer in the report.
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Draw a channel realization and run one frame over it.
    ///
    /// The frame is checked before the draw, so a rejected frame leaves the
    /// RNG where it was.
    pub fn run(&mut self, indices: &[SymbolIndex]) -> MimoResult<LinkReport> {
        LinkPlan::new(&self.config, indices.len())?;
        SymbolMapper.check(indices)?;
        let channel = self
            .model
            .generate(self.config.nr, self.config.nt, &mut self.rng)?;
        self.run_with_channel(indices, &channel)
    }

    /// Run one frame over an explicit channel.
    pub fn run_with_channel(
        &mut self,
        indices: &[SymbolIndex],
        channel: &ChannelMatrix,
    ) -> MimoResult<LinkReport> {
        self.check_channel(channel)?;
        let decomposition = self.decomposer.decompose(channel)?;
        self.run_with_decomposition(indices, channel, &decomposition)
    }

    /// Run one frame over an explicit channel and decomposition.
    pub fn run_with_decomposition(
        &mut self,
        indices: &[SymbolIndex],
        channel: &ChannelMatrix,
        decomposition: &Decomposition,
    ) -> MimoResult<LinkReport> {
        let span = info_span!("link", nr = self.config.nr, nt = self.config.nt);
        let _enter = span.enter();

        self.check_channel(channel)?;
        let plan = LinkPlan::new(&self.config, indices.len())?;
        if decomposition.rows() != plan.nr
            || decomposition.cols() != plan.nt
            || decomposition.num_streams() != plan.num_streams
        {
            return Err(MimoError::dimension(format!(
                "decomposition of a {}x{} matrix with {} streams does not fit a {}x{} link with {}",
                decomposition.rows(),
                decomposition.cols(),
                decomposition.num_streams(),
                plan.nr,
                plan.nt,
                plan.num_streams
            )));
        }

        // Stage setup; a degenerate channel fails here.
        let layer_mapper = LayerMapper::new(plan.num_streams)?;
        let precoder = Precoder::new(decomposition);
        let transmitter = ChannelTransmitter::new(channel.clone(), self.noise);
        let combiner = Combiner::new(decomposition);
        let equalizer = ZfEqualizer::new(decomposition.singular_values())?;
        debug!(
            source_len = plan.source_len,
            antenna_pad = plan.antenna_pad,
            alignment_pad = plan.alignment_pad,
            symbols_per_stream = plan.symbols_per_stream,
            "frame planned"
        );

        let symbols = SymbolMapper.map(indices)?;
        debug!(stage = "map", len = symbols.len());

        let padded = Padder::new(plan.total_pad()).pad(&symbols);
        debug!(stage = "pad", len = padded.len());

        let layered = layer_mapper.map(&padded)?;
        debug!(stage = "layer_map", streams = layered.num_streams(), len = layered.stream_len());

        let precoded = precoder.precode(&layered);
        debug!(stage = "precode", streams = precoded.num_streams(), len = precoded.stream_len());

        let received = transmitter.transmit(&precoded, &mut self.rng);
        debug!(stage = "channel", streams = received.num_streams(), len = received.stream_len());

        let combined = combiner.combine(&received);
        debug!(stage = "combine", streams = combined.num_streams(), len = combined.stream_len());

        let equalized = equalizer.equalize(&combined);
        debug!(stage = "equalize", streams = equalized.num_streams(), len = equalized.stream_len());

        let delayered = LayerDemapper.demap(&equalized);
        debug!(stage = "layer_demap", len = delayered.len());

        let depadded = Depadder::new(plan.total_pad()).depad(&delayered)?;
        debug!(stage = "depad", len = depadded.len());

        let recovered = SymbolDemapper.demap(&depadded);
        let statistics = StatisticsCollector::compare(indices, &recovered)?;
        info!(
            symbols = statistics.total_symbols,
            errors = statistics.symbol_errors,
            error_pct = statistics.error_percentage(),
            "link run complete"
        );

        let trace = self.trace.then(|| LinkTrace {
            u: matrix_rows(decomposition.u()),
            v: matrix_rows(&decomposition.v()),
            symbols,
            padded,
            layered,
            precoded,
            received,
            combined,
            equalized,
            delayered,
            depadded,
        });

        Ok(LinkReport {
            plan,
            channel: channel.to_rows(),
            singular_values: decomposition.singular_values().to_vec(),
            condition_number: decomposition.condition_number(),
            statistics,
            recovered,
            trace,
        })
    }

    fn check_channel(&self, channel: &ChannelMatrix) -> MimoResult<()> {
        if channel.nr() != self.config.nr || channel.nt() != self.config.nt {
            return Err(MimoError::dimension(format!(
                "channel is {}x{} but the link is configured as {}x{}",
                channel.nr(),
                channel.nt(),
                self.config.nr,
                self.config.nt
            )));
        }
        Ok(())
    }
}

fn matrix_rows(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    m.row_iter().map(|row| row.iter().copied().collect()).collect()
}
