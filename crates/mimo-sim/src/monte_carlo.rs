//! Monte Carlo evaluation over channel realizations
//!
//! Sends the same frame over `trials` independent channels drawn from one
//! seeded RNG stream. Realizations whose smallest singular value is too
//! small to equalize are skipped and counted; any other failure stops the
//! evaluation.

use mimo_core::config::LinkConfig;
use mimo_core::statistics::LinkStatistics;
use mimo_core::types::{MimoResult, SymbolIndex};
use serde::Serialize;
use tracing::{info, warn};

use crate::channel::ChannelModel;
use crate::simulator::LinkSimulator;

/// One completed trial.
#[derive(Debug, Clone, Serialize)]
pub struct TrialResult {
    pub trial: usize,
    pub statistics: LinkStatistics,
    pub condition_number: f64,
}

/// Results across all trials.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonteCarloReport {
    pub trials: Vec<TrialResult>,
    /// Counts merged over completed trials
    pub aggregate: LinkStatistics,
    /// Trials dropped for a degenerate channel
    pub skipped: usize,
    pub mean_error_percentage: f64,
    pub min_error_percentage: f64,
    pub max_error_percentage: f64,
}

impl MonteCarloReport {
    fn from_trials(trials: Vec<TrialResult>, skipped: usize) -> Self {
        let mut aggregate = LinkStatistics::default();
        for t in &trials {
            aggregate.merge(&t.statistics);
        }
        let pcts: Vec<f64> = trials
            .iter()
            .map(|t| t.statistics.error_percentage())
            .collect();
        let (mean, min, max) = if pcts.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                pcts.iter().sum::<f64>() / pcts.len() as f64,
                pcts.iter().copied().fold(f64::INFINITY, f64::min),
                pcts.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            )
        };
        Self {
            trials,
            aggregate,
            skipped,
            mean_error_percentage: mean,
            min_error_percentage: min,
            max_error_percentage: max,
        }
    }

    /// Trials that ran to completion.
    pub fn completed(&self) -> usize {
        self.trials.len()
    }
}

/// Repeated-trial driver around a [`LinkSimulator`].
#[derive(Debug)]
pub struct MonteCarlo {
    simulator: LinkSimulator,
    trials: usize,
}

impl MonteCarlo {
    pub fn new(config: LinkConfig) -> MimoResult<Self> {
        Self::with_channel_model(config, ChannelModel::default())
    }

    pub fn with_channel_model(config: LinkConfig, model: ChannelModel) -> MimoResult<Self> {
        let trials = config.trials;
        let simulator = LinkSimulator::with_channel_model(config, model)?;
        Ok(Self { simulator, trials })
    }

    /// Run every trial on `indices`.
    pub fn run(&mut self, indices: &[SymbolIndex]) -> MimoResult<MonteCarloReport> {
        let mut results = Vec::with_capacity(self.trials);
        let mut skipped = 0;

        for trial in 0..self.trials {
            match self.simulator.run(indices) {
                Ok(report) => results.push(TrialResult {
                    trial,
                    statistics: report.statistics,
                    condition_number: report.condition_number,
                }),
                Err(e) if e.is_degenerate() => {
                    warn!(trial, error = %e, "skipping degenerate channel realization");
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        let report = MonteCarloReport::from_trials(results, skipped);
        info!(
            trials = self.trials,
            skipped,
            mean_error_pct = report.mean_error_percentage,
            "monte carlo complete"
        );
        Ok(report)
    }
}
