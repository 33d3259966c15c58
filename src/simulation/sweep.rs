//! Parallel SNR sweeps and Monte Carlo runs
//!
//! Trials run on the rayon pool. Each trial owns a `StdRng` seeded from the
//! configuration seed, the sweep-point index and the trial index, so results
//! do not depend on thread count or scheduling.

use bitvec::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use snafu::ensure;
use tracing::{debug, info};

use super::{InvalidConfigSnafu, LinkConfig, LinkReport, LinkSimulator, SimulationError};
use crate::util::bitvec_utils::random_bits;

/// Aggregate statistics at one operating point
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    /// Swept value, in the unit of the configured SNR setting
    pub snr: f64,
    pub snr_db: f64,
    pub eb_n0_db: f64,
    pub trials: usize,
    pub mean_ber: f64,
    pub std_ber: f64,
    pub mean_bler: f64,
    pub std_bler: f64,
    /// Mean BER of the coded bits before decoding
    pub mean_channel_ber: f64,
    /// Uncoded closed-form BER at the same Eb/N0
    pub theoretical_ber: f64,
}

/// Seed for trial `trial` at sweep point `point`
fn trial_seed(base: u64, point: usize, trial: usize) -> u64 {
    base.wrapping_add((point as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(trial as u64)
}

/// Population mean and standard deviation
fn mean_std(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = values.clone().count();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    let var = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
    (mean, var.sqrt())
}

fn summarize(sim: &LinkSimulator, snr: f64, reports: &[LinkReport]) -> SweepPoint {
    let (mean_ber, std_ber) = mean_std(reports.iter().map(|r| r.ber));
    let (mean_bler, std_bler) = mean_std(reports.iter().map(|r| r.bler));
    let (mean_channel_ber, _) = mean_std(reports.iter().map(|r| r.channel_ber));
    SweepPoint {
        snr,
        snr_db: sim.snr_db(),
        eb_n0_db: sim.eb_n0_db(),
        trials: reports.len(),
        mean_ber,
        std_ber,
        mean_bler,
        std_bler,
        mean_channel_ber,
        theoretical_ber: reports.first().map_or(0.0, |r| r.theoretical_ber),
    }
}

/// Run `trials` transmissions of `data` at each value in `snr_points`
///
/// Values are read in the unit of `config.snr`: symbol SNR for
/// [`SnrSetting::SnrDb`](super::SnrSetting::SnrDb), Eb/N0 otherwise.
pub fn run_snr_sweep(
    config: &LinkConfig,
    snr_points: &[f64],
    data: &BitSlice<u8, Msb0>,
    trials: usize,
) -> Result<Vec<SweepPoint>, SimulationError> {
    ensure!(
        trials > 0,
        InvalidConfigSnafu {
            reason: "a sweep needs at least one trial",
        }
    );
    info!(points = snr_points.len(), trials, bits = data.len(), "starting SNR sweep");

    let mut results = Vec::with_capacity(snr_points.len());
    for (point, &snr) in snr_points.iter().enumerate() {
        let sim = LinkSimulator::new(LinkConfig {
            snr: config.snr.with_value(snr),
            ..config.clone()
        })?;

        let reports: Vec<LinkReport> = (0..trials)
            .into_par_iter()
            .map(|trial| {
                let mut rng = StdRng::seed_from_u64(trial_seed(config.seed, point, trial));
                sim.run(data, &mut rng)
            })
            .collect();

        let summary = summarize(&sim, snr, &reports);
        debug!(snr, mean_ber = summary.mean_ber, mean_bler = summary.mean_bler, "sweep point done");
        results.push(summary);
    }
    Ok(results)
}

/// Run `trials` transmissions of fresh random payloads at the configured SNR
pub fn run_monte_carlo(
    config: &LinkConfig,
    trials: usize,
    bits_per_trial: usize,
) -> Result<SweepPoint, SimulationError> {
    ensure!(
        trials > 0,
        InvalidConfigSnafu {
            reason: "Monte Carlo needs at least one trial",
        }
    );
    let sim = LinkSimulator::new(config.clone())?;
    info!(trials, bits_per_trial, snr_db = sim.snr_db(), "starting Monte Carlo run");

    let reports: Vec<LinkReport> = (0..trials)
        .into_par_iter()
        .map(|trial| {
            let mut rng = StdRng::seed_from_u64(trial_seed(config.seed, 0, trial));
            let payload = random_bits(bits_per_trial, &mut rng);
            sim.run(&payload, &mut rng)
        })
        .collect();

    Ok(summarize(&sim, config.snr.value(), &reports))
}
