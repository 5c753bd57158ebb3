//! Monte-Carlo bootstrap resampling over trade P&L series
//!
//! Resamples a realized per-trade P&L series with replacement to estimate
//! the sampling distribution of net profit and maximum drawdown, and
//! reports the 2.5% / 97.5% percentile band of each. Iterations run in
//! parallel; a caller-supplied seed makes the whole run reproducible.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Percentile band and raw per-iteration statistics from one bootstrap run.
///
/// The raw vectors are sorted ascending; their length equals the number
/// of iterations. Drawdowns are percentages of peak equity in `[0, 100]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapResult {
    /// 2.5th percentile of resampled net profit
    pub net_profit_2_5: f64,
    /// 97.5th percentile of resampled net profit
    pub net_profit_97_5: f64,
    /// 2.5th percentile of resampled max drawdown (percent)
    pub max_dd_2_5: f64,
    /// 97.5th percentile of resampled max drawdown (percent)
    pub max_dd_97_5: f64,
    /// All resampled net profits, sorted ascending
    pub net_profits: Vec<f64>,
    /// All resampled max drawdowns, sorted ascending (percent)
    pub max_drawdowns: Vec<f64>,
}

impl BootstrapResult {
    fn zero() -> Self {
        Self {
            net_profit_2_5: 0.0,
            net_profit_97_5: 0.0,
            max_dd_2_5: 0.0,
            max_dd_97_5: 0.0,
            net_profits: Vec::new(),
            max_drawdowns: Vec::new(),
        }
    }
}

/// Bootstrap with a seed drawn from OS entropy.
///
/// Statistically identical to [`run_bootstrap_seeded`]; use that variant
/// when the run must be reproducible.
#[must_use]
pub fn run_bootstrap(pnls: &[f64], initial_equity: f64, iterations: usize) -> BootstrapResult {
    run_bootstrap_seeded(pnls, initial_equity, iterations, rand::random())
}

/// Bootstrap with an explicit seed.
///
/// Each iteration derives its own generator from `seed` and the iteration
/// index, so results are identical for a given `(pnls, initial_equity,
/// iterations, seed)` regardless of how the work is split across threads.
///
/// An empty P&L series or zero iterations yields an all-zero result.
#[must_use]
pub fn run_bootstrap_seeded(
    pnls: &[f64],
    initial_equity: f64,
    iterations: usize,
    seed: u64,
) -> BootstrapResult {
    if pnls.is_empty() || iterations == 0 {
        debug!(
            trades = pnls.len(),
            iterations, "degenerate bootstrap input, returning zeros"
        );
        return BootstrapResult::zero();
    }

    let (mut net_profits, mut max_drawdowns): (Vec<f64>, Vec<f64>) = (0..iterations as u64)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i));
            resample_once(pnls, initial_equity, &mut rng)
        })
        .unzip();

    // NaN-free by construction: finite inputs only produce finite sums
    net_profits.sort_unstable_by(f64::total_cmp);
    max_drawdowns.sort_unstable_by(f64::total_cmp);

    let lo = percentile_index(iterations, 0.025);
    let hi = percentile_index(iterations, 0.975);
    let result = BootstrapResult {
        net_profit_2_5: net_profits[lo],
        net_profit_97_5: net_profits[hi],
        max_dd_2_5: max_drawdowns[lo],
        max_dd_97_5: max_drawdowns[hi],
        net_profits,
        max_drawdowns,
    };

    info!(
        trades = pnls.len(),
        iterations,
        net_profit_2_5 = result.net_profit_2_5,
        net_profit_97_5 = result.net_profit_97_5,
        max_dd_97_5 = result.max_dd_97_5,
        "bootstrap complete"
    );
    result
}

/// One resampled path: net profit and max drawdown percent.
fn resample_once(pnls: &[f64], initial_equity: f64, rng: &mut StdRng) -> (f64, f64) {
    let mut equity = initial_equity;
    let mut peak = initial_equity;
    let mut max_dd = 0.0f64;
    let mut net_profit = 0.0f64;

    for _ in 0..pnls.len() {
        let pnl = pnls[rng.gen_range(0..pnls.len())];
        net_profit += pnl;
        equity += pnl;
        if equity > peak {
            peak = equity;
        }
        if peak > 0.0 {
            let dd = (peak - equity) / peak * 100.0;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    (net_profit, max_dd)
}

// floor(n * q), clamped into bounds so the extremes stay addressable
// even for tiny iteration counts.
fn percentile_index(n: usize, q: f64) -> usize {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let idx = (n as f64 * q).floor() as usize;
    idx.min(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_inputs_yield_zeros() {
        for result in [
            run_bootstrap_seeded(&[], 10_000.0, 100, 7),
            run_bootstrap_seeded(&[1.0, -1.0], 10_000.0, 0, 7),
        ] {
            assert_eq!(result.net_profit_2_5, 0.0);
            assert_eq!(result.net_profit_97_5, 0.0);
            assert_eq!(result.max_dd_2_5, 0.0);
            assert_eq!(result.max_dd_97_5, 0.0);
            assert!(result.net_profits.is_empty());
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let pnls = [120.0, -40.0, 85.0, -60.0, 200.0, -15.0];
        let a = run_bootstrap_seeded(&pnls, 10_000.0, 500, 42);
        let b = run_bootstrap_seeded(&pnls, 10_000.0, 500, 42);
        assert_eq!(a.net_profits, b.net_profits);
        assert_eq!(a.max_drawdowns, b.max_drawdowns);
    }

    #[test]
    fn test_different_seeds_differ() {
        let pnls = [120.0, -40.0, 85.0, -60.0, 200.0, -15.0];
        let a = run_bootstrap_seeded(&pnls, 10_000.0, 500, 1);
        let b = run_bootstrap_seeded(&pnls, 10_000.0, 500, 2);
        assert_ne!(a.net_profits, b.net_profits);
    }

    #[test]
    fn test_band_ordering_and_sorted_output() {
        let pnls = [100.0, -50.0, 100.0, -50.0];
        let result = run_bootstrap_seeded(&pnls, 10_000.0, 1_000, 9);

        assert!(result.net_profit_2_5 <= result.net_profit_97_5);
        assert!(result.max_dd_2_5 <= result.max_dd_97_5);
        assert!(result.net_profits.windows(2).all(|w| w[0] <= w[1]));
        assert!(result.max_drawdowns.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(result.net_profits.len(), 1_000);
    }

    #[test]
    fn test_symmetric_pnls_bracket_zero() {
        // ±100 / ±50 in equal measure: the band straddles zero
        let pnls = [100.0, -50.0, 100.0, -50.0];
        let result = run_bootstrap_seeded(&pnls, 10_000.0, 2_000, 3);
        assert!(result.net_profit_2_5 <= 0.0);
        assert!(result.net_profit_97_5 >= 0.0);
    }

    #[test]
    fn test_drawdowns_are_valid_percentages() {
        let pnls = [300.0, -500.0, 80.0, -120.0, 40.0];
        let result = run_bootstrap_seeded(&pnls, 10_000.0, 1_000, 11);
        for dd in &result.max_drawdowns {
            assert!((0.0..=100.0).contains(dd), "drawdown {dd} out of range");
        }
    }

    #[test]
    fn test_all_winning_trades_have_no_drawdown() {
        let pnls = [10.0, 25.0, 5.0];
        let result = run_bootstrap_seeded(&pnls, 1_000.0, 200, 5);
        assert_eq!(result.max_dd_97_5, 0.0);
        assert!(result.net_profit_2_5 > 0.0);
    }

    #[test]
    fn test_single_iteration_band_collapses() {
        let pnls = [10.0, -5.0];
        let result = run_bootstrap_seeded(&pnls, 1_000.0, 1, 13);
        assert_eq!(result.net_profit_2_5, result.net_profit_97_5);
        assert_eq!(result.net_profits.len(), 1);
    }

    #[test]
    fn test_unseeded_variant_produces_full_output() {
        let pnls = [10.0, -5.0, 3.0];
        let result = run_bootstrap(&pnls, 1_000.0, 50);
        assert_eq!(result.net_profits.len(), 50);
        assert!(result.net_profit_2_5 <= result.net_profit_97_5);
    }
}
