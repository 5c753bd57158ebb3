//! Property tests over the bootstrap statistics

use bootstrap::run_bootstrap_seeded;
use quickcheck_macros::quickcheck;

fn clamp_pnls(raw: Vec<i32>) -> Vec<f64> {
    // Bounded integer P&Ls keep sums exact and avoid float-edge noise
    raw.into_iter().map(|v| f64::from(v % 10_000)).collect()
}

#[quickcheck]
fn prop_net_profit_within_theoretical_range(raw: Vec<i32>, seed: u64) -> bool {
    let pnls = clamp_pnls(raw);
    let result = run_bootstrap_seeded(&pnls, 10_000.0, 200, seed);
    if pnls.is_empty() {
        return result.net_profits.is_empty();
    }

    // N draws from the series: net profit is bounded by N * min and N * max
    let n = pnls.len() as f64;
    let min = pnls.iter().copied().fold(f64::INFINITY, f64::min);
    let max = pnls.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    result
        .net_profits
        .iter()
        .all(|p| *p >= n * min - 1e-6 && *p <= n * max + 1e-6)
}

#[quickcheck]
fn prop_band_is_ordered_and_within_extremes(raw: Vec<i32>, seed: u64) -> bool {
    let pnls = clamp_pnls(raw);
    let result = run_bootstrap_seeded(&pnls, 10_000.0, 100, seed);
    if pnls.is_empty() {
        return true;
    }

    let lowest = result.net_profits[0];
    let highest = result.net_profits[result.net_profits.len() - 1];
    result.net_profit_2_5 <= result.net_profit_97_5
        && result.net_profit_2_5 >= lowest
        && result.net_profit_97_5 <= highest
}

#[quickcheck]
fn prop_seed_determinism(raw: Vec<i32>, seed: u64) -> bool {
    let pnls = clamp_pnls(raw);
    let a = run_bootstrap_seeded(&pnls, 5_000.0, 50, seed);
    let b = run_bootstrap_seeded(&pnls, 5_000.0, 50, seed);
    a.net_profits == b.net_profits && a.max_drawdowns == b.max_drawdowns
}
