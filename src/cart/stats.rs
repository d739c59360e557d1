//! Aggregation engine — derived statistics over the cart.
//!
//! Stakes compose additively across independent simple bets; odds compose
//! multiplicatively across the legs of a combined bet. Both families are
//! computed unconditionally on every read so a mode toggle can never
//! observe stale numbers.

use rust_decimal::Decimal;
use serde::Serialize;

use super::BetslipCart;

/// Statistics derived from a `(slips, mode)` snapshot.
///
/// Never cached: recompute from the authoritative cart on each read.
#[derive(Debug, Clone, Serialize)]
pub struct CartStatistics {
    pub slip_count: usize,
    /// Sum of effective stakes. In multiple mode this equals the shared
    /// total exactly, because the per-leg split is sum-preserving.
    pub total_staked: Decimal,
    /// Product of all odds. Empty product is 1; a single slip yields its
    /// own odds.
    pub combined_odds: Decimal,
    /// Arithmetic mean of odds; 0 for an empty cart.
    pub average_odds: Decimal,
    /// Σ effective_stake × odds — the payout if every slip were placed as
    /// an independent single bet. Computed in both modes for display
    /// consistency.
    pub potential_single_winnings: Decimal,
    /// total_staked × combined_odds — the payout of the combined bet.
    pub potential_parlay_winnings: Decimal,
}

impl CartStatistics {
    pub fn compute(cart: &BetslipCart) -> Self {
        let slips = cart.slips();
        let stakes = cart.effective_stakes();

        let total_staked: Decimal = stakes.iter().copied().sum();
        let combined_odds = slips
            .iter()
            .fold(Decimal::ONE, |acc, slip| acc * slip.odds);
        let odds_sum: Decimal = slips.iter().map(|s| s.odds).sum();
        let average_odds = if slips.is_empty() {
            Decimal::ZERO
        } else {
            odds_sum / Decimal::from(slips.len())
        };
        let potential_single_winnings = slips
            .iter()
            .zip(&stakes)
            .map(|(slip, stake)| *stake * slip.odds)
            .sum();
        let potential_parlay_winnings = total_staked * combined_odds;

        CartStatistics {
            slip_count: slips.len(),
            total_staked,
            combined_odds,
            average_odds,
            potential_single_winnings,
            potential_parlay_winnings,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
