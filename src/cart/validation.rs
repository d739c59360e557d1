//! Validation policy — submission-readiness flags derived from the cart.
//!
//! Checked by the UI to gate the submit action, and re-checked by the
//! submission coordinator at the execution boundary.

use rust_decimal::Decimal;
use serde::Serialize;

use super::BetslipCart;
use crate::types::BetMode;

/// Readiness flags for the current cart snapshot.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartValidation {
    /// True if any slip (simple mode) or the shared total (multiple mode)
    /// carries a stake of zero or less.
    pub has_unstaked_slips: bool,
    /// True iff the cart can be submitted right now.
    pub can_submit: bool,
}

impl CartValidation {
    pub fn evaluate(cart: &BetslipCart, submitting: bool) -> Self {
        let has_unstaked_slips = match cart.mode() {
            BetMode::Simple => cart.slips().iter().any(|s| s.stake <= Decimal::ZERO),
            BetMode::Multiple => cart.parlay_stake() <= Decimal::ZERO,
        };

        // A combined bet with a single leg is degenerate: it is just a
        // simple bet, so multiple mode requires at least two slips.
        let enough_legs = match cart.mode() {
            BetMode::Simple => !cart.is_empty(),
            BetMode::Multiple => cart.len() > 1,
        };

        let can_submit = enough_legs && !has_unstaked_slips && !submitting;

        CartValidation {
            has_unstaked_slips,
            can_submit,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
