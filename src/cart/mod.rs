//! Betslip cart — the ordered collection of slips and the wagering mode.
//!
//! Pure data plus invariant-preserving mutators. Every mutator is
//! synchronous, runs to completion, and bumps a generation counter so an
//! in-flight submission can detect that the store changed under it.

pub mod stats;
pub mod validation;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;
use uuid::Uuid;

use crate::types::{BetMode, CartError, Selection, Slip};

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

/// The user's in-progress wagers.
///
/// Invariants held for every reachable state:
/// - slip ids are pairwise distinct;
/// - every slip's odds are > 1.0;
/// - the mode is `Simple` whenever fewer than two slips are held.
///
/// In multiple mode the only stored stake is the shared `parlay_stake`;
/// per-leg stakes are derived on read via [`BetslipCart::effective_stakes`].
/// Nothing derived is ever written back, so repeated redistribution cannot
/// drift.
#[derive(Debug, Clone, Default)]
pub struct BetslipCart {
    slips: Vec<Slip>,
    mode: BetMode,
    /// Shared total stake for the combined bet (multiple mode only).
    parlay_stake: Decimal,
    /// Bumped on every mutation.
    generation: u64,
}

impl BetslipCart {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Read side --------------------------------------------------------

    /// Slips in insertion order.
    pub fn slips(&self) -> &[Slip] {
        &self.slips
    }

    pub fn len(&self) -> usize {
        self.slips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slips.is_empty()
    }

    pub fn mode(&self) -> BetMode {
        self.mode
    }

    /// The shared total stake of the combined bet. Meaningful in multiple
    /// mode only; retained across mode switches.
    pub fn parlay_stake(&self) -> Decimal {
        self.parlay_stake
    }

    /// Mutation counter. Two equal generations imply an unchanged cart.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Effective per-leg stakes, index-aligned with [`BetslipCart::slips`].
    ///
    /// Simple mode: the independently stored stakes. Multiple mode: the
    /// shared total split across legs — each leg gets the cent-floored
    /// even share and the first leg absorbs the remainder, so the split is
    /// deterministic and sums exactly to the stored total.
    pub fn effective_stakes(&self) -> Vec<Decimal> {
        match self.mode {
            BetMode::Simple => self.slips.iter().map(|s| s.stake).collect(),
            BetMode::Multiple => split_stake(self.parlay_stake, self.slips.len()),
        }
    }

    // -- Mutators ---------------------------------------------------------

    /// Append a selection as a new slip with a fresh id and zero stake.
    ///
    /// Rejects non-positive-edge odds and exact duplicates of a live
    /// selection. Rejection leaves the collection untouched; the caller
    /// surfaces the error to the user.
    pub fn add(&mut self, selection: Selection) -> Result<Uuid, CartError> {
        if selection.odds <= Decimal::ONE {
            return Err(CartError::OddsTooLow(selection.odds));
        }

        let duplicate = self.slips.iter().any(|s| {
            s.selection_key()
                == (
                    selection.event.id.as_str(),
                    selection.market,
                    selection.prediction.as_str(),
                )
        });
        if duplicate {
            return Err(CartError::DuplicateSelection(selection.to_string()));
        }

        let slip = Slip {
            id: Uuid::new_v4(),
            event: selection.event,
            market: selection.market,
            prediction: selection.prediction,
            odds: selection.odds,
            stake: Decimal::ZERO,
        };
        let id = slip.id;
        debug!(slip_id = %id, slip = %slip, "Slip added");
        self.slips.push(slip);
        self.bump();
        Ok(id)
    }

    /// Remove the slip with the given id. Idempotent: removing an absent
    /// id is a no-op. Dropping to fewer than two slips resets the mode to
    /// simple, where it is the only meaningful value.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.slips.len();
        self.slips.retain(|s| s.id != id);
        let removed = self.slips.len() < before;
        if removed {
            debug!(slip_id = %id, remaining = self.slips.len(), "Slip removed");
            if self.slips.len() <= 1 {
                self.mode = BetMode::Simple;
            }
            self.bump();
        }
        removed
    }

    /// Empty the cart and reset mode and shared stake.
    pub fn clear(&mut self) {
        debug!(discarded = self.slips.len(), "Cart cleared");
        self.slips.clear();
        self.mode = BetMode::Simple;
        self.parlay_stake = Decimal::ZERO;
        self.bump();
    }

    /// Switch the wagering mode. No-op unless the cart holds at least two
    /// slips; never deletes slips. Returns whether the mode changed.
    pub fn set_mode(&mut self, mode: BetMode) -> bool {
        if self.slips.len() <= 1 || self.mode == mode {
            return false;
        }
        debug!(from = %self.mode, to = %mode, "Bet mode switched");
        self.mode = mode;
        self.bump();
        true
    }

    /// Set a stake. The amount is clamped to be non-negative.
    ///
    /// Simple mode: sets the stake of exactly the addressed slip (no-op
    /// if the id is absent). Multiple mode: the operation is redefined to
    /// set the shared total stake of the combined bet, whichever slip the
    /// edit originated from.
    pub fn set_stake(&mut self, id: Uuid, amount: Decimal) {
        let amount = amount.max(Decimal::ZERO);
        match self.mode {
            BetMode::Simple => {
                if let Some(slip) = self.slips.iter_mut().find(|s| s.id == id) {
                    slip.stake = amount;
                    self.bump();
                } else {
                    debug!(slip_id = %id, "Stake update for unknown slip ignored");
                }
            }
            BetMode::Multiple => {
                self.parlay_stake = amount;
                self.bump();
            }
        }
    }

    fn bump(&mut self) {
        self.generation += 1;
    }
}

// ---------------------------------------------------------------------------
// Stake redistribution
// ---------------------------------------------------------------------------

/// Split a shared total across `legs` stakes.
///
/// Every leg receives the total divided by the leg count rounded down to
/// the cent; the first leg absorbs the remainder. The returned stakes sum
/// exactly to `total`.
pub fn split_stake(total: Decimal, legs: usize) -> Vec<Decimal> {
    if legs == 0 {
        return Vec::new();
    }
    let per = (total / Decimal::from(legs))
        .round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let first = total - per * Decimal::from(legs - 1);
    let mut stakes = vec![per; legs];
    stakes[0] = first;
    stakes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MarketKind, SportEvent};
    use rust_decimal_macros::dec;

    fn selection(event_id: &str, prediction: &str, odds: Decimal) -> Selection {
        Selection {
            event: SportEvent::sample(event_id),
            market: MarketKind::MatchWinner,
            prediction: prediction.to_string(),
            odds,
        }
    }

    fn cart_with_two() -> (BetslipCart, Uuid, Uuid) {
        let mut cart = BetslipCart::new();
        let a = cart.add(selection("ev-1", "Boca Juniors", dec!(1.5))).unwrap();
        let b = cart.add(selection("ev-2", "River Plate", dec!(2.0))).unwrap();
        (cart, a, b)
    }

    // -- add --

    #[test]
    fn test_add_appends_in_order() {
        let (cart, a, b) = cart_with_two();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.slips()[0].id, a);
        assert_eq!(cart.slips()[1].id, b);
        assert_ne!(a, b);
    }

    #[test]
    fn test_add_starts_with_zero_stake() {
        let (cart, _, _) = cart_with_two();
        assert!(cart.slips().iter().all(|s| s.stake == Decimal::ZERO));
    }

    #[test]
    fn test_add_rejects_odds_at_or_below_one() {
        let mut cart = BetslipCart::new();
        let err = cart
            .add(selection("ev-1", "Boca Juniors", dec!(1.0)))
            .unwrap_err();
        assert!(matches!(err, CartError::OddsTooLow(_)));

        let err = cart
            .add(selection("ev-1", "Boca Juniors", dec!(0.5)))
            .unwrap_err();
        assert!(matches!(err, CartError::OddsTooLow(_)));

        // Rejection is a no-op on the collection
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate_selection() {
        let mut cart = BetslipCart::new();
        cart.add(selection("ev-1", "Boca Juniors", dec!(1.5))).unwrap();
        // Same event+market+prediction, even at different odds
        let err = cart
            .add(selection("ev-1", "Boca Juniors", dec!(1.7)))
            .unwrap_err();
        assert!(matches!(err, CartError::DuplicateSelection(_)));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_add_allows_other_market_on_same_event() {
        let mut cart = BetslipCart::new();
        cart.add(selection("ev-1", "Boca Juniors", dec!(1.5))).unwrap();

        let mut other = selection("ev-1", "Over 2.5", dec!(1.9));
        other.market = MarketKind::OverUnder;
        assert!(cart.add(other).is_ok());
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_add_allows_other_prediction_on_same_market() {
        let mut cart = BetslipCart::new();
        cart.add(selection("ev-1", "Boca Juniors", dec!(1.5))).unwrap();
        assert!(cart.add(selection("ev-1", "River Plate", dec!(2.6))).is_ok());
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_ids_stay_distinct() {
        let mut cart = BetslipCart::new();
        let mut ids = std::collections::HashSet::new();
        for i in 0..10 {
            let id = cart
                .add(selection(&format!("ev-{i}"), "Home", dec!(1.5)))
                .unwrap();
            assert!(ids.insert(id));
        }
    }

    // -- remove --

    #[test]
    fn test_remove_is_idempotent() {
        let (mut cart, a, _) = cart_with_two();
        assert!(cart.remove(a));
        assert!(!cart.remove(a));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let (mut cart, _, _) = cart_with_two();
        let gen = cart.generation();
        assert!(!cart.remove(Uuid::new_v4()));
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.generation(), gen);
    }

    #[test]
    fn test_remove_below_two_resets_mode() {
        let (mut cart, a, _) = cart_with_two();
        assert!(cart.set_mode(BetMode::Multiple));
        cart.remove(a);
        assert_eq!(cart.mode(), BetMode::Simple);
    }

    // -- clear --

    #[test]
    fn test_clear_is_total() {
        let (mut cart, a, _) = cart_with_two();
        cart.set_mode(BetMode::Multiple);
        cart.set_stake(a, dec!(30));
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.mode(), BetMode::Simple);
        assert_eq!(cart.parlay_stake(), Decimal::ZERO);
    }

    // -- set_mode --

    #[test]
    fn test_set_mode_requires_two_slips() {
        let mut cart = BetslipCart::new();
        assert!(!cart.set_mode(BetMode::Multiple));
        assert_eq!(cart.mode(), BetMode::Simple);

        cart.add(selection("ev-1", "Home", dec!(1.5))).unwrap();
        assert!(!cart.set_mode(BetMode::Multiple));
        assert_eq!(cart.mode(), BetMode::Simple);

        cart.add(selection("ev-2", "Home", dec!(2.0))).unwrap();
        assert!(cart.set_mode(BetMode::Multiple));
        assert_eq!(cart.mode(), BetMode::Multiple);
    }

    #[test]
    fn test_set_mode_keeps_slips() {
        let (mut cart, _, _) = cart_with_two();
        cart.set_mode(BetMode::Multiple);
        cart.set_mode(BetMode::Simple);
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_set_mode_same_value_is_noop() {
        let (mut cart, _, _) = cart_with_two();
        let gen = cart.generation();
        assert!(!cart.set_mode(BetMode::Simple));
        assert_eq!(cart.generation(), gen);
    }

    // -- set_stake --

    #[test]
    fn test_set_stake_simple_targets_one_slip() {
        let (mut cart, a, b) = cart_with_two();
        cart.set_stake(a, dec!(10));
        assert_eq!(cart.slips()[0].stake, dec!(10));
        assert_eq!(cart.slips()[1].stake, Decimal::ZERO);

        cart.set_stake(b, dec!(20));
        assert_eq!(cart.slips()[1].stake, dec!(20));
    }

    #[test]
    fn test_set_stake_clamps_negative_to_zero() {
        let (mut cart, a, _) = cart_with_two();
        cart.set_stake(a, dec!(-5));
        assert_eq!(cart.slips()[0].stake, Decimal::ZERO);

        cart.set_mode(BetMode::Multiple);
        cart.set_stake(a, dec!(-30));
        assert_eq!(cart.parlay_stake(), Decimal::ZERO);
    }

    #[test]
    fn test_set_stake_unknown_id_is_noop() {
        let (mut cart, _, _) = cart_with_two();
        let gen = cart.generation();
        cart.set_stake(Uuid::new_v4(), dec!(10));
        assert!(cart.slips().iter().all(|s| s.stake == Decimal::ZERO));
        assert_eq!(cart.generation(), gen);
    }

    #[test]
    fn test_set_stake_multiple_sets_shared_total() {
        let (mut cart, a, b) = cart_with_two();
        cart.set_mode(BetMode::Multiple);
        // Whichever slip the edit originates from, it sets the shared total
        cart.set_stake(a, dec!(30));
        assert_eq!(cart.parlay_stake(), dec!(30));
        cart.set_stake(b, dec!(40));
        assert_eq!(cart.parlay_stake(), dec!(40));
        // Stored per-slip stakes stay untouched (single source of truth)
        assert!(cart.slips().iter().all(|s| s.stake == Decimal::ZERO));
    }

    // -- effective stakes --

    #[test]
    fn test_effective_stakes_simple_mode() {
        let (mut cart, a, b) = cart_with_two();
        cart.set_stake(a, dec!(10));
        cart.set_stake(b, dec!(20));
        assert_eq!(cart.effective_stakes(), vec![dec!(10), dec!(20)]);
    }

    #[test]
    fn test_effective_stakes_multiple_mode_even_split() {
        let (mut cart, a, _) = cart_with_two();
        cart.set_mode(BetMode::Multiple);
        cart.set_stake(a, dec!(30));
        assert_eq!(cart.effective_stakes(), vec![dec!(15), dec!(15)]);
    }

    #[test]
    fn test_effective_stakes_sum_is_preserved() {
        let mut cart = BetslipCart::new();
        for i in 0..3 {
            cart.add(selection(&format!("ev-{i}"), "Home", dec!(1.5)))
                .unwrap();
        }
        cart.set_mode(BetMode::Multiple);
        let id = cart.slips()[0].id;
        cart.set_stake(id, dec!(10));

        let stakes = cart.effective_stakes();
        assert_eq!(stakes.iter().copied().sum::<Decimal>(), dec!(10));
        // Deterministic: remainder lands on the first leg
        assert_eq!(stakes, vec![dec!(3.34), dec!(3.33), dec!(3.33)]);
    }

    // -- split_stake --

    #[test]
    fn test_split_stake_empty() {
        assert!(split_stake(dec!(10), 0).is_empty());
    }

    #[test]
    fn test_split_stake_single_leg_gets_all() {
        assert_eq!(split_stake(dec!(7.77), 1), vec![dec!(7.77)]);
    }

    #[test]
    fn test_split_stake_exact_division() {
        assert_eq!(split_stake(dec!(30), 2), vec![dec!(15), dec!(15)]);
    }

    #[test]
    fn test_split_stake_remainder_on_first_leg() {
        assert_eq!(
            split_stake(dec!(100), 3),
            vec![dec!(33.34), dec!(33.33), dec!(33.33)]
        );
    }

    #[test]
    fn test_split_stake_sum_preserved_for_awkward_totals() {
        for legs in 1..=7usize {
            let stakes = split_stake(dec!(12.34), legs);
            assert_eq!(stakes.len(), legs);
            assert_eq!(stakes.iter().copied().sum::<Decimal>(), dec!(12.34));
            assert!(stakes.iter().all(|s| *s >= Decimal::ZERO));
        }
    }

    // -- generation --

    #[test]
    fn test_generation_bumps_on_mutation() {
        let mut cart = BetslipCart::new();
        let g0 = cart.generation();
        let id = cart.add(selection("ev-1", "Home", dec!(1.5))).unwrap();
        assert!(cart.generation() > g0);

        let g1 = cart.generation();
        cart.set_stake(id, dec!(5));
        assert!(cart.generation() > g1);

        let g2 = cart.generation();
        cart.clear();
        assert!(cart.generation() > g2);
    }
}
