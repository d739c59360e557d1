//! Engine — the session facade over the cart and the submission workflow.
//!
//! `CartSession` is the contract exposed to UI consumers: slip views,
//! derived statistics, validation flags, and the mutators. It owns the
//! cart as explicit session-scoped state, constructed once per user
//! session and shared by reference with the presentation adapters.

pub mod coordinator;

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cart::stats::CartStatistics;
use crate::cart::validation::CartValidation;
use crate::cart::BetslipCart;
use crate::notify::{Notification, NotificationSink};
use crate::platform::BettingPlatform;
use crate::types::{BetMode, CartError, MarketKind, Selection, SportEvent};
use self::coordinator::{SubmissionCoordinator, SubmissionOutcome};

// ---------------------------------------------------------------------------
// Slip view
// ---------------------------------------------------------------------------

/// One slip as presented to UI consumers.
///
/// `stake` and `potential_winnings` reflect the current mode: in multiple
/// mode they show the derived per-leg share of the shared total.
#[derive(Debug, Clone, Serialize)]
pub struct SlipView {
    pub id: Uuid,
    pub event: SportEvent,
    pub market: MarketKind,
    pub market_label: &'static str,
    pub prediction: String,
    pub odds: Decimal,
    pub stake: Decimal,
    pub potential_winnings: Decimal,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Session-scoped cart state plus the submission coordinator.
///
/// All reads derive from the authoritative cart on every call; nothing is
/// cached across mutations. Mutators stay callable while a submission is
/// in flight.
pub struct CartSession {
    cart: RwLock<BetslipCart>,
    coordinator: SubmissionCoordinator,
    notifier: Arc<dyn NotificationSink>,
}

impl CartSession {
    pub fn new(
        platform: Arc<dyn BettingPlatform>,
        notifier: Arc<dyn NotificationSink>,
        submit_timeout: Duration,
    ) -> Self {
        Self {
            cart: RwLock::new(BetslipCart::new()),
            coordinator: SubmissionCoordinator::new(platform, notifier.clone(), submit_timeout),
            notifier,
        }
    }

    // -- Read side --------------------------------------------------------

    /// Slips in insertion order, with mode-aware stakes.
    pub async fn slips(&self) -> Vec<SlipView> {
        let cart = self.cart.read().await;
        let stakes = cart.effective_stakes();
        cart.slips()
            .iter()
            .zip(stakes)
            .map(|(slip, stake)| SlipView {
                id: slip.id,
                event: slip.event.clone(),
                market: slip.market,
                market_label: slip.market.label(),
                prediction: slip.prediction.clone(),
                odds: slip.odds,
                stake,
                potential_winnings: stake * slip.odds,
            })
            .collect()
    }

    pub async fn bet_mode(&self) -> BetMode {
        self.cart.read().await.mode()
    }

    pub async fn statistics(&self) -> CartStatistics {
        CartStatistics::compute(&*self.cart.read().await)
    }

    pub async fn validation(&self) -> CartValidation {
        CartValidation::evaluate(&*self.cart.read().await, self.coordinator.is_submitting())
    }

    pub fn is_submitting(&self) -> bool {
        self.coordinator.is_submitting()
    }

    // -- Mutators ---------------------------------------------------------

    /// Add a selection coming from the sports catalog UI.
    ///
    /// A rejected selection (stale odds, duplicate) is surfaced to the
    /// user as a warning notification; the error also returns to the
    /// caller for direct handling.
    pub async fn add_selection(&self, selection: Selection) -> Result<Uuid, CartError> {
        let result = self.cart.write().await.add(selection);
        if let Err(e) = &result {
            self.notifier.publish(Notification::warning(e.to_string()));
        }
        result
    }

    pub async fn set_slip_stake(&self, id: Uuid, amount: Decimal) {
        self.cart.write().await.set_stake(id, amount);
    }

    pub async fn remove_slip(&self, id: Uuid) -> bool {
        self.cart.write().await.remove(id)
    }

    pub async fn clear_cart(&self) {
        self.cart.write().await.clear();
    }

    pub async fn set_bet_mode(&self, mode: BetMode) -> bool {
        self.cart.write().await.set_mode(mode)
    }

    /// Place the current cart contents with the sportsbook.
    pub async fn submit_bets(&self) -> SubmissionOutcome {
        self.coordinator.submit(&self.cart).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
