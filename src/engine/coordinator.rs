//! Submission coordinator — the asynchronous bet-placement workflow.
//!
//! State machine: `Idle → Submitting → {Success, Failed}`, with the
//! terminal states looping back to `Idle`. The in-flight flag is exposed
//! to the UI as `is_submitting`. Every failure path resolves into a
//! notification plus a preserved cart; success empties the cart. Nothing
//! here raises across the UI boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cart::validation::CartValidation;
use crate::cart::BetslipCart;
use crate::notify::{Notification, NotificationSink};
use crate::platform::BettingPlatform;
use crate::types::{BetMode, BetRequest, LegStatus, ParlayLeg, ParlayRequest};

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// A leg the submission could not place.
#[derive(Debug, Clone)]
pub struct FailedLeg {
    pub description: String,
    pub reason: String,
}

/// Result of one submission attempt.
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    pub attempted: usize,
    pub placed: usize,
    pub failed: Vec<FailedLeg>,
    pub total_staked: Decimal,
}

/// How a `submit` call resolved.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// The validation gate refused; nothing was sent.
    NotReady,
    /// Another submission was in flight; this call was ignored.
    InFlight,
    /// Every leg was accepted; the cart has been emptied.
    Placed(SubmissionReport),
    /// Transport failure or rejected legs; the cart is preserved.
    Rejected(SubmissionReport),
}

// ---------------------------------------------------------------------------
// Submission plan (cart snapshot)
// ---------------------------------------------------------------------------

/// Everything the network phase needs, captured under the read lock so
/// the user can keep editing the live cart while the request is pending.
struct SubmissionPlan {
    mode: BetMode,
    generation: u64,
    slip_ids: Vec<Uuid>,
    /// Display strings, index-aligned with `slip_ids`.
    descriptions: Vec<String>,
    total_staked: Decimal,
    payload: Payload,
}

enum Payload {
    /// Simple mode: one request per slip.
    Singles(Vec<BetRequest>),
    /// Multiple mode: one combined request over all legs.
    Parlay(ParlayRequest),
}

impl SubmissionPlan {
    fn of(cart: &BetslipCart) -> Self {
        let slips = cart.slips();
        let stakes = cart.effective_stakes();

        let slip_ids = slips.iter().map(|s| s.id).collect();
        let descriptions = slips
            .iter()
            .map(|s| format!("{} | {}: {}", s.event, s.market, s.prediction))
            .collect();
        let total_staked = stakes.iter().copied().sum();

        let payload = match cart.mode() {
            BetMode::Simple => Payload::Singles(
                slips
                    .iter()
                    .zip(&stakes)
                    .map(|(s, stake)| BetRequest {
                        slip_id: s.id,
                        event_id: s.event.id.clone(),
                        market: s.market,
                        prediction: s.prediction.clone(),
                        odds: s.odds,
                        stake: *stake,
                    })
                    .collect(),
            ),
            BetMode::Multiple => Payload::Parlay(ParlayRequest {
                legs: slips
                    .iter()
                    .map(|s| ParlayLeg {
                        slip_id: s.id,
                        event_id: s.event.id.clone(),
                        market: s.market,
                        prediction: s.prediction.clone(),
                        odds: s.odds,
                    })
                    .collect(),
                total_stake: cart.parlay_stake(),
            }),
        };

        SubmissionPlan {
            mode: cart.mode(),
            generation: cart.generation(),
            slip_ids,
            descriptions,
            total_staked,
            payload,
        }
    }
}

/// Raw result of the network phase.
struct DispatchResult {
    placed: usize,
    failed: Vec<FailedLeg>,
    /// Failure with no per-leg breakdown (transport error, timeout, or a
    /// blanket server rejection).
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

pub struct SubmissionCoordinator {
    platform: Arc<dyn BettingPlatform>,
    notifier: Arc<dyn NotificationSink>,
    /// Upper bound on the whole network phase.
    timeout: Duration,
    submitting: AtomicBool,
}

impl SubmissionCoordinator {
    pub fn new(
        platform: Arc<dyn BettingPlatform>,
        notifier: Arc<dyn NotificationSink>,
        timeout: Duration,
    ) -> Self {
        Self {
            platform,
            notifier,
            timeout,
            submitting: AtomicBool::new(false),
        }
    }

    /// Whether a submission is currently in flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Drive one submission attempt for the current cart contents.
    ///
    /// Re-checks the validation gate even though the UI is expected to
    /// have disabled the action already. While a submission is pending a
    /// second call is ignored, so rapid double-clicks cannot place the
    /// same bets twice.
    pub async fn submit(&self, cart: &RwLock<BetslipCart>) -> SubmissionOutcome {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Submission already in flight, ignoring");
            return SubmissionOutcome::InFlight;
        }

        let outcome = self.run(cart).await;
        self.submitting.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run(&self, cart: &RwLock<BetslipCart>) -> SubmissionOutcome {
        let plan = {
            let cart = cart.read().await;
            if !CartValidation::evaluate(&cart, false).can_submit {
                debug!("Cart not ready, refusing to submit");
                return SubmissionOutcome::NotReady;
            }
            SubmissionPlan::of(&cart)
        };
        let attempted = plan.slip_ids.len();

        info!(
            platform = self.platform.name(),
            mode = %plan.mode,
            legs = attempted,
            total_staked = %plan.total_staked,
            "Submitting bets"
        );

        let result = match tokio::time::timeout(self.timeout, self.dispatch(&plan)).await {
            Ok(result) => result,
            Err(_) => DispatchResult {
                placed: 0,
                failed: Vec::new(),
                error: Some(format!(
                    "placement timed out after {}s",
                    self.timeout.as_secs()
                )),
            },
        };

        let report = SubmissionReport {
            attempted,
            placed: result.placed,
            failed: result.failed,
            total_staked: plan.total_staked,
        };

        if result.error.is_none() && report.failed.is_empty() && report.placed == attempted {
            self.conclude_success(cart, &plan, &report).await;
            SubmissionOutcome::Placed(report)
        } else {
            self.conclude_failure(&report, result.error.as_deref());
            SubmissionOutcome::Rejected(report)
        }
    }

    async fn dispatch(&self, plan: &SubmissionPlan) -> DispatchResult {
        match &plan.payload {
            Payload::Singles(requests) => {
                let acks =
                    join_all(requests.iter().map(|req| self.platform.place_single(req)))
                        .await;

                let mut placed = 0;
                let mut failed = Vec::new();
                for (ack, description) in acks.into_iter().zip(&plan.descriptions) {
                    match ack {
                        Ok(ack) if ack.status == LegStatus::Completed => placed += 1,
                        Ok(ack) => failed.push(FailedLeg {
                            description: description.clone(),
                            reason: ack
                                .message
                                .unwrap_or_else(|| "rejected by sportsbook".to_string()),
                        }),
                        Err(e) => failed.push(FailedLeg {
                            description: description.clone(),
                            reason: e.to_string(),
                        }),
                    }
                }
                DispatchResult {
                    placed,
                    failed,
                    error: None,
                }
            }
            Payload::Parlay(request) => match self.platform.place_parlay(request).await {
                Ok(ack)
                    if ack.status == LegStatus::Completed && ack.failed_legs().is_empty() =>
                {
                    DispatchResult {
                        placed: plan.slip_ids.len(),
                        failed: Vec::new(),
                        error: None,
                    }
                }
                Ok(ack) => {
                    let failed: Vec<FailedLeg> = ack
                        .legs
                        .iter()
                        .filter(|l| l.status == LegStatus::Failed)
                        .map(|l| {
                            let description = request
                                .legs
                                .iter()
                                .position(|leg| leg.event_id == l.event_id)
                                .map(|i| plan.descriptions[i].clone())
                                .unwrap_or_else(|| l.event_id.clone());
                            FailedLeg {
                                description,
                                reason: l
                                    .message
                                    .clone()
                                    .unwrap_or_else(|| "rejected by sportsbook".to_string()),
                            }
                        })
                        .collect();

                    // No per-leg breakdown means the server rejected the
                    // combined bet as a whole.
                    let error = if failed.is_empty() {
                        Some(
                            ack.message
                                .unwrap_or_else(|| "combined bet rejected".to_string()),
                        )
                    } else {
                        None
                    };
                    DispatchResult {
                        placed: 0,
                        failed,
                        error,
                    }
                }
                Err(e) => DispatchResult {
                    placed: 0,
                    failed: Vec::new(),
                    error: Some(e.to_string()),
                },
            },
        }
    }

    async fn conclude_success(
        &self,
        cart: &RwLock<BetslipCart>,
        plan: &SubmissionPlan,
        report: &SubmissionReport,
    ) {
        {
            let mut cart = cart.write().await;
            if cart.generation() == plan.generation {
                cart.clear();
            } else {
                // The user edited the cart mid-flight: drop exactly the
                // submitted slips and leave the rest alone.
                debug!("Cart changed during submission, removing placed slips only");
                for id in &plan.slip_ids {
                    cart.remove(*id);
                }
            }
        }

        let message = match plan.mode {
            BetMode::Simple => format!(
                "Placed {} bet(s), total stake {}",
                report.placed, report.total_staked
            ),
            BetMode::Multiple => format!(
                "Combined bet placed: {} legs, stake {}",
                report.attempted, report.total_staked
            ),
        };
        info!(
            placed = report.placed,
            total_staked = %report.total_staked,
            "Submission succeeded"
        );
        self.notifier.publish(Notification::success(message));
    }

    fn conclude_failure(&self, report: &SubmissionReport, error: Option<&str>) {
        // The cart is preserved untouched so the user can adjust stakes,
        // drop invalid legs, and retry.
        let message = if report.failed.is_empty() {
            format!("Bet placement failed: {}", error.unwrap_or("unknown error"))
        } else {
            let legs: Vec<String> = report
                .failed
                .iter()
                .map(|l| format!("{} ({})", l.description, l.reason))
                .collect();
            format!("Could not place bets. Failed legs: {}", legs.join("; "))
        };

        warn!(
            failed_legs = report.failed.len(),
            error = error.unwrap_or_default(),
            "Submission failed, betslip preserved"
        );
        self.notifier.publish(Notification::error(message));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
