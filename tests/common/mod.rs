//! Mock sportsbook and notification collector for integration testing.
//!
//! Deterministic, in-memory, no external dependencies: requests are
//! recorded, errors are injectable, and individual events can be marked
//! as rejected server-side (stale odds).

// Each test crate compiles this module separately and uses a subset of it.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex};

use betslip::notify::{Notification, NotificationSink};
use betslip::platform::BettingPlatform;
use betslip::types::{
    BetAck, BetRequest, LegAck, LegStatus, MarketKind, ParlayAck, ParlayRequest, Selection,
    SportEvent,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn sample_event(id: &str, home: &str, away: &str) -> SportEvent {
    SportEvent {
        id: id.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        sport: "Football".to_string(),
        league: "Primera División".to_string(),
        starts_at: Utc::now() + Duration::days(2),
    }
}

pub fn match_winner(event_id: &str, prediction: &str, odds: rust_decimal::Decimal) -> Selection {
    Selection {
        event: sample_event(event_id, "Boca Juniors", "River Plate"),
        market: MarketKind::MatchWinner,
        prediction: prediction.to_string(),
        odds,
    }
}

// ---------------------------------------------------------------------------
// Mock sportsbook
// ---------------------------------------------------------------------------

/// A mock bet-placement API with fully controllable behaviour.
pub struct MockSportsbook {
    name: String,
    singles: Arc<Mutex<Vec<BetRequest>>>,
    parlays: Arc<Mutex<Vec<ParlayRequest>>>,
    /// If set, all operations fail at the transport level with this message.
    force_error: Arc<Mutex<Option<String>>>,
    /// Event ids the server rejects with "odds changed".
    rejected_events: Arc<Mutex<Vec<String>>>,
}

impl MockSportsbook {
    pub fn new() -> Self {
        Self {
            name: "mock-sportsbook".to_string(),
            singles: Arc::new(Mutex::new(Vec::new())),
            parlays: Arc::new(Mutex::new(Vec::new())),
            force_error: Arc::new(Mutex::new(None)),
            rejected_events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Force all subsequent operations to fail at the transport level.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Clear any forced error.
    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    /// Mark an event as rejected server-side (stale odds).
    pub fn reject_event(&self, event_id: &str) {
        self.rejected_events.lock().unwrap().push(event_id.to_string());
    }

    /// Accept the event again.
    pub fn accept_event(&self, event_id: &str) {
        self.rejected_events.lock().unwrap().retain(|e| e != event_id);
    }

    /// All single-bet requests received so far.
    pub fn single_requests(&self) -> Vec<BetRequest> {
        self.singles.lock().unwrap().clone()
    }

    /// All parlay requests received so far.
    pub fn parlay_requests(&self) -> Vec<ParlayRequest> {
        self.parlays.lock().unwrap().clone()
    }

    fn is_rejected(&self, event_id: &str) -> bool {
        self.rejected_events
            .lock()
            .unwrap()
            .iter()
            .any(|e| e == event_id)
    }
}

#[async_trait]
impl BettingPlatform for MockSportsbook {
    async fn place_single(&self, request: &BetRequest) -> Result<BetAck> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }

        self.singles.lock().unwrap().push(request.clone());

        if self.is_rejected(&request.event_id) {
            return Ok(BetAck {
                status: LegStatus::Failed,
                ticket_id: None,
                message: Some("odds changed".to_string()),
            });
        }

        Ok(BetAck {
            status: LegStatus::Completed,
            ticket_id: Some(format!("MOCK-{}", request.event_id)),
            message: None,
        })
    }

    async fn place_parlay(&self, request: &ParlayRequest) -> Result<ParlayAck> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }

        self.parlays.lock().unwrap().push(request.clone());

        let legs: Vec<LegAck> = request
            .legs
            .iter()
            .map(|leg| {
                let rejected = self.is_rejected(&leg.event_id);
                LegAck {
                    event_id: leg.event_id.clone(),
                    status: if rejected {
                        LegStatus::Failed
                    } else {
                        LegStatus::Completed
                    },
                    message: rejected.then(|| "odds changed".to_string()),
                }
            })
            .collect();

        let any_failed = legs.iter().any(|l| l.status == LegStatus::Failed);
        Ok(ParlayAck {
            status: if any_failed {
                LegStatus::Failed
            } else {
                LegStatus::Completed
            },
            ticket_id: (!any_failed).then(|| "MOCK-PARLAY".to_string()),
            legs,
            message: any_failed.then(|| "one or more legs rejected".to_string()),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Notification collector
// ---------------------------------------------------------------------------

/// Sink that records every published notification for assertions.
#[derive(Default)]
pub struct CollectingNotifier {
    notes: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> Vec<Notification> {
        self.notes.lock().unwrap().clone()
    }
}

impl NotificationSink for CollectingNotifier {
    fn publish(&self, note: Notification) {
        self.notes.lock().unwrap().push(note);
    }
}
