//! Shared types for the betslip cart engine.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that cart, platform, and engine
//! modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Sport event
// ---------------------------------------------------------------------------

/// A sporting event as supplied by the odds feed.
///
/// The cart treats every field as opaque and read-only: events arrive
/// already resolved and are never mutated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SportEvent {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub sport: String,
    pub league: String,
    /// Scheduled kick-off / start time.
    pub starts_at: DateTime<Utc>,
}

impl fmt::Display for SportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vs {} ({}, {})",
            self.home_team, self.away_team, self.sport, self.league,
        )
    }
}

impl SportEvent {
    /// Helper to build a test event with sensible defaults.
    #[cfg(test)]
    pub fn sample(id: &str) -> Self {
        SportEvent {
            id: id.to_string(),
            home_team: "Boca Juniors".to_string(),
            away_team: "River Plate".to_string(),
            sport: "Football".to_string(),
            league: "Primera División".to_string(),
            starts_at: Utc::now() + chrono::Duration::days(2),
        }
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Bet-market type.
///
/// A closed enumeration: adding a market is a compile-time-checked change
/// because `label` matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketKind {
    MatchWinner,
    DoubleChance,
    OverUnder,
    BothTeamsScore,
    Handicap,
    CorrectScore,
}

impl MarketKind {
    /// All known market kinds (useful for iteration).
    pub const ALL: &'static [MarketKind] = &[
        MarketKind::MatchWinner,
        MarketKind::DoubleChance,
        MarketKind::OverUnder,
        MarketKind::BothTeamsScore,
        MarketKind::Handicap,
        MarketKind::CorrectScore,
    ];

    /// Human-readable label for display in the betslip UI.
    pub fn label(&self) -> &'static str {
        match self {
            MarketKind::MatchWinner => "Match winner",
            MarketKind::DoubleChance => "Double chance",
            MarketKind::OverUnder => "Over/Under",
            MarketKind::BothTeamsScore => "Both teams to score",
            MarketKind::Handicap => "Handicap",
            MarketKind::CorrectScore => "Correct score",
        }
    }
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Attempt to parse a string into a MarketKind (case-insensitive).
impl std::str::FromStr for MarketKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "match_winner" | "winner" | "1x2" => Ok(MarketKind::MatchWinner),
            "double_chance" => Ok(MarketKind::DoubleChance),
            "over_under" | "over/under" | "totals" => Ok(MarketKind::OverUnder),
            "both_teams_score" | "both_teams_to_score" | "btts" => {
                Ok(MarketKind::BothTeamsScore)
            }
            "handicap" | "spread" => Ok(MarketKind::Handicap),
            "correct_score" => Ok(MarketKind::CorrectScore),
            _ => Err(anyhow::anyhow!("Unknown market kind: {s}")),
        }
    }
}

/// Wagering mode for the whole cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetMode {
    /// Independently staked, independently resolved wagers.
    #[default]
    Simple,
    /// One combined wager over all legs; all legs must win.
    Multiple,
}

impl fmt::Display for BetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetMode::Simple => write!(f, "simple"),
            BetMode::Multiple => write!(f, "multiple"),
        }
    }
}

impl std::str::FromStr for BetMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" | "single" => Ok(BetMode::Simple),
            "multiple" | "combined" | "parlay" => Ok(BetMode::Multiple),
            _ => Err(anyhow::anyhow!("Unknown bet mode: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Slip & selection
// ---------------------------------------------------------------------------

/// One candidate wager in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slip {
    /// Assigned at insertion, stable for the slip's lifetime.
    pub id: Uuid,
    pub event: SportEvent,
    pub market: MarketKind,
    /// The user's chosen outcome for the market.
    pub prediction: String,
    /// Decimal odds multiplier, always > 1.0. Immutable once the slip
    /// exists: changed odds invalidate the slip rather than mutating it.
    pub odds: Decimal,
    /// Stake in simple mode. In multiple mode the stored value is unused;
    /// the effective per-leg stake is derived from the cart's shared total.
    pub stake: Decimal,
}

impl Slip {
    /// Potential payout of this slip as an independent single bet.
    pub fn potential_winnings(&self) -> Decimal {
        self.stake * self.odds
    }

    /// The identity of the underlying selection. Two slips with the same
    /// key are the same pick and may not coexist in the cart.
    pub fn selection_key(&self) -> (&str, MarketKind, &str) {
        (self.event.id.as_str(), self.market, self.prediction.as_str())
    }
}

impl fmt::Display for Slip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {}: {} @ {} (stake {})",
            self.event, self.market, self.prediction, self.odds, self.stake,
        )
    }
}

/// A market selection arriving from the UI, not yet in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    pub event: SportEvent,
    pub market: MarketKind,
    pub prediction: String,
    pub odds: Decimal,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {}: {} @ {}",
            self.event, self.market, self.prediction, self.odds,
        )
    }
}

// ---------------------------------------------------------------------------
// Placement types
// ---------------------------------------------------------------------------

/// Per-leg (or per-request) placement status reported by the sportsbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegStatus {
    Completed,
    Failed,
}

impl fmt::Display for LegStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegStatus::Completed => write!(f, "COMPLETED"),
            LegStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// One independent single-bet request (simple mode: one per slip).
#[derive(Debug, Clone, Serialize)]
pub struct BetRequest {
    pub slip_id: Uuid,
    pub event_id: String,
    pub market: MarketKind,
    pub prediction: String,
    pub odds: Decimal,
    pub stake: Decimal,
}

/// One leg of a combined bet.
#[derive(Debug, Clone, Serialize)]
pub struct ParlayLeg {
    pub slip_id: Uuid,
    pub event_id: String,
    pub market: MarketKind,
    pub prediction: String,
    pub odds: Decimal,
}

/// A combined-bet request covering every leg in the cart at once.
#[derive(Debug, Clone, Serialize)]
pub struct ParlayRequest {
    pub legs: Vec<ParlayLeg>,
    pub total_stake: Decimal,
}

/// Sportsbook acknowledgement of a single-bet request.
///
/// Transport failures surface as `Err` from the platform client; a
/// server-side rejection (stale odds, event started) arrives here as
/// `status == Failed` with a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetAck {
    pub status: LegStatus,
    pub ticket_id: Option<String>,
    pub message: Option<String>,
}

/// Per-leg acknowledgement inside a parlay response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegAck {
    pub event_id: String,
    pub status: LegStatus,
    pub message: Option<String>,
}

/// Sportsbook acknowledgement of a combined-bet request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParlayAck {
    pub status: LegStatus,
    pub ticket_id: Option<String>,
    pub legs: Vec<LegAck>,
    pub message: Option<String>,
}

impl ParlayAck {
    /// Legs the server rejected, if it reported per-leg results.
    pub fn failed_legs(&self) -> Vec<&LegAck> {
        self.legs
            .iter()
            .filter(|l| l.status == LegStatus::Failed)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the cart.
///
/// Input errors are recovered locally: the mutator rejects and the UI
/// reflects the corrected state. Nothing here crosses the UI boundary as
/// a panic.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("odds must be greater than 1.0, got {0}")]
    OddsTooLow(Decimal),

    #[error("selection is already in the betslip: {0}")]
    DuplicateSelection(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
