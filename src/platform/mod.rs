//! Sportsbook integration.
//!
//! Defines the `BettingPlatform` trait — the boundary to the external
//! bet-placement API — and provides the HTTP client implementation.

pub mod sportsbook;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{BetAck, BetRequest, ParlayAck, ParlayRequest};

/// Abstraction over the bet-placement API.
///
/// Transport failures (network error, timeout, malformed response) are
/// `Err`. A bet the server refuses — stale odds, event already started —
/// is a successful exchange carrying `LegStatus::Failed` in the payload.
#[async_trait]
pub trait BettingPlatform: Send + Sync {
    /// Place one independent single bet.
    async fn place_single(&self, request: &BetRequest) -> Result<BetAck>;

    /// Place one combined bet over all legs at once.
    async fn place_parlay(&self, request: &ParlayRequest) -> Result<ParlayAck>;

    /// Platform name for logging and identification.
    fn name(&self) -> &str;
}
