//! Sportsbook bet-placement HTTP client.
//!
//! Talks to the bookmaker's JSON REST API:
//! - `POST /v1/bets` — one independent single bet
//! - `POST /v1/bets/parlay` — one combined bet over all legs
//!
//! Auth: `Authorization: Bearer {key}` when a key is configured.
//! The request body/response shapes use the bookmaker's camelCase
//! conventions; we only (de)serialize the fields we need.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::BettingPlatform;
use crate::types::{
    BetAck, BetRequest, LegAck, LegStatus, MarketKind, ParlayAck, ParlayRequest,
};

const PLATFORM_NAME: &str = "sportsbook";

// ---------------------------------------------------------------------------
// Wire types (engine → bookmaker JSON)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireBetRequest<'a> {
    event_id: &'a str,
    market: MarketKind,
    prediction: &'a str,
    odds: Decimal,
    stake: Decimal,
}

impl<'a> From<&'a BetRequest> for WireBetRequest<'a> {
    fn from(req: &'a BetRequest) -> Self {
        WireBetRequest {
            event_id: &req.event_id,
            market: req.market,
            prediction: &req.prediction,
            odds: req.odds,
            stake: req.stake,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireParlayLeg<'a> {
    event_id: &'a str,
    market: MarketKind,
    prediction: &'a str,
    odds: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireParlayRequest<'a> {
    legs: Vec<WireParlayLeg<'a>>,
    total_stake: Decimal,
}

impl<'a> From<&'a ParlayRequest> for WireParlayRequest<'a> {
    fn from(req: &'a ParlayRequest) -> Self {
        WireParlayRequest {
            legs: req
                .legs
                .iter()
                .map(|l| WireParlayLeg {
                    event_id: &l.event_id,
                    market: l.market,
                    prediction: &l.prediction,
                    odds: l.odds,
                })
                .collect(),
            total_stake: req.total_stake,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types (bookmaker JSON → engine)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBetResponse {
    status: LegStatus,
    #[serde(default)]
    ticket_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLegResult {
    event_id: String,
    status: LegStatus,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireParlayResponse {
    status: LegStatus,
    #[serde(default)]
    ticket_id: Option<String>,
    #[serde(default)]
    legs: Vec<WireLegResult>,
    #[serde(default)]
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the bookmaker's bet-placement API.
pub struct SportsbookClient {
    http: Client,
    base_url: String,
    /// Bearer key for authenticated placement endpoints.
    api_key: Option<SecretString>,
}

impl SportsbookClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("BETSLIP/0.1.0 (betslip-cart-engine)")
            .build()
            .context("Failed to build HTTP client for sportsbook")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "Posting to sportsbook");

        let mut request = self.http.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let resp = request
            .send()
            .await
            .context("Sportsbook API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Sportsbook API error {status}: {body}");
        }

        resp.json::<R>()
            .await
            .context("Failed to parse sportsbook response")
    }
}

#[async_trait]
impl BettingPlatform for SportsbookClient {
    async fn place_single(&self, request: &BetRequest) -> Result<BetAck> {
        let wire: WireBetRequest<'_> = request.into();
        let resp: WireBetResponse = self.post_json("/v1/bets", &wire).await?;
        Ok(BetAck {
            status: resp.status,
            ticket_id: resp.ticket_id,
            message: resp.message,
        })
    }

    async fn place_parlay(&self, request: &ParlayRequest) -> Result<ParlayAck> {
        let wire: WireParlayRequest<'_> = request.into();
        let resp: WireParlayResponse = self.post_json("/v1/bets/parlay", &wire).await?;
        Ok(ParlayAck {
            status: resp.status,
            ticket_id: resp.ticket_id,
            legs: resp
                .legs
                .into_iter()
                .map(|l| LegAck {
                    event_id: l.event_id,
                    status: l.status,
                    message: l.message,
                })
                .collect(),
            message: resp.message,
        })
    }

    fn name(&self) -> &str {
        PLATFORM_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
