use futures::future::try_join_all;
use reqwest::header::{ACCEPT, COOKIE};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::BackendConfig;
use crate::records::{
    Deal, DealEnvelope, DealsEnvelope, Proposal, ProposalEnvelope, ProposalsEnvelope, Transaction,
    TransactionsEnvelope,
};
use crate::util::{validate_record_id, InvalidRecordId};

pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Longest slice of an error body kept in [`BackendError::Status`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    InvalidId(#[from] InvalidRecordId),
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },
    #[error("unexpected response shape from {url}")]
    Envelope {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only client for the escrow backend.
///
/// The backend owns deal, proposal and wallet state; this client only fetches
/// records for display. It forwards the caller's session cookie and CSRF
/// token untouched and never retries.
#[derive(Debug, Clone)]
pub struct EscrowClient {
    http: reqwest::Client,
    config: BackendConfig,
}

impl EscrowClient {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(BackendError::Client)?;

        Ok(Self { http, config })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.config.endpoint(path);
        info!(%url, "requesting escrow backend");

        let mut request = self.http.get(&url).header(ACCEPT, "application/json");
        if let Some(cookie) = &self.config.session_cookie {
            request = request.header(COOKIE, cookie);
        }
        if let Some(token) = &self.config.csrf_token {
            request = request.header(CSRF_HEADER, token);
        }

        let response = request
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(BackendError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| BackendError::Transport {
                url: url.clone(),
                source,
            })?;
        debug!(%url, bytes = body.len(), "escrow backend responded");

        serde_json::from_str(&body).map_err(|source| BackendError::Envelope { url, source })
    }

    pub async fn deal(&self, id: &str) -> Result<Deal, BackendError> {
        validate_record_id(id)?;
        let envelope: DealEnvelope = self.get_json(&format!("deals/{id}")).await?;
        Ok(envelope.deal)
    }

    /// Fetches several deals concurrently. Fails on the first error.
    pub async fn fetch_deals(&self, ids: &[String]) -> Result<Vec<Deal>, BackendError> {
        for id in ids {
            validate_record_id(id)?;
        }
        try_join_all(ids.iter().map(|id| self.deal(id))).await
    }

    /// Every deal visible to the session.
    pub async fn deals(&self) -> Result<Vec<Deal>, BackendError> {
        let envelope: DealsEnvelope = self.get_json("deals").await?;
        Ok(envelope.deals)
    }

    pub async fn proposal(&self, id: &str) -> Result<Proposal, BackendError> {
        validate_record_id(id)?;
        let envelope: ProposalEnvelope = self.get_json(&format!("proposals/{id}")).await?;
        Ok(envelope.proposal)
    }

    /// Every proposal visible to the session.
    pub async fn proposals(&self) -> Result<Vec<Proposal>, BackendError> {
        let envelope: ProposalsEnvelope = self.get_json("proposals").await?;
        Ok(envelope.proposals)
    }

    pub async fn transactions(&self) -> Result<Vec<Transaction>, BackendError> {
        let envelope: TransactionsEnvelope = self.get_json("transactions").await?;
        Ok(envelope.transactions)
    }
}
