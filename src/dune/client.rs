use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tokio::time::sleep;

use crate::ingestion::{RawTradeRow, REQUIRED_COLUMNS, WALLET_TRADES_SCHEMA_VERSION};

const DUNE_API_BASE: &str = "https://api.dune.com/api/v1";
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_POLLS: u32 = 30;

/// Upstream fetch failure. Everything here is recoverable from the
/// pipeline's point of view: the caller gets no aggregate (never a zeroed
/// one) and may retry per `is_retryable`.
#[derive(Debug, Error)]
pub enum DuneError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream rate limit hit")]
    RateLimited,

    #[error("query execution failed: {0}")]
    ExecutionFailed(String),

    #[error("timed out waiting for execution {0}")]
    TimedOut(String),

    #[error("result schema drifted: missing column {0} (expected schema v{WALLET_TRADES_SCHEMA_VERSION})")]
    SchemaDrift(String),

    #[error("DUNE_API_KEY is not configured")]
    MissingApiKey,

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl DuneError {
    /// Retry guidance for the caller. Schema drift and hard execution
    /// failures will not heal on their own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DuneError::Http(_) | DuneError::RateLimited | DuneError::TimedOut(_)
        )
    }
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    #[serde(default)]
    execution_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultsResponse {
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<ResultPayload>,
}

#[derive(Debug, Deserialize)]
struct ResultPayload {
    #[serde(default)]
    rows: Vec<RawTradeRow>,
    #[serde(default)]
    metadata: Option<ResultMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResultMetadata {
    #[serde(default)]
    column_names: Vec<String>,
}

/// Client for the Dune wallet-trades query: execute, poll the execution
/// until it settles, then hand the raw rows to ingestion.
#[derive(Debug, Clone)]
pub struct DuneClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    query_id: u64,
}

impl DuneClient {
    pub fn new(http: Client, api_key: Option<String>, query_id: u64) -> Self {
        Self {
            http,
            base_url: DUNE_API_BASE.into(),
            api_key,
            query_id,
        }
    }

    /// The query id doubles as the cache key's data-source version.
    pub fn query_id(&self) -> u64 {
        self.query_id
    }

    /// Run the wallet-trades query for one address and return raw rows.
    /// An empty Vec means the wallet has no trades — distinct from any
    /// error path.
    pub async fn fetch_wallet_trades(&self, wallet: &str) -> Result<Vec<RawTradeRow>, DuneError> {
        let api_key = self.api_key.as_deref().ok_or(DuneError::MissingApiKey)?;

        let execute_url = format!("{}/query/{}/execute", self.base_url, self.query_id);
        let resp = self
            .http
            .post(&execute_url)
            .header("X-Dune-API-Key", api_key)
            .json(&serde_json::json!({ "query_parameters": { "wallet": wallet } }))
            .send()
            .await?;
        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(DuneError::RateLimited);
        }
        let execution: ExecuteResponse = resp.error_for_status()?.json().await?;
        let execution_id = execution
            .execution_id
            .ok_or_else(|| DuneError::Unexpected("execute response missing execution_id".into()))?;

        let results_url = format!("{}/execution/{}/results", self.base_url, execution_id);
        for _ in 0..MAX_POLLS {
            let resp = self
                .http
                .get(&results_url)
                .header("X-Dune-API-Key", api_key)
                .send()
                .await?;
            if resp.status() == StatusCode::TOO_MANY_REQUESTS {
                return Err(DuneError::RateLimited);
            }
            let payload: ResultsResponse = resp.error_for_status()?.json().await?;

            match payload.state.as_deref() {
                Some("QUERY_STATE_COMPLETED") => {
                    let result = payload.result.ok_or_else(|| {
                        DuneError::Unexpected("completed execution missing result".into())
                    })?;
                    if let Some(metadata) = &result.metadata {
                        check_schema(&metadata.column_names)?;
                    }
                    tracing::debug!(
                        wallet,
                        rows = result.rows.len(),
                        "Wallet trades fetched from Dune"
                    );
                    return Ok(result.rows);
                }
                Some("QUERY_STATE_FAILED") | Some("QUERY_STATE_CANCELLED") => {
                    return Err(DuneError::ExecutionFailed(
                        payload.message.unwrap_or_else(|| "execution failed".into()),
                    ));
                }
                _ => sleep(POLL_INTERVAL).await,
            }
        }

        Err(DuneError::TimedOut(execution_id))
    }
}

fn check_schema(columns: &[String]) -> Result<(), DuneError> {
    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|c| c == required) {
            return Err(DuneError::SchemaDrift((*required).to_string()));
        }
    }
    Ok(())
}
