use crate::domain::SaleRecord;
use crate::store::{SaleStore, StoreError};
use reqwest::blocking::Client;
use std::time::Duration;
use url::Url;

pub const CONFLICT_COLUMNS: &str = "address,sold_date";

/// Remote Postgres table behind a PostgREST (Supabase) endpoint.
pub struct RestStore {
    endpoint: Url,
    api_key: String,
    client: Client,
}

impl RestStore {
    pub fn new(project_url: &Url, api_key: String, table: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self {
            endpoint: upsert_endpoint(project_url, table)?,
            api_key,
            client,
        })
    }
}

/// `{project}/rest/v1/{table}?on_conflict=address,sold_date`
pub fn upsert_endpoint(project_url: &Url, table: &str) -> Result<Url, StoreError> {
    let mut endpoint = project_url.clone();
    endpoint
        .path_segments_mut()
        .map_err(|_| StoreError::Transport(format!("{project_url} cannot be a base URL")))?
        .pop_if_empty()
        .extend(["rest", "v1", table]);
    endpoint
        .query_pairs_mut()
        .clear()
        .append_pair("on_conflict", CONFLICT_COLUMNS);
    Ok(endpoint)
}

impl SaleStore for RestStore {
    fn upsert(&self, rows: &[SaleRecord]) -> Result<(), StoreError> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows)
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().unwrap_or_else(|_| "(no body)".to_string());
        Err(StoreError::Http { status, body })
    }
}
