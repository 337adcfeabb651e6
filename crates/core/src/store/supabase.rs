//! Supabase (PostgREST) task store implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use tracing::debug;

use crate::config::StoreConfig;
use crate::task::TaskUpdate;

use super::{StoreError, TaskStore};

/// Task store backed by a Supabase table, updated through its REST API.
pub struct SupabaseTaskStore {
    client: Client,
    base_url: String,
    table: String,
    service_role_key: String,
}

impl SupabaseTaskStore {
    /// Create a new Supabase store client.
    ///
    /// Fails when the URL or service role key is missing or the URL is not
    /// an absolute http(s) URL. No network request is made.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.url.trim().is_empty() {
            return Err(StoreError::NotConfigured(
                "Supabase URL is required".to_string(),
            ));
        }
        if config.service_role_key.trim().is_empty() {
            return Err(StoreError::NotConfigured(
                "Supabase service role key is required".to_string(),
            ));
        }

        let parsed = Url::parse(config.url.trim())
            .map_err(|e| StoreError::NotConfigured(format!("Invalid Supabase URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StoreError::NotConfigured(format!(
                "Invalid Supabase URL scheme: {}",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| StoreError::NotConfigured(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            table: config.table.clone(),
            service_role_key: config.service_role_key.clone(),
        })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url,
            urlencoding::encode(&self.table)
        )
    }
}

#[async_trait]
impl TaskStore for SupabaseTaskStore {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn update(&self, task_id: &str, update: &TaskUpdate) -> Result<(), StoreError> {
        debug!(
            "Supabase update: table='{}', task_id='{}', status={}",
            self.table, task_id, update.status
        );

        let response = self
            .client
            .patch(self.table_url())
            .query(&[("id", format!("eq.{}", task_id))])
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .header("Prefer", "return=representation")
            .header(header::ACCEPT, "application/json")
            .json(update)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        if rows.is_empty() {
            return Err(StoreError::NotFound(task_id.to_string()));
        }

        Ok(())
    }
}
