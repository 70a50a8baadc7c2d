use reqwest::Client;
use serde::Deserialize;
use tracing::{
    debug,
    info,
};

use super::{
    CustomRecord,
    NewCustomRecord,
};
use crate::core::{
    http::{
        ensure_success,
        join_url,
    },
    PokedexError,
    Result,
};

/// Envelope the store wraps around an updated record.
#[derive(Debug, Deserialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub data: Option<CustomRecord>,
    pub message: Option<String>,
}

impl UpdateResponse {
    pub fn into_record(self) -> Result<CustomRecord> {
        match (self.success, self.data) {
            (true, Some(record)) => Ok(record),
            _ => Err(PokedexError::Custom(
                self.message.unwrap_or_else(|| "custom store rejected the update".to_string()),
            )),
        }
    }
}

/// Picks the record with `id` out of a full listing; the store has no single-record read.
pub fn select_record(records: Vec<CustomRecord>, id: u32) -> Result<CustomRecord> {
    records.into_iter().find(|r| r.id == id).ok_or(PokedexError::RecordNotFound(id))
}

pub struct CustomStoreClient {
    base_url: String,
    client: Client,
}

impl CustomStoreClient {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self { base_url: base_url.into(), client }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    pub async fn create(&self, record: &NewCustomRecord) -> Result<CustomRecord> {
        let resp = self.client.post(self.url("custom")).json(record).send().await?;
        ensure_success(&resp, None)?;

        let created: CustomRecord = resp.json().await?;
        info!("Created custom record {} ({})", created.id, created.fields.name);
        Ok(created)
    }

    pub async fn list(&self) -> Result<Vec<CustomRecord>> {
        let resp = self.client.get(self.url("custom")).send().await?;
        ensure_success(&resp, None)?;

        let records: Vec<CustomRecord> = resp.json().await?;
        debug!("Custom store holds {} records", records.len());
        Ok(records)
    }

    pub async fn find(&self, id: u32) -> Result<CustomRecord> {
        select_record(self.list().await?, id)
    }

    pub async fn update(&self, id: u32, record: &NewCustomRecord) -> Result<CustomRecord> {
        let mut body = serde_json::to_value(record)?;
        body["id"] = serde_json::Value::from(id);

        let resp =
            self.client.put(self.url(&format!("custom/{id}"))).json(&body).send().await?;
        ensure_success(&resp, Some(id))?;

        let updated = resp.json::<UpdateResponse>().await?.into_record()?;
        info!("Updated custom record {}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: u32) -> Result<()> {
        let resp = self.client.delete(self.url(&format!("custom/{id}"))).send().await?;
        ensure_success(&resp, Some(id))?;

        info!("Deleted custom record {}", id);
        Ok(())
    }
}
