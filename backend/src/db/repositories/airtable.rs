//! Airtable-backed record store (formula filter dialect).
//!
//! Lists are read from `GET {api_url}/v0/{base}/{table}` following the
//! `offset` cursor; single records from `GET {api_url}/v0/{base}/{table}/{id}`.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::StatusCode;
use serde::Deserialize;

use super::remote::{decode_body, status_error, transport_error, LazyClient, RemoteSettings};
use crate::db::config::StoreConfig;
use crate::db::repository::{
    ErrorContext, FilterDialect, ListQuery, RecordStore, RepositoryResult,
};
use crate::models::{FieldMap, Record};

/// Hosted Airtable REST endpoint.
pub const AIRTABLE_API_URL: &str = "https://api.airtable.com";

#[derive(Debug, Deserialize)]
struct AirtableRecord {
    id: String,
    #[serde(default)]
    fields: FieldMap,
}

impl From<AirtableRecord> for Record {
    fn from(r: AirtableRecord) -> Self {
        Record::new(r.id, r.fields)
    }
}

#[derive(Debug, Deserialize)]
struct AirtablePage {
    #[serde(default)]
    records: Vec<AirtableRecord>,
    offset: Option<String>,
}

/// Record store talking to the Airtable REST API.
#[derive(Debug)]
pub struct AirtableStore {
    settings: RemoteSettings,
    health_collection: String,
    client: LazyClient,
}

impl AirtableStore {
    /// Validate configuration. No network traffic happens until the first call.
    ///
    /// # Errors
    /// `ConfigurationError` when the API key or base id is missing, or the
    /// endpoint override is not a valid URL.
    pub fn new(config: &StoreConfig) -> RepositoryResult<Self> {
        let settings = RemoteSettings::from_config(config, "Airtable", AIRTABLE_API_URL)?;
        info!(
            "Airtable store configured for base {} at {}",
            settings.base_id, settings.api_url
        );
        Ok(Self {
            settings,
            health_collection: config.collections.books.clone(),
            client: LazyClient::new(),
        })
    }

    fn list_params(&self, query: &ListQuery, offset: Option<&str>) -> Vec<(String, String)> {
        let mut page_size = query.effective_page_size(self.settings.page_size);
        if let Some(max) = query.max_records {
            page_size = page_size.min(max.max(1));
        }

        let mut params = vec![("pageSize".to_string(), page_size.to_string())];
        if let Some(max) = query.max_records {
            params.push(("maxRecords".to_string(), max.to_string()));
        }
        if let Some(ref formula) = query.filter {
            params.push(("filterByFormula".to_string(), formula.clone()));
        }
        for (i, spec) in query.sort.iter().enumerate() {
            params.push((format!("sort[{}][field]", i), spec.field.clone()));
            params.push((format!("sort[{}][direction]", i), spec.direction.to_string()));
        }
        if let Some(cursor) = offset {
            params.push(("offset".to_string(), cursor.to_string()));
        }
        params
    }
}

#[async_trait]
impl RecordStore for AirtableStore {
    fn dialect(&self) -> FilterDialect {
        FilterDialect::Formula
    }

    fn backend_name(&self) -> &'static str {
        "airtable"
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        let query = ListQuery::new().max_records(1);
        self.fetch_all(&self.health_collection, &query)
            .await
            .map_err(|e| e.with_operation("health_check"))?;
        Ok(true)
    }

    async fn fetch_all(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> RepositoryResult<Vec<Record>> {
        let context = ErrorContext::new("fetch_all").with_collection(collection);
        let client = self.client.get(self.settings.timeout).await?;
        let url = self
            .settings
            .endpoint(&["v0", self.settings.base_id.as_str(), collection])?;

        let mut records: Vec<Record> = Vec::new();
        let mut offset: Option<String> = None;
        let mut pages = 0usize;

        loop {
            if query.remaining(records.len()) == Some(0) {
                break;
            }

            let response = client
                .get(url.clone())
                .bearer_auth(&self.settings.api_key)
                .query(&self.list_params(query, offset.as_deref()))
                .send()
                .await
                .map_err(|e| transport_error(e, context.clone()))?;

            if !response.status().is_success() {
                return Err(status_error(response, context).await);
            }

            let page: AirtablePage = decode_body(response, context.clone()).await?;
            pages += 1;
            let received = page.records.len();
            debug!(
                "airtable page {} of {}: {} records",
                pages, collection, received
            );
            records.extend(page.records.into_iter().map(Record::from));

            match page.offset {
                Some(next) if received > 0 => offset = Some(next),
                _ => break,
            }
        }

        if let Some(max) = query.max_records {
            records.truncate(max);
        }
        debug!(
            "airtable fetch_all {} -> {} records in {} pages",
            collection,
            records.len(),
            pages
        );
        Ok(records)
    }

    async fn fetch_one_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> RepositoryResult<Option<Record>> {
        let context = ErrorContext::new("fetch_one_by_id")
            .with_collection(collection)
            .with_record_id(id);
        let client = self.client.get(self.settings.timeout).await?;
        let url = self
            .settings
            .endpoint(&["v0", self.settings.base_id.as_str(), collection, id])?;

        let response = client
            .get(url)
            .bearer_auth(&self.settings.api_key)
            .send()
            .await
            .map_err(|e| transport_error(e, context.clone()))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("airtable record {} not found in {}", id, collection);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response, context).await);
        }

        let record: AirtableRecord = decode_body(response, context).await?;
        Ok(Some(record.into()))
    }
}
