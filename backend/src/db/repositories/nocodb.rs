//! NocoDB-backed record store (comparison filter dialect).
//!
//! Lists are read from `GET {api_url}/api/v2/tables/{table}/records` with
//! `limit`/`offset` paging; the row primary key (`Id` or `id`) becomes the
//! record id.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use super::remote::{decode_body, status_error, transport_error, LazyClient, RemoteSettings};
use crate::db::config::StoreConfig;
use crate::db::repository::{
    ErrorContext, FilterDialect, ListQuery, RecordStore, RepositoryError, RepositoryResult,
    SortDirection,
};
use crate::models::record::value_as_text;
use crate::models::{FieldMap, Record};

/// Hosted NocoDB endpoint.
pub const NOCODB_API_URL: &str = "https://app.nocodb.com";

const TOKEN_HEADER: &str = "xc-token";
const PRIMARY_KEYS: [&str; 2] = ["Id", "id"];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    is_last_page: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NocoPage {
    #[serde(default)]
    list: Vec<FieldMap>,
    #[serde(default)]
    page_info: PageInfo,
}

/// Convert a NocoDB row into a [`Record`], lifting the primary key out of the fields.
fn row_to_record(mut row: FieldMap, context: &ErrorContext) -> RepositoryResult<Record> {
    let mut id = None;
    for key in PRIMARY_KEYS {
        if let Some(value) = row.remove(key) {
            id = id.or_else(|| value_as_text(&value));
        }
    }
    let id = id.ok_or_else(|| RepositoryError::DecodeError {
        message: "Row without primary key".to_string(),
        context: context.clone(),
        source: None,
    })?;
    Ok(Record::new(id, row))
}

/// Record store talking to the NocoDB v2 REST API.
#[derive(Debug)]
pub struct NocoDbStore {
    settings: RemoteSettings,
    health_collection: String,
    client: LazyClient,
}

impl NocoDbStore {
    /// Validate configuration. No network traffic happens until the first call.
    ///
    /// # Errors
    /// `ConfigurationError` when the API token or project id is missing, or the
    /// endpoint is not a valid URL.
    pub fn new(config: &StoreConfig) -> RepositoryResult<Self> {
        let settings = RemoteSettings::from_config(config, "NocoDB", NOCODB_API_URL)?;
        info!(
            "NocoDB store configured for project {} at {}",
            settings.base_id, settings.api_url
        );
        Ok(Self {
            settings,
            health_collection: config.collections.books.clone(),
            client: LazyClient::new(),
        })
    }

    fn list_params(&self, query: &ListQuery, limit: usize, offset: usize) -> Vec<(String, String)> {
        let mut params = vec![
            ("limit".to_string(), limit.to_string()),
            ("offset".to_string(), offset.to_string()),
        ];
        if let Some(ref filter) = query.filter {
            params.push(("where".to_string(), filter.clone()));
        }
        if !query.sort.is_empty() {
            let sort = query
                .sort
                .iter()
                .map(|s| match s.direction {
                    SortDirection::Asc => s.field.clone(),
                    SortDirection::Desc => format!("-{}", s.field),
                })
                .collect::<Vec<_>>()
                .join(",");
            params.push(("sort".to_string(), sort));
        }
        params
    }
}

#[async_trait]
impl RecordStore for NocoDbStore {
    fn dialect(&self) -> FilterDialect {
        FilterDialect::Comparison
    }

    fn backend_name(&self) -> &'static str {
        "nocodb"
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
            .endpoint(&["api", "v2", "tables", collection, "records"])?;
        let page_size = query.effective_page_size(self.settings.page_size);

        let mut records: Vec<Record> = Vec::new();
        let mut offset = 0usize;
        let mut pages = 0usize;

        loop {
            let limit = match query.remaining(records.len()) {
                Some(0) => break,
                Some(left) => left.min(page_size),
                None => page_size,
            };

            let response = client
                .get(url.clone())
                .header(TOKEN_HEADER, &self.settings.api_key)
                .query(&self.list_params(query, limit, offset))
                .send()
                .await
                .map_err(|e| transport_error(e, context.clone()))?;

            if !response.status().is_success() {
                return Err(status_error(response, context).await);
            }

            let page: NocoPage = decode_body(response, context.clone()).await?;
            pages += 1;
            let received = page.list.len();
            debug!("nocodb page {} of {}: {} rows", pages, collection, received);

            for row in page.list {
                records.push(row_to_record(row, &context)?);
            }
            offset += received;

            if page.page_info.is_last_page.unwrap_or(false) || received < limit {
                break;
            }
        }

        if let Some(max) = query.max_records {
            records.truncate(max);
        }
        debug!(
            "nocodb fetch_all {} -> {} records in {} pages",
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
            .endpoint(&["api", "v2", "tables", collection, "records", id])?;

        let response = client
            .get(url)
            .header(TOKEN_HEADER, &self.settings.api_key)
            .send()
            .await
            .map_err(|e| transport_error(e, context.clone()))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("nocodb record {} not found in {}", id, collection);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response, context).await);
        }

        let body: Value = decode_body(response, context.clone()).await?;
        match body {
            Value::Object(row) if row.is_empty() => Ok(None),
            Value::Object(row) => row_to_record(row, &context).map(Some),
            other => Err(RepositoryError::DecodeError {
                message: format!("Expected a JSON object, got {}", json_kind(&other)),
                context,
                source: None,
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
