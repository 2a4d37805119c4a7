//! [`RestStore`]: PostgREST-compatible record store over HTTPS.
//!
//! Reads use `GET /rest/v1/<table>?select=<id>,<fields>` and single-record
//! updates use `PATCH /rest/v1/<table>?<id>=eq.<value>`. Requests carry the
//! project API key both as `apikey` and as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use common::{FieldMap, Record, RecordId};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use tracing::debug;

use super::{RecordStore, StoreError};

/// Per-request timeout applied to store calls.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(15);

/// Record store backed by a PostgREST endpoint.
#[derive(Clone, Debug)]
pub struct RestStore {
    client: reqwest::Client,
    table_url: String,
    id_column: String,
}

impl RestStore {
    /// Build a store for `table` under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the API key is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        api_key: &str,
        table: &str,
        id_column: &str,
    ) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| StoreError::Unavailable("store API key is not a valid header".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| StoreError::Unavailable("store API key is not a valid header".into()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(STORE_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            table_url: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            id_column: id_column.to_owned(),
        })
    }

    fn select_clause(&self, fields: &[String]) -> String {
        std::iter::once(self.id_column.as_str())
            .chain(fields.iter().map(String::as_str).filter(|f| *f != self.id_column))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn row_to_record(&self, mut row: FieldMap) -> Result<Record, StoreError> {
        let id = match row.remove(&self.id_column) {
            Some(Value::String(s)) => RecordId(s),
            Some(Value::Number(n)) => RecordId(n.to_string()),
            other => {
                return Err(StoreError::Decode(format!(
                    "row has unusable {} column: {other:?}",
                    self.id_column
                )))
            }
        };
        Ok(Record::new(id, row))
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(StoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl RecordStore for RestStore {
    async fn fetch_all(&self, fields: &[String]) -> Result<Vec<Record>, StoreError> {
        let select = self.select_clause(fields);
        let resp = self
            .client
            .get(&self.table_url)
            .query(&[("select", select.as_str())])
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let rows: Vec<FieldMap> = check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        debug!(rows = rows.len(), "fetched records");
        rows.into_iter().map(|row| self.row_to_record(row)).collect()
    }

    async fn update_by_id(&self, id: &RecordId, fields: FieldMap) -> Result<(), StoreError> {
        let filter = format!("eq.{id}");
        let resp = self
            .client
            .patch(&self.table_url)
            .query(&[(self.id_column.as_str(), filter.as_str())])
            .header("Prefer", "return=representation")
            .json(&fields)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let updated: Vec<Value> = check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        if updated.is_empty() {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::{HeaderMap as AxumHeaders, StatusCode},
        response::{IntoResponse, Response},
        routing::get,
        Json, Router,
    };
    use serde_json::json;

    const API_KEY: &str = "anon-key";

    type Rows = Arc<Mutex<Vec<Value>>>;

    async fn list(
        State(rows): State<Rows>,
        headers: AxumHeaders,
        Query(q): Query<HashMap<String, String>>,
    ) -> Response {
        if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some(API_KEY) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        let select = q.get("select").cloned().unwrap_or_default();
        let columns: Vec<&str> = select.split(',').collect();
        let projected: Vec<Value> = rows
            .lock()
            .unwrap()
            .iter()
            .map(|row| {
                let obj = row.as_object().unwrap();
                let picked: serde_json::Map<String, Value> = columns
                    .iter()
                    .filter_map(|c| obj.get(*c).map(|v| ((*c).to_owned(), v.clone())))
                    .collect();
                Value::Object(picked)
            })
            .collect();
        Json(projected).into_response()
    }

    async fn patch(
        State(rows): State<Rows>,
        Query(q): Query<HashMap<String, String>>,
        Json(body): Json<FieldMap>,
    ) -> Response {
        let wanted = q
            .get("id")
            .and_then(|f| f.strip_prefix("eq."))
            .unwrap_or_default()
            .to_owned();
        let mut rows = rows.lock().unwrap();
        let mut updated = Vec::new();
        for row in rows.iter_mut() {
            if row["id"].to_string() == wanted || row["id"].as_str() == Some(wanted.as_str()) {
                let obj = row.as_object_mut().unwrap();
                obj.extend(body.clone());
                updated.push(row.clone());
            }
        }
        Json(updated).into_response()
    }

    async fn spawn_backend(rows: Rows) -> String {
        let app = Router::new()
            .route("/rest/v1/family_plans", get(list).patch(patch))
            .with_state(rows);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn seed() -> Rows {
        Arc::new(Mutex::new(vec![
            json!({"id": 1, "name": "Family A", "owner_password": "pw-one"}),
            json!({"id": 2, "name": "Family B", "owner_password": null}),
        ]))
    }

    #[tokio::test]
    async fn fetch_all_normalises_numeric_ids() {
        let url = spawn_backend(seed()).await;
        let store = RestStore::new(&url, API_KEY, "family_plans", "id").unwrap();

        let records = store
            .fetch_all(&["owner_password".to_owned()])
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, RecordId::from("1"));
        assert_eq!(records[0].str_field("owner_password"), Some("pw-one"));
        assert!(records[0].fields.get("name").is_none());
        assert_eq!(records[1].str_field("owner_password"), None);
    }

    #[tokio::test]
    async fn update_by_id_patches_one_row() {
        let rows = seed();
        let url = spawn_backend(rows.clone()).await;
        let store = RestStore::new(&url, API_KEY, "family_plans", "id").unwrap();

        let mut fields = FieldMap::new();
        fields.insert("owner_password".into(), json!("changed"));
        store
            .update_by_id(&RecordId::from("2"), fields)
            .await
            .unwrap();

        let rows = rows.lock().unwrap();
        assert_eq!(rows[1]["owner_password"], "changed");
        assert_eq!(rows[0]["owner_password"], "pw-one");
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let url = spawn_backend(seed()).await;
        let store = RestStore::new(&url, API_KEY, "family_plans", "id").unwrap();

        let err = store
            .update_by_id(&RecordId::from("99"), FieldMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn bad_api_key_is_rejected() {
        let url = spawn_backend(seed()).await;
        let store = RestStore::new(&url, "wrong", "family_plans", "id").unwrap();

        let err = store.fetch_all(&[]).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 401, .. }));
    }

    #[test]
    fn select_clause_deduplicates_id() {
        let store = RestStore::new("http://localhost", API_KEY, "t", "id").unwrap();
        assert_eq!(
            store.select_clause(&["id".to_owned(), "owner_password".to_owned()]),
            "id,owner_password"
        );
    }
}
