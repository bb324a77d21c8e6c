// src/client/mod.rs
//
// Thin typed client over the report API. One method per endpoint; every
// body goes through the strict models in `crate::model` before being handed
// to a caller. No retries here: a failed call is retried only when the
// caller explicitly asks again.

use crate::model::{
    CensusDetail, CensusMaster, CensusStats, DropdownItem, RateMaster, SaveAgeOutput,
};
use crate::params::ReportKey;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use url::form_urlencoded;

/// Failure taxonomy at the API boundary. A `Contract` violation is treated
/// by callers exactly like a transport failure: the malformed body never
/// escapes this module.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("{url} violated the API contract: {source}")]
    Contract {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON body of the save-age POST. The triple scopes the whole computation;
/// the pagination, filter and sort knobs ride in the query string instead.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SaveAgeBody {
    pub census_master_id: i64,
    pub rate_master_id: i64,
    pub effective_date: String,
}

/// One fully-specified save-age page request.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveAgeRequest {
    pub key: ReportKey,
    pub offset: u64,
    pub limit: u64,
    /// Pre-serialized `col::op::value;;...` string, absent when unfiltered.
    pub filters: Option<String>,
    /// Pre-serialized `-col,col` string, absent when unsorted.
    pub sort: Option<String>,
}

impl SaveAgeRequest {
    pub fn path_and_query(&self) -> String {
        let mut path = format!("/api/save-age?limit={}&offset={}", self.limit, self.offset);
        if let Some(filters) = self.filters.as_deref().filter(|f| !f.is_empty()) {
            path.push_str("&filters=");
            path.extend(form_urlencoded::byte_serialize(filters.as_bytes()));
        }
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.is_empty()) {
            path.push_str("&sort=");
            path.extend(form_urlencoded::byte_serialize(sort.as_bytes()));
        }
        path
    }

    pub fn body(&self) -> SaveAgeBody {
        SaveAgeBody {
            census_master_id: self.key.census_master_id,
            rate_master_id: self.key.rate_master_id,
            effective_date: self.key.effective_date.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ApiClient {
            base_url,
            http: Client::new(),
        }
    }

    /// Base URL from `SAVEAGE_API`, falling back to the local dev server.
    pub fn from_env() -> Self {
        let base = std::env::var("SAVEAGE_API")
            .unwrap_or_else(|_| "http://localhost:5000".to_string());
        Self::new(base)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    async fn decode<T: DeserializeOwned>(
        url: String,
        resp: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<T, ApiError> {
        let resp = resp.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status { url, status });
        }
        let text = resp.text().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ApiError::Contract { url, source })
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, ApiError> {
        let url = self.url(path_and_query);
        debug!(%url, "GET");
        let resp = self.http.get(&url).send().await;
        Self::decode(url, resp).await
    }

    pub async fn census_master(&self, id: i64) -> Result<CensusMaster, ApiError> {
        self.get_json(&format!("/api/census/{id}")).await
    }

    pub async fn census_details(&self, id: i64) -> Result<Vec<CensusDetail>, ApiError> {
        self.get_json(&format!("/api/census/{id}/details")).await
    }

    pub async fn census_stats(&self, id: i64) -> Result<CensusStats, ApiError> {
        self.get_json(&format!("/api/census/{id}/stats")).await
    }

    pub async fn search_census(&self, name: &str) -> Result<Vec<DropdownItem>, ApiError> {
        self.get_json(&format!("/api/dd/census?name={}", encode(name)))
            .await
    }

    pub async fn rate_master(&self, id: i64) -> Result<RateMaster, ApiError> {
        self.get_json(&format!("/api/rates/{id}")).await
    }

    pub async fn search_rates(&self, name: &str) -> Result<Vec<DropdownItem>, ApiError> {
        self.get_json(&format!("/api/dd/rates?name={}", encode(name)))
            .await
    }

    /// Upload a census roster file; the server assigns the new master id.
    pub async fn upload_census(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        name: Option<&str>,
    ) -> Result<CensusMaster, ApiError> {
        self.upload("/api/census/upload", file_name, bytes, name)
            .await
    }

    /// Upload a rate table. `umin`/`umax` ask the server to unbound the
    /// lowest and highest age bands, matching the dashboard's behavior.
    pub async fn upload_rates(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        name: Option<&str>,
    ) -> Result<RateMaster, ApiError> {
        self.upload("/api/rates/upload?umin=Y&umax=Y", file_name, bytes, name)
            .await
    }

    async fn upload<T: DeserializeOwned>(
        &self,
        path_and_query: &str,
        file_name: &str,
        bytes: Vec<u8>,
        name: Option<&str>,
    ) -> Result<T, ApiError> {
        let url = self.url(path_and_query);
        debug!(%url, file_name, "POST multipart");
        let mut form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        if let Some(name) = name {
            form = form.text("name", name.to_string());
        }
        let resp = self.http.post(&url).multipart(form).send().await;
        Self::decode(url, resp).await
    }

    /// Run one page of the save-age computation.
    pub async fn calc_save_age(&self, req: &SaveAgeRequest) -> Result<SaveAgeOutput, ApiError> {
        let url = self.url(&req.path_and_query());
        debug!(%url, "POST");
        let resp = self.http.post(&url).json(&req.body()).send().await;
        Self::decode(url, resp).await
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ReportKey {
        ReportKey {
            census_master_id: 12,
            rate_master_id: 3,
            effective_date: "2025-06-01".to_string(),
        }
    }

    #[test]
    fn save_age_request_renders_minimal_query() {
        let req = SaveAgeRequest {
            key: key(),
            offset: 100,
            limit: 100,
            filters: None,
            sort: None,
        };
        assert_eq!(req.path_and_query(), "/api/save-age?limit=100&offset=100");
    }

    #[test]
    fn save_age_request_includes_filters_and_sort_when_present() {
        let req = SaveAgeRequest {
            key: key(),
            offset: 0,
            limit: 100,
            filters: Some("issue_age::greaterThan::30".to_string()),
            sort: Some("-diff,issue_age".to_string()),
        };
        let path = req.path_and_query();
        assert!(path.starts_with("/api/save-age?limit=100&offset=0"));
        assert!(path.contains("&filters=issue_age%3A%3AgreaterThan%3A%3A30"));
        assert!(path.contains("&sort=-diff%2Cissue_age"));
    }

    #[test]
    fn empty_filter_string_is_omitted() {
        let req = SaveAgeRequest {
            key: key(),
            offset: 0,
            limit: 50,
            filters: Some(String::new()),
            sort: Some(String::new()),
        };
        assert_eq!(req.path_and_query(), "/api/save-age?limit=50&offset=0");
    }

    #[test]
    fn body_carries_the_triple() {
        let req = SaveAgeRequest {
            key: key(),
            offset: 0,
            limit: 100,
            filters: None,
            sort: None,
        };
        let body = serde_json::to_value(req.body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "census_master_id": 12,
                "rate_master_id": 3,
                "effective_date": "2025-06-01",
            })
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(
            client.url("/api/census/3"),
            "http://localhost:5000/api/census/3"
        );
    }
}
