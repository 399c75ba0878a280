//! People-search backend: criteria, result records, and the HTTP client.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::SearchError;

/// Flat search criteria assembled from questionnaire answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SearchCriteria(BTreeMap<String, Value>);

impl SearchCriteria {
    pub fn insert(&mut self, key: String, value: Value) {
        self.0.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A person card returned by the search backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub title: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub details: String,
    #[serde(rename = "profileURL")]
    pub profile_url: String,
}

/// Search seam. The dialog engine only ever talks to this trait.
#[async_trait]
pub trait PeopleSearch: Send + Sync {
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Profile>, SearchError>;
}

/// HTTP search backend: POSTs the criteria as JSON and expects a
/// profile array back.
pub struct HttpPeopleSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPeopleSearch {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl PeopleSearch for HttpPeopleSearch {
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Profile>, SearchError> {
        debug!(criteria = ?criteria, "Running people search");

        let resp = self
            .client
            .post(&self.endpoint)
            .json(criteria)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else {
                    SearchError::RequestFailed(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::RequestFailed(format!(
                "search returned {status}: {body}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))
    }
}
