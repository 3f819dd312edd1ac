//! Subscription REST API client.
//!
//! A minimal client for the creator-subscription service. Supports searching
//! creators by name, fetching the group list as seen from one creator, and
//! submitting the creator's final group assignment.
//!
//! # Example
//!
//! ```rust,ignore
//! use subscribe_client::{SubscribeApi, SubscribeClient};
//!
//! let client = SubscribeClient::new("http://localhost:8000/api").with_token("secret");
//!
//! let creators = client.search("alice").await?;
//! for creator in &creators {
//!     println!("{} ({} followers)", creator.display_name, creator.follower_count);
//! }
//! ```

pub mod error;
pub mod types;

#[cfg(feature = "testing")]
pub mod testing;

pub use error::{ApiError, Result};
pub use types::{
    ApiResponse, GroupListParams, GroupRecord, SearchQuery, SearchResultRecord,
    SubmissionPayload, SubmitResponse, SUCCESS_CODE,
};

use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// The three round trips the subscription workflow depends on.
#[async_trait]
pub trait SubscribeApi: Send + Sync {
    /// Search creators by display name. Result order is the server's order.
    async fn search(&self, name: &str) -> Result<Vec<SearchResultRecord>>;

    /// Fetch every group, flagged with whether `entity_id` is currently a member.
    async fn fetch_group_list(&self, entity_id: i64) -> Result<Vec<GroupRecord>>;

    /// Replace the creator's group assignment with `payload.group_ids`.
    async fn submit_subscription(&self, payload: &SubmissionPayload) -> Result<SubmitResponse>;
}

/// HTTP implementation of [`SubscribeApi`].
#[derive(Clone)]
pub struct SubscribeClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl SubscribeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn read<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl SubscribeApi for SubscribeClient {
    async fn search(&self, name: &str) -> Result<Vec<SearchResultRecord>> {
        let query = SearchQuery {
            name: name.to_string(),
        };
        let req = self.client.get(self.url("/subscribe/search")).query(&query);
        let resp = self.authorize(req).send().await?;

        let api_resp: ApiResponse<Vec<SearchResultRecord>> = self.read(resp).await?;
        let records = api_resp.into_data()?;
        tracing::debug!(name, count = records.len(), "Search returned");
        Ok(records)
    }

    async fn fetch_group_list(&self, entity_id: i64) -> Result<Vec<GroupRecord>> {
        let params = GroupListParams { entity_id };
        let req = self.client.get(self.url("/group/list/mid")).query(&params);
        let resp = self.authorize(req).send().await?;

        let api_resp: ApiResponse<Vec<GroupRecord>> = self.read(resp).await?;
        let groups = api_resp.into_data()?;
        tracing::debug!(entity_id, count = groups.len(), "Group list fetched");
        Ok(groups)
    }

    async fn submit_subscription(&self, payload: &SubmissionPayload) -> Result<SubmitResponse> {
        let req = self
            .client
            .post(self.url("/subscribe/do"))
            .form(&payload.form_fields());
        let resp = self.authorize(req).send().await?;

        let submit_resp: SubmitResponse = self.read(resp).await?;
        tracing::info!(
            entity_id = payload.entity_id,
            groups = payload.group_ids.len(),
            code = submit_resp.code,
            "Subscription submitted"
        );
        submit_resp.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = SubscribeClient::new("http://localhost:8000/api/");

        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(
            client.url("/subscribe/search"),
            "http://localhost:8000/api/subscribe/search"
        );
    }

    #[test]
    fn transport_errors_are_network_errors() {
        // An unparseable URL fails inside reqwest before any connection is made.
        let err: ApiError = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err()
            .into();

        assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
        assert!(!err.is_application());
    }
}
