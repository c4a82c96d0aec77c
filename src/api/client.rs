//! Sentiment API REST Client
//!
//! HTTP client for the sentiment-analysis backend's read endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::dto::{
    AggregateQuery, AggregateResponse, Distribution, DistributionQuery, DistributionResponse,
    HealthReport, PostPage, PostQuery, PostsResponse,
};
use super::error::{FetchError, FetchResult};
use super::{Endpoint, SentimentSource};
use crate::config::ApiConfig;
use crate::model::TrendPoint;

/// REST client for the sentiment API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the configured base URL (e.g. `http://localhost:8000/api`)
    pub fn new(config: &ApiConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("sentiview/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn send(
        &self,
        endpoint: Endpoint,
        params: &[(&'static str, String)],
    ) -> FetchResult<reqwest::Response> {
        let url = self.url(endpoint);

        tracing::debug!(%url, ?params, "GET");

        self.client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| FetchError::from_send(e, &url))
    }

    /// GET an endpoint and decode its JSON body
    ///
    /// The body is read as text first so that a non-JSON body is reported as a
    /// parse failure rather than a transport failure.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &[(&'static str, String)],
    ) -> FetchResult<T> {
        let response = self.send(endpoint, params).await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                endpoint,
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| FetchError::Parse { endpoint, source })
    }

    /// Fetch the health report, accepting an unhealthy (503) answer that still carries a body
    pub async fn health_report(&self) -> FetchResult<HealthReport> {
        let response = self.send(Endpoint::Health, &[]).await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<HealthReport>(&body) {
            Ok(report) => Ok(report),
            Err(_) if !status.is_success() => Err(FetchError::Status {
                endpoint: Endpoint::Health,
                status: status.as_u16(),
                message: body,
            }),
            Err(source) => Err(FetchError::Parse {
                endpoint: Endpoint::Health,
                source,
            }),
        }
    }
}

#[async_trait]
impl SentimentSource for ApiClient {
    async fn fetch_distribution(&self, query: &DistributionQuery) -> FetchResult<Distribution> {
        let resp: DistributionResponse = self
            .get_json(Endpoint::Distribution, &query.to_params())
            .await?;
        Ok(resp.into())
    }

    async fn fetch_aggregate(&self, query: &AggregateQuery) -> FetchResult<Vec<TrendPoint>> {
        let resp: AggregateResponse = self
            .get_json(Endpoint::Aggregate, &query.to_params())
            .await?;
        Ok(resp.into_points())
    }

    async fn fetch_posts(&self, query: &PostQuery) -> FetchResult<PostPage> {
        let resp: PostsResponse = self.get_json(Endpoint::Posts, &query.to_params()).await?;
        Ok(resp.into())
    }

    async fn health_check(&self) -> FetchResult<()> {
        let response = self.send(Endpoint::Health, &[]).await?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            Err(FetchError::Status {
                endpoint: Endpoint::Health,
                status: status.as_u16(),
                message: String::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/api/".to_string(),
            ..ApiConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(
            client.url(Endpoint::Distribution),
            "http://localhost:8000/api/sentiment/distribution"
        );
    }

    #[tokio::test]
    async fn test_unreachable_api_is_network_failure() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9/api".to_string(),
            request_timeout_secs: 2,
        };
        let client = ApiClient::new(&config).unwrap();
        let err = client.health_check().await.unwrap_err();
        assert_eq!(err.kind(), crate::api::FailureKind::Network);
    }
}
