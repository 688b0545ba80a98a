//! ARM REST client
//!
//! A thin authenticated wrapper over the management endpoint implementing
//! the site-listing and metrics collaborator traits.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::azure::{MetricsApi, MetricsResponse, SitePage, SitesApi, TokenCredential};
use crate::error::{Error, Result};
use crate::metrics::MetricWindow;

const DEFAULT_BASE_URL: &str = "https://management.azure.com";
const SITES_API_VERSION: &str = "2023-12-01";
const METRICS_API_VERSION: &str = "2018-01-01";

/// Client for the Azure Resource Manager REST API
pub struct ArmClient {
    client: Client,
    base_url: Url,
    credential: Arc<dyn TokenCredential>,
}

impl ArmClient {
    /// Create a client against the public management endpoint
    pub fn new(credential: Arc<dyn TokenCredential>) -> Result<Self> {
        Self::with_base_url(credential, DEFAULT_BASE_URL)
    }

    /// Point the client at a different management endpoint (for tests)
    pub fn with_base_url(credential: Arc<dyn TokenCredential>, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let base_url = Url::parse(base_url)?;

        Ok(Self {
            client,
            base_url,
            credential,
        })
    }

    /// Make an authenticated GET request
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let token = self.credential.token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&token.token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SitesApi for ArmClient {
    async fn sites_page(
        &self,
        subscription_id: &str,
        next_link: Option<&str>,
    ) -> Result<SitePage> {
        let url = match next_link {
            // The continuation link is absolute and already carries the query
            Some(link) => Url::parse(link)?,
            None => {
                let mut url = self.base_url.join(&format!(
                    "subscriptions/{}/providers/Microsoft.Web/sites",
                    subscription_id
                ))?;
                url.query_pairs_mut()
                    .append_pair("api-version", SITES_API_VERSION);
                url
            }
        };

        self.get_json(url).await
    }
}

#[async_trait]
impl MetricsApi for ArmClient {
    async fn query_metrics(
        &self,
        resource_id: &str,
        window: &MetricWindow,
    ) -> Result<MetricsResponse> {
        let mut url = self.base_url.join(&format!(
            "{}/providers/Microsoft.Insights/metrics",
            resource_id.trim_start_matches('/')
        ))?;
        url.query_pairs_mut()
            .append_pair("api-version", METRICS_API_VERSION)
            .append_pair("timespan", &window.timespan())
            .append_pair("metricnames", &window.metric_names())
            .append_pair("aggregation", window.aggregation());

        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::AccessToken;
    use chrono::Utc;
    use mockito::Matcher;

    struct StaticCredential;

    #[async_trait]
    impl TokenCredential for StaticCredential {
        async fn token(&self) -> Result<AccessToken> {
            Ok(AccessToken {
                token: "test-token".to_string(),
                expires_at: Utc::now() + chrono::Duration::hours(1),
            })
        }
    }

    fn client_for(server: &mockito::Server) -> ArmClient {
        ArmClient::with_base_url(Arc::new(StaticCredential), &server.url()).unwrap()
    }

    #[tokio::test]
    async fn test_sites_page_sends_bearer_and_api_version() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/subscriptions/sub-1/providers/Microsoft.Web/sites")
            .match_query(Matcher::UrlEncoded(
                "api-version".into(),
                SITES_API_VERSION.into(),
            ))
            .match_header("authorization", "Bearer test-token")
            .with_body(
                r#"{"value":[{"id":"/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Web/sites/app","name":"app"}]}"#,
            )
            .create_async()
            .await;

        let page = client_for(&server).sites_page("sub-1", None).await.unwrap();
        assert_eq!(page.value.len(), 1);
        assert_eq!(page.value[0].name.as_deref(), Some("app"));
        assert!(page.next_link.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_sites_page_follows_continuation_link() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/paged/sites")
            .match_query(Matcher::UrlEncoded("skipToken".into(), "abc".into()))
            .with_body(r#"{"value":[]}"#)
            .create_async()
            .await;

        let link = format!("{}/paged/sites?skipToken=abc", server.url());
        let page = client_for(&server)
            .sites_page("sub-1", Some(&link))
            .await
            .unwrap();
        assert!(page.value.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_metrics_builds_expected_query() {
        let mut server = mockito::Server::new_async().await;
        let resource_id = "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Web/sites/app";
        let window = MetricWindow::trailing();

        let mock = server
            .mock(
                "GET",
                format!("{}/providers/Microsoft.Insights/metrics", resource_id).as_str(),
            )
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api-version".into(), METRICS_API_VERSION.into()),
                Matcher::UrlEncoded("timespan".into(), window.timespan()),
                Matcher::UrlEncoded(
                    "metricnames".into(),
                    "Requests,BytesReceived,BytesSent,Http2xx,Http4xx,Http5xx".into(),
                ),
                Matcher::UrlEncoded("aggregation".into(), "Total".into()),
            ]))
            .with_body(r#"{"value":[]}"#)
            .create_async()
            .await;

        let response = client_for(&server)
            .query_metrics(resource_id, &window)
            .await
            .unwrap();
        assert!(response.value.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/subscriptions/sub-1/providers/Microsoft.Web/sites")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let err = client_for(&server)
            .sites_page("sub-1", None)
            .await
            .unwrap_err();
        match err {
            Error::Api { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }
}
