//! Azure management-plane collaborators
//!
//! The site-listing and metrics services are modeled as traits so the
//! pipeline can run against in-memory fakes in tests. `ArmClient` is the
//! production implementation speaking the ARM REST API.

mod auth;
mod client;

pub use auth::{AccessToken, ClientSecretCredential, TokenCredential};
pub use client::ArmClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::MetricWindow;

/// Paged listing of web apps in a subscription
#[async_trait]
pub trait SitesApi: Send + Sync {
    /// Fetch one page of sites. `next_link` is `None` for the first page and
    /// the absolute continuation URL from the previous page afterwards.
    async fn sites_page(
        &self,
        subscription_id: &str,
        next_link: Option<&str>,
    ) -> Result<SitePage>;
}

/// Windowed metrics query for a single resource
#[async_trait]
pub trait MetricsApi: Send + Sync {
    async fn query_metrics(
        &self,
        resource_id: &str,
        window: &MetricWindow,
    ) -> Result<MetricsResponse>;
}

// ARM wire types. Fields the provider may omit are optional and unknown
// fields are ignored, matching its loosely-populated payloads.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SitePage {
    #[serde(default)]
    pub value: Vec<SiteEntry>,
    #[serde(rename = "nextLink", skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteEntry {
    pub id: Option<String>,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub properties: Option<SiteProperties>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteProperties {
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsResponse {
    #[serde(default)]
    pub value: Vec<MetricSeries>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricSeries {
    pub name: Option<MetricName>,
    #[serde(default)]
    pub timeseries: Vec<TimeSeriesElement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricName {
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSeriesElement {
    #[serde(default)]
    pub data: Vec<MetricValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricValue {
    #[serde(rename = "timeStamp", skip_serializing_if = "Option::is_none")]
    pub time_stamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}
