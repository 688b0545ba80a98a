//! End-to-end analysis pipeline
//!
//! Discovery runs to completion first; per-site metric collection and
//! classification then run under a bounded worker pool. Workers are joined
//! in spawn order, so the report sequence always matches discovery order
//! regardless of completion order.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::azure::{MetricsApi, SitesApi};
use crate::classify::{self, classify};
use crate::discovery;
use crate::error::Result;
use crate::metrics::{self, MetricWindow};
use crate::models::{MetricTotals, Tier, TrafficReport};

/// Default number of concurrent per-site metric queries
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Immutable configuration for one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub subscription_id: String,
    /// Optional case-insensitive resource-group filter
    pub resource_group: Option<String>,
    /// Upper bound on concurrent metric queries; 1 means strictly sequential
    pub concurrency: usize,
}

impl AnalysisConfig {
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Run the full pipeline: list sites, query each one's metrics, classify.
///
/// Returns one report per discovered site, in discovery order. Listing
/// failures abort the run; per-site metric failures degrade that site to
/// the Unknown tier.
pub async fn analyze<A>(api: Arc<A>, config: &AnalysisConfig) -> Result<Vec<TrafficReport>>
where
    A: SitesApi + MetricsApi + 'static,
{
    let sites = discovery::list_sites(
        api.as_ref(),
        &config.subscription_id,
        config.resource_group.as_deref(),
    )
    .await?;

    if sites.is_empty() {
        return Ok(Vec::new());
    }

    info!(count = sites.len(), "Querying metrics");

    let window = Arc::new(MetricWindow::trailing());
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let total = sites.len();

    let mut handles = Vec::with_capacity(total);
    for (index, site) in sites.into_iter().enumerate() {
        let api = Arc::clone(&api);
        let window = Arc::clone(&window);
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("semaphore is never closed");
            debug!(site = %site.name, position = index + 1, total = total, "Querying site metrics");
            match metrics::collect_site_totals(api.as_ref(), &site, &window).await {
                Some(totals) => {
                    let (tier, recommendation) = classify(&totals);
                    TrafficReport::new(&site, totals, tier, recommendation)
                }
                None => TrafficReport::new(
                    &site,
                    MetricTotals::default(),
                    Tier::Unknown,
                    classify::RECOMMENDATION_UNKNOWN,
                ),
            }
        }));
    }

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(handle.await?);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::{
        MetricName, MetricSeries, MetricValue, MetricsResponse, SiteEntry, SitePage,
        TimeSeriesElement,
    };
    use crate::error::Error;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    /// One page of sites plus canned metrics per resource ID; unknown IDs fail.
    /// Later sites answer faster than earlier ones to scramble completion order.
    struct FakeAzure {
        sites: Vec<SiteEntry>,
        requests_by_site: HashMap<String, f64>,
    }

    impl FakeAzure {
        fn new(names: &[&str], requests_by_site: &[(&str, f64)]) -> Self {
            let sites = names
                .iter()
                .map(|name| SiteEntry {
                    id: Some(format!(
                        "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Web/sites/{}",
                        name
                    )),
                    name: Some(name.to_string()),
                    kind: Some("app".to_string()),
                    ..SiteEntry::default()
                })
                .collect();
            Self {
                sites,
                requests_by_site: requests_by_site
                    .iter()
                    .map(|(name, requests)| (name.to_string(), *requests))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl SitesApi for FakeAzure {
        async fn sites_page(
            &self,
            _subscription_id: &str,
            _next_link: Option<&str>,
        ) -> Result<SitePage> {
            Ok(SitePage {
                value: self.sites.clone(),
                next_link: None,
            })
        }
    }

    #[async_trait]
    impl MetricsApi for FakeAzure {
        async fn query_metrics(
            &self,
            resource_id: &str,
            _window: &MetricWindow,
        ) -> Result<MetricsResponse> {
            let name = resource_id.rsplit('/').next().unwrap_or_default();
            let position = self
                .sites
                .iter()
                .position(|s| s.name.as_deref() == Some(name))
                .unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(
                20 * (self.sites.len() - position) as u64,
            ))
            .await;

            let requests = self.requests_by_site.get(name).copied().ok_or(Error::Api {
                status: 503,
                body: "metrics unavailable".to_string(),
            })?;
            Ok(MetricsResponse {
                value: vec![MetricSeries {
                    name: Some(MetricName {
                        value: Some("Requests".to_string()),
                    }),
                    timeseries: vec![TimeSeriesElement {
                        data: vec![MetricValue {
                            time_stamp: None,
                            total: Some(requests),
                        }],
                    }],
                }],
            })
        }
    }

    #[tokio::test]
    async fn test_reports_preserve_discovery_order_under_concurrency() {
        let api = Arc::new(FakeAzure::new(
            &["alpha", "beta", "gamma", "delta"],
            &[
                ("alpha", 5000.0),
                ("beta", 50.0),
                ("gamma", 500.0),
                ("delta", 0.0),
            ],
        ));
        let config = AnalysisConfig::new("sub-1");

        let reports = analyze(api, &config).await.unwrap();
        assert_eq!(
            reports.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            ["alpha", "beta", "gamma", "delta"]
        );
        assert_eq!(reports[0].status, Tier::Active);
        assert_eq!(reports[1].status, Tier::LowTraffic);
        assert_eq!(reports[2].status, Tier::LowTraffic);
    }

    #[tokio::test]
    async fn test_one_failing_site_degrades_to_unknown_without_corrupting_siblings() {
        let api = Arc::new(FakeAzure::new(
            &["good", "bad", "also-good"],
            &[("good", 2000.0), ("also-good", 3000.0)],
        ));
        let config = AnalysisConfig::new("sub-1");

        let reports = analyze(api, &config).await.unwrap();
        assert_eq!(reports.len(), 3);

        assert_eq!(reports[0].status, Tier::Active);
        assert_eq!(reports[0].total_requests, 2000.0);

        assert_eq!(reports[1].status, Tier::Unknown);
        assert_eq!(reports[1].total_requests, 0.0);
        assert_eq!(reports[1].bytes_received, 0.0);
        assert_eq!(reports[1].recommendation, classify::RECOMMENDATION_UNKNOWN);

        assert_eq!(reports[2].status, Tier::Active);
        assert_eq!(reports[2].total_requests, 3000.0);
    }

    #[tokio::test]
    async fn test_sequential_concurrency_still_completes() {
        let api = Arc::new(FakeAzure::new(&["one", "two"], &[("one", 1.0), ("two", 2.0)]));
        let mut config = AnalysisConfig::new("sub-1");
        config.concurrency = 1;

        let reports = analyze(api, &config).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].name, "one");
        assert_eq!(reports[1].name, "two");
    }

    #[tokio::test]
    async fn test_empty_subscription_yields_empty_report() {
        let api = Arc::new(FakeAzure::new(&[], &[]));
        let config = AnalysisConfig::new("sub-1");

        let reports = analyze(api, &config).await.unwrap();
        assert!(reports.is_empty());
    }
}
