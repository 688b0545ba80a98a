//! Aggregation window and metric reduction
//!
//! Every run shares one read-only window spanning the trailing 14 days.
//! Each site gets exactly one metrics query; multi-series responses are
//! reduced to a single scalar total per metric kind.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use tracing::warn;

use crate::azure::{MetricSeries, MetricsApi, MetricsResponse};
use crate::models::{MetricKind, MetricTotals, SiteInfo};

/// Number of trailing days covered by every query
pub const WINDOW_DAYS: i64 = 14;

/// Aggregation applied to every requested metric
const AGGREGATION: &str = "Total";

/// Shared time window for a single pipeline run
#[derive(Debug, Clone)]
pub struct MetricWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl MetricWindow {
    /// Window spanning the trailing `WINDOW_DAYS` days ending now
    pub fn trailing() -> Self {
        Self::ending_at(Utc::now())
    }

    /// Window with an explicit end instant (for tests and reproducibility)
    pub fn ending_at(end: DateTime<Utc>) -> Self {
        Self {
            start: end - Duration::days(WINDOW_DAYS),
            end,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// ISO-8601 interval string accepted by the metrics endpoint
    pub fn timespan(&self) -> String {
        format!(
            "{}/{}",
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }

    /// Comma-joined list of every requested metric name
    pub fn metric_names(&self) -> String {
        MetricKind::ALL.map(|kind| kind.as_str()).join(",")
    }

    pub fn aggregation(&self) -> &'static str {
        AGGREGATION
    }
}

/// Fetch and reduce metrics for one site.
///
/// Failure is isolated here: the site is reported back as `None` and a
/// warning is logged, so one bad resource never aborts the run.
pub async fn collect_site_totals(
    api: &dyn MetricsApi,
    site: &SiteInfo,
    window: &MetricWindow,
) -> Option<MetricTotals> {
    match api.query_metrics(&site.resource_id, window).await {
        Ok(response) => Some(aggregate_totals(&response)),
        Err(error) => {
            warn!(site = %site.name, error = %error, "Failed to get metrics");
            None
        }
    }
}

/// Reduce a metrics response into per-kind totals.
///
/// Metric names this binary does not know are ignored so newer upstream
/// metrics cannot break older binaries; absent metrics stay zero.
pub fn aggregate_totals(response: &MetricsResponse) -> MetricTotals {
    let mut totals = MetricTotals::default();
    for series in &response.value {
        let name = match series.name.as_ref().and_then(|n| n.value.as_deref()) {
            Some(name) => name,
            None => continue,
        };
        let kind = match MetricKind::from_name(name) {
            Some(kind) => kind,
            None => continue,
        };
        totals.record(kind, sum_timeseries(series));
    }
    totals
}

/// Sum every data point's total across all timeseries of one metric.
/// Points without a total contribute zero.
fn sum_timeseries(series: &MetricSeries) -> f64 {
    series
        .timeseries
        .iter()
        .flat_map(|ts| &ts.data)
        .filter_map(|point| point.total)
        .sum()
}
