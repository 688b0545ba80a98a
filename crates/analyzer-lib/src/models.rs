//! Core data models for the traffic analyzer

use std::fmt;

use serde::{Deserialize, Serialize};

/// A web app discovered in the subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteInfo {
    pub name: String,
    pub resource_id: String,
    pub resource_group: String,
    pub kind: String,
    pub state: String,
}

/// The traffic metrics requested for every site, in request order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Requests,
    BytesReceived,
    BytesSent,
    Http2xx,
    Http4xx,
    Http5xx,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        MetricKind::Requests,
        MetricKind::BytesReceived,
        MetricKind::BytesSent,
        MetricKind::Http2xx,
        MetricKind::Http4xx,
        MetricKind::Http5xx,
    ];

    /// The metric name used by the metrics service
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Requests => "Requests",
            MetricKind::BytesReceived => "BytesReceived",
            MetricKind::BytesSent => "BytesSent",
            MetricKind::Http2xx => "Http2xx",
            MetricKind::Http4xx => "Http4xx",
            MetricKind::Http5xx => "Http5xx",
        }
    }

    /// Map a metric name from a response back to its kind.
    /// Names this binary does not know are ignored by callers.
    pub fn from_name(name: &str) -> Option<MetricKind> {
        match name {
            "Requests" => Some(MetricKind::Requests),
            "BytesReceived" => Some(MetricKind::BytesReceived),
            "BytesSent" => Some(MetricKind::BytesSent),
            "Http2xx" => Some(MetricKind::Http2xx),
            "Http4xx" => Some(MetricKind::Http4xx),
            "Http5xx" => Some(MetricKind::Http5xx),
            _ => None,
        }
    }
}

/// Per-site metric totals over the aggregation window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricTotals {
    pub requests: f64,
    pub bytes_received: f64,
    pub bytes_sent: f64,
    pub http_2xx: f64,
    pub http_4xx: f64,
    pub http_5xx: f64,
}

impl MetricTotals {
    /// Store a summed total under its kind
    pub fn record(&mut self, kind: MetricKind, total: f64) {
        match kind {
            MetricKind::Requests => self.requests = total,
            MetricKind::BytesReceived => self.bytes_received = total,
            MetricKind::BytesSent => self.bytes_sent = total,
            MetricKind::Http2xx => self.http_2xx = total,
            MetricKind::Http4xx => self.http_4xx = total,
            MetricKind::Http5xx => self.http_5xx = total,
        }
    }
}

/// Utilization tier assigned to a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Active,
    #[serde(rename = "Low Traffic")]
    LowTraffic,
    #[serde(rename = "Idle/Unused")]
    Idle,
    Unknown,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::Active => "Active",
            Tier::LowTraffic => "Low Traffic",
            Tier::Idle => "Idle/Unused",
            Tier::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// One line of the final report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficReport {
    pub name: String,
    pub resource_group: String,
    pub kind: String,
    pub state: String,
    pub total_requests: f64,
    pub bytes_received: f64,
    pub bytes_sent: f64,
    pub http_2xx: f64,
    pub http_4xx: f64,
    pub http_5xx: f64,
    pub status: Tier,
    pub recommendation: String,
}

impl TrafficReport {
    /// Assemble the report line for one site
    pub fn new(
        site: &SiteInfo,
        totals: MetricTotals,
        status: Tier,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            name: site.name.clone(),
            resource_group: site.resource_group.clone(),
            kind: site.kind.clone(),
            state: site.state.clone(),
            total_requests: totals.requests,
            bytes_received: totals.bytes_received,
            bytes_sent: totals.bytes_sent,
            http_2xx: totals.http_2xx,
            http_4xx: totals.http_4xx,
            http_5xx: totals.http_5xx,
            status,
            recommendation: recommendation.into(),
        }
    }
}
