//! Report summary
//!
//! Per-tier counts backing the presenter's summary section.

use serde::Serialize;

use crate::models::{Tier, TrafficReport};

/// Resource counts per tier. Unknown sites count toward the total only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub active: usize,
    pub low_traffic: usize,
    pub idle: usize,
}

impl ReportSummary {
    pub fn of(reports: &[TrafficReport]) -> Self {
        let mut summary = Self {
            total: reports.len(),
            ..Self::default()
        };
        for report in reports {
            match report.status {
                Tier::Active => summary.active += 1,
                Tier::LowTraffic => summary.low_traffic += 1,
                Tier::Idle => summary.idle += 1,
                Tier::Unknown => {}
            }
        }
        summary
    }
}
