//! Utilization classification
//!
//! An ordered rule set over the aggregated totals; the first matching rule
//! assigns the tier and recommendation. The 5xx error-rate check runs after
//! tier assignment and only ever appends to the recommendation text.

use crate::models::{MetricTotals, Tier};

/// Recommendation used for the forced-Unknown sentinel when metric
/// retrieval fails for a site
pub const RECOMMENDATION_UNKNOWN: &str = "Could not retrieve metrics";

const RECOMMENDATION_IDLE: &str =
    "No traffic in 14 days. Consider shutting down or deleting to save costs.";
const RECOMMENDATION_VERY_LOW: &str = "Very low traffic. Consider scaling down or consolidating.";
const RECOMMENDATION_LOW: &str = "Low traffic. Review if this app is still needed at current scale.";
const RECOMMENDATION_ACTIVE: &str = "Normal traffic levels.";

/// Requests below this over the window count as very low traffic
const VERY_LOW_REQUESTS: f64 = 100.0;
/// Requests below this over the window count as low traffic
const LOW_REQUESTS: f64 = 1000.0;
/// 5xx percentage above which a warning is appended
const ERROR_RATE_THRESHOLD: f64 = 10.0;

/// Assign a tier and recommendation to a site's totals.
pub fn classify(totals: &MetricTotals) -> (Tier, String) {
    let (tier, recommendation) = if totals.requests == 0.0
        && totals.bytes_received == 0.0
        && totals.bytes_sent == 0.0
    {
        (Tier::Idle, RECOMMENDATION_IDLE)
    } else if totals.requests < VERY_LOW_REQUESTS {
        (Tier::LowTraffic, RECOMMENDATION_VERY_LOW)
    } else if totals.requests < LOW_REQUESTS {
        (Tier::LowTraffic, RECOMMENDATION_LOW)
    } else {
        (Tier::Active, RECOMMENDATION_ACTIVE)
    };

    let mut recommendation = recommendation.to_string();
    if totals.requests > 0.0 {
        let error_rate = totals.http_5xx / totals.requests * 100.0;
        if error_rate > ERROR_RATE_THRESHOLD {
            recommendation.push_str(&format!(" ⚠ High 5xx error rate ({:.1}%).", error_rate));
        }
    }

    (tier, recommendation)
}
