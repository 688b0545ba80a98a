//! Web-app discovery
//!
//! Pages through every App Service site in the subscription, normalizes
//! each entry, and applies the optional resource-group filter client-side.

use tracing::{debug, info};

use crate::azure::{SiteEntry, SitesApi};
use crate::error::Result;
use crate::models::SiteInfo;

/// List every web app in the subscription, in listing order.
///
/// The filter is a case-insensitive exact match on the derived resource
/// group; an empty filter keeps everything. Any page failure aborts the
/// whole listing.
pub async fn list_sites(
    api: &dyn SitesApi,
    subscription_id: &str,
    resource_group: Option<&str>,
) -> Result<Vec<SiteInfo>> {
    info!(subscription = %subscription_id, "Listing App Services");

    let mut sites = Vec::new();
    let mut next_link: Option<String> = None;
    loop {
        let page = api.sites_page(subscription_id, next_link.as_deref()).await?;
        for entry in page.value {
            match normalize_entry(entry) {
                Some(site) if matches_group(&site, resource_group) => sites.push(site),
                Some(site) => {
                    debug!(site = %site.name, resource_group = %site.resource_group, "Filtered out")
                }
                None => debug!("Skipping entry without name or resource ID"),
            }
        }
        next_link = page.next_link;
        if next_link.is_none() {
            break;
        }
    }

    info!(count = sites.len(), "Discovered App Services");
    Ok(sites)
}

/// Entries without a name or a fully-qualified ID are unusable and skipped.
fn normalize_entry(entry: SiteEntry) -> Option<SiteInfo> {
    let name = entry.name?;
    let resource_id = entry.id?;
    let resource_group = extract_resource_group(&resource_id);
    Some(SiteInfo {
        name,
        resource_group,
        resource_id,
        kind: entry.kind.unwrap_or_default(),
        state: entry.properties.and_then(|p| p.state).unwrap_or_default(),
    })
}

fn matches_group(site: &SiteInfo, filter: Option<&str>) -> bool {
    match filter {
        Some(group) if !group.is_empty() => site.resource_group.eq_ignore_ascii_case(group),
        _ => true,
    }
}

/// The resource group is the path segment following the `resourceGroups`
/// literal in the resource ID, matched case-insensitively. IDs without the
/// segment yield an empty group.
pub fn extract_resource_group(resource_id: &str) -> String {
    let mut segments = resource_id.split('/');
    while let Some(segment) = segments.next() {
        if segment.eq_ignore_ascii_case("resourceGroups") {
            return segments.next().unwrap_or_default().to_string();
        }
    }
    String::new()
}
