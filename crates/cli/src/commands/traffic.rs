//! App Service traffic analysis command

use std::sync::Arc;

use analyzer_lib::azure::{MetricsApi, SitesApi};
use analyzer_lib::pipeline::{self, AnalysisConfig};
use analyzer_lib::{ReportSummary, Tier, TrafficReport};
use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::output::{format_bytes, print_warning, tier_cell, OutputFormat};

/// Row for the traffic table
#[derive(Tabled)]
struct TrafficRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Resource Group")]
    resource_group: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Requests")]
    requests: String,
    #[tabled(rename = "RX")]
    received: String,
    #[tabled(rename = "TX")]
    sent: String,
    #[tabled(rename = "2xx")]
    http_2xx: String,
    #[tabled(rename = "4xx")]
    http_4xx: String,
    #[tabled(rename = "5xx")]
    http_5xx: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Run the analysis pipeline and render the report
pub async fn appservice_traffic<A>(
    api: Arc<A>,
    config: &AnalysisConfig,
    format: OutputFormat,
) -> Result<()>
where
    A: SitesApi + MetricsApi + 'static,
{
    let reports = pipeline::analyze(api, config).await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&reports)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            if reports.is_empty() {
                print_warning("No App Services found");
                return Ok(());
            }
            print_report(&reports);
        }
    }

    Ok(())
}

fn print_report(reports: &[TrafficReport]) {
    println!();
    println!("{}", "APP SERVICE TRAFFIC ANALYSIS (Last 14 Days)".bold());

    let rows: Vec<TrafficRow> = reports
        .iter()
        .map(|r| TrafficRow {
            name: r.name.clone(),
            resource_group: r.resource_group.clone(),
            state: r.state.clone(),
            requests: format!("{:.0}", r.total_requests),
            received: format_bytes(r.bytes_received),
            sent: format_bytes(r.bytes_sent),
            http_2xx: format!("{:.0}", r.http_2xx),
            http_4xx: format!("{:.0}", r.http_4xx),
            http_5xx: format!("{:.0}", r.http_5xx),
            status: tier_cell(r.status),
        })
        .collect();

    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);

    let summary = ReportSummary::of(reports);
    println!();
    println!("{}", "SUMMARY".bold());
    println!("{}", "-".repeat(40));
    println!("  Total App Services: {}", summary.total);
    println!("  Active:             {}", summary.active);
    println!("  Low Traffic:        {}", summary.low_traffic);
    println!("  Idle/Unused:        {}", summary.idle);

    let flagged: Vec<&TrafficReport> = reports
        .iter()
        .filter(|r| r.status != Tier::Active)
        .collect();
    if !flagged.is_empty() {
        println!();
        println!("{}", "RECOMMENDATIONS".bold());
        println!("{}", "-".repeat(40));
        for report in flagged {
            println!("  • {}: {}", report.name.cyan(), report.recommendation);
        }
    }
    println!();
}
