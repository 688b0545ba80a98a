//! App Service Traffic Analyzer CLI
//!
//! A command-line tool that inventories the App Services in an Azure
//! subscription, aggregates their 14-day traffic metrics, and classifies
//! each one with a cost/operational recommendation.

mod commands;
mod config;
mod output;

use std::sync::Arc;

use analyzer_lib::azure::{ArmClient, ClientSecretCredential};
use analyzer_lib::pipeline::{AnalysisConfig, DEFAULT_CONCURRENCY};
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// App Service Traffic Analyzer CLI
#[derive(Parser)]
#[command(name = "azta")]
#[command(author, version, about = "Azure subscription analysis and recommendations", long_about = None)]
pub struct Cli {
    /// Output format (defaults to the config file's default_format, then table)
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze Azure resources for insights and recommendations
    #[command(subcommand)]
    Analyze(AnalyzeCommands),
}

#[derive(Subcommand)]
pub enum AnalyzeCommands {
    /// Analyze App Service network traffic over the last 14 days
    AppserviceTraffic {
        /// Azure subscription ID (overrides AZURE_SUBSCRIPTION_ID env var)
        #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
        subscription_id: Option<String>,

        /// Filter by resource group (optional)
        #[arg(long, short)]
        resource_group: Option<String>,

        /// Maximum number of concurrent metric queries
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries only the report
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let file_config = config::Config::load().unwrap_or_default();
    let format = cli
        .format
        .or_else(|| {
            file_config
                .default_format
                .as_deref()
                .and_then(output::OutputFormat::from_name)
        })
        .unwrap_or_default();

    match cli.command {
        Commands::Analyze(analyze_cmd) => match analyze_cmd {
            AnalyzeCommands::AppserviceTraffic {
                subscription_id,
                resource_group,
                concurrency,
            } => {
                let subscription_id = resolve_subscription(subscription_id, &file_config)?;

                let credential = Arc::new(ClientSecretCredential::from_env()?);
                let client = Arc::new(ArmClient::new(credential)?);

                let mut analysis = AnalysisConfig::new(subscription_id);
                analysis.resource_group = resource_group;
                analysis.concurrency = concurrency;

                commands::traffic::appservice_traffic(client, &analysis, format).await?;
            }
        },
    }

    Ok(())
}

/// Subscription resolution order: flag, then environment (merged by clap),
/// then the config file default. Absence is a fatal configuration error.
fn resolve_subscription(flag: Option<String>, config: &config::Config) -> Result<String> {
    flag.filter(|value| !value.is_empty())
        .or_else(|| config.default_subscription.clone())
        .ok_or_else(|| analyzer_lib::Error::MissingSubscription.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_subscription_prefers_flag() {
        let config = config::Config {
            default_subscription: Some("from-config".to_string()),
            ..config::Config::default()
        };
        let resolved = resolve_subscription(Some("from-flag".to_string()), &config).unwrap();
        assert_eq!(resolved, "from-flag");
    }

    #[test]
    fn test_resolve_subscription_ignores_empty_flag() {
        let config = config::Config {
            default_subscription: Some("from-config".to_string()),
            ..config::Config::default()
        };
        let resolved = resolve_subscription(Some(String::new()), &config).unwrap();
        assert_eq!(resolved, "from-config");
    }

    #[test]
    fn test_resolve_subscription_fails_without_any_source() {
        let result = resolve_subscription(None, &config::Config::default());
        assert!(result.is_err());
    }
}
