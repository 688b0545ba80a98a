//! Core library for the App Service traffic analyzer
//!
//! This crate provides:
//! - Web-app discovery across a subscription
//! - 14-day traffic metric aggregation
//! - Utilization classification with recommendations
//! - The end-to-end analysis pipeline
//! - Azure management-plane clients and authentication

pub mod azure;
pub mod classify;
pub mod discovery;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod report;

pub use error::{Error, Result};
pub use models::*;
pub use pipeline::{analyze, AnalysisConfig};
pub use report::ReportSummary;
