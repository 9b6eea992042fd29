#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types for the rule-based predictive engine and dashboard metrics.

use command_center_feed_models::Severity;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A deterministic, threshold-based prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Stable rule identifier (e.g. `"PRED001"`).
    pub id: String,
    /// Human-readable event type (e.g. `"High Wind Event"`).
    #[serde(rename = "type")]
    pub prediction_type: String,
    /// Likelihood in percent.
    pub probability: u8,
    /// When the event is expected.
    pub timeframe: String,
    /// Expected severity.
    pub severity: Severity,
    /// Why the rule fired.
    pub description: String,
    /// Suggested responses.
    pub recommended_actions: Vec<String>,
}

/// One row of the risk factor breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    /// Factor name.
    pub name: String,
    /// Risk in percent, 0-100.
    pub risk: f64,
    /// Short status label (e.g. `"High"`, `"Normal"`).
    pub status: String,
}

/// Rule predictions plus the risk factor breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReport {
    /// Rules that fired, in rule order.
    pub predictions: Vec<Prediction>,
    /// Risk factor breakdown.
    pub risk_factors: Vec<RiskFactor>,
}

/// Counts of resources by status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStats {
    /// All resources.
    pub total: usize,
    /// Resources with status deployed.
    pub deployed: usize,
    /// Resources with status available.
    pub available: usize,
    /// Resources with status maintenance.
    pub maintenance: usize,
    /// Deployed share in percent, `0.0` when there are no resources.
    pub deployment_rate: f64,
}

/// Health of a dashboard subsystem.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubsystemStatus {
    /// Working normally.
    Operational,
    /// Reachable but behind or partially failing.
    Degraded,
}

/// Headline figures for the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// Incidents with status active.
    pub active_incidents: usize,
    /// Incidents with severity critical.
    pub critical_alerts: usize,
    /// Resource breakdown.
    pub resources: ResourceStats,
    /// Feed health, degraded when the feed is disconnected.
    pub data_feeds: SubsystemStatus,
}
