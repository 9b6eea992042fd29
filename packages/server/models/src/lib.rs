#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the command center server.
//!
//! Feed and advisory types are serialized as-is; the types here cover the
//! query parameters, request bodies, and the envelopes the server adds.

use chrono::{DateTime, Utc};
use command_center_ai_models::AdvisoryResult;
use command_center_feed_models::{IncidentStatus, ResourceType, SeismicEvent};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Always `true` when the server responds.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Whether the feed timer is running.
    pub feed_running: bool,
    /// Whether advisory analysis is configured.
    pub ai_enabled: bool,
}

/// Error body returned with 4xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable description.
    pub error: String,
}

/// Query parameters for the incidents endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentQueryParams {
    /// Only incidents with this status.
    pub status: Option<IncidentStatus>,
    /// Case-insensitive substring of category or description.
    pub search: Option<String>,
}

/// Query parameters for the resources endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceQueryParams {
    /// Only resources of this type.
    #[serde(rename = "type")]
    pub resource_type: Option<ResourceType>,
}

/// Body of `POST /api/incidents/{id}/assign`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    /// Resource to deploy to the incident.
    pub resource_id: String,
}

/// Body of `PUT /api/incidents/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    /// New status.
    pub status: IncidentStatus,
}

/// Body of `POST /api/seismic`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeismicReport {
    /// Richter magnitude.
    pub magnitude: f64,
    /// Depth in kilometres.
    pub depth: f64,
    /// Region name.
    pub location: String,
    /// When it occurred. Defaults to the time of the request.
    pub timestamp: Option<DateTime<Utc>>,
}

impl SeismicReport {
    /// Converts the report into an event, stamping it with `now` if no
    /// timestamp was supplied.
    #[must_use]
    pub fn into_event(self, now: DateTime<Utc>) -> SeismicEvent {
        SeismicEvent {
            magnitude: self.magnitude,
            depth: self.depth,
            location: self.location,
            timestamp: self.timestamp.unwrap_or(now),
        }
    }
}

/// Latest advisory state as seen by the dashboard.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Whether advisory analysis is configured at all.
    pub enabled: bool,
    /// A refresh is in flight.
    pub refreshing: bool,
    /// Latest structured advisory.
    pub advisory: Option<AdvisoryResult>,
    /// Latest free-text prediction.
    pub prediction: Option<String>,
    /// The last refresh failed before producing results.
    pub error: bool,
    /// When the last refresh completed.
    pub last_updated: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_query_reads_type_key() {
        let params: ResourceQueryParams =
            serde_json::from_str(r#"{"type":"fire_truck"}"#).unwrap();
        assert_eq!(params.resource_type, Some(ResourceType::FireTruck));
    }

    #[test]
    fn seismic_report_defaults_timestamp() {
        let now = DateTime::<Utc>::UNIX_EPOCH;
        let report: SeismicReport =
            serde_json::from_str(r#"{"magnitude":2.4,"depth":8.0,"location":"Nilgiris"}"#).unwrap();
        let event = report.into_event(now);
        assert_eq!(event.timestamp, now);
        assert_eq!(event.location, "Nilgiris");
    }

    #[test]
    fn analysis_report_serializes_in_camel_case() {
        let json = serde_json::to_value(AnalysisReport::default()).unwrap();
        assert_eq!(json["enabled"], false);
        assert!(json["lastUpdated"].is_null());
    }
}
