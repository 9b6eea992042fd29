#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident, resource, weather and seismic types for the command center feed.
//!
//! These are the canonical data shapes shared by the feed generator, the
//! rule-based analytics, the advisory client and the HTTP contract. Field
//! names serialize in `camelCase` because the dashboard frontend reads them
//! directly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity of an incident.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    /// Minor disruption, no immediate danger.
    Low,
    /// Localized danger, handled by routine response.
    Medium,
    /// Serious danger requiring coordinated response.
    High,
    /// Life-threatening, requires immediate attention.
    Critical,
}

impl Severity {
    /// Returns all variants of this enum, least severe first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High, Self::Critical]
    }
}

/// Lifecycle status of an incident.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum IncidentStatus {
    /// Newly reported, not yet confirmed.
    Reported,
    /// Confirmed and ongoing.
    Active,
    /// Resources are on the way or on scene.
    Responding,
    /// Situation handled.
    Resolved,
    /// Closed out administratively.
    Closed,
    /// Under observation, no active response.
    Monitoring,
}

/// Kind of response unit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ResourceType {
    /// Medical transport.
    Ambulance,
    /// Fire engine crew.
    FireTruck,
    /// Police patrol unit.
    PoliceUnit,
    /// Search and rescue team.
    RescueTeam,
    /// Coast guard vessel crew.
    CoastGuard,
    /// National Disaster Response Force team.
    NdrfTeam,
}

/// Availability of a response unit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResourceStatus {
    /// Ready to be assigned.
    Available,
    /// Assigned to an incident.
    Deployed,
    /// Out of service for maintenance.
    Maintenance,
    /// Unreachable.
    Offline,
    /// Held in reserve.
    Standby,
}

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns this point shifted by the given offsets in degrees.
    #[must_use]
    pub fn offset(self, d_lat: f64, d_lng: f64) -> Self {
        Self {
            lat: self.lat + d_lat,
            lng: self.lng + d_lng,
        }
    }
}

/// An emergency incident tracked by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Unique identifier within the active snapshot.
    pub id: String,
    /// Free-text category label (e.g. `"Flash Flood"`).
    #[serde(rename = "type")]
    pub category: String,
    /// Severity level.
    pub severity: Severity,
    /// Where the incident was reported.
    pub location: GeoPoint,
    /// Free-text description.
    pub description: String,
    /// Current lifecycle status.
    pub status: IncidentStatus,
    /// When the incident was created.
    pub timestamp: DateTime<Utc>,
    /// Ids of resources assigned to this incident. Not checked against the
    /// resource list; dangling ids are tolerated.
    #[serde(default)]
    pub resources_assigned: Vec<String>,
}

/// A response unit tracked by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Unique identifier.
    pub id: String,
    /// Kind of unit.
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Current availability.
    pub status: ResourceStatus,
    /// Last known position.
    pub location: GeoPoint,
    /// Personnel count.
    pub capacity: u32,
    /// Incident this unit is working, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

/// The latest weather observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSample {
    /// Air temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, 0-100 percent.
    pub humidity: f64,
    /// Wind speed in km/h.
    pub wind_speed: f64,
    /// Visibility in km.
    pub visibility: f64,
    /// Barometric pressure in hPa.
    pub pressure: f64,
    /// Condition label (e.g. `"Rainy"`).
    pub condition: String,
}

/// A recorded seismic event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeismicEvent {
    /// Richter magnitude.
    pub magnitude: f64,
    /// Hypocenter depth in km.
    pub depth: f64,
    /// Location label.
    pub location: String,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
}

/// An immutable point-in-time copy of the feed state.
///
/// Collections are shared behind [`Arc`]s. The generator never writes
/// through a shared `Arc`, so a snapshot stays stable after later ticks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Incidents, newest first.
    pub incidents: Arc<Vec<Incident>>,
    /// All tracked resources.
    pub resources: Arc<Vec<Resource>>,
    /// Latest weather sample, if one has been fetched.
    pub weather: Option<WeatherSample>,
    /// Seismic events, most recent first.
    pub seismic: Arc<Vec<SeismicEvent>>,
    /// Whether the feed is live.
    pub connected: bool,
}

impl Snapshot {
    /// Looks up an incident by id.
    #[must_use]
    pub fn incident(&self, id: &str) -> Option<&Incident> {
        self.incidents.iter().find(|i| i.id == id)
    }

    /// Looks up a resource by id.
    #[must_use]
    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Returns the incidents matching `filter`, preserving snapshot order.
    #[must_use]
    pub fn filter_incidents(&self, filter: &IncidentFilter) -> Vec<Incident> {
        self.incidents
            .iter()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect()
    }

    /// Returns resources of the given type, or all resources for `None`.
    #[must_use]
    pub fn resources_of_type(&self, resource_type: Option<ResourceType>) -> Vec<Resource> {
        self.resources
            .iter()
            .filter(|r| resource_type.is_none_or(|t| r.resource_type == t))
            .cloned()
            .collect()
    }
}

/// Status and free-text filter over incidents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentFilter {
    /// Only incidents with this status. `None` matches all.
    pub status: Option<IncidentStatus>,
    /// Case-insensitive substring matched against category and description.
    pub search: Option<String>,
}

impl IncidentFilter {
    /// Returns `true` if the incident passes both the status and search
    /// criteria.
    #[must_use]
    pub fn matches(&self, incident: &Incident) -> bool {
        if self.status.is_some_and(|s| s != incident.status) {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                incident.category.to_lowercase().contains(&term)
                    || incident.description.to_lowercase().contains(&term)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(id: &str, category: &str, status: IncidentStatus) -> Incident {
        Incident {
            id: id.to_string(),
            category: category.to_string(),
            severity: Severity::High,
            location: GeoPoint::new(13.0827, 80.2707),
            description: format!("{category} reported near the harbour"),
            status,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            resources_assigned: Vec::new(),
        }
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("CRITICAL".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!(
            "fire_truck".parse::<ResourceType>().unwrap(),
            ResourceType::FireTruck
        );
        assert_eq!(
            "Monitoring".parse::<IncidentStatus>().unwrap(),
            IncidentStatus::Monitoring
        );
        assert!("severe".parse::<Severity>().is_err());
    }

    #[test]
    fn incident_serializes_category_as_type() {
        let json = serde_json::to_value(incident("INC001", "Flash Flood", IncidentStatus::Active))
            .unwrap();
        assert_eq!(json["type"], "Flash Flood");
        assert_eq!(json["status"], "active");
        assert_eq!(json["severity"], "high");
        assert!(json["resourcesAssigned"].as_array().unwrap().is_empty());
    }

    #[test]
    fn filter_matches_status_and_search() {
        let flood = incident("A", "Flash Flood", IncidentStatus::Active);
        let leak = incident("B", "Gas Leak", IncidentStatus::Responding);

        let by_status = IncidentFilter {
            status: Some(IncidentStatus::Active),
            search: None,
        };
        assert!(by_status.matches(&flood));
        assert!(!by_status.matches(&leak));

        let by_search = IncidentFilter {
            status: None,
            search: Some("  HARBOUR ".to_string()),
        };
        assert!(by_search.matches(&flood));
        assert!(by_search.matches(&leak));

        let both = IncidentFilter {
            status: Some(IncidentStatus::Responding),
            search: Some("flood".to_string()),
        };
        assert!(!both.matches(&flood));
        assert!(!both.matches(&leak));
    }

    #[test]
    fn snapshot_lookups() {
        let snapshot = Snapshot {
            incidents: Arc::new(vec![incident("A", "Flood", IncidentStatus::Active)]),
            resources: Arc::new(vec![Resource {
                id: "RES001".to_string(),
                resource_type: ResourceType::Ambulance,
                status: ResourceStatus::Available,
                location: GeoPoint::new(11.0, 77.0),
                capacity: 2,
                assigned_to: None,
            }]),
            weather: None,
            seismic: Arc::new(Vec::new()),
            connected: true,
        };

        assert!(snapshot.incident("A").is_some());
        assert!(snapshot.incident("Z").is_none());
        assert_eq!(snapshot.resources_of_type(None).len(), 1);
        assert!(
            snapshot
                .resources_of_type(Some(ResourceType::CoastGuard))
                .is_empty()
        );
    }
}
