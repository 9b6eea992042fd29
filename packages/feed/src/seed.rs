//! Compile-time embedded seed data for a freshly started feed.
//!
//! The seed file is embedded with `include_str!` and parsed on demand.
//! Timestamps are stored as minute offsets and resolved against the
//! generator's clock, so the seeded incidents always look recent.

use chrono::{DateTime, Duration, Utc};
use command_center_feed_models::{
    GeoPoint, Incident, IncidentStatus, Resource, ResourceStatus, ResourceType, SeismicEvent,
    Severity,
};
use serde::Deserialize;

use crate::FeedError;

const SEED_TOML: &str = include_str!("../seed/tamil_nadu.toml");

/// Parsed seed state with timestamps resolved.
#[derive(Debug, Clone)]
pub struct Seed {
    /// Incidents, newest first.
    pub incidents: Vec<Incident>,
    /// Resources in declaration order.
    pub resources: Vec<Resource>,
    /// Seismic events, most recent first.
    pub seismic: Vec<SeismicEvent>,
}

#[derive(Deserialize)]
struct SeedFile {
    incidents: Vec<SeedIncident>,
    resources: Vec<SeedResource>,
    seismic: Vec<SeedSeismic>,
}

#[derive(Deserialize)]
struct SeedIncident {
    id: String,
    #[serde(rename = "type")]
    category: String,
    severity: Severity,
    location: GeoPoint,
    description: String,
    status: IncidentStatus,
    minutes_ago: i64,
    #[serde(default)]
    resources_assigned: Vec<String>,
}

#[derive(Deserialize)]
struct SeedResource {
    id: String,
    #[serde(rename = "type")]
    resource_type: ResourceType,
    status: ResourceStatus,
    location: GeoPoint,
    capacity: u32,
    assigned_to: Option<String>,
}

#[derive(Deserialize)]
struct SeedSeismic {
    magnitude: f64,
    depth: f64,
    location: String,
    minutes_ago: i64,
}

/// Loads the embedded seed, resolving relative timestamps against `now`.
///
/// # Errors
///
/// Returns [`FeedError::Seed`] if the embedded TOML is malformed.
pub fn load(now: DateTime<Utc>) -> Result<Seed, FeedError> {
    let file: SeedFile = toml::from_str(SEED_TOML)?;

    let mut incidents: Vec<Incident> = file
        .incidents
        .into_iter()
        .map(|i| Incident {
            id: i.id,
            category: i.category,
            severity: i.severity,
            location: i.location,
            description: i.description,
            status: i.status,
            timestamp: now - Duration::minutes(i.minutes_ago),
            resources_assigned: i.resources_assigned,
        })
        .collect();
    incidents.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut seismic: Vec<SeismicEvent> = file
        .seismic
        .into_iter()
        .map(|s| SeismicEvent {
            magnitude: s.magnitude,
            depth: s.depth,
            location: s.location,
            timestamp: now - Duration::minutes(s.minutes_ago),
        })
        .collect();
    seismic.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    Ok(Seed {
        incidents,
        resources: file
            .resources
            .into_iter()
            .map(|r| Resource {
                id: r.id,
                resource_type: r.resource_type,
                status: r.status,
                location: r.location,
                capacity: r.capacity,
                assigned_to: r.assigned_to,
            })
            .collect(),
        seismic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_embedded_seed() {
        let seed = load(Utc::now()).unwrap();
        assert_eq!(seed.incidents.len(), 4);
        assert_eq!(seed.resources.len(), 7);
        assert_eq!(seed.seismic.len(), 2);
    }

    #[test]
    fn ids_are_unique() {
        let seed = load(Utc::now()).unwrap();
        let mut seen = BTreeSet::new();
        for incident in &seed.incidents {
            assert!(seen.insert(&incident.id), "Duplicate id: {}", incident.id);
        }
        for resource in &seed.resources {
            assert!(seen.insert(&resource.id), "Duplicate id: {}", resource.id);
        }
    }

    #[test]
    fn timestamps_resolve_newest_first() {
        let now = DateTime::<Utc>::UNIX_EPOCH + Duration::days(365);
        let seed = load(now).unwrap();
        assert_eq!(seed.incidents[0].id, "INC001");
        assert_eq!(seed.incidents[0].timestamp, now);
        assert_eq!(seed.incidents[3].timestamp, now - Duration::minutes(15));
        assert!((seed.seismic[0].magnitude - 3.2).abs() < f64::EPSILON);
    }

    #[test]
    fn deployed_resources_reference_seeded_incidents() {
        let seed = load(Utc::now()).unwrap();
        for resource in seed.resources.iter().filter(|r| r.assigned_to.is_some()) {
            let target = resource.assigned_to.as_deref().unwrap();
            assert!(
                seed.incidents.iter().any(|i| i.id == target),
                "{} assigned to unknown incident {target}",
                resource.id
            );
        }
    }
}
