//! Dashboard headline figures and the risk factor breakdown.

use command_center_analytics_models::{
    DashboardMetrics, ResourceStats, RiskFactor, SubsystemStatus,
};
use command_center_feed_models::{
    Incident, IncidentStatus, Resource, ResourceStatus, Severity, Snapshot, WeatherSample,
};

use crate::rules::HIGH_WIND_THRESHOLD;

/// Baseline risk reported for communication systems, which the feed does
/// not monitor.
const COMMUNICATION_RISK: f64 = 15.0;

/// Counts resources by status.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn resource_stats(resources: &[Resource]) -> ResourceStats {
    let count = |status: ResourceStatus| resources.iter().filter(|r| r.status == status).count();

    let total = resources.len();
    let deployed = count(ResourceStatus::Deployed);

    ResourceStats {
        total,
        deployed,
        available: count(ResourceStatus::Available),
        maintenance: count(ResourceStatus::Maintenance),
        deployment_rate: if total == 0 {
            0.0
        } else {
            deployed as f64 / total as f64 * 100.0
        },
    }
}

/// Computes the dashboard header figures for a snapshot.
#[must_use]
pub fn dashboard_metrics(snapshot: &Snapshot) -> DashboardMetrics {
    DashboardMetrics {
        active_incidents: snapshot
            .incidents
            .iter()
            .filter(|i| i.status == IncidentStatus::Active)
            .count(),
        critical_alerts: snapshot
            .incidents
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .count(),
        resources: resource_stats(&snapshot.resources),
        data_feeds: if snapshot.connected {
            SubsystemStatus::Operational
        } else {
            SubsystemStatus::Degraded
        },
    }
}

/// Breaks current risk down into weather, incident density, resource
/// availability and communications.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn risk_factors(weather: Option<&WeatherSample>, incidents: &[Incident]) -> Vec<RiskFactor> {
    let n = incidents.len();
    let density = (n as f64 * 10.0).min(100.0);
    let availability = 100.0 - (n as f64 * 15.0).min(100.0);

    vec![
        RiskFactor {
            name: "Weather Conditions".to_string(),
            risk: weather.map_or(0.0, |w| ((w.wind_speed + w.humidity) / 2.0).min(90.0)),
            status: if weather.is_some_and(|w| w.wind_speed > HIGH_WIND_THRESHOLD) {
                "High"
            } else {
                "Normal"
            }
            .to_string(),
        },
        RiskFactor {
            name: "Incident Density".to_string(),
            risk: density,
            status: if n > 5 { "High" } else { "Normal" }.to_string(),
        },
        RiskFactor {
            name: "Resource Availability".to_string(),
            risk: availability,
            status: if n < 3 { "Good" } else { "Limited" }.to_string(),
        },
        RiskFactor {
            name: "Communication Systems".to_string(),
            risk: COMMUNICATION_RISK,
            status: "Operational".to_string(),
        },
    ]
}
