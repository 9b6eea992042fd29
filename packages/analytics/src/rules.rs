//! Threshold rules that turn current conditions into predictions.
//!
//! | Rule    | Fires when                                           |
//! |---------|------------------------------------------------------|
//! | PRED001 | wind speed above 25 km/h                             |
//! | PRED002 | humidity above 85 % and temperature above 20 C       |
//! | PRED003 | more than one flood incident in the last hour        |
//! | PRED004 | most recent seismic event above magnitude 1.5        |

use chrono::{DateTime, Duration, Utc};
use command_center_analytics_models::Prediction;
use command_center_feed_models::{Incident, SeismicEvent, Severity, WeatherSample};

/// Wind speed (km/h) above which a high wind event is predicted.
pub const HIGH_WIND_THRESHOLD: f64 = 25.0;
/// Humidity (%) above which flash flooding becomes likely.
pub const FLASH_FLOOD_HUMIDITY: f64 = 85.0;
/// Temperature (C) above which flash flooding becomes likely.
pub const FLASH_FLOOD_TEMPERATURE: f64 = 20.0;
/// Magnitude above which aftershocks are predicted.
pub const AFTERSHOCK_MAGNITUDE: f64 = 1.5;

fn flood_window() -> Duration {
    Duration::hours(1)
}

fn prediction(
    id: &str,
    prediction_type: &str,
    probability: u8,
    timeframe: &str,
    severity: Severity,
    description: &str,
    actions: [&str; 3],
) -> Prediction {
    Prediction {
        id: id.to_string(),
        prediction_type: prediction_type.to_string(),
        probability,
        timeframe: timeframe.to_string(),
        severity,
        description: description.to_string(),
        recommended_actions: actions.iter().map(ToString::to_string).collect(),
    }
}

/// Returns `PRED001` if wind exceeds [`HIGH_WIND_THRESHOLD`].
#[must_use]
pub fn high_wind(weather: &WeatherSample) -> Option<Prediction> {
    (weather.wind_speed > HIGH_WIND_THRESHOLD).then(|| {
        prediction(
            "PRED001",
            "High Wind Event",
            78,
            "Next 6 hours",
            Severity::Medium,
            "Strong winds may cause power outages and structural damage",
            [
                "Pre-position utility crews",
                "Issue public safety advisory",
                "Check emergency shelter readiness",
            ],
        )
    })
}

/// Returns `PRED002` if both humidity and temperature exceed their
/// thresholds.
#[must_use]
pub fn flash_flood(weather: &WeatherSample) -> Option<Prediction> {
    (weather.humidity > FLASH_FLOOD_HUMIDITY && weather.temperature > FLASH_FLOOD_TEMPERATURE)
        .then(|| {
            prediction(
                "PRED002",
                "Flash Flood Risk",
                65,
                "Next 12 hours",
                Severity::High,
                "High humidity and temperature increase flood probability",
                [
                    "Monitor river levels",
                    "Prepare evacuation routes",
                    "Alert low-lying area residents",
                ],
            )
        })
}

/// Returns `PRED003` if more than one incident whose category mentions
/// "flood" was created within the last hour.
#[must_use]
pub fn flood_escalation(incidents: &[Incident], now: DateTime<Utc>) -> Option<Prediction> {
    let recent_floods = incidents
        .iter()
        .filter(|i| i.category.to_lowercase().contains("flood"))
        .filter(|i| now.signed_duration_since(i.timestamp) < flood_window())
        .count();

    (recent_floods > 1).then(|| {
        prediction(
            "PRED003",
            "Flood Escalation",
            84,
            "Next 3 hours",
            Severity::Critical,
            "Multiple flood incidents suggest widespread flooding event",
            [
                "Activate emergency coordination center",
                "Deploy all available water rescue teams",
                "Issue evacuation orders for flood zones",
            ],
        )
    })
}

/// Returns `PRED004` if the most recent seismic event exceeds
/// [`AFTERSHOCK_MAGNITUDE`].
#[must_use]
pub fn aftershock(seismic: &[SeismicEvent]) -> Option<Prediction> {
    seismic
        .first()
        .filter(|e| e.magnitude > AFTERSHOCK_MAGNITUDE)
        .map(|_| {
            prediction(
                "PRED004",
                "Aftershock Sequence",
                42,
                "Next 24 hours",
                Severity::Low,
                "Minor aftershocks possible following recent seismic activity",
                [
                    "Monitor structural integrity",
                    "Brief search and rescue teams",
                    "Check emergency communication systems",
                ],
            )
        })
}

/// Evaluates all rules in order and returns those that fired.
#[must_use]
pub fn predict_from_rules(
    weather: Option<&WeatherSample>,
    seismic: &[SeismicEvent],
    incidents: &[Incident],
    now: DateTime<Utc>,
) -> Vec<Prediction> {
    [
        weather.and_then(high_wind),
        weather.and_then(flash_flood),
        flood_escalation(incidents, now),
        aftershock(seismic),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use command_center_feed_models::{GeoPoint, IncidentStatus};

    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000)
    }

    fn weather(wind_speed: f64, humidity: f64, temperature: f64) -> WeatherSample {
        WeatherSample {
            temperature,
            humidity,
            wind_speed,
            visibility: 10.0,
            pressure: 1013.0,
            condition: "Cloudy".to_string(),
        }
    }

    fn incident(id: &str, category: &str, minutes_ago: i64) -> Incident {
        Incident {
            id: id.to_string(),
            category: category.to_string(),
            severity: Severity::High,
            location: GeoPoint::new(13.0827, 80.2707),
            description: String::new(),
            status: IncidentStatus::Active,
            timestamp: now() - Duration::minutes(minutes_ago),
            resources_assigned: Vec::new(),
        }
    }

    #[test]
    fn strong_wind_without_humidity_yields_only_high_wind() {
        let sample = weather(30.0, 50.0, 10.0);
        let predictions = predict_from_rules(Some(&sample), &[], &[], now());

        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].id, "PRED001");
        assert_eq!(predictions[0].prediction_type, "High Wind Event");
        assert_eq!(predictions[0].probability, 78);
        assert_eq!(predictions[0].severity, Severity::Medium);
    }

    #[test]
    fn flash_flood_needs_humidity_and_heat() {
        assert!(flash_flood(&weather(5.0, 90.0, 25.0)).is_some());
        assert!(flash_flood(&weather(5.0, 90.0, 20.0)).is_none());
        assert!(flash_flood(&weather(5.0, 85.0, 30.0)).is_none());
    }

    #[test]
    fn two_recent_floods_escalate_despite_unrelated_incident() {
        let incidents = vec![
            incident("A", "flood", 10),
            incident("B", "Flash Flood", 50),
            incident("C", "Gas Leak", 1),
        ];
        let predictions = predict_from_rules(None, &[], &incidents, now());

        assert_eq!(predictions.len(), 1);
        let escalation = &predictions[0];
        assert_eq!(escalation.prediction_type, "Flood Escalation");
        assert_eq!(escalation.probability, 84);
        assert_eq!(escalation.severity, Severity::Critical);
        assert_eq!(escalation.recommended_actions.len(), 3);
    }

    #[test]
    fn single_or_stale_floods_do_not_escalate() {
        assert!(flood_escalation(&[incident("A", "flood", 5)], now()).is_none());
        assert!(
            flood_escalation(
                &[incident("A", "flood", 5), incident("B", "flood", 61)],
                now()
            )
            .is_none()
        );
    }

    #[test]
    fn aftershock_looks_at_most_recent_event_only() {
        let event = |magnitude: f64| SeismicEvent {
            magnitude,
            depth: 10.0,
            location: "Western Ghats".to_string(),
            timestamp: now(),
        };
        assert!(aftershock(&[event(3.2), event(1.0)]).is_some());
        assert!(aftershock(&[event(1.0), event(3.2)]).is_none());
        assert!(aftershock(&[]).is_none());
    }

    #[test]
    fn rules_fire_in_order() {
        let sample = weather(40.0, 95.0, 28.0);
        let incidents = vec![incident("A", "Flood", 1), incident("B", "Flood", 2)];
        let seismic = vec![SeismicEvent {
            magnitude: 2.0,
            depth: 5.0,
            location: "Coast".to_string(),
            timestamp: now(),
        }];

        let ids: Vec<String> = predict_from_rules(Some(&sample), &seismic, &incidents, now())
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["PRED001", "PRED002", "PRED003", "PRED004"]);
    }
}
