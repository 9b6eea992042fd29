//! The single-writer owner of the feed state.
//!
//! [`FeedGenerator`] holds the authoritative incident, resource, weather
//! and seismic collections. Every mutation goes through `&mut self`, and
//! collections are copied on write so snapshots handed out earlier never
//! change underneath their readers.

use std::sync::Arc;

use command_center_feed_models::{
    GeoPoint, Incident, IncidentStatus, Resource, ResourceStatus, SeismicEvent, Severity,
    Snapshot, WeatherSample,
};

use crate::clock::Clock;
use crate::random::{RandomSource, jitter, pick_index};
use crate::{FeedError, seed};

/// Maximum number of incidents retained, newest first.
pub const MAX_INCIDENTS: usize = 10;

/// Maximum number of seismic events retained, most recent first.
pub const MAX_SEISMIC_EVENTS: usize = 50;

const NEW_INCIDENT_PROBABILITY: f64 = 0.1;
const RESOURCE_UPDATE_PROBABILITY: f64 = 0.2;
const RESOURCE_CHANGE_PROBABILITY: f64 = 0.3;
const WEATHER_REFRESH_PROBABILITY: f64 = 0.05;

/// Full width of the location jitter applied to synthetic incidents.
const INCIDENT_JITTER_DEGREES: f64 = 0.05;
/// Full width of the location jitter applied to moving resources.
const RESOURCE_JITTER_DEGREES: f64 = 0.01;

const INCIDENT_CATEGORIES: &[&str] = &[
    "Medical Emergency",
    "Gas Leak",
    "Power Outage",
    "Road Closure",
    "Water Main Break",
    "Coastal Erosion",
    "Tree Fall",
    "Building Collapse",
];

const SIMULATED_STATUSES: &[ResourceStatus] = &[
    ResourceStatus::Available,
    ResourceStatus::Deployed,
    ResourceStatus::Maintenance,
];

struct City {
    name: &'static str,
    location: GeoPoint,
}

const CITIES: &[City] = &[
    City {
        name: "Chennai",
        location: GeoPoint::new(13.0827, 80.2707),
    },
    City {
        name: "Coimbatore",
        location: GeoPoint::new(11.0168, 76.9558),
    },
    City {
        name: "Madurai",
        location: GeoPoint::new(9.9252, 78.1198),
    },
    City {
        name: "Trichy",
        location: GeoPoint::new(10.7905, 78.7047),
    },
    City {
        name: "Salem",
        location: GeoPoint::new(11.3410, 77.7172),
    },
    City {
        name: "Tuticorin",
        location: GeoPoint::new(8.7642, 78.1348),
    },
    City {
        name: "Mysore Border",
        location: GeoPoint::new(12.2958, 76.6394),
    },
];

/// What a single [`FeedGenerator::tick`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Id of the synthetic incident added this tick, if any.
    pub new_incident: Option<String>,
    /// Ids of resources whose status and location were re-rolled.
    pub resources_updated: Vec<String>,
    /// Whether the tick asked for a weather refresh.
    pub weather_refresh_requested: bool,
}

impl TickReport {
    /// Returns `true` if the tick changed nothing and requested nothing.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.new_incident.is_none()
            && self.resources_updated.is_empty()
            && !self.weather_refresh_requested
    }
}

/// Owns and mutates the feed collections.
pub struct FeedGenerator {
    rng: Box<dyn RandomSource>,
    clock: Arc<dyn Clock>,
    incidents: Arc<Vec<Incident>>,
    resources: Arc<Vec<Resource>>,
    weather: Option<WeatherSample>,
    weather_fetches: u64,
    weather_applied: u64,
    seismic: Arc<Vec<SeismicEvent>>,
    connected: bool,
    next_sequence: u32,
    ticks: u64,
}

impl FeedGenerator {
    /// Creates an empty, disconnected generator.
    #[must_use]
    pub fn new(rng: Box<dyn RandomSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rng,
            clock,
            incidents: Arc::new(Vec::new()),
            resources: Arc::new(Vec::new()),
            weather: None,
            weather_fetches: 0,
            weather_applied: 0,
            seismic: Arc::new(Vec::new()),
            connected: false,
            next_sequence: 1,
            ticks: 0,
        }
    }

    /// Creates a generator populated with the embedded seed data and
    /// marked connected.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Seed`] if the embedded seed cannot be parsed.
    pub fn seeded(rng: Box<dyn RandomSource>, clock: Arc<dyn Clock>) -> Result<Self, FeedError> {
        let seed = seed::load(clock.now())?;
        let mut generator = Self::new(rng, clock);
        generator.incidents = Arc::new(seed.incidents);
        generator.resources = Arc::new(seed.resources);
        generator.seismic = Arc::new(seed.seismic);
        generator.connected = true;

        log::info!(
            "Seeded feed with {} incidents, {} resources, {} seismic events",
            generator.incidents.len(),
            generator.resources.len(),
            generator.seismic.len()
        );

        Ok(generator)
    }

    /// Returns the current state. Never fails and has no side effects.
    #[must_use]
    pub fn current_snapshot(&self) -> Snapshot {
        Snapshot {
            incidents: Arc::clone(&self.incidents),
            resources: Arc::clone(&self.resources),
            weather: self.weather.clone(),
            seismic: Arc::clone(&self.seismic),
            connected: self.connected,
        }
    }

    /// Number of ticks run so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Marks the feed live or not.
    pub const fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Runs one simulation step.
    ///
    /// Three independent draws decide, in order, whether to add a synthetic
    /// incident, whether to re-roll resource statuses, and whether to ask
    /// for a weather refresh. The refresh itself is left to the caller so a
    /// slow weather source cannot stall the tick.
    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;
        let mut report = TickReport::default();

        if self.rng.next_f64() < NEW_INCIDENT_PROBABILITY {
            report.new_incident = Some(self.generate_incident());
        }

        if self.rng.next_f64() < RESOURCE_UPDATE_PROBABILITY {
            report.resources_updated = self.update_resource_statuses();
        }

        report.weather_refresh_requested = self.rng.next_f64() < WEATHER_REFRESH_PROBABILITY;

        log::trace!("Tick {}: {report:?}", self.ticks);

        report
    }

    fn generate_incident(&mut self) -> String {
        let rng = self.rng.as_mut();
        let city = &CITIES[pick_index(rng, CITIES.len())];
        let category = INCIDENT_CATEGORIES[pick_index(rng, INCIDENT_CATEGORIES.len())];
        let severity = Severity::all()[pick_index(rng, Severity::all().len())];
        let d_lat = jitter(rng, INCIDENT_JITTER_DEGREES);
        let d_lng = jitter(rng, INCIDENT_JITTER_DEGREES);

        let id = format!("TN{:03}", self.next_sequence);
        self.next_sequence += 1;

        let incident = Incident {
            id: id.clone(),
            category: category.to_string(),
            severity,
            location: city.location.offset(d_lat, d_lng),
            description: format!(
                "Emergency reported in {} area through Tamil Nadu emergency services.",
                city.name
            ),
            status: IncidentStatus::Reported,
            timestamp: self.clock.now(),
            resources_assigned: Vec::new(),
        };

        log::debug!(
            "New incident {id}: {category} ({severity}) near {}",
            city.name
        );

        let incidents = Arc::make_mut(&mut self.incidents);
        incidents.insert(0, incident);
        incidents.truncate(MAX_INCIDENTS);

        id
    }

    fn update_resource_statuses(&mut self) -> Vec<String> {
        let rng = self.rng.as_mut();
        let mut changes = Vec::new();

        for (idx, resource) in self.resources.iter().enumerate() {
            if rng.next_f64() < RESOURCE_CHANGE_PROBABILITY {
                let status = SIMULATED_STATUSES[pick_index(rng, SIMULATED_STATUSES.len())];
                let d_lat = jitter(rng, RESOURCE_JITTER_DEGREES);
                let d_lng = jitter(rng, RESOURCE_JITTER_DEGREES);
                changes.push((idx, status, resource.location.offset(d_lat, d_lng)));
            }
        }

        if changes.is_empty() {
            return Vec::new();
        }

        let resources = Arc::make_mut(&mut self.resources);
        let mut unlinked = Vec::new();
        let updated = changes
            .into_iter()
            .map(|(idx, status, location)| {
                let resource = &mut resources[idx];
                resource.status = status;
                resource.location = location;
                if status != ResourceStatus::Deployed
                    && let Some(incident_id) = resource.assigned_to.take()
                {
                    unlinked.push((incident_id, resource.id.clone()));
                }
                resource.id.clone()
            })
            .collect();

        for (incident_id, resource_id) in unlinked {
            self.unlink_from_incident(&incident_id, &resource_id);
        }

        updated
    }

    /// Removes `resource_id` from the incident's assignment list, if that
    /// incident is still retained.
    fn unlink_from_incident(&mut self, incident_id: &str, resource_id: &str) {
        if let Ok(incident_idx) = self.incident_index(incident_id) {
            Arc::make_mut(&mut self.incidents)[incident_idx]
                .resources_assigned
                .retain(|r| r != resource_id);
        }
    }

    /// Applies the outcome of a weather fetch that completes immediately.
    ///
    /// On error the previous sample is kept and the failure is logged.
    /// Returns `true` if the sample was replaced.
    pub fn apply_weather(&mut self, result: Result<WeatherSample, FeedError>) -> bool {
        let fetch = self.begin_weather_fetch();
        self.apply_weather_fetch(fetch, result)
    }

    /// Numbers a weather fetch about to start. Pass the number back to
    /// [`Self::apply_weather_fetch`] when it completes.
    pub const fn begin_weather_fetch(&mut self) -> u64 {
        self.weather_fetches += 1;
        self.weather_fetches
    }

    /// Applies the outcome of fetch number `fetch`.
    ///
    /// A sample from a fetch that started before the one currently applied
    /// is discarded, so overlapping fetches cannot roll the weather back.
    /// Returns `true` if the sample was replaced.
    pub fn apply_weather_fetch(
        &mut self,
        fetch: u64,
        result: Result<WeatherSample, FeedError>,
    ) -> bool {
        match result {
            Ok(_) if fetch <= self.weather_applied => {
                log::debug!(
                    "Discarding weather from fetch {fetch}, fetch {} already applied",
                    self.weather_applied
                );
                false
            }
            Ok(sample) => {
                log::debug!(
                    "Weather updated: {:.1}C, {:.0}% humidity, {:.1} km/h wind, {}",
                    sample.temperature,
                    sample.humidity,
                    sample.wind_speed,
                    sample.condition
                );
                self.weather = Some(sample);
                self.weather_applied = fetch;
                true
            }
            Err(e) => {
                log::warn!("Weather refresh failed, keeping previous sample: {e}");
                false
            }
        }
    }

    /// Assigns an available resource to an incident.
    ///
    /// On success the resource becomes [`ResourceStatus::Deployed`] with
    /// `assigned_to` set, and the incident gains the resource id.
    ///
    /// # Errors
    ///
    /// * [`FeedError::IncidentNotFound`] / [`FeedError::ResourceNotFound`]
    ///   if either id is unknown
    /// * [`FeedError::ResourceUnavailable`] if the resource is not
    ///   [`ResourceStatus::Available`]
    ///
    /// Nothing changes when an error is returned.
    pub fn assign_resource(&mut self, incident_id: &str, resource_id: &str) -> Result<(), FeedError> {
        let incident_idx = self.incident_index(incident_id)?;
        let resource_idx = self.resource_index(resource_id)?;

        let status = self.resources[resource_idx].status;
        if status != ResourceStatus::Available {
            return Err(FeedError::ResourceUnavailable {
                id: resource_id.to_string(),
                status,
            });
        }

        let resource = &mut Arc::make_mut(&mut self.resources)[resource_idx];
        resource.status = ResourceStatus::Deployed;
        resource.assigned_to = Some(incident_id.to_string());

        let incident = &mut Arc::make_mut(&mut self.incidents)[incident_idx];
        if !incident.resources_assigned.iter().any(|r| r == resource_id) {
            incident.resources_assigned.push(resource_id.to_string());
        }

        log::info!("Assigned {resource_id} to {incident_id}");

        Ok(())
    }

    /// Returns a deployed resource to service.
    ///
    /// The resource becomes [`ResourceStatus::Available`], its assignment is
    /// cleared, and its id is removed from the incident it was working (if
    /// that incident is still retained).
    ///
    /// # Errors
    ///
    /// * [`FeedError::ResourceNotFound`] if the id is unknown
    /// * [`FeedError::ResourceNotDeployed`] if the resource is not deployed
    pub fn release_resource(&mut self, resource_id: &str) -> Result<(), FeedError> {
        let resource_idx = self.resource_index(resource_id)?;

        let status = self.resources[resource_idx].status;
        if status != ResourceStatus::Deployed {
            return Err(FeedError::ResourceNotDeployed {
                id: resource_id.to_string(),
                status,
            });
        }

        let resource = &mut Arc::make_mut(&mut self.resources)[resource_idx];
        resource.status = ResourceStatus::Available;
        if let Some(incident_id) = resource.assigned_to.take() {
            self.unlink_from_incident(&incident_id, resource_id);
        }

        log::info!("Released {resource_id}");

        Ok(())
    }

    /// Sets the status of an incident.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::IncidentNotFound`] if the id is unknown.
    pub fn update_incident_status(
        &mut self,
        incident_id: &str,
        status: IncidentStatus,
    ) -> Result<(), FeedError> {
        let idx = self.incident_index(incident_id)?;
        Arc::make_mut(&mut self.incidents)[idx].status = status;
        log::info!("Incident {incident_id} is now {status}");
        Ok(())
    }

    /// Records a seismic event, keeping the list most-recent-first and
    /// capped at [`MAX_SEISMIC_EVENTS`].
    pub fn record_seismic_event(&mut self, event: SeismicEvent) {
        let events = Arc::make_mut(&mut self.seismic);
        let position = events
            .iter()
            .position(|e| e.timestamp <= event.timestamp)
            .unwrap_or(events.len());
        log::debug!(
            "Seismic event M{:.1} at {} recorded",
            event.magnitude,
            event.location
        );
        events.insert(position, event);
        events.truncate(MAX_SEISMIC_EVENTS);
    }

    fn incident_index(&self, id: &str) -> Result<usize, FeedError> {
        self.incidents
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| FeedError::IncidentNotFound { id: id.to_string() })
    }

    fn resource_index(&self, id: &str) -> Result<usize, FeedError> {
        self.resources
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| FeedError::ResourceNotFound { id: id.to_string() })
    }
}
