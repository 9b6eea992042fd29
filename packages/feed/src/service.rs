//! Lifecycle wrapper that drives the generator on a timer.
//!
//! [`FeedService`] is either stopped or running. While running, a single
//! tokio task ticks the generator on a fixed interval, so ticks never
//! overlap. Weather refreshes requested by a tick run in their own task
//! with a timeout and apply their result under the lock when they finish.
//! Those tasks are tracked and aborted when the service stops.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use command_center_feed_models::{IncidentStatus, SeismicEvent, Snapshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::FeedError;
use crate::clock::SystemClock;
use crate::generator::{FeedGenerator, TickReport};
use crate::random::StdRandom;
use crate::weather::{SimulatedWeather, WeatherSource};

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_WEATHER_TIMEOUT: Duration = Duration::from_secs(10);

type WeatherTasks = Arc<Mutex<Vec<JoinHandle<()>>>>;

/// Feed timing and randomness settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Time between ticks.
    pub tick_interval: Duration,
    /// Upper bound on a single weather fetch.
    pub weather_timeout: Duration,
    /// Fixed seed for reproducible runs. `None` seeds from entropy.
    pub random_seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            weather_timeout: DEFAULT_WEATHER_TIMEOUT,
            random_seed: None,
        }
    }
}

impl FeedConfig {
    /// Reads settings from the environment.
    ///
    /// * `FEED_TICK_INTERVAL_MS` (default 5000)
    /// * `FEED_WEATHER_TIMEOUT_MS` (default 10000)
    /// * `FEED_RANDOM_SEED` (default: entropy)
    ///
    /// Unparseable values fall back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        let millis = |name: &str| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
        };

        Self {
            tick_interval: millis("FEED_TICK_INTERVAL_MS").unwrap_or(DEFAULT_TICK_INTERVAL),
            weather_timeout: millis("FEED_WEATHER_TIMEOUT_MS").unwrap_or(DEFAULT_WEATHER_TIMEOUT),
            random_seed: std::env::var("FEED_RANDOM_SEED")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }
}

/// Whether the tick timer is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No timer; the state only changes through explicit calls.
    Stopped,
    /// The timer task is producing ticks.
    Running,
}

/// Owns a [`FeedGenerator`] and drives it on a timer.
pub struct FeedService {
    generator: Arc<Mutex<FeedGenerator>>,
    weather: Arc<dyn WeatherSource>,
    config: FeedConfig,
    task: Mutex<Option<JoinHandle<()>>>,
    weather_tasks: WeatherTasks,
}

impl FeedService {
    /// Wraps an existing generator and weather source.
    #[must_use]
    pub fn new(
        generator: FeedGenerator,
        weather: Arc<dyn WeatherSource>,
        config: FeedConfig,
    ) -> Self {
        Self {
            generator: Arc::new(Mutex::new(generator)),
            weather,
            config,
            task: Mutex::new(None),
            weather_tasks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Builds the production wiring: seeded generator, system clock,
    /// simulated weather, and `rand` randomness.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Seed`] if the embedded seed cannot be parsed.
    pub fn from_config(config: FeedConfig) -> Result<Self, FeedError> {
        let (feed_rng, weather_rng) = match config.random_seed {
            Some(seed) => (
                StdRandom::from_seed(seed),
                StdRandom::from_seed(seed.wrapping_add(1)),
            ),
            None => (StdRandom::from_entropy(), StdRandom::from_entropy()),
        };

        let generator = FeedGenerator::seeded(Box::new(feed_rng), Arc::new(SystemClock))?;
        let weather = Arc::new(SimulatedWeather::new(Box::new(weather_rng)));

        Ok(Self::new(generator, weather, config))
    }

    /// Starts the tick timer and kicks off an initial weather fetch.
    ///
    /// Returns `false` if the service was already running.
    pub fn start(&self) -> bool {
        let mut task = lock(&self.task);
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            log::debug!("Feed already running");
            return false;
        }

        lock(&self.generator).set_connected(true);

        let generator = Arc::clone(&self.generator);
        let weather = Arc::clone(&self.weather);
        let period = self.config.tick_interval;
        let timeout = self.config.weather_timeout;
        let weather_tasks = Arc::clone(&self.weather_tasks);

        spawn_weather_refresh(&generator, &weather, timeout, &weather_tasks);

        *task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                let report = lock(&generator).tick();
                if report.weather_refresh_requested {
                    spawn_weather_refresh(&generator, &weather, timeout, &weather_tasks);
                }
            }
        }));

        log::info!("Feed started, ticking every {period:?}");
        true
    }

    /// Cancels the tick timer and any pending weather fetches, and marks
    /// the feed disconnected.
    ///
    /// Returns `false` if the service was not running.
    pub fn stop(&self) -> bool {
        let Some(task) = lock(&self.task).take() else {
            return false;
        };
        task.abort();
        abort_all(&self.weather_tasks);
        lock(&self.generator).set_connected(false);
        log::info!("Feed stopped");
        true
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        if lock(&self.task).as_ref().is_some_and(|t| !t.is_finished()) {
            LifecycleState::Running
        } else {
            LifecycleState::Stopped
        }
    }

    /// Returns the current state of the feed.
    #[must_use]
    pub fn current_snapshot(&self) -> Snapshot {
        lock(&self.generator).current_snapshot()
    }

    /// Number of ticks run so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        lock(&self.generator).ticks()
    }

    /// Runs one tick immediately, awaiting any weather refresh it requests.
    ///
    /// Intended for manual stepping while the timer is stopped.
    pub async fn step(&self) -> TickReport {
        let report = lock(&self.generator).tick();
        if report.weather_refresh_requested {
            self.refresh_weather().await;
        }
        report
    }

    /// Fetches a new weather sample. Failures and timeouts keep the
    /// previous sample; this never fails the caller.
    pub async fn refresh_weather(&self) -> bool {
        refresh_weather(&self.generator, self.weather.as_ref(), self.config.weather_timeout).await
    }

    /// See [`FeedGenerator::assign_resource`].
    ///
    /// # Errors
    ///
    /// Propagates the generator's precondition errors.
    pub fn assign_resource(&self, incident_id: &str, resource_id: &str) -> Result<(), FeedError> {
        lock(&self.generator).assign_resource(incident_id, resource_id)
    }

    /// See [`FeedGenerator::release_resource`].
    ///
    /// # Errors
    ///
    /// Propagates the generator's precondition errors.
    pub fn release_resource(&self, resource_id: &str) -> Result<(), FeedError> {
        lock(&self.generator).release_resource(resource_id)
    }

    /// See [`FeedGenerator::update_incident_status`].
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::IncidentNotFound`] if the id is unknown.
    pub fn update_incident_status(
        &self,
        incident_id: &str,
        status: IncidentStatus,
    ) -> Result<(), FeedError> {
        lock(&self.generator).update_incident_status(incident_id, status)
    }

    /// See [`FeedGenerator::record_seismic_event`].
    pub fn record_seismic_event(&self, event: SeismicEvent) {
        lock(&self.generator).record_seismic_event(event);
    }
}

impl Drop for FeedService {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.task).take() {
            task.abort();
        }
        abort_all(&self.weather_tasks);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn spawn_weather_refresh(
    generator: &Arc<Mutex<FeedGenerator>>,
    weather: &Arc<dyn WeatherSource>,
    timeout: Duration,
    tasks: &WeatherTasks,
) {
    let generator = Arc::clone(generator);
    let weather = Arc::clone(weather);
    let handle = tokio::spawn(async move {
        refresh_weather(&generator, weather.as_ref(), timeout).await;
    });

    let mut tasks = lock(tasks);
    tasks.retain(|t| !t.is_finished());
    tasks.push(handle);
}

fn abort_all(tasks: &WeatherTasks) {
    for task in lock(tasks).drain(..) {
        task.abort();
    }
}

async fn refresh_weather(
    generator: &Mutex<FeedGenerator>,
    weather: &dyn WeatherSource,
    timeout: Duration,
) -> bool {
    let fetch = lock(generator).begin_weather_fetch();
    let result = match tokio::time::timeout(timeout, weather.fetch()).await {
        Ok(result) => result,
        Err(_) => Err(FeedError::Weather {
            message: format!("timed out after {timeout:?}"),
        }),
    };
    lock(generator).apply_weather_fetch(fetch, result)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use command_center_feed_models::WeatherSample;

    use super::*;
    use crate::clock::FixedClock;
    use crate::random::SequenceRandom;

    struct FailingWeather;

    #[async_trait::async_trait]
    impl WeatherSource for FailingWeather {
        async fn fetch(&self) -> Result<WeatherSample, FeedError> {
            Err(FeedError::Weather {
                message: "station offline".to_string(),
            })
        }
    }

    struct SlowWeather;

    #[async_trait::async_trait]
    impl WeatherSource for SlowWeather {
        async fn fetch(&self) -> Result<WeatherSample, FeedError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(FeedError::Weather {
                message: "unreachable".to_string(),
            })
        }
    }

    struct DelayedWeather {
        delay: Duration,
        condition: &'static str,
    }

    #[async_trait::async_trait]
    impl WeatherSource for DelayedWeather {
        async fn fetch(&self) -> Result<WeatherSample, FeedError> {
            tokio::time::sleep(self.delay).await;
            Ok(WeatherSample {
                temperature: 28.0,
                humidity: 75.0,
                wind_speed: 15.0,
                visibility: 9.0,
                pressure: 1010.0,
                condition: self.condition.to_string(),
            })
        }
    }

    fn config() -> FeedConfig {
        FeedConfig {
            tick_interval: Duration::from_secs(5),
            weather_timeout: Duration::from_secs(2),
            random_seed: None,
        }
    }

    fn service(draws: &[f64], weather: Arc<dyn WeatherSource>) -> FeedService {
        let generator = FeedGenerator::seeded(
            Box::new(SequenceRandom::new(draws.to_vec())),
            Arc::new(FixedClock::new(DateTime::<Utc>::UNIX_EPOCH)),
        )
        .unwrap();
        FeedService::new(generator, weather, config())
    }

    fn simulated() -> Arc<dyn WeatherSource> {
        Arc::new(SimulatedWeather::new(Box::new(StdRandom::from_seed(1))))
    }

    #[tokio::test(start_paused = true)]
    async fn lifecycle_start_tick_stop() {
        let feed = service(&[0.5], simulated());
        assert_eq!(feed.state(), LifecycleState::Stopped);

        assert!(feed.start());
        assert!(!feed.start());
        assert_eq!(feed.state(), LifecycleState::Running);

        tokio::time::sleep(Duration::from_millis(26_000)).await;
        assert_eq!(feed.ticks(), 5);
        let snapshot = feed.current_snapshot();
        assert!(snapshot.connected);
        assert!(snapshot.weather.is_some(), "initial weather fetch");

        assert!(feed.stop());
        assert!(!feed.stop());
        assert_eq!(feed.state(), LifecycleState::Stopped);
        assert!(!feed.current_snapshot().connected);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(feed.ticks(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_weather_does_not_stall_ticks() {
        // Every tick requests a weather refresh.
        let feed = service(&[0.5, 0.5, 0.0], Arc::new(SlowWeather));
        feed.start();

        tokio::time::sleep(Duration::from_millis(31_000)).await;
        assert_eq!(feed.ticks(), 6);
        assert!(feed.current_snapshot().weather.is_none());
        feed.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_weather_fetch() {
        let feed = service(
            &[0.5],
            Arc::new(DelayedWeather {
                delay: Duration::from_secs(1),
                condition: "Rain",
            }),
        );

        assert!(feed.start());
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(feed.stop());

        tokio::time::sleep(Duration::from_secs(10)).await;
        let snapshot = feed.current_snapshot();
        assert!(snapshot.weather.is_none());
        assert!(!snapshot.connected);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_sample() {
        let feed = service(&[], Arc::new(FailingWeather));
        assert!(!feed.refresh_weather().await);
        assert!(feed.current_snapshot().weather.is_none());
    }

    #[tokio::test]
    async fn step_applies_requested_refresh() {
        let feed = service(&[0.5, 0.5, 0.0], simulated());
        let report = feed.step().await;
        assert!(report.weather_refresh_requested);
        assert!(feed.current_snapshot().weather.is_some());
        assert_eq!(feed.state(), LifecycleState::Stopped);
    }

    #[tokio::test]
    async fn mutations_go_through_the_service() {
        let feed = service(&[], simulated());
        let before = feed.current_snapshot();

        feed.assign_resource("INC003", "RES006").unwrap();
        feed.update_incident_status("INC003", IncidentStatus::Resolved)
            .unwrap();

        let after = feed.current_snapshot();
        assert_eq!(
            before.resource("RES006").unwrap().status,
            command_center_feed_models::ResourceStatus::Available
        );
        assert_eq!(
            after.resource("RES006").unwrap().assigned_to.as_deref(),
            Some("INC003")
        );
        assert_eq!(
            after.incident("INC003").unwrap().status,
            IncidentStatus::Resolved
        );
    }
}
