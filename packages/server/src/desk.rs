//! Keeps the latest advisory analysis for the dashboard.
//!
//! A refresh captures the current snapshot, then runs structured analysis
//! and free-text prediction as two concurrent tasks. Results replace the
//! previous report wholesale. If either task dies the report keeps its
//! previous content and raises the error indicator.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

use chrono::Utc;
use command_center_ai::client::AnalysisClient;
use command_center_feed::service::FeedService;
use command_center_feed_models::Snapshot;
use command_center_server_models::AnalysisReport;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default time between automatic refreshes.
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(30);

/// Reads `ANALYSIS_REFRESH_SECS`, falling back to
/// [`DEFAULT_REFRESH_PERIOD`].
#[must_use]
pub fn refresh_period_from_env() -> Duration {
    std::env::var("ANALYSIS_REFRESH_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map_or(DEFAULT_REFRESH_PERIOD, Duration::from_secs)
}

/// Owns the analysis client and the most recent report.
pub struct AdvisoryDesk {
    client: Arc<AnalysisClient>,
    feed: Arc<FeedService>,
    report: Arc<RwLock<AnalysisReport>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AdvisoryDesk {
    /// Creates a desk reading snapshots from `feed`.
    #[must_use]
    pub fn new(client: AnalysisClient, feed: Arc<FeedService>) -> Self {
        let report = AnalysisReport {
            enabled: client.is_enabled(),
            ..AnalysisReport::default()
        };

        Self {
            client: Arc::new(client),
            feed,
            report: Arc::new(RwLock::new(report)),
            task: Mutex::new(None),
        }
    }

    /// Returns a copy of the latest report.
    #[must_use]
    pub fn report(&self) -> AnalysisReport {
        self.report
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Runs analysis and prediction against the current snapshot.
    ///
    /// Does nothing when analysis is disabled or a refresh is already in
    /// flight. Returns the report as it stands afterwards. The work runs on
    /// its own task, so dropping the returned future does not abandon the
    /// refresh or leave it marked in flight.
    pub async fn refresh(&self) -> AnalysisReport {
        if !self.client.is_enabled() {
            return self.report();
        }

        {
            let mut report = self.write_report();
            if report.refreshing {
                log::debug!("Analysis refresh already in flight");
                return report.clone();
            }
            report.refreshing = true;
        }

        let run = tokio::spawn(run_refresh(
            Arc::clone(&self.client),
            self.feed.current_snapshot(),
            Arc::clone(&self.report),
        ));

        if let Err(e) = run.await {
            log::error!("Analysis refresh task failed: {e}");
            let mut report = self.write_report();
            report.refreshing = false;
            report.error = true;
        }

        self.report()
    }

    /// Starts refreshing every `period`, beginning immediately.
    ///
    /// Returns `false` if analysis is disabled or auto refresh is already
    /// running.
    pub fn start(self: &Arc<Self>, period: Duration) -> bool {
        if !self.client.is_enabled() {
            log::info!("Advisory analysis disabled, auto refresh not started");
            return false;
        }

        let mut task = lock(&self.task);
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return false;
        }

        let desk = Arc::clone(self);
        *task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                desk.refresh().await;
            }
        }));

        log::info!("Analysis auto refresh every {period:?}");
        true
    }

    /// Stops auto refresh. A refresh already running completes on its own
    /// task and clears the in-flight flag when it lands.
    pub fn stop(&self) {
        if let Some(task) = lock(&self.task).take() {
            task.abort();
        }
    }

    fn write_report(&self) -> RwLockWriteGuard<'_, AnalysisReport> {
        write(&self.report)
    }
}

impl Drop for AdvisoryDesk {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.task).take() {
            task.abort();
        }
    }
}

async fn run_refresh(
    client: Arc<AnalysisClient>,
    snapshot: Snapshot,
    report: Arc<RwLock<AnalysisReport>>,
) {
    let analysis = {
        let client = Arc::clone(&client);
        let snapshot = snapshot.clone();
        tokio::spawn(async move { client.analyze(&snapshot).await })
    };
    let prediction = tokio::spawn(async move {
        client
            .predict(&snapshot.incidents, snapshot.weather.as_ref())
            .await
    });

    let (analysis, prediction) = tokio::join!(analysis, prediction);

    let mut report = write(&report);
    report.refreshing = false;

    match (analysis, prediction) {
        (Ok(advisory), Ok(prediction)) => {
            report.advisory = advisory;
            report.prediction = prediction;
            report.error = false;
            report.last_updated = Some(Utc::now());
            log::info!("Analysis refreshed");
        }
        (analysis, prediction) => {
            if let Err(e) = analysis {
                log::error!("Analysis task failed: {e}");
            }
            if let Err(e) = prediction {
                log::error!("Prediction task failed: {e}");
            }
            report.error = true;
        }
    }
}

fn write(report: &RwLock<AnalysisReport>) -> RwLockWriteGuard<'_, AnalysisReport> {
    report.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
