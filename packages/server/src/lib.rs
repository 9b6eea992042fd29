#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the disaster response command center.
//!
//! Runs the simulated feed on a timer, keeps the latest advisory analysis
//! fresh, and serves both over a JSON API for the dashboard. Rule-based
//! predictions and metrics are computed per request from the current
//! snapshot.

pub mod desk;
mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use command_center_ai::client::AnalysisClient;
use command_center_feed::service::{FeedConfig, FeedService};

use crate::desk::AdvisoryDesk;

/// Shared application state.
pub struct AppState {
    /// The simulated feed.
    pub feed: Arc<FeedService>,
    /// Latest advisory analysis.
    pub desk: Arc<AdvisoryDesk>,
}

/// Registers all `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/snapshot", web::get().to(handlers::snapshot))
            .route("/incidents", web::get().to(handlers::incidents))
            .route(
                "/incidents/{id}/assign",
                web::post().to(handlers::assign_resource),
            )
            .route(
                "/incidents/{id}/status",
                web::put().to(handlers::update_incident_status),
            )
            .route("/resources", web::get().to(handlers::resources))
            .route(
                "/resources/{id}/release",
                web::post().to(handlers::release_resource),
            )
            .route("/metrics", web::get().to(handlers::metrics))
            .route("/predictions", web::get().to(handlers::predictions))
            .route("/analysis", web::get().to(handlers::analysis))
            .route(
                "/analysis/refresh",
                web::post().to(handlers::refresh_analysis),
            )
            .route("/seismic", web::post().to(handlers::record_seismic)),
    );
}

/// Starts the command center API server.
///
/// Builds the feed from `FeedConfig::from_env`, starts its timer, starts
/// advisory auto refresh if a provider is configured, and runs the HTTP
/// server until shutdown. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the embedded seed data is invalid,
/// or the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Loading feed seed data...");
    let feed = FeedService::from_config(FeedConfig::from_env()).map_err(std::io::Error::other)?;
    let feed = Arc::new(feed);
    feed.start();

    let client = AnalysisClient::from_env();
    let desk = Arc::new(AdvisoryDesk::new(client, Arc::clone(&feed)));
    desk.start(desk::refresh_period_from_env());

    let state = web::Data::new(AppState {
        feed: Arc::clone(&feed),
        desk: Arc::clone(&desk),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    let result = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await;

    desk.stop();
    feed.stop();

    result
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use chrono::{DateTime, Utc};
    use command_center_feed::{
        clock::FixedClock, generator::FeedGenerator, random::SequenceRandom,
        weather::SimulatedWeather,
    };
    use command_center_feed_models::{Incident, IncidentStatus, Resource, ResourceStatus};
    use serde_json::{Value, json};

    use super::*;

    fn state() -> web::Data<AppState> {
        let clock = Arc::new(FixedClock::new(DateTime::<Utc>::UNIX_EPOCH));
        let generator =
            FeedGenerator::seeded(Box::new(SequenceRandom::new(vec![0.5])), clock).unwrap();
        let weather = Arc::new(SimulatedWeather::new(Box::new(SequenceRandom::new(vec![
            0.5,
        ]))));
        let feed = Arc::new(FeedService::new(generator, weather, FeedConfig::default()));
        let desk = Arc::new(AdvisoryDesk::new(
            AnalysisClient::disabled(),
            Arc::clone(&feed),
        ));
        web::Data::new(AppState { feed, desk })
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(configure)).await
        };
    }

    #[actix_web::test]
    async fn health_reports_stopped_feed_and_disabled_ai() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["feedRunning"], false);
        assert_eq!(body["aiEnabled"], false);
    }

    #[actix_web::test]
    async fn incidents_filter_by_status() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/api/incidents?status=monitoring")
            .to_request();
        let incidents: Vec<Incident> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].id, "INC004");
        assert_eq!(incidents[0].status, IncidentStatus::Monitoring);
    }

    #[actix_web::test]
    async fn resources_filter_by_type() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/api/resources?type=coast_guard")
            .to_request();
        let resources: Vec<Resource> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].id, "RES006");
    }

    #[actix_web::test]
    async fn assign_then_release_round_trip() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/incidents/INC004/assign")
            .set_json(json!({ "resourceId": "RES005" }))
            .to_request();
        let incident: Incident = test::call_and_read_body_json(&app, req).await;
        assert_eq!(incident.resources_assigned, ["RES005"]);

        let snapshot = state.feed.current_snapshot();
        let resource = snapshot.resource("RES005").unwrap();
        assert_eq!(resource.status, ResourceStatus::Deployed);
        assert_eq!(resource.assigned_to.as_deref(), Some("INC004"));

        let req = test::TestRequest::post()
            .uri("/api/resources/RES005/release")
            .to_request();
        let resource: Resource = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resource.status, ResourceStatus::Available);
        assert!(resource.assigned_to.is_none());
    }

    #[actix_web::test]
    async fn assign_errors_map_to_status_codes() {
        let state = state();
        let app = app!(state);

        let unknown = test::TestRequest::post()
            .uri("/api/incidents/NOPE/assign")
            .set_json(json!({ "resourceId": "RES005" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, unknown).await.status(),
            StatusCode::NOT_FOUND
        );

        let busy = test::TestRequest::post()
            .uri("/api/incidents/INC004/assign")
            .set_json(json!({ "resourceId": "RES001" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, busy).await.status(),
            StatusCode::CONFLICT
        );
    }

    #[actix_web::test]
    async fn status_update_changes_incident() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::put()
            .uri("/api/incidents/INC003/status")
            .set_json(json!({ "status": "resolved" }))
            .to_request();
        let incident: Incident = test::call_and_read_body_json(&app, req).await;
        assert_eq!(incident.status, IncidentStatus::Resolved);
    }

    #[actix_web::test]
    async fn seismic_report_is_recorded_newest_first() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/seismic")
            .set_json(json!({ "magnitude": 4.1, "depth": 12.0, "location": "Bay of Bengal" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );

        let snapshot = state.feed.current_snapshot();
        assert_eq!(snapshot.seismic[0].location, "Bay of Bengal");
    }

    #[actix_web::test]
    async fn disabled_analysis_report_is_not_enabled() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/analysis/refresh")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["enabled"], false);
        assert!(body["advisory"].is_null());
    }

    #[actix_web::test]
    async fn metrics_and_predictions_are_served() {
        let state = state();
        let app = app!(state);

        let metrics: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/metrics").to_request(),
        )
        .await;
        assert_eq!(metrics["activeIncidents"], 2);
        assert_eq!(metrics["criticalAlerts"], 1);

        let predictions: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/predictions").to_request(),
        )
        .await;
        assert_eq!(predictions["riskFactors"].as_array().unwrap().len(), 4);
    }
}
