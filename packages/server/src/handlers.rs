//! HTTP handler functions for the command center API.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use command_center_analytics::{metrics::dashboard_metrics, prediction_report};
use command_center_feed::{FeedError, service::LifecycleState};
use command_center_feed_models::IncidentFilter;
use command_center_server_models::{
    ApiError, ApiHealth, AssignRequest, IncidentQueryParams, ResourceQueryParams, SeismicReport,
    StatusUpdateRequest,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        feed_running: state.feed.state() == LifecycleState::Running,
        ai_enabled: state.desk.report().enabled,
    })
}

/// `GET /api/snapshot`
pub async fn snapshot(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.feed.current_snapshot())
}

/// `GET /api/incidents`
///
/// Filters retained incidents by status and free-text search.
pub async fn incidents(
    state: web::Data<AppState>,
    params: web::Query<IncidentQueryParams>,
) -> HttpResponse {
    let params = params.into_inner();
    let filter = IncidentFilter {
        status: params.status,
        search: params.search,
    };

    HttpResponse::Ok().json(state.feed.current_snapshot().filter_incidents(&filter))
}

/// `GET /api/resources`
pub async fn resources(
    state: web::Data<AppState>,
    params: web::Query<ResourceQueryParams>,
) -> HttpResponse {
    HttpResponse::Ok().json(
        state
            .feed
            .current_snapshot()
            .resources_of_type(params.resource_type),
    )
}

/// `GET /api/metrics`
pub async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(dashboard_metrics(&state.feed.current_snapshot()))
}

/// `GET /api/predictions`
///
/// Rule-based predictions and risk factors. Available without AI.
pub async fn predictions(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(prediction_report(
        &state.feed.current_snapshot(),
        Utc::now(),
    ))
}

/// `GET /api/analysis`
pub async fn analysis(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.desk.report())
}

/// `POST /api/analysis/refresh`
pub async fn refresh_analysis(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.desk.refresh().await)
}

/// `POST /api/incidents/{id}/assign`
pub async fn assign_resource(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AssignRequest>,
) -> HttpResponse {
    let incident_id = path.into_inner();

    match state.feed.assign_resource(&incident_id, &body.resource_id) {
        Ok(()) => incident_response(&state, &incident_id),
        Err(e) => feed_error_response(&e),
    }
}

/// `POST /api/resources/{id}/release`
pub async fn release_resource(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let resource_id = path.into_inner();

    match state.feed.release_resource(&resource_id) {
        Ok(()) => state
            .feed
            .current_snapshot()
            .resource(&resource_id)
            .map_or_else(
                || HttpResponse::NoContent().finish(),
                |r| HttpResponse::Ok().json(r),
            ),
        Err(e) => feed_error_response(&e),
    }
}

/// `PUT /api/incidents/{id}/status`
pub async fn update_incident_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<StatusUpdateRequest>,
) -> HttpResponse {
    let incident_id = path.into_inner();

    match state.feed.update_incident_status(&incident_id, body.status) {
        Ok(()) => incident_response(&state, &incident_id),
        Err(e) => feed_error_response(&e),
    }
}

/// `POST /api/seismic`
pub async fn record_seismic(
    state: web::Data<AppState>,
    body: web::Json<SeismicReport>,
) -> HttpResponse {
    let event = body.into_inner().into_event(Utc::now());
    state.feed.record_seismic_event(event.clone());
    HttpResponse::Created().json(event)
}

fn incident_response(state: &AppState, incident_id: &str) -> HttpResponse {
    state
        .feed
        .current_snapshot()
        .incident(incident_id)
        .map_or_else(
            || HttpResponse::NoContent().finish(),
            |i| HttpResponse::Ok().json(i),
        )
}

/// Maps feed precondition failures to 404 (unknown id) or 409 (wrong
/// state).
fn feed_error_response(e: &FeedError) -> HttpResponse {
    let body = ApiError {
        error: e.to_string(),
    };

    match e {
        FeedError::IncidentNotFound { .. } | FeedError::ResourceNotFound { .. } => {
            HttpResponse::NotFound().json(body)
        }
        FeedError::ResourceUnavailable { .. } | FeedError::ResourceNotDeployed { .. } => {
            HttpResponse::Conflict().json(body)
        }
        FeedError::Seed(_) | FeedError::Weather { .. } => {
            log::error!("Unexpected feed error: {e}");
            HttpResponse::InternalServerError().json(body)
        }
    }
}
