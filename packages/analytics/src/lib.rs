#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rule-based predictive analytics and dashboard metrics.
//!
//! Everything here is a pure function of a feed snapshot (plus the current
//! time where a rule looks at recency). Nothing calls out to the advisory
//! service, so these results are available even when AI analysis is
//! disabled.

pub mod metrics;
pub mod rules;

use chrono::{DateTime, Utc};
use command_center_analytics_models::PredictionReport;
use command_center_feed_models::Snapshot;

/// Runs every prediction rule and the risk factor breakdown over a
/// snapshot.
#[must_use]
pub fn prediction_report(snapshot: &Snapshot, now: DateTime<Utc>) -> PredictionReport {
    let predictions = rules::predict_from_rules(
        snapshot.weather.as_ref(),
        &snapshot.seismic,
        &snapshot.incidents,
        now,
    );
    log::debug!("{} rule predictions fired", predictions.len());

    PredictionReport {
        predictions,
        risk_factors: metrics::risk_factors(snapshot.weather.as_ref(), &snapshot.incidents),
    }
}
