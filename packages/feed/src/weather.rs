//! Weather sources for the feed.
//!
//! Weather is advisory: a failed fetch never reaches the generator's
//! callers. The service keeps the previous sample and logs instead.

use std::sync::Mutex;

use command_center_feed_models::WeatherSample;

use crate::FeedError;
use crate::random::{RandomSource, in_range, pick_index};

const CONDITIONS: &[&str] = &["Clear", "Cloudy", "Rainy", "Stormy"];

/// Upstream provider of weather samples.
#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetches the current weather.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Weather`] if the upstream source fails.
    async fn fetch(&self) -> Result<WeatherSample, FeedError>;
}

/// Produces pseudo-random but physically plausible weather.
///
/// Ranges: temperature 15-25 C, humidity 60-90 %, wind 10-30 km/h,
/// visibility 8-15 km, pressure 1010-1030 hPa.
pub struct SimulatedWeather {
    rng: Mutex<Box<dyn RandomSource>>,
}

impl SimulatedWeather {
    /// Creates a simulated source drawing from `rng`.
    #[must_use]
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Draws one sample. Consumes six values from the random source.
    #[must_use]
    pub fn sample(&self) -> WeatherSample {
        let mut guard = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let rng = guard.as_mut();

        WeatherSample {
            temperature: in_range(rng, 15.0, 10.0),
            humidity: in_range(rng, 60.0, 30.0),
            wind_speed: in_range(rng, 10.0, 20.0),
            visibility: in_range(rng, 8.0, 7.0),
            pressure: in_range(rng, 1010.0, 20.0),
            condition: CONDITIONS[pick_index(rng, CONDITIONS.len())].to_string(),
        }
    }
}

#[async_trait::async_trait]
impl WeatherSource for SimulatedWeather {
    async fn fetch(&self) -> Result<WeatherSample, FeedError> {
        Ok(self.sample())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SequenceRandom;

    #[test]
    fn sample_maps_draws_onto_ranges() {
        let source = SimulatedWeather::new(Box::new(SequenceRandom::new([
            0.5, 0.0, 0.5, 1.0 - f64::EPSILON, 0.25, 0.6,
        ])));

        let sample = source.sample();
        assert!((sample.temperature - 20.0).abs() < 1e-9);
        assert!((sample.humidity - 60.0).abs() < 1e-9);
        assert!((sample.wind_speed - 20.0).abs() < 1e-9);
        assert!(sample.visibility < 15.0 && sample.visibility > 14.9);
        assert!((sample.pressure - 1015.0).abs() < 1e-9);
        assert_eq!(sample.condition, "Rainy");
    }

    #[tokio::test]
    async fn fetch_never_fails() {
        let source = SimulatedWeather::new(Box::new(crate::random::StdRandom::from_seed(7)));
        for _ in 0..32 {
            let sample = source.fetch().await.unwrap();
            assert!((15.0..25.0).contains(&sample.temperature));
            assert!((60.0..90.0).contains(&sample.humidity));
            assert!((10.0..30.0).contains(&sample.wind_speed));
            assert!((8.0..15.0).contains(&sample.visibility));
            assert!((1010.0..1030.0).contains(&sample.pressure));
            assert!(CONDITIONS.contains(&sample.condition.as_str()));
        }
    }
}
