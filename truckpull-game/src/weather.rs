//! Pull-day weather conditions and tire preferences
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::PERCENT;
use crate::error::CatalogError;

/// Weather conditions shared by every truck in a pull
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
    Hot,
    Cold,
}

impl Weather {
    /// Selection order used when drawing a random condition.
    pub const ALL: [Self; 5] = [Self::Sunny, Self::Cloudy, Self::Rainy, Self::Hot, Self::Cold];

    /// Catalog key for this condition.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rainy",
            Self::Hot => "hot",
            Self::Cold => "cold",
        }
    }

    /// Draw a uniformly random condition.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let idx = rng.gen_range(0..Self::ALL.len());
        Self::ALL[idx]
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Weather {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|weather| weather.key() == s)
            .ok_or_else(|| CatalogError::UnknownWeather(s.to_string()))
    }
}

/// Grip percentage per weather condition carried by tire tiers.
///
/// Every condition is required, so a lookup can never miss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeatherPreference {
    pub sunny: f64,
    pub cloudy: f64,
    pub rainy: f64,
    pub hot: f64,
    pub cold: f64,
}

impl WeatherPreference {
    /// Raw percentage for the condition.
    #[must_use]
    pub const fn get(&self, weather: Weather) -> f64 {
        match weather {
            Weather::Sunny => self.sunny,
            Weather::Cloudy => self.cloudy,
            Weather::Rainy => self.rainy,
            Weather::Hot => self.hot,
            Weather::Cold => self.cold,
        }
    }

    /// Power multiplier for the condition (percentage over 100).
    #[must_use]
    pub fn multiplier(&self, weather: Weather) -> f64 {
        self.get(weather) / PERCENT
    }

    pub(crate) fn validate(&self, tier_name: &str) -> Result<(), CatalogError> {
        for weather in Weather::ALL {
            let value = self.get(weather);
            if !(0.0..=PERCENT).contains(&value) {
                return Err(CatalogError::RangeViolation {
                    field: format!("{tier_name}.weather_preference.{weather}"),
                    min: 0.0,
                    max: PERCENT,
                    value,
                });
            }
        }
        Ok(())
    }
}
