//! Safety Analysis
//!
//! Combines the geofence risk level with ambient factors into an overall
//! score out of 10:
//!
//! ```text
//! Risk = min(10, w₁·L + w₂·T + w₃·C + w₄·W)
//! ```
//!
//! | Factor | Weight | Description |
//! |--------|--------|-------------|
//! | L      | 0.40   | Geofence risk level at the tourist's position |
//! | T      | 0.30   | Time of day (night is riskiest) |
//! | C      | 0.20   | Crowd density (0-5) |
//! | W      | 0.10   | Weather condition |

use geofencing::SafetyAssessment;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod recommendations;

pub use recommendations::recommendations;

pub const W_LOCATION: f64 = 0.4;
pub const W_TIME: f64 = 0.3;
pub const W_CROWD: f64 = 0.2;
pub const W_WEATHER: f64 = 0.1;

/// Upper bound for the overall score
pub const MAX_RISK: f64 = 10.0;

/// Upper bound (exclusive) for sampled crowd density
pub const MAX_CROWD_DENSITY: f64 = 5.0;

#[derive(Debug, Clone, Copy)]
pub struct AnalysisWeights {
    pub location: f64,
    pub time: f64,
    pub crowd: f64,
    pub weather: f64,
}

impl Default for AnalysisWeights {
    fn default() -> Self {
        Self {
            location: W_LOCATION,
            time: W_TIME,
            crowd: W_CROWD,
            weather: W_WEATHER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Rainy,
    Stormy,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 4] = [
        WeatherCondition::Clear,
        WeatherCondition::Cloudy,
        WeatherCondition::Rainy,
        WeatherCondition::Stormy,
    ];

    pub const fn risk(&self) -> f64 {
        match self {
            Self::Clear => 1.0,
            Self::Cloudy => 3.0,
            Self::Rainy => 6.0,
            Self::Stormy => 9.0,
        }
    }
}

/// Risk contribution of the local hour (0-23)
pub fn time_of_day_risk(hour: u32) -> f64 {
    match hour {
        22..=23 | 0..=5 => 8.0,
        6..=9 => 3.0,
        18..=21 => 4.0,
        _ => 2.0,
    }
}

/// Ambient conditions at analysis time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub time_of_day: f64,
    pub crowd_density: f64,
    pub weather: WeatherCondition,
}

impl RiskFactors {
    pub fn new(hour: u32, crowd_density: f64, weather: WeatherCondition) -> Self {
        Self {
            time_of_day: time_of_day_risk(hour),
            crowd_density,
            weather,
        }
    }

    /// Simulated crowd and weather readings for `hour`
    pub fn sample<R: Rng + ?Sized>(hour: u32, rng: &mut R) -> Self {
        let crowd_density = rng.gen_range(0.0..MAX_CROWD_DENSITY);
        let weather = WeatherCondition::ALL[rng.gen_range(0..WeatherCondition::ALL.len())];
        Self::new(hour, crowd_density, weather)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub location: u8,
    pub time: f64,
    pub crowd: f64,
    pub weather: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverallRisk {
    pub overall: f64,
    pub factors: FactorBreakdown,
}

pub fn overall_risk(
    location_level: u8,
    factors: &RiskFactors,
    weights: &AnalysisWeights,
) -> OverallRisk {
    let weather = factors.weather.risk();
    let raw = weights.location * location_level as f64
        + weights.time * factors.time_of_day
        + weights.crowd * factors.crowd_density
        + weights.weather * weather;

    OverallRisk {
        overall: raw.min(MAX_RISK),
        factors: FactorBreakdown {
            location: location_level,
            time: factors.time_of_day,
            crowd: factors.crowd_density,
            weather,
        },
    }
}

/// Likelihood of an incident as a whole percentage
pub fn incident_probability(overall: f64) -> u8 {
    ((overall / MAX_RISK) * 100.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyAnalysis {
    pub assessment: SafetyAssessment,
    pub risk: OverallRisk,
    pub incident_probability: u8,
    pub recommendations: Vec<String>,
}

/// Full analysis of a position given its geofence assessment
pub fn analyze(assessment: SafetyAssessment, factors: &RiskFactors) -> SafetyAnalysis {
    let risk = overall_risk(assessment.level, factors, &AnalysisWeights::default());
    let probability = incident_probability(risk.overall);

    debug!(
        "Safety analysis: overall {:.1}/10, probability {}%",
        risk.overall, probability
    );

    SafetyAnalysis {
        assessment,
        risk,
        incident_probability: probability,
        recommendations: recommendations(risk.overall)
            .iter()
            .map(|r| r.to_string())
            .collect(),
    }
}
