use serde::Serialize;

use crate::errors::PaddockError;
use crate::session::{Lap, Session, TelemetrySample};

/// Telemetry sample with the brake channel normalized to 0 or 1
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AlignedSample {
    pub distance_m: f64,
    pub speed_kph: f64,
    pub throttle_pct: f64,
    pub brake: u8,
    pub gear: u8,
}

impl From<&TelemetrySample> for AlignedSample {
    fn from(value: &TelemetrySample) -> Self {
        Self {
            distance_m: value.distance_m,
            speed_kph: value.speed_kph,
            throttle_pct: value.throttle_pct,
            brake: u8::from(value.brake),
            gear: value.gear,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LapTelemetry {
    pub driver: String,
    pub lap_number: u32,
    pub lap_time_s: Option<f64>,
    pub samples: Vec<AlignedSample>,
}

/// Two laps side by side. Each keeps its own distance axis; nothing is
/// resampled.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TelemetryComparison {
    pub first: LapTelemetry,
    pub second: LapTelemetry,
}

fn find_lap<'a>(session: &'a Session, driver: &str, lap_number: u32) -> Result<&'a Lap, PaddockError> {
    session
        .laps()
        .iter()
        .find(|lap| lap.driver == driver && lap.lap_number == lap_number)
        .ok_or_else(|| PaddockError::LapNotFound {
            driver: driver.to_string(),
            lap_number,
        })
}

/// Telemetry of a single lap. A lap the source recorded without telemetry
/// yields no samples.
pub fn lap_telemetry(
    session: &Session,
    driver: &str,
    lap_number: u32,
) -> Result<LapTelemetry, PaddockError> {
    let lap = find_lap(session, driver, lap_number)?;
    let samples = session
        .telemetry(driver, lap_number)
        .unwrap_or_default()
        .iter()
        .map(AlignedSample::from)
        .collect();
    Ok(LapTelemetry {
        driver: lap.driver.clone(),
        lap_number,
        lap_time_s: lap.lap_time_s,
        samples,
    })
}

pub fn compare(
    session: &Session,
    driver_a: &str,
    lap_a: u32,
    driver_b: &str,
    lap_b: u32,
) -> Result<TelemetryComparison, PaddockError> {
    let first = lap_telemetry(session, driver_a, lap_a)?;
    let second = lap_telemetry(session, driver_b, lap_b)?;
    Ok(TelemetryComparison { first, second })
}
