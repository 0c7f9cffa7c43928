// Lap time trend: per driver lap time series and the shared time axis

use serde::Serialize;

use super::format::format_minutes_seconds;
use super::laps::{quick_laps, valid_laps};
use crate::session::{Compound, Session};

/// Fraction of the lap time spread added above and below the axis range
const AXIS_PADDING: f64 = 0.05;
const TARGET_TICKS: f64 = 10.;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LapSelection {
    /// Laps the timing provider classes as quick
    Quick,
    /// Every lap between 30s and 300s
    Valid,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LapPoint {
    pub lap_number: u32,
    pub lap_time_s: f64,
    pub compound: Compound,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DriverLapSeries {
    pub driver: String,
    pub points: Vec<LapPoint>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AxisTick {
    pub value: f64,
    pub label: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TimeAxis {
    pub min: f64,
    pub max: f64,
    pub ticks: Vec<AxisTick>,
}

/// One series per driver, in order of the driver's first appearance, with
/// points sorted by lap number
pub fn lap_time_series(session: &Session, selection: LapSelection) -> Vec<DriverLapSeries> {
    let laps = match selection {
        LapSelection::Quick => quick_laps(session),
        LapSelection::Valid => valid_laps(session),
    };

    let mut series: Vec<DriverLapSeries> = Vec::new();
    for lap in laps {
        let Some(lap_time_s) = lap.lap_time_s else {
            continue;
        };
        let point = LapPoint {
            lap_number: lap.lap_number,
            lap_time_s,
            compound: lap.compound,
        };
        match series.iter_mut().find(|s| s.driver == lap.driver) {
            Some(driver_series) => driver_series.points.push(point),
            None => series.push(DriverLapSeries {
                driver: lap.driver,
                points: vec![point],
            }),
        }
    }
    for driver_series in series.iter_mut() {
        driver_series.points.sort_by_key(|p| p.lap_number);
    }
    series
}

/// Padded lap time range with whole-second ticks; `None` without any points
pub fn time_axis(series: &[DriverLapSeries]) -> Option<TimeAxis> {
    let times = series.iter().flat_map(|s| s.points.iter().map(|p| p.lap_time_s));
    let (min_time, max_time) = times.fold(None, |range: Option<(f64, f64)>, t| match range {
        Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
        None => Some((t, t)),
    })?;

    let spread = max_time - min_time;
    let min = (min_time - spread * AXIS_PADDING).max(0.);
    let max = max_time + spread * AXIS_PADDING;

    let interval = ((spread / TARGET_TICKS) as u64).max(1);
    let ticks = (min as u64..=max as u64)
        .step_by(interval as usize)
        .map(|value| AxisTick {
            value: value as f64,
            label: format_minutes_seconds(value as f64),
        })
        .collect();

    Some(TimeAxis { min, max, ticks })
}
