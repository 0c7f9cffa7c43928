use itertools::Itertools;

use crate::errors::PaddockError;
use crate::session::{Lap, Session};

/// Laps at or below this time are treated as incomplete or timing artefacts
pub const MIN_VALID_LAP_S: f64 = 30.;
/// Laps at or above this time are pit laps, red flags or other outliers
pub const MAX_VALID_LAP_S: f64 = 300.;

/// Laps flagged valid by the source, with a time, and classed as quick by the
/// session's quick lap predicate. Session order is preserved.
pub fn quick_laps(session: &Session) -> Vec<Lap> {
    session
        .laps()
        .iter()
        .filter(|lap| lap.is_valid && lap.lap_time_s.is_some() && session.is_quick(lap))
        .cloned()
        .collect()
}

fn within_valid_bounds(lap: &Lap) -> bool {
    lap.lap_time_s
        .is_some_and(|t| t > MIN_VALID_LAP_S && t < MAX_VALID_LAP_S)
}

/// Laps with a time strictly between 30s and 300s
pub fn valid_laps(session: &Session) -> Vec<Lap> {
    filter_valid(session.laps())
}

pub fn filter_valid(laps: &[Lap]) -> Vec<Lap> {
    laps.iter().filter(|lap| within_valid_bounds(lap)).cloned().collect()
}

/// All laps of a driver ordered by lap number
pub fn laps_for_driver(session: &Session, driver: &str) -> Vec<Lap> {
    session
        .laps()
        .iter()
        .filter(|lap| lap.driver == driver)
        .sorted_by_key(|lap| lap.lap_number)
        .cloned()
        .collect()
}

/// The driver's lap with the lowest time. On equal times the earlier lap wins.
pub fn fastest_lap(session: &Session, driver: &str) -> Result<Lap, PaddockError> {
    laps_for_driver(session, driver)
        .into_iter()
        .filter_map(|lap| lap.lap_time_s.map(|t| (t, lap)))
        .reduce(|best, next| if next.0 < best.0 { next } else { best })
        .map(|(_, lap)| lap)
        .ok_or_else(|| PaddockError::NoLaps {
            driver: driver.to_string(),
        })
}

/// Drivers with at least one quick lap, sorted ascending
pub fn drivers_in_session(session: &Session) -> Vec<String> {
    quick_laps(session)
        .into_iter()
        .map(|lap| lap.driver)
        .unique()
        .sorted()
        .collect()
}
