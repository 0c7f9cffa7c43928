// Session data model: laps, telemetry and weather of one loaded session

pub mod archive;
pub mod provider;
pub mod repository;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

pub use provider::{ArchiveProvider, TimingProvider};
pub use repository::SessionRepository;

/// Capability deciding whether a lap counts as genuine racing pace. Supplied by
/// the timing provider that built the session.
pub type QuickLapPredicate = Arc<dyn Fn(&Lap) -> bool + Send + Sync>;

/// Identifies a session: season, circuit short name and session type label.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub year: i32,
    pub circuit: String,
    pub session_type: String,
}

impl SessionKey {
    pub fn new(year: i32, circuit: impl Into<String>, session_type: impl Into<String>) -> Self {
        Self {
            year,
            circuit: circuit.into(),
            session_type: session_type.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.year, self.circuit, self.session_type)
    }
}

/// Tire compound classification
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Compound {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Compound {
    /// Chart colour used by the dashboard for this compound
    pub fn color(&self) -> &'static str {
        match self {
            Compound::Soft => "#FF3333",
            Compound::Medium => "#FFFF00",
            Compound::Hard => "#FFFFFF",
            Compound::Intermediate => "#39FF14",
            Compound::Wet => "#0080FF",
            Compound::Unknown => "#808080",
        }
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Compound::Soft => "SOFT",
            Compound::Medium => "MEDIUM",
            Compound::Hard => "HARD",
            Compound::Intermediate => "INTERMEDIATE",
            Compound::Wet => "WET",
            Compound::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

// the timing feed reports a null compound for laps it could not classify
fn compound_or_unknown<'de, D>(deserializer: D) -> Result<Compound, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Compound>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lap {
    /// Driver abbreviation, e.g. "VER"
    pub driver: String,
    /// Lap number, unique per driver within a session
    pub lap_number: u32,
    /// Lap duration in seconds, missing for laps without a time
    #[serde(default)]
    pub lap_time_s: Option<f64>,
    #[serde(default, deserialize_with = "compound_or_unknown")]
    pub compound: Compound,
    /// Stint number, non-decreasing across a driver's laps
    pub stint: u32,
    /// Validity flag from the timing source
    #[serde(default = "default_true")]
    pub is_valid: bool,
}

/// A single telemetry sample along a lap
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TelemetrySample {
    /// Meters traveled from S/F this lap
    pub distance_m: f64,
    pub speed_kph: f64,
    /// Throttle use. 0=off throttle to 100=full throttle
    pub throttle_pct: f64,
    pub brake: bool,
    pub gear: u8,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeatherSample {
    /// Seconds since the session started
    pub offset_s: f64,
    pub air_temp_c: f64,
    pub track_temp_c: f64,
    pub humidity_pct: f64,
    pub pressure_mbar: f64,
    pub wind_speed_ms: f64,
    pub wind_direction_deg: f64,
    pub rainfall: bool,
}

/// A fully loaded session. Immutable once built and shared as `Arc<Session>`.
#[derive(Clone)]
pub struct Session {
    key: SessionKey,
    laps: Vec<Lap>,
    telemetry: HashMap<(String, u32), Vec<TelemetrySample>>,
    weather: Vec<WeatherSample>,
    quick_lap: QuickLapPredicate,
}

impl Session {
    /// Build a session. Until a provider injects its own classification every
    /// lap passes the quick lap predicate.
    pub fn new(key: SessionKey, laps: Vec<Lap>, weather: Vec<WeatherSample>) -> Self {
        Self {
            key,
            laps,
            telemetry: HashMap::new(),
            weather,
            quick_lap: Arc::new(|_| true),
        }
    }

    pub fn with_telemetry(
        mut self,
        driver: impl Into<String>,
        lap_number: u32,
        samples: Vec<TelemetrySample>,
    ) -> Self {
        self.telemetry.insert((driver.into(), lap_number), samples);
        self
    }

    pub fn with_quick_lap_predicate(mut self, predicate: QuickLapPredicate) -> Self {
        self.quick_lap = predicate;
        self
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    pub fn weather(&self) -> &[WeatherSample] {
        &self.weather
    }

    pub fn is_quick(&self, lap: &Lap) -> bool {
        (self.quick_lap)(lap)
    }

    /// Telemetry recorded for a driver's lap, if the source provided any
    pub fn telemetry(&self, driver: &str, lap_number: u32) -> Option<&[TelemetrySample]> {
        self.telemetry
            .get(&(driver.to_string(), lap_number))
            .map(Vec::as_slice)
    }

    /// All telemetry tables ordered by driver then lap number
    pub fn telemetry_tables(&self) -> Vec<(&str, u32, &[TelemetrySample])> {
        let mut tables: Vec<_> = self
            .telemetry
            .iter()
            .map(|((driver, lap), samples)| (driver.as_str(), *lap, samples.as_slice()))
            .collect();
        tables.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(&b.1)));
        tables
    }

    /// Check the structural invariants of the loaded tables
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for lap in &self.laps {
            if lap.lap_number == 0 {
                return Err(format!("Driver {} has a lap numbered 0", lap.driver));
            }
            if lap.stint == 0 {
                return Err(format!(
                    "Lap {} of driver {} has stint number 0",
                    lap.lap_number, lap.driver
                ));
            }
            if !seen.insert((lap.driver.as_str(), lap.lap_number)) {
                return Err(format!(
                    "Duplicate lap {} for driver {}",
                    lap.lap_number, lap.driver
                ));
            }
        }

        let mut by_driver: HashMap<&str, Vec<&Lap>> = HashMap::new();
        for lap in &self.laps {
            by_driver.entry(lap.driver.as_str()).or_default().push(lap);
        }
        for (driver, mut laps) in by_driver {
            laps.sort_by_key(|lap| lap.lap_number);
            for pair in laps.windows(2) {
                if pair[1].stint < pair[0].stint {
                    return Err(format!(
                        "Stint number decreases for driver {} at lap {}",
                        driver, pair[1].lap_number
                    ));
                }
            }
        }

        for ((driver, lap_number), samples) in &self.telemetry {
            if !seen.contains(&(driver.as_str(), *lap_number)) {
                return Err(format!(
                    "Telemetry for unknown lap {} of driver {}",
                    lap_number, driver
                ));
            }
            if let Some(first) = samples.first() {
                if first.distance_m < 0. {
                    return Err(format!(
                        "Negative distance in lap {} of driver {}",
                        lap_number, driver
                    ));
                }
            }
            if samples.windows(2).any(|w| w[1].distance_m <= w[0].distance_m) {
                return Err(format!(
                    "Telemetry distance not increasing in lap {} of driver {}",
                    lap_number, driver
                ));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("key", &self.key)
            .field("laps", &self.laps.len())
            .field("telemetry", &self.telemetry.len())
            .field("weather", &self.weather.len())
            .finish()
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.laps == other.laps
            && self.telemetry == other.telemetry
            && self.weather == other.weather
    }
}
