// Pure transforms over a loaded session, one module per dashboard view

pub mod format;
pub mod laps;
pub mod stints;
pub mod telemetry;
pub mod trend;
pub mod weather;

pub use laps::{drivers_in_session, fastest_lap, filter_valid, laps_for_driver, quick_laps, valid_laps};
pub use stints::{Stint, stints};
pub use telemetry::{AlignedSample, LapTelemetry, TelemetryComparison, compare, lap_telemetry};
pub use trend::{DriverLapSeries, LapSelection, TimeAxis, lap_time_series, time_axis};
pub use weather::{WeatherChannel, WeatherPoint, weather_series};
