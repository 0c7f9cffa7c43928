use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::format::format_clock;
use crate::session::{Session, WeatherSample};

/// Weather columns offered by the dashboard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum WeatherChannel {
    AirTemp,
    TrackTemp,
    Humidity,
    Pressure,
    WindSpeed,
    WindDirection,
    Rainfall,
}

impl WeatherChannel {
    pub const ALL: [WeatherChannel; 7] = [
        WeatherChannel::AirTemp,
        WeatherChannel::TrackTemp,
        WeatherChannel::Humidity,
        WeatherChannel::Pressure,
        WeatherChannel::WindSpeed,
        WeatherChannel::WindDirection,
        WeatherChannel::Rainfall,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WeatherChannel::AirTemp => "AirTemp",
            WeatherChannel::TrackTemp => "TrackTemp",
            WeatherChannel::Humidity => "Humidity",
            WeatherChannel::Pressure => "Pressure",
            WeatherChannel::WindSpeed => "WindSpeed",
            WeatherChannel::WindDirection => "WindDirection",
            WeatherChannel::Rainfall => "Rainfall",
        }
    }

    fn value(&self, sample: &WeatherSample) -> f64 {
        match self {
            WeatherChannel::AirTemp => sample.air_temp_c,
            WeatherChannel::TrackTemp => sample.track_temp_c,
            WeatherChannel::Humidity => sample.humidity_pct,
            WeatherChannel::Pressure => sample.pressure_mbar,
            WeatherChannel::WindSpeed => sample.wind_speed_ms,
            WeatherChannel::WindDirection => sample.wind_direction_deg,
            WeatherChannel::Rainfall => f64::from(u8::from(sample.rainfall)),
        }
    }
}

impl fmt::Display for WeatherChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WeatherChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| c.is_alphanumeric()).collect();
        WeatherChannel::ALL
            .into_iter()
            .find(|channel| channel.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                format!(
                    "unknown weather channel '{}', expected one of {}",
                    s,
                    WeatherChannel::ALL.map(|c| c.name()).join(", ")
                )
            })
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct WeatherPoint {
    pub offset_s: f64,
    /// `HH:MM:SS` since session start
    pub clock: String,
    pub value: f64,
}

pub fn weather_series(session: &Session, channel: WeatherChannel) -> Vec<WeatherPoint> {
    session
        .weather()
        .iter()
        .map(|sample| WeatherPoint {
            offset_s: sample.offset_s,
            clock: format_clock(sample.offset_s),
            value: channel.value(sample),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionKey;

    fn sample(offset_s: f64, track_temp_c: f64, rainfall: bool) -> WeatherSample {
        WeatherSample {
            offset_s,
            air_temp_c: 22.,
            track_temp_c,
            humidity_pct: 50.,
            pressure_mbar: 1010.,
            wind_speed_ms: 2.,
            wind_direction_deg: 90.,
            rainfall,
        }
    }

    #[test]
    fn test_channel_parsing() {
        assert_eq!("TrackTemp".parse::<WeatherChannel>(), Ok(WeatherChannel::TrackTemp));
        assert_eq!("track_temp".parse::<WeatherChannel>(), Ok(WeatherChannel::TrackTemp));
        assert_eq!("RAINFALL".parse::<WeatherChannel>(), Ok(WeatherChannel::Rainfall));
        assert!("Visibility".parse::<WeatherChannel>().is_err());
    }

    #[test]
    fn test_weather_series_values() {
        let session = Session::new(
            SessionKey::new(2024, "Spa", "Race"),
            Vec::new(),
            vec![sample(0., 31.5, false), sample(3661., 29., true)],
        );

        let track = weather_series(&session, WeatherChannel::TrackTemp);
        assert_eq!(track.len(), 2);
        assert_eq!(track[1].value, 29.);
        assert_eq!(track[1].clock, "01:01:01");

        let rain = weather_series(&session, WeatherChannel::Rainfall);
        assert_eq!(rain.iter().map(|p| p.value).collect::<Vec<_>>(), vec![0., 1.]);
    }
}
