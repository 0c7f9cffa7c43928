// Core data structures for circuit geography

use serde::{Deserialize, Serialize};

/// A WGS84 position
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// South-west and north-east corners of a track layout
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

/// Layout and static metadata of a circuit
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CircuitMap {
    /// Source identifier, ISO country code and opening year (e.g. "it-1922")
    pub id: String,
    /// Human-readable circuit name (e.g. "Autodromo Nazionale Monza")
    pub name: String,
    /// City or region of the circuit
    pub location: String,
    /// Country name derived from the identifier
    pub country: String,
    /// Year the circuit opened
    pub opened: Option<u32>,
    /// Year of the first Grand Prix held at the circuit
    pub first_gp: Option<u32>,
    /// Track length in meters
    pub length_m: Option<f64>,
    /// Altitude in meters
    pub altitude_m: Option<f64>,
    /// Track polyline, starting at the start/finish line
    pub track: Vec<GeoPoint>,
}

impl CircuitMap {
    /// Start/finish position, the first point of the polyline
    pub fn start_finish(&self) -> Option<GeoPoint> {
        self.track.first().copied()
    }

    /// Mean position of the track points
    pub fn centroid(&self) -> Option<GeoPoint> {
        if self.track.is_empty() {
            return None;
        }
        let count = self.track.len() as f64;
        let (lat, lon) = self
            .track
            .iter()
            .fold((0., 0.), |(lat, lon), p| (lat + p.lat, lon + p.lon));
        Some(GeoPoint {
            lat: lat / count,
            lon: lon / count,
        })
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        let first = self.track.first()?;
        let mut bounds = GeoBounds {
            south_west: *first,
            north_east: *first,
        };
        for point in &self.track {
            bounds.south_west.lat = bounds.south_west.lat.min(point.lat);
            bounds.south_west.lon = bounds.south_west.lon.min(point.lon);
            bounds.north_east.lat = bounds.north_east.lat.max(point.lat);
            bounds.north_east.lon = bounds.north_east.lon.max(point.lon);
        }
        Some(bounds)
    }
}

/// Find a circuit by name, ignoring case
pub fn find_circuit<'a>(circuits: &'a [CircuitMap], name: &str) -> Option<&'a CircuitMap> {
    circuits
        .iter()
        .find(|circuit| circuit.name.eq_ignore_ascii_case(name.trim()))
}

/// Country name for the ISO 3166 prefix of a circuit identifier
pub fn country_for_id(id: &str) -> String {
    let code = id.split('-').next().unwrap_or_default().to_lowercase();
    let country = match code.as_str() {
        "ae" => "United Arab Emirates",
        "ar" => "Argentina",
        "at" => "Austria",
        "au" => "Australia",
        "az" => "Azerbaijan",
        "be" => "Belgium",
        "bh" => "Bahrain",
        "br" => "Brazil",
        "ca" => "Canada",
        "cn" => "China",
        "de" => "Germany",
        "es" => "Spain",
        "fr" => "France",
        "gb" => "United Kingdom",
        "hu" => "Hungary",
        "in" => "India",
        "it" => "Italy",
        "jp" => "Japan",
        "kr" => "South Korea",
        "mc" => "Monaco",
        "mx" => "Mexico",
        "my" => "Malaysia",
        "nl" => "Netherlands",
        "pt" => "Portugal",
        "qa" => "Qatar",
        "ru" => "Russia",
        "sa" => "Saudi Arabia",
        "sg" => "Singapore",
        "tr" => "Turkey",
        "us" => "United States",
        "vn" => "Vietnam",
        "za" => "South Africa",
        _ => return code.to_uppercase(),
    };
    country.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> CircuitMap {
        CircuitMap {
            id: "it-1922".to_string(),
            name: "Autodromo Nazionale Monza".to_string(),
            location: "Monza".to_string(),
            country: "Italy".to_string(),
            opened: Some(1922),
            first_gp: Some(1950),
            length_m: Some(5793.),
            altitude_m: Some(162.),
            track: vec![
                GeoPoint { lat: 45.0, lon: 9.0 },
                GeoPoint { lat: 45.0, lon: 9.2 },
                GeoPoint { lat: 45.2, lon: 9.2 },
                GeoPoint { lat: 45.2, lon: 9.0 },
            ],
        }
    }

    #[test]
    fn test_derived_positions() {
        let circuit = square();
        assert_eq!(circuit.start_finish(), Some(GeoPoint { lat: 45.0, lon: 9.0 }));

        let centroid = circuit.centroid().unwrap();
        assert!((centroid.lat - 45.1).abs() < 1e-9);
        assert!((centroid.lon - 9.1).abs() < 1e-9);

        let bounds = circuit.bounds().unwrap();
        assert_eq!(bounds.south_west, GeoPoint { lat: 45.0, lon: 9.0 });
        assert_eq!(bounds.north_east, GeoPoint { lat: 45.2, lon: 9.2 });
    }

    #[test]
    fn test_empty_track_has_no_positions() {
        let circuit = CircuitMap {
            track: Vec::new(),
            ..square()
        };
        assert!(circuit.start_finish().is_none());
        assert!(circuit.centroid().is_none());
        assert!(circuit.bounds().is_none());
    }

    #[test]
    fn test_country_for_id() {
        assert_eq!(country_for_id("gb-1948"), "United Kingdom");
        assert_eq!(country_for_id("us-2012"), "United States");
        assert_eq!(country_for_id("xx-2030"), "XX");
    }

    #[test]
    fn test_find_circuit_ignores_case() {
        let circuits = vec![square()];
        assert!(find_circuit(&circuits, "autodromo nazionale monza").is_some());
        assert!(find_circuit(&circuits, "Imola").is_none());
    }
}
