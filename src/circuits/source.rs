// One-shot GeoJSON fetch of circuit layouts

use std::time::Duration;

use log::info;
use serde::Deserialize;

use super::types::{CircuitMap, GeoPoint, country_for_id};
use crate::catalog::DEFAULT_REQUEST_TIMEOUT;
use crate::errors::PaddockError;
use crate::http;

pub const DEFAULT_CIRCUITS_URL: &str =
    "https://raw.githubusercontent.com/bacinger/f1-circuits/refs/heads/master/f1-circuits.geojson";

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    properties: FeatureProperties,
    geometry: Geometry,
}

#[derive(Deserialize)]
struct FeatureProperties {
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Location", default)]
    location: String,
    opened: Option<u32>,
    firstgp: Option<u32>,
    length: Option<f64>,
    altitude: Option<f64>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    LineString { coordinates: Vec<Vec<f64>> },
    #[serde(other)]
    Unsupported,
}

impl TryFrom<Feature> for CircuitMap {
    type Error = PaddockError;

    fn try_from(value: Feature) -> Result<Self, Self::Error> {
        let properties = value.properties;
        let coordinates = match value.geometry {
            Geometry::LineString { coordinates } => coordinates,
            Geometry::Unsupported => {
                return Err(PaddockError::DataShape {
                    reason: format!("circuit {} is not a LineString", properties.id),
                });
            }
        };
        let track = coordinates
            .iter()
            .map(|position| match position.as_slice() {
                [lon, lat, ..] => Ok(GeoPoint {
                    lat: *lat,
                    lon: *lon,
                }),
                _ => Err(PaddockError::DataShape {
                    reason: format!("circuit {} has an incomplete position", properties.id),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CircuitMap {
            country: country_for_id(&properties.id),
            id: properties.id,
            name: properties.name,
            location: properties.location,
            opened: properties.opened,
            first_gp: properties.firstgp,
            length_m: properties.length,
            altitude_m: properties.altitude,
            track,
        })
    }
}

/// Read-only source of circuit layouts
pub struct CircuitSource {
    client: reqwest::Client,
    url: String,
    request_timeout: Duration,
}

impl Default for CircuitSource {
    fn default() -> Self {
        Self::new(DEFAULT_CIRCUITS_URL)
    }
}

impl CircuitSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub async fn fetch(&self) -> Result<Vec<CircuitMap>, PaddockError> {
        let collection: FeatureCollection =
            http::get_json(&self.client, &self.url, &[], self.request_timeout).await?;
        let circuits = collection
            .features
            .into_iter()
            .map(CircuitMap::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        info!("Fetched {} circuit layouts", circuits.len());
        Ok(circuits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn feature(id: &str, name: &str, geometry: serde_json::Value) -> serde_json::Value {
        json!({
            "type": "Feature",
            "properties": {
                "id": id,
                "Location": "Spielberg",
                "Name": name,
                "opened": 1969,
                "firstgp": 1970,
                "length": 4318,
                "altitude": 678
            },
            "bbox": [14.75, 47.21, 14.77, 47.23],
            "geometry": geometry
        })
    }

    #[tokio::test]
    async fn test_fetch_parses_layouts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/f1-circuits.geojson"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "FeatureCollection",
                "features": [feature(
                    "at-1969",
                    "Red Bull Ring",
                    json!({
                        "type": "LineString",
                        "coordinates": [[14.7607, 47.2197], [14.7613, 47.2201, 0.0]]
                    })
                )]
            })))
            .mount(&server)
            .await;

        let source = CircuitSource::new(format!("{}/f1-circuits.geojson", server.uri()));
        let circuits = source.fetch().await.unwrap();
        assert_eq!(circuits.len(), 1);
        let circuit = &circuits[0];
        assert_eq!(circuit.country, "Austria");
        assert_eq!(circuit.first_gp, Some(1970));
        assert_eq!(circuit.length_m, Some(4318.));
        assert_eq!(circuit.track.len(), 2);
        assert_eq!(
            circuit.start_finish(),
            Some(GeoPoint {
                lat: 47.2197,
                lon: 14.7607
            })
        );
    }

    #[tokio::test]
    async fn test_non_linestring_is_data_shape_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "FeatureCollection",
                "features": [feature(
                    "at-1969",
                    "Red Bull Ring",
                    json!({"type": "Point", "coordinates": [14.7607, 47.2197]})
                )]
            })))
            .mount(&server)
            .await;

        let source = CircuitSource::new(server.uri());
        let error = source.fetch().await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DataShape);
    }

    #[tokio::test]
    async fn test_missing_file_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = CircuitSource::new(server.uri());
        let error = source.fetch().await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Transport);
    }
}
