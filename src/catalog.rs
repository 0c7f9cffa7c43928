// Season catalog backed by the OpenF1 meetings and sessions endpoints

use std::time::Duration;

use itertools::Itertools;
use log::error;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::PaddockError;
use crate::http;

pub const DEFAULT_OPENF1_URL: &str = "https://api.openf1.org/v1";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct MeetingRecord {
    circuit_short_name: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    meeting_name: Option<String>,
}

#[derive(Deserialize)]
struct SessionRecord {
    session_name: String,
}

/// A circuit that hosted an event in the requested season
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CircuitDescriptor {
    /// Circuit short name, also used to look sessions up
    pub name: String,
    pub location: String,
    pub country: String,
    pub event_name: String,
}

impl From<MeetingRecord> for CircuitDescriptor {
    fn from(value: MeetingRecord) -> Self {
        Self {
            name: value.circuit_short_name,
            location: value.location.unwrap_or_default(),
            country: value.country_name.unwrap_or_default(),
            event_name: value.meeting_name.unwrap_or_default(),
        }
    }
}

pub struct SessionCatalog {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl Default for SessionCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_OPENF1_URL)
    }
}

impl SessionCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Circuits raced in `year`, de-duplicated by short name in source order.
    /// Failures are logged and produce an empty list.
    pub async fn circuits_for_year(&self, year: i32) -> Vec<CircuitDescriptor> {
        self.try_circuits_for_year(year).await.unwrap_or_else(|e| {
            error!("Error fetching circuits for {}: {}", year, e);
            Vec::new()
        })
    }

    /// Session labels held at `circuit` in `year`, sorted. Failures are logged
    /// and produce an empty list.
    pub async fn session_types_for_circuit(&self, year: i32, circuit: &str) -> Vec<String> {
        self.try_session_types_for_circuit(year, circuit)
            .await
            .unwrap_or_else(|e| {
                error!("Error fetching sessions for {} {}: {}", circuit, year, e);
                Vec::new()
            })
    }

    pub async fn try_circuits_for_year(
        &self,
        year: i32,
    ) -> Result<Vec<CircuitDescriptor>, PaddockError> {
        let meetings: Vec<MeetingRecord> = self
            .get_json("meetings", &[("year", year.to_string())])
            .await?;
        Ok(meetings
            .into_iter()
            .map(CircuitDescriptor::from)
            .unique_by(|circuit| circuit.name.clone())
            .collect())
    }

    pub async fn try_session_types_for_circuit(
        &self,
        year: i32,
        circuit: &str,
    ) -> Result<Vec<String>, PaddockError> {
        let sessions: Vec<SessionRecord> = self
            .get_json(
                "sessions",
                &[
                    ("year", year.to_string()),
                    ("circuit_short_name", circuit.to_string()),
                ],
            )
            .await?;
        Ok(sessions
            .into_iter()
            .map(|session| session.session_name)
            .unique()
            .sorted()
            .collect())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, PaddockError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);
        http::get_json(&self.client, &url, query, self.request_timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn meeting(short_name: &str, meeting_name: &str) -> serde_json::Value {
        json!({
            "circuit_short_name": short_name,
            "location": "Somewhere",
            "country_name": "Italy",
            "meeting_name": meeting_name,
            "meeting_key": 1234,
            "year": 2024
        })
    }

    #[tokio::test]
    async fn test_circuits_deduplicated_in_source_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/meetings"))
            .and(query_param("year", "2024"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                meeting("Monza", "Italian Grand Prix"),
                meeting("Imola", "Emilia Romagna Grand Prix"),
                meeting("Monza", "Pre-Season Testing"),
            ])))
            .mount(&server)
            .await;

        let catalog = SessionCatalog::new(server.uri());
        let circuits = catalog.circuits_for_year(2024).await;
        assert_eq!(circuits.len(), 2);
        assert_eq!(circuits[0].name, "Monza");
        assert_eq!(circuits[0].event_name, "Italian Grand Prix");
        assert_eq!(circuits[0].country, "Italy");
        assert_eq!(circuits[1].name, "Imola");
    }

    #[tokio::test]
    async fn test_meeting_with_missing_details_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/meetings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                meeting("Monza", "Italian Grand Prix"),
                {
                    "circuit_short_name": "Lusail",
                    "location": null,
                    "country_name": null
                },
            ])))
            .mount(&server)
            .await;

        let catalog = SessionCatalog::new(server.uri());
        let circuits = catalog.try_circuits_for_year(2024).await.unwrap();
        assert_eq!(circuits.len(), 2);
        assert_eq!(circuits[1].name, "Lusail");
        assert_eq!(circuits[1].location, "");
        assert_eq!(circuits[1].country, "");
        assert_eq!(circuits[1].event_name, "");
    }

    #[tokio::test]
    async fn test_server_error_yields_empty_circuits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/meetings"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let catalog = SessionCatalog::new(server.uri());
        assert!(catalog.circuits_for_year(2024).await.is_empty());
        match catalog.try_circuits_for_year(2024).await {
            Err(PaddockError::HttpStatus { status, .. }) => assert_eq!(status, 500),
            other => panic!("Expected HttpStatus error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_yields_empty_sessions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let catalog = SessionCatalog::new(server.uri());
        assert!(catalog.session_types_for_circuit(2024, "Monza").await.is_empty());
        assert!(matches!(
            catalog.try_session_types_for_circuit(2024, "Monza").await,
            Err(PaddockError::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_session_types_distinct_and_sorted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sessions"))
            .and(query_param("year", "2024"))
            .and(query_param("circuit_short_name", "Monza"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"session_name": "Race"},
                {"session_name": "Practice 1"},
                {"session_name": "Qualifying"},
                {"session_name": "Race"}
            ])))
            .mount(&server)
            .await;

        let catalog = SessionCatalog::new(server.uri());
        assert_eq!(
            catalog.session_types_for_circuit(2024, "Monza").await,
            vec!["Practice 1", "Qualifying", "Race"]
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_yields_empty() {
        let catalog = SessionCatalog::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2));
        assert!(catalog.circuits_for_year(2024).await.is_empty());
    }
}
