use std::time::Duration;

use log::debug;
use serde::de::DeserializeOwned;
use tokio::time::timeout;

use crate::errors::PaddockError;

/// GET `url` and decode the JSON body, bounding both the request and the body
/// read by `request_timeout`
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
    request_timeout: Duration,
) -> Result<T, PaddockError> {
    debug!("GET {} {:?}", url, query);

    let response = timeout(request_timeout, client.get(url).query(query).send())
        .await
        .map_err(|_| PaddockError::Timeout {
            operation: format!("requesting {}", url),
            seconds: request_timeout.as_secs(),
        })?
        .map_err(|e| PaddockError::Transport {
            url: url.to_string(),
            source: e,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(PaddockError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    timeout(request_timeout, response.json::<T>())
        .await
        .map_err(|_| PaddockError::Timeout {
            operation: format!("reading response from {}", url),
            seconds: request_timeout.as_secs(),
        })?
        .map_err(|e| PaddockError::MalformedResponse {
            url: url.to_string(),
            source: e,
        })
}
