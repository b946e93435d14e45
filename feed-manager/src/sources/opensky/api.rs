use reqwest::Client;
use serde::Deserialize;
use skyfuse::config::BoundingBox;
use skyfuse::FetchError;

use crate::sources::check_response_status;

/// Response of `GET /states/all`.
///
/// Each state vector is a positional JSON array; see [`super::state_to_entity`]
/// for the column layout.
#[derive(Debug, Deserialize)]
pub struct StatesResponse {
    /// Unix seconds the states are valid for
    pub time: Option<i64>,
    /// Null when nothing is airborne in the box
    pub states: Option<Vec<Vec<serde_json::Value>>>,
}

/// HTTP client for the OpenSky Network REST API (anonymous access).
pub struct OpenSkyClient {
    http_client: Client,
    base_url: String,
}

impl OpenSkyClient {
    /// `base_url` without trailing slash, e.g. `https://opensky-network.org/api`
    pub fn new(base_url: impl Into<String>) -> Self {
        let http_client = Client::builder()
            .user_agent("skyfuse-feed-manager/0.1")
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch all state vectors inside the bounding box.
    pub async fn fetch_states(&self, bbox: &BoundingBox) -> Result<StatesResponse, FetchError> {
        let url = format!(
            "{}/states/all?lamin={}&lomin={}&lamax={}&lomax={}",
            self.base_url, bbox.min_lat, bbox.min_lon, bbox.max_lat, bbox.max_lon
        );
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        check_response_status(&response)?;
        response
            .json::<StatesResponse>()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }
}
