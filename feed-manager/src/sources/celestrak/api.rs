use reqwest::Client;
use skyfuse::FetchError;

use crate::sources::check_response_status;

/// One CelesTrak GP query
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogQuery {
    /// Single object by NORAD catalog number
    CatalogNumber(u64),
    /// Named group, e.g. `stations`
    Group(String),
}

impl CatalogQuery {
    fn query_pairs(&self) -> [(&'static str, String); 2] {
        let selector = match self {
            CatalogQuery::CatalogNumber(n) => ("CATNR", n.to_string()),
            CatalogQuery::Group(g) => ("GROUP", g.clone()),
        };
        [selector, ("FORMAT", "TLE".to_string())]
    }
}

/// HTTP client for CelesTrak's GP element endpoint, TLE format.
pub struct CelesTrakClient {
    http_client: Client,
    base_url: String,
}

impl CelesTrakClient {
    /// `base_url` is the full `gp.php` endpoint
    pub fn new(base_url: impl Into<String>) -> Self {
        let http_client = Client::builder()
            .user_agent("skyfuse-feed-manager/0.1")
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Fetch raw TLE text for one query.
    pub async fn fetch_tle(&self, query: &CatalogQuery) -> Result<String, FetchError> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(&query.query_pairs())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        check_response_status(&response)?;
        response
            .text()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }
}
