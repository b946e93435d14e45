pub mod api;

use async_trait::async_trait;
use futures::future::join_all;
use skyfuse::config::SatelliteSourceConfig;
use skyfuse::propagation::parse_tle_catalog;
use skyfuse::{EntityKind, FetchError, OrbitalElements};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

use self::api::{CatalogQuery, CelesTrakClient};
use crate::{PositionSource, RawRecord};

/// Satellite orbital elements from CelesTrak.
///
/// Every configured catalog number and group is requested concurrently. The
/// source fails only when every request fails; otherwise it returns whatever
/// the successful requests delivered.
pub struct CelesTrakSource {
    client: CelesTrakClient,
    queries: Vec<CatalogQuery>,
    poll_interval: Duration,
}

impl CelesTrakSource {
    pub fn new(config: &SatelliteSourceConfig) -> Self {
        let queries = config
            .catalog_numbers
            .iter()
            .map(|n| CatalogQuery::CatalogNumber(*n))
            .chain(config.groups.iter().cloned().map(CatalogQuery::Group))
            .collect();
        Self {
            client: CelesTrakClient::new(config.base_url.clone()),
            queries,
            poll_interval: Duration::from_secs(config.poll_interval_seconds),
        }
    }

    async fn fetch_query(&self, query: &CatalogQuery) -> Result<Vec<OrbitalElements>, FetchError> {
        let text = self.client.fetch_tle(query).await?;
        let outcome = parse_tle_catalog(&text);

        for reason in &outcome.rejected {
            debug!(query = ?query, reason = %reason, "TLE record rejected");
        }
        if outcome.elements.is_empty() {
            // CelesTrak answers 200 with a plain-text notice for unknown objects
            return Err(FetchError::Malformed(format!(
                "no element records in response to {:?}",
                query
            )));
        }
        Ok(outcome.elements)
    }
}

#[async_trait]
impl PositionSource for CelesTrakSource {
    fn name(&self) -> &str {
        "celestrak"
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Satellite
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>, FetchError> {
        let results = join_all(self.queries.iter().map(|q| self.fetch_query(q))).await;

        let mut seen = HashSet::new();
        let mut records = Vec::new();
        let mut last_error = None;
        let mut failed = 0;

        for (query, result) in self.queries.iter().zip(results) {
            match result {
                Ok(elements) => {
                    for element in elements {
                        // First record for a catalog number wins
                        if seen.insert(element.catalog_number) {
                            records.push(RawRecord::Elements(element));
                        }
                    }
                }
                Err(e) => {
                    warn!(query = ?query, error = %e, "CelesTrak request failed");
                    failed += 1;
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if failed == self.queries.len() => Err(e),
            _ => Ok(records),
        }
    }
}
