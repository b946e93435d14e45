pub mod api;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use skyfuse::config::{AircraftSourceConfig, BoundingBox};
use skyfuse::entity::normalize_longitude;
use skyfuse::{AircraftInfo, Entity, EntityKind, FetchError};
use std::time::Duration;
use tracing::debug;

use self::api::OpenSkyClient;
use crate::{PositionSource, RawRecord};

// State vector columns
const ICAO24: usize = 0;
const CALLSIGN: usize = 1;
const ORIGIN_COUNTRY: usize = 2;
const TIME_POSITION: usize = 3;
const LAST_CONTACT: usize = 4;
const LONGITUDE: usize = 5;
const LATITUDE: usize = 6;
const BARO_ALTITUDE: usize = 7;
const ON_GROUND: usize = 8;
const VELOCITY: usize = 9;
const TRUE_TRACK: usize = 10;
const VERTICAL_RATE: usize = 11;
const GEO_ALTITUDE: usize = 13;

/// Aircraft from OpenSky ADS-B state vectors, limited to a bounding box.
pub struct OpenSkySource {
    client: OpenSkyClient,
    bbox: BoundingBox,
    poll_interval: Duration,
}

impl OpenSkySource {
    pub fn new(config: &AircraftSourceConfig, bbox: BoundingBox) -> Self {
        Self {
            client: OpenSkyClient::new(config.base_url.clone()),
            bbox,
            poll_interval: Duration::from_secs(config.poll_interval_seconds),
        }
    }
}

#[async_trait]
impl PositionSource for OpenSkySource {
    fn name(&self) -> &str {
        "opensky"
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Aircraft
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>, FetchError> {
        let response = self.client.fetch_states(&self.bbox).await?;
        let response_time = response
            .time
            .and_then(|t| Utc.timestamp_opt(t, 0).single())
            .unwrap_or_else(Utc::now);

        let rows = response.states.unwrap_or_default();
        let total = rows.len();
        let records: Vec<RawRecord> = rows
            .iter()
            .filter_map(|row| state_to_entity(row, response_time))
            .filter(|e| self.bbox.contains(e.latitude, e.longitude))
            .map(RawRecord::Aircraft)
            .collect();

        debug!(
            received = total,
            retained = records.len(),
            "OpenSky states normalized"
        );
        Ok(records)
    }
}

/// Normalize one state vector.
///
/// Rows without an ICAO address or a position are dropped. Altitude is
/// barometric, else geometric, else unknown. Observation time is the
/// position timestamp, else last contact, else the response time.
pub fn state_to_entity(row: &[Value], response_time: DateTime<Utc>) -> Option<Entity> {
    let icao24 = row.get(ICAO24)?.as_str()?.trim().to_lowercase();
    if icao24.is_empty() {
        return None;
    }
    let latitude = number(row, LATITUDE)?;
    let longitude = normalize_longitude(number(row, LONGITUDE)?);

    let altitude_m = number(row, BARO_ALTITUDE).or_else(|| number(row, GEO_ALTITUDE));
    let observed_at = timestamp(row, TIME_POSITION)
        .or_else(|| timestamp(row, LAST_CONTACT))
        .unwrap_or(response_time);

    let info = AircraftInfo {
        callsign: text(row, CALLSIGN),
        origin_country: text(row, ORIGIN_COUNTRY),
        ground_speed_mps: number(row, VELOCITY),
        heading_deg: number(row, TRUE_TRACK),
        vertical_rate_mps: number(row, VERTICAL_RATE),
        on_ground: row.get(ON_GROUND).and_then(Value::as_bool).unwrap_or(false),
    };

    Some(Entity::aircraft(
        icao24,
        latitude,
        longitude,
        altitude_m,
        observed_at,
        info,
    ))
}

fn number(row: &[Value], index: usize) -> Option<f64> {
    row.get(index)?.as_f64().filter(|v| v.is_finite())
}

fn text(row: &[Value], index: usize) -> Option<String> {
    let s = row.get(index)?.as_str()?.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn timestamp(row: &[Value], index: usize) -> Option<DateTime<Utc>> {
    let secs = row.get(index)?.as_i64()?;
    Utc.timestamp_opt(secs, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde_json::json;

    fn response_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_740_830_400, 0).unwrap()
    }

    fn row(value: Value) -> Vec<Value> {
        value.as_array().unwrap().clone()
    }

    #[test]
    fn test_full_state_vector() {
        let state = row(json!([
            "800ABC", "AIC101  ", "India", 1740830398, 1740830399, 77.32, 28.14, 1000.0, false,
            120.5, 270.0, -2.5, null, 1050.0, "2000", false, 0
        ]));

        let entity = state_to_entity(&state, response_time()).unwrap();

        assert_eq!(entity.id, "800abc");
        assert_eq!(entity.kind(), EntityKind::Aircraft);
        assert_eq!(entity.latitude, 28.14);
        assert_eq!(entity.longitude, 77.32);
        assert_eq!(entity.altitude_m, Some(1000.0));
        assert_eq!(entity.observed_at.timestamp(), 1_740_830_398);
        assert_eq!(entity.label(), "AIC101");

        let skyfuse::EntityDetail::Aircraft(info) = &entity.detail else {
            panic!("expected aircraft detail");
        };
        assert_eq!(info.origin_country.as_deref(), Some("India"));
        assert_eq!(info.ground_speed_mps, Some(120.5));
        assert_eq!(info.heading_deg, Some(270.0));
        assert_eq!(info.vertical_rate_mps, Some(-2.5));
        assert!(!info.on_ground);
    }

    #[test]
    fn test_altitude_falls_back_to_geometric() {
        let state = row(json!([
            "800abc", null, "India", null, 1740830399, 77.0, 28.0, null, false, null, null, null,
            null, 1050.0
        ]));

        let entity = state_to_entity(&state, response_time()).unwrap();
        assert_eq!(entity.altitude_m, Some(1050.0));
        assert_eq!(entity.observed_at.timestamp(), 1_740_830_399);
        assert_eq!(entity.label(), "800abc");
    }

    #[test]
    fn test_unknown_altitude_is_not_zero() {
        let state = row(json!([
            "800abc", "AIC101", "India", null, null, 77.0, 28.0, null, true, 0.0, null, null,
            null, null
        ]));

        let entity = state_to_entity(&state, response_time()).unwrap();
        assert_eq!(entity.altitude_m, None);
        assert_eq!(entity.observed_at, response_time());
    }

    #[test]
    fn test_rows_without_position_are_dropped() {
        let no_position = row(json!(["800abc", "AIC101", "India", null, null, null, null]));
        assert!(state_to_entity(&no_position, response_time()).is_none());

        let no_icao = row(json!(["", "AIC101", "India", null, null, 77.0, 28.0]));
        assert!(state_to_entity(&no_icao, response_time()).is_none());

        let short = row(json!(["800abc"]));
        assert!(state_to_entity(&short, response_time()).is_none());
    }

    #[tokio::test]
    async fn test_fetch_retains_bounding_box() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/states/all?lamin=27&lomin=76&lamax=29&lomax=78")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "time": 1740830400,
                    "states": [
                        ["800abc", "AIC101", "India", 1740830398, 1740830399, 77.32, 28.14, 1000.0, false, 120.5, 270.0, 0.0, null, 1050.0],
                        ["800def", "IGO202", "India", 1740830398, 1740830399, 80.00, 28.14, 3000.0, false, 120.5, 270.0, 0.0, null, 3050.0],
                        ["800fff", "BAD303", "India", 1740830398, 1740830399, null, null, 3000.0, false, 120.5, 270.0, 0.0, null, 3050.0]
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let config = AircraftSourceConfig {
            base_url: server.url(),
            ..AircraftSourceConfig::default()
        };
        let source = OpenSkySource::new(&config, BoundingBox::default());
        let records = source.fetch().await.unwrap();

        assert_eq!(records.len(), 1);
        let RawRecord::Aircraft(entity) = &records[0] else {
            panic!("expected aircraft record");
        };
        assert_eq!(entity.id, "800abc");
        assert_eq!(source.poll_interval(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_fetch_error_passes_through() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/states/all?lamin=27&lomin=76&lamax=29&lomax=78")
            .with_status(503)
            .create_async()
            .await;

        let config = AircraftSourceConfig {
            base_url: server.url(),
            ..AircraftSourceConfig::default()
        };
        let source = OpenSkySource::new(&config, BoundingBox::default());
        let err = source.fetch().await.unwrap_err();
        assert_eq!(err, FetchError::Status { status: 503 });
    }
}
