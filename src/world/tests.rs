use super::*;
use crate::entity::{AircraftInfo, Entity, EntityKind, ValidationError};
use crate::error::PublishError;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use std::thread;

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

fn plane(id: &str, lat: f64, lon: f64) -> Entity {
    Entity::aircraft(id, lat, lon, Some(1000.0), at(), AircraftInfo::default())
}

fn view(generation: u64, ids: &[&str]) -> WorldView {
    let mut builder = SnapshotBuilder::new(generation, at());
    for id in ids {
        builder.push(plane(id, 28.0, 77.0)).unwrap();
    }
    WorldView {
        snapshot: builder.build(),
        alerts: Vec::new(),
        report: CycleReport::default(),
    }
}

#[test]
fn test_new_store_holds_empty_generation() {
    let store = WorldStore::new();
    let current = store.current();
    assert_eq!(current.generation(), 0);
    assert!(current.snapshot.is_empty());
    assert!(current.alerts.is_empty());
}

#[test]
fn test_publish_replaces_current() {
    let store = WorldStore::new();
    store.publish(view(1, &["a1"])).unwrap();
    store.publish(view(2, &["a1", "b2"])).unwrap();

    let current = store.current();
    assert_eq!(current.generation(), 2);
    assert_eq!(current.snapshot.len(), 2);
}

#[test]
fn test_stale_generation_refused() {
    let store = WorldStore::new();
    store.publish(view(3, &["a1"])).unwrap();

    let err = store.publish(view(3, &["b2"])).unwrap_err();
    assert_eq!(
        err,
        PublishError::StaleGeneration {
            current: 3,
            attempted: 3
        }
    );
    assert!(store.publish(view(2, &[])).is_err());

    // Refused publications leave the current view alone
    let current = store.current();
    assert_eq!(current.generation(), 3);
    assert!(current.snapshot.find(EntityKind::Aircraft, "a1").is_some());
}

#[test]
fn test_held_view_survives_later_publish() {
    let store = WorldStore::new();
    store.publish(view(1, &["a1"])).unwrap();

    let held = store.current();
    store.publish(view(2, &["b2", "c3"])).unwrap();

    assert_eq!(held.generation(), 1);
    assert_eq!(held.snapshot.len(), 1);
    assert_eq!(store.current().snapshot.len(), 2);
}

#[test]
fn test_readers_never_see_partial_views() {
    let store = Arc::new(WorldStore::new());

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for generation in 1..=200u64 {
                // Generation n holds exactly n entities
                let ids: Vec<String> = (0..generation).map(|i| format!("ac{}", i)).collect();
                let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
                store.publish(view(generation, &refs)).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut last = 0;
                for _ in 0..500 {
                    let current = store.current();
                    assert_eq!(current.snapshot.len() as u64, current.generation());
                    assert!(current.generation() >= last);
                    last = current.generation();
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(store.current().generation(), 200);
}

#[tokio::test]
async fn test_subscribers_receive_publications() {
    let store = WorldStore::new();
    let mut rx = store.subscribe();

    store.publish(view(1, &["a1"])).unwrap();
    store.publish(view(2, &[])).unwrap();

    assert_eq!(rx.recv().await.unwrap().generation(), 1);
    assert_eq!(rx.recv().await.unwrap().generation(), 2);
}

#[test]
fn test_builder_keeps_first_duplicate() {
    let mut builder = SnapshotBuilder::new(1, at());
    builder.push(plane("a1", 28.0, 77.0)).unwrap();

    let err = builder.push(plane("a1", 10.0, 10.0)).unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateId { .. }));

    let snapshot = builder.build();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.entities()[0].latitude, 28.0);
}

#[test]
fn test_builder_allows_same_id_across_kinds() {
    use crate::entity::OrbitalElements;
    use crate::geo::GeodeticPosition;

    let elements = OrbitalElements {
        catalog_number: 25544,
        name: None,
        epoch: at(),
        mean_motion: 15.5,
        eccentricity: 0.0001,
        inclination_deg: 51.6,
        raan_deg: 0.0,
        arg_perigee_deg: 0.0,
        mean_anomaly_deg: 0.0,
        bstar: 0.0,
    };
    let position = GeodeticPosition {
        latitude_deg: 0.0,
        longitude_deg: 0.0,
        altitude_m: 400_000.0,
    };

    let mut builder = SnapshotBuilder::new(1, at());
    builder.push(plane("25544", 0.0, 0.0)).unwrap();
    builder
        .push(Entity::satellite(elements, position, at()))
        .unwrap();

    let snapshot = builder.build();
    assert_eq!(snapshot.count(EntityKind::Aircraft), 1);
    assert_eq!(snapshot.count(EntityKind::Satellite), 1);
}

#[test]
fn test_builder_counts_invalid_entities() {
    let mut builder = SnapshotBuilder::new(1, at());
    assert!(builder.push(plane("a1", 91.0, 0.0)).is_err());
    assert!(builder.push(plane("", 0.0, 0.0)).is_err());
    builder.push(plane("b2", -90.0, 180.0)).unwrap();

    assert_eq!(builder.dropped(), 2);
    assert_eq!(builder.build().len(), 1);
}

#[test]
fn test_view_serializes_report_outcomes() {
    let mut v = view(4, &["a1"]);
    v.report.sources.push(SourceReport {
        source: "opensky".to_string(),
        outcome: SourceOutcome::Failed {
            error: "timed out".to_string(),
        },
        records: 0,
    });

    let json = serde_json::to_value(&v).unwrap();
    assert_eq!(json["snapshot"]["generation"], 4);
    assert_eq!(json["report"]["sources"][0]["outcome"]["status"], "failed");
    assert_eq!(json["report"]["sources"][0]["outcome"]["error"], "timed out");
}
