use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::entity::{Entity, EntityKind};
use crate::proximity::Alert;
use crate::world::{CycleReport, WorldStore};

/// Query parameters for entity listing
#[derive(Deserialize)]
pub struct EntityQueryParams {
    /// `aircraft` or `satellite`; all kinds when absent
    pub kind: Option<String>,
}

#[derive(Serialize)]
pub struct Stats {
    pub total_aircraft: usize,
    pub total_satellites: usize,
    pub total_alerts: usize,
}

/// Everything the dashboard draws, from one publication
#[derive(Serialize)]
struct DataResponse<'a> {
    generation: u64,
    generated_at: DateTime<Utc>,
    aircraft: Vec<&'a Entity>,
    satellites: Vec<&'a Entity>,
    alerts: &'a [Alert],
    report: &'a CycleReport,
    stats: Stats,
}

#[derive(Serialize)]
struct EntitiesResponse<'a> {
    generation: u64,
    entities: Vec<&'a Entity>,
}

#[derive(Serialize)]
struct ObjectResponse<'a> {
    generation: u64,
    entity: &'a Entity,
    /// Alerts this entity takes part in
    alerts: Vec<&'a Alert>,
}

#[derive(Serialize)]
struct AlertsResponse<'a> {
    generation: u64,
    alerts: &'a [Alert],
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create query API router
pub fn create_query_router(store: Arc<WorldStore>) -> Router {
    Router::new()
        .route("/api/data", get(get_data))
        .route("/api/entities", get(list_entities))
        .route("/api/object/:kind/:id", get(get_object))
        .route("/api/alerts", get(get_alerts))
        .with_state(store)
}

/// GET /api/data - Current snapshot, alerts and stats
async fn get_data(State(store): State<Arc<WorldStore>>) -> Response {
    let view = store.current();
    let snapshot = &view.snapshot;

    let aircraft: Vec<&Entity> = snapshot.of_kind(EntityKind::Aircraft).collect();
    let satellites: Vec<&Entity> = snapshot.of_kind(EntityKind::Satellite).collect();
    let stats = Stats {
        total_aircraft: aircraft.len(),
        total_satellites: satellites.len(),
        total_alerts: view.alerts.len(),
    };

    Json(DataResponse {
        generation: snapshot.generation(),
        generated_at: snapshot.generated_at(),
        aircraft,
        satellites,
        alerts: &view.alerts,
        report: &view.report,
        stats,
    })
    .into_response()
}

/// GET /api/entities - List entities
///
/// Query parameters:
/// - `kind`: `aircraft` or `satellite` (e.g., ?kind=satellite)
async fn list_entities(
    State(store): State<Arc<WorldStore>>,
    Query(params): Query<EntityQueryParams>,
) -> Result<Response, QueryError> {
    let kind = params
        .kind
        .as_deref()
        .map(str::parse::<EntityKind>)
        .transpose()
        .map_err(QueryError::BadRequest)?;

    let view = store.current();
    let entities: Vec<&Entity> = view
        .snapshot
        .entities()
        .iter()
        .filter(|e| kind.map_or(true, |k| e.kind() == k))
        .collect();

    Ok(Json(EntitiesResponse {
        generation: view.generation(),
        entities,
    })
    .into_response())
}

/// GET /api/object/:kind/:id - One entity with its alerts
async fn get_object(
    State(store): State<Arc<WorldStore>>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Response, QueryError> {
    let kind: EntityKind = kind.parse().map_err(QueryError::BadRequest)?;

    let view = store.current();
    let entity = view.snapshot.find(kind, &id).ok_or(QueryError::NotFound)?;
    let alerts = view
        .alerts
        .iter()
        .filter(|a| {
            (a.first.kind == kind && a.first.id == id)
                || (a.second.kind == kind && a.second.id == id)
        })
        .collect();

    Ok(Json(ObjectResponse {
        generation: view.generation(),
        entity,
        alerts,
    })
    .into_response())
}

/// GET /api/alerts - Alerts of the current generation
async fn get_alerts(State(store): State<Arc<WorldStore>>) -> Response {
    let view = store.current();
    Json(AlertsResponse {
        generation: view.generation(),
        alerts: &view.alerts,
    })
    .into_response()
}

/// Query error types
#[derive(Debug)]
enum QueryError {
    NotFound,
    BadRequest(String),
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            QueryError::NotFound => (StatusCode::NOT_FOUND, "Entity not found".to_string()),
            QueryError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}
