use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::entity::EntityKind;
use crate::proximity::Alert;
use crate::world::{WorldStore, WorldView};

/// Server → Client: one publication, summarized
#[derive(Debug, Clone, Serialize)]
pub struct PublicationSummary {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub generation: u64,
    pub generated_at: DateTime<Utc>,
    pub total_aircraft: usize,
    pub total_satellites: usize,
    pub total_alerts: usize,
    pub alerts: Vec<Alert>,
}

impl From<&WorldView> for PublicationSummary {
    fn from(view: &WorldView) -> Self {
        Self {
            msg_type: "publication".to_string(),
            generation: view.generation(),
            generated_at: view.snapshot.generated_at(),
            total_aircraft: view.snapshot.count(EntityKind::Aircraft),
            total_satellites: view.snapshot.count(EntityKind::Satellite),
            total_alerts: view.alerts.len(),
            alerts: view.alerts.clone(),
        }
    }
}

/// GET /api/ws - WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(store): State<Arc<WorldStore>>) -> Response {
    info!("WebSocket upgrade request received");
    ws.on_upgrade(|socket| handle_socket(socket, store))
}

pub fn create_ws_router(store: Arc<WorldStore>) -> Router {
    Router::new()
        .route("/api/ws", get(ws_handler))
        .with_state(store)
}

/// What the feed does with one inbound frame
#[derive(Debug)]
enum ClientEvent {
    /// Close frame, or the stream ended without one
    Disconnected,
    Ping(Vec<u8>),
    /// Read-only feed; client text is ignored
    Ignored,
    Failed(axum::Error),
}

fn classify(msg: Option<Result<Message, axum::Error>>) -> ClientEvent {
    match msg {
        None | Some(Ok(Message::Close(_))) => ClientEvent::Disconnected,
        Some(Ok(Message::Ping(data))) => ClientEvent::Ping(data),
        Some(Ok(_)) => ClientEvent::Ignored,
        Some(Err(e)) => ClientEvent::Failed(e),
    }
}

/// Sends the current publication, then one summary per new publication
async fn handle_socket(mut socket: WebSocket, store: Arc<WorldStore>) {
    // Subscribe before reading current so no publication falls in between
    let mut updates_rx = store.subscribe();
    info!("WebSocket connection established");

    let current = store.current();
    let mut last_sent = current.generation();
    if let Err(e) = send_summary(&mut socket, &current).await {
        error!(error = %e, "Failed to send initial summary");
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match classify(msg) {
                    ClientEvent::Disconnected => {
                        info!("WebSocket client disconnected");
                        break;
                    }
                    ClientEvent::Ping(data) => {
                        if let Err(e) = socket.send(Message::Pong(data)).await {
                            error!(error = %e, "Failed to send pong");
                            break;
                        }
                    }
                    ClientEvent::Ignored => {}
                    ClientEvent::Failed(e) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                }
            }

            result = updates_rx.recv() => {
                match result {
                    Ok(view) => {
                        if view.generation() <= last_sent {
                            continue;
                        }
                        last_sent = view.generation();
                        if let Err(e) = send_summary(&mut socket, &view).await {
                            error!(error = %e, "Failed to send publication summary");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Only the newest state matters to the dashboard
                        warn!(skipped = skipped, "WebSocket lagged, skipped publications");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("World store dropped");
                        break;
                    }
                }
            }
        }
    }

    info!("WebSocket connection closed");
}

async fn send_summary(socket: &mut WebSocket, view: &WorldView) -> anyhow::Result<()> {
    let json = serde_json::to_string(&PublicationSummary::from(view))?;
    socket.send(Message::Text(json)).await?;
    Ok(())
}
