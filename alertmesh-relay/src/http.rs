/**
 * API HTTP DU RELAIS - endpoints consommés par le client AlertMesh
 *
 * ROUTES :
 * - GET  /messages       : toutes les lignes stockées (tableau JSON de chaînes)
 * - POST /send           : {"message"} envoyé par l'utilisateur local
 * - POST /inbound        : {"from", "message"} reçu d'un pair du maillage
 * - GET  /health         : "ok"
 * - GET  /system/health  : uptime, compteurs, salle, pseudo
 *
 * CORS ouvert sur toutes les routes, OPTIONS répond vide. Un corps invalide
 * ou un message vide donne 400 "failed to decode".
 */

use crate::config::RelayConfig;
use crate::health::{HealthTracker, RelayHealth};
use crate::log_line::format_log_line;
use crate::state::{new_state, MessageLog, Shared};
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, info};

pub const DECODE_FAILED: &str = "failed to decode";

#[derive(Clone)]
pub struct AppState {
    pub log: Shared<MessageLog>,
    pub cfg: Shared<RelayConfig>,
    pub health_tracker: HealthTracker,
    /// Offset local capturé au démarrage, appliqué à chaque horodatage.
    pub utc_offset: UtcOffset,
}

impl AppState {
    pub fn new(cfg: RelayConfig, utc_offset: UtcOffset) -> Self {
        Self {
            log: new_state(MessageLog::new()),
            cfg: new_state(cfg),
            health_tracker: HealthTracker::new(),
            utc_offset,
        }
    }

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.utc_offset)
    }

    fn record(&self, sender: &str, text: &str) {
        let line = format_log_line(self.now(), sender, text);
        debug!("[relay] {}", line);
        self.log.lock().append(line);
    }
}

#[derive(Debug, Deserialize)]
struct SendBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct InboundBody {
    from: String,
    message: String,
}

async fn cors(req: Request, next: Next) -> Response {
    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(req).await
    };

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/system/health", get(get_system_health))
        .route("/messages", get(get_messages))
        .route("/send", post(send))
        .route("/inbound", post(inbound))
        .with_state(app_state)
        .layer(middleware::from_fn(cors))
}

// GET /messages
async fn get_messages(State(app): State<AppState>) -> Json<Vec<String>> {
    Json(app.log.lock().lines().to_vec())
}

// POST /send
async fn send(State(app): State<AppState>, body: Bytes) -> (StatusCode, &'static str) {
    let text = match serde_json::from_slice::<SendBody>(&body) {
        Ok(SendBody { message }) if !message.is_empty() => message,
        _ => {
            app.health_tracker.record_rejected();
            return (StatusCode::BAD_REQUEST, DECODE_FAILED);
        }
    };

    let nickname = app.cfg.lock().nickname.clone();
    app.record(&nickname, &text);
    app.health_tracker.record_accepted();
    info!("[relay] message from {} stored ({} chars)", nickname, text.chars().count());
    (StatusCode::OK, "")
}

// POST /inbound
async fn inbound(State(app): State<AppState>, body: Bytes) -> (StatusCode, &'static str) {
    match serde_json::from_slice::<InboundBody>(&body) {
        Ok(InboundBody { from, message }) if !from.is_empty() && !message.is_empty() => {
            app.record(&from, &message);
            info!("[relay] peer message from {} stored", from);
            (StatusCode::OK, "")
        }
        _ => (StatusCode::BAD_REQUEST, DECODE_FAILED),
    }
}

// GET /system/health
async fn get_system_health(State(app): State<AppState>) -> Json<RelayHealth> {
    let cfg = app.cfg.lock().clone();
    Json(app.health_tracker.get_health(&app.log, &cfg.room, &cfg.nickname))
}
