//! In-memory JSON REST service for exercising the client over real HTTP.
//!
//! Failures are reported with the error payload the client understands:
//! `{"error": true, "type": <code>, "message": <text>}` plus a matching HTTP
//! status.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, RawQuery, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use base64::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

/// Username accepted by `GET /private`.
pub const DEMO_USER: &str = "admin";
/// Password accepted by `GET /private`.
pub const DEMO_PASSWORD: &str = "secret";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub pinned: bool,
}

#[derive(Deserialize)]
pub struct CreateNote {
    pub title: String,
    #[serde(default)]
    pub pinned: bool,
}

#[derive(Deserialize)]
pub struct UpdateNote {
    pub title: Option<String>,
    pub pinned: Option<bool>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct BlobParams {
    pub size: usize,
}

/// Notes in creation order.
pub type Db = Arc<RwLock<Vec<Note>>>;

/// A failed request, rendered as an error payload.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    kind: Value,
    message: String,
}

impl ApiFailure {
    fn not_found(id: Uuid) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            kind: json!("NotFound"),
            message: format!("note {id} does not exist"),
        }
    }

    fn invalid_payload(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            kind: json!("InvalidPayload"),
            message: rejection.body_text(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            kind: json!(401),
            message: "Unauthorized".to_string(),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let payload = json!({
            "error": true,
            "type": self.kind,
            "message": self.message,
        });
        (self.status, Json(payload)).into_response()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/{id}", get(get_note).put(update_note).delete(delete_note))
        .route("/private", get(private))
        .route("/blob", get(blob))
        .route("/echo", any(echo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_notes(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Vec<Note>> {
    let notes = db.read().await;
    let limit = params.limit.unwrap_or(notes.len());
    Json(notes.iter().take(limit).cloned().collect())
}

async fn create_note(
    State(db): State<Db>,
    input: Result<Json<CreateNote>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiFailure> {
    let Json(input) = input.map_err(ApiFailure::invalid_payload)?;
    let note = Note {
        id: Uuid::new_v4(),
        title: input.title,
        pinned: input.pinned,
    };
    debug!(id = %note.id, "created note");
    db.write().await.push(note.clone());
    Ok((StatusCode::CREATED, Json(note)))
}

async fn get_note(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Note>, ApiFailure> {
    let notes = db.read().await;
    notes
        .iter()
        .find(|note| note.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found(id))
}

async fn update_note(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    input: Result<Json<UpdateNote>, JsonRejection>,
) -> Result<Json<Note>, ApiFailure> {
    let Json(input) = input.map_err(ApiFailure::invalid_payload)?;
    let mut notes = db.write().await;
    let note = notes
        .iter_mut()
        .find(|note| note.id == id)
        .ok_or_else(|| ApiFailure::not_found(id))?;
    if let Some(title) = input.title {
        note.title = title;
    }
    if let Some(pinned) = input.pinned {
        note.pinned = pinned;
    }
    Ok(Json(note.clone()))
}

async fn delete_note(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Value>, ApiFailure> {
    let mut notes = db.write().await;
    let index = notes
        .iter()
        .position(|note| note.id == id)
        .ok_or_else(|| ApiFailure::not_found(id))?;
    notes.remove(index);
    debug!(%id, "deleted note");
    Ok(Json(json!({ "deleted": id })))
}

async fn private(headers: HeaderMap) -> Result<Json<Value>, ApiFailure> {
    let expected = format!(
        "Basic {}",
        BASE64_STANDARD.encode(format!("{DEMO_USER}:{DEMO_PASSWORD}"))
    );
    match header_str(&headers, header::AUTHORIZATION.as_str()) {
        Some(value) if value == expected => Ok(Json(json!({ "user": DEMO_USER }))),
        presented => {
            warn!(credentials_present = presented.is_some(), "rejected request to /private");
            Err(ApiFailure::unauthorized())
        }
    }
}

/// A JSON object whose `data` string is `size` bytes long.
async fn blob(Query(params): Query<BlobParams>) -> Json<Value> {
    Json(json!({ "data": "x".repeat(params.size) }))
}

/// Reflect the request back so the wire format can be asserted.
async fn echo(
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: String,
) -> Json<Value> {
    Json(json!({
        "method": method.as_str(),
        "query": query,
        "authorization": header_str(&headers, header::AUTHORIZATION.as_str()),
        "content_type": header_str(&headers, header::CONTENT_TYPE.as_str()),
        "accept": header_str(&headers, header::ACCEPT.as_str()),
        "body": body,
    }))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
