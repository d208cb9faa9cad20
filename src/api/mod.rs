//! HTTP API.
//!
//! Every operation boundary catches errors and converts them to a JSON
//! `{"error": ...}` body; nothing propagates to a global handler. Writes are
//! not retried server-side: clients refetch the roadmap after a failure.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use blueprint_core::board::BoardSession;
use blueprint_core::db::Database;
use blueprint_core::models::*;
use blueprint_core::Error as CoreError;

use crate::ai::{self, AiError, CompletionProvider};

// ── Shared application state ──────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub ai: Arc<dyn CompletionProvider>,
}

impl AppState {
    pub fn new(db: Database, ai: Arc<dyn CompletionProvider>) -> Self {
        Self { db, ai }
    }
}

// ── Request payload types ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateFeatureRequest {
    #[serde(flatten)]
    pub input: CreateFeatureInput,
    /// Accepted AI drafts land at the end-of-bucket sentinel instead of a
    /// computed position.
    #[serde(default)]
    pub from_draft: bool,
}

#[derive(Deserialize)]
pub struct MoveFeatureRequest {
    pub bucket: Bucket,
    /// Index within the destination bucket; absent means "append".
    pub index: Option<usize>,
}

#[derive(Deserialize)]
pub struct SuggestRequest {
    pub prompt: String,
}

#[derive(Deserialize)]
pub struct GenerateDocumentRequest {
    pub kind: DocumentKind,
    pub prompt: String,
    pub title: Option<String>,
}

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unavailable(String),
    Upstream(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => ApiError::BadRequest(msg),
            CoreError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::NotConfigured => ApiError::Unavailable(err.to_string()),
            AiError::Http(_) | AiError::Malformed(_) => ApiError::Upstream(err.to_string()),
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/workspaces", get(list_workspaces).post(create_workspace))
        .route(
            "/api/workspaces/{id}",
            get(get_workspace).patch(update_workspace).delete(delete_workspace),
        )
        .route("/api/workspaces/{id}/roadmap", get(get_roadmap))
        .route("/api/workspaces/{id}/features", post(create_feature))
        .route("/api/workspaces/{id}/suggest", post(suggest_features))
        .route(
            "/api/workspaces/{id}/documents",
            get(list_documents).post(create_document),
        )
        .route("/api/workspaces/{id}/documents/generate", post(generate_document))
        .route(
            "/api/features/{id}",
            get(get_feature).patch(update_feature).delete(delete_feature),
        )
        .route("/api/features/{id}/move", post(move_feature))
        .route(
            "/api/documents/{id}",
            get(get_document).patch(update_document).delete(delete_document),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

// ── Workspaces ────────────────────────────────────────────────────────

async fn list_workspaces(State(state): State<AppState>) -> Result<Json<Vec<Workspace>>, ApiError> {
    Ok(Json(state.db.list_workspaces()?))
}

async fn create_workspace(
    State(state): State<AppState>,
    Json(input): Json<CreateWorkspaceInput>,
) -> Result<(StatusCode, Json<Workspace>), ApiError> {
    let workspace = state.db.create_workspace(input)?;
    Ok((StatusCode::CREATED, Json(workspace)))
}

async fn get_workspace(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Workspace>, ApiError> {
    let workspace = state
        .db
        .get_workspace(id)?
        .ok_or_else(|| ApiError::NotFound("workspace not found".into()))?;
    Ok(Json(workspace))
}

async fn update_workspace(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateWorkspaceInput>,
) -> Result<Json<Workspace>, ApiError> {
    let workspace = state
        .db
        .update_workspace(id, input)?
        .ok_or_else(|| ApiError::NotFound("workspace not found".into()))?;
    Ok(Json(workspace))
}

async fn delete_workspace(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.db.delete_workspace(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("workspace not found".into()))
    }
}

// ── Roadmap & features ────────────────────────────────────────────────

async fn get_roadmap(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<RoadmapView>, ApiError> {
    let roadmap = state.db.roadmap_for_workspace(workspace_id)?;
    let features = state.db.list_features(roadmap.id)?;
    Ok(Json(RoadmapView::build(roadmap, features)))
}

async fn create_feature(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
    Json(request): Json<CreateFeatureRequest>,
) -> Result<(StatusCode, Json<Feature>), ApiError> {
    let roadmap = state.db.roadmap_for_workspace(workspace_id)?;
    let placement = if request.from_draft {
        FeaturePlacement::Sentinel
    } else {
        FeaturePlacement::Append
    };
    let feature = state.db.create_feature(roadmap.id, request.input, placement)?;
    Ok((StatusCode::CREATED, Json(feature)))
}

async fn get_feature(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Feature>, ApiError> {
    let feature = state
        .db
        .get_feature(id)?
        .ok_or_else(|| ApiError::NotFound("feature not found".into()))?;
    Ok(Json(feature))
}

async fn update_feature(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateFeatureInput>,
) -> Result<Json<Feature>, ApiError> {
    let feature = state
        .db
        .update_feature(id, input)?
        .ok_or_else(|| ApiError::NotFound("feature not found".into()))?;
    Ok(Json(feature))
}

async fn delete_feature(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.db.delete_feature(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("feature not found".into()))
    }
}

/// Finalize a board move: adopt the bucket, renumber the affected columns in
/// one transaction, and return the authoritative roadmap so the client can
/// replace its local state.
async fn move_feature(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<MoveFeatureRequest>,
) -> Result<Json<RoadmapView>, ApiError> {
    let feature = state
        .db
        .get_feature(id)?
        .ok_or_else(|| ApiError::NotFound("feature not found".into()))?;

    let mut session = BoardSession::open(state.db.clone(), feature.workspace_id)?;
    session
        .move_feature(id, request.bucket, request.index)?
        .ok_or_else(|| ApiError::NotFound("feature not on the board".into()))?;

    let roadmap = session.roadmap().clone();
    let features = state.db.list_features(roadmap.id)?;
    Ok(Json(RoadmapView::build(roadmap, features)))
}

// ── AI suggestions ────────────────────────────────────────────────────

async fn suggest_features(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
    Json(request): Json<SuggestRequest>,
) -> Result<Json<Vec<FeatureDraft>>, ApiError> {
    // The workspace gates the call, but drafts are not persisted; acceptance
    // goes through the normal feature creation path.
    if state.db.get_workspace(workspace_id)?.is_none() {
        return Err(ApiError::NotFound("workspace not found".into()));
    }
    let drafts = ai::suggest_features(state.ai.as_ref(), &request.prompt).await?;
    Ok(Json(drafts))
}

// ── Documents ─────────────────────────────────────────────────────────

async fn list_documents(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<Vec<Document>>, ApiError> {
    if state.db.get_workspace(workspace_id)?.is_none() {
        return Err(ApiError::NotFound("workspace not found".into()));
    }
    Ok(Json(state.db.list_documents(workspace_id)?))
}

async fn create_document(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
    Json(input): Json<CreateDocumentInput>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let document = state.db.create_document(workspace_id, input)?;
    Ok((StatusCode::CREATED, Json(document)))
}

async fn generate_document(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
    Json(request): Json<GenerateDocumentRequest>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    if state.db.get_workspace(workspace_id)?.is_none() {
        return Err(ApiError::NotFound("workspace not found".into()));
    }

    let body = ai::draft_document(state.ai.as_ref(), request.kind, &request.prompt).await?;
    let title = request
        .title
        .unwrap_or_else(|| default_document_title(request.kind));
    let document = state.db.create_document(
        workspace_id,
        CreateDocumentInput {
            kind: request.kind,
            title,
            body,
        },
    )?;
    Ok((StatusCode::CREATED, Json(document)))
}

async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Document>, ApiError> {
    let document = state
        .db
        .get_document(id)?
        .ok_or_else(|| ApiError::NotFound("document not found".into()))?;
    Ok(Json(document))
}

async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateDocumentInput>,
) -> Result<Json<Document>, ApiError> {
    let document = state
        .db
        .update_document(id, input)?
        .ok_or_else(|| ApiError::NotFound("document not found".into()))?;
    Ok(Json(document))
}

async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.db.delete_document(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("document not found".into()))
    }
}

fn default_document_title(kind: DocumentKind) -> String {
    match kind {
        DocumentKind::Prd => "Product Requirements",
        DocumentKind::Persona => "User Persona",
        DocumentKind::CompetitiveAnalysis => "Competitive Analysis",
        DocumentKind::WireframeBrief => "Wireframe Brief",
    }
    .to_string()
}
