use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::db::models::{Account, Publication};
use crate::domain::interactions;
use crate::error::{AppError, AppResult};
use crate::extractors::RequireAuth;
use crate::routes::validate_id;
use crate::state::AppState;
use crate::store::{AccountStore, PublicationStore};

// -- Request types --

#[derive(Deserialize)]
pub struct CreatePublicationRequest {
    pub identifier: String,
    pub body: Option<String>,
    pub photo: Option<String>,
}

#[derive(Deserialize)]
pub struct EditPublicationRequest {
    pub identifier: String,
    pub body: Option<String>,
    pub photo: Option<String>,
}

#[derive(Deserialize)]
pub struct ActorRequest {
    pub identifier: String,
}

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub identifier: String,
    pub body: String,
}

#[derive(Deserialize)]
pub struct EditCommentRequest {
    pub identifier: String,
    pub comment_id: String,
    pub body: String,
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub identifier: String,
    pub comment_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/publications",
            get(list_publications).post(create_publication),
        )
        .route(
            "/api/publications/{id}",
            get(get_publication)
                .patch(edit_publication)
                .delete(delete_publication),
        )
        .route("/api/publications/{id}/like", patch(like_publication))
        .route(
            "/api/publications/{id}/comments",
            patch(create_comment).delete(delete_comment),
        )
        .route("/api/publications/{id}/comments/edit", patch(edit_comment))
        .route("/api/publications/{id}/comments/like", patch(like_comment))
}

// -- Lookup helpers --

async fn load_publication(state: &AppState, id: &str) -> AppResult<Publication> {
    validate_id(id)?;
    state
        .publications
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("publication doesn't exist".into()))
}

async fn load_account(state: &AppState, id: &str) -> AppResult<Account> {
    validate_id(id)?;
    state
        .accounts
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("couldn't find the account".into()))
}

// -- Handlers --

/// GET /api/publications — newest first
async fn list_publications(State(state): State<AppState>) -> AppResult<Response> {
    let publications = state.publications.all().await?;
    Ok(Json(publications).into_response())
}

/// GET /api/publications/{id}
async fn get_publication(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let publication = load_publication(&state, &id).await?;
    Ok(Json(publication).into_response())
}

/// POST /api/publications
async fn create_publication(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Json(req): Json<CreatePublicationRequest>,
) -> AppResult<Response> {
    let creator = load_account(&state, &req.identifier).await?;

    let publication = interactions::new_publication(&creator, req.body, req.photo, Utc::now())?;
    state.publications.create(&publication).await?;

    Ok((StatusCode::CREATED, Json(publication)).into_response())
}

/// PATCH /api/publications/{id} — owner edits body and/or photo
async fn edit_publication(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<EditPublicationRequest>,
) -> AppResult<Response> {
    let actor = load_account(&state, &req.identifier).await?;
    let mut publication = load_publication(&state, &id).await?;

    interactions::edit_publication(&mut publication, &actor.id, req.body, req.photo)?;
    state.publications.update(&publication).await?;

    Ok(Json(publication).into_response())
}

/// DELETE /api/publications/{id} — owner only
async fn delete_publication(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<ActorRequest>,
) -> AppResult<Response> {
    validate_id(&req.identifier)?;
    let publication = load_publication(&state, &id).await?;

    interactions::ensure_owner(&publication, &req.identifier)?;
    state.publications.delete(&id).await?;

    Ok(Json(json!({ "Message": "publication deleted" })).into_response())
}

/// PATCH /api/publications/{id}/like — toggle the acting account's like
async fn like_publication(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<ActorRequest>,
) -> AppResult<Response> {
    let actor = load_account(&state, &req.identifier).await?;
    let mut publication = load_publication(&state, &id).await?;

    interactions::toggle_like(&mut publication, &actor.id);
    state.publications.update(&publication).await?;

    Ok(Json(publication).into_response())
}

/// PATCH /api/publications/{id}/comments — add a comment
async fn create_comment(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<Response> {
    let author = load_account(&state, &req.identifier).await?;
    let mut publication = load_publication(&state, &id).await?;

    interactions::add_comment(&mut publication, &author, &req.body, Utc::now())?;
    state.publications.update(&publication).await?;

    Ok(Json(publication).into_response())
}

/// PATCH /api/publications/{id}/comments/edit — author edits a comment
async fn edit_comment(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<EditCommentRequest>,
) -> AppResult<Response> {
    validate_id(&req.comment_id)?;
    let author = load_account(&state, &req.identifier).await?;
    let mut publication = load_publication(&state, &id).await?;

    interactions::edit_comment(&mut publication, &req.comment_id, &author, &req.body)?;
    state.publications.update(&publication).await?;

    Ok(Json(publication).into_response())
}

/// PATCH /api/publications/{id}/comments/like — toggle a like on one
/// comment; also the path that brings the comment's author snapshot
/// current.
async fn like_comment(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> AppResult<Response> {
    validate_id(&req.comment_id)?;
    let actor = load_account(&state, &req.identifier).await?;
    let mut publication = load_publication(&state, &id).await?;

    let author_id = publication
        .comments
        .iter()
        .find(|c| c.id == req.comment_id)
        .ok_or_else(|| AppError::NotFound("comment doesn't exist".into()))?
        .identifier
        .clone();
    let author = load_account(&state, &author_id).await?;

    let comment = interactions::toggle_comment_like(
        &mut publication,
        &req.comment_id,
        &actor.id,
        author.profile_image.as_deref(),
    )?;
    state.publications.update(&publication).await?;

    Ok(Json(comment).into_response())
}

/// DELETE /api/publications/{id}/comments — author deletes a comment
async fn delete_comment(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> AppResult<Response> {
    validate_id(&req.comment_id)?;
    let actor = load_account(&state, &req.identifier).await?;
    let mut publication = load_publication(&state, &id).await?;

    interactions::delete_comment(&mut publication, &req.comment_id, &actor.id)?;
    state.publications.update(&publication).await?;

    Ok(Json(publication).into_response())
}
