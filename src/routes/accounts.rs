use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth;
use crate::db::models::Account;
use crate::domain::friendship;
use crate::error::{AppError, AppResult};
use crate::extractors::RequireAuth;
use crate::propagation;
use crate::routes::validate_id;
use crate::state::AppState;
use crate::store::AccountStore;

// -- Request types --

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateImagesRequest {
    pub profile_image: Option<String>,
    pub banner_image: Option<String>,
}

#[derive(Deserialize)]
pub struct NotificationRequest {
    pub account_id: String,
}

// -- Response types --

#[derive(Serialize)]
struct AuthAccount {
    id: String,
    name: String,
    email: String,
}

#[derive(Serialize)]
struct AuthResponse {
    account: AuthAccount,
    token: String,
}

impl AuthResponse {
    fn for_account(account: &Account) -> Self {
        Self {
            account: AuthAccount {
                id: account.id.clone(),
                name: account.name.clone(),
                email: account.email.clone(),
            },
            token: auth::generate_token(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/accounts", get(list_accounts))
        .route("/api/accounts/register", post(register))
        .route("/api/accounts/login", post(login))
        .route("/api/accounts/{id}", get(get_account))
        .route("/api/accounts/{id}/others", get(list_other_accounts))
        .route("/api/accounts/{id}/images", patch(update_images))
        .route(
            "/api/accounts/{id}/notifications",
            patch(send_notification).delete(reject_notification),
        )
        .route(
            "/api/accounts/{id}/notifications/accept",
            patch(accept_notification),
        )
}

// -- Handlers --

/// GET /api/accounts — every account
async fn list_accounts(State(state): State<AppState>) -> AppResult<Response> {
    let accounts = state.accounts.all().await?;
    let public: Vec<_> = accounts.iter().map(Account::public).collect();
    Ok(Json(public).into_response())
}

/// GET /api/accounts/{id}/others — every account except the given one
async fn list_other_accounts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let accounts = state.accounts.all().await?;
    let public: Vec<_> = accounts
        .iter()
        .filter(|a| a.id != id)
        .map(Account::public)
        .collect();
    Ok(Json(public).into_response())
}

/// GET /api/accounts/{id}
async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    validate_id(&id)?;

    let account = state
        .accounts
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("couldn't find the account".into()))?;

    Ok(Json(account.public()).into_response())
}

/// POST /api/accounts/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Response> {
    let name = req.name.trim().to_string();
    let email = req.email.trim().to_string();

    if name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "name, email and password are required".into(),
        ));
    }

    if state.accounts.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("account already exists".into()));
    }

    if !email_is_valid(&email) {
        return Err(AppError::Validation("email must be valid".into()));
    }

    let password_hash = auth::hash_password(&req.password, state.config.auth.bcrypt_cost)?;

    let account = Account {
        id: uuid::Uuid::now_v7().to_string(),
        name,
        email,
        password_hash,
        profile_image: None,
        banner_image: None,
        friends: vec![],
        created_at: Utc::now(),
    };

    state.accounts.create(&account).await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::for_account(&account))).into_response())
}

/// POST /api/accounts/login
async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> AppResult<Response> {
    // One message for both failure modes
    let rejected = || AppError::Validation("email or password are not correct".into());

    let account = state
        .accounts
        .find_by_email(req.email.trim())
        .await?
        .ok_or_else(rejected)?;

    if !auth::verify_password(&req.password, &account.password_hash) {
        return Err(rejected());
    }

    Ok(Json(AuthResponse::for_account(&account)).into_response())
}

/// PATCH /api/accounts/{id}/images — update profile and/or banner image.
/// A profile change fans out to friend-edge and publication-creator
/// snapshots.
async fn update_images(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<UpdateImagesRequest>,
) -> AppResult<Response> {
    validate_id(&id)?;

    let mut account = state
        .accounts
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("couldn't find the account".into()))?;

    let profile_image = req.profile_image.filter(|s| !s.trim().is_empty());
    let banner_image = req.banner_image.filter(|s| !s.trim().is_empty());

    if profile_image.is_none() && banner_image.is_none() {
        return Err(AppError::Validation("no data provided".into()));
    }

    let profile_changed = profile_image.is_some();
    if let Some(profile_image) = profile_image {
        account.profile_image = Some(profile_image);
    }
    if let Some(banner_image) = banner_image {
        account.banner_image = Some(banner_image);
    }

    state.accounts.update(&account).await?;

    if profile_changed {
        propagation::propagate_profile_image(&state.accounts, &state.publications, &account).await;
    }

    Ok(Json(account.public()).into_response())
}

/// PATCH /api/accounts/{id}/notifications — send a friend request from
/// {id} to the account in the body.
async fn send_notification(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<NotificationRequest>,
) -> AppResult<Response> {
    validate_id(&id)?;
    validate_id(&req.account_id)?;

    let me = state
        .accounts
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("couldn't find the account".into()))?;
    let mut target = state
        .accounts
        .get(&req.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("couldn't find the account".into()))?;

    friendship::send_notification(&me, &mut target, Utc::now())?;
    state.accounts.update(&target).await?;

    Ok(Json(target.public()).into_response())
}

/// PATCH /api/accounts/{id}/notifications/accept — {id} accepts the
/// pending request sent by the account in the body.
async fn accept_notification(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<NotificationRequest>,
) -> AppResult<Response> {
    validate_id(&id)?;
    validate_id(&req.account_id)?;

    let mut me = state
        .accounts
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("couldn't find the account".into()))?;
    let mut from = state
        .accounts
        .get(&req.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("couldn't find the account".into()))?;

    friendship::accept_notification(&mut me, &mut from, Utc::now())?;

    state.accounts.update(&me).await?;
    state.accounts.update(&from).await?;

    Ok(Json(json!({ "me": me.public(), "from": from.public() })).into_response())
}

/// DELETE /api/accounts/{id}/notifications — decline a pending request
/// or dissolve a friendship between {id} and the account in the body.
async fn reject_notification(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<NotificationRequest>,
) -> AppResult<Response> {
    validate_id(&id)?;
    validate_id(&req.account_id)?;

    let mut me = state
        .accounts
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("couldn't find the account".into()))?;
    let mut other = state
        .accounts
        .get(&req.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("couldn't find the account".into()))?;

    let removed = friendship::reject_or_remove(&mut me, &mut other)?;

    if removed.from_me {
        state.accounts.update(&me).await?;
    }
    if removed.from_other {
        state.accounts.update(&other).await?;
    }

    Ok(Json(json!({ "Message": "notification or friend removed" })).into_response())
}

fn email_is_valid(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
}
