//! REST API layer using Axum
//!
//! - Public: `/`, `/login`, `/activities`, `/health`, `/static/*`
//! - Identity-aware: `/me`
//! - Teachers only: signup / unregister on `/activities/:activity_name/...`

use axum::{
    extract::{Path, Query, State},
    http::{header, Request},
    middleware::{self, Next},
    response::{Redirect, Response},
    routing::{delete, get, post},
    Extension, Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::auth::{bearer_token, require_auth, Authenticator, Identity, LoginResponse};
use crate::error::AppError;
use crate::models::Activities;
use crate::storage::ActivityStore;

pub const FRONTEND_ENTRY: &str = "/static/index.html";

/// Shared app state for REST handlers (Arc-wrapped for concurrency)
pub struct AppState {
    store: ActivityStore,
    auth: Authenticator,
}

#[derive(Deserialize, Default)]
pub struct LoginParams {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct EmailParams {
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Attach the caller's `Identity` to the request. Never rejects on a bad token.
async fn identity_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);

    let identity = state.auth.resolve_current_user(token)?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

async fn require_auth_middleware(
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    match req.extensions().get::<Identity>() {
        Some(identity) => {
            require_auth(identity)?;
        }
        None => return Err(AppError::Unauthenticated),
    }
    Ok(next.run(req).await)
}

/// Create Axum router over the given store and authenticator
pub fn create_router(
    store: ActivityStore,
    auth: Authenticator,
    static_dir: impl AsRef<FsPath>,
) -> Router {
    let state = Arc::new(AppState { store, auth });

    let teacher_routes = Router::new()
        .route("/activities/:activity_name/signup", post(signup_handler))
        .route("/activities/:activity_name/unregister", delete(unregister_handler))
        .route_layer(middleware::from_fn(require_auth_middleware));

    let identified_routes = Router::new()
        .route("/me", get(me_handler))
        .merge(teacher_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), identity_middleware));

    Router::new()
        .route("/", get(root_handler))
        .route("/login", post(login_handler))
        .route("/activities", get(list_activities_handler))
        .route("/health", get(health_handler))
        .merge(identified_routes)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root_handler() -> Redirect {
    Redirect::temporary(FRONTEND_ENTRY)
}

/// Credentials come from the query string, or from an urlencoded form body.
async fn login_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginParams>,
    form: Option<Form<LoginParams>>,
) -> Result<Json<LoginResponse>, AppError> {
    let form = form.map(|Form(f)| f).unwrap_or_default();
    let username = query
        .username
        .or(form.username)
        .ok_or(AppError::MissingParameter("username"))?;
    let password = query
        .password
        .or(form.password)
        .ok_or(AppError::MissingParameter("password"))?;

    state.auth.login(&username, &password).map(Json)
}

async fn me_handler(Extension(identity): Extension<Identity>) -> Json<MeResponse> {
    Json(MeResponse {
        authenticated: identity.username().is_some(),
        username: identity.username().map(str::to_owned),
    })
}

async fn list_activities_handler(State(state): State<Arc<AppState>>) -> Json<Activities> {
    Json(state.store.list_activities())
}

async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(activity_name): Path<String>,
    Query(params): Query<EmailParams>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = params.email.ok_or(AppError::MissingParameter("email"))?;
    let message = state.store.signup(&activity_name, &email)?;

    info!(
        teacher = identity.username(),
        activity = %activity_name,
        email = %email,
        "student signed up"
    );
    Ok(Json(MessageResponse { message }))
}

async fn unregister_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(activity_name): Path<String>,
    Query(params): Query<EmailParams>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = params.email.ok_or(AppError::MissingParameter("email"))?;
    let message = state.store.unregister(&activity_name, &email)?;

    info!(
        teacher = identity.username(),
        activity = %activity_name,
        email = %email,
        "student unregistered"
    );
    Ok(Json(MessageResponse { message }))
}

/// Health check handler
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
