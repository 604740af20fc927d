use axum::{
    Extension, Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, LoginRequest, LoginResponse, RegisterRequest};
use crate::db::User;
use crate::models::Abilities;
use crate::services::ResolvedToken;

/// Identity attached to requests that passed the auth gate.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,

    /// Digest of the presented secret, used to revoke exactly this token.
    pub token_hash: String,

    pub abilities: Abilities,
}

impl From<ResolvedToken> for AuthContext {
    fn from(resolved: ResolvedToken) -> Self {
        Self {
            user: resolved.user,
            token_hash: resolved.token_hash,
            abilities: resolved.abilities,
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Requires `Authorization: Bearer <secret>` and resolves it to a user.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(secret) = extract_bearer(request.headers()).map(str::to_owned) else {
        return Err(ApiError::unauthorized("Missing token"));
    };

    let resolved = state.token_service().resolve(&secret).await?;

    tracing::Span::current().record("user_id", resolved.user.id);
    request.extensions_mut().insert(AuthContext::from(resolved));

    Ok(next.run(request).await)
}

/// The scheme is matched case-sensitively.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|secret| !secret.is_empty())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let Json(payload) = payload?;

    let user = state
        .auth_service()
        .register(&payload.name, &payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_status(
            StatusCode::CREATED,
            "User registered",
            user,
        )),
    ))
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let Json(payload) = payload?;

    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth_service()
        .login(
            &payload.email,
            &payload.password,
            payload.token_name.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse::success(
        "Login successful",
        LoginResponse {
            token: result.token.secret,
        },
    )))
}

/// POST /logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.auth_service().logout(&auth.token_hash).await?;
    Ok(Json(ApiResponse::message(StatusCode::OK, "Logged out")))
}

/// GET /me
pub async fn me(Extension(auth): Extension<AuthContext>) -> Json<ApiResponse<User>> {
    Json(ApiResponse::success("Authenticated user", auth.user))
}
