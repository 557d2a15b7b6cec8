//! Axum handlers for the auth operations.
//!
//! A thin JSON surface over [`AuthService`]; the RPC/GraphQL gateway in
//! front of the platform talks to these endpoints. Handlers stay free of
//! business logic: status mapping happens in [`AuthError`]'s
//! `IntoResponse` and everything else in the orchestrator.
//!
//! # Usage
//!
//! ```ignore
//! use hearth_auth::http::{ApiState, router};
//!
//! let app = router(ApiState::new(auth));
//! axum::serve(listener, app).await?;
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    middleware::from_fn_with_state,
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::middleware::{AuthState, bearer_token, require_auth};
use crate::service::AuthService;
use crate::token::TokenPair;
use crate::types::Destination;

// =============================================================================
// State and Router
// =============================================================================

/// State shared by all auth handlers.
#[derive(Clone)]
pub struct ApiState {
    /// The auth orchestrator.
    pub auth: Arc<AuthService>,

    /// Gate state for the request interceptor layer.
    pub gate: AuthState,
}

impl ApiState {
    /// Wraps an orchestrator, deriving the gate from its verifier.
    #[must_use]
    pub fn new(auth: Arc<AuthService>) -> Self {
        let gate = AuthState::new(auth.verifier());
        Self { auth, gate }
    }
}

/// Builds the auth router with the request interceptor layered in front.
#[must_use]
pub fn router(state: ApiState) -> Router {
    let gate = state.gate.clone();
    Router::new()
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/send_otp", post(send_otp_handler))
        .route("/auth/verify_otp", post(verify_otp_handler))
        .route("/auth/forgot_password", post(forgot_password_handler))
        .route("/auth/reset_password", post(reset_password_handler))
        .layer(from_fn_with_state(gate, require_auth))
        .with_state(state)
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Logout request body. The access token travels in the Authorization
/// header; the refresh token is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogoutRequest {
    /// Refresh token to revoke alongside the session.
    pub refresh_token: Option<String>,
}

/// One-time-code request body.
#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    /// Where to deliver the code.
    pub destination: Destination,
}

/// One-time-code verification body.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    /// The destination the code was sent to.
    pub destination: Destination,
    /// The presented code.
    pub code: String,
}

/// Password-reset body.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    /// The destination the reset code was sent to.
    pub destination: Destination,
    /// The presented code.
    pub code: String,
    /// The replacement password.
    pub new_password: String,
}

/// Access-token-only response (OTP login path).
#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    /// The minted access token.
    pub access_token: String,
}

/// Generic success response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Always `true` on the success path.
    pub success: bool,
}

impl StatusResponse {
    fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn login_handler(
    State(state): State<ApiState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let pair = state.auth.login(&body.email, &body.password).await?;
    Ok(Json(pair))
}

async fn logout_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Option<Json<LogoutRequest>>,
) -> Result<Json<StatusResponse>, AuthError> {
    // The gate already verified this token; the orchestrator re-runs
    // verification itself so the operation stays safe to call directly.
    let access_token =
        bearer_token(&headers).ok_or_else(|| AuthError::unauthenticated("missing bearer token"))?;
    let refresh_token = body.and_then(|Json(b)| b.refresh_token);

    state
        .auth
        .logout(access_token, refresh_token.as_deref())
        .await?;
    Ok(StatusResponse::ok())
}

async fn send_otp_handler(
    State(state): State<ApiState>,
    Json(body): Json<SendOtpRequest>,
) -> Result<Json<StatusResponse>, AuthError> {
    state.auth.send_otp(&body.destination).await?;
    Ok(StatusResponse::ok())
}

async fn verify_otp_handler(
    State(state): State<ApiState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<AccessTokenResponse>, AuthError> {
    let access_token = state.auth.verify_otp(&body.destination, &body.code).await?;
    Ok(Json(AccessTokenResponse { access_token }))
}

async fn forgot_password_handler(
    State(state): State<ApiState>,
    Json(body): Json<SendOtpRequest>,
) -> Result<Json<StatusResponse>, AuthError> {
    state.auth.forgot_password(&body.destination).await?;
    Ok(StatusResponse::ok())
}

async fn reset_password_handler(
    State(state): State<ApiState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<StatusResponse>, AuthError> {
    state
        .auth
        .reset_password(&body.destination, &body.code, &body.new_password)
        .await?;
    Ok(StatusResponse::ok())
}
