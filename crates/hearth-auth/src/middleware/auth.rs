//! Bearer token gate.
//!
//! Sits in front of every inbound call. Operations are partitioned into a
//! public set and a protected set; in the default configuration only
//! `logout` is protected; registration, login, OTP and password-reset
//! must stay reachable by unauthenticated callers.
//!
//! For protected operations the gate requires an `Authorization: Bearer`
//! credential, runs the token verifier (access-token class) and attaches
//! the decoded identity to the request for downstream handlers. The gate
//! itself is stateless.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware::from_fn_with_state};
//! use hearth_auth::middleware::{AuthState, require_auth};
//!
//! let app: Router = router
//!     .layer(from_fn_with_state(auth_state.clone(), require_auth));
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::error::AuthError;
use crate::token::{AccessTokenClaims, TokenVerifier};

// =============================================================================
// Operation Policy
// =============================================================================

/// Partition of operation names into public and protected sets.
#[derive(Debug, Clone)]
pub struct OperationPolicy {
    protected: HashSet<String>,
}

impl OperationPolicy {
    /// Creates a policy protecting exactly the given operations.
    #[must_use]
    pub fn protecting<I, S>(operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected: operations.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if the operation requires a verified bearer token.
    #[must_use]
    pub fn is_protected(&self, operation: &str) -> bool {
        self.protected.contains(operation)
    }
}

impl Default for OperationPolicy {
    /// The default configuration protects only `logout`.
    fn default() -> Self {
        Self::protecting(["logout"])
    }
}

// =============================================================================
// Auth Context
// =============================================================================

/// Decoded identity attached to allowed protected calls.
#[derive(Debug, Clone)]
pub struct AuthContext {
    claims: Arc<AccessTokenClaims>,
}

impl AuthContext {
    /// Wraps verified claims.
    #[must_use]
    pub fn new(claims: AccessTokenClaims) -> Self {
        Self {
            claims: Arc::new(claims),
        }
    }

    /// The authenticated user id.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    /// The authenticated user's email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.claims.email
    }

    /// The authenticated user's role.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.claims.role
    }

    /// The session id of the presented access token.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.claims.sid
    }

    /// The full claims set.
    #[must_use]
    pub fn claims(&self) -> &AccessTokenClaims {
        &self.claims
    }
}

// =============================================================================
// Gate
// =============================================================================

/// State required by the gate.
#[derive(Clone)]
pub struct AuthState {
    /// Token verifier (shares the revocation store with the orchestrator).
    pub verifier: Arc<TokenVerifier>,

    /// Public/protected operation partition.
    pub policy: Arc<OperationPolicy>,
}

impl AuthState {
    /// Creates gate state with the default policy.
    #[must_use]
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self {
            verifier,
            policy: Arc::new(OperationPolicy::default()),
        }
    }

    /// Replaces the operation policy.
    #[must_use]
    pub fn with_policy(mut self, policy: OperationPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Decides whether a call may proceed.
    ///
    /// Public operations are allowed untouched (`Ok(None)`). Protected
    /// operations require a bearer credential that passes access-token
    /// verification; the decoded identity is returned for attachment to
    /// the call context.
    ///
    /// # Errors
    ///
    /// Returns an authentication error when a protected operation carries
    /// no credential or a failing one.
    pub async fn check(
        &self,
        operation: &str,
        headers: &HeaderMap,
    ) -> Result<Option<AuthContext>, AuthError> {
        if !self.policy.is_protected(operation) {
            return Ok(None);
        }

        let token = bearer_token(headers)
            .ok_or_else(|| AuthError::unauthenticated("missing bearer token"))?;

        let claims = self.verifier.verify_access(token).await.map_err(|e| {
            debug!(operation = %operation, error = %e, "Protected call denied");
            AuthError::from(e)
        })?;

        debug!(
            operation = %operation,
            subject = %claims.sub,
            "Protected call allowed"
        );
        Ok(Some(AuthContext::new(claims)))
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// Axum middleware running the gate in front of every routed call.
///
/// The operation name is the final path segment (`/auth/logout` →
/// `logout`). Denied calls never reach their handler.
///
/// # Errors
///
/// Returns the gate's authentication error as the response.
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let operation = operation_name(request.uri().path()).to_string();

    if let Some(context) = state.check(&operation, request.headers()).await? {
        request.extensions_mut().insert(context);
    }

    Ok(next.run(request).await)
}

/// Derives the operation name from a request path.
fn operation_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

// =============================================================================
// Extractor
// =============================================================================

/// Axum extractor for the identity attached by [`require_auth`].
///
/// Rejects with `Unauthenticated` if the gate did not attach an identity,
/// which happens when a handler for a public operation asks for one.
pub struct BearerAuth(pub AuthContext);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(BearerAuth)
            .ok_or_else(|| AuthError::unauthenticated("no authenticated identity"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revocation::RevocationStore;
    use crate::storage::MemoryCache;
    use crate::token::jwt::{JwtService, SigningKeyPair};
    use axum::http::HeaderValue;
    use time::Duration;

    fn state() -> (AuthState, Arc<JwtService>) {
        let key = SigningKeyPair::generate_rsa("test-key").expect("keygen");
        let jwt = Arc::new(JwtService::new(key, "https://auth.test", "https://api.test"));
        let revocations = Arc::new(RevocationStore::new(
            Arc::new(MemoryCache::new()),
            Duration::minutes(180),
            Duration::days(7),
        ));
        let verifier = Arc::new(TokenVerifier::new(jwt.clone(), revocations));
        (AuthState::new(verifier), jwt)
    }

    fn headers_with_bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_default_policy_protects_only_logout() {
        let policy = OperationPolicy::default();
        assert!(policy.is_protected("logout"));
        for op in ["login", "send_otp", "verify_otp", "forgot_password", "reset_password"] {
            assert!(!policy.is_protected(op), "{op} should be public");
        }
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers_with_bearer("abc")), Some("abc"));
        assert_eq!(bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_operation_name_is_last_segment() {
        assert_eq!(operation_name("/auth/logout"), "logout");
        assert_eq!(operation_name("/login"), "login");
        assert_eq!(operation_name("login"), "login");
    }

    #[tokio::test]
    async fn test_public_operation_passes_without_credential() {
        let (state, _) = state();
        let allowed = state.check("login", &HeaderMap::new()).await.unwrap();
        assert!(allowed.is_none());
    }

    #[tokio::test]
    async fn test_protected_operation_requires_credential() {
        let (state, _) = state();
        let denied = state.check("logout", &HeaderMap::new()).await;
        assert!(matches!(denied, Err(AuthError::Unauthenticated { .. })));
    }

    #[tokio::test]
    async fn test_protected_operation_with_valid_token_attaches_identity() {
        let (state, jwt) = state();
        let claims = AccessTokenClaims::new(
            "https://auth.test",
            "https://api.test",
            "user-1",
            "a@x.com",
            "member",
            Duration::hours(3),
        );
        let token = jwt.encode(&claims).unwrap();

        let context = state
            .check("logout", &headers_with_bearer(&token))
            .await
            .unwrap()
            .expect("identity attached");
        assert_eq!(context.subject(), "user-1");
        assert_eq!(context.session_id(), claims.sid);
    }

    #[tokio::test]
    async fn test_protected_operation_with_garbage_token_denied() {
        let (state, _) = state();
        let denied = state.check("logout", &headers_with_bearer("garbage")).await;
        assert!(matches!(denied, Err(AuthError::Verify(_))));
    }
}
