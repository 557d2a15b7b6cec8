//! Request interception.
//!
//! A transport-layer gate that partitions operations into public and
//! protected sets, extracts bearer credentials from protected calls and
//! rejects them before they reach business logic.

pub mod auth;

pub use auth::{AuthContext, AuthState, BearerAuth, OperationPolicy, bearer_token, require_auth};
