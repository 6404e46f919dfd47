//! # rtk-auth
//!
//! Boundary to the external identity (IAM) service. Authentication is fully
//! delegated: the caller's cookie header is forwarded to
//! `GET {base}/auth/status/` and the JSON reply is trusted at face value.
//!
//! Upstream trouble (unreachable, non-2xx, malformed body) is never folded
//! into "not logged in" — each maps to its own [`error::AuthError`] kind so
//! a flaky IAM cannot masquerade as a clean 401.

pub mod client;
pub mod error;
pub mod roles;

pub use client::{AuthenticatedUser, IamClient};
pub use error::AuthError;
