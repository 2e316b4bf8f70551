//! Request extractors and middleware.
//!
//! - [`auth::AuthUser`] -- The authenticated user behind a Bearer token.
//! - [`auth::OptionalAuthUser`] -- Same, but anonymous requests pass through.
//! - [`rbac::RequireBusiness`] / [`rbac::RequireAdmin`] -- Role guards.
//! - [`client_ip::ClientIp`] -- The caller's IP, proxy-aware when configured.
//! - [`rate_limit`] -- Per-IP governor layers.
//! - [`security_headers`] -- Hardening headers on every response.

pub mod auth;
pub mod client_ip;
pub mod rate_limit;
pub mod rbac;
pub mod security_headers;
