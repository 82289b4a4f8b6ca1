//! # Axum Helpers
//!
//! Shared HTTP plumbing for the POS services.
//!
//! - **[`auth`]**: HS256 bearer-token verification
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: structured error responses with error codes
//! - **[`extractors`]**: JSON-or-form body extractor
//! - **[`audit`]**: audit events for mutating operations

pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{ACCESS_TOKEN_TTL, JwtAuth, JwtClaims, JwtConfig, jwt_auth_middleware};

pub use server::{
    HealthCheckFuture, HealthResponse, build_router, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::{create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{JsonOrForm, JsonOrFormRejection};

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
