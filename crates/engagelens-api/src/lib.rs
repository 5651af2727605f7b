//! Axum HTTP API for engagement analysis.
//!
//! This crate provides:
//! - `POST /analyze-engagement` multipart upload returning the engagement report
//! - Liveness and readiness probes
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::{build_analyzer, AppState, FfmpegProbe, ReadinessProbe};
