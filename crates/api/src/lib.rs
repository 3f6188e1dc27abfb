//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for journals, period status, close runs and accounts
//! - Bearer token authentication middleware
//! - Mapping of domain errors onto the HTTP error body

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::header::AUTHORIZATION;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use closebook_db::{
    AccountRepository, BookRepository, CloseRunRepository, FiscalPeriodRepository,
    JournalRepository, PeriodStatusRepository,
};
use closebook_shared::JwtService;

pub use error::ApiError;

/// Upper bound on a single request, close runs included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// `lock_timeout` applied to posting and close transactions.
    pub lock_timeout_ms: u64,
}

impl AppState {
    pub(crate) fn journals(&self) -> JournalRepository {
        JournalRepository::new((*self.db).clone()).with_lock_timeout(self.lock_timeout_ms)
    }

    pub(crate) fn close_runs(&self) -> CloseRunRepository {
        CloseRunRepository::new((*self.db).clone()).with_lock_timeout(self.lock_timeout_ms)
    }

    pub(crate) fn period_statuses(&self) -> PeriodStatusRepository {
        PeriodStatusRepository::new((*self.db).clone())
    }

    pub(crate) fn fiscal_periods(&self) -> FiscalPeriodRepository {
        FiscalPeriodRepository::new((*self.db).clone())
    }

    pub(crate) fn books(&self) -> BookRepository {
        BookRepository::new((*self.db).clone())
    }

    pub(crate) fn accounts(&self) -> AccountRepository {
        AccountRepository::new((*self.db).clone())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(SetSensitiveRequestHeadersLayer::new([AUTHORIZATION]))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
