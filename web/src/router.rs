//! Route table.
//!
//! Everything lives under `/api`; `/health` sits outside for load
//! balancers. Authentication is per-handler through extractors, not through
//! route-level middleware, so the table below is the complete picture of
//! which endpoints exist.

use crate::handlers::{catalog, health, lifecycle, releases};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the portal router.
///
/// Session-gated (employee portal):
/// - `POST /api/tutorial-releases`
/// - `GET  /api/tutorial-releases`
/// - `POST /api/tutorial-releases/bulk`
/// - `GET  /api/reports/tutorial-releases`
/// - `GET  /api/tutorials`
/// - `GET  /api/job-roles`
///
/// API-key-gated (automation query API):
/// - `POST /api/tutorial-releases/:id/status`
/// - `GET  /api/tutorial-releases/status/:status`
/// - `GET  /api/tutorial-releases/pending`
/// - `GET  /api/tutorial-releases/stats`
#[must_use]
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/tutorial-releases",
            post(releases::create_release).get(releases::list_releases),
        )
        .route("/tutorial-releases/bulk", post(releases::bulk_create))
        // Static segments before the `/:id/status` capture.
        .route("/tutorial-releases/pending", get(lifecycle::list_pending))
        .route("/tutorial-releases/stats", get(lifecycle::stats))
        .route(
            "/tutorial-releases/status/:status",
            get(lifecycle::list_by_status),
        )
        .route(
            "/tutorial-releases/:id/status",
            post(lifecycle::update_status),
        )
        .route("/reports/tutorial-releases", get(releases::report))
        .route("/tutorials", get(catalog::list_tutorials))
        .route("/job-roles", get(catalog::list_job_roles));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
