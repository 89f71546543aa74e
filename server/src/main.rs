//! Tutorial release portal HTTP server.
//!
//! Wires the release lifecycle core to its runtime collaborators: the store
//! (in-memory or PostgreSQL depending on `DATABASE_URL`), the fulfillment
//! webhook, the static session table and the shared automation key.

mod config;

use crate::config::{Config, DEV_API_KEY};
use release_portal_releases::clock::{ReferenceClock, SystemClock};
use release_portal_releases::config::{LifecycleConfig, WebhookConfig};
use release_portal_releases::providers::{
    CredentialValidator, FulfillmentNotifier, JobRoleRepository, ReleaseStore, StaticApiKey,
    TutorialCatalog,
};
use release_portal_releases::stores::{
    MemoryCatalog, MemoryJobRoles, MemoryReleaseStore, PostgresCatalog, PostgresJobRoles,
    PostgresReleaseStore, StaticSessions,
};
use release_portal_releases::types::Employee;
use release_portal_releases::webhook::{RecordingNotifier, WebhookNotifier};
use release_portal_web::{router, AppState};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "release_portal=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tutorial release portal");

    // Load configuration
    let config = Config::from_env();
    if config.auth.api_key == DEV_API_KEY {
        warn!("API_KEY not set, running with the development key");
    }

    let clock: Arc<dyn ReferenceClock> = Arc::new(SystemClock);
    let lifecycle = LifecycleConfig::new()
        .with_validity_days(config.lifecycle.validity_days)
        .with_reference_zone(config.lifecycle.reference_zone);
    info!(
        validity_days = config.lifecycle.validity_days,
        reference_zone = %config.lifecycle.reference_zone,
        "Lifecycle configured"
    );

    let employee = Employee {
        id: config.auth.employee_id,
        name: config.auth.employee_name.clone(),
        email: config.auth.employee_email.clone(),
        department: config.auth.employee_department.clone(),
    };

    // Store selection: PostgreSQL when configured, in-memory otherwise
    let (store, catalog, job_roles): (
        Arc<dyn ReleaseStore>,
        Arc<dyn TutorialCatalog>,
        Arc<dyn JobRoleRepository>,
    ) = if let Some(url) = &config.database_url {
        info!("Connecting to PostgreSQL...");
        let pool = sqlx::PgPool::connect(url).await?;
        let store = PostgresReleaseStore::new(pool.clone(), clock.clone(), lifecycle.clone());
        store.migrate().await?;
        store.ensure_employee(&employee).await?;
        info!("Database ready");
        (
            Arc::new(store),
            Arc::new(PostgresCatalog::new(pool.clone())),
            Arc::new(PostgresJobRoles::new(pool)),
        )
    } else {
        warn!("DATABASE_URL not set, using the in-memory store");
        let store = MemoryReleaseStore::new(clock.clone(), lifecycle.clone());
        store.add_employee(employee.clone())?;
        (
            Arc::new(store),
            Arc::new(MemoryCatalog::new(Vec::new())),
            Arc::new(MemoryJobRoles::new(Vec::new())),
        )
    };

    // Webhook: real dispatcher when an endpoint is configured
    let notifier: Arc<dyn FulfillmentNotifier> = match &config.webhook.url {
        Some(url) => {
            info!(webhook_url = %url, "Webhook dispatcher enabled");
            Arc::new(WebhookNotifier::new(
                WebhookConfig::new(url.clone())
                    .with_timeout(Duration::from_secs(config.webhook.timeout_secs)),
            )?)
        }
        None => {
            warn!("WEBHOOK_URL not set, recording dispatches in-process");
            Arc::new(RecordingNotifier::new())
        }
    };

    let sessions = Arc::new(StaticSessions::new());
    sessions.insert(config.auth.session_token.clone(), employee);

    let credentials: Arc<dyn CredentialValidator> =
        Arc::new(StaticApiKey::new(config.auth.api_key.clone()));

    let state = AppState::new(store, catalog, notifier, sessions, credentials, job_roles);
    let app = router(state);

    // Create server address
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
