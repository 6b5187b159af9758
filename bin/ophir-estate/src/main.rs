//! # Ophir Estate
//!
//! Entry point: loads the settings, picks the storage plugins named by
//! `backend.kind`, and serves the API until Ctrl+C or SIGTERM.

use std::sync::Arc;

use anyhow::{Context, Result};
use ophir_api::AppState;
use ophir_auth_simple::SimpleAuthProvider;
use ophir_config::{BackendKind, DotenvSource, LogFormat, LogSettings, Settings};
use ophir_core::models::Credential;
use ophir_core::traits::SystemClock;
use ophir_store_memory::{MemoryContactRepo, MemoryCredentialStore, MemoryMediaStore, MemoryPropertyRepo};
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = DotenvSource::load();
    let settings = Settings::load().context("failed to load configuration")?;
    init_tracing(&settings.log);
    dotenv.log();

    let state = build_state(&settings)?;
    let app = ophir_api::router(state, &settings.server.allowed_origins);

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(%address, backend = ?settings.backend.kind, production = settings.server.production, "Ophir Estate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

/// `RUST_LOG` wins over `log.filter` when set.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    match log.format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn build_state(settings: &Settings) -> Result<AppState> {
    match settings.backend.kind {
        BackendKind::Memory => Ok(memory_state(settings)),
        BackendKind::Rest => rest_state(settings),
    }
}

fn memory_state(settings: &Settings) -> AppState {
    let seeds = &settings.auth.credentials;
    if seeds.is_empty() {
        warn!("memory backend has no seeded credentials; nobody can log in");
    }
    let credentials = seeds.iter().map(|seed| Credential {
        email: seed.email.clone(),
        password: seed.password.expose_secret().to_string(),
        role: seed.role,
    });

    let media_prefix = if settings.storage.url.is_empty() {
        "/media".to_string()
    } else {
        settings.storage.url.clone()
    };

    AppState {
        contacts: Arc::new(MemoryContactRepo::new()),
        properties: Arc::new(MemoryPropertyRepo::new()),
        credentials: Arc::new(MemoryCredentialStore::new(credentials)),
        media: Arc::new(MemoryMediaStore::new(media_prefix)),
        auth: Arc::new(SimpleAuthProvider::new()),
        clock: Arc::new(SystemClock),
        secure_cookies: settings.server.production,
    }
}

#[cfg(feature = "rest")]
fn rest_state(settings: &Settings) -> Result<AppState> {
    use ophir_db_rest::{RestClient, RestContactRepo, RestCredentialStore, RestPropertyRepo};
    use ophir_storage_rest::RestMediaStore;
    use secrecy::SecretString;

    // presence is checked by Settings::validate
    let copy = |key: &Option<SecretString>, name: &str| -> Result<SecretString> {
        key.as_ref()
            .map(|k| SecretString::from(k.expose_secret().to_string()))
            .with_context(|| format!("{name} is not set"))
    };

    let client = Arc::new(RestClient::new(
        settings.backend.url.clone(),
        copy(&settings.backend.service_key, "backend.service_key")?,
    ));
    let media = RestMediaStore::new(
        settings.storage.url.clone(),
        copy(&settings.storage.service_key, "storage.service_key")?,
        settings.storage.bucket.clone(),
    );

    Ok(AppState {
        contacts: Arc::new(RestContactRepo::new(client.clone())),
        properties: Arc::new(RestPropertyRepo::new(client.clone())),
        credentials: Arc::new(RestCredentialStore::new(client)),
        media: Arc::new(media),
        auth: Arc::new(SimpleAuthProvider::new()),
        clock: Arc::new(SystemClock),
        secure_cookies: settings.server.production,
    })
}

#[cfg(not(feature = "rest"))]
fn rest_state(_settings: &Settings) -> Result<AppState> {
    anyhow::bail!("backend.kind = \"rest\" needs a build with the `rest` feature")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
