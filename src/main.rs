//! Mergington Activities server
//!
//! Starts the REST API over an in-memory activity store.
//!
//! Usage:
//!   cargo run --bin mergington_activities -- --teachers-file teachers.json
//!   cargo run --bin mergington-cli -- login -u daniel -p <password>

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use mergington_activities::auth::Authenticator;
use mergington_activities::config::Config;
use mergington_activities::credentials::CredentialLoader;
use mergington_activities::rest::create_router;
use mergington_activities::storage::ActivityStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = Config::parse();
    let _log_guard = config.init_tracing();

    // Fail fast on a missing or malformed credential file; it is re-read per request after this.
    let credentials = CredentialLoader::new(&config.teachers_file);
    let teachers = credentials.load_teachers()?;
    info!(
        path = %credentials.path().display(),
        teachers = teachers.len(),
        "loaded teacher credentials"
    );

    let store = ActivityStore::seeded().with_capacity_enforcement(config.enforce_capacity);
    info!(
        activities = store.list_activities().len(),
        enforce_capacity = store.enforces_capacity(),
        "activity store ready"
    );

    let auth = Authenticator::new(credentials, config.jwt_secret.as_bytes());
    let app = create_router(store, auth, &config.static_dir);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
    }
}
