use cragclub_backend::{account, config::Config, notify::Notifier, router, store, Global};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = Config::path();
    let loaded = Config::load_from(&path)?;
    let defaulted = loaded.is_none();
    let config = loaded.unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();
    if defaulted {
        tracing::warn!("config file {path} not found, using defaults");
    }

    let db = store::connect(&config.database_url, config.max_connections).await?;
    store::migrate(&db).await?;
    account::ensure_root(&db, &config).await?;

    let notifier = Notifier::from_config(config.mail_smtp.as_ref())?;
    let listen = config.listen;
    let global = Global::new(db, config, notifier);

    tracing::info!("listening on {listen}");
    axum::Server::bind(&listen)
        .serve(router(global).into_make_service())
        .await?;
    Ok(())
}
