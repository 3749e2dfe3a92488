#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use pert_tool::{Config, PlanningSession, http_api};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pert_tool=info")),
        )
        .init();

    let config = Config::from_env()?;
    let store = config.open_store()?;
    tracing::info!(store = ?config.store, "opened project store");

    println!("pert-tool HTTP API listening on http://{}", config.http_addr);
    let state = http_api::AppState::new(PlanningSession::new(store))
        .with_display_unit(config.display_unit);
    http_api::serve(config.http_addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
