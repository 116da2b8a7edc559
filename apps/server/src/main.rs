use goaltrack_server::api::app_router;
use goaltrack_server::config::Config;
use goaltrack_server::main_lib::{build_state, init_tracing};
use goaltrack_server::scheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing();
    let state = build_state(&config).await?;

    // Background passes: expiration detect/archive and the two warning tiers.
    scheduler::start_schedulers(state.clone(), &config);

    let router = app_router(state, &config);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
