use notestack::config::Config;
use notestack::{auth::TokenService, build_app, db, AppState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let pool = db::init_pool(&config.database_url, config.max_connections).await?;
    let state = AppState::new(pool, TokenService::from_config(&config.auth));
    let app = build_app(state);

    let listener = TcpListener::bind(config.bind_addr).await?;

    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
