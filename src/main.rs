mod app;
mod auth;
mod config;
mod error;
mod extract;
mod state;
mod users;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "user_service=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let state = AppState::init(config).await?;

    if let Some(admin) = state.config.admin.as_ref() {
        match users::services::ensure_admin(state.users.as_ref(), admin).await {
            Ok(Some(user)) => tracing::info!(user_id = %user.id, email = %user.email, "admin account created"),
            Ok(None) => tracing::debug!(email = %admin.email, "admin account already present"),
            Err(e) => anyhow::bail!("admin bootstrap failed: {e}"),
        }
    }

    let config = state.config.clone();
    let app = app::build_app(state);
    app::serve(app, &config).await
}
