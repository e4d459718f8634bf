/// Aelia ID - ID card generation backend
use aelia_id::{
    config::{ServerConfig, DEFAULT_LOG_FILTER},
    context::AppContext,
    error::AeliaResult,
    server,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AeliaResult<()> {
    // Load configuration first so RUST_LOG from .env is honoured
    let config = ServerConfig::from_env()?;

    // Initialize logging
    let (filter, log_filter) = match EnvFilter::try_new(&config.logging.level) {
        Ok(filter) => (filter, config.logging.level.as_str()),
        Err(_) => (EnvFilter::new(DEFAULT_LOG_FILTER), DEFAULT_LOG_FILTER),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    tracing::info!("Log filter: {}", log_filter);

    let ctx = AppContext::new(config).await?;

    server::serve(ctx).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    _         _ _
   / \   ___ | (_) __ _
  / _ \ / _ \| | |/ _` |
 / ___ \  __/| | | (_| |
/_/   \_\___||_|_|\__,_|

        Aelia ID card backend v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
