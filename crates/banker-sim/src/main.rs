// Purpose: Provides the entry point for the banker-sim CLI.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with a reasonable default configuration
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banker_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    banker_sim::cli::run().await
}
