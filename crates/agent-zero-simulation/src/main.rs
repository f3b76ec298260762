// Purpose: Provides the entry point for the agent-zero CLI.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing with a reasonable default configuration
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agent_zero_simulation=info,agent_zero_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run the CLI
    agent_zero_simulation::cli::run()
}
