use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use colloquy::application::ports::{ConversationRepository, UserRepository};
use colloquy::application::services::{ChatOptions, ChatService, ToolRegistry};
use colloquy::infrastructure::llm::create_streaming_llm_client;
use colloquy::infrastructure::observability::{TracingConfig, init_tracing};
use colloquy::infrastructure::persistence::{
    PgConversationRepository, PgUserRepository, create_pool, run_migrations,
};
use colloquy::infrastructure::tools::WeatherTool;
use colloquy::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(&TracingConfig::from_settings(&settings.logging, environment))
        .context("Failed to initialize tracing")?;

    tracing::info!(
        environment = %environment,
        port = settings.server.port,
        provider = %settings.llm.provider,
        "Starting colloquy"
    );

    let pool = create_pool(&settings.database.url, settings.database.max_connections)
        .await
        .context("Failed to connect to PostgreSQL")?;

    if settings.database.run_migrations {
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let conversation_repository: Arc<dyn ConversationRepository> =
        Arc::new(PgConversationRepository::new(pool.clone()));
    let user_repository: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool));

    let llm_client = Arc::new(
        create_streaming_llm_client(&settings.llm).context("Failed to configure LLM client")?,
    );
    let tools = Arc::new(ToolRegistry::new().with_tool(Arc::new(WeatherTool)));

    let chat_service = Arc::new(ChatService::new(
        llm_client,
        Arc::clone(&conversation_repository),
        tools,
        ChatOptions::from(&settings.chat),
    ));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        chat_service,
        conversation_repository,
        user_repository,
        settings,
    };

    let router = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
