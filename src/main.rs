//! Web search agent
//!
//! A conversational research assistant that answers questions by letting an
//! LLM call a web search tool, keeping a bounded history per session.

mod api;
mod cli;
mod config;
mod history;
mod llm;
mod runtime;
mod session;
mod state_machine;
mod system_prompt;
mod tools;

use api::{create_router, AppState};
use clap::Parser;
use cli::{Cli, Commands};
use config::AppConfig;
use llm::ModelRegistry;
use runtime::{LlmResponder, SharedEngine, ToolInvoker, ToolRegistryInvoker};
use session::SessionManager;
use std::net::SocketAddr;
use std::sync::Arc;
use tools::{TavilySearchProvider, ToolRegistry};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command();
    init_logging(&command);

    let config = AppConfig::from_env();
    let llm_registry = Arc::new(ModelRegistry::new(&config.llm));
    let engine = Arc::new(build_engine(&config, &llm_registry)?);
    let sessions = Arc::new(SessionManager::new(config.history_capacity));

    match command {
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.port);
            serve(AppState::new(engine, sessions, llm_registry), port).await
        }
        Commands::Chat => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            cli::run_chat(engine.as_ref(), &sessions, stdin, tokio::io::stdout()).await?;
            Ok(())
        }
    }
}

fn init_logging(command: &Commands) {
    match command {
        Commands::Serve { .. } => {
            tracing_subscriber::registry()
                .with(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "web_search_agent=info,tower_http=info".into()),
                )
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_current_span(false)
                        .with_span_list(false),
                )
                .init();
        }
        Commands::Chat => {
            tracing_subscriber::registry()
                .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

fn build_engine(
    config: &AppConfig,
    llm_registry: &ModelRegistry,
) -> Result<SharedEngine, Box<dyn std::error::Error>> {
    if !llm_registry.has_models() {
        return Err("no models available: set OPENAI_API_KEY".into());
    }
    let Some(llm) = llm_registry.default() else {
        return Err(format!(
            "model {} unavailable: set OPENAI_API_KEY",
            llm_registry.default_model_id()
        )
        .into());
    };
    tracing::info!(
        models = ?llm_registry.available_models(),
        default = %llm_registry.default_model_id(),
        "LLM registry initialized"
    );

    let provider = TavilySearchProvider::new(
        reqwest::Client::new(),
        config.search.tavily_api_key.clone(),
        config.search.tavily_endpoint.clone(),
        config.search.topic.clone(),
        config.engine.tool_timeout,
    )?;
    let tools = ToolRegistryInvoker::new(ToolRegistry::standard(
        Arc::new(provider),
        config.search.max_results,
    ));
    tracing::info!(
        tools = ?tools.definitions().iter().map(|d| d.name.clone()).collect::<Vec<_>>(),
        topic = %config.search.topic,
        "Tools initialized"
    );

    Ok(SharedEngine::new(
        Arc::new(LlmResponder::new(llm)),
        Arc::new(tools),
        config.engine.clone(),
    ))
}

async fn serve(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Web search agent listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
