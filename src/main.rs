//! localmind-agent server binary

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use localmind_agent::agent::{AgentExecutor, InMemoryRunLogStore, RunLogStore};
use localmind_agent::backends::Backends;
use localmind_agent::config::Config;
use localmind_agent::server::{self, AppState};
use localmind_agent::tools::ToolCatalog;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("localmind-agent v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: localmind-agent");
        println!();
        println!("Environment:");
        println!("  LOCALMIND_BIND                   Listen address (default 127.0.0.1:3001)");
        println!("  LOCALMIND_PROVIDER               ollama | claude (default ollama)");
        println!("  OLLAMA_URL, OLLAMA_MODEL         Local runtime settings");
        println!("  ANTHROPIC_API_KEY, CLAUDE_MODEL  Cloud reasoning settings");
        println!("  LOCALMIND_STEP_TIMEOUT_MS        Per-step tool timeout (default 30000)");
        println!("  LOCALMIND_MAX_ITERATIONS         Executor loop bound (default 5)");
        println!("  LOCALMIND_MAX_TOOLS              Tools offered to the planner (default 6)");
        println!("  LOCALMIND_LOG_RETENTION_SECS     Run log retention (default 3600)");
        println!("  LOCALMIND_CLEANUP_INTERVAL_SECS  Eviction sweep period (default 300)");
        println!("  LOCALMIND_LOG_JSON               Emit JSON log lines (true/1)");
        println!("  RUST_LOG                         trace | debug | info | warn | error");
        return Ok(());
    }

    let config = Config::from_env()?;

    let log_level = std::env::var("RUST_LOG")
        .map(|s| match s.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    if config.log_json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_ansi(false)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_ansi(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    info!("localmind-agent v{}", env!("CARGO_PKG_VERSION"));

    let reasoner = match config.build_reasoner() {
        Ok(reasoner) => {
            info!("Reasoning provider: {:?}", config.provider);
            Some(reasoner)
        }
        Err(e) => {
            warn!("Reasoning engine unavailable, running tools-only: {:#}", e);
            None
        }
    };

    let catalog = Arc::new(ToolCatalog::standard(&Backends::default()));
    info!("Tool catalog: {} tools", catalog.len());

    let logs: Arc<dyn RunLogStore> = Arc::new(InMemoryRunLogStore::new());
    let executor = Arc::new(AgentExecutor::with_config(catalog, logs.clone(), config.executor_config()));

    let retention = config.log_retention;
    let mut sweep = tokio::time::interval(config.cleanup_interval);
    tokio::spawn(async move {
        // First tick completes immediately
        sweep.tick().await;
        loop {
            sweep.tick().await;
            let evicted = logs.evict_older_than(retention);
            if evicted > 0 {
                info!("Evicted {} expired run log(s)", evicted);
            }
        }
    });

    let state = AppState::new(executor, reasoner)
        .with_max_tools(config.max_tools)
        .with_planner(config.planner_config());

    server::serve(config.bind_addr, Arc::new(state)).await
}
