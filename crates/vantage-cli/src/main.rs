use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vantage_cli::serve::{self, AppState};
use vantage_core::{storage, AnalysisEngine, AnalysisManager, AnalysisRequest, Config};

#[derive(Parser)]
#[command(name = "vantage")]
#[command(about = "AI-assisted market and business analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP analysis server
    Serve {
        /// Address to bind (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (defaults to the configured port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run a single analysis and print the report as JSON
    Analyze {
        /// Market segment to analyze
        #[arg(long, required = true)]
        segment: String,
        /// Product or service name
        #[arg(long)]
        product: Option<String>,
        /// Price, e.g. "197" or "R$ 1997,90"
        #[arg(long)]
        price: Option<String>,
        /// Target audience
        #[arg(long)]
        audience: Option<String>,
        /// Comma-separated competitor names
        #[arg(long)]
        competitors: Option<String>,
        /// Extra research query
        #[arg(long)]
        query: Option<String>,
        /// Monthly revenue goal
        #[arg(long)]
        revenue_goal: Option<String>,
        /// Marketing budget
        #[arg(long)]
        budget: Option<String>,
    },
    /// Print the default configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config => {
            print!("{}", Config::default_config_string());
        }
        Commands::Serve { host, port } => {
            let config = Config::load().wrap_err("Failed to load configuration")?;
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let manager = build_manager(&config);
            let engine = AnalysisEngine::from_config(config);

            println!("Vantage analysis server on http://{}:{}", host, port);
            println!("Press Ctrl+C to stop\n");

            serve::start_server(&host, port, AppState::new(engine, manager))
                .await
                .wrap_err("Server stopped with an error")?;
        }
        Commands::Analyze {
            segment,
            product,
            price,
            audience,
            competitors,
            query,
            revenue_goal,
            budget,
        } => {
            let config = Config::load().wrap_err("Failed to load configuration")?;
            let request = AnalysisRequest::from_value(serde_json::json!({
                "segmento": segment,
                "produto": product,
                "preco": price,
                "publico": audience,
                "concorrentes": competitors,
                "query": query,
                "objetivo_receita": revenue_goal,
                "orcamento_marketing": budget,
            }))
            .wrap_err("Invalid analysis parameters")?;

            let engine = AnalysisEngine::from_config(config);
            let report = engine.analyze(&request).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Persistence is optional: a broken storage setup disables it.
fn build_manager(config: &Config) -> AnalysisManager {
    match storage::from_config(&config.storage) {
        Ok(store) => AnalysisManager::new(store),
        Err(e) => {
            warn!(error = %e, "Storage unavailable, analyses will not be persisted");
            AnalysisManager::disabled()
        }
    }
}
