use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinedex_core::{
    database::{MemoryStore, PostgresDatabase},
    domain::users::auth::AuthCrypto,
};
use cinedex_server::{
    AppState,
    infra::{
        config::{CliOverrides, Config, ConfigLoad, ConfigLoader},
        startup::{ProdStartupHooks, StartupHooks},
    },
    routes::build_router,
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "cinedex-server")]
#[command(about = "Movie catalog REST API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Path to a cinedex.toml file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Load environment variables from this file instead of `.env`
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Serve from process memory; nothing is persisted
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_runtime_config(&cli.serve)?;

    if let Some(Command::Db(DbCommand::Migrate)) = cli.command {
        let database = connect_database(&config).await?;
        database.migrate().await.context("database migration failed")?;
        info!("Database migrations applied successfully");
        return Ok(());
    }

    run_server(config, cli.serve.in_memory).await
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path.clone());
    }
    if let Some(path) = &args.env_file {
        loader = loader.with_env_file(path.clone());
    }

    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if config.metadata.env_file_loaded {
        info!(
            env_file = ?args.env_file,
            "Loaded environment from env file"
        );
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => warn!(hint = %hint, "{}", warning.message),
            None => warn!("{}", warning.message),
        }
    }

    CliOverrides {
        host: args.host.clone(),
        port: args.port,
    }
    .apply(&mut config);

    Ok(config)
}

async fn connect_database(config: &Config) -> anyhow::Result<PostgresDatabase> {
    let Some(url) = config.database.url.as_deref() else {
        bail!(
            "DATABASE_URL is not set; configure [database].url or run with \
             --in-memory"
        );
    };
    PostgresDatabase::connect(url, config.database.max_connections)
        .await
        .context("failed to connect to PostgreSQL")
}

async fn run_server(config: Config, in_memory: bool) -> anyhow::Result<()> {
    let auth_crypto = AuthCrypto::new(&config.auth.password_pepper)
        .context("failed to initialise password hashing")?;

    let state = if in_memory {
        warn!("Serving from memory; records are lost on shutdown");
        AppState::in_memory(config, MemoryStore::new(), auth_crypto)
    } else {
        let database = connect_database(&config).await?;
        database.migrate().await.context("database migration failed")?;
        AppState::new(
            config,
            Arc::new(database.movies()),
            Arc::new(database.users()),
            auth_crypto,
        )
    };

    ProdStartupHooks
        .run(&state)
        .await
        .context("startup hooks failed")?;

    let addr = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("cinedex-server listening on {addr}");

    let router = build_router(state);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl-C");
        return;
    }
    info!("Shutdown signal received");
}
