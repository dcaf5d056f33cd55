use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

mod shutdown;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const TASKS_MODULE: &str = "tasks";
const API_INGRESS_MODULE: &str = "api_ingress";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if is_memory_dsn(dsn) {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create database dir {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

fn is_memory_dsn(dsn: &str) -> bool {
    dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
}

/// Only SQLite is linked into this build.
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    if is_memory_dsn(raw) {
        return Ok("sqlite");
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;
    match url.scheme() {
        // absolutize_sqlite_dsn only understands `sqlite://`
        "sqlite" => Ok("sqlite"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// Tasks Server - REST service for a to-do list
#[derive(Parser)]
#[command(name = "tasks-server")]
#[command(about = "Tasks Server - REST service for a to-do list")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    if let Some(path) = cli.config.as_deref() {
        if !path.is_file() {
            return Err(anyhow!("config file not found: {}", path.display()));
        }
    }

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Tasks Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

async fn connect_database(db_config: &DatabaseConfig, base_dir: &Path) -> Result<DatabaseConnection> {
    detect_from_dsn(db_config)?;

    let dsn = absolutize_sqlite_dsn(db_config.url.trim(), base_dir, true)?;
    let memory = is_memory_dsn(&dsn);

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.acquire_timeout(Duration::from_secs(5)).sqlx_logging(false);
    if memory {
        // every pooled connection would otherwise get its own empty database
        opts.max_connections(1).min_connections(1);
    } else if let Some(max) = db_config.max_conns {
        opts.max_connections(max);
    }
    let busy_timeout = db_config.busy_timeout_ms.map(|ms| Duration::from_millis(u64::from(ms)));
    opts.map_sqlx_sqlite_opts(move |o| {
        let o = o.create_if_missing(true);
        match busy_timeout {
            Some(t) => o.busy_timeout(t),
            None => o,
        }
    });

    tracing::info!("Connecting to database: {}", dsn);
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to {dsn}"))?;
    tracing::info!("Connected DB backend: {:?}", db.get_database_backend());
    Ok(db)
}

async fn run_server(config: AppConfig) -> Result<()> {
    let addr: SocketAddr = config
        .bind_addr()
        .parse()
        .with_context(|| format!("invalid listen address '{}'", config.bind_addr()))?;

    let tasks_config: tasks::config::TasksConfig = config.module_config(TASKS_MODULE)?;
    let ingress_config: api_ingress::ApiIngressConfig = config.module_config(API_INGRESS_MODULE)?;

    let db_config = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("Database URL not configured"))?;
    let db = connect_database(&db_config, Path::new(&config.server.home_dir)).await?;
    tasks::TasksModule::migrate(&db).await?;

    tracing::info!("Initializing modules...");
    let module = tasks::TasksModule::new(db, tasks_config)?;
    let ingress = api_ingress::ApiIngress::new(
        ingress_config,
        Duration::from_secs(config.server.timeout_sec),
    )
    .with_openapi(&tasks::TasksModule::openapi())?;
    let router = ingress.build_router(module.router());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        match shutdown::wait_for_shutdown().await {
            Ok(()) => tracing::info!("shutdown signal received"),
            Err(e) => tracing::warn!(error = %e, "signal handler failed, shutting down"),
        }
        trigger.cancel();
    });

    ingress.serve(router, addr, cancel).await?;
    tracing::info!("Tasks Server stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    config
        .bind_addr()
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid listen address '{}'", config.bind_addr()))?;
    if let Some(db) = &config.database {
        detect_from_dsn(db)?;
    }
    let tasks_config: tasks::config::TasksConfig = config.module_config(TASKS_MODULE)?;
    tasks_config.validate()?;
    let _: api_ingress::ApiIngressConfig = config.module_config(API_INGRESS_MODULE)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            max_conns: None,
            busy_timeout_ms: None,
        }
    }

    #[test]
    fn relative_sqlite_paths_land_under_home() {
        let dsn = absolutize_sqlite_dsn(
            "sqlite://database/tasks.db?mode=rwc",
            Path::new("/srv/tasks"),
            false,
        )
        .unwrap();
        assert_eq!(dsn, "sqlite:///srv/tasks/database/tasks.db?mode=rwc");
    }

    #[test]
    fn accepted_dsns_can_be_absolutized() {
        for url in ["sqlite://tasks.db", "sqlite:///var/lib/tasks.db", "sqlite::memory:"] {
            detect_from_dsn(&db(url)).unwrap();
            assert!(absolutize_sqlite_dsn(url, Path::new("/srv"), false).is_ok(), "{url}");
        }
        assert!(absolutize_sqlite_dsn("sqlite3://tasks.db", Path::new("/srv"), false).is_err());
    }

    #[test]
    fn memory_dsn_is_kept() {
        let dsn = absolutize_sqlite_dsn("sqlite://:memory:", Path::new("/srv"), false).unwrap();
        assert_eq!(dsn, "sqlite::memory:");
    }

    #[test]
    fn only_sqlite_is_accepted() {
        assert_eq!(detect_from_dsn(&db("sqlite://tasks.db")).unwrap(), "sqlite");
        assert_eq!(detect_from_dsn(&db("sqlite::memory:")).unwrap(), "sqlite");
        assert!(detect_from_dsn(&db("postgres://localhost/tasks")).is_err());
        assert!(detect_from_dsn(&db("sqlite3://tasks.db")).is_err());
        assert!(detect_from_dsn(&db("  ")).is_err());
    }
}
