mod browse;
mod cli;
mod render;

use std::path::Path;
use std::process::ExitCode;

use cinelist_api::{MovieDetail, OmdbClient};
use cinelist_core::config::AppConfig;
use cinelist_core::storage::{KeyValueStore, MemoryStore, SqliteStore};
use cinelist_runtime::{omdb_client, searchable, Runtime, RuntimeError};
use clap::Parser;
use tokio::io::BufReader;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use crate::cli::{CliArgs, Command};

type App = Runtime<OmdbClient, Box<dyn KeyValueStore>>;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    if let Err(e) = args.validate() {
        eprintln!("{e}");
        return ExitCode::from(2);
    }

    let config = match args.config {
        Some(ref path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let _guard = init_tracing(&level, config.logging.file);

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over `level`. Logs go to stderr, plus a daily file when
/// `file` is set.
fn init_tracing(level: &str, file: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            ["cinelist", "cinelist_api", "cinelist_core", "cinelist_runtime"]
                .map(|target| format!("{target}={level}"))
                .join(","),
        )
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if file {
        let appender = tracing_appender::rolling::daily(AppConfig::log_dir(), "cinelist.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        builder
            .with_ansi(false)
            .with_writer(std::io::stderr.and(writer))
            .init();
        Some(guard)
    } else {
        builder.with_writer(std::io::stderr).init();
        None
    }
}

fn open_store(config: &AppConfig, memory: bool) -> Result<Box<dyn KeyValueStore>, RuntimeError> {
    if memory {
        tracing::debug!("using in-memory store");
        return Ok(Box::new(MemoryStore::new()));
    }
    let path = config.ensure_db_path()?;
    tracing::debug!(path = %path.display(), "opening database");
    Ok(Box::new(SqliteStore::open(&path)?))
}

async fn run(args: CliArgs, config: AppConfig) -> Result<(), RuntimeError> {
    if let Command::Config { write } = args.command {
        return show_config(&config, args.config.as_deref(), write);
    }

    let catalog = omdb_client(&config)?;
    let store = open_store(&config, args.memory)?;
    let mut app: App = Runtime::new(config, catalog, store)?;

    match args.command {
        Command::Search { query } => search(&mut app, &query).await,
        Command::Show { id } => show(&mut app, &id).await,
        Command::Add { id, rating } => add(&mut app, &id, rating).await,
        Command::Remove { id } => {
            if app.remove_watched(&id)? {
                println!("Removed {id}");
            } else {
                println!("{id} is not on the watchlist");
            }
            Ok(())
        }
        Command::List => {
            print!("{}", render::watched(app.watched()));
            Ok(())
        }
        Command::Summary => {
            print!("{}", render::summary(&app.summary()));
            Ok(())
        }
        Command::Browse => {
            let stdin = BufReader::new(tokio::io::stdin());
            browse::run(&mut app, stdin, &mut std::io::stdout()).await
        }
        Command::Config { .. } => unreachable!("config command is handled above"),
    }
}

async fn search(app: &mut App, query: &str) -> Result<(), RuntimeError> {
    let min = app.config().catalog.min_query_len;
    if searchable(query, min).is_none() {
        println!("Type at least {min} characters to search");
        return Ok(());
    }

    app.set_query(query);
    app.settled().await;
    let page = app.search_outcome()?;
    print!("{}", render::search_page(&page));
    Ok(())
}

async fn load_detail(app: &mut App, id: &str) -> Result<Option<MovieDetail>, RuntimeError> {
    app.toggle_movie(id);
    app.settled().await;
    app.detail_outcome()
}

async fn show(app: &mut App, id: &str) -> Result<(), RuntimeError> {
    if let Some(detail) = load_detail(app, id).await? {
        let rating = app.watchlist().user_rating(&detail.id);
        print!("{}", render::detail(&detail, rating));
    }
    Ok(())
}

async fn add(app: &mut App, id: &str, rating: u8) -> Result<(), RuntimeError> {
    load_detail(app, id).await?;
    let entry = app.rate_selected(rating)?;
    println!("Added {} with rating {}", entry.title, entry.user_rating);
    Ok(())
}

/// Print where config is read from; with `write`, save the effective config
/// there so it can be edited.
fn show_config(config: &AppConfig, path: Option<&Path>, write: bool) -> Result<(), RuntimeError> {
    let path = path.map_or_else(AppConfig::config_path, Path::to_path_buf);
    if write {
        config.save_to(&path)?;
        tracing::info!(path = %path.display(), "config written");
        println!("Wrote {}", path.display());
    } else {
        println!("{}", path.display());
    }
    Ok(())
}
