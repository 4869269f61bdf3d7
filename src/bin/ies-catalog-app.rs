use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;

use ies_catalog::app::cache::ResponseCache;
use ies_catalog::app::server::{AppState, router};
use ies_catalog::app::snapshot::CatalogSnapshot;
use ies_catalog::catalog::Catalog;
use ies_catalog::discovery::{LocalDirWorkbookSource, WorkbookSource};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct AppArgs {
    /// Listen address; the `PORT` environment variable overrides its port.
    #[arg(long, default_value = "0.0.0.0:10000")]
    addr: SocketAddr,

    /// Directory holding the workbook.
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Lifetime of cached responses; 0 disables caching.
    #[arg(long, default_value_t = 300)]
    cache_ttl_secs: u64,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    ies_catalog::logging::init()?;

    let mut args = AppArgs::parse();
    if let Some(port) = std::env::var("PORT")
        .ok()
        .and_then(|v| v.trim().parse::<u16>().ok())
    {
        args.addr.set_port(port);
    }
    if let Some(ttl) = std::env::var("IES_CATALOG_CACHE_TTL_SECS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
    {
        args.cache_ttl_secs = ttl;
    }
    tracing::info!(?args, "starting ies-catalog-app");

    let source: Arc<dyn WorkbookSource> = Arc::new(LocalDirWorkbookSource::new(&args.data_dir));
    let initial = load_initial_catalog(source.as_ref()).await;
    let snapshot = Arc::new(CatalogSnapshot::with_catalog(source, initial));
    let cache = Arc::new(ResponseCache::new(Duration::from_secs(args.cache_ttl_secs)));

    let app = router(AppState::new(snapshot, cache));

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;
    Ok(())
}

/// The server starts even without data; `/recarregar-dados` can load it later.
async fn load_initial_catalog(source: &dyn WorkbookSource) -> Catalog {
    let workbook = match source.locate().await {
        Ok(Some(workbook)) => workbook,
        Ok(None) => {
            tracing::warn!(
                dir = %source.location().display(),
                "no workbook found; serving without data"
            );
            return Catalog::new();
        }
        Err(err) => {
            tracing::warn!(?err, "workbook lookup failed; serving without data");
            return Catalog::new();
        }
    };

    tracing::info!(workbook = %workbook.display(), "loading initial catalog");
    match tokio::task::spawn_blocking(move || ies_catalog::ingest::ingest(&workbook)).await {
        Ok(catalog) => {
            if catalog.is_empty() {
                tracing::warn!("workbook produced no institutions; serving without data");
            } else {
                tracing::info!(
                    institutions = ?catalog.institution_names(),
                    lessons = catalog.lesson_count(),
                    "catalog loaded"
                );
            }
            catalog
        }
        Err(err) => {
            tracing::error!(?err, "ingestion task failed");
            Catalog::new()
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(?err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
