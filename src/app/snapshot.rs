use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::catalog::Catalog;
use crate::discovery::WorkbookSource;
use crate::error::CatalogError;
use crate::ingest;

#[derive(Debug, Clone)]
pub struct ReloadReport {
    pub workbook: PathBuf,
    pub institutions: Vec<String>,
    pub lessons: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Process-wide catalog that readers share and reloads replace wholesale.
///
/// Readers get an `Arc` to a fully built catalog; a reload swaps the pointer
/// only after ingestion succeeded with at least one institution.
pub struct CatalogSnapshot {
    current: Arc<RwLock<Arc<Catalog>>>,
    reload_guard: Arc<Mutex<()>>,
    source: Arc<dyn WorkbookSource>,
}

impl CatalogSnapshot {
    pub fn new(source: Arc<dyn WorkbookSource>) -> Self {
        Self::with_catalog(source, Catalog::new())
    }

    pub fn with_catalog(source: Arc<dyn WorkbookSource>, catalog: Catalog) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(catalog))),
            reload_guard: Arc::new(Mutex::new(())),
            source,
        }
    }

    pub fn current(&self) -> Arc<Catalog> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn source(&self) -> &dyn WorkbookSource {
        self.source.as_ref()
    }

    /// Locates and ingests the workbook, then publishes it.
    ///
    /// Concurrent calls run one after another. On any error the previously
    /// published catalog stays in place.
    pub async fn reload(&self) -> Result<ReloadReport, CatalogError> {
        let guard = Arc::clone(&self.reload_guard).lock_owned().await;

        let workbook = self
            .source
            .locate()
            .await
            .map_err(|err| CatalogError::Reload(format!("{err:#}")))?
            .ok_or_else(|| CatalogError::SourceUnavailable {
                dir: self.source.location().to_owned(),
            })?;
        tracing::info!(workbook = %workbook.display(), "reloading catalog");

        let current = Arc::clone(&self.current);
        tokio::task::spawn_blocking(move || {
            // The guard stays held until publish, even if the caller stops waiting.
            let _guard = guard;
            ingest_and_publish(&current, workbook)
        })
        .await
        .map_err(|err| CatalogError::Reload(format!("ingestion task failed: {err}")))?
    }

    fn publish(&self, catalog: Catalog) {
        publish(&self.current, catalog);
    }
}

fn ingest_and_publish(
    current: &RwLock<Arc<Catalog>>,
    workbook: PathBuf,
) -> Result<ReloadReport, CatalogError> {
    let catalog = ingest::load_workbook(&workbook)
        .inspect_err(|err| tracing::error!(%err, "reload failed"))?;

    if catalog.is_empty() {
        tracing::error!(workbook = %workbook.display(), "workbook produced no institutions");
        return Err(CatalogError::EmptyCatalog { path: workbook });
    }

    let report = ReloadReport {
        workbook,
        institutions: catalog.institution_names(),
        lessons: catalog.lesson_count(),
        loaded_at: Utc::now(),
    };
    publish(current, catalog);
    tracing::info!(
        institutions = ?report.institutions,
        lessons = report.lessons,
        "catalog reloaded"
    );
    Ok(report)
}

fn publish(current: &RwLock<Arc<Catalog>>, catalog: Catalog) {
    let next = Arc::new(catalog);
    let mut guard = current.write().unwrap_or_else(PoisonError::into_inner);
    *guard = next;
}
