use std::path::{Path, PathBuf};

use anyhow::Context as _;
use async_trait::async_trait;
use tokio::fs;

/// Accepted workbook extensions, highest priority first.
pub const WORKBOOK_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

#[async_trait]
pub trait WorkbookSource: Send + Sync {
    /// Path of the workbook to ingest, or `None` when there is nothing to load.
    async fn locate(&self) -> anyhow::Result<Option<PathBuf>>;

    /// Where this source looks, for user-facing messages.
    fn location(&self) -> &Path;
}

#[derive(Debug, Clone)]
pub struct LocalDirWorkbookSource {
    dir: PathBuf,
}

impl LocalDirWorkbookSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl WorkbookSource for LocalDirWorkbookSource {
    async fn locate(&self) -> anyhow::Result<Option<PathBuf>> {
        find_workbook(&self.dir).await
    }

    fn location(&self) -> &Path {
        &self.dir
    }
}

/// Picks the first workbook in `dir`: `.xlsx` before `.xls`, then by file name.
///
/// Office lock files (`~$name.xlsx`) are ignored. A missing directory yields
/// `None`.
pub async fn find_workbook(dir: &Path) -> anyhow::Result<Option<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("read workbook dir: {}", dir.display()));
        }
    };

    let mut best: Option<(usize, String, PathBuf)> = None;
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("list workbook dir: {}", dir.display()))?
    {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
            continue;
        };
        let Some(priority) = extension_priority(&path) else {
            continue;
        };
        if name.starts_with("~$") {
            continue;
        }
        let is_file = fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }

        let candidate = (priority, name, path);
        if best.as_ref().is_none_or(|current| candidate < *current) {
            best = Some(candidate);
        }
    }

    Ok(best.map(|(_, _, path)| path))
}

fn extension_priority(path: &Path) -> Option<usize> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    WORKBOOK_EXTENSIONS.iter().position(|known| *known == ext)
}
