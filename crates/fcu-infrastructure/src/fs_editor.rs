//! Editor surface backed by a project directory on disk.
//!
//! Import settings and user data live in a JSON sidecar next to each asset
//! (`<file>.fcu-import.json`). Guids are asset paths relative to the asset
//! root, with `/` separators.

use async_trait::async_trait;
use fcu_core::asset::{EngineEditor, ImporterRecord};
use fcu_core::{FcuError, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;

pub const IMPORTER_SUFFIX: &str = ".fcu-import.json";

/// Extensions the editor treats as models.
const MODEL_EXTENSIONS: &[&str] = &["fbx", "obj", "dae", "3ds", "dxf", "blend", "ma", "mb", "max"];

pub struct FsEngineEditor {
    project_root: PathBuf,
    selection: Mutex<Vec<String>>,
}

impl FsEngineEditor {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            selection: Mutex::new(Vec::new()),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    fn importer_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(IMPORTER_SUFFIX);
        PathBuf::from(name)
    }

    fn is_model(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| MODEL_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
    }

    /// Rejects guids that would escape the asset root.
    fn resolve_guid(&self, guid: &str) -> Option<PathBuf> {
        let relative = Path::new(guid);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if guid.is_empty() || !safe {
            return None;
        }
        Some(self.asset_root().join(relative))
    }
}

#[async_trait]
impl EngineEditor for FsEngineEditor {
    fn asset_root(&self) -> PathBuf {
        self.project_root.join("Assets")
    }

    async fn refresh(&self) -> Result<()> {
        tracing::debug!("[Editor] Asset database refresh requested");
        Ok(())
    }

    async fn find_assets(&self) -> Result<Vec<String>> {
        let root = self.asset_root();
        let mut guids = Vec::new();
        let mut pending = vec![root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if Self::is_model(&path) {
                    if let Some(guid) = self.path_to_guid(&path).await? {
                        guids.push(guid);
                    }
                }
            }
        }

        guids.sort();
        Ok(guids)
    }

    async fn guid_to_path(&self, guid: &str) -> Result<Option<PathBuf>> {
        Ok(self.resolve_guid(guid).filter(|path| path.exists()))
    }

    async fn path_to_guid(&self, path: &Path) -> Result<Option<String>> {
        let Ok(relative) = path.strip_prefix(self.asset_root()) else {
            return Ok(None);
        };
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            return Ok(None);
        }
        Ok(Some(parts.join("/")))
    }

    async fn importer(&self, path: &Path) -> Result<Option<ImporterRecord>> {
        let sidecar = Self::importer_path(path);
        match fs::read_to_string(&sidecar).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if path.exists() {
                    Ok(Some(ImporterRecord::default()))
                } else {
                    Ok(None)
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_importer(&self, path: &Path, record: &ImporterRecord) -> Result<()> {
        if !path.exists() {
            return Err(FcuError::not_found("asset", path.display().to_string()));
        }
        let content = serde_json::to_string_pretty(record)?;
        fs::write(Self::importer_path(path), content).await?;
        Ok(())
    }

    async fn selected_guids(&self) -> Result<Vec<String>> {
        Ok(self
            .selection
            .lock()
            .map(|selection| selection.clone())
            .unwrap_or_default())
    }

    async fn select(&self, guids: &[String]) -> Result<()> {
        if let Ok(mut selection) = self.selection.lock() {
            *selection = guids.to_vec();
        }
        Ok(())
    }

    async fn delete_asset(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await?;
        match fs::remove_file(Self::importer_path(path)).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    async fn log_error(&self, message: &str) {
        tracing::error!("[Editor] {}", message);
    }
}
