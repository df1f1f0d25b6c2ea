//! Editor scripting surface used by the asset adapters.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::model::ImporterRecord;
use crate::error::Result;

/// Operations the bridge needs from the engine editor.
///
/// Objects are addressed by their editor guid; paths are absolute.
#[async_trait]
pub trait EngineEditor: Send + Sync {
    /// The project's asset root (`<project>/Assets`). Imports never leave it.
    fn asset_root(&self) -> PathBuf;

    /// Makes the editor pick up files changed on disk.
    async fn refresh(&self) -> Result<()>;

    /// Guids of every model asset in the project.
    async fn find_assets(&self) -> Result<Vec<String>>;

    async fn guid_to_path(&self, guid: &str) -> Result<Option<PathBuf>>;

    async fn path_to_guid(&self, path: &Path) -> Result<Option<String>>;

    /// Import settings and user data of the asset at `path`, if it has any.
    async fn importer(&self, path: &Path) -> Result<Option<ImporterRecord>>;

    async fn write_importer(&self, path: &Path, record: &ImporterRecord) -> Result<()>;

    /// Guids of the current selection, including assets behind selected
    /// scene objects.
    async fn selected_guids(&self) -> Result<Vec<String>>;

    async fn select(&self, guids: &[String]) -> Result<()>;

    async fn delete_asset(&self, path: &Path) -> Result<()>;

    /// Mirrors an error into the editor console. Best effort.
    async fn log_error(&self, message: &str);
}
