use async_trait::async_trait;
use fcu_core::asset::{
    EngineEditor, ImportRequest, ImportSettings, ImportedAsset, ImporterRecord, ObjectRef,
    OptionSpec, PublishRequest, PublishedComponent,
};
use fcu_core::publish::RenderedArtifacts;
use fcu_core::{FcuError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::validation::{MODEL_IMPORT_EXTENSIONS, contained_destination, validate_source};
use super::{
    ANIMATION_ASSET_TYPE, AssetAdapter, GEOMETRY_ASSET_TYPE, RIG_ASSET_TYPE, map_artifacts,
    metadata_for,
};

const OPTION_IMPORT_ANIMATION: &str = "import_animation";
const OPTION_REAPPLY_SETTINGS: &str = "reapply_settings";
const OPTION_PACKAGE: &str = "package";
const OPTION_REVIEWABLE: &str = "reviewable";

/// Adapter for model files (`geo`, `rig`, `anim`).
///
/// The three tags differ only in whether animation import is on by default.
pub struct ModelAdapter {
    asset_type: &'static str,
    import_animation: bool,
    editor: Arc<dyn EngineEditor>,
}

impl ModelAdapter {
    pub fn geometry(editor: Arc<dyn EngineEditor>) -> Self {
        Self {
            asset_type: GEOMETRY_ASSET_TYPE,
            import_animation: false,
            editor,
        }
    }

    pub fn rig(editor: Arc<dyn EngineEditor>) -> Self {
        Self {
            asset_type: RIG_ASSET_TYPE,
            import_animation: false,
            editor,
        }
    }

    pub fn animation(editor: Arc<dyn EngineEditor>) -> Self {
        Self {
            asset_type: ANIMATION_ASSET_TYPE,
            import_animation: true,
            editor,
        }
    }

    fn settings(&self, request: &ImportRequest) -> ImportSettings {
        ImportSettings {
            import_animation: bool_option(request, OPTION_IMPORT_ANIMATION)
                .unwrap_or(self.import_animation),
            ..Default::default()
        }
    }

    /// Logs `error` to the editor console before handing it back.
    async fn reject(&self, error: FcuError) -> FcuError {
        tracing::warn!("[Adapter] {} rejected: {}", self.asset_type, error);
        self.editor.log_error(&error.to_string()).await;
        error
    }

    async fn copy_into(&self, source: &Path, target: &Path) -> Result<()> {
        tokio::fs::copy(source, target).await.map_err(|e| {
            FcuError::io(format!(
                "could not copy \"{}\" to \"{}\": {}",
                source.display(),
                target.display(),
                e
            ))
        })?;
        Ok(())
    }

    /// The copied file and its record are already on disk; an editor that
    /// misses the refresh picks them up on its next scan.
    async fn refresh(&self) {
        if let Err(e) = self.editor.refresh().await {
            tracing::warn!("[Adapter] Could not refresh the editor: {}", e);
        }
    }

    async fn write_record(
        &self,
        target: &Path,
        request: &ImportRequest,
        settings: ImportSettings,
    ) -> Result<ImportSettings> {
        let record = ImporterRecord {
            settings,
            user_data: metadata_for(request).to_user_data()?,
        };
        self.editor.write_importer(target, &record).await?;
        Ok(record.settings)
    }

    async fn checked_import(&self, request: &ImportRequest) -> Result<ImportedAsset> {
        validate_source(&request.file_path, MODEL_IMPORT_EXTENSIONS)?;
        let destination = contained_destination(&self.editor.asset_root(), &request.destination)?;
        if !destination.is_dir() {
            return Err(FcuError::invalid_asset(format!(
                "cannot import into \"{}\": not an existing directory",
                request.destination.display()
            )));
        }
        let file_name = request.file_path.file_name().ok_or_else(|| {
            FcuError::invalid_asset(format!("\"{}\" has no file name", request.file_path.display()))
        })?;
        let target = request.destination.join(file_name);

        self.copy_into(&request.file_path, &target).await?;
        let settings = self.write_record(&target, request, self.settings(request)).await?;
        self.refresh().await;

        let message = format!(
            "Imported {} ({} -> {})",
            file_name.to_string_lossy(),
            request.file_path.display(),
            request.destination.display()
        );
        tracing::info!(asset_type = self.asset_type, "[Adapter] {}", message);
        Ok(ImportedAsset {
            path: target,
            settings,
            message,
        })
    }

    async fn checked_change_version(
        &self,
        request: &ImportRequest,
        existing: &ObjectRef,
    ) -> Result<ImportedAsset> {
        validate_source(&request.file_path, MODEL_IMPORT_EXTENSIONS)?;
        let target: PathBuf = self
            .editor
            .guid_to_path(&existing.guid)
            .await?
            .ok_or_else(|| FcuError::not_found("asset", existing.guid.clone()))?;
        contained_destination(&self.editor.asset_root(), &target)?;

        let current = self.editor.importer(&target).await?.unwrap_or_default();
        self.copy_into(&request.file_path, &target).await?;

        let settings = if bool_option(request, OPTION_REAPPLY_SETTINGS).unwrap_or(false) {
            self.settings(request)
        } else {
            current.settings
        };
        let settings = self.write_record(&target, request, settings).await?;
        self.refresh().await;

        let message = format!(
            "Changed {} to version {}",
            existing.guid, request.asset_version
        );
        tracing::info!(asset_type = self.asset_type, "[Adapter] {}", message);
        Ok(ImportedAsset {
            path: target,
            settings,
            message,
        })
    }
}

#[async_trait]
impl AssetAdapter for ModelAdapter {
    fn asset_type(&self) -> &str {
        self.asset_type
    }

    async fn import_asset(&self, request: &ImportRequest) -> Result<ImportedAsset> {
        match self.checked_import(request).await {
            Ok(imported) => Ok(imported),
            Err(e) => Err(self.reject(e).await),
        }
    }

    async fn change_version(
        &self,
        request: &ImportRequest,
        existing: &ObjectRef,
    ) -> Result<ImportedAsset> {
        match self.checked_change_version(request, existing).await {
            Ok(changed) => Ok(changed),
            Err(e) => Err(self.reject(e).await),
        }
    }

    fn publish_asset(
        &self,
        artifacts: &RenderedArtifacts,
        request: &PublishRequest,
    ) -> Result<Vec<PublishedComponent>> {
        map_artifacts(artifacts, request)
    }

    fn import_options(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::flag(OPTION_IMPORT_ANIMATION, "Import animation", self.import_animation),
            OptionSpec::flag(OPTION_REAPPLY_SETTINGS, "Reapply import settings", false),
        ]
    }

    fn export_options(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::flag(OPTION_PACKAGE, "Export selection as package", true),
            OptionSpec::flag(OPTION_REVIEWABLE, "Record reviewable", false),
        ]
    }
}

fn bool_option(request: &ImportRequest, name: &str) -> Option<bool> {
    request.options.get(name).and_then(Value::as_bool)
}
