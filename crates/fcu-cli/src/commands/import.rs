use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use fcu_application::AdapterRegistry;
use fcu_application::adapters::contained_destination;
use fcu_core::asset::{EngineEditor, ImportRequest};
use fcu_infrastructure::FsEngineEditor;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Unity project directory
    #[arg(long)]
    pub project: PathBuf,
    /// Component file to import
    pub file: PathBuf,
    /// Asset type tag (geo, rig, anim)
    #[arg(long = "type")]
    pub asset_type: String,
    #[arg(long = "name")]
    pub asset_name: String,
    #[arg(long)]
    pub version_id: String,
    #[arg(long, default_value_t = 1)]
    pub version: u32,
    #[arg(long)]
    pub component_id: String,
    #[arg(long, default_value = "main")]
    pub component_name: String,
    /// Directory under Assets/ to import into
    #[arg(long, default_value = "ftrack")]
    pub destination: PathBuf,
    /// Import option as key=value; the value is read as JSON when it parses
    #[arg(long = "option", value_parser = parse_option)]
    pub options: Vec<(String, Value)>,
}

fn parse_option(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub async fn run(args: ImportArgs) -> Result<()> {
    let editor = Arc::new(FsEngineEditor::new(&args.project));
    let destination = contained_destination(
        &editor.asset_root(),
        &editor.asset_root().join(&args.destination),
    )
    .context("Import failed")?;
    tokio::fs::create_dir_all(&destination)
        .await
        .with_context(|| format!("Failed to create {}", destination.display()))?;

    let registry = AdapterRegistry::new();
    registry.register_builtin(editor);

    let request = ImportRequest {
        file_path: args.file,
        destination,
        asset_name: args.asset_name,
        asset_type: args.asset_type,
        asset_version_id: args.version_id,
        asset_version: args.version,
        component_id: args.component_id,
        component_name: args.component_name,
        options: args.options.into_iter().collect::<BTreeMap<_, _>>(),
    };

    let imported = registry
        .import_asset(&request)
        .await
        .context("Import failed")?;
    println!("{} {}", "✓".green(), imported.message);
    println!("  {}", imported.path.display());
    Ok(())
}
