use anyhow::{Context, Result};
use colored::Colorize;
use fcu_core::asset::EngineEditor;
use fcu_infrastructure::FsEngineEditor;
use fcu_infrastructure::menu_script::write_menu_files;
use std::path::Path;

pub fn run(project: &Path) -> Result<()> {
    let editor = FsEngineEditor::new(project);
    let written = write_menu_files(&editor.asset_root())
        .with_context(|| format!("Failed to write menus into {}", project.display()))?;

    println!("{} Generated ftrack menus:", "✓".green());
    for path in written {
        println!("  - {}", path.display());
    }
    Ok(())
}
