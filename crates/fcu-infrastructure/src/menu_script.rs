//! Generates the editor-side menu that asks the client to open dialogs.
//!
//! Everything under `Assets/ftrack/Temp` is rewritten on every client start.

use fcu_core::Result;
use fcu_core::dialog::DialogKind;
use std::fs;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

const SCRIPT_FILE: &str = "FtrackMenus.cs";
const ASSEMBLY_FILE: &str = "FtrackMenus.asmdef";
const README_FILE: &str = "README.txt";

const ASSEMBLY_DEFINITION: &str = r#"{
    "name": "FtrackMenus",
    "references": [
        "Unity.Scripting.Python.Editor"
    ],
    "optionalUnityReferences": [],
    "includePlatforms": [
        "Editor"
    ],
    "excludePlatforms": [],
    "allowUnsafeCode": false,
    "overrideReferences": false,
    "precompiledReferences": [],
    "autoReferenced": true,
    "defineConstraints": []
}
"#;

const README: &str = "The Assets/ftrack folder is regenerated every time ftrack initializes.\n\
Do not store project assets in it: the folder is deleted frequently.\n";

/// `<asset_root>/ftrack/Temp`.
pub fn menu_dir(asset_root: &Path) -> PathBuf {
    asset_root.join("ftrack").join("Temp")
}

/// C# source with one `MenuItem` per dialog kind.
pub fn render_menu_script() -> String {
    let items: String = DialogKind::iter()
        .enumerate()
        .map(|(index, kind)| {
            format!(
                r#"
        [MenuItem("ftrack/{name}")]
        private static void ShowDialog{index}()
        {{
            PythonRunner.CallServiceOnClient("'show_dialog'", "'{name}'");
        }}
"#,
                name = kind,
                index = index
            )
        })
        .collect();

    format!(
        r#"// Generated by fcu. Do not edit.
using UnityEngine;
using UnityEditor.Scripting.Python;

namespace UnityEditor.ftrack.connect_unity_engine
{{
    public static class FtrackMenus
    {{{items}    }}
}}
"#
    )
}

/// Writes the script, its assembly definition and a README.
///
/// Returns the written paths.
pub fn write_menu_files(asset_root: &Path) -> Result<Vec<PathBuf>> {
    let dir = menu_dir(asset_root);
    fs::create_dir_all(&dir)?;

    let files = [
        (SCRIPT_FILE, render_menu_script()),
        (ASSEMBLY_FILE, ASSEMBLY_DEFINITION.to_string()),
        (README_FILE, README.to_string()),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, content) in files {
        let path = dir.join(name);
        fs::write(&path, content)?;
        written.push(path);
    }

    tracing::debug!("[Menus] Generated editor menus in {}", dir.display());
    Ok(written)
}
