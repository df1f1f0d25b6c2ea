//! Editor discovery and launch.

mod discovery;
mod environment;

pub use discovery::{
    DiscoveryOptions, ENV_UNITY_LOCATION, EditorInstallation, UNKNOWN_VERSION, compare_versions,
    discover, editor_executable,
};
pub use environment::{LaunchSettings, LaunchTarget, PYTHONPATH, build_environment};

use fcu_core::{FcuError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::process::{Child, Command};

/// Builds the command that opens `project_path` in `editor` with exactly
/// `env` as its environment.
pub fn editor_command(
    editor: &EditorInstallation,
    project_path: &Path,
    env: &BTreeMap<String, String>,
) -> Command {
    let mut command = Command::new(&editor.path);
    command
        .arg("-projectPath")
        .arg(project_path)
        .env_clear()
        .envs(env);
    command
}

/// Spawns the editor. The child keeps running after we exit.
pub fn launch_editor(
    editor: &EditorInstallation,
    project_path: &Path,
    env: &BTreeMap<String, String>,
) -> Result<Child> {
    tracing::info!(
        "[Launch] Starting {} on {}",
        editor.label(),
        project_path.display()
    );

    editor_command(editor, project_path, env)
        .spawn()
        .map_err(|e| FcuError::io(format!("Failed to start {}: {}", editor.path.display(), e)))
}
