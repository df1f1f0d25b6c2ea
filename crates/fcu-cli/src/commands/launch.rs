use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use fcu_core::config::ClientConfig;
use fcu_core::context::{ENV_API_KEY, ENV_API_USER, ENV_SERVER};
use fcu_infrastructure::launch::{
    DiscoveryOptions, EditorInstallation, LaunchSettings, LaunchTarget, build_environment,
    discover, launch_editor,
};
use std::path::{Path, PathBuf};

/// Production context and installation paths for a launch.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Task the editor is opened for
    #[arg(long)]
    pub task: Option<String>,
    /// Shot of the task
    #[arg(long, requires = "task")]
    pub shot: Option<String>,
    /// First frame of the shot
    #[arg(long, requires = "task")]
    pub frame_start: Option<f64>,
    /// Last frame of the shot
    #[arg(long, requires = "task")]
    pub frame_end: Option<f64>,
    /// Directory prepended to PYTHONPATH (repeatable)
    #[arg(long = "library-path")]
    pub library_paths: Vec<PathBuf>,
    /// Integration resource directory
    #[arg(long)]
    pub resource_path: Option<PathBuf>,
}

impl TargetArgs {
    pub fn to_launch_target(&self) -> Option<LaunchTarget> {
        self.task.as_ref().map(|task_id| LaunchTarget {
            task_id: task_id.clone(),
            shot_id: self.shot.clone(),
            frame_start: self.frame_start,
            frame_end: self.frame_end,
        })
    }
}

/// Credentials come from the current environment; the server from the
/// configuration when it names one.
pub fn launch_settings(target: &TargetArgs, config: &ClientConfig) -> LaunchSettings {
    let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
    LaunchSettings {
        library_paths: target.library_paths.clone(),
        resource_path: target.resource_path.clone(),
        api_user: var(ENV_API_USER),
        api_key: var(ENV_API_KEY),
        server_url: config.tracking.server_url.clone().or_else(|| var(ENV_SERVER)),
    }
}

fn pick_editor(
    editors: Vec<EditorInstallation>,
    version: Option<&str>,
) -> Result<EditorInstallation> {
    let mut editors = editors.into_iter();
    match version {
        Some(version) => editors
            .find(|e| e.version == version)
            .with_context(|| format!("Unity {} is not installed (see `fcu discover`)", version)),
        None => editors
            .next()
            .context("No Unity editor found (see `fcu discover`)"),
    }
}

pub async fn run(
    project: &Path,
    version: Option<&str>,
    target: &TargetArgs,
    config: &ClientConfig,
) -> Result<()> {
    if !project.is_dir() {
        anyhow::bail!("Project directory {} does not exist", project.display());
    }

    let editor = pick_editor(discover(&DiscoveryOptions::from_env()), version)?;
    let env = build_environment(
        std::env::vars(),
        &launch_settings(target, config),
        target.to_launch_target().as_ref(),
    )?;

    println!("🚀 Launching {}...", editor.label());
    let child = launch_editor(&editor, project, &env)?;
    match child.id() {
        Some(pid) => println!("{} editor started (pid {})", "✓".green(), pid),
        None => println!("{} editor started", "✓".green()),
    }
    Ok(())
}
