//! Environment handed to the editor (and from it, to the client process).

use fcu_core::context::{
    ENV_API_KEY, ENV_API_USER, ENV_FRAME_END, ENV_FRAME_START, ENV_RESOURCE_PATH, ENV_SERVER,
    ENV_SHOT_ID, ENV_TASK_ID,
};
use fcu_core::{FcuError, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const PYTHONPATH: &str = "PYTHONPATH";

const DEFAULT_FRAME_START: &str = "1.0";
const DEFAULT_FRAME_END: &str = "100.0";

/// Installation-level values: where our libraries and resources live and
/// who talks to the tracking service.
#[derive(Debug, Clone, Default)]
pub struct LaunchSettings {
    /// Prepended to `PYTHONPATH`, first entry first.
    pub library_paths: Vec<PathBuf>,
    pub resource_path: Option<PathBuf>,
    pub api_user: Option<String>,
    pub api_key: Option<String>,
    pub server_url: Option<String>,
}

/// The task the editor is launched for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchTarget {
    pub task_id: String,
    pub shot_id: Option<String>,
    pub frame_start: Option<f64>,
    pub frame_end: Option<f64>,
}

/// Builds the child environment from `base` (usually the current process
/// environment).
pub fn build_environment<I>(
    base: I,
    settings: &LaunchSettings,
    target: Option<&LaunchTarget>,
) -> Result<BTreeMap<String, String>>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env: BTreeMap<String, String> = base.into_iter().collect();

    prepend_paths(&mut env, PYTHONPATH, &settings.library_paths)?;

    if let Some(resource_path) = &settings.resource_path {
        env.insert(
            ENV_RESOURCE_PATH.to_string(),
            resource_path.display().to_string(),
        );
    }
    if let Some(user) = &settings.api_user {
        env.insert(ENV_API_USER.to_string(), user.clone());
    }
    if let Some(key) = &settings.api_key {
        env.insert(ENV_API_KEY.to_string(), key.clone());
    }
    if let Some(server) = &settings.server_url {
        env.insert(ENV_SERVER.to_string(), server.clone());
    }

    if let Some(target) = target {
        env.insert(ENV_TASK_ID.to_string(), target.task_id.clone());
        match &target.shot_id {
            Some(shot_id) => env.insert(ENV_SHOT_ID.to_string(), shot_id.clone()),
            None => env.remove(ENV_SHOT_ID),
        };
        env.insert(
            ENV_FRAME_START.to_string(),
            format_frame(target.frame_start, DEFAULT_FRAME_START),
        );
        env.insert(
            ENV_FRAME_END.to_string(),
            format_frame(target.frame_end, DEFAULT_FRAME_END),
        );
    }

    Ok(env)
}

fn format_frame(value: Option<f64>, default: &str) -> String {
    match value {
        Some(frame) if frame.is_finite() => (frame.trunc() as i64).to_string(),
        _ => default.to_string(),
    }
}

fn prepend_paths(
    env: &mut BTreeMap<String, String>,
    key: &str,
    paths: &[PathBuf],
) -> Result<()> {
    if paths.is_empty() {
        return Ok(());
    }

    let mut entries: Vec<PathBuf> = paths.to_vec();
    if let Some(existing) = env.get(key) {
        entries.extend(std::env::split_paths(existing).filter(|p| !paths.contains(p)));
    }

    let joined = std::env::join_paths(entries)
        .map_err(|e| FcuError::config(format!("Cannot build {}: {}", key, e)))?;
    env.insert(key.to_string(), joined.to_string_lossy().into_owned());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Vec<(String, String)> {
        vec![
            ("HOME".to_string(), "/home/artist".to_string()),
            (ENV_SHOT_ID.to_string(), "stale-shot".to_string()),
        ]
    }

    #[test]
    fn test_task_context_and_frames() {
        let target = LaunchTarget {
            task_id: "task-1".to_string(),
            shot_id: Some("shot-1".to_string()),
            frame_start: Some(1001.0),
            frame_end: Some(1010.7),
        };

        let env = build_environment(base(), &LaunchSettings::default(), Some(&target)).unwrap();

        assert_eq!(env[ENV_TASK_ID], "task-1");
        assert_eq!(env[ENV_SHOT_ID], "shot-1");
        assert_eq!(env[ENV_FRAME_START], "1001");
        assert_eq!(env[ENV_FRAME_END], "1010");
        assert_eq!(env["HOME"], "/home/artist");
    }

    #[test]
    fn test_missing_frames_use_defaults_and_stale_shot_is_dropped() {
        let target = LaunchTarget {
            task_id: "task-1".to_string(),
            ..Default::default()
        };

        let env = build_environment(base(), &LaunchSettings::default(), Some(&target)).unwrap();

        assert_eq!(env[ENV_FRAME_START], "1.0");
        assert_eq!(env[ENV_FRAME_END], "100.0");
        assert!(!env.contains_key(ENV_SHOT_ID));
    }

    #[test]
    fn test_without_target_context_is_untouched() {
        let env = build_environment(base(), &LaunchSettings::default(), None).unwrap();
        assert!(!env.contains_key(ENV_TASK_ID));
        assert_eq!(env[ENV_SHOT_ID], "stale-shot");
    }

    #[test]
    fn test_library_paths_are_prepended_once() {
        let lib = PathBuf::from("/opt/fcu/dependencies");
        let settings = LaunchSettings {
            library_paths: vec![lib.clone()],
            api_user: Some("artist".to_string()),
            api_key: Some("secret".to_string()),
            server_url: Some("https://studio.example".to_string()),
            resource_path: Some(PathBuf::from("/opt/fcu/resources")),
        };
        let existing = std::env::join_paths([PathBuf::from("/usr/lib/py"), lib.clone()])
            .unwrap()
            .to_string_lossy()
            .into_owned();
        let base = vec![(PYTHONPATH.to_string(), existing)];

        let env = build_environment(base, &settings, None).unwrap();

        let entries: Vec<PathBuf> = std::env::split_paths(&env[PYTHONPATH]).collect();
        assert_eq!(entries, vec![lib, PathBuf::from("/usr/lib/py")]);
        assert_eq!(env[ENV_API_USER], "artist");
        assert_eq!(env[ENV_API_KEY], "secret");
        assert_eq!(env[ENV_SERVER], "https://studio.example");
        assert_eq!(env[ENV_RESOURCE_PATH], "/opt/fcu/resources");
    }
}
