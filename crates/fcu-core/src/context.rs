//! Production context handed to the editor and client processes through
//! environment variables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const ENV_TASK_ID: &str = "FTRACK_TASKID";
pub const ENV_SHOT_ID: &str = "FTRACK_SHOTID";
pub const ENV_FRAME_START: &str = "FS";
pub const ENV_FRAME_END: &str = "FE";
pub const ENV_API_KEY: &str = "FTRACK_APIKEY";
pub const ENV_API_USER: &str = "LOGNAME";
pub const ENV_SERVER: &str = "FTRACK_SERVER";
pub const ENV_RESOURCE_PATH: &str = "FTRACK_UNITY_RESOURCE_PATH";

/// Context values read from the launch environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchContext {
    pub task_id: Option<String>,
    pub shot_id: Option<String>,
    pub frame_start: Option<i64>,
    pub frame_end: Option<i64>,
    pub api_key: Option<String>,
    pub api_user: Option<String>,
    pub server_url: Option<String>,
    pub resource_path: Option<PathBuf>,
}

impl LaunchContext {
    /// Reads the context from the current process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Reads the context from an arbitrary set of variables.
    ///
    /// Empty values are treated as unset. Frame bounds are written by the
    /// launcher as floats (`"1001.0"`) and truncated to whole frames.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();

        Self {
            task_id: vars.get(ENV_TASK_ID).cloned(),
            shot_id: vars.get(ENV_SHOT_ID).cloned(),
            frame_start: vars.get(ENV_FRAME_START).and_then(|v| parse_frame(v)),
            frame_end: vars.get(ENV_FRAME_END).and_then(|v| parse_frame(v)),
            api_key: vars.get(ENV_API_KEY).cloned(),
            api_user: vars.get(ENV_API_USER).cloned(),
            server_url: vars.get(ENV_SERVER).cloned(),
            resource_path: vars.get(ENV_RESOURCE_PATH).map(PathBuf::from),
        }
    }

    /// The entity the dialogs start browsing from: the task, else the shot.
    pub fn current_entity_id(&self) -> Option<&str> {
        self.task_id.as_deref().or(self.shot_id.as_deref())
    }

    /// Both frame bounds, when the launcher provided them.
    pub fn frame_range(&self) -> Option<(i64, i64)> {
        match (self.frame_start, self.frame_end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

/// Parses a frame bound such as `"1001"` or `"1001.0"`.
pub fn parse_frame(value: &str) -> Option<i64> {
    let value = value.trim();
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().map(|f| f.trunc() as i64))
}
