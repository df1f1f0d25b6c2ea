//! Discovery of installed Unity editors.
//!
//! Sources, in order: the `UNITY_LOCATION` override (which, when it exists,
//! is the only result), Unity Hub's `editors.json`, the Hub secondary
//! install root and the standard Hub install roots.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::paths::FcuPaths;

pub const ENV_UNITY_LOCATION: &str = "UNITY_LOCATION";
pub const UNKNOWN_VERSION: &str = "Unknown";

/// One launchable editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorInstallation {
    pub identifier: String,
    pub version: String,
    pub path: PathBuf,
}

impl EditorInstallation {
    fn new(version: &str, path: PathBuf) -> Self {
        let identifier = if version == UNKNOWN_VERSION {
            "unity_unknown".to_string()
        } else {
            format!("unity_{}", version)
        };
        Self {
            identifier,
            version: version.to_string(),
            path,
        }
    }

    pub fn label(&self) -> String {
        format!("Unity {} ({})", self.version, self.path.display())
    }
}

/// Where to look.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    pub location_override: Option<PathBuf>,
    /// Directory holding the Hub's JSON settings files.
    pub hub_dir: Option<PathBuf>,
    /// Roots containing one directory per version.
    pub standard_roots: Vec<PathBuf>,
}

impl DiscoveryOptions {
    /// Options for the current machine and environment.
    pub fn from_env() -> Self {
        Self {
            location_override: std::env::var_os(ENV_UNITY_LOCATION)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            hub_dir: FcuPaths::unity_hub_dir(),
            standard_roots: standard_roots(),
        }
    }
}

fn standard_roots() -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![PathBuf::from(r"C:\Program Files\Unity\Hub\Editor")]
    } else if cfg!(target_os = "macos") {
        vec![PathBuf::from("/Applications/Unity/Hub/Editor")]
    } else {
        dirs::home_dir()
            .map(|home| vec![home.join("Unity").join("Hub").join("Editor")])
            .unwrap_or_default()
    }
}

/// Editor executable inside a version directory.
pub fn editor_executable(version_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        version_dir.join("Editor").join("Unity.exe")
    } else if cfg!(target_os = "macos") {
        version_dir
            .join("Unity.app")
            .join("Contents")
            .join("MacOS")
            .join("Unity")
    } else {
        version_dir.join("Editor").join("Unity")
    }
}

/// Lists installed editors: existing executables only, unique by path and
/// by version, sorted by version, the Hub's default editor first.
pub fn discover(options: &DiscoveryOptions) -> Vec<EditorInstallation> {
    if let Some(location) = &options.location_override {
        if location.exists() {
            tracing::debug!("[Discovery] Using {} override", ENV_UNITY_LOCATION);
            return vec![EditorInstallation::new(UNKNOWN_VERSION, location.clone())];
        }
        tracing::warn!(
            "[Discovery] {} points to missing {}",
            ENV_UNITY_LOCATION,
            location.display()
        );
    }

    let mut candidates = Vec::new();
    if let Some(hub_dir) = &options.hub_dir {
        candidates.extend(located_editors(&hub_dir.join("editors.json")));
        if let Some(root) = secondary_install_root(&hub_dir.join("secondaryInstallPath.json")) {
            candidates.extend(scan_root(&root));
        }
    }
    for root in &options.standard_roots {
        candidates.extend(scan_root(root));
    }

    let mut editors = dedupe(candidates);
    editors.sort_by(|a, b| compare_versions(&a.version, &b.version));

    if let Some(default_version) = options
        .hub_dir
        .as_ref()
        .and_then(|dir| read_json_string(&dir.join("defaultEditor.json")))
    {
        if let Some(index) = editors.iter().position(|e| e.version == default_version) {
            let preferred = editors.remove(index);
            editors.insert(0, preferred);
        }
    }

    tracing::debug!("[Discovery] Found {} editor(s)", editors.len());
    editors
}

fn dedupe(candidates: Vec<EditorInstallation>) -> Vec<EditorInstallation> {
    let mut seen_paths = HashSet::new();
    let mut seen_versions = HashSet::new();

    candidates
        .into_iter()
        .filter(|editor| editor.path.exists())
        .filter(|editor| {
            if seen_paths.contains(&editor.path) || seen_versions.contains(&editor.version) {
                return false;
            }
            seen_paths.insert(editor.path.clone());
            seen_versions.insert(editor.version.clone());
            true
        })
        .collect()
}

/// `editors.json`: `{ "<key>": { "version": "...", "location": ["<exe>", ...] } }`.
fn located_editors(path: &Path) -> Vec<EditorInstallation> {
    let Some(Value::Object(entries)) = read_json(path) else {
        return Vec::new();
    };

    entries
        .values()
        .filter_map(|entry| {
            let version = entry.get("version")?.as_str()?;
            let location = entry.get("location")?.as_array()?.first()?.as_str()?;
            if version.is_empty() {
                return None;
            }
            Some(EditorInstallation::new(version, PathBuf::from(location)))
        })
        .collect()
}

fn secondary_install_root(path: &Path) -> Option<PathBuf> {
    read_json_string(path)
        .filter(|root| !root.is_empty())
        .map(PathBuf::from)
}

fn version_dir_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\d[\d.a-z]*$").ok())
        .as_ref()
}

/// `<root>/<version>/...executable`.
fn scan_root(root: &Path) -> Vec<EditorInstallation> {
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !version_dir_pattern().is_some_and(|re| re.is_match(&name)) {
                return None;
            }
            Some(EditorInstallation::new(&name, editor_executable(&entry.path())))
        })
        .collect()
}

fn read_json(path: &Path) -> Option<Value> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("[Discovery] Ignoring unreadable {}: {}", path.display(), e);
            None
        }
    }
}

fn read_json_string(path: &Path) -> Option<String> {
    match read_json(path)? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum VersionPart {
    Number(u64),
    Text(String),
}

fn version_parts(version: &str) -> Vec<VersionPart> {
    static PART: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(part) = PART.get_or_init(|| Regex::new(r"\d+|[A-Za-z]+").ok()) else {
        return Vec::new();
    };

    part.find_iter(version)
        .map(|m| match m.as_str().parse::<u64>() {
            Ok(n) => VersionPart::Number(n),
            Err(_) => VersionPart::Text(m.as_str().to_string()),
        })
        .collect()
}

/// Loose version ordering: numeric runs compare as numbers
/// (`2019.4.10f1` sorts after `2019.4.9f1`).
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    version_parts(a).cmp(&version_parts(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn install(root: &Path, version: &str) -> PathBuf {
        let exe = editor_executable(&root.join(version));
        fs::create_dir_all(exe.parent().unwrap()).unwrap();
        fs::write(&exe, b"").unwrap();
        exe
    }

    fn options(hub: &Path, roots: Vec<PathBuf>) -> DiscoveryOptions {
        DiscoveryOptions {
            location_override: None,
            hub_dir: Some(hub.to_path_buf()),
            standard_roots: roots,
        }
    }

    #[test]
    fn test_override_wins_alone() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("Hub");
        install(&root, "2019.4.1f1");
        let custom = temp.path().join("CustomUnity");
        fs::write(&custom, b"").unwrap();

        let mut opts = options(&temp.path().join("hub-settings"), vec![root]);
        opts.location_override = Some(custom.clone());

        let editors = discover(&opts);
        assert_eq!(editors.len(), 1);
        assert_eq!(editors[0].version, UNKNOWN_VERSION);
        assert_eq!(editors[0].identifier, "unity_unknown");
        assert_eq!(editors[0].path, custom);
    }

    #[test]
    fn test_missing_override_falls_back_to_scanning() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("Hub");
        install(&root, "2019.4.1f1");

        let mut opts = options(&temp.path().join("hub-settings"), vec![root]);
        opts.location_override = Some(temp.path().join("nope"));

        assert_eq!(discover(&opts).len(), 1);
    }

    #[test]
    fn test_sources_are_merged_deduped_and_sorted() {
        let temp = TempDir::new().unwrap();
        let hub = temp.path().join("hub-settings");
        fs::create_dir_all(&hub).unwrap();
        let standard = temp.path().join("Standard");
        let secondary = temp.path().join("Secondary");

        let exe_10 = install(&standard, "2019.4.10f1");
        let duplicate_version = install(&standard, "2019.4.9f1");
        install(&standard, "not-a-version");
        install(&secondary, "2018.3.12f1");
        install(&secondary, "2019.4.9f1");
        let located = temp.path().join("Located").join("Unity");
        fs::create_dir_all(located.parent().unwrap()).unwrap();
        fs::write(&located, b"").unwrap();

        let editors_json = serde_json::json!({
            "a": {"version": "2020.1.0f1", "location": [located.display().to_string()]},
            "b": {"version": "2021.1.0f1", "location": ["/does/not/exist/Unity"]},
            "c": {"version": "2019.4.10f1", "location": [exe_10.display().to_string()]},
        });
        fs::write(hub.join("editors.json"), editors_json.to_string()).unwrap();
        fs::write(
            hub.join("secondaryInstallPath.json"),
            serde_json::to_string(&secondary.display().to_string()).unwrap(),
        )
        .unwrap();

        let editors = discover(&options(&hub, vec![standard]));
        let versions: Vec<&str> = editors.iter().map(|e| e.version.as_str()).collect();

        assert_eq!(
            versions,
            vec!["2018.3.12f1", "2019.4.9f1", "2019.4.10f1", "2020.1.0f1"]
        );
        assert!(editors.iter().all(|e| e.path != duplicate_version));
    }

    #[test]
    fn test_default_editor_moves_first() {
        let temp = TempDir::new().unwrap();
        let hub = temp.path().join("hub-settings");
        fs::create_dir_all(&hub).unwrap();
        let root = temp.path().join("Standard");
        install(&root, "2018.3.12f1");
        install(&root, "2019.4.9f1");
        fs::write(hub.join("defaultEditor.json"), "\"2019.4.9f1\"").unwrap();

        let editors = discover(&options(&hub, vec![root]));
        assert_eq!(editors[0].version, "2019.4.9f1");
        assert_eq!(editors[1].version, "2018.3.12f1");
    }

    #[test]
    fn test_compare_versions_is_numeric() {
        assert_eq!(compare_versions("2019.4.10f1", "2019.4.9f1"), Ordering::Greater);
        assert_eq!(compare_versions("2019.4.1b2", "2019.4.1f1"), Ordering::Less);
        assert_eq!(compare_versions("2019.4.1f1", "2019.4.1f1"), Ordering::Equal);
    }
}
