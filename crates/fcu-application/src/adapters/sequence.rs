//! Image-sequence path patterns.
//!
//! The server writes frame templates in whatever convention the recorder
//! uses (`shot.<Frame>.png`, `shot.####.png`, `shot.%d.png`). Components
//! store them as printf-style patterns followed by the frame range,
//! e.g. `shot.%04d.png [1001-1010]`.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Padding used when the placeholder does not specify one.
const DEFAULT_FRAME_PADDING: usize = 4;

fn placeholder_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)<frame>|#+|%(\d*)d").ok())
        .as_ref()
}

/// Rewrites every frame placeholder of `template` as `%0Nd`.
pub fn normalize_frame_pattern(template: &str) -> String {
    let Some(pattern) = placeholder_pattern() else {
        return template.to_string();
    };

    pattern
        .replace_all(template, |caps: &Captures| {
            let matched = &caps[0];
            let width = if matched.starts_with('#') {
                matched.len()
            } else {
                caps.get(1)
                    .and_then(|w| w.as_str().parse::<usize>().ok())
                    .filter(|w| *w > 0)
                    .unwrap_or(DEFAULT_FRAME_PADDING)
            };
            format!("%0{}d", width)
        })
        .into_owned()
}

/// Component path of a sequence: normalized pattern plus ` [start-end]`.
pub fn sequence_path(template: &str, frame_start: i64, frame_end: i64) -> String {
    format!(
        "{} [{}-{}]",
        normalize_frame_pattern(template),
        frame_start,
        frame_end
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_normalized() {
        assert_eq!(normalize_frame_pattern("shot.<Frame>.png"), "shot.%04d.png");
        assert_eq!(normalize_frame_pattern("shot.<frame>.png"), "shot.%04d.png");
        assert_eq!(normalize_frame_pattern("shot.######.exr"), "shot.%06d.exr");
        assert_eq!(normalize_frame_pattern("shot.%d.jpg"), "shot.%04d.jpg");
        assert_eq!(normalize_frame_pattern("shot.%03d.jpg"), "shot.%03d.jpg");
        assert_eq!(normalize_frame_pattern("shot.%3d.jpg"), "shot.%03d.jpg");
    }

    #[test]
    fn test_frame_range_is_appended_verbatim() {
        assert_eq!(
            sequence_path("/renders/sh010/shot.<Frame>.png", 1001, 1010),
            "/renders/sh010/shot.%04d.png [1001-1010]"
        );
    }
}
