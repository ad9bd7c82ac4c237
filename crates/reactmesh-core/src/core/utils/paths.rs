//! Cache key and public path normalization.
//!
//! Both functions are pure, total and idempotent: feeding their output back in returns
//! the same string.

use regex::Regex;
use std::sync::LazyLock;

/// Key used when an identifier contains no usable characters at all.
pub const KEY_PLACEHOLDER: &str = "unnamed";

/// First segment of every public asset path.
pub const PUBLIC_ROOT_SEGMENT: &str = "media";

/// Segment produced by the historical `lstrip("/media/")` slice bug, which ate the
/// leading `m` of `models`.
const TRUNCATED_MODELS_SEGMENT: &str = "odels";

static UNSAFE_KEY_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9_.\-]+").expect("static regex is valid")
});

/// Turns an arbitrary identifier into a cache key made only of `[A-Za-z0-9_.-]`.
///
/// Every run of other characters becomes a single `_`. An empty result, or one made
/// only of dots, is replaced by [`KEY_PLACEHOLDER`].
pub fn normalize_key(identifier: &str) -> String {
    let key = UNSAFE_KEY_CHARS.replace_all(identifier, "_");
    if key.is_empty() || key.chars().all(|c| c == '.') {
        KEY_PLACEHOLDER.to_string()
    } else {
        key.into_owned()
    }
}

/// Converts a filesystem path or partial URL into the canonical `/media/...` form.
///
/// Backslashes become `/`, the storage root prefix is removed (unless the path is
/// already public), empty and `.` segments are dropped, a literal `odels` segment is
/// restored to `models`, and exactly one leading `/media/` is guaranteed.
pub fn normalize_public_path(raw: &str, storage_root: &str) -> String {
    let slashed = raw.trim().replace('\\', "/");
    let relative = if is_public_form(&slashed) {
        slashed.as_str()
    } else {
        strip_storage_root(&slashed, storage_root)
    };

    let mut segments: Vec<&str> = relative
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .map(|s| {
            if s == TRUNCATED_MODELS_SEGMENT {
                "models"
            } else {
                s
            }
        })
        .collect();

    if segments.first() != Some(&PUBLIC_ROOT_SEGMENT) {
        segments.insert(0, PUBLIC_ROOT_SEGMENT);
    }
    format!("/{}", segments.join("/"))
}

/// Recovers the identifier an asset was generated from: its file name without the
/// extension. Generated assets are always named `<key>.glb`.
pub fn identifier_from_asset_path(path: &str) -> Option<String> {
    let name = path.replace('\\', "/").rsplit('/').next()?.to_string();
    let stem = match name.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
        _ => name,
    };
    if stem.is_empty() { None } else { Some(stem) }
}

fn is_public_form(slashed: &str) -> bool {
    let trimmed = slashed.trim_start_matches('/');
    trimmed == PUBLIC_ROOT_SEGMENT
        || trimmed
            .strip_prefix(PUBLIC_ROOT_SEGMENT)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn strip_storage_root<'a>(path: &'a str, storage_root: &str) -> &'a str {
    let root = storage_root.trim().replace('\\', "/");
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return path;
    }
    match path.strip_prefix(root) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}
