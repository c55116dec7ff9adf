use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// File extensions recognized as GIS project definition files.
pub const PROJECT_EXTENSIONS: [&str; 2] = ["qgs", "qgz"];

/// Check if two paths refer to the same directory.
///
/// Comparison is lexical after component normalization; neither path has to
/// exist. Empty paths never match anything.
pub fn same_dir(dir1: &Path, dir2: &Path) -> bool {
    if dir1.as_os_str().is_empty() || dir2.as_os_str().is_empty() {
        return false;
    }
    normalize(dir1) == normalize(dir2)
}

/// Check if two paths refer to the same file.
pub fn same_path(path1: &Path, path2: &Path) -> bool {
    same_dir(path1, path2)
}

/// Check if `path` is located inside `dir` (or is `dir` itself).
pub fn is_within_dir(path: &Path, dir: &Path) -> bool {
    if dir.as_os_str().is_empty() {
        return false;
    }
    normalize(path).starts_with(normalize(dir))
}

fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Recursively collect project definition files under `directory`.
///
/// Results are sorted so repeated scans of an unchanged tree are stable.
pub fn find_project_files(directory: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk_project_files(directory, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk_project_files(directory: &Path, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    if !directory.is_dir() {
        return Ok(());
    }
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk_project_files(&path, found)?;
        } else if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if PROJECT_EXTENSIONS.contains(&ext) {
                found.push(path);
            }
        }
    }
    Ok(())
}

/// Format a timestamp relative to now, e.g. "2 hours ago".
///
/// Falls back to a plain date once the timestamp is more than a week old.
pub fn contextual_date(timestamp: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(timestamp);

    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        plural(elapsed.num_minutes(), "minute")
    } else if elapsed.num_hours() < 24 {
        plural(elapsed.num_hours(), "hour")
    } else if elapsed.num_days() < 7 {
        plural(elapsed.num_days(), "day")
    } else {
        timestamp.format("%Y-%m-%d").to_string()
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}
