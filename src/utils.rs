use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Home directory of the current user, if the platform reports one.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// True when `modified` lies strictly more than `grace` in the past.
/// Timestamps in the future are never past grace.
pub fn is_past_grace(now: SystemTime, modified: SystemTime, grace: Duration) -> bool {
    match now.duration_since(modified) {
        Ok(age) => age > grace,
        Err(_) => false,
    }
}

/// Permanently remove a file or directory. Symlinks are removed, never followed.
pub fn safe_remove(path: &Path) -> Result<(), std::io::Error> {
    let meta = std::fs::symlink_metadata(path)?;
    if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

/// Format byte count as human-readable string.
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1_099_511_627_776 {
        format!("{:.2} TB", bytes as f64 / 1_099_511_627_776.0)
    } else if bytes >= 1_073_741_824 {
        format!("{:.2} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.2} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1_024 {
        format!("{:.2} KB", bytes as f64 / 1_024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Shorten a path for display by replacing home dir with ~.
pub fn display_path(path: &Path) -> String {
    if let Some(home) = home_dir() {
        if let Ok(relative) = path.strip_prefix(&home) {
            return format!("~/{}", relative.display());
        }
    }
    path.display().to_string()
}

/// Last path component for progress messages.
pub fn short_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
