use std::path::Path;
use std::time::{Duration, Instant};

use walkdir::WalkDir;

use crate::cancel::CancelToken;

/// Budget for one top-level size computation.
pub const DEFAULT_SIZE_TIMEOUT: Duration = Duration::from_secs(5);

/// Size of a file, or the sum of all regular files below a directory.
///
/// Symlinks are never followed. Once `timeout` elapses the partial sum
/// collected so far is returned. Unreadable entries count as zero.
pub fn estimate_size(path: &Path, timeout: Duration) -> u64 {
    estimate_size_until(path, Instant::now() + timeout, &CancelToken::new())
}

/// Same as [`estimate_size`] with an absolute deadline and a cancel flag.
pub fn estimate_size_until(path: &Path, deadline: Instant, cancel: &CancelToken) -> u64 {
    measure(path, deadline, cancel).bytes
}

/// What one walk over a candidate learned about it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Measurement {
    pub bytes: u64,
    /// A socket or FIFO was seen, i.e. some process may still be talking
    /// through this path.
    pub ipc_endpoint: bool,
}

/// Size `path` and look for live IPC endpoints in the same walk, stopping at
/// `deadline` or on cancel with whatever was seen so far.
pub fn measure(path: &Path, deadline: Instant, cancel: &CancelToken) -> Measurement {
    measure_with(path, || Instant::now() >= deadline || cancel.is_cancelled())
}

/// The walk behind [`measure`]. `should_stop` is polled once before every
/// entry, the root included, so the budget spans all nested directories.
fn measure_with(path: &Path, mut should_stop: impl FnMut() -> bool) -> Measurement {
    let mut seen = Measurement::default();
    let meta = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!("cannot stat {}: {e}", path.display());
            return seen;
        }
    };

    if meta.is_file() {
        seen.bytes = meta.len();
        return seen;
    }
    if !meta.is_dir() {
        seen.ipc_endpoint = is_ipc_endpoint(&meta.file_type());
        return seen;
    }

    for entry in WalkDir::new(path).follow_links(false) {
        if should_stop() {
            tracing::debug!(
                "walk of {} cut short, partial {} bytes",
                path.display(),
                seen.bytes
            );
            break;
        }

        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("skipping unreadable entry: {e}");
                continue;
            }
        };
        let file_type = entry.file_type();
        if is_ipc_endpoint(&file_type) {
            seen.ipc_endpoint = true;
            continue;
        }
        if !file_type.is_file() {
            continue;
        }
        if let Ok(m) = entry.metadata() {
            seen.bytes = seen.bytes.saturating_add(m.len());
        }
    }
    seen
}

#[cfg(unix)]
fn is_ipc_endpoint(file_type: &std::fs::FileType) -> bool {
    use std::os::unix::fs::FileTypeExt;
    file_type.is_socket() || file_type.is_fifo()
}

#[cfg(not(unix))]
fn is_ipc_endpoint(_file_type: &std::fs::FileType) -> bool {
    false
}
