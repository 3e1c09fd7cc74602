use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use walkdir::WalkDir;

use crate::categories::Category;
use crate::cleaner::ScanItem;
use crate::scanner::ScanContext;
use crate::utils;

/// A dependency directory untouched this long is stale.
pub const STALE_AFTER: Duration = Duration::from_secs(30 * 24 * 3600);

/// Installed-package trees that can be recreated from a manifest.
pub const BLOAT_DIRS: &[&str] = &["node_modules", "bower_components", "venv", ".venv", ".tox"];

/// Never descended into: user media libraries, app data, VCS and IDE metadata.
pub const SKIP_DIRS: &[&str] = &[
    "AppData",
    "Library",
    "Pictures",
    "Music",
    "Videos",
    "Movies",
    ".git",
    ".hg",
    ".svn",
    ".vscode",
    ".idea",
];

pub fn is_bloat_dir(name: &str) -> bool {
    BLOAT_DIRS.contains(&name)
}

fn should_skip_dir(name: &str) -> bool {
    SKIP_DIRS.contains(&name) || name.starts_with('.')
}

/// Walk `root` depth-first, at most `max_depth` levels below it (the root
/// itself is depth 0). A bloat directory is never descended into; it is
/// reported when it is stale. Unreadable subtrees count as empty.
pub fn hunt(root: &Path, max_depth: usize, ctx: &ScanContext<'_>) -> Vec<ScanItem> {
    ctx.sink
        .report(&format!("Hunting in: {}...", utils::short_name(root)));

    let stale_after = STALE_AFTER.max(ctx.grace);
    let found = find_stale(root, max_depth, stale_after, ctx);

    let items: Vec<ScanItem> = found
        .into_iter()
        .map(|(path, last_modified)| ScanItem {
            size_bytes: ctx.size_of(&path),
            path,
            category: Category::DevBloat,
            last_modified,
        })
        .collect();

    tracing::info!(
        "bloat hunt in {} found {} stale directories",
        root.display(),
        items.len()
    );
    items
}

fn find_stale(
    root: &Path,
    max_depth: usize,
    stale_after: Duration,
    ctx: &ScanContext<'_>,
) -> Vec<(PathBuf, SystemTime)> {
    let mut found = Vec::new();
    if max_depth == 0 {
        return found;
    }

    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter();

    while let Some(entry) = walker.next() {
        if ctx.cancel.is_cancelled() {
            break;
        }
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("Scan error under {}: {e}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if is_bloat_dir(&name) {
            walker.skip_current_dir();
            if ctx.whitelist.contains(entry.file_name()) {
                continue;
            }
            match entry
                .metadata()
                .map_err(std::io::Error::from)
                .and_then(|m| m.modified())
            {
                Ok(modified) if utils::is_past_grace(ctx.now, modified, stale_after) => {
                    found.push((entry.into_path(), modified));
                }
                Ok(_) => tracing::debug!("{} is still in use", entry.path().display()),
                Err(e) => tracing::debug!("cannot stat {}: {e}", entry.path().display()),
            }
            continue;
        }

        if should_skip_dir(&name) {
            walker.skip_current_dir();
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelToken;
    use crate::progress::NullSink;
    use crate::size::DEFAULT_SIZE_TIMEOUT;
    use crate::whitelist::Whitelist;
    use std::fs::{self, File};

    const DAY: Duration = Duration::from_secs(24 * 3600);

    fn stale_dir(path: &Path, days: u32) {
        fs::create_dir_all(path.join("pkg")).unwrap();
        fs::write(path.join("pkg/index.js"), vec![b'x'; 128]).unwrap();
        File::open(path)
            .unwrap()
            .set_modified(SystemTime::now() - DAY * days)
            .unwrap();
    }

    fn hunt_in(root: &Path, max_depth: usize) -> Vec<ScanItem> {
        let wl = Whitelist::default();
        let cancel = CancelToken::new();
        let ctx = ScanContext {
            now: SystemTime::now(),
            grace: DAY,
            whitelist: &wl,
            size_timeout: DEFAULT_SIZE_TIMEOUT,
            cancel: &cancel,
            sink: &NullSink,
        };
        hunt(root, max_depth, &ctx)
    }

    #[test]
    fn depth_bound_is_respected() {
        let tmp = tempfile::tempdir().unwrap();
        let shallow = tmp.path().join("proj/node_modules");
        let deep = tmp.path().join("work/proj/node_modules");
        stale_dir(&shallow, 60);
        stale_dir(&deep, 60);

        let items = hunt_in(tmp.path(), 2);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, shallow);
        assert_eq!(items[0].category, Category::DevBloat);
        assert_eq!(items[0].size_bytes, 128);

        assert_eq!(hunt_in(tmp.path(), 3).len(), 2);
        assert!(hunt_in(tmp.path(), 0).is_empty());
    }

    #[test]
    fn fresh_dependency_dirs_are_left_alone() {
        let tmp = tempfile::tempdir().unwrap();
        stale_dir(&tmp.path().join("active/node_modules"), 2);
        stale_dir(&tmp.path().join("old/venv"), 45);

        let items = hunt_in(tmp.path(), 3);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, tmp.path().join("old/venv"));
    }

    #[test]
    fn matches_are_not_recursed_into() {
        let tmp = tempfile::tempdir().unwrap();
        let outer = tmp.path().join("app/node_modules");
        stale_dir(&outer.join("dep/node_modules"), 90);
        stale_dir(&outer, 90);

        let items = hunt_in(tmp.path(), 5);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, outer);
    }

    #[test]
    fn skip_list_and_hidden_dirs_are_pruned() {
        let tmp = tempfile::tempdir().unwrap();
        stale_dir(&tmp.path().join("Music/node_modules"), 90);
        stale_dir(&tmp.path().join(".cache/node_modules"), 90);
        stale_dir(&tmp.path().join("code/.venv"), 90);

        let items = hunt_in(tmp.path(), 3);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, tmp.path().join("code/.venv"));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directories_do_not_end_the_hunt() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let locked = tmp.path().join("a-locked");
        let hidden = locked.join("proj/node_modules");
        stale_dir(&hidden, 60);
        let open = tmp.path().join("z-open/node_modules");
        stale_dir(&open, 60);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        let unreadable = fs::read_dir(&locked).is_err();
        let items = hunt_in(tmp.path(), 4);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let paths: Vec<_> = items.iter().map(|i| i.path.clone()).collect();
        assert!(paths.contains(&open));
        // Root can still read it; everyone else walks past.
        assert_eq!(paths.contains(&hidden), !unreadable);
    }
}
