use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use rayon::prelude::*;

use crate::bloat;
use crate::cancel::CancelToken;
use crate::categories::Category;
use crate::cleaner::ScanItem;
use crate::progress::ProgressSink;
use crate::size;
use crate::utils;
use crate::whitelist::Whitelist;

/// Concurrent scan tasks.
pub const SCAN_WORKERS: usize = 4;

/// Read-only inputs shared by every task of one scan.
pub struct ScanContext<'a> {
    pub now: SystemTime,
    pub grace: Duration,
    pub whitelist: &'a Whitelist,
    pub size_timeout: Duration,
    pub cancel: &'a CancelToken,
    pub sink: &'a dyn ProgressSink,
}

impl ScanContext<'_> {
    pub(crate) fn size_of(&self, path: &Path) -> u64 {
        self.measure(path).bytes
    }

    pub(crate) fn measure(&self, path: &Path) -> size::Measurement {
        size::measure(path, Instant::now() + self.size_timeout, self.cancel)
    }
}

/// One unit of work for the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTask {
    /// Immediate children of a resolved target.
    Category { root: PathBuf, category: Category },
    /// Depth-bounded hunt for stale dependency directories.
    Bloat { root: PathBuf, max_depth: usize },
}

impl ScanTask {
    pub fn run(&self, ctx: &ScanContext<'_>) -> Vec<ScanItem> {
        match self {
            Self::Category { root, category } => scan_category(root, category, ctx),
            Self::Bloat { root, max_depth } => bloat::hunt(root, *max_depth, ctx),
        }
    }
}

/// Run `tasks` on a pool of [`SCAN_WORKERS`] threads and merge the results.
/// Items keep per-task enumeration order; tasks are concatenated in
/// submission order.
pub fn run_tasks(tasks: &[ScanTask], ctx: &ScanContext<'_>) -> Vec<ScanItem> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(SCAN_WORKERS)
        .thread_name(|i| format!("tidysweep-scan-{i}"))
        .build();

    let per_task: Vec<Vec<ScanItem>> = match pool {
        Ok(pool) => pool.install(|| tasks.par_iter().map(|t| t.run(ctx)).collect::<Vec<_>>()),
        Err(e) => {
            tracing::warn!("scan pool unavailable ({e}), scanning sequentially");
            tasks.iter().map(|t| t.run(ctx)).collect()
        }
    };
    per_task.into_iter().flatten().collect()
}

/// Scan the immediate children of `root`: skip whitelisted names, anything
/// modified within the grace period and anything holding a socket or FIFO,
/// then size the rest.
pub fn scan_category(root: &Path, category: &Category, ctx: &ScanContext<'_>) -> Vec<ScanItem> {
    let mut items = Vec::new();
    ctx.sink.report(&format!("Scanning: {}...", category.key()));

    let read_dir = match std::fs::read_dir(root) {
        Ok(rd) => rd,
        Err(e) => {
            tracing::error!("Failed to scan {category}: {e}");
            ctx.sink.report(&format!("Error: cannot read {}", utils::display_path(root)));
            return items;
        }
    };

    for entry in read_dir {
        if ctx.cancel.is_cancelled() {
            break;
        }
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::error!("{category} enumeration stopped early: {e}");
                break;
            }
        };

        if ctx.whitelist.contains(&entry.file_name()) {
            tracing::debug!("whitelisted: {}", entry.path().display());
            continue;
        }

        let path = entry.path();
        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                tracing::debug!("cannot stat {}: {e}", path.display());
                continue;
            }
        };
        if !utils::is_past_grace(ctx.now, modified, ctx.grace) {
            continue;
        }

        let seen = ctx.measure(&path);
        if seen.ipc_endpoint {
            tracing::debug!("holds a live socket or pipe: {}", path.display());
            continue;
        }
        items.push(ScanItem {
            path,
            size_bytes: seen.bytes,
            category: category.clone(),
            last_modified: modified,
        });
    }

    tracing::info!("{category}: {} eligible items", items.len());
    items
}
