use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, SystemTime};

use serde::Serialize;

use crate::cancel::CancelToken;
use crate::categories::{self, BaseDirs, Category};
use crate::config::{Config, ConfigProvider};
use crate::deleter::{CleanReport, Deleter};
use crate::health;
use crate::privilege::{PrivilegeProbe, ProcessPrivilege};
use crate::progress::ProgressSink;
use crate::scanner::{self, ScanContext, ScanTask};
use crate::size::DEFAULT_SIZE_TIMEOUT;
use crate::trash::{SystemTrash, TrashService};
use crate::utils;
use crate::whitelist::Whitelist;

/// One item found during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanItem {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub category: Category,
    pub last_modified: SystemTime,
}

/// Everything one `scan()` found, in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSnapshot {
    pub items: Vec<ScanItem>,
    /// Set when the scan was cancelled before finishing.
    pub cancelled: bool,
}

/// Per-category aggregate of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: Category,
    pub items: usize,
    pub bytes: u64,
}

impl ScanSnapshot {
    pub fn total_bytes(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |acc, i| acc.saturating_add(i.size_bytes))
    }

    pub fn health_score(&self) -> u8 {
        health::health_score(self.total_bytes())
    }

    /// Totals per category, in order of first appearance.
    pub fn by_category(&self) -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = Vec::new();
        for item in &self.items {
            match totals.iter_mut().find(|t| t.category == item.category) {
                Some(t) => {
                    t.items += 1;
                    t.bytes = t.bytes.saturating_add(item.size_bytes);
                }
                None => totals.push(CategoryTotal {
                    category: item.category.clone(),
                    items: 1,
                    bytes: item.size_bytes,
                }),
            }
        }
        totals
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The cleaner engine: scans configured targets and deletes what the caller
/// selects. Holds no background threads; every call is one-shot.
pub struct Cleaner {
    config: Box<dyn ConfigProvider>,
    privilege: Box<dyn PrivilegeProbe>,
    trash: Box<dyn TrashService>,
    base_dirs: BaseDirs,
    size_timeout: Duration,
    cancel: Mutex<CancelToken>,
    last: RwLock<Arc<ScanSnapshot>>,
}

impl Cleaner {
    pub fn new(
        config: Box<dyn ConfigProvider>,
        privilege: Box<dyn PrivilegeProbe>,
        trash: Box<dyn TrashService>,
    ) -> Self {
        Self {
            config,
            privilege,
            trash,
            base_dirs: BaseDirs::from_env(),
            size_timeout: DEFAULT_SIZE_TIMEOUT,
            cancel: Mutex::new(CancelToken::new()),
            last: RwLock::new(Arc::new(ScanSnapshot::default())),
        }
    }

    /// Engine wired to the host: real privilege probe and system trash.
    pub fn system(config: impl ConfigProvider + 'static) -> Self {
        Self::new(Box::new(config), Box::new(ProcessPrivilege), Box::new(SystemTrash))
    }

    pub fn with_base_dirs(mut self, base_dirs: BaseDirs) -> Self {
        self.base_dirs = base_dirs;
        self
    }

    /// Per-item budget for size estimation.
    pub fn with_size_timeout(mut self, timeout: Duration) -> Self {
        self.size_timeout = timeout;
        self
    }

    /// Handle that stops the running scan, or the next one if none is
    /// running. Once a scan has observed the cancel, later calls hand out a
    /// fresh token, so an old handle never stops a later scan.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Swap in a fresh token if `used` is still the current one.
    fn retire_token(&self, used: &CancelToken) {
        let mut current = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        if current.same(used) {
            *current = CancelToken::new();
        }
    }

    fn whitelist(config: &Config) -> Whitelist {
        Whitelist::with_extra(&config.extra_whitelist)
    }

    /// Existing target directories for the current configuration.
    pub fn resolve_targets(&self) -> Vec<(PathBuf, Category)> {
        let config = self.config.config();
        categories::resolve_targets(
            &config.targets,
            &self.base_dirs,
            self.privilege.is_elevated(),
        )
    }

    fn plan(&self, config: &Config) -> Vec<ScanTask> {
        let mut tasks: Vec<ScanTask> = self
            .resolve_targets()
            .into_iter()
            .map(|(root, category)| ScanTask::Category { root, category })
            .collect();

        if config.dev_bloat_hunter {
            for root in &config.search_paths {
                if !root.is_dir() {
                    tracing::debug!("search path {} does not exist", root.display());
                    continue;
                }
                tasks.push(ScanTask::Bloat {
                    root: root.clone(),
                    max_depth: config.max_scan_depth,
                });
            }
        }
        tasks
    }

    /// Scan every resolved target concurrently and return the snapshot.
    ///
    /// A completed scan replaces the stored snapshot; a cancelled one is
    /// returned flagged and leaves the stored snapshot untouched.
    pub fn scan(&self, sink: &dyn ProgressSink) -> Arc<ScanSnapshot> {
        let cancel = self.cancel_token();
        let config = self.config.config();
        let whitelist = Self::whitelist(&config);
        let tasks = self.plan(&config);
        tracing::info!("scan started with {} tasks", tasks.len());

        let ctx = ScanContext {
            now: SystemTime::now(),
            grace: config.grace_period(),
            whitelist: &whitelist,
            size_timeout: self.size_timeout,
            cancel: &cancel,
            sink,
        };
        let items = scanner::run_tasks(&tasks, &ctx);
        let snapshot = Arc::new(ScanSnapshot {
            items,
            cancelled: cancel.is_cancelled(),
        });

        if snapshot.cancelled {
            self.retire_token(&cancel);
            tracing::info!("scan cancelled after {} items", snapshot.items.len());
            sink.report("Scan cancelled.");
            return snapshot;
        }

        tracing::info!(
            "scan found {} items, {} reclaimable",
            snapshot.items.len(),
            utils::format_size(snapshot.total_bytes())
        );
        *self.last.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);
        snapshot
    }

    /// The last completed snapshot; empty before the first scan.
    pub fn last_snapshot(&self) -> Arc<ScanSnapshot> {
        Arc::clone(&self.last.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Delete `selected` one at a time through the trash. Whitelisted names
    /// are refused again here regardless of where the items came from.
    pub fn clean(&self, selected: &[ScanItem], sink: &dyn ProgressSink) -> CleanReport {
        let config = self.config.config();
        let whitelist = Self::whitelist(&config);
        Deleter::new(self.trash.as_ref(), &whitelist)
            .policy(config.trash_failure)
            .empty_trash_after(config.empty_recycle_bin)
            .run(selected, sink)
    }

    /// Empty the trash unconditionally.
    pub fn empty_trash(&self, sink: &dyn ProgressSink) -> bool {
        sink.report("Emptying trash...");
        match self.trash.empty_trash() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Trash emptying failed: {e}");
                sink.report(&format!("Error: could not empty trash ({e})"));
                false
            }
        }
    }
}
