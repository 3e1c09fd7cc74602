use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cleaner::ScanItem;
use crate::error::TrashError;
use crate::progress::ProgressSink;
use crate::trash::TrashService;
use crate::utils;
use crate::whitelist::Whitelist;

/// What to do when moving an item to the trash fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrashFailurePolicy {
    /// Leave the item in place and report it.
    #[default]
    #[serde(rename = "skip")]
    Skip,
    /// Delete the item irreversibly instead.
    #[serde(rename = "permanent")]
    PermanentDelete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Whitelisted,
    PermissionDenied,
    Vanished,
    TrashFailed(String),
    DeleteFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Removed { bytes: u64, permanent: bool },
    Skipped(SkipReason),
}

/// Result of one `clean` call. Counts only include removed items.
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    pub removed_count: usize,
    pub removed_bytes: u64,
    pub outcomes: Vec<(PathBuf, ItemOutcome)>,
    /// `Some(ok)` when an empty-trash step ran.
    pub trash_emptied: Option<bool>,
}

impl CleanReport {
    pub fn skipped(&self) -> impl Iterator<Item = (&PathBuf, &SkipReason)> {
        self.outcomes.iter().filter_map(|(path, outcome)| match outcome {
            ItemOutcome::Skipped(reason) => Some((path, reason)),
            ItemOutcome::Removed { .. } => None,
        })
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped().count()
    }
}

/// Deletes selected items one at a time. A trash failure skips the item
/// unless [`TrashFailurePolicy::PermanentDelete`] was chosen; a permission
/// failure always skips.
pub struct Deleter<'a> {
    trash: &'a dyn TrashService,
    whitelist: &'a Whitelist,
    policy: TrashFailurePolicy,
    empty_trash_after: bool,
}

impl<'a> Deleter<'a> {
    pub fn new(trash: &'a dyn TrashService, whitelist: &'a Whitelist) -> Self {
        Self {
            trash,
            whitelist,
            policy: TrashFailurePolicy::Skip,
            empty_trash_after: false,
        }
    }

    pub fn policy(mut self, policy: TrashFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Empty the trash once after a non-empty batch.
    pub fn empty_trash_after(mut self, enabled: bool) -> Self {
        self.empty_trash_after = enabled;
        self
    }

    /// Process `items` strictly in order. One item's failure never aborts the batch.
    pub fn run(&self, items: &[ScanItem], sink: &dyn ProgressSink) -> CleanReport {
        let mut report = CleanReport::default();

        for item in items {
            let outcome = self.remove_one(item, sink);
            if let ItemOutcome::Removed { bytes, .. } = outcome {
                report.removed_count += 1;
                report.removed_bytes = report.removed_bytes.saturating_add(bytes);
            }
            report.outcomes.push((item.path.clone(), outcome));
        }

        if self.empty_trash_after && !items.is_empty() {
            sink.report("Finalizing: Emptying trash...");
            let ok = match self.trash.empty_trash() {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!("Trash emptying failed: {e}");
                    sink.report(&format!("Error: could not empty trash ({e})"));
                    false
                }
            };
            report.trash_emptied = Some(ok);
        }

        tracing::info!(
            "clean finished: {} removed ({} bytes), {} skipped",
            report.removed_count,
            report.removed_bytes,
            report.skipped_count()
        );
        report
    }

    fn remove_one(&self, item: &ScanItem, sink: &dyn ProgressSink) -> ItemOutcome {
        let name = utils::short_name(&item.path);

        if self.whitelist.protects(&item.path) {
            tracing::debug!("Skipping whitelisted item: {}", item.path.display());
            sink.report(&format!("Skipped: {name} (protected)"));
            return ItemOutcome::Skipped(SkipReason::Whitelisted);
        }

        sink.report(&format!("Cleaning: {name}"));
        let err = match self.trash.move_to_trash(&item.path) {
            Ok(()) => {
                return ItemOutcome::Removed {
                    bytes: item.size_bytes,
                    permanent: false,
                }
            }
            Err(e) => e,
        };

        match err {
            TrashError::PermissionDenied => {
                sink.report(&format!("Skipped: {name} (In Use)"));
                ItemOutcome::Skipped(SkipReason::PermissionDenied)
            }
            TrashError::NotFound => {
                sink.report(&format!("Skipped: {name} (already gone)"));
                ItemOutcome::Skipped(SkipReason::Vanished)
            }
            other => match self.policy {
                TrashFailurePolicy::Skip => {
                    tracing::warn!(
                        "Trash failed for {}: {other}. Skipping permanent delete for safety.",
                        item.path.display()
                    );
                    sink.report(&format!("Error: Trash unavailable for {name}"));
                    ItemOutcome::Skipped(SkipReason::TrashFailed(other.to_string()))
                }
                TrashFailurePolicy::PermanentDelete => self.delete_permanently(item, &name, &other, sink),
            },
        }
    }

    fn delete_permanently(
        &self,
        item: &ScanItem,
        name: &str,
        trash_err: &TrashError,
        sink: &dyn ProgressSink,
    ) -> ItemOutcome {
        tracing::warn!(
            "Trash failed for {}: {trash_err}. Deleting permanently.",
            item.path.display()
        );
        match utils::safe_remove(&item.path) {
            Ok(()) => {
                sink.report(&format!("Deleted permanently: {name}"));
                ItemOutcome::Removed {
                    bytes: item.size_bytes,
                    permanent: true,
                }
            }
            Err(e) => match TrashError::from(e) {
                TrashError::PermissionDenied => {
                    sink.report(&format!("Skipped: {name} (In Use)"));
                    ItemOutcome::Skipped(SkipReason::PermissionDenied)
                }
                TrashError::NotFound => ItemOutcome::Skipped(SkipReason::Vanished),
                other => {
                    tracing::error!("Permanent failure for {}: {other}", item.path.display());
                    sink.report(&format!("Error: {name}"));
                    ItemOutcome::Skipped(SkipReason::DeleteFailed(other.to_string()))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::Category;
    use crate::progress::NullSink;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::SystemTime;

    #[derive(Clone, Copy)]
    enum Failure {
        Unavailable,
        Denied,
    }

    /// Records trashed paths; fails as configured for paths in `fail_on`.
    #[derive(Default)]
    struct FakeTrash {
        fail_on: Vec<(PathBuf, Failure)>,
        trashed: Mutex<Vec<PathBuf>>,
        emptied: AtomicUsize,
    }

    impl TrashService for FakeTrash {
        fn move_to_trash(&self, path: &Path) -> Result<(), TrashError> {
            if let Some((_, failure)) = self.fail_on.iter().find(|(p, _)| p == path) {
                return Err(match failure {
                    Failure::Unavailable => TrashError::Unavailable("recycle bin offline".into()),
                    Failure::Denied => TrashError::PermissionDenied,
                });
            }
            self.trashed.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }

        fn empty_trash(&self) -> Result<(), TrashError> {
            self.emptied.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn item(path: impl Into<PathBuf>, size: u64) -> ScanItem {
        ScanItem {
            path: path.into(),
            size_bytes: size,
            category: Category::StandardTemp,
            last_modified: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn one_failure_does_not_abort_the_batch() {
        let trash = FakeTrash {
            fail_on: vec![(PathBuf::from("/t/two"), Failure::Unavailable)],
            ..FakeTrash::default()
        };
        let wl = Whitelist::default();
        let items = [item("/t/one", 10), item("/t/two", 20), item("/t/three", 30)];

        let report = Deleter::new(&trash, &wl).run(&items, &NullSink);

        assert_eq!(report.removed_count, 2);
        assert_eq!(report.removed_bytes, 40);
        assert_eq!(
            report.outcomes[1].1,
            ItemOutcome::Skipped(SkipReason::TrashFailed(
                "trash unavailable: recycle bin offline".into()
            ))
        );
        assert_eq!(
            *trash.trashed.lock().unwrap(),
            [PathBuf::from("/t/one"), PathBuf::from("/t/three")]
        );
    }

    #[test]
    fn whitelisted_items_are_never_touched() {
        let trash = FakeTrash::default();
        let wl = Whitelist::default();
        let items = [item("/t/Microsoft", 99), item("/t/junk", 1)];

        let report = Deleter::new(&trash, &wl).run(&items, &NullSink);

        assert_eq!(report.removed_count, 1);
        assert_eq!(report.outcomes[0].1, ItemOutcome::Skipped(SkipReason::Whitelisted));
        assert_eq!(*trash.trashed.lock().unwrap(), [PathBuf::from("/t/junk")]);
    }

    #[test]
    fn empty_batch_does_not_empty_trash() {
        let trash = FakeTrash::default();
        let wl = Whitelist::default();
        let report = Deleter::new(&trash, &wl)
            .empty_trash_after(true)
            .run(&[], &NullSink);

        assert_eq!((report.removed_count, report.removed_bytes), (0, 0));
        assert_eq!(report.trash_emptied, None);
        assert_eq!(trash.emptied.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn trash_is_emptied_once_after_batch() {
        let trash = FakeTrash::default();
        let wl = Whitelist::default();
        let report = Deleter::new(&trash, &wl)
            .empty_trash_after(true)
            .run(&[item("/t/a", 1), item("/t/b", 2)], &NullSink);

        assert_eq!(report.trash_emptied, Some(true));
        assert_eq!(trash.emptied.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn permanent_fallback_is_opt_in() {
        let tmp = tempfile::tempdir().unwrap();
        let victim = tmp.path().join("old.log");
        std::fs::write(&victim, b"junk").unwrap();
        let trash = FakeTrash {
            fail_on: vec![(victim.clone(), Failure::Unavailable)],
            ..FakeTrash::default()
        };
        let wl = Whitelist::default();
        let items = [item(&victim, 4)];

        let report = Deleter::new(&trash, &wl).run(&items, &NullSink);
        assert_eq!(report.removed_count, 0);
        assert!(victim.exists());

        let report = Deleter::new(&trash, &wl)
            .policy(TrashFailurePolicy::PermanentDelete)
            .run(&items, &NullSink);
        assert_eq!(report.removed_count, 1);
        assert_eq!(
            report.outcomes[0].1,
            ItemOutcome::Removed {
                bytes: 4,
                permanent: true
            }
        );
        assert!(!victim.exists());
    }

    #[test]
    fn permission_denied_skips_even_with_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let locked = tmp.path().join("locked");
        std::fs::write(&locked, b"in use").unwrap();
        let trash = FakeTrash {
            fail_on: vec![(locked.clone(), Failure::Denied)],
            ..FakeTrash::default()
        };
        let wl = Whitelist::default();

        let report = Deleter::new(&trash, &wl)
            .policy(TrashFailurePolicy::PermanentDelete)
            .run(&[item(&locked, 6)], &NullSink);

        assert_eq!(report.removed_count, 0);
        assert_eq!(report.outcomes[0].1, ItemOutcome::Skipped(SkipReason::PermissionDenied));
        assert!(locked.exists());
    }

    #[test]
    fn progress_is_reported_in_order() {
        let trash = FakeTrash::default();
        let wl = Whitelist::default();
        let seen = Mutex::new(Vec::new());
        let sink = |m: &str| seen.lock().unwrap().push(m.to_string());

        Deleter::new(&trash, &wl).run(&[item("/t/a", 1), item("/t/Temp", 1)], &sink);

        assert_eq!(
            *seen.lock().unwrap(),
            ["Cleaning: a", "Skipped: Temp (protected)"]
        );
    }
}
