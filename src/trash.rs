use std::path::Path;

use crate::error::TrashError;

/// Platform adapter for the host trash / recycle bin.
pub trait TrashService: Send + Sync {
    fn move_to_trash(&self, path: &Path) -> Result<(), TrashError>;
    fn empty_trash(&self) -> Result<(), TrashError>;
}

/// Trash of the current user via the `trash` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTrash;

impl TrashService for SystemTrash {
    fn move_to_trash(&self, path: &Path) -> Result<(), TrashError> {
        std::fs::symlink_metadata(path)?;
        trash::delete(path).map_err(|e| classify(&e))
    }

    #[cfg(any(
        target_os = "windows",
        all(
            unix,
            not(target_os = "macos"),
            not(target_os = "ios"),
            not(target_os = "android")
        )
    ))]
    fn empty_trash(&self) -> Result<(), TrashError> {
        let items = trash::os_limited::list().map_err(|e| classify(&e))?;
        if items.is_empty() {
            return Ok(());
        }
        tracing::info!("purging {} trashed items", items.len());
        trash::os_limited::purge_all(items).map_err(|e| classify(&e))
    }

    #[cfg(target_os = "macos")]
    fn empty_trash(&self) -> Result<(), TrashError> {
        let trash_dir = crate::utils::home_dir()
            .ok_or_else(|| TrashError::Unavailable("no home directory".to_string()))?
            .join(".Trash");

        let mut first_err = None;
        for entry in std::fs::read_dir(&trash_dir)?.flatten() {
            if let Err(e) = crate::utils::safe_remove(&entry.path()) {
                tracing::debug!("cannot purge {}: {e}", entry.path().display());
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    #[cfg(not(any(
        target_os = "windows",
        target_os = "macos",
        all(unix, not(target_os = "ios"), not(target_os = "android"))
    )))]
    fn empty_trash(&self) -> Result<(), TrashError> {
        Err(TrashError::Unavailable(
            "emptying the trash is not supported on this platform".to_string(),
        ))
    }
}

/// Map a `trash` error onto our taxonomy using the first I/O error in its
/// source chain.
fn classify(err: &trash::Error) -> TrashError {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            match io.kind() {
                std::io::ErrorKind::PermissionDenied => return TrashError::PermissionDenied,
                std::io::ErrorKind::NotFound => return TrashError::NotFound,
                _ => {}
            }
        }
        source = e.source();
    }
    TrashError::Unavailable(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = SystemTrash
            .move_to_trash(&tmp.path().join("never-existed"))
            .unwrap_err();
        assert!(matches!(err, TrashError::NotFound));
    }
}
