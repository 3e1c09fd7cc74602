use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Vendor and OS owned folder names that are never scanned into an item nor deleted.
pub const PROTECTED_NAMES: &[&str] = &[
    "Lenovo",
    "Microsoft",
    "Package Cache",
    "Temp",
    "Speech",
    "SGR",
];

/// X11 and desktop session socket directories under `/tmp`.
#[cfg(unix)]
pub const UNIX_SESSION_NAMES: &[&str] = &[
    ".X11-unix",
    ".ICE-unix",
    ".XIM-unix",
    ".font-unix",
    ".Test-unix",
];

#[cfg(not(unix))]
pub const UNIX_SESSION_NAMES: &[&str] = &[];

/// Per-session directories of long-lived daemons (`tmux-1000`, `ssh-XXXX`,
/// `systemd-private-<id>-<unit>`).
#[cfg(unix)]
pub const PROTECTED_PREFIXES: &[&str] = &["systemd-private-", "tmux-", "ssh-"];

#[cfg(not(unix))]
pub const PROTECTED_PREFIXES: &[&str] = &[];

/// Exact-match set of protected file names. Checked at scan time and again at
/// deletion time.
#[derive(Debug, Clone)]
pub struct Whitelist {
    names: HashSet<OsString>,
}

impl Default for Whitelist {
    fn default() -> Self {
        Self::with_extra(std::iter::empty::<&str>())
    }
}

impl Whitelist {
    /// The fixed protected names plus `extra`.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut names: HashSet<OsString> = PROTECTED_NAMES
            .iter()
            .chain(UNIX_SESSION_NAMES)
            .map(OsString::from)
            .collect();
        names.extend(extra.into_iter().map(|s| s.as_ref().to_os_string()));
        Self { names }
    }

    pub fn contains(&self, name: &OsStr) -> bool {
        if self.names.contains(name) {
            return true;
        }
        let name = name.to_string_lossy();
        PROTECTED_PREFIXES.iter().any(|p| name.starts_with(p))
    }

    /// Checks the final component of `path`. A path without one is not protected.
    pub fn protects(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_names_are_protected() {
        let wl = Whitelist::default();
        assert!(wl.protects(Path::new("/tmp/Temp")));
        assert!(wl.protects(Path::new("C:/Windows/Temp/Package Cache")));
        assert!(!wl.protects(Path::new("/tmp/temp")));
        assert!(!wl.protects(Path::new("/")));
    }

    #[test]
    fn extra_names_extend_the_set() {
        let wl = Whitelist::with_extra(["keep-me"]);
        assert!(wl.protects(Path::new("/var/tmp/keep-me")));
        assert!(wl.protects(Path::new("/var/tmp/Microsoft")));
    }

    #[cfg(unix)]
    #[test]
    fn session_sockets_dirs_are_protected() {
        let wl = Whitelist::default();
        assert!(wl.protects(Path::new("/tmp/.X11-unix")));
        assert!(wl.protects(Path::new("/tmp/tmux-1000")));
        assert!(wl.protects(Path::new("/tmp/ssh-AbCdEf123")));
        assert!(wl.protects(Path::new("/tmp/systemd-private-0a1b-chronyd.service-XyZ")));
        assert!(!wl.protects(Path::new("/tmp/tmuxinator-cache")));
        assert!(!wl.protects(Path::new("/tmp/.X11-unix-old")));
    }
}
