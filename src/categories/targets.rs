use std::collections::HashSet;
use std::path::PathBuf;

use super::Category;

#[cfg(windows)]
const SYSTEM_TEMP_DIR: &[&str] = &["Temp"];
#[cfg(not(windows))]
const SYSTEM_TEMP_DIR: &[&str] = &["var", "tmp"];

const PREFETCH_DIR: &[&str] = &["Prefetch"];

const DISCORD_CACHE: &[&str] = &["discord", "Cache"];

#[cfg(windows)]
const SPOTIFY_CACHE: &[&str] = &["Spotify", "PersistentCache"];
#[cfg(not(windows))]
const SPOTIFY_CACHE: &[&str] = &["spotify", "Data"];

/// Environment-derived base directories targets are resolved against.
/// `None` means the base is unset on this host.
#[derive(Debug, Clone, Default)]
pub struct BaseDirs {
    pub user_temp: Option<PathBuf>,
    pub system_root: Option<PathBuf>,
    /// Roaming application data (`%APPDATA%`, `~/.config`).
    pub roaming_data: Option<PathBuf>,
    /// Local cache data (`%LOCALAPPDATA%`, `~/.cache`).
    pub local_data: Option<PathBuf>,
}

impl BaseDirs {
    #[cfg(windows)]
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var_os(name).map(PathBuf::from);
        Self {
            user_temp: var("TEMP"),
            system_root: var("SystemRoot").or_else(|| Some(PathBuf::from(r"C:\Windows"))),
            roaming_data: var("APPDATA"),
            local_data: var("LOCALAPPDATA"),
        }
    }

    #[cfg(not(windows))]
    pub fn from_env() -> Self {
        Self {
            user_temp: Some(std::env::temp_dir()),
            system_root: Some(PathBuf::from("/")),
            roaming_data: dirs::config_dir(),
            local_data: dirs::cache_dir(),
        }
    }

    /// Where `category` lives on this host, whether or not it exists.
    pub fn location(&self, category: &Category) -> Option<PathBuf> {
        let (base, rel): (&Option<PathBuf>, &[&str]) = match category {
            Category::StandardTemp => (&self.user_temp, &[]),
            Category::SystemTemp => (&self.system_root, SYSTEM_TEMP_DIR),
            Category::Prefetch => (&self.system_root, PREFETCH_DIR),
            Category::AppCache(name) if name == "Discord" => (&self.roaming_data, DISCORD_CACHE),
            Category::AppCache(name) if name == "Spotify" => (&self.local_data, SPOTIFY_CACHE),
            Category::AppCache(_) | Category::DevBloat => return None,
        };
        let mut path = base.clone()?;
        path.extend(rel);
        Some(path)
    }
}

/// Map configured keys to existing directories.
///
/// Unknown keys, unset bases, missing directories and privileged targets
/// without elevation are omitted; none of them is an error.
pub fn resolve_targets(keys: &[String], base: &BaseDirs, elevated: bool) -> Vec<(PathBuf, Category)> {
    let mut seen = HashSet::new();
    let mut targets = Vec::new();

    for key in keys {
        let Some(category) = Category::from_key(key) else {
            tracing::debug!("ignoring unknown target key {key:?}");
            continue;
        };
        if !seen.insert(category.clone()) {
            continue;
        }
        if category.requires_elevation() && !elevated {
            tracing::debug!("{category} needs elevated rights, skipping");
            continue;
        }
        let Some(path) = base.location(&category) else {
            tracing::debug!("{category} has no base directory on this host");
            continue;
        };
        if !path.is_dir() {
            tracing::debug!("{category} target {} does not exist", path.display());
            continue;
        }
        targets.push((path, category));
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn base_in(root: &Path) -> BaseDirs {
        BaseDirs {
            user_temp: Some(root.join("tmp")),
            system_root: Some(root.join("sys")),
            roaming_data: Some(root.join("roaming")),
            local_data: Some(root.join("local")),
        }
    }

    #[test]
    fn resolves_existing_targets_in_key_order() {
        let tmp = tempfile::tempdir().unwrap();
        let base = base_in(tmp.path());
        fs::create_dir_all(tmp.path().join("tmp")).unwrap();
        let discord = base.location(&Category::AppCache("Discord".into())).unwrap();
        fs::create_dir_all(&discord).unwrap();

        let targets = resolve_targets(&keys(&["DISCORD", "TEMP"]), &base, false);
        assert_eq!(
            targets,
            vec![
                (discord, Category::AppCache("Discord".into())),
                (tmp.path().join("tmp"), Category::StandardTemp),
            ]
        );
    }

    #[test]
    fn missing_unknown_and_unset_targets_are_omitted() {
        let tmp = tempfile::tempdir().unwrap();
        let mut base = base_in(tmp.path());
        base.local_data = None;
        fs::create_dir_all(tmp.path().join("tmp")).unwrap();

        let targets = resolve_targets(
            &keys(&["SYSTEM_TEMP", "SPOTIFY", "BOGUS", "TEMP", "TEMP"]),
            &base,
            true,
        );
        assert_eq!(targets, vec![(tmp.path().join("tmp"), Category::StandardTemp)]);
    }

    #[test]
    fn prefetch_requires_elevation() {
        let tmp = tempfile::tempdir().unwrap();
        let base = base_in(tmp.path());
        let prefetch = base.location(&Category::Prefetch).unwrap();
        fs::create_dir_all(&prefetch).unwrap();

        assert!(resolve_targets(&keys(&["PREFETCH"]), &base, false).is_empty());
        assert_eq!(
            resolve_targets(&keys(&["PREFETCH"]), &base, true),
            vec![(prefetch, Category::Prefetch)]
        );
    }
}
