mod targets;

pub use targets::{resolve_targets, BaseDirs};

use std::fmt;

use serde::Serialize;

/// Which logical source a scanned item came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    StandardTemp,
    SystemTemp,
    Prefetch,
    AppCache(String),
    DevBloat,
}

/// Configured target keys the resolver understands.
pub fn all_category_keys() -> Vec<&'static str> {
    vec!["TEMP", "SYSTEM_TEMP", "PREFETCH", "DISCORD", "SPOTIFY"]
}

impl Category {
    /// Parse a configuration key such as `"SYSTEM_TEMP"` or `"DISCORD"`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "TEMP" => Some(Self::StandardTemp),
            "SYSTEM_TEMP" => Some(Self::SystemTemp),
            "PREFETCH" => Some(Self::Prefetch),
            "DISCORD" => Some(Self::AppCache("Discord".to_string())),
            "SPOTIFY" => Some(Self::AppCache("Spotify".to_string())),
            _ => None,
        }
    }

    /// Machine-readable key; the inverse of [`Category::from_key`].
    pub fn key(&self) -> String {
        match self {
            Self::StandardTemp => "TEMP".to_string(),
            Self::SystemTemp => "SYSTEM_TEMP".to_string(),
            Self::Prefetch => "PREFETCH".to_string(),
            Self::AppCache(name) => name.to_uppercase(),
            Self::DevBloat => "DEV_BLOAT".to_string(),
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> String {
        match self {
            Self::StandardTemp => "Temp Files".to_string(),
            Self::SystemTemp => "System Temp".to_string(),
            Self::Prefetch => "Prefetch".to_string(),
            Self::AppCache(name) => format!("{name} Cache"),
            Self::DevBloat => "Dev Bloat".to_string(),
        }
    }

    /// Only resolved when the process holds elevated rights.
    pub fn requires_elevation(&self) -> bool {
        matches!(self, Self::Prefetch)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_parses_back() {
        for key in all_category_keys() {
            let cat = Category::from_key(key).unwrap();
            assert_eq!(cat.key(), key);
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert_eq!(Category::from_key("temp"), None);
        assert_eq!(Category::from_key("DEV_BLOAT"), None);
    }

    #[test]
    fn only_prefetch_is_privileged() {
        assert!(Category::Prefetch.requires_elevation());
        assert!(!Category::SystemTemp.requires_elevation());
        assert!(!Category::AppCache("Discord".into()).requires_elevation());
    }
}
