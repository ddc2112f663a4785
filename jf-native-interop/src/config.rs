//! Interop configuration

use std::path::{Path, PathBuf};

use crate::locator::Platform;
use crate::mode::Mode;

/// Environment variable selecting the mode
pub const MODE_ENV: &str = "JELLYFIN_NATIVE_MODE";

/// Environment variable overriding the library location (file or directory)
pub const LIBRARY_PATH_ENV: &str = "JELLYFIN_NATIVE_LIBRARY_PATH";

/// Interop configuration
#[derive(Debug, Clone)]
pub struct InteropConfig {
    /// Policy mode, resolved once
    pub mode: Mode,

    /// Explicit library path or directory
    pub library_path: Option<PathBuf>,

    /// Application base directory
    pub base_dir: PathBuf,

    /// Target platform used for file naming
    pub platform: Platform,
}

impl Default for InteropConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            library_path: None,
            base_dir: application_base_dir(),
            platform: Platform::current(),
        }
    }
}

impl InteropConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through a variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = Mode::resolve(lookup(MODE_ENV).as_deref());
        let library_path = lookup(LIBRARY_PATH_ENV)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Self {
            mode,
            library_path,
            ..Self::default()
        }
    }

    /// Set the mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the library override
    pub fn with_library_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.library_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the application base directory
    pub fn with_base_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.base_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the target platform
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}

/// Directory holding the running executable, or the working directory
fn application_base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = InteropConfig::default();
        assert_eq!(config.mode, Mode::Required);
        assert!(config.library_path.is_none());
    }

    #[test]
    fn test_from_lookup() {
        let config = InteropConfig::from_lookup(lookup_from(&[
            (MODE_ENV, " Prefer "),
            (LIBRARY_PATH_ENV, "/opt/jellyfin/native"),
        ]));
        assert_eq!(config.mode, Mode::Prefer);
        assert_eq!(config.library_path, Some(PathBuf::from("/opt/jellyfin/native")));
    }

    #[test]
    fn test_blank_override_is_unset() {
        let config = InteropConfig::from_lookup(lookup_from(&[(LIBRARY_PATH_ENV, "  ")]));
        assert_eq!(config.mode, Mode::Required);
        assert!(config.library_path.is_none());
    }

    #[test]
    fn test_builder_setters() {
        let config = InteropConfig::default()
            .with_mode(Mode::Disabled)
            .with_base_dir("/srv/app")
            .with_library_path("/srv/lib/libjf_native_abi.so");
        assert_eq!(config.mode, Mode::Disabled);
        assert_eq!(config.base_dir, PathBuf::from("/srv/app"));
        assert!(config.library_path.is_some());
    }
}
