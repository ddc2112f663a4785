//! Native library resolution
//!
//! Search order:
//! 1. `JELLYFIN_NATIVE_LIBRARY_PATH` (file, or directory holding the library)
//! 2. Application base directory
//! 3. `<base>/runtimes/<rid>/native/`
//! 4. Source tree fallbacks when running from a checkout
//! 5. Default OS library search

use std::path::{Path, PathBuf};

use crate::config::InteropConfig;
use crate::ffi::NativeLibrary;

mod platform;

pub use platform::{Platform, TargetArch, TargetOs};

/// Base name of the native library
pub const LIBRARY_BASE_NAME: &str = "jf_native_abi";

/// File marking the root of a source checkout
pub const REPOSITORY_MARKER: &str = "Jellyfin.sln";

/// Ordered candidate paths for the native library
pub fn candidate_paths(config: &InteropConfig) -> Vec<PathBuf> {
    let file_name = config.platform.library_file_name(LIBRARY_BASE_NAME);
    let rid = config.platform.runtime_identifier();
    let mut candidates = Vec::new();

    if let Some(ref explicit) = config.library_path {
        if explicit.is_dir() {
            candidates.push(explicit.join(&file_name));
        } else {
            candidates.push(explicit.clone());
        }
    }

    let base_dir = &config.base_dir;
    candidates.push(base_dir.join(&file_name));

    if let Some(ref rid) = rid {
        candidates.push(runtime_native_dir(base_dir, rid).join(&file_name));
    }

    // Developer fallback when running from the source tree
    if let Some(repo_root) = find_repository_root(base_dir) {
        candidates.push(
            repo_root
                .join("native")
                .join("jellyfin-native")
                .join("target")
                .join("release")
                .join(&file_name),
        );
        if let Some(ref rid) = rid {
            candidates.push(
                runtime_native_dir(&repo_root.join("src").join("Jellyfin.NativeInterop"), rid)
                    .join(&file_name),
            );
        }
    }

    candidates
}

/// Walk up from `start` to the first directory containing the repository marker
pub fn find_repository_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(REPOSITORY_MARKER).is_file())
        .map(Path::to_path_buf)
}

/// Load the first candidate that opens and resolves every entry point.
///
/// Returns `None` when nothing loads; that is not an error here.
pub fn load(config: &InteropConfig) -> Option<NativeLibrary> {
    for candidate in candidate_paths(config) {
        match NativeLibrary::open(&candidate) {
            Ok(library) => {
                log::info!("Loaded {} from {}", LIBRARY_BASE_NAME, candidate.display());
                return Some(library);
            }
            Err(e) => {
                log::debug!("Skipping {}: {}", candidate.display(), e);
            }
        }
    }

    // Let the OS loader search its default paths
    let file_name = config.platform.library_file_name(LIBRARY_BASE_NAME);
    match NativeLibrary::open(Path::new(&file_name)) {
        Ok(library) => {
            log::info!("Loaded {} from default search path", file_name);
            Some(library)
        }
        Err(e) => {
            log::debug!("Default search for {} failed: {}", file_name, e);
            None
        }
    }
}

fn runtime_native_dir(root: &Path, rid: &str) -> PathBuf {
    root.join("runtimes").join(rid).join("native")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn linux_x64() -> Platform {
        Platform::new(TargetOs::Linux, Some(TargetArch::X64))
    }

    #[test]
    fn test_candidates_without_override() {
        let base = tempfile::tempdir().unwrap();
        let config = InteropConfig::default()
            .with_base_dir(base.path())
            .with_platform(linux_x64());

        let candidates = candidate_paths(&config);

        assert_eq!(
            candidates,
            vec![
                base.path().join("libjf_native_abi.so"),
                base.path().join("runtimes/linux-x64/native/libjf_native_abi.so"),
            ]
        );
    }

    #[test]
    fn test_override_directory_gets_file_name() {
        let base = tempfile::tempdir().unwrap();
        let lib_dir = tempfile::tempdir().unwrap();
        let config = InteropConfig::default()
            .with_base_dir(base.path())
            .with_library_path(lib_dir.path())
            .with_platform(Platform::new(TargetOs::Windows, Some(TargetArch::Arm64)));

        let candidates = candidate_paths(&config);

        assert_eq!(candidates[0], lib_dir.path().join("jf_native_abi.dll"));
        assert_eq!(candidates[1], base.path().join("jf_native_abi.dll"));
        assert_eq!(
            candidates[2],
            base.path().join("runtimes/win-arm64/native/jf_native_abi.dll")
        );
    }

    #[test]
    fn test_override_file_is_used_verbatim() {
        let base = tempfile::tempdir().unwrap();
        let config = InteropConfig::default()
            .with_base_dir(base.path())
            .with_library_path("/opt/custom/libjf_native_abi.so.1")
            .with_platform(linux_x64());

        let candidates = candidate_paths(&config);

        assert_eq!(candidates[0], PathBuf::from("/opt/custom/libjf_native_abi.so.1"));
    }

    #[test]
    fn test_unsupported_arch_skips_rid_entries() {
        let base = tempfile::tempdir().unwrap();
        fs::write(base.path().join(REPOSITORY_MARKER), "").unwrap();
        let config = InteropConfig::default()
            .with_base_dir(base.path())
            .with_platform(Platform::new(TargetOs::MacOs, None));

        let candidates = candidate_paths(&config);

        assert_eq!(
            candidates,
            vec![
                base.path().join("libjf_native_abi.dylib"),
                base.path()
                    .join("native/jellyfin-native/target/release/libjf_native_abi.dylib"),
            ]
        );
    }

    #[test]
    fn test_repository_fallbacks() {
        let repo = tempfile::tempdir().unwrap();
        fs::write(repo.path().join(REPOSITORY_MARKER), "").unwrap();
        let base = repo.path().join("bin/Debug/net9.0");
        fs::create_dir_all(&base).unwrap();

        let config = InteropConfig::default()
            .with_base_dir(&base)
            .with_platform(linux_x64());

        let candidates = candidate_paths(&config);

        assert_eq!(candidates.len(), 4);
        assert_eq!(
            candidates[2],
            repo.path().join("native/jellyfin-native/target/release/libjf_native_abi.so")
        );
        assert_eq!(
            candidates[3],
            repo.path()
                .join("src/Jellyfin.NativeInterop/runtimes/linux-x64/native/libjf_native_abi.so")
        );
    }

    #[test]
    fn test_find_repository_root() {
        let repo = tempfile::tempdir().unwrap();
        let nested = repo.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        assert!(find_repository_root(&nested).is_none());

        fs::write(repo.path().join(REPOSITORY_MARKER), "").unwrap();
        assert_eq!(find_repository_root(&nested), Some(repo.path().to_path_buf()));
    }

    #[test]
    fn test_load_skips_unloadable_candidates() {
        let base = tempfile::tempdir().unwrap();
        // Not a shared object
        fs::write(base.path().join("libjf_native_abi.so"), b"not an elf").unwrap();
        let config = InteropConfig::default()
            .with_base_dir(base.path())
            .with_platform(linux_x64());

        // The default search may or may not find an installed copy; it must
        // never be the bogus file.
        if let Some(library) = load(&config) {
            assert_ne!(
                library.origin(),
                base.path().join("libjf_native_abi.so").display().to_string()
            );
        }
    }
}
