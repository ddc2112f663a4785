//! Target platform descriptor and native library naming

/// Operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOs {
    Windows,
    MacOs,
    Linux,
    /// Any other OS (BSDs etc.)
    Other,
}

/// CPU architecture with a published runtime layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetArch {
    X64,
    Arm64,
}

/// Target platform descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Operating system
    pub os: TargetOs,

    /// Architecture, `None` when unsupported
    pub arch: Option<TargetArch>,
}

impl Platform {
    /// Create a platform descriptor
    pub fn new(os: TargetOs, arch: Option<TargetArch>) -> Self {
        Self { os, arch }
    }

    /// Platform of the running process
    pub fn current() -> Self {
        let os = if cfg!(target_os = "windows") {
            TargetOs::Windows
        } else if cfg!(target_os = "macos") {
            TargetOs::MacOs
        } else if cfg!(target_os = "linux") {
            TargetOs::Linux
        } else {
            TargetOs::Other
        };

        let arch = if cfg!(target_arch = "x86_64") {
            Some(TargetArch::X64)
        } else if cfg!(target_arch = "aarch64") {
            Some(TargetArch::Arm64)
        } else {
            None
        };

        Self { os, arch }
    }

    /// Platform-specific file name for a shared library base name
    ///
    /// Windows: `<name>.dll`, macOS: `lib<name>.dylib`, everything else: `lib<name>.so`.
    pub fn library_file_name(&self, base_name: &str) -> String {
        match self.os {
            TargetOs::Windows => format!("{}.dll", base_name),
            TargetOs::MacOs => format!("lib{}.dylib", base_name),
            TargetOs::Linux | TargetOs::Other => format!("lib{}.so", base_name),
        }
    }

    /// Runtime identifier used by the `runtimes/<rid>/native` layout
    ///
    /// Returns `None` for unsupported architectures or operating systems.
    pub fn runtime_identifier(&self) -> Option<String> {
        let arch = match self.arch? {
            TargetArch::X64 => "x64",
            TargetArch::Arm64 => "arm64",
        };

        let os = match self.os {
            TargetOs::Windows => "win",
            TargetOs::MacOs => "osx",
            TargetOs::Linux => "linux",
            TargetOs::Other => return None,
        };

        Some(format!("{}-{}", os, arch))
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_file_names() {
        let name = "jf_native_abi";
        assert_eq!(
            Platform::new(TargetOs::Windows, Some(TargetArch::X64)).library_file_name(name),
            "jf_native_abi.dll"
        );
        assert_eq!(
            Platform::new(TargetOs::MacOs, Some(TargetArch::Arm64)).library_file_name(name),
            "libjf_native_abi.dylib"
        );
        assert_eq!(
            Platform::new(TargetOs::Linux, Some(TargetArch::X64)).library_file_name(name),
            "libjf_native_abi.so"
        );
        assert_eq!(
            Platform::new(TargetOs::Other, None).library_file_name(name),
            "libjf_native_abi.so"
        );
    }

    #[test]
    fn test_runtime_identifiers() {
        let rid = |os, arch| Platform::new(os, arch).runtime_identifier();

        assert_eq!(rid(TargetOs::Windows, Some(TargetArch::X64)).as_deref(), Some("win-x64"));
        assert_eq!(rid(TargetOs::Windows, Some(TargetArch::Arm64)).as_deref(), Some("win-arm64"));
        assert_eq!(rid(TargetOs::MacOs, Some(TargetArch::Arm64)).as_deref(), Some("osx-arm64"));
        assert_eq!(rid(TargetOs::Linux, Some(TargetArch::X64)).as_deref(), Some("linux-x64"));
        assert_eq!(rid(TargetOs::Linux, Some(TargetArch::Arm64)).as_deref(), Some("linux-arm64"));
    }

    #[test]
    fn test_unsupported_platforms_have_no_rid() {
        assert!(Platform::new(TargetOs::Linux, None).runtime_identifier().is_none());
        assert!(Platform::new(TargetOs::Other, Some(TargetArch::X64))
            .runtime_identifier()
            .is_none());
    }
}
