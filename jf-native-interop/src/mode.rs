//! Native interop policy mode

/// Policy selecting whether native acceleration is mandatory, attempted, or never used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Native library must be operational; failures are fatal
    Required,
    /// Native library is tried first, managed code takes over on failure
    Prefer,
    /// Native library is never consulted
    Disabled,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Required
    }
}

impl Mode {
    /// Resolve a configuration value.
    ///
    /// Trimmed and compared case-insensitively. Unknown, blank, or absent
    /// values resolve to `Required`.
    pub fn resolve(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::default();
        };

        match value.to_ascii_lowercase().as_str() {
            "required" => Self::Required,
            "prefer" => Self::Prefer,
            "disabled" => Self::Disabled,
            other => {
                log::warn!("Unrecognized native mode {:?}, using required", other);
                Self::Required
            }
        }
    }

    /// Configuration spelling of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Required => "required",
            Mode::Prefer => "prefer",
            Mode::Disabled => "disabled",
        }
    }

    /// Whether a native failure may degrade to the managed path
    pub fn allows_fallback(&self) -> bool {
        !matches!(self, Mode::Required)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
