use std::fmt;

use serde::Serialize;

/// Version and platform of the running binary
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    /// Source revision, when the build environment exported `RELAY_GIT_REVISION`
    pub revision: Option<&'static str>,
    pub build_profile: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        revision: option_env!("RELAY_GIT_REVISION"),
        build_profile: if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sample-relay {}", self.version)?;
        if let Some(revision) = self.revision {
            write!(f, " ({})", revision)?;
        }
        write!(
            f,
            "\n  profile:  {}\n  platform: {}-{}",
            self.build_profile, self.os, self.arch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_is_populated() {
        let info = build_info();
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(info.os, std::env::consts::OS);
        assert!(info.to_string().starts_with("sample-relay "));
    }

    #[test]
    fn test_profile_follows_debug_assertions() {
        let expected = if cfg!(debug_assertions) { "debug" } else { "release" };
        assert_eq!(build_info().build_profile, expected);
        assert!(build_info().to_string().contains(expected));
    }

    #[test]
    fn test_display_includes_revision_when_known() {
        let info = BuildInfo {
            revision: Some("abc1234"),
            ..build_info()
        };
        assert!(info.to_string().starts_with(&format!(
            "sample-relay {} (abc1234)",
            info.version
        )));
    }
}
