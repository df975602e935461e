//! Build information.
//!
//! The version defaults to the crate version. Release pipelines may set
//! `TUNNEL_PANEL_VERSION`, `TUNNEL_PANEL_GIT_COMMIT` and
//! `TUNNEL_PANEL_BUILD_TIME` at compile time.

use serde::Serialize;

pub const PRODUCT: &str = "tunnel-panel";

pub const VERSION: &str = match option_env!("TUNNEL_PANEL_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

pub const GIT_COMMIT: &str = match option_env!("TUNNEL_PANEL_GIT_COMMIT") {
    Some(v) => v,
    None => "unknown",
};

pub const BUILD_TIME: &str = match option_env!("TUNNEL_PANEL_BUILD_TIME") {
    Some(v) => v,
    None => "unknown",
};

/// Build information as served by `GET /api/version`.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub build_time: &'static str,
    pub full: String,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: version(),
            commit: GIT_COMMIT,
            build_time: BUILD_TIME,
            full: full_version(),
        }
    }
}

pub fn version() -> &'static str {
    VERSION
}

/// Version with build details for development builds.
pub fn full_version() -> String {
    format_full(VERSION, GIT_COMMIT, BUILD_TIME)
}

/// Bare version number, as shown next to the daemon's own version.
pub fn short_version() -> &'static str {
    VERSION
}

fn format_full(version: &str, commit: &str, build_time: &str) -> String {
    if version == "dev" {
        format!("{}/{} (commit: {}, built: {})", PRODUCT, version, commit, build_time)
    } else {
        format!("{}/{}", PRODUCT, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_build_includes_details() {
        assert_eq!(
            format_full("dev", "abc123", "2024-01-01"),
            "tunnel-panel/dev (commit: abc123, built: 2024-01-01)"
        );
    }

    #[test]
    fn test_release_build_is_terse() {
        assert_eq!(format_full("1.2.3", "abc123", "2024-01-01"), "tunnel-panel/1.2.3");
    }

    #[test]
    fn test_current_matches_constants() {
        let info = BuildInfo::current();
        assert_eq!(info.version, short_version());
        assert!(info.full.starts_with("tunnel-panel/"));
    }
}
