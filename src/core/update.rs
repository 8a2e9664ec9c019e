use crate::config::AppSettings;
use crate::models::error::SError;
use regex::Regex;
use semver::Version;
use tracing::{debug, info};

/// Minimum time between two update checks.
pub const CHECK_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// The newest published release of the application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Release {
    /// Release tag, e.g. `v1.4.0`.
    pub version: String,
    pub url: String,
}

/// Where release information comes from (an HTTP API in the desktop shell).
pub trait ReleaseSource {
    fn latest_release(&self) -> Result<Release, SError>;
}

/// Pulls `x.y[.z]` out of a tag such as `v1.2.3` or `release-1.2`.
pub fn parse_version(tag: &str) -> Result<Version, SError> {
    let re = Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?")
        .map_err(|e| SError::ParseError(e.to_string()))?;
    let caps = re
        .captures(tag)
        .ok_or_else(|| SError::ParseError(format!("No version number in {tag:?}")))?;

    let part = |i: usize| -> Result<u64, SError> {
        caps.get(i)
            .map(|m| m.as_str().parse::<u64>())
            .transpose()
            .map(|v| v.unwrap_or(0))
            .map_err(|e| SError::ParseError(e.to_string()))
    };

    Ok(Version::new(part(1)?, part(2)?, part(3)?))
}

/// Returns the newer release when one exists. Checks at most once per
/// [`CHECK_INTERVAL_SECS`] and never when the user opted out; `now` is a Unix timestamp.
pub fn check_for_update(
    settings: &mut AppSettings,
    source: &dyn ReleaseSource,
    current_version: &str,
    now: u64,
) -> Result<Option<Release>, SError> {
    if settings.never_version_check {
        debug!("Update checks are disabled");
        return Ok(None);
    }
    if let Some(last) = settings.last_version_check {
        if now.saturating_sub(last) < CHECK_INTERVAL_SECS {
            debug!("Last update check was less than a day ago");
            return Ok(None);
        }
    }

    let release = source.latest_release()?;
    settings.last_version_check = Some(now);

    let remote = parse_version(&release.version)?;
    let local = parse_version(current_version)?;
    if remote > local {
        info!("Update available: {} (running {local})", release.version);
        Ok(Some(release))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeSource {
        tag: &'static str,
        calls: Cell<u32>,
    }

    impl ReleaseSource for FakeSource {
        fn latest_release(&self) -> Result<Release, SError> {
            self.calls.set(self.calls.get() + 1);
            Ok(Release {
                version: self.tag.into(),
                url: "https://example.invalid/release".into(),
            })
        }
    }

    fn source(tag: &'static str) -> FakeSource {
        FakeSource {
            tag,
            calls: Cell::new(0),
        }
    }

    #[test]
    fn test_parse_version_from_tags() {
        assert_eq!(parse_version("v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_version("release-2.10").unwrap(), Version::new(2, 10, 0));
        assert!(parse_version("latest").is_err());
    }

    #[test]
    fn test_newer_release_is_reported_and_timestamp_recorded() {
        let mut settings = AppSettings::default();
        let src = source("v1.10.0");

        let found = check_for_update(&mut settings, &src, "1.9.4", 1_000).unwrap();

        assert_eq!(found.map(|r| r.version), Some("v1.10.0".into()));
        assert_eq!(settings.last_version_check, Some(1_000));
    }

    #[test]
    fn test_same_version_is_not_an_update() {
        let mut settings = AppSettings::default();
        let found = check_for_update(&mut settings, &source("v1.2.0"), "v1.2.0", 1_000).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_check_is_throttled_to_once_a_day() {
        let mut settings = AppSettings {
            last_version_check: Some(10_000),
            ..AppSettings::default()
        };
        let src = source("v9.0.0");

        let found = check_for_update(&mut settings, &src, "1.0.0", 10_000 + 60).unwrap();

        assert!(found.is_none());
        assert_eq!(src.calls.get(), 0);
    }

    #[test]
    fn test_opt_out_skips_check() {
        let mut settings = AppSettings {
            never_version_check: true,
            ..AppSettings::default()
        };
        let src = source("v9.0.0");

        assert!(check_for_update(&mut settings, &src, "1.0.0", 1).unwrap().is_none());
        assert_eq!(src.calls.get(), 0);
    }
}
