//! The version-marker file read by the packaging tool.
//!
//! The file holds exactly one line, `__version__ = "YYYY.MM.DD.MICRO"`, optionally with a
//! `.devN` suffix on the version marking a local, unreleased build stamped with a Unix
//! timestamp.

use crate::{
    error::{FormatError, MarkerError},
    version::CalVer,
};
use chrono::Utc;
use core::{
    fmt::{self, Display},
    str::FromStr,
};
use regex::Regex;
use std::{fs, path::Path, sync::OnceLock};
use tracing::debug;

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^__version__ = "([^"]*)"$"#).expect("marker pattern should compile")
    })
}

/// A version as written to the marker file: a release version, or a dev build of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildVersion {
    version: CalVer,
    dev: Option<u64>,
}

impl BuildVersion {
    /// A release build of `version`.
    pub fn release(version: CalVer) -> Self {
        Self { version, dev: None }
    }

    /// A dev build of `version`, stamped with the given Unix timestamp.
    pub fn dev(version: CalVer, timestamp: u64) -> Self {
        Self {
            version,
            dev: Some(timestamp),
        }
    }

    /// A dev build of `version`, stamped with the current Unix timestamp.
    pub fn dev_now(version: CalVer) -> Self {
        // the clock is after 1970 on any machine that builds releases
        let timestamp = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        Self::dev(version, timestamp)
    }

    /// The release version.
    pub fn version(&self) -> &CalVer {
        &self.version
    }

    /// The dev timestamp, if this is a dev build.
    pub fn dev_stamp(&self) -> Option<u64> {
        self.dev
    }

    /// Renders the marker file contents for this version.
    pub fn render_marker(&self) -> String {
        format!("__version__ = \"{self}\"\n")
    }
}

impl Display for BuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)?;
        if let Some(dev) = self.dev {
            write!(f, ".dev{dev}")?;
        }
        Ok(())
    }
}

impl FromStr for BuildVersion {
    type Err = FormatError;

    /// Parses `YYYY.MM.DD.MICRO` or `YYYY.MM.DD.MICRO.devN`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((release, dev)) = s.split_once(".dev") else {
            return Ok(Self::release(s.parse()?));
        };
        let version: CalVer = release.parse()?;
        let all_digits = !dev.is_empty() && dev.bytes().all(|b| b.is_ascii_digit());
        // `.dev0007` would be written back as `.dev7`
        let canonical = all_digits && (dev == "0" || !dev.starts_with('0'));
        let dev = canonical
            .then(|| dev.parse::<u64>().ok())
            .flatten()
            .ok_or_else(|| FormatError::PatternMismatch {
                version_string: s.to_owned(),
            })?;
        Ok(Self::dev(version, dev))
    }
}

/// Writes the marker file for `build` at `path`, replacing any previous contents.
pub fn write_marker(path: &Path, build: &BuildVersion) -> Result<(), MarkerError> {
    fs::write(path, build.render_marker()).map_err(|source| MarkerError::Io {
        path: path.to_owned(),
        source,
    })?;
    debug!(path = %path.display(), %build, "wrote version marker");
    Ok(())
}

/// Reads the marker file at `path`.
///
/// # Errors
///
/// - [MarkerError::Io] if the file cannot be read.
/// - [MarkerError::Malformed] if it is not exactly one `__version__ = "..."` line (surrounding
///   whitespace is tolerated).
/// - [MarkerError::InvalidVersion] if the quoted version is not a valid build version.
pub fn read_marker(path: &Path) -> Result<BuildVersion, MarkerError> {
    let contents = fs::read_to_string(path).map_err(|source| MarkerError::Io {
        path: path.to_owned(),
        source,
    })?;
    let malformed = || MarkerError::Malformed {
        path: path.to_owned(),
    };

    let caps = marker_pattern()
        .captures(contents.trim())
        .ok_or_else(malformed)?;
    caps[1]
        .parse()
        .map_err(|source| MarkerError::InvalidVersion {
            path: path.to_owned(),
            source,
        })
}
