use crate::{tags::GitTags, version::Date};
use std::path::PathBuf;

/// Default location of the version-marker file, relative to the working directory.
pub const DEFAULT_MARKER_PATH: &str = "src/_version.py";

/// Environment variable holding a version, consulted by `check` as a last resort.
pub const VERSION_ENV_VAR: &str = "CALVER_VERSION";

/// Where to read tags from, where to write the marker file, and what "today" is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Repository to list tags from.
    pub repo: PathBuf,
    /// Whether to run `git fetch --tags` before listing tags.
    pub fetch: bool,
    /// Path of the version-marker file. Relative paths are resolved against the working
    /// directory, not the repository.
    pub marker_path: PathBuf,
    /// Overrides "today". When unset, the current UTC date is read once via [Settings::today].
    pub date: Option<Date>,
}

impl Settings {
    /// The date to compute versions for.
    pub fn today(&self) -> Date {
        self.date.unwrap_or_else(Date::utc_now)
    }

    /// The git tag source these settings describe.
    pub fn tag_source(&self) -> GitTags {
        GitTags::new(&self.repo, self.fetch)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repo: PathBuf::from("."),
            fetch: true,
            marker_path: PathBuf::from(DEFAULT_MARKER_PATH),
            date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let settings = Settings::default();
        assert_eq!(settings.repo, PathBuf::from("."));
        assert!(settings.fetch);
        assert_eq!(settings.marker_path, PathBuf::from("src/_version.py"));
        assert_eq!(settings.date, None);
    }

    #[test]
    fn test_date_override() {
        let date = Date::explicit(2024, 1, 18).unwrap();
        let settings = Settings {
            date: Some(date),
            ..Settings::default()
        };
        assert_eq!(settings.today(), date);
    }

    #[test]
    fn test_tag_source_uses_repo() {
        let settings = Settings {
            repo: PathBuf::from("/srv/project"),
            ..Settings::default()
        };
        assert_eq!(settings.tag_source().repo(), PathBuf::from("/srv/project"));
    }
}
