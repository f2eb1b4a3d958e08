use std::{io, path::PathBuf};

/// Errors for version strings that do not lexically match the CalVer grammar.
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum FormatError {
    /// The string does not have the shape `YYYY.MM.DD.MICRO`.
    #[error("Version `{version_string}` should have the format `YYYY.MM.DD.MICRO`")]
    PatternMismatch {
        /// The offending version string.
        version_string: String,
    },

    /// The month segment is not in `1..=12`.
    #[error("Month `{month}` of version `{version_string}` should be between 01 and 12")]
    MonthOutOfRange {
        /// The offending version string.
        version_string: String,
        /// The parsed month value.
        month: u32,
    },

    /// The day segment is not in `1..=31`.
    #[error("Day `{day}` of version `{version_string}` should be between 01 and 31")]
    DayOutOfRange {
        /// The offending version string.
        version_string: String,
        /// The parsed day value.
        day: u32,
    },

    /// The micro segment is zero or too large to represent.
    #[error("Micro segment of version `{version_string}` should be a positive integer")]
    InvalidMicro {
        /// The offending version string.
        version_string: String,
    },
}

/// Errors for CalVer-shaped strings that would not order correctly under PEP 440.
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum ComplianceError {
    /// The string could not be parsed as a PEP 440 version at all.
    #[error("Version `{version_string}` is not a PEP 440 version: {reason}")]
    Unparseable {
        /// The offending version string.
        version_string: String,
        /// Why the PEP 440 parser rejected it.
        reason: String,
    },

    /// The string carries an epoch, pre-release, post-release or local segment.
    #[error("Version `{version_string}` should not have a {segment} segment")]
    UnexpectedSegment {
        /// The offending version string.
        version_string: String,
        /// Name of the segment that was found.
        segment: &'static str,
    },

    /// The release part does not have exactly four numeric segments.
    #[error("Version `{version_string}` should have 4 release segments, found {count}")]
    ReleaseSegmentCount {
        /// The offending version string.
        version_string: String,
        /// Number of release segments found.
        count: usize,
    },

    /// The string is written differently from how PEP 440 normalizes it, e.g. a micro with
    /// leading zeros or a `dev` suffix without its `.` delimiter.
    #[error("Version `{version_string}` should be written as `{canonical}` to sort correctly")]
    NonCanonical {
        /// The offending version string.
        version_string: String,
        /// The spelling PEP 440 would compare it as.
        canonical: String,
    },
}

/// Errors for dates supplied to the calculator.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DateError {
    /// The date string could not be parsed as `YYYY-MM-DD`.
    #[error("Date `{date_string}` should be in `YYYY-MM-DD` format: {source}")]
    UnparseableDate {
        /// The offending date string.
        date_string: String,
        /// The underlying chrono error.
        source: chrono::ParseError,
    },

    /// The date parsed, but is not written as zero-padded `YYYY-MM-DD`.
    #[error("Date `{date_string}` should be zero-padded as `YYYY-MM-DD`")]
    NotZeroPadded {
        /// The offending date string.
        date_string: String,
    },

    /// The year, month and day do not form a valid date.
    #[error("Explicit year ({year}), month ({month}), and day ({day}) arguments cannot be made into a valid date")]
    InvalidDateArguments {
        /// The year argument.
        year: i32,
        /// The month argument.
        month: u32,
        /// The day argument.
        day: u32,
    },

    /// The year cannot be rendered as four digits.
    #[error("Year `{year}` should be between 0 and 9999")]
    YearOutOfRange {
        /// The offending year.
        year: i32,
    },
}

/// Errors reading tag names from a tag store.
#[derive(thiserror::Error, Debug)]
pub enum TagSourceError {
    /// The `git` executable could not be started.
    #[error("Could not run `git` in `{}`: {source}", .repo.display())]
    Spawn {
        /// The repository directory.
        repo: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// `git tag` ran but reported failure.
    #[error("`git tag` failed in `{}`: {stderr}", .repo.display())]
    Failed {
        /// The repository directory.
        repo: PathBuf,
        /// Whatever git wrote to stderr.
        stderr: String,
    },
}

/// Errors reading or writing the version-marker file.
#[derive(thiserror::Error, Debug)]
pub enum MarkerError {
    /// The file could not be read or written.
    #[error("Could not access version marker `{}`: {source}", .path.display())]
    Io {
        /// The marker file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The file exists but is not a single `__version__ = "..."` line.
    #[error("Version marker `{}` should contain exactly one `__version__ = \"...\"` line", .path.display())]
    Malformed {
        /// The marker file path.
        path: PathBuf,
    },

    /// The version inside the marker file is not a valid CalVer build version.
    #[error("Version marker `{}` holds an invalid version: {source}", .path.display())]
    InvalidVersion {
        /// The marker file path.
        path: PathBuf,
        /// Why the version was rejected.
        source: FormatError,
    },
}
