//! # calver
//!
//! Calendar versioning in the `YYYY.MM.DD.MICRO` scheme: the `MICRO`th release issued on a given
//! UTC day.
//!
//! The next version is derived from the names of the tags already in the repository and from
//! "today". The micro segment counts up within a day and restarts at `1` whenever the date
//! changes. Tags that are not CalVer tags are ignored, so the repository can share its tags with
//! other tooling.
//!
//! ## Examples
//!
//! Compute the next version from a tag snapshot:
//!
//! ```
//! use calver::prelude::*;
//!
//! let today = Date::explicit(2024, 1, 18).unwrap();
//! let tags = ["v2024.01.17.1", "v2024.01.18.1", "v2024.01.18.2", "release-candidate"];
//!
//! let next = compute_next_version(&today, tags);
//! assert_eq!(next.to_string(), "2024.01.18.3");
//! assert_eq!(next.tag_name(), "v2024.01.18.3");
//! ```
//!
//! Validate and compare version strings:
//!
//! ```
//! use calver::prelude::*;
//! use std::cmp::Ordering;
//!
//! assert!(validate_format("2024.01.18.1").is_ok());
//! assert!(validate_format("v2024.01.18.1").is_err()); // `v` is for tags only
//! assert!(check_ecosystem_compliance("2024.01.18.1").is_ok());
//! assert!(check_ecosystem_compliance("2024.01.18.01").is_err()); // sorts like `.1`
//!
//! let ordering = compare_versions("2024.01.18.9", "2024.01.19.1").unwrap();
//! assert_eq!(ordering, Ordering::Less);
//! ```
//!
//! ## Tags and the marker file
//!
//! [`GitTags`] lists the tags of a git repository through the [`TagSource`] trait. Creating and
//! pushing the `v<version>` tag is left to the release pipeline, which should rely on tag
//! creation failing for duplicates when two releases race.
//!
//! The packaging tool reads the version from a one-line marker file,
//! `__version__ = "YYYY.MM.DD.MICRO"`, written with [`write_marker`]. Local builds may carry a
//! `.devN` suffix holding a Unix timestamp (see [`BuildVersion`]).
#![warn(missing_docs)]

mod calculator;
mod config;
mod error;
mod marker;
mod tags;
mod version;

pub use crate::calculator::{compute_next_version, latest_version};
pub use crate::config::{Settings, DEFAULT_MARKER_PATH, VERSION_ENV_VAR};
pub use crate::error::{ComplianceError, DateError, FormatError, MarkerError, TagSourceError};
pub use crate::marker::{read_marker, write_marker, BuildVersion};
pub use crate::tags::{GitTags, TagSource};
pub use crate::version::{
    check_ecosystem_compliance, compare_versions, validate_format, CalVer, Date,
};

/// A convenience module appropriate for glob imports (`use calver::prelude::*;`).
pub mod prelude {
    #[doc(no_inline)]
    pub use crate::check_ecosystem_compliance;
    #[doc(no_inline)]
    pub use crate::compare_versions;
    #[doc(no_inline)]
    pub use crate::compute_next_version;
    #[doc(no_inline)]
    pub use crate::latest_version;
    #[doc(no_inline)]
    pub use crate::validate_format;
    #[doc(no_inline)]
    pub use crate::BuildVersion;
    #[doc(no_inline)]
    pub use crate::CalVer;
    #[doc(no_inline)]
    pub use crate::ComplianceError;
    #[doc(no_inline)]
    pub use crate::Date;
    #[doc(no_inline)]
    pub use crate::FormatError;
    #[doc(no_inline)]
    pub use crate::GitTags;
    #[doc(no_inline)]
    pub use crate::TagSource;
}
