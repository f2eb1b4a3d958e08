//! Computing the next version from a snapshot of tag names.
//!
//! Both functions here are pure: the caller reads "today" and the tag names once and passes them
//! in, so the result depends only on the arguments.

use crate::version::{CalVer, Date};
use tracing::{debug, trace};

fn parsed_tags<I, T>(tag_names: I) -> impl Iterator<Item = CalVer>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    tag_names.into_iter().filter_map(|tag_name| {
        let tag_name = tag_name.as_ref();
        let parsed = CalVer::from_tag(tag_name);
        if parsed.is_none() {
            trace!(tag = tag_name, "skipping non-calver tag");
        }
        parsed
    })
}

/// Returns the next version to release on `today`, given the names of all existing tags.
///
/// The micro segment is one more than the greatest micro among tags issued on `today`, or `1` if
/// there are none. Tags from any other date are irrelevant, so the micro restarts at `1` each day.
/// Tag names that are not CalVer tags are skipped. Order and duplicates do not matter.
///
/// The micro saturates at [u64::MAX]: once a tag for today holds that micro, the returned version
/// is the same as that tag, and creating it will fail as a duplicate.
///
/// ```
/// use calver::{compute_next_version, Date};
///
/// let today = Date::explicit(2024, 1, 18).unwrap();
/// let tags = ["v2024.01.17.1", "v2024.01.18.1", "v2024.01.18.2", "release-candidate"];
/// let next = compute_next_version(&today, tags);
/// assert_eq!(next.to_string(), "2024.01.18.3");
/// ```
pub fn compute_next_version<I, T>(today: &Date, tag_names: I) -> CalVer
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let max_micro = parsed_tags(tag_names)
        .filter(|version| version.is_on(today))
        .map(|version| version.micro())
        .max();

    // at u64::MAX this repeats the existing tag rather than panicking
    let next_micro = max_micro.map_or(1, |micro| micro.saturating_add(1));
    let next = CalVer::new(today, next_micro);
    debug!(%today, ?max_micro, %next, "computed next version");
    next
}

/// Returns the greatest version among `tag_names`, skipping tags that are not CalVer tags.
pub fn latest_version<I, T>(tag_names: I) -> Option<CalVer>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    parsed_tags(tag_names).max()
}
