use crate::error::{ComplianceError, DateError, FormatError};
use chrono::{Datelike, NaiveDate, Utc};
use core::{
    cmp::Ordering,
    fmt::{self, Display},
    ops::Deref,
    str::FromStr,
};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Pattern for tag names. The `v` prefix is a tag-naming convention, so it is optional here.
fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^v?([0-9]{4})\.([0-9]{2})\.([0-9]{2})\.([0-9]+)$")
            .expect("tag pattern should compile")
    })
}

/// Pattern for canonical version strings. No prefix, no surrounding whitespace.
fn canonical_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]{4})\.([0-9]{2})\.([0-9]{2})\.([0-9]+)$")
            .expect("canonical pattern should compile")
    })
}

/// A calendar date in UTC, used as "today" when computing the next version.
///
/// Years are limited to `0..=9999` so that they always render as the four-digit `YYYY` segment.
///
/// ```
/// use calver::Date;
///
/// let explicit = Date::explicit(2024, 1, 18).unwrap();
/// let parsed: Date = "2024-01-18".parse().unwrap();
/// assert_eq!(explicit, parsed);
///
/// let today = Date::utc_now();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl Date {
    /// Returns a new [Date] representing the current date in UTC at the time of this call.
    pub fn utc_now() -> Self {
        Self(Utc::now().date_naive())
    }

    /// Returns result of a new [Date] representing the given date, or
    /// [DateError::InvalidDateArguments].
    pub fn explicit(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(DateError::InvalidDateArguments { year, month, day })
            .and_then(Self::try_from)
    }
}

impl TryFrom<NaiveDate> for Date {
    type Error = DateError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        let year = date.year();
        if (0..=9999).contains(&year) {
            Ok(Self(date))
        } else {
            Err(DateError::YearOutOfRange { year })
        }
    }
}

impl FromStr for Date {
    type Err = DateError;

    /// Parses a date string into a [Date]. The string must be in the format `YYYY-MM-DD`, with
    /// every field zero-padded and no sign on the year.
    ///
    /// See [NaiveDate::parse_from_str].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|source| {
            DateError::UnparseableDate {
                date_string: s.to_owned(),
                source,
            }
        })?;
        let date = Self::try_from(date)?;
        // chrono also accepts `2024-1-8` and `+2024-01-18`
        if date.to_string() != s {
            return Err(DateError::NotZeroPadded {
                date_string: s.to_owned(),
            });
        }
        Ok(date)
    }
}

impl Deref for Date {
    type Target = NaiveDate;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// A `YYYY.MM.DD.MICRO` version: the `MICRO`th release issued on a given UTC day.
///
/// Versions order by `(year, month, day, micro)` as integers, so the date always dominates the
/// micro segment.
///
/// ```
/// use calver::CalVer;
///
/// let version: CalVer = "2024.01.18.3".parse().unwrap();
/// assert_eq!(version.micro(), 3);
/// assert_eq!(version.to_string(), "2024.01.18.3");
/// assert_eq!(version.tag_name(), "v2024.01.18.3");
///
/// let earlier: CalVer = "2024.01.17.12".parse().unwrap();
/// assert!(earlier < version);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalVer {
    // field order matters: the derived Ord is lexicographic over it
    year: u32,
    month: u32,
    day: u32,
    micro: u64,
}

impl CalVer {
    /// Returns the version for the `micro`th release on `date`. A `micro` of zero is bumped to
    /// one, since micro values start at one.
    pub fn new(date: &Date, micro: u64) -> Self {
        Self {
            // the Date invariant keeps the year in 0..=9999
            year: date.year() as u32,
            month: date.month(),
            day: date.day(),
            micro: micro.max(1),
        }
    }

    /// Parses a tag name, with or without a leading `v`. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns a [FormatError] if the tag is not a CalVer tag.
    pub fn parse_tag(tag_name: &str) -> Result<Self, FormatError> {
        let trimmed = tag_name.trim();
        tag_pattern()
            .captures(trimmed)
            .ok_or_else(|| FormatError::PatternMismatch {
                version_string: tag_name.to_owned(),
            })
            .and_then(|caps| Self::from_captures(&caps, tag_name))
    }

    /// Like [Self::parse_tag], but returns `None` for anything that is not a CalVer tag. Tag stores
    /// are shared with other tooling, so non-CalVer tags are expected.
    pub fn from_tag(tag_name: &str) -> Option<Self> {
        Self::parse_tag(tag_name).ok()
    }

    fn from_captures(caps: &Captures<'_>, version_string: &str) -> Result<Self, FormatError> {
        let mismatch = || FormatError::PatternMismatch {
            version_string: version_string.to_owned(),
        };
        // the patterns only capture ascii digits, so the narrow segments cannot overflow
        let year: u32 = caps[1].parse().map_err(|_| mismatch())?;
        let month: u32 = caps[2].parse().map_err(|_| mismatch())?;
        let day: u32 = caps[3].parse().map_err(|_| mismatch())?;
        let micro: u64 = caps[4].parse().map_err(|_| FormatError::InvalidMicro {
            version_string: version_string.to_owned(),
        })?;

        if !(1..=12).contains(&month) {
            return Err(FormatError::MonthOutOfRange {
                version_string: version_string.to_owned(),
                month,
            });
        }
        // lexical range only: 2024.02.31.1 is accepted
        if !(1..=31).contains(&day) {
            return Err(FormatError::DayOutOfRange {
                version_string: version_string.to_owned(),
                day,
            });
        }
        if micro == 0 {
            return Err(FormatError::InvalidMicro {
                version_string: version_string.to_owned(),
            });
        }

        Ok(Self {
            year,
            month,
            day,
            micro,
        })
    }

    /// The year segment.
    pub fn year(&self) -> u32 {
        self.year
    }

    /// The month segment, `1..=12`.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The day segment, `1..=31`.
    pub fn day(&self) -> u32 {
        self.day
    }

    /// The micro segment, at least `1`.
    pub fn micro(&self) -> u64 {
        self.micro
    }

    /// Returns true if this version was issued on `date`.
    pub fn is_on(&self, date: &Date) -> bool {
        i64::from(self.year) == i64::from(date.year())
            && self.month == date.month()
            && self.day == date.day()
    }

    /// The `YYYY-MM-DD` date this version was issued on, as written in the version.
    pub fn date_string(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// The name of the tag to create for this version: the canonical string prefixed with `v`.
    pub fn tag_name(&self) -> String {
        format!("v{self}")
    }
}

impl FromStr for CalVer {
    type Err = FormatError;

    /// Parses a canonical `YYYY.MM.DD.MICRO` string. Unlike [CalVer::parse_tag], no `v` prefix or
    /// surrounding whitespace is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        canonical_pattern()
            .captures(s)
            .ok_or_else(|| FormatError::PatternMismatch {
                version_string: s.to_owned(),
            })
            .and_then(|caps| Self::from_captures(&caps, s))
    }
}

impl Display for CalVer {
    /// Renders the canonical `YYYY.MM.DD.MICRO` form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}.{:02}.{:02}.{}",
            self.year, self.month, self.day, self.micro
        )
    }
}

/// Validates that `version_string` is a canonical CalVer version and returns it parsed.
///
/// The day is checked against `1..=31` only, not against the length of the month.
///
/// # Errors
///
/// Returns a [FormatError] if the string does not match `YYYY.MM.DD.MICRO`, has a `v` prefix,
/// or has an out-of-range segment.
pub fn validate_format(version_string: &str) -> Result<CalVer, FormatError> {
    version_string.parse()
}

/// Checks that `version_string` sorts correctly as a PEP 440 version.
///
/// A compliant string is a plain four-segment release, optionally followed by a `.devN` segment,
/// written exactly as PEP 440 would compare it. Anything PEP 440 would normalize (a leading-zero
/// micro, a `dev` suffix without its `.` delimiter, a `v` prefix) is rejected, because two such
/// spellings could compare equal while looking different.
///
/// # Errors
///
/// Returns a [ComplianceError] describing the first problem found.
pub fn check_ecosystem_compliance(version_string: &str) -> Result<(), ComplianceError> {
    let version = pep440_rs::Version::from_str(version_string).map_err(|err| {
        ComplianceError::Unparseable {
            version_string: version_string.to_owned(),
            reason: err.to_string(),
        }
    })?;

    let unexpected = |segment| ComplianceError::UnexpectedSegment {
        version_string: version_string.to_owned(),
        segment,
    };
    if version.epoch() != 0 {
        return Err(unexpected("epoch"));
    }
    if version.is_pre() {
        return Err(unexpected("pre-release"));
    }
    if version.is_post() {
        return Err(unexpected("post-release"));
    }
    if version.is_local() {
        return Err(unexpected("local"));
    }

    let release = version.release();
    let [year, month, day, micro] = release else {
        return Err(ComplianceError::ReleaseSegmentCount {
            version_string: version_string.to_owned(),
            count: release.len(),
        });
    };

    let mut canonical = format!("{year:04}.{month:02}.{day:02}.{micro}");
    if let Some(dev) = version.dev() {
        canonical.push_str(&format!(".dev{dev}"));
    }
    if canonical != version_string {
        return Err(ComplianceError::NonCanonical {
            version_string: version_string.to_owned(),
            canonical,
        });
    }

    Ok(())
}

/// Compares two version strings by `(year, month, day, micro)`. Tag forms with a `v` prefix are
/// accepted.
///
/// ```
/// use calver::compare_versions;
/// use std::cmp::Ordering;
///
/// let ordering = compare_versions("2024.01.18.9", "v2024.01.19.1").unwrap();
/// assert_eq!(ordering, Ordering::Less);
/// ```
///
/// # Errors
///
/// Returns a [FormatError] for the first input that does not parse.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, FormatError> {
    let a = CalVer::parse_tag(a)?;
    let b = CalVer::parse_tag(b)?;
    Ok(a.cmp(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("v2024.01.18.1", (2024, 1, 18, 1))]
    #[case("2024.01.18.1", (2024, 1, 18, 1))]
    #[case("  v2024.12.31.999\n", (2024, 12, 31, 999))]
    fn test_parse_tag_ok(#[case] tag: &str, #[case] expected: (u32, u32, u32, u64)) {
        let version = CalVer::parse_tag(tag).unwrap();
        assert_eq!(
            (version.year(), version.month(), version.day(), version.micro()),
            expected
        );
    }

    #[rstest]
    #[case("2024.1.18.1")] // month must be two digits
    #[case("v1.2.3")]
    #[case("2024.01.18")] // missing micro
    #[case("v2024.01.18")]
    #[case("invalid")]
    #[case("V2024.01.18.1")] // only lowercase prefix
    #[case("2024.13.18.1")] // month > 12
    #[case("2024.00.18.1")] // month < 1
    #[case("2024.01.32.1")] // day > 31
    #[case("2024.01.00.1")] // day < 1
    #[case("2024.01.18.0")] // micro < 1
    #[case("2024.01.18.99999999999999999999999")] // micro overflows
    #[case("٢٠٢٤.01.18.1")] // non-ascii digits
    fn test_parse_tag_rejects(#[case] tag: &str) {
        assert!(CalVer::from_tag(tag).is_none());
    }

    #[rstest]
    #[case("2024.01.18.1")]
    #[case("2024.12.31.999")]
    #[case("2024.02.31.1")] // lexical day range only
    fn test_validate_format_ok(#[case] version: &str) {
        assert!(validate_format(version).is_ok());
    }

    #[test]
    fn test_validate_format_errors() {
        assert!(matches!(
            validate_format("2024.1.18.1"),
            Err(FormatError::PatternMismatch { .. })
        ));
        assert!(matches!(
            validate_format("v2024.01.18.1"),
            Err(FormatError::PatternMismatch { .. })
        ));
        assert!(matches!(
            validate_format(" 2024.01.18.1"),
            Err(FormatError::PatternMismatch { .. })
        ));
        assert_eq!(
            validate_format("2024.13.18.1"),
            Err(FormatError::MonthOutOfRange {
                version_string: "2024.13.18.1".to_owned(),
                month: 13
            })
        );
        assert_eq!(
            validate_format("2024.01.32.1"),
            Err(FormatError::DayOutOfRange {
                version_string: "2024.01.32.1".to_owned(),
                day: 32
            })
        );
        assert!(matches!(
            validate_format("2024.01.18.0"),
            Err(FormatError::InvalidMicro { .. })
        ));
    }

    #[test]
    fn test_format_error_echoes_input() {
        let err = validate_format("2024.1.18.1").unwrap_err();
        assert!(err.to_string().contains("2024.1.18.1"));
    }

    #[rstest]
    #[case("2024.01.18.1")]
    #[case("2024.12.31.42")]
    #[case("2024.01.18.3.dev1705600000")]
    fn test_compliance_ok(#[case] version: &str) {
        assert_eq!(check_ecosystem_compliance(version), Ok(()));
    }

    #[test]
    fn test_compliance_errors() {
        assert!(matches!(
            check_ecosystem_compliance("2024.01.18.01"),
            Err(ComplianceError::NonCanonical { canonical, .. }) if canonical == "2024.01.18.1"
        ));
        assert!(matches!(
            check_ecosystem_compliance("2024.01.18.1dev5"),
            Err(ComplianceError::NonCanonical { canonical, .. }) if canonical == "2024.01.18.1.dev5"
        ));
        assert!(matches!(
            check_ecosystem_compliance("2024.01.18.1rc1"),
            Err(ComplianceError::UnexpectedSegment { segment: "pre-release", .. })
        ));
        assert!(matches!(
            check_ecosystem_compliance("2024.01.18.1.post2"),
            Err(ComplianceError::UnexpectedSegment { segment: "post-release", .. })
        ));
        assert!(matches!(
            check_ecosystem_compliance("2024.01.18.1+local"),
            Err(ComplianceError::UnexpectedSegment { segment: "local", .. })
        ));
        assert!(matches!(
            check_ecosystem_compliance("1!2024.01.18.1"),
            Err(ComplianceError::UnexpectedSegment { segment: "epoch", .. })
        ));
        assert!(matches!(
            check_ecosystem_compliance("2024.01.18"),
            Err(ComplianceError::ReleaseSegmentCount { count: 3, .. })
        ));
        assert!(matches!(
            check_ecosystem_compliance("2024.01.18.1-foo"),
            Err(ComplianceError::Unparseable { .. })
        ));
        assert!(matches!(
            check_ecosystem_compliance("2024..18.1"),
            Err(ComplianceError::Unparseable { .. })
        ));
    }

    #[rstest]
    #[case("2024.01.18.9", "2024.01.19.1", Ordering::Less)] // date dominates micro
    #[case("2024.01.18.10", "2024.01.18.9", Ordering::Greater)] // numeric, not lexical
    #[case("v2024.01.18.1", "2024.01.18.1", Ordering::Equal)]
    #[case("2023.12.31.5", "2024.01.01.1", Ordering::Less)]
    fn test_compare_versions(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare_versions(a, b), Ok(expected));
    }

    #[test]
    fn test_compare_versions_invalid() {
        let err = compare_versions("2024.01.18.1", "invalid").unwrap_err();
        assert_eq!(
            err,
            FormatError::PatternMismatch {
                version_string: "invalid".to_owned()
            }
        );
    }

    #[test]
    fn test_render_round_trip() {
        let date = Date::explicit(2024, 1, 8).unwrap();
        let version = CalVer::new(&date, 12);
        let rendered = version.to_string();
        assert_eq!(rendered, "2024.01.08.12");
        assert_eq!(rendered.parse::<CalVer>().unwrap().to_string(), rendered);
    }

    #[test]
    fn test_new_bumps_zero_micro() {
        let date = Date::explicit(2024, 1, 8).unwrap();
        assert_eq!(CalVer::new(&date, 0).micro(), 1);
    }

    #[test]
    fn test_is_on() {
        let version: CalVer = "2024.01.18.2".parse().unwrap();
        assert!(version.is_on(&Date::explicit(2024, 1, 18).unwrap()));
        assert!(!version.is_on(&Date::explicit(2024, 1, 19).unwrap()));
    }

    #[rstest]
    #[case("2021-02-03", true)]
    #[case("2021-02-30", false)] // February 30th doesn't exist
    #[case("not-a-date", false)]
    fn test_date_from_str(#[case] date_str: &str, #[case] passes: bool) {
        let date = Date::from_str(date_str);
        if passes {
            assert!(date.is_ok());
        } else {
            assert!(matches!(date, Err(DateError::UnparseableDate { .. })));
        }
    }

    #[rstest]
    #[case("2024-1-8")]
    #[case("2024-01-8")]
    #[case("+2024-01-18")]
    #[case("0024-1-18")]
    fn test_date_from_str_requires_padding(#[case] date_str: &str) {
        assert_eq!(
            Date::from_str(date_str),
            Err(DateError::NotZeroPadded {
                date_string: date_str.to_owned()
            })
        );
    }

    #[test]
    fn test_date_from_str_early_year() {
        let date = Date::from_str("0024-01-18").unwrap();
        assert_eq!(date.year(), 24);
        assert_eq!(date.to_string(), "0024-01-18");
    }

    #[test]
    fn test_date_explicit() {
        assert!(Date::explicit(2021, 2, 3).is_ok());
        assert!(matches!(
            Date::explicit(2021, 2, 30),
            Err(DateError::InvalidDateArguments { .. })
        ));
        assert_eq!(
            Date::explicit(10000, 1, 1),
            Err(DateError::YearOutOfRange { year: 10000 })
        );
        assert_eq!(
            Date::explicit(-1, 1, 1),
            Err(DateError::YearOutOfRange { year: -1 })
        );
    }

    #[test]
    fn test_date_display() {
        let date = Date::explicit(2024, 1, 8).unwrap();
        assert_eq!(date.to_string(), "2024-01-08");
    }
}
