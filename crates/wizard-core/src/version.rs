//! Chart version ordering used by feature gates
//!
//! Chart versions look like `MAJOR.MINOR.PATCH[-PRERELEASE[.NUM]]`. They are
//! parsed into a five-field key so that pre-releases order as
//! `alpha < beta < rc < release` for the same `MAJOR.MINOR.PATCH`.
//!
//! This is deliberately not full semver: only three numeric segments are read
//! (a fourth is ignored), and a pre-release tag outside `alpha`/`beta`/`rc`,
//! or a suffix that does not start with a tag at all, falls back to rank 0.
//! Rank 0 sorts below every recognised pre-release and below the release
//! itself. Several feature gates depend on that fallback, so keep it.

use std::cmp::Ordering;
use std::fmt;

/// Rank of an empty version string or an unrecognised pre-release tag
pub const RANK_UNKNOWN: u32 = 0;
pub const RANK_ALPHA: u32 = 1;
pub const RANK_BETA: u32 = 2;
pub const RANK_RC: u32 = 3;
/// Rank of a version without a pre-release suffix
pub const RANK_RELEASE: u32 = 999;

/// Parsed, totally ordered chart version key
///
/// Field order is the comparison order, so the derived `Ord` is the
/// version ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ChartVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_rank: u32,
    pub pre_number: u64,
}

impl ChartVersion {
    /// Parse a version string; never fails
    ///
    /// An empty string parses to the all-zero key with rank 0, which sorts
    /// below every real version. Callers must not use that as "no bound".
    pub fn parse(version: &str) -> Self {
        let version = version.trim();
        if version.is_empty() {
            return Self::default();
        }

        let (main, pre_release) = match version.split_once('-') {
            Some((main, pre)) => (main, Some(pre)),
            None => (version, None),
        };

        let mut segments = main.split('.').map(parse_segment);
        let major = segments.next().unwrap_or(0);
        let minor = segments.next().unwrap_or(0);
        let patch = segments.next().unwrap_or(0);

        let (pre_rank, pre_number) = match pre_release {
            None => (RANK_RELEASE, 0),
            Some(suffix) => parse_pre_release(suffix),
        };

        Self {
            major,
            minor,
            patch,
            pre_rank,
            pre_number,
        }
    }

    /// Whether the version carries a pre-release suffix of any kind
    pub fn is_prerelease(&self) -> bool {
        self.pre_rank != RANK_RELEASE
    }
}

impl From<&str> for ChartVersion {
    fn from(version: &str) -> Self {
        Self::parse(version)
    }
}

impl fmt::Display for ChartVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        let tag = match self.pre_rank {
            RANK_RELEASE => return Ok(()),
            RANK_ALPHA => "alpha",
            RANK_BETA => "beta",
            RANK_RC => "rc",
            _ => "unknown",
        };
        write!(f, "-{}.{}", tag, self.pre_number)
    }
}

/// Numeric segment; anything that is not a plain number counts as 0
fn parse_segment(segment: &str) -> u64 {
    segment.trim().parse().unwrap_or(0)
}

/// Tokenize `TAG[.]NUM` at the start of a pre-release suffix
fn parse_pre_release(suffix: &str) -> (u32, u64) {
    let tag_len = suffix
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(suffix.len());
    if tag_len == 0 {
        return (RANK_UNKNOWN, 0);
    }

    let tag = suffix[..tag_len].to_ascii_lowercase();
    let rest = &suffix[tag_len..];
    let rest = rest.strip_prefix('.').unwrap_or(rest);
    let digits_len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let number = rest[..digits_len].parse().unwrap_or(0);

    let rank = match tag.as_str() {
        "alpha" => RANK_ALPHA,
        "beta" => RANK_BETA,
        "rc" => RANK_RC,
        _ => RANK_UNKNOWN,
    };
    (rank, number)
}

/// Compare two version strings by their parsed keys
pub fn compare(a: &str, b: &str) -> Ordering {
    ChartVersion::parse(a).cmp(&ChartVersion::parse(b))
}

/// Check `min <= version <= max`, both bounds inclusive and optional
///
/// An empty bound string counts as absent.
pub fn satisfies(version: &str, min: Option<&str>, max: Option<&str>) -> bool {
    let min = min.filter(|m| !m.trim().is_empty());
    let max = max.filter(|m| !m.trim().is_empty());

    if let Some(min) = min {
        if compare(version, min) == Ordering::Less {
            return false;
        }
    }
    if let Some(max) = max {
        if compare(version, max) == Ordering::Greater {
            return false;
        }
    }
    true
}
