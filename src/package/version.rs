//! Version comparison for installed packages.
//!
//! Bower versions are loose semver strings. Comparison here is purely
//! numeric per dot-separated segment; it is not a range resolver.

use std::cmp::Ordering;

/// Version comparator - pure functions over version strings.
pub struct VersionComparator;

impl VersionComparator {
    /// Whether `candidate` is strictly newer than `current`.
    pub fn is_newer(candidate: &str, current: &str) -> bool {
        Self::compare(candidate, current) == Ordering::Greater
    }

    /// Compare two versions segment by segment.
    ///
    /// Each segment contributes its leading digits; a segment with no digits
    /// counts as zero, and a missing segment is treated as zero so that
    /// "1.2" equals "1.2.0". Prerelease suffixes are ignored.
    pub fn compare(a: &str, b: &str) -> Ordering {
        let a: Vec<u64> = Self::segments(a).collect();
        let b: Vec<u64> = Self::segments(b).collect();
        let len = a.len().max(b.len());

        for i in 0..len {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            match x.cmp(&y) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    fn normalize(version: &str) -> &str {
        let version = version.trim();
        version.strip_prefix('v').unwrap_or(version)
    }

    fn segments(version: &str) -> impl Iterator<Item = u64> + '_ {
        let core = Self::normalize(version)
            .split(['-', '+'])
            .next()
            .unwrap_or_default();
        core.split('.').map(|segment| {
            let digits: String = segment.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().unwrap_or(0)
        })
    }
}
