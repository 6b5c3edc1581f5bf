// Copyright (c) 2025 Hive Adapter Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Warehouse version detection.
//!
//! `select version()` returns a build string like
//! `3.1.3000.7.1.8.0-801 rUnknown`; only the leading `major.minor.patch`
//! matters for feature gating. Detection is best-effort and memoized
//! process-wide: the first connection to resolve it wins, later
//! connections skip re-detection, and a failed detection leaves the
//! version unknown for the rest of the process. Concurrent detection is
//! harmless since every connection computes the same value.

use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

static WAREHOUSE_VERSION: OnceLock<Option<HiveVersion>> = OnceLock::new();

/// Parsed warehouse version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HiveVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl HiveVersion {
    /// Parse the leading `major.minor[.patch]` of a version string. The
    /// build string's first whitespace token is what gets parsed; trailing
    /// build qualifiers are ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let token = raw.split_whitespace().next()?;
        let mut parts = token.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        Some(Self {
            major,
            minor,
            patch,
        })
    }

    pub fn at_least(&self, other: &HiveVersion) -> bool {
        self >= other
    }
}

impl fmt::Display for HiveVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl PartialOrd for HiveVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HiveVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
    }
}

/// Resolve the process-wide version, running `detect` at most effectively
/// once. A `None` result is memoized too: version stays unknown.
pub(crate) fn resolve_with(detect: impl FnOnce() -> Option<HiveVersion>) -> Option<HiveVersion> {
    *WAREHOUSE_VERSION.get_or_init(detect)
}

/// The memoized version, if any connection has resolved it.
pub fn warehouse_version() -> Option<HiveVersion> {
    WAREHOUSE_VERSION.get().copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_version() {
        let v = HiveVersion::parse("3.1.3").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (3, 1, 3));
    }

    #[test]
    fn test_parse_build_string() {
        let v = HiveVersion::parse("3.1.3000.7.1.8.0-801 rUnknown").unwrap();
        assert_eq!((v.major, v.minor), (3, 1));
    }

    #[test]
    fn test_parse_missing_patch() {
        let v = HiveVersion::parse("4.0").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (4, 0, 0));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(HiveVersion::parse("").is_none());
        assert!(HiveVersion::parse("not-a-version").is_none());
        assert!(HiveVersion::parse("3").is_none());
    }

    #[test]
    fn test_ordering() {
        let v2 = HiveVersion::parse("2.3.9").unwrap();
        let v3 = HiveVersion::parse("3.1.0").unwrap();
        assert!(v3 > v2);
        assert!(v3.at_least(&v2));
        assert!(!v2.at_least(&v3));
    }

    #[test]
    fn test_display() {
        assert_eq!(HiveVersion::parse("3.1.2").unwrap().to_string(), "3.1.2");
    }
}
