//! Version normalization for lock file entries
//!
//! Lock files carry versions the way the ecosystem wrote them (`v1.2`,
//! `2`, `dev-master`). Normalization produces a canonical, comparable
//! form: numeric versions are padded to major.minor.patch and rendered
//! with a trailing `.0` build component; anything starting with `dev`
//! becomes a floating reference that outranks every tagged release.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{Result, VendoError};

/// Sentinel rendering for floating (development branch) references
pub const FLOATING_SENTINEL: &str = "9999999-dev";

/// A normalized version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Version {
    /// A numeric major.minor.patch version
    Release { major: u64, minor: u64, patch: u64 },
    /// A development branch reference; always compares as newest
    Floating,
}

impl Version {
    /// Parse and normalize a raw ecosystem version string
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(VendoError::InvalidVersion {
                version: raw.to_string(),
                reason: "empty version string".to_string(),
            });
        }

        // One leading literal 'v' is tag-prefix noise
        let stripped = raw.strip_prefix('v').unwrap_or(raw);

        // "dev-master", "dev-main", even bare "dev": floating reference
        if stripped.as_bytes().starts_with(b"dev") {
            return Ok(Self::Floating);
        }

        let mut parts: Vec<&str> = stripped.split('.').collect();
        if parts.len() > 3 {
            return Err(VendoError::InvalidVersion {
                version: raw.to_string(),
                reason: format!("expected at most 3 components, got {}", parts.len()),
            });
        }
        while parts.len() < 3 {
            parts.push("0");
        }

        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| VendoError::InvalidVersion {
                version: raw.to_string(),
                reason: format!("component '{part}' is not numeric"),
            })?;
        }

        Ok(Self::Release {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
        })
    }

    /// Whether this version is a floating (branch) reference
    pub fn is_floating(&self) -> bool {
        matches!(self, Self::Floating)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Trailing .0 marks a freshly normalized version, distinguishing
            // it from a natively four-component one
            Self::Release {
                major,
                minor,
                patch,
            } => write!(f, "{major}.{minor}.{patch}.0"),
            Self::Floating => write!(f, "{FLOATING_SENTINEL}"),
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Floating, Self::Floating) => Ordering::Equal,
            (Self::Floating, Self::Release { .. }) => Ordering::Greater,
            (Self::Release { .. }, Self::Floating) => Ordering::Less,
            (
                Self::Release {
                    major: a1,
                    minor: b1,
                    patch: c1,
                },
                Self::Release {
                    major: a2,
                    minor: b2,
                    patch: c2,
                },
            ) => (a1, b1, c1).cmp(&(a2, b2, c2)),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
