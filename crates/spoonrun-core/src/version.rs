//! Dotted numeric versions reported by the tool and accepted by `--vm`.
//!
//! Ordering compares components pairwise up to the shorter operand's length;
//! when that prefix is equal, the shorter version orders first. Missing
//! components are *not* treated as zero, so `1.2 < 1.2.0.0`.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    components: Vec<u32>,
}

impl Version {
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(CoreError::config("version must not be empty"));
        }

        let components = value
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(CoreError::config(format!(
                        "version '{value}' must be dot-separated numbers"
                    )));
                }
                part.parse::<u32>().map_err(|_| {
                    CoreError::config(format!("version component '{part}' is out of range"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { components })
    }

    /// Parse a four-component `a.b.c.d` version, as required by `--vm`.
    pub fn parse_quad(value: &str) -> Result<Self> {
        let version = Self::parse(value)?;
        if version.components.len() != 4 {
            return Err(CoreError::config(format!(
                "version '{value}' must have exactly four components (a.b.c.d)"
            )));
        }
        Ok(version)
    }

    pub fn components(&self) -> &[u32] {
        &self.components
    }

    pub fn ensure_at_least(&self, minimum: &Version) -> Result<()> {
        if self < minimum {
            return Err(CoreError::config(format!(
                "tool version {self} is older than the required {minimum}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .components
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&rendered)
    }
}

impl FromStr for Version {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_minor_ordering() {
        assert!(v("1.2") < v("1.3"));
        assert!(v("1.10") > v("1.9"));
    }

    #[test]
    fn test_shorter_prefix_orders_first() {
        assert!(v("1.2") < v("1.2.0.0"));
        assert_ne!(v("1.2"), v("1.2.0.0"));
        assert!(v("1.3") > v("1.2.9.9"));
    }

    #[test]
    fn test_round_trip() {
        assert_eq!(v("4.12.101.5").to_string(), "4.12.101.5");
    }

    #[test]
    fn test_parse_quad() {
        assert!(Version::parse_quad("11.0.0.0").is_ok());
        assert!(Version::parse_quad("11.0").is_err());
        assert!(Version::parse_quad("11.0.0.0.1").is_err());
        assert!(Version::parse_quad("11.x.0.0").is_err());
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "1..2", ".1", "1.", "v1.2", "1.2-beta"] {
            assert!(Version::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_ensure_at_least() {
        assert!(v("2.0.1").ensure_at_least(&v("2.0")).is_ok());
        assert!(v("1.9").ensure_at_least(&v("2.0")).is_err());
    }
}
