use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CartosyncError, Result};

/// One entry of a project's version history.
///
/// Versions are immutable; identity is the `name` field, which encodes a
/// monotonically increasing revision number as `v<N>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub name: String,
    pub author: String,
    pub created: DateTime<Utc>,
}

impl Version {
    pub fn new(name: impl Into<String>, author: impl Into<String>, created: DateTime<Utc>) -> Self {
        Version {
            name: name.into(),
            author: author.into(),
            created,
        }
    }

    /// Numeric revision encoded in the name.
    pub fn number(&self) -> Result<u64> {
        parse_version_name(&self.name)
    }
}

/// Parse a version name like "v42" (or bare "42") into its number.
///
/// Version numbering starts at 1; zero is rejected.
pub fn parse_version_name(name: &str) -> Result<u64> {
    let digits = name.strip_prefix('v').unwrap_or(name);
    let number: u64 = digits
        .parse()
        .map_err(|_| CartosyncError::Parse(format!("invalid version name: {:?}", name)))?;
    if number == 0 {
        return Err(CartosyncError::Parse(format!(
            "version numbering starts at 1, got {:?}",
            name
        )));
    }
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_name() {
        assert_eq!(parse_version_name("v42").unwrap(), 42);
        assert_eq!(parse_version_name("7").unwrap(), 7);
        assert!(parse_version_name("v0").is_err());
        assert!(parse_version_name("").is_err());
        assert!(parse_version_name("version-1").is_err());
    }

    #[test]
    fn test_version_number() {
        let v = Version::new("v120", "anna", chrono::Utc::now());
        assert_eq!(v.number().unwrap(), 120);
    }
}
