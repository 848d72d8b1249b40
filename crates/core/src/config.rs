//! Engine configuration: capability flags and persisted editor preferences.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// First server build that accepts column comparison (`valueof`) conditions.
pub const COLUMN_COMPARISON_MIN_VERSION: ServerVersion = ServerVersion([9, 1, 0, 19562]);

/// A four-part server version, e.g. `9.1.0.19562`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion(pub [u32; 4]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid server version '{0}': expected up to four dot-separated numbers")]
pub struct VersionParseError(String);

impl FromStr for ServerVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = [0u32; 4];
        let mut count = 0;
        for piece in s.trim().split('.') {
            if count == 4 {
                return Err(VersionParseError(s.to_string()));
            }
            parts[count] = piece
                .parse()
                .map_err(|_| VersionParseError(s.to_string()))?;
            count += 1;
        }
        Ok(ServerVersion(parts))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

/// Construction-time settings for the condition engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Whether conditions may compare against another column.
    #[serde(default)]
    pub column_comparison_supported: bool,
    /// Persisted preference: pick GUID values through a record lookup.
    #[serde(default)]
    pub use_lookup: bool,
}

impl EngineConfig {
    /// Derive capabilities from the connected server's version.
    pub fn for_server(version: ServerVersion, use_lookup: bool) -> Self {
        EngineConfig {
            column_comparison_supported: version >= COLUMN_COMPARISON_MIN_VERSION,
            use_lookup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_versions() {
        assert_eq!("9.1".parse::<ServerVersion>().unwrap(), ServerVersion([9, 1, 0, 0]));
        assert!("9.1.0.1.2".parse::<ServerVersion>().is_err());
        assert!("nine".parse::<ServerVersion>().is_err());
    }

    #[test]
    fn column_comparison_gate() {
        let old: ServerVersion = "9.1.0.19561".parse().unwrap();
        let new: ServerVersion = "9.2.0.0".parse().unwrap();
        assert!(!EngineConfig::for_server(old, false).column_comparison_supported);
        assert!(EngineConfig::for_server(new, false).column_comparison_supported);
        assert!(
            EngineConfig::for_server(COLUMN_COMPARISON_MIN_VERSION, true)
                .column_comparison_supported
        );
    }
}
