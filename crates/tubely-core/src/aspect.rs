use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Orientation bucket of a video, derived from its stream geometry.
///
/// The lowercase name doubles as the storage key prefix, so the set of
/// values and their spelling must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectClass {
    /// Within tolerance of 16:9.
    Landscape,
    /// Within tolerance of 9:16.
    Portrait,
    Other,
}

impl AspectClass {
    /// Storage key prefix for this orientation.
    pub fn prefix(&self) -> &'static str {
        match self {
            AspectClass::Landscape => "landscape",
            AspectClass::Portrait => "portrait",
            AspectClass::Other => "other",
        }
    }
}

impl Display for AspectClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(AspectClass::Landscape.prefix(), "landscape");
        assert_eq!(AspectClass::Portrait.prefix(), "portrait");
        assert_eq!(AspectClass::Other.prefix(), "other");
        assert_eq!(AspectClass::Portrait.to_string(), "portrait");
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&AspectClass::Landscape).unwrap();
        assert_eq!(json, "\"landscape\"");
    }
}
