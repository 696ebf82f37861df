/// Site indexing status definitions
///
/// A site row is created as `Indexing` at the start of a crawl run and ends
/// the run as either `Indexed` or `Failed`.
use serde::Serialize;
use std::fmt;

/// Represents the indexing status of a configured site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SiteStatus {
    /// A crawl of this site is in progress (or was cut short by a crash)
    Indexing,

    /// The site walk completed
    Indexed,

    /// The walk failed or was stopped; see the site's last error
    Failed,
}

impl SiteStatus {
    /// Returns true once the site has left the `Indexing` status
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Indexing)
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Indexing => "INDEXING",
            Self::Indexed => "INDEXED",
            Self::Failed => "FAILED",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "INDEXING" => Some(Self::Indexing),
            "INDEXED" => Some(Self::Indexed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_final() {
        assert!(!SiteStatus::Indexing.is_final());
        assert!(SiteStatus::Indexed.is_final());
        assert!(SiteStatus::Failed.is_final());
    }

    #[test]
    fn test_from_db_string() {
        assert_eq!(
            SiteStatus::from_db_string("INDEXING"),
            Some(SiteStatus::Indexing)
        );
        assert_eq!(
            SiteStatus::from_db_string("INDEXED"),
            Some(SiteStatus::Indexed)
        );
        assert_eq!(SiteStatus::from_db_string("FAILED"), Some(SiteStatus::Failed));
        assert_eq!(SiteStatus::from_db_string("indexed"), None);
    }

    #[test]
    fn test_display_and_serialize() {
        assert_eq!(format!("{}", SiteStatus::Failed), "FAILED");
        assert_eq!(
            serde_json::to_string(&SiteStatus::Indexing).unwrap(),
            "\"INDEXING\""
        );
    }
}
