use std::str::FromStr;
use thiserror::Error;

/// Feed ordering. Every ordering breaks ties on the row id so that
/// consecutive pages never overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Newest first. This is the default when no sort is requested.
    #[default]
    New,
    /// Oldest first.
    Old,
    /// Highest net vote score first.
    Votes,
}

impl SortKey {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Old => "old",
            Self::Votes => "votes",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sort key `{0}`")]
pub struct InvalidSortKey(pub String);

impl FromStr for SortKey {
    type Err = InvalidSortKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "new" => Ok(Self::New),
            "old" => Ok(Self::Old),
            "votes" => Ok(Self::Votes),
            other => Err(InvalidSortKey(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InvalidSortKey, SortKey};

    #[test]
    fn parses_known_keys() {
        assert_eq!("new".parse(), Ok(SortKey::New));
        assert_eq!("old".parse(), Ok(SortKey::Old));
        assert_eq!("votes".parse(), Ok(SortKey::Votes));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert_eq!(
            "top".parse::<SortKey>(),
            Err(InvalidSortKey("top".to_string()))
        );
        assert_eq!(
            "NEW".parse::<SortKey>(),
            Err(InvalidSortKey("NEW".to_string()))
        );
    }
}
