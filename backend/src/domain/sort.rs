//! Sort policy for the unsolved post feed.

use std::fmt;

/// Error returned when a caller supplies an unrecognised sort key.
///
/// Sort keys form a closed set; anything else is rejected rather than being
/// silently mapped onto a default ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKeyError(pub String);

impl fmt::Display for SortKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported sort key: {}", self.0)
    }
}

impl std::error::Error for SortKeyError {}

/// Supported orderings for the unsolved post feed.
///
/// `Oldest` preserves natural insertion order; `Newest` reverses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostSort {
    /// Most recently created first.
    Newest,
    /// Oldest first (natural insertion order).
    Oldest,
}

impl PostSort {
    /// Every supported sort key, in presentation order.
    pub const ALL: [PostSort; 2] = [PostSort::Newest, PostSort::Oldest];

    /// Stable key used in URLs and payloads.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
        }
    }

    /// Human-readable label for sort pickers.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Newest => "Newest First",
            Self::Oldest => "Oldest First",
        }
    }

    /// The remaining sort choices, for presenting "other available sorts".
    pub fn others(&self) -> Vec<PostSort> {
        Self::ALL.iter().copied().filter(|key| key != self).collect()
    }
}

impl fmt::Display for PostSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PostSort {
    type Err = SortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            other => Err(SortKeyError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("newest", PostSort::Newest)]
    #[case("oldest", PostSort::Oldest)]
    fn parses_supported_keys(#[case] raw: &str, #[case] expected: PostSort) {
        let sort: PostSort = raw.parse().expect("supported key");
        assert_eq!(sort, expected);
        assert_eq!(sort.as_str(), raw);
    }

    #[rstest]
    #[case("random")]
    #[case("viewed")]
    #[case("NEWEST")]
    #[case("")]
    fn rejects_unknown_keys(#[case] raw: &str) {
        let err = raw.parse::<PostSort>().expect_err("unknown key must fail");
        assert_eq!(err, SortKeyError(raw.to_owned()));
    }

    #[test]
    fn others_is_the_set_complement() {
        assert_eq!(PostSort::Newest.others(), vec![PostSort::Oldest]);
        assert_eq!(PostSort::Oldest.others(), vec![PostSort::Newest]);
    }

    #[test]
    fn labels_match_the_drop_down_wording() {
        assert_eq!(PostSort::Newest.label(), "Newest First");
        assert_eq!(PostSort::Oldest.label(), "Oldest First");
    }
}
