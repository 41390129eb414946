use std::fmt;

use serde::{Serialize, Serializer};

use crate::shared::constants::UNKNOWN_BUCKET;

/// 1-based person number, rendered as `Person_<n>`.
///
/// Numbers follow creation order within one run and carry no meaning
/// across runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(u32);

impl PersonId {
    pub fn new(number: u32) -> Self {
        debug_assert!(number > 0, "person numbers are 1-based");
        Self(number)
    }

    /// Person for a 0-based cluster index.
    pub fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    pub fn index(&self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Person_{}", self.0)
    }
}

impl Serialize for PersonId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Destination grouping: a real person or the `unknown` sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketLabel {
    Person(PersonId),
    Unknown,
}

impl fmt::Display for BucketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketLabel::Person(id) => id.fmt(f),
            BucketLabel::Unknown => f.write_str(UNKNOWN_BUCKET),
        }
    }
}

impl Serialize for BucketLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_label_format() {
        assert_eq!(PersonId::new(1).to_string(), "Person_1");
        assert_eq!(PersonId::from_index(11).to_string(), "Person_12");
    }

    #[test]
    fn test_index_roundtrip() {
        assert_eq!(PersonId::from_index(4).index(), 4);
    }

    #[test]
    fn test_bucket_label_format() {
        assert_eq!(BucketLabel::Unknown.to_string(), "unknown");
        assert_eq!(
            BucketLabel::Person(PersonId::new(3)).to_string(),
            "Person_3"
        );
    }

    #[test]
    fn test_persons_sort_before_unknown() {
        let mut labels = vec![
            BucketLabel::Unknown,
            BucketLabel::Person(PersonId::new(2)),
            BucketLabel::Person(PersonId::new(1)),
        ];
        labels.sort();
        assert_eq!(labels[0], BucketLabel::Person(PersonId::new(1)));
        assert_eq!(labels[2], BucketLabel::Unknown);
    }

    #[test]
    fn test_serializes_as_label_string() {
        let json = serde_json::to_string(&BucketLabel::Person(PersonId::new(7))).unwrap();
        assert_eq!(json, "\"Person_7\"");
    }
}
