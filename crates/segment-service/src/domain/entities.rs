//! # Domain Entities
//!
//! Segments, users and the memberships between them.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Longest accepted segment name, in bytes.
pub const MAX_SEGMENT_NAME_LEN: usize = 255;

/// Rejected segment name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSegmentName {
    /// Empty or whitespace-only.
    #[error("segment name must not be empty")]
    Empty,

    /// Longer than [`MAX_SEGMENT_NAME_LEN`].
    #[error("segment name is {len} bytes, max is {max}")]
    TooLong {
        /// Actual length in bytes
        len: usize,
        /// Allowed maximum
        max: usize,
    },
}

/// Name of a segment. Segment names are the primary identifier; there is
/// no surrogate key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SegmentName(String);

impl SegmentName {
    /// Validate and wrap a segment name.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidSegmentName> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InvalidSegmentName::Empty);
        }
        if name.len() > MAX_SEGMENT_NAME_LEN {
            return Err(InvalidSegmentName::TooLong {
                len: name.len(),
                max: MAX_SEGMENT_NAME_LEN,
            });
        }
        Ok(Self(name))
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SegmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SegmentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SegmentName {
    type Error = InvalidSegmentName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for SegmentName {
    type Error = InvalidSegmentName;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for SegmentName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        SegmentName::new(raw).map_err(serde::de::Error::custom)
    }
}

/// User identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Raw id as stored in the database.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// One user belonging to one segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Membership {
    /// Member
    pub user_id: UserId,
    /// Segment the user belongs to
    pub segment: SegmentName,
}

/// A single request to add and remove segments for one user.
///
/// Names are kept as sent. A name that is not a valid [`SegmentName`]
/// cannot refer to a stored segment, so the service treats it as absent
/// rather than rejecting the whole request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentChange {
    /// User whose memberships change
    pub user_id: UserId,
    /// Segments to join
    pub to_add: Vec<String>,
    /// Segments to leave
    pub to_delete: Vec<String>,
}

impl SegmentChange {
    /// Build a change request.
    pub fn new(user_id: UserId, to_add: Vec<String>, to_delete: Vec<String>) -> Self {
        Self {
            user_id,
            to_add,
            to_delete,
        }
    }

    /// True when the request neither adds nor removes anything.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_delete.is_empty()
    }
}
