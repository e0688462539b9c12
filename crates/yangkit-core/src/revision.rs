//! # Module Revisions
//!
//! A YANG revision is a date in `YYYY-MM-DD` form. Revisions identify
//! module versions and order them: when no revision is requested, the
//! latest one wins.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const REVISION_FORMAT: &str = "%Y-%m-%d";

/// A module revision date.
///
/// Construction rejects anything that is not a real calendar date in
/// strict `YYYY-MM-DD` form (`2018-02-30` and `2018-2-26` both fail).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Revision(NaiveDate);

impl Revision {
    /// Parse a revision from its `YYYY-MM-DD` text.
    pub fn of(s: &str) -> Result<Self, CoreError> {
        let bytes = s.as_bytes();
        let shaped = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !shaped {
            return Err(CoreError::InvalidRevision {
                value: s.to_string(),
            });
        }
        NaiveDate::parse_from_str(s, REVISION_FORMAT)
            .map(Self)
            .map_err(|_| CoreError::InvalidRevision {
                value: s.to_string(),
            })
    }

    /// Access the underlying date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(REVISION_FORMAT))
    }
}

impl FromStr for Revision {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::of(s)
    }
}

impl TryFrom<String> for Revision {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::of(&value)
    }
}

impl From<Revision> for String {
    fn from(value: Revision) -> Self {
        value.to_string()
    }
}
