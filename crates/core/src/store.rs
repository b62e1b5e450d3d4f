//! Store-facing primitives shared by every repository.

use serde::{Deserialize, Serialize};

/// Number of rows a write touched.
///
/// Zero is an ordinary, distinguishable outcome (the record was not written),
/// not an error. Callers decide what it means for them.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowsAffected(pub u64);

impl RowsAffected {
    pub const NONE: Self = Self(0);
    pub const ONE: Self = Self(1);

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for RowsAffected {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<bool> for RowsAffected {
    fn from(written: bool) -> Self {
        if written { Self::ONE } else { Self::NONE }
    }
}
