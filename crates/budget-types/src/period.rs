use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// UTC calendar month a timestamp falls in. Usage counters roll over when
/// two timestamps land in different buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthBucket {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl MonthBucket {
    pub fn of(timestamp: DateTime<Utc>) -> Self {
        Self {
            year: timestamp.year(),
            month: timestamp.month(),
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        Self::of(timestamp) == *self
    }
}

impl std::fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
