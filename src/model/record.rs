use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::model::theme::Category;

/// Opaque unique record identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RecordId(pub String);

/// One victory entry consumed by the pipeline.
///
/// Records are externally owned and read-only here; the caller filters and
/// sorts them before handing them in. A record must not change for the
/// duration of one generation run.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct VictoryRecord {
    /// Unique identifier.
    pub id: RecordId,
    /// Optional path to a still image on disk.
    pub media_path: Option<PathBuf>,
    /// Category tag, used to pick the icon drawn inside the disc.
    pub category: Category,
    /// Display name of the obstacle that was overcome, if any.
    pub obstacle: Option<String>,
    /// Optional free-text story. Length is bounded upstream.
    pub text: Option<String>,
    /// Optional feeling text.
    pub feeling: Option<String>,
    /// Point in time this victory happened.
    pub timestamp: DateTime<Utc>,
}

impl VictoryRecord {
    /// Record with only the required fields set.
    pub fn bare(id: impl Into<String>, category: Category, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: RecordId(id.into()),
            media_path: None,
            category,
            obstacle: None,
            text: None,
            feeling: None,
            timestamp,
        }
    }

    /// Date label rendered above the disc, e.g. "Nov 19, 2025".
    pub fn date_label(&self) -> String {
        self.timestamp.format("%b %-d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn date_label_is_abbreviated_month_day_year() {
        let ts = Utc.with_ymd_and_hms(2025, 11, 19, 12, 0, 0).unwrap();
        let r = VictoryRecord::bare("a", Category::Sport, ts);
        assert_eq!(r.date_label(), "Nov 19, 2025");
    }

    #[test]
    fn date_label_has_no_zero_padded_day() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 5, 0, 0, 0).unwrap();
        let r = VictoryRecord::bare("b", Category::Other, ts);
        assert_eq!(r.date_label(), "Mar 5, 2025");
    }
}
