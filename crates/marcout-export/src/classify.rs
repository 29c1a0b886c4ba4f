//! Record classification and routing
//!
//! Every record coming off a result row is routed to exactly one
//! destination: the category's primary stream, the shared malformed stream,
//! or nowhere. The decision is pure; writing and counting happen in the
//! session. Classification never fails a run on its own.

use chrono::NaiveDate;

/// One catalog record as it comes off a result row. Bibliographic, holdings
/// and authority records all take this shape; the raw content is an opaque
/// encoded blob.
#[derive(Debug, Clone)]
pub struct CatalogRecord {
    pub id: i64,
    pub created: NaiveDate,
    pub updated: Option<NaiveDate>,
    pub content: Vec<u8>,
}

impl CatalogRecord {
    /// A record blob must not contain an embedded line break; output files
    /// concatenate blobs back to back and a stray newline corrupts every
    /// consumer downstream.
    pub fn is_malformed(&self) -> bool {
        self.content.contains(&b'\n')
    }
}

/// Where a record goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The category's own output stream.
    Primary,
    /// The shared error stream, counted as bad.
    Malformed,
    /// Dropped without a trace; unchanged records under an active cutoff.
    Skipped,
}

/// Route one record. The malformed check runs regardless of the cutoff: a
/// corrupt record is never merged into a valid stream even when its dates
/// would qualify it.
pub fn route(record: &CatalogRecord, cutoff: Option<NaiveDate>) -> Route {
    if record.is_malformed() {
        return Route::Malformed;
    }
    match cutoff {
        None => Route::Primary,
        Some(threshold) => {
            if qualifies(record, threshold) {
                Route::Primary
            } else {
                Route::Skipped
            }
        },
    }
}

/// A record qualifies under a cutoff when it was created or updated strictly
/// after the threshold. Never-updated records are judged on creation alone.
fn qualifies(record: &CatalogRecord, threshold: NaiveDate) -> bool {
    record.created > threshold || record.updated.is_some_and(|u| u > threshold)
}

/// Duplicate suppression for the bibliographic stream.
///
/// The bib+holdings join delivers one row per holdings record, so a bib
/// record with several holdings appears on several consecutive rows. The
/// query orders rows by bib id; a bib record is emitted only on the row
/// where its id first differs from the previous row's.
#[derive(Debug, Default)]
pub struct RecordClassifier {
    last_bib_id: Option<i64>,
}

impl RecordClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bib id seen on the previous row, if any.
    pub fn last_id(&self) -> Option<i64> {
        self.last_bib_id
    }

    /// Record this row's bib id; true when it differs from the previous
    /// row's, i.e. the bib record should be evaluated for emission.
    pub fn first_occurrence(&mut self, bib_id: i64) -> bool {
        let first = self.last_bib_id != Some(bib_id);
        self.last_bib_id = Some(bib_id);
        first
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(created: NaiveDate, updated: Option<NaiveDate>, content: &[u8]) -> CatalogRecord {
        CatalogRecord {
            id: 1,
            created,
            updated,
            content: content.to_vec(),
        }
    }

    #[test]
    fn test_full_export_routes_everything_valid() {
        let rec = record(date(1999, 1, 1), None, b"00024nam a2200000");
        assert_eq!(route(&rec, None), Route::Primary);
    }

    #[test]
    fn test_embedded_newline_is_malformed() {
        let rec = record(date(2020, 7, 1), None, b"00024nam\na2200000");
        assert_eq!(route(&rec, None), Route::Malformed);
    }

    #[test]
    fn test_malformed_wins_over_qualifying_dates() {
        // created after the cutoff, but still corrupt
        let rec = record(date(2020, 7, 1), Some(date(2020, 7, 2)), b"bad\nblob");
        assert_eq!(route(&rec, Some(date(2020, 6, 1))), Route::Malformed);
    }

    #[test]
    fn test_cutoff_is_a_strict_threshold() {
        let cutoff = Some(date(2020, 6, 1));

        // neither date exceeds the cutoff
        let rec = record(date(2020, 5, 1), Some(date(2020, 5, 15)), b"rec");
        assert_eq!(route(&rec, cutoff), Route::Skipped);

        // updated after the cutoff
        let rec = record(date(2020, 5, 1), Some(date(2020, 6, 2)), b"rec");
        assert_eq!(route(&rec, cutoff), Route::Primary);

        // created after the cutoff, never updated
        let rec = record(date(2020, 6, 2), None, b"rec");
        assert_eq!(route(&rec, cutoff), Route::Primary);

        // equal to the cutoff does not qualify
        let rec = record(date(2020, 6, 1), Some(date(2020, 6, 1)), b"rec");
        assert_eq!(route(&rec, cutoff), Route::Skipped);
    }

    #[test]
    fn test_never_updated_record_judged_on_creation() {
        let cutoff = Some(date(2020, 6, 1));
        let rec = record(date(2020, 1, 1), None, b"rec");
        assert_eq!(route(&rec, cutoff), Route::Skipped);
    }

    #[test]
    fn test_first_occurrence_per_id_group() {
        let mut classifier = RecordClassifier::new();
        // three rows: ids 7, 7, 9
        assert!(classifier.first_occurrence(7));
        assert!(!classifier.first_occurrence(7));
        assert!(classifier.first_occurrence(9));
        assert_eq!(classifier.last_id(), Some(9));
    }

    #[test]
    fn test_single_row_groups_each_emit() {
        let mut classifier = RecordClassifier::new();
        assert!(classifier.first_occurrence(1));
        assert!(classifier.first_occurrence(2));
        assert!(classifier.first_occurrence(3));
    }
}
