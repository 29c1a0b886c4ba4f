//! Item record shaping
//!
//! Item rows come out of an outer join, so a holdings record with no items
//! still produces a row; those rows are discarded here, uncounted. Rows
//! with an actual item are enriched through the reference maps and flattened
//! into a fixed 11-field pipe-delimited line.

use crate::db::ItemRow;
use crate::reference::ReferenceMap;

/// One physical item, ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub bib_id: i64,
    pub holdings_id: i64,
    pub item_id: i64,
    pub status: String,
    pub item_type: String,
    pub enumeration: String,
    pub chronology: String,
    pub permanent_location: String,
    pub temporary_location: String,
    pub barcode: String,
    pub barcode_status: String,
}

impl ItemRecord {
    /// Shape a query row into an item record, or `None` when the row is an
    /// outer-join artifact with no item attached. Location and status codes
    /// resolve through the reference maps; a code with no entry becomes an
    /// empty label.
    pub fn from_row(
        row: &ItemRow,
        locations: &ReferenceMap,
        statuses: &ReferenceMap,
    ) -> Option<Self> {
        let item_id = row.item_id?;

        let code = |value: &Option<String>| -> String {
            value
                .as_deref()
                .map(|c| c.trim().to_string())
                .unwrap_or_default()
        };

        Some(Self {
            bib_id: row.bib_id,
            holdings_id: row.holdings_id,
            item_id,
            status: statuses.label(&code(&row.status_code)).to_string(),
            item_type: code(&row.item_type),
            enumeration: code(&row.enumeration),
            chronology: code(&row.chronology),
            permanent_location: locations.label(&code(&row.permanent_location)).to_string(),
            temporary_location: locations.label(&code(&row.temporary_location)).to_string(),
            barcode: code(&row.barcode),
            barcode_status: code(&row.barcode_status),
        })
    }

    /// The fixed output shape: 11 fields, `|`-delimited, in this order. The
    /// writer adds the line terminator.
    pub fn to_line(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
            self.bib_id,
            self.holdings_id,
            self.item_id,
            self.status,
            self.item_type,
            self.enumeration,
            self.chronology,
            self.permanent_location,
            self.temporary_location,
            self.barcode,
            self.barcode_status,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn maps() -> (ReferenceMap, ReferenceMap) {
        let locations = ReferenceMap::from_pairs([
            ("MAIN".to_string(), "Main Library".to_string()),
            ("ANNEX".to_string(), "Storage Annex".to_string()),
        ]);
        let statuses = ReferenceMap::from_pairs([
            ("01".to_string(), "Available".to_string()),
            ("02".to_string(), "Charged".to_string()),
        ]);
        (locations, statuses)
    }

    fn full_row() -> ItemRow {
        ItemRow {
            bib_id: 7,
            holdings_id: 31,
            item_id: Some(104),
            permanent_location: Some("MAIN".to_string()),
            temporary_location: Some("ANNEX".to_string()),
            holdings_location: Some("MAIN".to_string()),
            status_code: Some("01".to_string()),
            item_type: Some("book".to_string()),
            enumeration: Some("v.2".to_string()),
            chronology: Some("1998".to_string()),
            year: Some("1998".to_string()),
            copy_number: Some(1),
            barcode: Some("39001023456789".to_string()),
            barcode_status: Some("active".to_string()),
        }
    }

    #[test]
    fn test_row_without_item_is_discarded() {
        let (locations, statuses) = maps();
        let row = ItemRow {
            item_id: None,
            ..full_row()
        };
        assert!(ItemRecord::from_row(&row, &locations, &statuses).is_none());
    }

    #[test]
    fn test_line_has_eleven_fields_in_order() {
        let (locations, statuses) = maps();
        let record = ItemRecord::from_row(&full_row(), &locations, &statuses).unwrap();
        let line = record.to_line();

        let fields: Vec<&str> = line.split('|').collect();
        assert_eq!(fields.len(), 11);
        assert_eq!(
            fields,
            vec![
                "7",
                "31",
                "104",
                "Available",
                "book",
                "v.2",
                "1998",
                "Main Library",
                "Storage Annex",
                "39001023456789",
                "active",
            ]
        );
    }

    #[test]
    fn test_unknown_codes_become_empty_labels() {
        let (locations, statuses) = maps();
        let row = ItemRow {
            permanent_location: Some("GONE".to_string()),
            temporary_location: None,
            status_code: Some("99".to_string()),
            ..full_row()
        };
        let record = ItemRecord::from_row(&row, &locations, &statuses).unwrap();
        assert_eq!(record.permanent_location, "");
        assert_eq!(record.temporary_location, "");
        assert_eq!(record.status, "");
        // the line still carries all eleven positions
        assert_eq!(record.to_line().matches('|').count(), 10);
    }

    #[test]
    fn test_absent_optionals_render_as_empty_fields() {
        let (locations, statuses) = maps();
        let row = ItemRow {
            enumeration: None,
            chronology: None,
            barcode: None,
            barcode_status: None,
            item_type: None,
            ..full_row()
        };
        let record = ItemRecord::from_row(&row, &locations, &statuses).unwrap();
        assert_eq!(record.to_line(), "7|31|104|Available||||Main Library|Storage Annex||");
    }
}
