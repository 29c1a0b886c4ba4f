//! Per-run session state
//!
//! Everything one run owns travels in a [`RunSession`]: the resolved cutoff,
//! the open output files, the dedup tracker and the counters. Row
//! processing lives here so the routing decisions in `classify` stay pure.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use marcout_common::{ExportError, Result};

use crate::classify::{route, CatalogRecord, RecordClassifier, Route};
use crate::db::{AuthorityRow, BibHoldingsRow, ItemRow};
use crate::items::ItemRecord;
use crate::ledger::RunKind;
use crate::outputs::OutputSet;
use crate::reference::ReferenceMap;

/// Good/bad counters for one record category.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct CategoryTally {
    pub good: u64,
    pub bad: u64,
}

/// All counters of one run.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct RunCounts {
    pub bib: CategoryTally,
    pub holdings: CategoryTally,
    pub authority: CategoryTally,
    pub items: u64,
}

/// The record categories that flow through the routed streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordCategory {
    Bib,
    Holdings,
    Authority,
}

impl RecordCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordCategory::Bib => "bib",
            RecordCategory::Holdings => "holdings",
            RecordCategory::Authority => "authority",
        }
    }
}

/// One run's state, created after cutoff resolution and consumed by
/// finalization.
#[derive(Debug)]
pub struct RunSession {
    pub run_id: Uuid,
    pub run_date: NaiveDate,
    pub kind: RunKind,
    pub cutoff: Option<NaiveDate>,
    pub counts: RunCounts,
    classifier: RecordClassifier,
    outputs: OutputSet,
}

impl RunSession {
    pub fn new(
        run_id: Uuid,
        run_date: NaiveDate,
        kind: RunKind,
        cutoff: Option<NaiveDate>,
        outputs: OutputSet,
    ) -> Self {
        Self {
            run_id,
            run_date,
            kind,
            cutoff,
            counts: RunCounts::default(),
            classifier: RecordClassifier::new(),
            outputs,
        }
    }

    /// Process one row of the bib+holdings join.
    ///
    /// The bib record is evaluated only on the first row of its id group;
    /// the holdings record on every row. A decreasing bib id means the
    /// query broke its ordering contract, which would silently duplicate
    /// bib records, so the run fails instead.
    pub fn process_bib_holdings_row(&mut self, row: BibHoldingsRow) -> Result<()> {
        if let Some(prev) = self.classifier.last_id() {
            if row.bib_id < prev {
                return Err(ExportError::UnorderedRows {
                    prev,
                    next: row.bib_id,
                });
            }
        }

        if self.classifier.first_occurrence(row.bib_id) {
            let bib = CatalogRecord {
                id: row.bib_id,
                created: row.bib_created,
                updated: row.bib_updated,
                content: row.bib_content,
            };
            self.route_record(RecordCategory::Bib, bib)?;
        }

        let holdings = CatalogRecord {
            id: row.holdings_id,
            created: row.holdings_created,
            updated: row.holdings_updated,
            content: row.holdings_content,
        };
        self.route_record(RecordCategory::Holdings, holdings)
    }

    /// Process one authority row; one record per row, no dedup.
    pub fn process_authority_row(&mut self, row: AuthorityRow) -> Result<()> {
        let record = CatalogRecord {
            id: row.id,
            created: row.created,
            updated: row.updated,
            content: row.content,
        };
        self.route_record(RecordCategory::Authority, record)
    }

    /// Process one item row: discard outer-join rows with no item, enrich
    /// and write the rest.
    pub fn process_item_row(
        &mut self,
        row: ItemRow,
        locations: &ReferenceMap,
        statuses: &ReferenceMap,
    ) -> Result<()> {
        if let Some(record) = ItemRecord::from_row(&row, locations, statuses) {
            self.outputs.write_item(&record.to_line())?;
            self.counts.items += 1;
        }
        Ok(())
    }

    fn route_record(&mut self, category: RecordCategory, record: CatalogRecord) -> Result<()> {
        match route(&record, self.cutoff) {
            Route::Primary => {
                match category {
                    RecordCategory::Bib => self.outputs.write_bib(&record.content)?,
                    RecordCategory::Holdings => self.outputs.write_holdings(&record.content)?,
                    RecordCategory::Authority => self.outputs.write_authority(&record.content)?,
                }
                self.tally_mut(category).good += 1;
            },
            Route::Malformed => {
                warn!(
                    category = category.as_str(),
                    id = record.id,
                    "diverting malformed record to the error stream"
                );
                self.outputs.write_malformed(&record.content)?;
                self.tally_mut(category).bad += 1;
            },
            Route::Skipped => {},
        }
        Ok(())
    }

    fn tally_mut(&mut self, category: RecordCategory) -> &mut CategoryTally {
        match category {
            RecordCategory::Bib => &mut self.counts.bib,
            RecordCategory::Holdings => &mut self.counts.holdings,
            RecordCategory::Authority => &mut self.counts.authority,
        }
    }

    pub fn outputs(&self) -> &OutputSet {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut OutputSet {
        &mut self.outputs
    }

    /// Flush and close the output files, consuming the session.
    pub fn close_outputs(self) -> Result<()> {
        self.outputs.close()
    }
}
