//! Catalog queries
//!
//! Runtime-checked queries against the catalog's PostgreSQL backing store.
//! The two record queries and the item query are streamed row-at-a-time;
//! only the reference tables are fetched whole. The bib+holdings query owns
//! its `ORDER BY b.id` clause: duplicate suppression in the session depends
//! on it, and the streaming loop verifies it row by row.

use std::time::Duration;

use chrono::NaiveDate;
use futures::stream::BoxStream;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

use marcout_common::Result;

use crate::reference::ReferenceMap;

/// One row of the bib+holdings join: a bibliographic record repeated for
/// each of its holdings records, ordered by bib id.
#[derive(Debug, Clone, FromRow)]
pub struct BibHoldingsRow {
    pub bib_id: i64,
    pub bib_created: NaiveDate,
    pub bib_updated: Option<NaiveDate>,
    pub bib_content: Vec<u8>,
    pub holdings_id: i64,
    pub holdings_created: NaiveDate,
    pub holdings_updated: Option<NaiveDate>,
    pub holdings_content: Vec<u8>,
}

/// One authority record row.
#[derive(Debug, Clone, FromRow)]
pub struct AuthorityRow {
    pub id: i64,
    pub created: NaiveDate,
    pub updated: Option<NaiveDate>,
    pub content: Vec<u8>,
}

/// One row of the item query. Items hang off holdings via an outer join, so
/// a holdings record with no items produces a row whose item columns are all
/// NULL; `item_id: None` marks those rows.
#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub bib_id: i64,
    pub holdings_id: i64,
    pub item_id: Option<i64>,
    pub permanent_location: Option<String>,
    pub temporary_location: Option<String>,
    pub holdings_location: Option<String>,
    pub status_code: Option<String>,
    pub item_type: Option<String>,
    pub enumeration: Option<String>,
    pub chronology: Option<String>,
    pub year: Option<String>,
    pub copy_number: Option<i32>,
    pub barcode: Option<String>,
    pub barcode_status: Option<String>,
}

const BIB_HOLDINGS_SQL: &str = r#"
SELECT b.id AS bib_id,
       b.created_at::date AS bib_created,
       b.updated_at::date AS bib_updated,
       b.marc AS bib_content,
       h.id AS holdings_id,
       h.created_at::date AS holdings_created,
       h.updated_at::date AS holdings_updated,
       h.marc AS holdings_content
FROM bib_records b
JOIN holdings_records h ON h.bib_id = b.id
WHERE ($1::bigint IS NULL OR b.library_id = $1)
  AND ($2::date IS NULL
       OR b.created_at::date > $2 OR b.updated_at::date > $2
       OR h.created_at::date > $2 OR h.updated_at::date > $2)
ORDER BY b.id, h.id
"#;

const AUTHORITY_SQL: &str = r#"
SELECT a.id,
       a.created_at::date AS created,
       a.updated_at::date AS updated,
       a.marc AS content
FROM authority_records a
WHERE ($1::date IS NULL OR a.created_at::date > $1 OR a.updated_at::date > $1)
ORDER BY a.id
"#;

const ITEM_SQL: &str = r#"
SELECT b.id AS bib_id,
       h.id AS holdings_id,
       i.id AS item_id,
       i.permanent_location,
       i.temporary_location,
       h.location AS holdings_location,
       i.status_code,
       t.label AS item_type,
       i.enumeration,
       i.chronology,
       i.year,
       i.copy_number,
       i.barcode,
       i.barcode_status
FROM holdings_records h
JOIN bib_records b ON b.id = h.bib_id
LEFT JOIN items i ON i.holdings_id = h.id
LEFT JOIN item_types t ON t.id = i.item_type_id
WHERE ($1::bigint IS NULL OR b.library_id = $1)
  AND ($2::date IS NULL OR i.created_at::date > $2 OR i.updated_at::date > $2)
ORDER BY b.id, h.id, i.id
"#;

const LOCATION_SQL: &str = r#"
SELECT code, COALESCE(name, '') AS name
FROM locations
"#;

const ITEM_STATUS_SQL: &str = r#"
SELECT code, COALESCE(label, '') AS label
FROM item_statuses
"#;

/// Pool with a single connection; the run streams its phases one after
/// another and never queries concurrently. The connection is established
/// lazily on first use.
pub fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect_lazy(database_url)?;
    Ok(pool)
}

/// Stream the bib+holdings join, ordered by bib id.
pub fn stream_bib_holdings<'e>(
    pool: &'e PgPool,
    library: Option<i64>,
    cutoff: Option<NaiveDate>,
) -> BoxStream<'e, sqlx::Result<BibHoldingsRow>> {
    sqlx::query_as::<_, BibHoldingsRow>(BIB_HOLDINGS_SQL)
        .bind(library)
        .bind(cutoff)
        .fetch(pool)
}

/// Stream authority records. Authorities are shared across libraries, so
/// the scope filter does not apply here.
pub fn stream_authority<'e>(
    pool: &'e PgPool,
    cutoff: Option<NaiveDate>,
) -> BoxStream<'e, sqlx::Result<AuthorityRow>> {
    sqlx::query_as::<_, AuthorityRow>(AUTHORITY_SQL)
        .bind(cutoff)
        .fetch(pool)
}

/// Stream item rows joined through holdings and bib.
pub fn stream_items<'e>(
    pool: &'e PgPool,
    library: Option<i64>,
    cutoff: Option<NaiveDate>,
) -> BoxStream<'e, sqlx::Result<ItemRow>> {
    sqlx::query_as::<_, ItemRow>(ITEM_SQL)
        .bind(library)
        .bind(cutoff)
        .fetch(pool)
}

/// Load the location reference domain in full.
pub async fn load_location_labels(pool: &PgPool) -> Result<ReferenceMap> {
    let rows: Vec<(String, String)> = sqlx::query_as(LOCATION_SQL).fetch_all(pool).await?;
    Ok(ReferenceMap::from_pairs(rows))
}

/// Load the item status reference domain in full.
pub async fn load_status_labels(pool: &PgPool) -> Result<ReferenceMap> {
    let rows: Vec<(String, String)> = sqlx::query_as(ITEM_STATUS_SQL).fetch_all(pool).await?;
    Ok(ReferenceMap::from_pairs(rows))
}
