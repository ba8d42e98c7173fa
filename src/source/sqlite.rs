//! SQLite-backed fact source.
//!
//! Monthly billing exports land in tables named `awsbilling_<YYYYMM>` with a
//! companion `awsbilling_<YYYYMM>_tagmapping` table (raw tag column →
//! display name), the layout the export loader produces.

use rusqlite::{params_from_iter, Connection};
use std::collections::HashMap;
use std::path::Path;

use super::{FactSource, RawFactRow, SourceError, SourceResult, TagMapping};

/// Table name prefix for monthly billing tables.
const TABLE_PREFIX: &str = "awsbilling_";

/// Suffix of the companion tag-mapping tables.
const TAG_TABLE_SUFFIX: &str = "_tagmapping";

/// Line-item types that never feed anomaly detection (compared
/// case-insensitively).
const EXCLUDED_LINE_ITEM_TYPES: &[&str] = &["fee", "refund", "credit", "rifee"];

/// Fact source over a local SQLite billing store.
pub struct SqliteFactSource {
    conn: Connection,
    accounts: Vec<String>,
}

impl SqliteFactSource {
    /// Open a billing store, optionally restricted to the given usage
    /// account ids (empty means every account).
    pub fn open(path: impl AsRef<Path>, accounts: Vec<String>) -> SourceResult<Self> {
        let conn = Connection::open(path).map_err(SourceError::Open)?;
        Ok(Self { conn, accounts })
    }

    fn month_table(month: &str) -> String {
        format!("{}{}", TABLE_PREFIX, month)
    }
}

impl FactSource for SqliteFactSource {
    fn tag_mapping(&self, month: &str) -> SourceResult<TagMapping> {
        let table = format!("{}{}", Self::month_table(month), TAG_TABLE_SUFFIX);
        let sql = format!("SELECT remappedusertag, usertag FROM {}", table);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut mapping = TagMapping::new();
        while let Some(row) = rows.next()? {
            let raw: String = row.get(0)?;
            let display: String = row.get(1)?;
            mapping.push(raw, display);
        }
        Ok(mapping)
    }

    fn fact_rows(&self, month: &str, tags: &TagMapping) -> SourceResult<Vec<RawFactRow>> {
        let table = Self::month_table(month);

        // Tag identifiers come from the store's own tag-mapping table.
        let mut tag_select = String::new();
        for raw in tags.raw_columns() {
            tag_select.push_str(", ");
            tag_select.push_str(raw);
        }

        let excluded = EXCLUDED_LINE_ITEM_TYPES
            .iter()
            .map(|t| format!("'{}'", t))
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!(
            "SELECT substr(identity_timeinterval, 1, 10) AS day, \
             lineitem_productcode AS service, \
             lineitem_operation AS operation, \
             product_usagetype AS usage_type, \
             SUM(lineitem_unblendedcost) AS cost{} \
             FROM {} \
             WHERE lower(lineitem_lineitemtype) NOT IN ({})",
            tag_select, table, excluded
        );
        if !self.accounts.is_empty() {
            let placeholders = vec!["?"; self.accounts.len()].join(", ");
            sql.push_str(&format!(
                " AND lineitem_usageaccountid IN ({})",
                placeholders
            ));
        }
        sql.push_str(" GROUP BY day, service, operation, usage_type");
        for raw in tags.raw_columns() {
            sql.push_str(", ");
            sql.push_str(raw);
        }

        let display_names: Vec<String> = tags.display_names().map(str::to_string).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(self.accounts.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let day_raw: String = row.get(0)?;
            let day = day_raw
                .parse()
                .map_err(|source| SourceError::MalformedDay {
                    value: day_raw.clone(),
                    source,
                })?;
            let service: Option<String> = row.get(1)?;
            let operation: Option<String> = row.get(2)?;
            let usage_type: Option<String> = row.get(3)?;
            let cost: Option<f64> = row.get(4)?;

            let mut tag_values = HashMap::new();
            for (i, name) in display_names.iter().enumerate() {
                let value: Option<String> = row.get(5 + i)?;
                if let Some(value) = value {
                    tag_values.insert(name.clone(), value);
                }
            }

            out.push(RawFactRow {
                day,
                service: service.unwrap_or_default(),
                operation: operation.unwrap_or_default(),
                usage_type: usage_type.unwrap_or_default(),
                cost: cost.unwrap_or(0.0),
                tags: tag_values,
            });
        }
        Ok(out)
    }
}
