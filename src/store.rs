//! Schemas are kept as JSON in the `sets` side table, one record per create
//! run. Records are never updated; the newest one for a table wins.

use crate::column::Schema;
use crate::db::Database;
use crate::error::{Error, Result};

pub const METADATA_TABLE: &str = "sets";

/// A schema read back from the store with the sheet it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSchema {
    pub sheet_id: String,
    pub sheet_title: String,
    pub schema: Schema,
}

pub fn ensure_table(db: &mut dyn Database) -> Result<()> {
    let ddl = format!(
        "CREATE TABLE IF NOT EXISTS {} (\n\
         id BIGSERIAL PRIMARY KEY,\n\
         table_title VARCHAR NOT NULL,\n\
         sheetID VARCHAR NOT NULL,\n\
         listName VARCHAR NOT NULL,\n\
         columns_set TEXT NOT NULL\n\
         )",
        METADATA_TABLE
    );
    db.execute(&ddl, &[])?;
    // Older `sets` tables were created with only the four data columns.
    let id = format!(
        "ALTER TABLE {} ADD COLUMN IF NOT EXISTS id BIGSERIAL",
        METADATA_TABLE
    );
    db.execute(&id, &[])?;
    Ok(())
}

pub fn save(
    db: &mut dyn Database,
    table: &str,
    sheet_id: &str,
    sheet_title: &str,
    schema: &Schema,
) -> Result<()> {
    let persistence = |reason: String| Error::Persistence {
        table: table.to_string(),
        reason,
    };
    let columns = serde_json::to_string(schema).map_err(|e| persistence(e.to_string()))?;
    let query = format!(
        "INSERT INTO {} (table_title, sheetID, listName, columns_set) VALUES ($1, $2, $3, $4)",
        METADATA_TABLE
    );
    db.execute(&query, &[table, sheet_id, sheet_title, columns.as_str()])
        .map_err(|e| persistence(e.to_string()))?;
    Ok(())
}

pub fn load(db: &mut dyn Database, table: &str) -> Result<StoredSchema> {
    let query = format!(
        "SELECT sheetID, listName, columns_set FROM {} WHERE table_title = $1 ORDER BY id DESC LIMIT 1",
        METADATA_TABLE
    );
    let fields = db
        .query_row(&query, &[table])?
        .ok_or_else(|| Error::NotFound(table.to_string()))?;

    let corruption = |reason: String| Error::Corruption {
        table: table.to_string(),
        reason,
    };
    let [sheet_id, sheet_title, columns]: [String; 3] = fields
        .try_into()
        .map_err(|f: Vec<String>| corruption(format!("expected 3 fields, got {}", f.len())))?;
    let schema: Schema = serde_json::from_str(&columns).map_err(|e| corruption(e.to_string()))?;

    Ok(StoredSchema {
        sheet_id,
        sheet_title,
        schema,
    })
}
