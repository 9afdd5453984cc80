use crate::column::{self, TypePrompt};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::sheet::{self, SheetSource};
use crate::statement;
use crate::store::{self, StoredSchema};

/// Rows written and rows skipped by one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    pub failed: usize,
}

/// Runs the create, import and truncate flows against one database handle
/// and one spreadsheet source.
pub struct App {
    db: Box<dyn Database>,
    sheets: Box<dyn SheetSource>,
}

impl App {
    pub fn new(db: Box<dyn Database>, sheets: Box<dyn SheetSource>) -> Result<App> {
        let mut app = App { db, sheets };
        store::ensure_table(app.db.as_mut())?;
        Ok(app)
    }

    /// Builds a schema from the sheet's header row, creates the table and
    /// records the schema. The table and the record are two separate
    /// commits.
    pub fn create_table(
        &mut self,
        sheet_id: &str,
        sheet_title: &str,
        table: &str,
        prompt: &mut dyn TypePrompt,
    ) -> Result<StoredSchema> {
        let grid = self.sheets.fetch(sheet_id, &sheet::header_range(sheet_title))?;
        let header = grid
            .first()
            .ok_or_else(|| Error::Sheet(format!("{}: no header row", sheet_title)))?;

        let schema = column::build(header, prompt)?;
        log::info!("table {}: {} columns", table, schema.len());

        let ddl = statement::create_table_statement(table, &schema);
        self.db.execute(&ddl, &[])?;
        store::save(self.db.as_mut(), table, sheet_id, sheet_title, &schema)?;
        log::info!("table {} created from {}/{}", table, sheet_id, sheet_title);

        Ok(StoredSchema {
            sheet_id: sheet_id.to_string(),
            sheet_title: sheet_title.to_string(),
            schema,
        })
    }

    /// Inserts every data row of the table's sheet. A row that fails is
    /// logged and skipped; nothing is rolled back.
    pub fn import(&mut self, table: &str) -> Result<ImportReport> {
        let stored = store::load(self.db.as_mut(), table)?;
        let grid = self
            .sheets
            .fetch(&stored.sheet_id, &sheet::full_range(&stored.sheet_title))?;
        let (header, rows) = grid
            .split_first()
            .ok_or_else(|| Error::Sheet(format!("{}: sheet is empty", stored.sheet_title)))?;
        let positions = statement::position_map(table, &stored.schema, header)?;

        let mut report = ImportReport::default();
        for (i, row) in rows.iter().enumerate() {
            match self.insert_row(table, &stored, &positions, row) {
                Ok(()) => report.inserted += 1,
                Err(e) => {
                    // +2: one-based, after the header row
                    log::error!("{} row {}: {}", table, i + 2, e);
                    report.failed += 1;
                }
            }
        }
        log::info!(
            "table {}: {} rows inserted, {} failed",
            table,
            report.inserted,
            report.failed
        );
        Ok(report)
    }

    fn insert_row(
        &mut self,
        table: &str,
        stored: &StoredSchema,
        positions: &statement::PositionMap,
        row: &[serde_json::Value],
    ) -> Result<()> {
        let stmt = statement::insert_statement(table, &stored.schema, positions, row)?;
        if self.db.is_dry_run() {
            println!("{};", stmt.to_literal_sql());
            return Ok(());
        }
        let values: Vec<&str> = stmt.values.iter().map(String::as_str).collect();
        self.db.execute(&stmt.sql, &values)?;
        Ok(())
    }

    /// Deletes every row of the table.
    pub fn truncate(&mut self, table: &str) -> Result<u64> {
        let n = self.db.execute(&statement::delete_all_statement(table), &[])?;
        log::info!("table {}: {} rows deleted", table, n);
        Ok(n)
    }
}
