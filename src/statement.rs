//! SQL text for the three statements the importer runs against a data table.

use std::collections::HashMap;

use serde_json::Value;

use crate::column::{Schema, ValueKind};
use crate::error::{Error, Result};

/// Header text to its index in a freshly fetched header row.
pub type PositionMap = HashMap<String, usize>;

pub fn create_table_statement(table: &str, schema: &Schema) -> String {
    let columns: Vec<String> = schema
        .iter()
        .map(|c| format!("{} {}", c.stored_name, c.value_kind))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        table,
        columns.join(",\n")
    )
}

pub fn delete_all_statement(table: &str) -> String {
    format!("DELETE FROM {}", table)
}

/// Locates every schema column in the given header row.
///
/// Fails when a stored column has no header in the sheet any more; the
/// first matching header wins when a title repeats.
pub fn position_map(table: &str, schema: &Schema, header_row: &[Value]) -> Result<PositionMap> {
    let mut map = PositionMap::with_capacity(schema.len());
    for column in schema.iter() {
        let mut found = None;
        for (position, cell) in header_row.iter().enumerate() {
            let title = cell.as_str().ok_or_else(|| Error::Type {
                position,
                value: cell.to_string(),
            })?;
            if title == column.source_name {
                found = Some(position);
                break;
            }
        }
        match found {
            Some(position) => {
                map.insert(column.source_name.clone(), position);
            }
            None => {
                return Err(Error::MissingHeader {
                    table: table.to_string(),
                    header: column.source_name.clone(),
                })
            }
        }
    }
    Ok(map)
}

/// A parameterized INSERT with its already coerced values.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub sql: String,
    pub values: Vec<String>,
    table: String,
    columns: Vec<String>,
}

impl InsertStatement {
    /// Renders the statement with every value inlined as a quoted literal.
    pub fn to_literal_sql(&self) -> String {
        let values: Vec<String> = self.values.iter().map(|v| format!("'{}'", v)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            self.columns.join(", "),
            values.join(", ")
        )
    }
}

pub fn insert_statement(
    table: &str,
    schema: &Schema,
    positions: &PositionMap,
    row: &[Value],
) -> Result<InsertStatement> {
    let mut columns = Vec::with_capacity(schema.len());
    let mut placeholders = Vec::with_capacity(schema.len());
    let mut values = Vec::with_capacity(schema.len());

    for (i, column) in schema.iter().enumerate() {
        let position = positions.get(&column.source_name).copied().ok_or_else(|| {
            Error::MissingHeader {
                table: table.to_string(),
                header: column.source_name.clone(),
            }
        })?;
        let raw = match row.get(position) {
            Some(cell) => cell.as_str().ok_or_else(|| Error::Type {
                position,
                value: cell.to_string(),
            })?,
            None => "",
        };

        columns.push(column.stored_name.clone());
        placeholders.push(format!("${}::TEXT::{}", i + 1, column.value_kind));
        values.push(coerce(raw, column.value_kind));
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    );
    Ok(InsertStatement {
        sql,
        values,
        table: table.to_string(),
        columns,
    })
}

fn coerce(raw: &str, kind: ValueKind) -> String {
    if raw.is_empty() && kind == ValueKind::Int {
        return "0".to_string();
    }
    raw.chars().filter(|c| !matches!(c, '`' | '\'' | '"')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use serde_json::json;

    fn events_schema() -> Schema {
        Schema::new(vec![
            Column {
                source_name: "start".into(),
                stored_name: "start".into(),
                value_kind: ValueKind::Timestamptz,
            },
            Column {
                source_name: "_uuid".into(),
                stored_name: "uuid".into(),
                value_kind: ValueKind::Uuid,
            },
            Column {
                source_name: "Назва".into(),
                stored_name: "nazva2".into(),
                value_kind: ValueKind::Varchar,
            },
        ])
    }

    fn row(cells: &[&str]) -> Vec<Value> {
        cells.iter().map(|c| json!(c)).collect()
    }

    #[test]
    fn create_table_lists_columns() {
        let schema = events_schema();
        let sql = create_table_statement("events", &schema);
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS events (\nstart TIMESTAMPTZ,\nuuid UUID,\nnazva2 VARCHAR\n)"
        );
        assert_eq!(sql, create_table_statement("events", &schema));
    }

    #[test]
    fn delete_has_no_filter() {
        assert_eq!(delete_all_statement("events"), "DELETE FROM events");
    }

    #[test]
    fn insert_follows_schema_order() {
        let schema = events_schema();
        let header = row(&["Назва", "start", "_uuid"]);
        let positions = position_map("events", &schema, &header).unwrap();
        let stmt = insert_statement(
            "events",
            &schema,
            &positions,
            &row(&[
                "Test",
                "2023-07-03T09:10:33.380+03:00",
                "11111111-1111-1111-1111-111111111111",
            ]),
        )
        .unwrap();

        assert_eq!(
            stmt.sql,
            "INSERT INTO events (start, uuid, nazva2) VALUES ($1::TEXT::TIMESTAMPTZ, $2::TEXT::UUID, $3::TEXT::VARCHAR)"
        );
        assert_eq!(
            stmt.to_literal_sql(),
            "INSERT INTO events (start, uuid, nazva2) VALUES ('2023-07-03T09:10:33.380+03:00', '11111111-1111-1111-1111-111111111111', 'Test')"
        );
    }

    #[test]
    fn strips_quote_characters() {
        let schema = events_schema();
        let positions = position_map("events", &schema, &row(&["start", "_uuid", "Назва"])).unwrap();
        let stmt = insert_statement(
            "events",
            &schema,
            &positions,
            &row(&["'now'", "\"x\"", "it's `quoted` \"text\""]),
        )
        .unwrap();

        assert_eq!(stmt.values, vec!["now", "x", "its quoted text"]);
        for v in &stmt.values {
            assert!(!v.contains(&['`', '\'', '"'][..]));
        }
    }

    #[test]
    fn empty_int_becomes_zero() {
        let schema = Schema::new(vec![
            Column {
                source_name: "Кількість".into(),
                stored_name: "kilkist0".into(),
                value_kind: ValueKind::Int,
            },
            Column {
                source_name: "Ціна".into(),
                stored_name: "tsina1".into(),
                value_kind: ValueKind::Float,
            },
        ]);
        let positions = position_map("goods", &schema, &row(&["Кількість", "Ціна"])).unwrap();
        let stmt = insert_statement("goods", &schema, &positions, &row(&["", ""])).unwrap();
        assert_eq!(stmt.values, vec!["0", ""]);
    }

    #[test]
    fn short_row_reads_as_empty() {
        let schema = Schema::new(vec![
            Column {
                source_name: "a".into(),
                stored_name: "a0".into(),
                value_kind: ValueKind::Varchar,
            },
            Column {
                source_name: "b".into(),
                stored_name: "b1".into(),
                value_kind: ValueKind::Int,
            },
        ]);
        let positions = position_map("t", &schema, &row(&["a", "b"])).unwrap();
        let stmt = insert_statement("t", &schema, &positions, &row(&["x"])).unwrap();
        assert_eq!(stmt.values, vec!["x", "0"]);
    }

    #[test]
    fn missing_header_is_reported() {
        let schema = events_schema();
        match position_map("events", &schema, &row(&["start", "_uuid"])) {
            Err(Error::MissingHeader { header, .. }) => assert_eq!(header, "Назва"),
            other => panic!("expected missing header, got {:?}", other),
        }
    }
}
