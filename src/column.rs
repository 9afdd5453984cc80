use std::fmt;

use serde_json::Value;

use crate::error::{Error, MissingSentinel, Result};
use crate::normalize::normalize;

pub const START_HEADER: &str = "start";
pub const UUID_HEADER: &str = "_uuid";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValueKind {
    Int,
    Varchar,
    Float,
    Timestamptz,
    Uuid,
}

impl ValueKind {
    /// Maps an operator's menu answer to a kind. Only the three kinds an
    /// operator may pick are reachable.
    pub fn from_choice(choice: &str) -> Option<ValueKind> {
        match choice.trim() {
            "1" => Some(ValueKind::Int),
            "2" => Some(ValueKind::Varchar),
            "3" => Some(ValueKind::Float),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            ValueKind::Int => "INT",
            ValueKind::Varchar => "VARCHAR",
            ValueKind::Float => "FLOAT",
            ValueKind::Timestamptz => "TIMESTAMPTZ",
            ValueKind::Uuid => "UUID",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One field of a target table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Header text as it appears in the spreadsheet.
    #[serde(rename = "gs_name")]
    pub source_name: String,
    /// Database identifier.
    #[serde(rename = "db_name")]
    pub stored_name: String,
    #[serde(rename = "value_type")]
    pub value_kind: ValueKind,
}

/// Ordered column list of one target table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Schema {
        Schema { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }
}

/// Supplies the value kind of a header the builder cannot infer.
pub trait TypePrompt {
    fn value_kind(&mut self, header: &str) -> Result<ValueKind>;
}

impl<F> TypePrompt for F
where
    F: FnMut(&str) -> Result<ValueKind>,
{
    fn value_kind(&mut self, header: &str) -> Result<ValueKind> {
        self(header)
    }
}

/// Builds a schema from a header row.
///
/// Empty headers are skipped but still count for the positional suffix, so
/// two headers that normalize to the same text keep distinct names.
pub fn build(header_row: &[Value], prompt: &mut dyn TypePrompt) -> Result<Schema> {
    let (mut start_found, mut uuid_found) = (false, false);
    let mut columns = Vec::with_capacity(header_row.len());

    for (position, cell) in header_row.iter().enumerate() {
        let header = cell.as_str().ok_or_else(|| Error::Type {
            position,
            value: cell.to_string(),
        })?;
        if header.is_empty() {
            continue;
        }

        let column = match header {
            START_HEADER => {
                start_found = true;
                Column {
                    source_name: header.to_string(),
                    stored_name: "start".to_string(),
                    value_kind: ValueKind::Timestamptz,
                }
            }
            UUID_HEADER => {
                uuid_found = true;
                Column {
                    source_name: header.to_string(),
                    stored_name: "uuid".to_string(),
                    value_kind: ValueKind::Uuid,
                }
            }
            _ => {
                let mut stored_name = format!("{}{}", normalize(header)?, position);
                // An unquoted identifier cannot start with a digit.
                if stored_name.starts_with(|c: char| c.is_ascii_digit()) {
                    stored_name.insert(0, '_');
                }
                let value_kind = prompt.value_kind(header)?;
                Column {
                    source_name: header.to_string(),
                    stored_name,
                    value_kind,
                }
            }
        };
        columns.push(column);
    }

    match (start_found, uuid_found) {
        (true, true) => Ok(Schema::new(columns)),
        (false, false) => Err(Error::MissingSentinel(MissingSentinel::Both)),
        (false, true) => Err(Error::MissingSentinel(MissingSentinel::Start)),
        (true, false) => Err(Error::MissingSentinel(MissingSentinel::Uuid)),
    }
}
