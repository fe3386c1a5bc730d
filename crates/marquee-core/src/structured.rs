use std::fmt;

use marquee_parser::{parse_record_list, LiteralError, LiteralValue, NamedList};
use polars::prelude::*;
use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::table::Table;

/// A parsed record-list cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Records kept whole (cast, crew).
    Records(Vec<LiteralValue>),
    /// Records reduced to their names (genres, keywords).
    Named(NamedList),
}

impl FieldValue {
    /// `name` of every record that has one, in record order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            FieldValue::Records(records) => records
                .iter()
                .filter_map(LiteralValue::record_name)
                .collect(),
            FieldValue::Named(list) => list.names().iter().map(String::as_str).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FieldValue::Records(records) => records.len(),
            FieldValue::Named(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Records(records) => {
                f.write_str("[")?;
                for (idx, record) in records.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{record}")?;
                }
                f.write_str("]")
            }
            FieldValue::Named(list) => write!(f, "{list}"),
        }
    }
}

fn parse_cell(raw: Option<&str>, named: bool) -> std::result::Result<FieldValue, LiteralError> {
    let records = match raw {
        Some(text) => parse_record_list(text)?,
        None => Vec::new(),
    };
    Ok(if named {
        FieldValue::Named(NamedList::from_records(&records))
    } else {
        FieldValue::Records(records)
    })
}

impl Table {
    /// Parses each listed column from literal record lists.
    ///
    /// Columns in `named_fields` become [`FieldValue::Named`]. Each column is
    /// replaced in place by its rendered form, and the parsed values are kept
    /// for text extraction. Listed columns that are not present are skipped.
    /// Returns the names of the columns that were parsed.
    pub fn parse_structured_fields(
        &mut self,
        fields: &[String],
        named_fields: &[String],
    ) -> Result<Vec<String>> {
        let mut parsed_columns = Vec::new();

        for field in fields {
            if !self.has_column(field) {
                warn!(column = %field, "structured field not present; skipping");
                continue;
            }

            let named = named_fields.contains(field);
            let raw = self.frame.column(field)?.cast(&DataType::String)?;
            let values = raw
                .str()?
                .into_iter()
                .enumerate()
                .map(|(row, cell)| {
                    parse_cell(cell, named).map_err(|source| CoreError::FieldParse {
                        column: field.clone(),
                        row,
                        source,
                    })
                })
                .collect::<Result<Vec<FieldValue>>>()?;

            let rendered: Vec<String> = values.iter().map(FieldValue::to_string).collect();
            self.frame
                .with_column(Series::new(field.as_str().into(), rendered))?;

            debug!(column = %field, named, rows = values.len(), "parsed structured field");
            self.parsed.insert(field.clone(), values);
            parsed_columns.push(field.clone());
        }

        Ok(parsed_columns)
    }
}
