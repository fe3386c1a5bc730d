use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::structured::FieldValue;
use crate::table::Table;

/// What one row holds for one field, as far as text extraction cares.
#[derive(Debug, Clone, Copy)]
pub enum Cell<'a> {
    Records(&'a FieldValue),
    Text(&'a str),
    /// Present but neither a record list nor text (numbers, dates).
    Other,
}

/// Collects the text of one row: record names for record-list fields, the
/// value itself for text fields, nothing otherwise. Tokens follow `fields`
/// order, then record order, and are joined with single spaces.
pub fn extract_row_text<'a>(
    fields: &[String],
    cell: impl Fn(&str) -> Option<Cell<'a>>,
) -> String {
    let mut tokens: Vec<&'a str> = Vec::new();
    for field in fields {
        match cell(field) {
            Some(Cell::Records(value)) => tokens.extend(value.names()),
            Some(Cell::Text(text)) => tokens.push(text),
            Some(Cell::Other) | None => {}
        }
    }
    tokens.join(" ")
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    table: &'a Table,
    row: usize,
}

impl<'a> RowView<'a> {
    pub fn new(table: &'a Table, row: usize) -> Self {
        Self { table, row }
    }

    /// `None` when the column is absent or the value is null.
    pub fn cell(&self, field: &str) -> Option<Cell<'a>> {
        if let Some(values) = self.table.parsed_column(field) {
            return values.get(self.row).map(Cell::Records);
        }

        let column = self.table.frame().column(field).ok()?;
        match column.dtype() {
            DataType::String => column.str().ok()?.get(self.row).map(Cell::Text),
            _ => match column.get(self.row).ok()? {
                AnyValue::Null => None,
                _ => Some(Cell::Other),
            },
        }
    }
}

impl Table {
    /// Derives `destination` from `fields` for every row, replacing an
    /// existing column of that name or appending a new one.
    pub fn extract_text(&mut self, fields: &[String], destination: &str) -> Result<()> {
        let table = &*self;
        let combined: Vec<String> = (0..table.height())
            .map(|row| {
                let view = RowView::new(table, row);
                extract_row_text(fields, |field| view.cell(field))
            })
            .collect();

        let empty = combined.iter().filter(|text| text.is_empty()).count();
        debug!(column = destination, empty_rows = empty, "extracted combined text");

        self.parsed.remove(destination);
        self.frame
            .with_column(Series::new(destination.into(), combined))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_parser::{parse_record_list, NamedList};

    fn named(text: &str) -> FieldValue {
        FieldValue::Named(NamedList::from_records(&parse_record_list(text).unwrap()))
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn joins_names_then_text_in_field_order() {
        let genres = named("[{'id': 35, 'name': 'Comedy'}, {'id':18,'name':'Drama'}]");
        let keywords = named("[{'name':'love'}]");

        let text = extract_row_text(&fields(&["genres", "keywords", "overview"]), |field| {
            match field {
                "genres" => Some(Cell::Records(&genres)),
                "keywords" => Some(Cell::Records(&keywords)),
                "overview" => Some(Cell::Text("A story")),
                _ => None,
            }
        });

        assert_eq!(text, "Comedy Drama love A story");
    }

    #[test]
    fn skips_missing_and_non_text_fields() {
        let crew = FieldValue::Records(
            parse_record_list("[{'job': 'Director'}, {'name': 'Jane', 'job': 'Editor'}]").unwrap(),
        );

        let text = extract_row_text(&fields(&["runtime", "crew", "tagline", "overview"]), |field| {
            match field {
                "runtime" => Some(Cell::Other),
                "crew" => Some(Cell::Records(&crew)),
                "overview" => Some(Cell::Text("Plot")),
                _ => None,
            }
        });

        assert_eq!(text, "Jane Plot");
    }

    #[test]
    fn table_extraction_overwrites_destination() {
        let mut table = Table::from(
            df!(
                "genres" => ["[{'name': 'Action'}]", "[]"],
                "overview" => [Some("Boom"), None],
                "runtime" => [90i64, 100],
                "combined_text" => ["stale", "stale"],
            )
            .unwrap(),
        );
        table
            .parse_structured_fields(&fields(&["genres"]), &fields(&["genres"]))
            .unwrap();
        table
            .extract_text(&fields(&["genres", "overview", "runtime"]), "combined_text")
            .unwrap();

        assert_eq!(
            table.column_names(),
            vec!["genres", "overview", "runtime", "combined_text"]
        );
        let combined: Vec<Option<&str>> = table
            .frame()
            .column("combined_text")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(combined, vec![Some("Action Boom"), Some("")]);
    }
}
