//! Prints a few rows of a written output for eyeballing. Diagnostic only.

use std::io::Write;
use std::path::Path;

use polars::prelude::*;
use rand::Rng;

use crate::error::Result;
use crate::table::Table;

pub const DEFAULT_SAMPLE_SIZE: usize = 5;
pub const PREVIEW_CHARS: usize = 120;

const FIELDS: [(&str, &str); 6] = [
    ("Title", "title"),
    ("Genres", "genres"),
    ("Overview", "overview"),
    ("Keywords", "keywords"),
    ("Release Date", "release_date"),
    ("Language", "original_language"),
];

/// Distinct random row indices, at most `n` and never more than `height`.
pub fn sample_rows<R: Rng + ?Sized>(height: usize, n: usize, rng: &mut R) -> Vec<usize> {
    rand::seq::index::sample(rng, height, n.min(height)).into_vec()
}

pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn as_text(table: &Table, name: &str) -> Result<Option<Column>> {
    match table.frame().column(name) {
        Ok(column) => Ok(Some(column.cast(&DataType::String)?)),
        Err(_) => Ok(None),
    }
}

fn value_at(column: Option<&Column>, row: usize) -> Result<String> {
    let Some(column) = column else {
        return Ok(String::new());
    };
    Ok(column.str()?.get(row).unwrap_or_default().to_string())
}

/// Reloads the CSV at `path` and writes up to `n` random rows to `out`.
/// Returns the number of rows printed.
pub fn print_sample<R, W>(
    path: impl AsRef<Path>,
    n: usize,
    text_column: &str,
    rng: &mut R,
    out: &mut W,
) -> Result<usize>
where
    R: Rng + ?Sized,
    W: Write,
{
    let table = Table::load(path)?;

    let mut columns = Vec::with_capacity(FIELDS.len());
    for (label, name) in FIELDS {
        columns.push((label, as_text(&table, name)?));
    }
    let combined = as_text(&table, text_column)?;

    let rows = sample_rows(table.height(), n, rng);
    for &row in &rows {
        writeln!(out, "\n--- Movie {} ---", row + 1)?;
        for (label, column) in &columns {
            writeln!(out, "{label}: {}", value_at(column.as_ref(), row)?)?;
        }
        writeln!(
            out,
            "Combined Text: {}...",
            preview(&value_at(combined.as_ref(), row)?, PREVIEW_CHARS)
        )?;
    }
    out.flush()?;

    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sample_never_exceeds_height() {
        let mut rng = StdRng::seed_from_u64(7);
        let rows = sample_rows(3, 5, &mut rng);
        let mut sorted = rows.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);

        assert_eq!(sample_rows(10, 5, &mut rng).len(), 5);
        assert!(sample_rows(0, 5, &mut rng).is_empty());
    }

    #[test]
    fn preview_counts_characters() {
        let text = "é".repeat(200);
        assert_eq!(preview(&text, PREVIEW_CHARS).chars().count(), 120);
        assert_eq!(preview("short", PREVIEW_CHARS), "short");
    }
}
