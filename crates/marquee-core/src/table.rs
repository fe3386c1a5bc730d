use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use polars::prelude::*;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::structured::FieldValue;

/// Cell texts read as missing values, besides an empty field.
pub const MISSING_VALUE_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// The in-memory data set a pipeline run works on.
///
/// `frame` always holds the persisted form of every column, so it can be
/// written as-is. Columns that have been parsed into record lists keep their
/// parsed values in `parsed`, one entry per frame row.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub(crate) frame: DataFrame,
    pub(crate) parsed: HashMap<String, Vec<FieldValue>>,
}

impl From<DataFrame> for Table {
    fn from(frame: DataFrame) -> Self {
        Self {
            frame,
            parsed: HashMap::new(),
        }
    }
}

impl Table {
    /// Reads a headered CSV file. Column types are inferred from the whole file;
    /// empty fields and [`MISSING_VALUE_TOKENS`] load as nulls.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_access = |source: io::Error| CoreError::FileAccess {
            path: path.to_path_buf(),
            source,
        };

        let metadata = fs::metadata(path).map_err(file_access)?;
        if !metadata.is_file() {
            return Err(file_access(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        let file = File::open(path).map_err(file_access)?;

        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_parse_options(CsvParseOptions::default().with_null_values(Some(
                NullValues::AllColumns(MISSING_VALUE_TOKENS.iter().map(|t| (*t).into()).collect()),
            )))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|source| CoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(
            path = %path.display(),
            rows = frame.height(),
            columns = frame.width(),
            "loaded csv"
        );
        Ok(Self::from(frame))
    }

    /// Writes the table with a header row, creating parent directories and
    /// replacing any existing file.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file_access = |source: io::Error| CoreError::FileAccess {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(file_access)?;
        }
        let mut frame = self.frame.clone();
        let mut buffer = Vec::new();
        CsvWriter::new(&mut buffer)
            .include_header(true)
            .finish(&mut frame)?;

        let mut file = File::create(path).map_err(file_access)?;
        file.write_all(&buffer)
            .and_then(|()| file.flush())
            .map_err(file_access)?;
        Ok(())
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    /// Parsed values for a record-list column, if it has been parsed.
    pub fn parsed_column(&self, name: &str) -> Option<&[FieldValue]> {
        self.parsed.get(name).map(Vec::as_slice)
    }

    /// Removes the named columns, ignoring names that are not present.
    /// Returns the names that were actually removed, in request order.
    pub fn drop_columns(&mut self, names: &[String]) -> Result<Vec<String>> {
        let mut dropped = Vec::new();
        for name in names {
            if !self.has_column(name) || dropped.contains(name) {
                continue;
            }
            self.frame.drop_in_place(name)?;
            self.parsed.remove(name);
            dropped.push(name.clone());
        }
        Ok(dropped)
    }

    /// Drops every row holding a null, or a float NaN, in any column. Returns
    /// the number removed.
    pub fn drop_nulls(&mut self) -> Result<usize> {
        let mut keep = vec![true; self.height()];
        for column in self.frame.get_columns() {
            if column.null_count() > 0 {
                let nulls = column.is_null();
                for (idx, is_null) in (&nulls).into_iter().enumerate() {
                    if is_null == Some(true) {
                        keep[idx] = false;
                    }
                }
            }
            if column.dtype().is_float() {
                let values = column.cast(&DataType::Float64)?;
                for (idx, value) in values.f64()?.into_iter().enumerate() {
                    if value.is_some_and(f64::is_nan) {
                        keep[idx] = false;
                    }
                }
            }
        }
        self.retain_rows(&keep)
    }

    /// Keeps the first row for each distinct value of `id_column`, dropping
    /// later repeats entirely. Values are compared by their string form.
    pub fn drop_duplicate_ids(&mut self, id_column: &str) -> Result<usize> {
        let ids = self
            .frame
            .column(id_column)
            .map_err(|_| CoreError::SchemaAssumption {
                column: id_column.to_string(),
                stage: "duplicate removal",
            })?
            .cast(&DataType::String)?;
        let ids = ids.str()?;

        let mut seen: HashSet<Option<&str>> = HashSet::with_capacity(ids.len());
        let keep: Vec<bool> = ids.into_iter().map(|id| seen.insert(id)).collect();
        self.retain_rows(&keep)
    }

    fn retain_rows(&mut self, keep: &[bool]) -> Result<usize> {
        let removed = keep.iter().filter(|flag| !**flag).count();
        if removed == 0 {
            return Ok(0);
        }

        let mask = BooleanChunked::new("keep".into(), keep);
        self.frame = self.frame.filter(&mask)?;
        for values in self.parsed.values_mut() {
            let mut flags = keep.iter();
            values.retain(|_| flags.next().copied().unwrap_or(false));
        }
        Ok(removed)
    }
}
