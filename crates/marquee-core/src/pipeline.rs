use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::profiles::Profile;
use crate::table::Table;

/// Counts and names reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub profile: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub rows_loaded: usize,
    pub rows_dropped_null: usize,
    pub rows_dropped_duplicate: usize,
    pub rows_written: usize,
    pub columns_dropped: Vec<String>,
    pub columns_parsed: Vec<String>,
    pub text_column: String,
}

/// Load → prune → drop nulls → drop duplicate ids → parse record lists →
/// combine text → write.
#[derive(Debug, Clone)]
pub struct Pipeline {
    input: PathBuf,
    output: PathBuf,
    profile: Profile,
}

impl Pipeline {
    pub fn new(input: impl Into<PathBuf>, profile: Profile) -> Self {
        Self {
            input: input.into(),
            output: profile.output_path.clone(),
            profile,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn input_path(&self) -> &Path {
        &self.input
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    pub fn run(&self) -> Result<PipelineSummary> {
        info!(
            profile = %self.profile.id,
            input = %self.input.display(),
            "starting pipeline"
        );
        let mut table = Table::load(&self.input)?;

        let mut summary = self.transform(&mut table)?;

        table.write_csv(&self.output)?;
        summary.rows_written = table.height();
        info!(
            output = %self.output.display(),
            rows = summary.rows_written,
            "wrote output"
        );

        Ok(summary)
    }

    /// Applies every in-memory stage to `table`. Nothing is written.
    pub fn transform(&self, table: &mut Table) -> Result<PipelineSummary> {
        let profile = &self.profile;
        let mut summary = PipelineSummary {
            profile: profile.id.clone(),
            input_path: self.input.clone(),
            output_path: self.output.clone(),
            rows_loaded: table.height(),
            text_column: profile.text_column.clone(),
            ..Default::default()
        };
        info!(rows = summary.rows_loaded, columns = table.column_names().len(), "loaded");

        summary.columns_dropped = table.drop_columns(&profile.columns_to_drop)?;
        info!(dropped = ?summary.columns_dropped, "pruned columns");

        summary.rows_dropped_null = table.drop_nulls()?;
        info!(
            dropped = summary.rows_dropped_null,
            remaining = table.height(),
            "removed rows with nulls"
        );

        summary.rows_dropped_duplicate = table.drop_duplicate_ids(&profile.id_column)?;
        info!(
            dropped = summary.rows_dropped_duplicate,
            remaining = table.height(),
            "removed duplicate ids"
        );

        summary.columns_parsed =
            table.parse_structured_fields(&profile.structured_fields, &profile.named_fields)?;
        info!(parsed = ?summary.columns_parsed, "parsed structured fields");

        table.extract_text(&profile.text_fields, &profile.text_column)?;
        info!(column = %profile.text_column, "extracted combined text");

        summary.rows_written = table.height();
        Ok(summary)
    }
}
