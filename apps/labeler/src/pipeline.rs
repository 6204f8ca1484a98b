//! Labeling run: orchestrates one pass over the input sheet.
//!
//! Flow: read CSV → extract text column → build prompts → batch generate →
//!       collect labels → append result columns → write CSV.
//!
//! Row-level failures (empty output, bad JSON) are recorded in the row.
//! Only setup failures and a generator that breaks the one-result-per-prompt
//! contract abort the run.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::{LlmError, TextGenerator};
use crate::rubric::labels::{collect_labels, RowLabels};
use crate::rubric::{build_prompts, ResponseContract};
use crate::table::{ensure_output_dir, Table};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub labeled: usize,
    pub parse_failures: usize,
    pub empty_outputs: usize,
}

impl RunSummary {
    fn from_rows(rows: &[RowLabels]) -> Self {
        let mut summary = RunSummary {
            rows: rows.len(),
            ..Default::default()
        };
        for row in rows {
            if row.is_labeled() {
                summary.labeled += 1;
            } else if row.is_empty_output() {
                summary.empty_outputs += 1;
            } else {
                summary.parse_failures += 1;
            }
        }
        summary
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

pub struct Labeler {
    config: Config,
    generator: Arc<dyn TextGenerator>,
}

impl Labeler {
    pub fn new(config: Config, generator: Arc<dyn TextGenerator>) -> Self {
        Self { config, generator }
    }

    pub fn contract(&self) -> ResponseContract {
        self.config.contract
    }

    /// Runs the full pipeline and writes the output CSV.
    ///
    /// Steps:
    /// 1. check the output directory, load the input, find the text column
    /// 2. build one prompt per row and submit them as a single batch
    /// 3. interpret each result under the configured contract
    /// 4. append (or overwrite) the result columns and save atomically
    ///
    /// Nothing is written if any step before the save fails.
    pub async fn run(&self) -> Result<RunSummary, AppError> {
        let contract = self.config.contract;

        // Step 1: inputs
        ensure_output_dir(&self.config.output_csv)?;
        let mut table = Table::read_csv(&self.config.input_csv)?;
        let texts = table.text_column(&self.config.text_column)?;
        info!(
            "Loaded {} rows from {} (text column: '{}')",
            table.len(),
            self.config.input_csv.display(),
            self.config.text_column
        );
        debug!("Input columns: {:?}", table.headers());
        if table.is_empty() {
            warn!("Input has no data rows; writing headers only");
        }

        // Step 2: generate
        let prompts = build_prompts(contract, &texts);
        let params = contract.sampling_params();
        info!(
            "Submitting {} prompts (contract: {}, max_tokens: {})",
            prompts.len(),
            contract,
            params.max_tokens
        );
        let outputs = self.generator.generate(&prompts, &params).await?;
        if outputs.len() != prompts.len() {
            return Err(LlmError::ResultCountMismatch {
                expected: prompts.len(),
                actual: outputs.len(),
            }
            .into());
        }

        // Step 3: interpret
        let rows = collect_labels(contract, &outputs);
        let summary = RunSummary::from_rows(&rows);
        if summary.parse_failures > 0 || summary.empty_outputs > 0 {
            warn!(
                "{} rows without labels ({} empty outputs, {} parse failures)",
                summary.parse_failures + summary.empty_outputs,
                summary.empty_outputs,
                summary.parse_failures
            );
        }

        // Step 4: save
        for (column, values) in contract
            .output_columns()
            .iter()
            .zip(transpose_cells(&rows, contract.output_columns().len()))
        {
            table.set_column(column, values)?;
        }
        table.write_csv(&self.config.output_csv)?;

        info!(
            "Labeled {}/{} rows → {}",
            summary.labeled,
            summary.rows,
            self.config.output_csv.display()
        );
        Ok(summary)
    }
}

/// Turns per-row cells into per-column vectors.
fn transpose_cells(rows: &[RowLabels], width: usize) -> Vec<Vec<String>> {
    let mut columns: Vec<Vec<String>> = (0..width)
        .map(|_| Vec::with_capacity(rows.len()))
        .collect();
    for row in rows {
        for (column, cell) in columns.iter_mut().zip(row.cells()) {
            column.push(cell);
        }
    }
    columns
}
