//! Response collection: turns per-row generations into output cells.
//!
//! Failures stay inside the row. An empty generation or unparseable JSON
//! degrades that row to null labels plus a reason; it never aborts the batch.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::debug;

use crate::llm_client::strip_json_fences;
use crate::rubric::ResponseContract;

/// Reason recorded when the structured contract gets no generation for a row.
pub const EMPTY_OUTPUT_REASON: &str = "LLM returned empty output";
/// Label recorded when the free-text contract gets no generation for a row.
pub const EMPTY_OUTPUT_LABEL: &str = "ERROR:EMPTY_OUTPUT";

/// The six-field classification the structured contract asks for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VoiceLabels {
    pub individual_voice: bool,
    pub collective_voice: bool,
    pub internal_deliberation: bool,
    pub align_with_company: bool,
    pub none_of_the_above: bool,
    pub reason: String,
}

/// Outcome for a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowLabels {
    Structured {
        /// Trimmed generation, or empty when nothing was generated.
        raw: String,
        /// Parsed labels, or the reason they are missing.
        parsed: Result<VoiceLabels, String>,
    },
    FreeText {
        label: String,
    },
}

impl RowLabels {
    /// Interprets one structured generation.
    pub fn structured(output: Option<&str>) -> Self {
        let Some(text) = output else {
            return RowLabels::Structured {
                raw: String::new(),
                parsed: Err(EMPTY_OUTPUT_REASON.to_string()),
            };
        };

        let raw = text.trim().to_string();
        let parsed = serde_json::from_str::<VoiceLabels>(strip_json_fences(&raw))
            .map_err(|e| format!("JSON parse error: {e}"));

        RowLabels::Structured { raw, parsed }
    }

    /// Interprets one free-text generation.
    pub fn free_text(output: Option<&str>) -> Self {
        RowLabels::FreeText {
            label: output
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| EMPTY_OUTPUT_LABEL.to_string()),
        }
    }

    /// True when the row produced usable labels.
    pub fn is_labeled(&self) -> bool {
        match self {
            RowLabels::Structured { parsed, .. } => parsed.is_ok(),
            RowLabels::FreeText { label } => label != EMPTY_OUTPUT_LABEL,
        }
    }

    /// True when the model produced nothing for this row.
    pub fn is_empty_output(&self) -> bool {
        match self {
            RowLabels::Structured { raw, parsed } => {
                raw.is_empty()
                    && parsed.as_ref().err().map(String::as_str) == Some(EMPTY_OUTPUT_REASON)
            }
            RowLabels::FreeText { label } => label == EMPTY_OUTPUT_LABEL,
        }
    }

    /// Output cells, aligned with `ResponseContract::output_columns()`.
    /// Booleans render as `True`/`False`; missing labels as empty cells.
    pub fn cells(&self) -> Vec<String> {
        match self {
            RowLabels::Structured { raw, parsed } => {
                let mut cells = Vec::with_capacity(7);
                cells.push(raw.clone());
                match parsed {
                    Ok(labels) => {
                        cells.extend(
                            [
                                labels.individual_voice,
                                labels.collective_voice,
                                labels.internal_deliberation,
                                labels.align_with_company,
                                labels.none_of_the_above,
                            ]
                            .into_iter()
                            .map(render_bool),
                        );
                        cells.push(labels.reason.clone());
                    }
                    Err(reason) => {
                        cells.extend(std::iter::repeat(String::new()).take(5));
                        cells.push(reason.clone());
                    }
                }
                cells
            }
            RowLabels::FreeText { label } => vec![label.clone()],
        }
    }
}

fn render_bool(value: bool) -> String {
    let rendered = if value { "True" } else { "False" };
    rendered.to_string()
}

/// Collects every generation in input order under the given contract.
pub fn collect_labels(contract: ResponseContract, outputs: &[Option<String>]) -> Vec<RowLabels> {
    let progress = ProgressBar::new(outputs.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{msg}: {bar:40} {pos}/{len} [{elapsed_precise}]")
    {
        progress.set_style(style);
    }
    progress.set_message("Collecting labels");

    let rows = outputs
        .iter()
        .enumerate()
        .map(|(row, output)| {
            let labels = match contract {
                ResponseContract::Structured => RowLabels::structured(output.as_deref()),
                ResponseContract::FreeText => RowLabels::free_text(output.as_deref()),
            };
            if let RowLabels::Structured { parsed: Err(reason), .. } = &labels {
                debug!("Row {}: {}", row, reason);
            }
            progress.inc(1);
            labels
        })
        .collect();

    progress.finish_and_clear();
    rows
}
