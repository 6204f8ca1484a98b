//! Rubric: prompt assembly and the response contract that decides how model
//! output is interpreted.
//!
//! Two contracts share one pipeline:
//! - `Structured`: zero-shot rubric, JSON-schema constrained decoding, parsed labels.
//! - `FreeText`: few-shot rubric, unconstrained decoding, raw label text.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use crate::llm_client::SamplingParams;

pub mod labels;
pub mod prompts;

use prompts::{
    COMMENT_DELIMITER, FEW_SHOT_INSTRUCTIONS, FREE_TEXT_DIRECTIVE, STRUCTURED_DIRECTIVE,
    ZERO_SHOT_INSTRUCTIONS,
};

/// Greedy decoding.
pub const TEMPERATURE: f32 = 0.0;
pub const MAX_OUTPUT_TOKENS: u32 = 256;

/// Result columns written by the structured contract, in output order.
pub const STRUCTURED_COLUMNS: &[&str] = &[
    "voice_label_raw_json",
    "individual_voice",
    "collective_voice",
    "internal_deliberation",
    "align_with_company",
    "none_of_the_above",
    "reason",
];

/// Result column written by the free-text contract.
pub const FREE_TEXT_COLUMNS: &[&str] = &["voice_label"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseContract {
    /// Output is constrained to the six-field schema and parsed.
    #[default]
    Structured,
    /// Output is stored verbatim (trimmed).
    FreeText,
}

impl ResponseContract {
    pub fn instructions(&self) -> &'static str {
        match self {
            ResponseContract::Structured => ZERO_SHOT_INSTRUCTIONS,
            ResponseContract::FreeText => FEW_SHOT_INSTRUCTIONS,
        }
    }

    pub fn closing_directive(&self) -> &'static str {
        match self {
            ResponseContract::Structured => STRUCTURED_DIRECTIVE,
            ResponseContract::FreeText => FREE_TEXT_DIRECTIVE,
        }
    }

    pub fn sampling_params(&self) -> SamplingParams {
        SamplingParams {
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
            json_schema: match self {
                ResponseContract::Structured => Some(label_schema()),
                ResponseContract::FreeText => None,
            },
        }
    }

    pub fn output_columns(&self) -> &'static [&'static str] {
        match self {
            ResponseContract::Structured => STRUCTURED_COLUMNS,
            ResponseContract::FreeText => FREE_TEXT_COLUMNS,
        }
    }

    pub fn default_output_path(&self) -> &'static str {
        match self {
            ResponseContract::Structured => "rubric_0_shot.csv",
            ResponseContract::FreeText => "rubric_many_shots.csv",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseContract::Structured => "structured",
            ResponseContract::FreeText => "free-text",
        }
    }
}

impl fmt::Display for ResponseContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseContract {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "structured" | "zero-shot" | "zero_shot" => Ok(ResponseContract::Structured),
            "free-text" | "free_text" | "few-shot" | "few_shot" => Ok(ResponseContract::FreeText),
            other => Err(format!(
                "unknown response contract '{other}' (expected 'structured' or 'free-text')"
            )),
        }
    }
}

/// Concatenates instructions, delimiter, comment text and directive.
/// No escaping or truncation: the text goes in exactly as read.
pub fn build_prompt(instructions: &str, text: &str, directive: &str) -> String {
    let mut prompt = String::with_capacity(
        instructions.len() + COMMENT_DELIMITER.len() + text.len() + directive.len(),
    );
    prompt.push_str(instructions);
    prompt.push_str(COMMENT_DELIMITER);
    prompt.push_str(text);
    prompt.push_str(directive);
    prompt
}

/// One prompt per text, in input order.
pub fn build_prompts(contract: ResponseContract, texts: &[String]) -> Vec<String> {
    let instructions = contract.instructions();
    let directive = contract.closing_directive();
    texts
        .iter()
        .map(|text| build_prompt(instructions, text, directive))
        .collect()
}

/// JSON schema for constrained decoding: five booleans and a reason, nothing else.
pub fn label_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "individual_voice": {"type": "boolean"},
            "collective_voice": {"type": "boolean"},
            "internal_deliberation": {"type": "boolean"},
            "align_with_company": {"type": "boolean"},
            "none_of_the_above": {"type": "boolean"},
            "reason": {"type": "string"}
        },
        "required": [
            "individual_voice",
            "collective_voice",
            "internal_deliberation",
            "align_with_company",
            "none_of_the_above",
            "reason"
        ],
        "additionalProperties": false
    })
}
