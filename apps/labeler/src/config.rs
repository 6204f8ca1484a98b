use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::errors::AppError;
use crate::rubric::ResponseContract;

const DEFAULT_INPUT_CSV: &str = "comment_sheet.csv";
const DEFAULT_TEXT_COLUMN: &str = "body_text";
const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";
const DEFAULT_MAX_MODEL_LEN: u32 = 16384;
const DEFAULT_REQUEST_CHUNK: usize = 64;
const DEFAULT_LLM_BASE_URL: &str = "http://localhost:8000/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 3600;

/// Run configuration, built once at startup and passed into the pipeline.
/// Loaded from environment variables (and `.env` if present), then validated
/// before anything touches the input file or the model server.
#[derive(Debug, Clone)]
pub struct Config {
    pub contract: ResponseContract,
    pub input_csv: PathBuf,
    pub output_csv: PathBuf,
    pub text_column: String,
    pub model: String,
    pub max_model_len: u32,
    pub llm_base_url: String,
    pub llm_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub request_chunk_size: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from any key lookup. Unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let contract = match get("LABELER_CONTRACT") {
            Some(raw) => ResponseContract::from_str(&raw)
                .map_err(|e| anyhow!(e))
                .context("LABELER_CONTRACT is invalid")?,
            None => ResponseContract::default(),
        };

        Ok(Config {
            contract,
            input_csv: get("LABELER_INPUT_CSV")
                .unwrap_or_else(|| DEFAULT_INPUT_CSV.to_string())
                .into(),
            output_csv: get("LABELER_OUTPUT_CSV")
                .unwrap_or_else(|| contract.default_output_path().to_string())
                .into(),
            text_column: get("LABELER_TEXT_COLUMN")
                .unwrap_or_else(|| DEFAULT_TEXT_COLUMN.to_string()),
            model: get("LABELER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_model_len: parse_or(&get, "LABELER_MAX_MODEL_LEN", DEFAULT_MAX_MODEL_LEN)?,
            llm_base_url: get("LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            llm_api_key: get("LLM_API_KEY"),
            request_timeout_secs: parse_or(&get, "LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            request_chunk_size: parse_or(&get, "LABELER_REQUEST_CHUNK", DEFAULT_REQUEST_CHUNK)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Eager checks on required fields. Runs before any I/O beyond a stat of
    /// the input file.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.input_csv.as_os_str().is_empty() {
            return Err(AppError::Config("input CSV path is empty".to_string()));
        }
        if !self.input_csv.is_file() {
            return Err(AppError::Config(format!(
                "input CSV '{}' does not exist",
                self.input_csv.display()
            )));
        }
        if self.output_csv.as_os_str().is_empty() {
            return Err(AppError::Config("output CSV path is empty".to_string()));
        }
        if same_file(&self.output_csv, &self.input_csv) {
            return Err(AppError::Config(
                "output CSV must differ from input CSV".to_string(),
            ));
        }
        if self.text_column.trim().is_empty() {
            return Err(AppError::Config("text column name is empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(AppError::Config("model identifier is empty".to_string()));
        }
        if self.max_model_len == 0 {
            return Err(AppError::Config(
                "max model length must be positive".to_string(),
            ));
        }
        if self.request_chunk_size == 0 {
            return Err(AppError::Config(
                "request chunk size must be positive".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request timeout must be positive".to_string(),
            ));
        }
        let url = self.llm_base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "LLM base URL '{}' must start with http:// or https://",
                self.llm_base_url
            )));
        }
        Ok(())
    }
}

/// Compares two file paths after resolving their directories, so `./in.csv`
/// and `in.csv` are the same file. The file itself need not exist.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (resolved(a), resolved(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn resolved(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Some(dir.canonicalize().ok()?.join(name))
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow!("{key} must be a non-negative integer, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_structured_run() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.contract, ResponseContract::Structured);
        assert_eq!(config.input_csv, PathBuf::from("comment_sheet.csv"));
        assert_eq!(config.output_csv, PathBuf::from("rubric_0_shot.csv"));
        assert_eq!(config.text_column, "body_text");
        assert_eq!(config.model, "openai/gpt-oss-120b");
        assert_eq!(config.max_model_len, 16384);
        assert_eq!(config.request_chunk_size, 64);
        assert!(config.llm_api_key.is_none());
    }

    #[test]
    fn test_free_text_contract_changes_default_output() {
        let config = Config::from_lookup(lookup(&[("LABELER_CONTRACT", "few-shot")])).unwrap();
        assert_eq!(config.contract, ResponseContract::FreeText);
        assert_eq!(config.output_csv, PathBuf::from("rubric_many_shots.csv"));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config =
            Config::from_lookup(lookup(&[("LABELER_MODEL", "  "), ("LLM_API_KEY", "")])).unwrap();
        assert_eq!(config.model, "openai/gpt-oss-120b");
        assert!(config.llm_api_key.is_none());
    }

    #[test]
    fn test_unknown_contract_is_error() {
        let err = Config::from_lookup(lookup(&[("LABELER_CONTRACT", "json")])).unwrap_err();
        assert!(format!("{err:#}").contains("LABELER_CONTRACT"));
    }

    #[test]
    fn test_non_numeric_max_model_len_is_error() {
        let err =
            Config::from_lookup(lookup(&[("LABELER_MAX_MODEL_LEN", "lots")])).unwrap_err();
        assert!(err.to_string().contains("LABELER_MAX_MODEL_LEN"));
    }

    #[test]
    fn test_validate_accepts_existing_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.csv");
        std::fs::write(&input, "body_text\nhi\n").unwrap();
        let output = dir.path().join("out.csv");

        let config = Config::from_lookup(lookup(&[
            ("LABELER_INPUT_CSV", input.to_str().unwrap()),
            ("LABELER_OUTPUT_CSV", output.to_str().unwrap()),
        ]))
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("missing.csv");
        let config =
            Config::from_lookup(lookup(&[("LABELER_INPUT_CSV", input.to_str().unwrap())]))
                .unwrap();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_output_equal_to_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.csv");
        std::fs::write(&input, "body_text\n").unwrap();
        let path = input.to_str().unwrap();
        let config = Config::from_lookup(lookup(&[
            ("LABELER_INPUT_CSV", path),
            ("LABELER_OUTPUT_CSV", path),
        ]))
        .unwrap();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_output_aliasing_input() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let input = dir.path().join("in.csv");
        std::fs::write(&input, "body_text\n").unwrap();

        for alias in [
            dir.path().join(".").join("in.csv"),
            dir.path().join("sub").join("..").join("in.csv"),
        ] {
            let config = Config::from_lookup(lookup(&[
                ("LABELER_INPUT_CSV", input.to_str().unwrap()),
                ("LABELER_OUTPUT_CSV", alias.to_str().unwrap()),
            ]))
            .unwrap();
            assert!(
                matches!(config.validate(), Err(AppError::Config(_))),
                "{} should alias the input",
                alias.display()
            );
        }
    }

    #[test]
    fn test_same_file_resolves_directories() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.csv");
        assert!(same_file(&a, &dir.path().join(".").join("a.csv")));
        assert!(!same_file(&a, &dir.path().join("b.csv")));
        assert!(!same_file(&a, &dir.path().join("missing").join("a.csv")));
    }

    #[test]
    fn test_validate_rejects_zero_chunk_and_bad_url() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.csv");
        std::fs::write(&input, "body_text\n").unwrap();
        let path = input.to_str().unwrap();

        let mut config = Config::from_lookup(lookup(&[
            ("LABELER_INPUT_CSV", path),
            ("LABELER_OUTPUT_CSV", "out.csv"),
        ]))
        .unwrap();
        config.request_chunk_size = 0;
        assert!(config.validate().is_err());

        config.request_chunk_size = 8;
        config.llm_base_url = "localhost:8000".to_string();
        assert!(config.validate().is_err());
    }
}
