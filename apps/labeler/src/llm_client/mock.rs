//! In-memory `TextGenerator` for tests. Returns canned text and records every call.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmError, SamplingParams, TextGenerator};

type Responder = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

enum Reply {
    PerPrompt(Responder),
    /// Returned as-is regardless of how many prompts were sent.
    Fixed(Vec<Option<String>>),
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompts: Vec<String>,
    pub params: SamplingParams,
}

pub struct MockGenerator {
    reply: Reply,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGenerator {
    /// Answers each prompt through `respond`.
    pub fn new(respond: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            reply: Reply::PerPrompt(Box::new(respond)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers every prompt with the same text.
    pub fn always(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Some(text.clone()))
    }

    /// Produces no content for any prompt.
    pub fn empty() -> Self {
        Self::new(|_| None)
    }

    /// Returns exactly `results`, ignoring the prompts.
    pub fn fixed(results: Vec<Option<String>>) -> Self {
        Self {
            reply: Reply::Fixed(results),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        prompts: &[String],
        params: &SamplingParams,
    ) -> Result<Vec<Option<String>>, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompts: prompts.to_vec(),
            params: params.clone(),
        });

        Ok(match &self.reply {
            Reply::PerPrompt(respond) => prompts.iter().map(|p| respond(p)).collect(),
            Reply::Fixed(results) => results.clone(),
        })
    }
}
