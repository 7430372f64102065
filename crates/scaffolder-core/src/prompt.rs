//! Prompting capability used by the pipeline
//!
//! The pipeline never talks to a terminal directly. It asks questions through
//! [`Prompter`], which the `tui` feature implements with cliclack and tests
//! implement with [`ScriptedPrompter`].

use anyhow::Result;
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Post-input transform applied to an answer
pub type Filter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Answer predicate; `Err` carries the message shown to the user
pub type Validator = Arc<dyn Fn(&str) -> std::result::Result<(), String> + Send + Sync>;

/// Entry of a single-select list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Item(String),
    /// Visual divider, never selectable
    Separator,
}

impl Choice {
    pub fn item(label: impl Into<String>) -> Self {
        Self::Item(label.into())
    }

    pub fn is_selectable(&self) -> bool {
        matches!(self, Choice::Item(_))
    }
}

/// Free-text question
#[derive(Clone)]
pub struct InputQuestion {
    pub key: String,
    pub message: String,
    pub default: Option<String>,
    pub validate: Option<Validator>,
    pub filter: Option<Filter>,
}

impl InputQuestion {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
            default: None,
            validate: None,
            filter: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_validate(mut self, validate: Validator) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Turn a raw answer into the final one: empty input falls back to the
    /// default, then the filter runs, then the validator judges the result.
    pub fn finish(&self, raw: &str) -> std::result::Result<String, String> {
        let answer = if raw.is_empty() {
            self.default.clone().unwrap_or_default()
        } else {
            raw.to_string()
        };
        let answer = match &self.filter {
            Some(filter) => filter(&answer),
            None => answer,
        };
        if let Some(validate) = &self.validate {
            validate(&answer)?;
        }
        Ok(answer)
    }
}

/// Interactive question capability
pub trait Prompter {
    /// Ask the user to pick one of `choices`; returns the index of the picked
    /// entry, which is always a [`Choice::Item`]
    fn select(&self, message: &str, choices: &[Choice]) -> Result<usize>;

    /// Ask one free-text question; the returned answer has already been
    /// filtered and validated
    fn input(&self, question: &InputQuestion) -> Result<String>;

    /// Ask a batch of free-text questions, keyed by question key
    fn inputs(&self, questions: &[InputQuestion]) -> Result<IndexMap<String, String>> {
        let mut answers = IndexMap::new();
        for question in questions {
            let answer = self.input(question)?;
            answers.insert(question.key.clone(), answer);
        }
        Ok(answers)
    }
}

/// Pre-recorded answer for [`ScriptedPrompter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Pick the n-th selectable entry (separators are skipped when counting)
    Select(usize),
    /// Type this text; empty text accepts the default
    Text(String),
}

/// Record of a question the scripted prompter was asked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asked {
    pub message: String,
    pub default: Option<String>,
    pub choices: Vec<Choice>,
}

/// Non-interactive prompter replaying a fixed list of answers
///
/// Rejected text answers consume the next scripted answer, like a user
/// typing again. Running out of answers is an error.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<Asked>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Questions asked so far, in order
    pub fn asked(&self) -> Vec<Asked> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// Number of scripted answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.lock().map(|a| a.len()).unwrap_or_default()
    }

    fn next_answer(&self, message: &str) -> Result<Answer> {
        self.answers
            .lock()
            .map_err(|_| anyhow::anyhow!("scripted prompter poisoned"))?
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted answer left for '{}'", message))
    }

    fn record(&self, asked: Asked) {
        if let Ok(mut log) = self.asked.lock() {
            log.push(asked);
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&self, message: &str, choices: &[Choice]) -> Result<usize> {
        self.record(Asked {
            message: message.to_string(),
            default: None,
            choices: choices.to_vec(),
        });

        match self.next_answer(message)? {
            Answer::Select(n) => choices
                .iter()
                .enumerate()
                .filter(|(_, c)| c.is_selectable())
                .nth(n)
                .map(|(idx, _)| idx)
                .ok_or_else(|| anyhow::anyhow!("no selectable choice #{} for '{}'", n, message)),
            Answer::Text(text) => {
                anyhow::bail!("expected a selection for '{}', got text '{}'", message, text)
            }
        }
    }

    fn input(&self, question: &InputQuestion) -> Result<String> {
        self.record(Asked {
            message: question.message.clone(),
            default: question.default.clone(),
            choices: Vec::new(),
        });

        loop {
            let raw = match self.next_answer(&question.message)? {
                Answer::Text(text) => text,
                Answer::Select(n) => anyhow::bail!(
                    "expected text for '{}', got selection #{}",
                    question.message,
                    n
                ),
            };
            match question.finish(&raw) {
                Ok(answer) => return Ok(answer),
                Err(_) => continue,
            }
        }
    }
}
