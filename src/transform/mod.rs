//! Re-encodes blank exercises from the generation step into the
//! tab-delimited Inline-Choice and FIB import formats.

pub mod blanks;
pub mod render;
pub mod sanitize;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::exercise::ExerciseRecord;

pub use blanks::{SplitPassage, split_passage};
pub use render::{KeepOrder, OptionShuffle, RandomOrder, render_fib, render_inline_choice};
pub use sanitize::clean_json_text;

pub const DOCUMENT_SEPARATOR: &str = "---";

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("{source}")]
    MalformedInput {
        #[source]
        source: serde_json::Error,
        cleaned: String,
    },
    #[error("record {record}: {source}")]
    UnexpectedShape {
        record: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl TransformError {
    /// Human readable report handed back in place of the documents.
    pub fn diagnostic(&self, raw: &str) -> String {
        match self {
            TransformError::MalformedInput { source, cleaned } => format!(
                "Error parsing JSON: {source}\n\nCleaned input:\n{cleaned}\n\nOriginal input:\n{raw}"
            ),
            TransformError::UnexpectedShape { .. } => {
                format!("Error processing input: {self}\n\nOriginal input:\n{raw}")
            }
        }
    }
}

/// Either raw model output or JSON that was already parsed by the caller.
#[derive(Clone, Debug)]
pub enum ExerciseSource<'a> {
    Text(&'a str),
    Json(Value),
}

impl<'a> From<&'a str> for ExerciseSource<'a> {
    fn from(value: &'a str) -> Self {
        ExerciseSource::Text(value)
    }
}

impl From<Value> for ExerciseSource<'_> {
    fn from(value: Value) -> Self {
        ExerciseSource::Json(value)
    }
}

pub fn decode_exercises<'a>(
    source: impl Into<ExerciseSource<'a>>,
) -> Result<Vec<ExerciseRecord>, TransformError> {
    let objects: Vec<Map<String, Value>> = match source.into() {
        ExerciseSource::Text(raw) => {
            let cleaned = clean_json_text(raw);
            serde_json::from_str(cleaned).map_err(|source| TransformError::MalformedInput {
                source,
                cleaned: cleaned.to_string(),
            })?
        }
        ExerciseSource::Json(value) => {
            let cleaned = value.to_string();
            serde_json::from_value(value)
                .map_err(|source| TransformError::MalformedInput { source, cleaned })?
        }
    };

    objects
        .into_iter()
        .enumerate()
        .map(|(record, object)| {
            serde_json::from_value(Value::Object(object))
                .map_err(|source| TransformError::UnexpectedShape { record, source })
        })
        .collect()
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TransformOptions {
    /// Report every blank phrase that could not be located in its passage.
    pub strict: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnmatchedBlank {
    pub record: usize,
    pub phrase: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Documents {
    pub inline_choice: String,
    pub fib: String,
    pub unmatched: Vec<UnmatchedBlank>,
}

impl Documents {
    /// Inline-Choice first, then the separator line, then FIB.
    pub fn combined(&self) -> String {
        format!(
            "{}\n{DOCUMENT_SEPARATOR}\n{}",
            self.inline_choice, self.fib
        )
    }
}

/// Renders every record into both formats, in input order.
pub fn assemble_documents<S>(records: &[ExerciseRecord], shuffler: &mut S) -> Documents
where
    S: OptionShuffle + ?Sized,
{
    let mut fib = Vec::with_capacity(records.len());
    let mut inline_choice = Vec::with_capacity(records.len());
    let mut unmatched = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let split = split_passage(&record.text, &record.blanks);
        debug!(
            record = index,
            declared = record.declared_blanks(),
            matched = split.matched_count(),
            "split passage"
        );

        let mut options = record.option_pool();
        shuffler.shuffle_options(&mut options);

        fib.push(render_fib(record, &split));
        inline_choice.push(render_inline_choice(record, &split, &options));
        unmatched.extend(split.unmatched.iter().map(|phrase| UnmatchedBlank {
            record: index,
            phrase: phrase.to_string(),
        }));
    }

    Documents {
        inline_choice: inline_choice.join("\n\n"),
        fib: fib.join("\n\n"),
        unmatched,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformReport {
    pub text: String,
    pub unmatched: Vec<UnmatchedBlank>,
    /// `text` holds a diagnostic instead of documents.
    pub failed: bool,
}

/// Transforms raw model output, shuffling options with the thread-local RNG.
///
/// Never fails: malformed input comes back as a diagnostic string.
pub fn transform_output(raw: &str) -> String {
    transform_output_with(raw, &TransformOptions::default(), &mut RandomOrder(rand::rng())).text
}

pub fn transform_output_with<S>(
    raw: &str,
    options: &TransformOptions,
    shuffler: &mut S,
) -> TransformReport
where
    S: OptionShuffle + ?Sized,
{
    let records = match decode_exercises(raw) {
        Ok(records) => records,
        Err(err) => {
            warn!(error = %err, "could not decode blank exercises");
            return TransformReport {
                text: err.diagnostic(raw),
                unmatched: Vec::new(),
                failed: true,
            };
        }
    };

    let documents = assemble_documents(&records, shuffler);
    for missing in &documents.unmatched {
        if options.strict {
            warn!(record = missing.record, phrase = %missing.phrase, "blank not found in passage");
        } else {
            debug!(record = missing.record, phrase = %missing.phrase, "blank not found in passage");
        }
    }

    TransformReport {
        text: documents.combined(),
        unmatched: documents.unmatched,
        failed: false,
    }
}
