use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;

pub const NOT_AVAILABLE: &str = "N/A";

/// One blank-style exercise as produced by the generation step.
///
/// Labels fall back to `"N/A"` when absent or `null`. `text` is required,
/// both phrase lists default to empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseRecord {
    #[serde(default = "not_available", deserialize_with = "label")]
    pub page_number: String,
    #[serde(default = "not_available", deserialize_with = "label")]
    pub subject: String,
    #[serde(default = "not_available", deserialize_with = "label")]
    pub bloom_level: String,
    pub text: String,
    #[serde(default)]
    pub blanks: Vec<String>,
    #[serde(default)]
    pub wrong_substitutes: Vec<String>,
}

impl ExerciseRecord {
    /// Number of blanks the record asks for, whether or not they occur in `text`.
    pub fn declared_blanks(&self) -> usize {
        self.blanks.len()
    }

    /// `blanks` followed by `wrong_substitutes`, the inline-choice option pool.
    pub fn option_pool(&self) -> Vec<String> {
        self.blanks
            .iter()
            .chain(self.wrong_substitutes.iter())
            .cloned()
            .collect()
    }
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

// Models sometimes emit page numbers as JSON numbers.
fn label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(not_available()),
        Some(Value::String(value)) => Ok(value),
        Some(Value::Number(value)) => Ok(value.to_string()),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or number label, found {other}"
        ))),
    }
}
