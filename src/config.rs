use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::llm::prompts::{BLANK_EXERCISE_STEP, QUESTION_PROMPTS};
use crate::output::DEFAULT_OUTPUT_DIR;

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

pub const MODEL_ENV: &str = "QUIZSMITH_MODEL";
pub const OUTPUT_DIR_ENV: &str = "QUIZSMITH_OUTPUT_DIR";

#[derive(Clone, Debug, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    /// `None` leaves the model default in place (some reasoning models reject it).
    pub temperature: Option<f32>,
    pub max_output_tokens: u32,
    pub output_dir: PathBuf,
    /// 1-based index of the prompt whose reply holds the blank-exercise JSON.
    pub transform_step: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: Some(DEFAULT_TEMPERATURE),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            transform_step: BLANK_EXERCISE_STEP,
        }
    }
}

impl GenerationSettings {
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            bail!("Model name must not be empty");
        }
        if !(1..=QUESTION_PROMPTS.len()).contains(&self.transform_step) {
            bail!(
                "Transform step must be between 1 and {}, got {}",
                QUESTION_PROMPTS.len(),
                self.transform_step
            );
        }
        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            bail!("Temperature must be between 0.0 and 2.0, got {temperature}");
        }
        if self.max_output_tokens == 0 {
            bail!("Max output tokens must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = GenerationSettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.transform_step, 6);
        assert_eq!(settings.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let step = GenerationSettings {
            transform_step: 0,
            ..Default::default()
        };
        assert!(step.validate().is_err());

        let step = GenerationSettings {
            transform_step: QUESTION_PROMPTS.len() + 1,
            ..Default::default()
        };
        assert!(step.validate().is_err());

        let hot = GenerationSettings {
            temperature: Some(2.5),
            ..Default::default()
        };
        assert!(hot.validate().is_err());

        let unset = GenerationSettings {
            temperature: None,
            ..Default::default()
        };
        assert!(unset.validate().is_ok());
    }
}
