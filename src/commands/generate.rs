use std::path::PathBuf;

use anyhow::{Result, bail};

use super::transform::shuffler_for;
use crate::config::GenerationSettings;
use crate::ingest::{SourceDocument, load_document};
use crate::llm::prompts::{QUESTION_PROMPTS, SYSTEM_PROMPT};
use crate::llm::{OpenAiConversation, ensure_client};
use crate::output::ResponseWriter;
use crate::palette::Palette;
use crate::pipeline::{SavedResponse, run_pipeline};
use crate::transform::TransformOptions;
use crate::utils::pluralize;

#[derive(Clone, Debug)]
pub struct GenerateArgs {
    pub input: Option<PathBuf>,
    pub text: Option<String>,
    pub settings: GenerationSettings,
    pub seed: Option<u64>,
    pub strict: bool,
    pub assume_yes: bool,
}

pub fn load_source(input: Option<PathBuf>, text: Option<String>) -> Result<SourceDocument> {
    match (input, text) {
        (Some(path), None) => load_document(&path),
        (None, Some(text)) => SourceDocument::pasted(&text),
        (Some(_), Some(_)) => bail!("Pass either a file or --text, not both."),
        (None, None) => bail!("Please provide input before processing."),
    }
}

pub async fn run(args: GenerateArgs) -> Result<()> {
    args.settings.validate()?;
    let document = load_source(args.input, args.text)?;

    let prompt = format!(
        "\n{} will send {} ({}) to {} and request {}.",
        Palette::paint(Palette::INFO, "quizsmith"),
        Palette::paint(Palette::ACCENT, &document.prefix),
        document.describe(),
        Palette::paint(Palette::ACCENT, &args.settings.model),
        pluralize("question set", QUESTION_PROMPTS.len()),
    );
    let client = ensure_client(&prompt, !args.assume_yes)?;

    let writer = ResponseWriter::new(&args.settings.output_dir, &document.prefix);
    let mut chat = OpenAiConversation::new(client, args.settings.clone(), SYSTEM_PROMPT);
    let mut shuffler = shuffler_for(args.seed, false);
    let options = TransformOptions {
        strict: args.strict,
    };

    let saved = run_pipeline(
        &mut chat,
        &document,
        &writer,
        args.settings.transform_step,
        &options,
        shuffler.as_mut(),
    )
    .await?;

    print_summary(&saved, args.strict);
    Ok(())
}

fn print_summary(saved: &[SavedResponse], strict: bool) {
    for response in saved {
        println!(
            "{:>2} {:<24} {}",
            response.step,
            response.label,
            Palette::paint(Palette::ACCENT, response.path.display())
        );
        let Some(transformed) = &response.transformed else {
            continue;
        };
        let status = if transformed.failed {
            Palette::paint(Palette::DANGER, "diagnostic")
        } else {
            Palette::paint(Palette::SUCCESS, "transformed")
        };
        println!(
            "   {:<24} {}",
            status,
            Palette::paint(Palette::ACCENT, transformed.path.display())
        );
        if strict {
            for missing in &transformed.unmatched {
                println!(
                    "   {} record {}: blank {:?} does not occur in its text",
                    Palette::paint(Palette::WARNING, "warning:"),
                    missing.record,
                    missing.phrase
                );
            }
        }
    }
    println!(
        "{} Saved {}.",
        Palette::paint(Palette::SUCCESS, "Processing complete!"),
        pluralize("response", saved.len())
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_needs_exactly_one_input() {
        assert!(load_source(None, None).is_err());
        assert!(load_source(Some("a.txt".into()), Some("b".into())).is_err());

        let doc = load_source(None, Some("Bern ist die Bundesstadt.".into())).unwrap();
        assert_eq!(doc.prefix, "manual_input");
    }
}
