use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::ingest::{SourceContent, SourceDocument, image_data_url};
use crate::llm::prompts::{QUESTION_PROMPTS, WAIT_INSTRUCTION, initial_message};
use crate::llm::{ChatSession, TurnPart};
use crate::output::{ResponseWriter, TRANSFORMED_SUFFIX};
use crate::transform::{OptionShuffle, TransformOptions, UnmatchedBlank, transform_output_with};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedResponse {
    /// 0 for the upload acknowledgement, then the 1-based prompt step.
    pub step: usize,
    pub label: &'static str,
    pub path: PathBuf,
    pub transformed: Option<TransformedResponse>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformedResponse {
    pub path: PathBuf,
    pub failed: bool,
    pub unmatched: Vec<UnmatchedBlank>,
}

/// Uploads the document, walks through every question prompt and converts
/// the reply of `transform_step` into import documents.
///
/// Stops at the first failed request or write; earlier files stay on disk.
pub async fn run_pipeline<C, S>(
    chat: &mut C,
    document: &SourceDocument,
    writer: &ResponseWriter,
    transform_step: usize,
    options: &TransformOptions,
    shuffler: &mut S,
) -> Result<Vec<SavedResponse>>
where
    C: ChatSession,
    S: OptionShuffle + ?Sized,
{
    let mut saved = Vec::with_capacity(QUESTION_PROMPTS.len() + 1);

    info!(prefix = %document.prefix, "sending source document");
    let initial_text: String;
    let first_turn = match &document.content {
        SourceContent::Text(text) => {
            initial_text = initial_message(text);
            vec![TurnPart::Text(&initial_text)]
        }
        SourceContent::Image { bytes, mime_type } => vec![
            TurnPart::Image(image_data_url(bytes, mime_type)),
            TurnPart::Text(WAIT_INSTRUCTION),
        ],
    };
    let reply = chat
        .send_parts(&first_turn)
        .await
        .context("Failed to send the source document")?;
    saved.push(SavedResponse {
        step: 0,
        label: "initial",
        path: writer.save(&reply, 0, "")?,
        transformed: None,
    });

    for (step, prompt) in (1..).zip(QUESTION_PROMPTS.iter()) {
        info!(step, prompt = prompt.name, "requesting questions");
        let reply = chat
            .send(prompt.body)
            .await
            .with_context(|| format!("Failed to request {} questions", prompt.name))?;
        let path = writer.save(&reply, step, "")?;

        let transformed = if step == transform_step {
            let report = transform_output_with(&reply, options, shuffler);
            if report.failed {
                warn!(step, "reply could not be transformed, saving diagnostic");
            }
            Some(TransformedResponse {
                path: writer.save(&report.text, step, TRANSFORMED_SUFFIX)?,
                failed: report.failed,
                unmatched: report.unmatched,
            })
        } else {
            None
        };

        saved.push(SavedResponse {
            step,
            label: prompt.name,
            path,
            transformed,
        });
    }

    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::load_document;
    use crate::llm::prompts::BLANK_EXERCISE_STEP;
    use crate::transform::KeepOrder;
    use anyhow::bail;
    use std::collections::VecDeque;
    use std::fs;
    use tempfile::tempdir;

    const BLANKS_REPLY: &str = "```json\n[{\"page_number\":\"12\",\"subject\":\"Geo\",\"bloom_level\":\"Erinnern\",\"text\":\"Paris is the capital of France.\",\"blanks\":[\"Paris\",\"France\"],\"wrong_substitutes\":[\"Berlin\",\"Germany\"]}]\n```";

    /// Replays canned replies and records every turn, one string per part.
    struct ScriptedChat {
        replies: VecDeque<String>,
        sent: Vec<Vec<String>>,
    }

    impl ScriptedChat {
        fn with_blank_reply(blank_reply: &str) -> Self {
            let replies = (0..=QUESTION_PROMPTS.len())
                .map(|i| {
                    if i == BLANK_EXERCISE_STEP {
                        blank_reply.to_string()
                    } else {
                        format!("Typ\tSC\nTitle\tAntwort {i} für Straße")
                    }
                })
                .collect();
            Self {
                replies,
                sent: Vec::new(),
            }
        }
    }

    impl ChatSession for ScriptedChat {
        async fn send_parts(&mut self, parts: &[TurnPart<'_>]) -> Result<String> {
            let turn = parts
                .iter()
                .map(|part| match part {
                    TurnPart::Text(text) => text.to_string(),
                    TurnPart::Image(url) => url.clone(),
                })
                .collect();
            self.sent.push(turn);
            match self.replies.pop_front() {
                Some(reply) => Ok(reply),
                None => bail!("script exhausted"),
            }
        }
    }

    #[tokio::test]
    async fn saves_every_reply_and_transforms_blank_step() {
        let dir = tempdir().unwrap();
        let writer = ResponseWriter::new(dir.path(), "seite_12");
        let document = SourceDocument::pasted("Paris liegt in Frankreich.").unwrap();
        let mut chat = ScriptedChat::with_blank_reply(BLANKS_REPLY);

        let saved = run_pipeline(
            &mut chat,
            &document,
            &writer,
            BLANK_EXERCISE_STEP,
            &TransformOptions::default(),
            &mut KeepOrder,
        )
        .await
        .unwrap();

        assert_eq!(saved.len(), QUESTION_PROMPTS.len() + 1);
        assert_eq!(chat.sent.len(), QUESTION_PROMPTS.len() + 1);
        assert_eq!(chat.sent[0].len(), 1);
        assert!(chat.sent[0][0].starts_with("Paris liegt in Frankreich."));
        assert!(chat.sent[0][0].ends_with(WAIT_INSTRUCTION));
        assert_eq!(chat.sent[1], [QUESTION_PROMPTS[0].body]);

        let first = fs::read_to_string(&saved[1].path).unwrap();
        assert_eq!(first, "Typ\tSC\nTitle\tAntwort 1 für Strasse");

        let transformed: Vec<_> = saved.iter().filter_map(|s| s.transformed.as_ref()).collect();
        assert_eq!(transformed.len(), 1);
        let blank_step = &saved[BLANK_EXERCISE_STEP];
        let report = blank_step.transformed.as_ref().unwrap();
        assert!(!report.failed);
        assert_eq!(
            report.path,
            dir.path().join("seite_12_response_6_transformed.txt")
        );
        let text = fs::read_to_string(&report.path).unwrap();
        assert!(text.starts_with("Type\tInlinechoice\n"));
        assert!(text.contains("\n---\nType\tFIB\n"));
        assert!(text.contains("1\tParis|France|Berlin|Germany\tParis\t|"));
    }

    #[tokio::test]
    async fn image_page_is_sent_inline_before_wait_instruction() {
        let dir = tempdir().unwrap();
        let page = dir.path().join("seite_107.png");
        fs::write(&page, b"page").unwrap();
        let document = load_document(&page).unwrap();
        let writer = ResponseWriter::new(dir.path(), &document.prefix);
        let mut chat = ScriptedChat::with_blank_reply(BLANKS_REPLY);

        let saved = run_pipeline(
            &mut chat,
            &document,
            &writer,
            BLANK_EXERCISE_STEP,
            &TransformOptions::default(),
            &mut KeepOrder,
        )
        .await
        .unwrap();

        assert_eq!(
            chat.sent[0],
            ["data:image/png;base64,cGFnZQ==", WAIT_INSTRUCTION]
        );
        assert_eq!(chat.sent[1], [QUESTION_PROMPTS[0].body]);
        assert_eq!(saved[0].path, dir.path().join("seite_107_response_0.txt"));
    }

    #[tokio::test]
    async fn malformed_blank_reply_is_saved_as_diagnostic() {
        let dir = tempdir().unwrap();
        let writer = ResponseWriter::new(dir.path(), "manual_input");
        let document = SourceDocument::pasted("Bern").unwrap();
        let mut chat = ScriptedChat::with_blank_reply("Leider kann ich das nicht.");

        let saved = run_pipeline(
            &mut chat,
            &document,
            &writer,
            BLANK_EXERCISE_STEP,
            &TransformOptions::default(),
            &mut KeepOrder,
        )
        .await
        .unwrap();

        let report = saved[BLANK_EXERCISE_STEP].transformed.as_ref().unwrap();
        assert!(report.failed);
        let text = fs::read_to_string(&report.path).unwrap();
        assert!(text.starts_with("Error parsing JSON: "));
        assert!(text.ends_with("Original input:\nLeider kann ich das nicht."));
    }

    #[tokio::test]
    async fn stops_on_first_failed_request() {
        let dir = tempdir().unwrap();
        let writer = ResponseWriter::new(dir.path(), "kurz");
        let document = SourceDocument::pasted("Bern").unwrap();
        let mut chat = ScriptedChat {
            replies: VecDeque::from(vec!["ok".to_string(), "SC".to_string()]),
            sent: Vec::new(),
        };

        let err = run_pipeline(
            &mut chat,
            &document,
            &writer,
            BLANK_EXERCISE_STEP,
            &TransformOptions::default(),
            &mut KeepOrder,
        )
        .await
        .unwrap_err();

        assert!(format!("{err:#}").contains("multiple choice"));
        assert!(writer.path_for(1, "").exists());
        assert!(!writer.path_for(2, "").exists());
    }
}
