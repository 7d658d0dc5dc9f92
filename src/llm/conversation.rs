use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{
        CreateResponseArgs, ImageDetail, InputContent, InputImageContent, InputMessage, InputRole,
        OutputItem, OutputMessageContent, Response,
    },
};
use tracing::debug;

use crate::config::GenerationSettings;
use crate::utils::trim_line;

/// One piece of a user turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnPart<'a> {
    Text(&'a str),
    /// Image given as a URL, usually an inline `data:` URL.
    Image(String),
}

/// A chat whose history is kept by the implementation; each call sends one
/// user turn and returns the reply text.
#[allow(async_fn_in_trait)]
pub trait ChatSession {
    async fn send_parts(&mut self, parts: &[TurnPart<'_>]) -> Result<String>;

    async fn send(&mut self, message: &str) -> Result<String> {
        self.send_parts(&[TurnPart::Text(message)]).await
    }
}

/// Conversation over the Responses API, chained by `previous_response_id`.
pub struct OpenAiConversation {
    client: Client<OpenAIConfig>,
    settings: GenerationSettings,
    system_prompt: String,
    previous_response_id: Option<String>,
}

impl OpenAiConversation {
    pub fn new(
        client: Client<OpenAIConfig>,
        settings: GenerationSettings,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            client,
            settings,
            system_prompt: system_prompt.into(),
            previous_response_id: None,
        }
    }

    fn input_for(&self, parts: &[TurnPart<'_>]) -> Vec<InputMessage> {
        let mut input = Vec::with_capacity(2);
        // Later turns inherit the instruction through the chained response.
        if self.previous_response_id.is_none() {
            input.push(InputMessage {
                role: InputRole::System,
                content: vec![self.system_prompt.as_str().into()],
                status: None,
            });
        }
        input.push(InputMessage {
            role: InputRole::User,
            content: parts.iter().map(input_content).collect(),
            status: None,
        });
        input
    }
}

fn input_content(part: &TurnPart<'_>) -> InputContent {
    match part {
        TurnPart::Text(text) => (*text).into(),
        TurnPart::Image(url) => InputContent::InputImage(InputImageContent {
            detail: ImageDetail::Auto,
            file_id: None,
            image_url: Some(url.clone()),
        }),
    }
}

impl ChatSession for OpenAiConversation {
    async fn send_parts(&mut self, parts: &[TurnPart<'_>]) -> Result<String> {
        let mut args = CreateResponseArgs::default();
        args.model(&self.settings.model)
            .max_output_tokens(self.settings.max_output_tokens)
            .input(self.input_for(parts));
        if let Some(temperature) = self.settings.temperature {
            args.temperature(temperature);
        }
        if let Some(previous) = &self.previous_response_id {
            args.previous_response_id(previous.clone());
        }
        let request = args.build()?;

        let response = self
            .client
            .responses()
            .create(request)
            .await
            .context("Failed to get response from LLM")?;

        debug!(id = %response.id, parts = parts.len(), "received response");
        self.previous_response_id = Some(response.id.clone());
        reply_text(response)
    }
}

/// First non-blank text the model produced.
fn reply_text(response: Response) -> Result<String> {
    response
        .output
        .into_iter()
        .filter_map(|item| match item {
            OutputItem::Message(message) => Some(message.content),
            _ => None,
        })
        .flatten()
        .find_map(|content| match content {
            OutputMessageContent::OutputText(output) => trim_line(&output.text).map(str::to_string),
            _ => None,
        })
        .context("No text output returned from model")
}
