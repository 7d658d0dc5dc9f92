use anyhow::{Context, Result, anyhow, bail};
use async_openai::{Client, config::OpenAIConfig};

use super::secrets::{
    API_KEY_ENV, ApiKeySource, prompt_for_api_key, resolve_api_key, store_api_key,
};
use crate::utils::ask_yn;

/// Builds a client from the configured key, prompting for one when none is set.
///
/// With `confirm`, a stored key is only used after the user agrees to send
/// the document to the API.
pub fn ensure_client(user_prompt: &str, confirm: bool) -> Result<Client<OpenAIConfig>> {
    let key = match resolve_api_key()? {
        Some(resolved) => {
            if confirm && !ask_yn(user_prompt.to_string())? {
                bail!("Generation cancelled.");
            }
            resolved.key
        }
        None => {
            let key = prompt_for_api_key(user_prompt)?;
            if key.is_empty() {
                bail!(
                    "No API key provided. Set {} or run `quizsmith llm --set <KEY>`.",
                    API_KEY_ENV
                );
            }
            store_api_key(&key)?;
            key
        }
    };

    Ok(initialize_client(&key))
}

pub async fn test_configured_api_key() -> Result<ApiKeySource> {
    let resolved = resolve_api_key()?.ok_or_else(|| {
        anyhow!(
            "No API key configured. Set {} or run `quizsmith llm --set <KEY>`.",
            API_KEY_ENV
        )
    })?;
    let client = initialize_client(&resolved.key);
    client
        .models()
        .list()
        .await
        .context("Failed to validate API key with OpenAI")?;
    Ok(resolved.source)
}

fn initialize_client(api_key: &str) -> Client<OpenAIConfig> {
    Client::with_config(OpenAIConfig::new().with_api_key(api_key))
}
