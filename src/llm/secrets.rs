use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dialoguer::{Password, theme::ColorfulTheme};
use serde::{Deserialize, Serialize};

use crate::palette::Palette;
use crate::utils::{get_data_dir, strip_controls_and_escapes, trim_line};

pub const API_KEY_ENV: &str = "QUIZSMITH_OPENAI_API_KEY";

const AUTH_FILE_NAME: &str = "auth.json";
const OPENAI_PROVIDER: &str = "openai";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    AuthFile,
}

impl ApiKeySource {
    pub fn description(&self) -> &'static str {
        match self {
            ApiKeySource::Environment => "environment variable",
            ApiKeySource::AuthFile => "local auth file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub key: String,
    pub source: ApiKeySource,
}

/// `auth.json`: one entry per provider, `{"openai": {"key": "..."}}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct AuthFile {
    #[serde(flatten)]
    providers: HashMap<String, ProviderAuth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProviderAuth {
    key: String,
}

/// Environment variable first, then the auth file in the data directory.
pub fn resolve_api_key() -> Result<Option<ResolvedKey>> {
    if let Ok(value) = env::var(API_KEY_ENV)
        && let Some(key) = trim_line(&value)
    {
        return Ok(Some(ResolvedKey {
            key: key.to_string(),
            source: ApiKeySource::Environment,
        }));
    }

    let stored = read_stored_key(&auth_file_path()?)?;
    Ok(stored.map(|key| ResolvedKey {
        key,
        source: ApiKeySource::AuthFile,
    }))
}

pub fn store_api_key(api_key: &str) -> Result<()> {
    store_key_at(&auth_file_path()?, api_key)
}

pub fn clear_api_key() -> Result<bool> {
    clear_key_at(&auth_file_path()?)
}

pub fn prompt_for_api_key(prompt: &str) -> Result<String> {
    println!("\n{}", prompt);
    println!(
        "{} (https://platform.openai.com/account/api-keys) to generate questions. It's stored locally for future use.",
        Palette::paint(Palette::SUCCESS, "Enter your OpenAI API key")
    );
    println!("{}", Palette::dim("Leave the field blank to cancel."));
    let raw = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API Key")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read API key")?;

    Ok(strip_controls_and_escapes(&raw))
}

fn auth_file_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(AUTH_FILE_NAME))
}

fn read_stored_key(path: &Path) -> Result<Option<String>> {
    let Some(auth) = read_auth_file(path)? else {
        return Ok(None);
    };

    Ok(auth
        .providers
        .get(OPENAI_PROVIDER)
        .and_then(|entry| trim_line(&entry.key))
        .map(str::to_string))
}

fn store_key_at(path: &Path, api_key: &str) -> Result<()> {
    let trimmed = trim_line(api_key).context("Cannot store an empty API key")?;
    let mut auth = read_auth_file(path)?.unwrap_or_default();

    auth.providers.insert(
        OPENAI_PROVIDER.to_string(),
        ProviderAuth {
            key: trimmed.to_string(),
        },
    );

    write_auth_file(path, &auth)
}

fn clear_key_at(path: &Path) -> Result<bool> {
    let Some(mut auth) = read_auth_file(path)? else {
        return Ok(false);
    };

    if auth.providers.remove(OPENAI_PROVIDER).is_none() {
        return Ok(false);
    }

    if auth.providers.is_empty() {
        fs::remove_file(path).with_context(|| {
            format!("Failed to remove empty auth file at {}", path.display())
        })?;
    } else {
        write_auth_file(path, &auth)?;
    }
    Ok(true)
}

fn read_auth_file(path: &Path) -> Result<Option<AuthFile>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to read auth file at {}", path.display()));
        }
    };

    if contents.trim().is_empty() {
        return Ok(Some(AuthFile::default()));
    }

    let parsed = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse auth file at {}", path.display()))?;
    Ok(Some(parsed))
}

fn write_auth_file(path: &Path, value: &AuthFile) -> Result<()> {
    let contents = format!("{}\n", serde_json::to_string_pretty(value)?);
    fs::write(path, contents)
        .with_context(|| format!("Failed to write auth file at {}", path.display()))
}
