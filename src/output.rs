use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const TRANSFORMED_SUFFIX: &str = "_transformed";

/// Swiss German spelling: the import target has no `ß`.
pub fn correct_german_chars(text: &str) -> String {
    text.replace('ß', "ss")
}

pub fn write_corrected(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, correct_german_chars(text))
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Saves each model reply as `{prefix}_response_{index}{suffix}.txt`.
#[derive(Clone, Debug)]
pub struct ResponseWriter {
    folder: PathBuf,
    prefix: String,
}

impl ResponseWriter {
    pub fn new(folder: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            prefix: prefix.into(),
        }
    }

    pub fn path_for(&self, index: usize, suffix: &str) -> PathBuf {
        self.folder
            .join(format!("{}_response_{index}{suffix}.txt", self.prefix))
    }

    pub fn save(&self, text: &str, index: usize, suffix: &str) -> Result<PathBuf> {
        let path = self.path_for(index, suffix);
        write_corrected(&path, text)?;
        info!(path = %path.display(), "saved response");
        Ok(path)
    }
}
