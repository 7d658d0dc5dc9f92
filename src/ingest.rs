use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::{has_extension, pluralize};

pub const PASTED_PREFIX: &str = "manual_input";

const DOCX_BODY: &str = "word/document.xml";

static PARAGRAPH_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</w:p>|<w:br\s*/>|<w:cr\s*/>").unwrap());
static TAB: Lazy<Regex> = Lazy::new(|| Regex::new(r"<w:tab\s*/>").unwrap());
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceContent {
    Text(String),
    /// A scanned or photographed page, sent to the model as an image.
    Image {
        bytes: Vec<u8>,
        mime_type: &'static str,
    },
}

impl SourceContent {
    fn is_empty(&self) -> bool {
        match self {
            SourceContent::Text(text) => text.trim().is_empty(),
            SourceContent::Image { bytes, .. } => bytes.is_empty(),
        }
    }
}

/// Textbook content ready to send, plus the prefix used to name its outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceDocument {
    pub prefix: String,
    pub content: SourceContent,
}

impl SourceDocument {
    pub fn pasted(text: &str) -> Result<Self> {
        Self::checked(PASTED_PREFIX.to_string(), SourceContent::Text(text.to_string()))
    }

    fn checked(prefix: String, content: SourceContent) -> Result<Self> {
        if content.is_empty() {
            bail!("Please provide input before processing.");
        }
        Ok(Self { prefix, content })
    }

    /// Short size note for confirmation prompts.
    pub fn describe(&self) -> String {
        match &self.content {
            SourceContent::Text(text) => pluralize("character", text.chars().count()),
            SourceContent::Image { bytes, mime_type } => {
                format!("{mime_type}, {}", pluralize("byte", bytes.len()))
            }
        }
    }
}

/// `data:` URL carrying the image inline, as accepted by the image input of the API.
pub fn image_data_url(bytes: &[u8], mime_type: &str) -> String {
    format!(
        "data:{mime_type};base64,{}",
        general_purpose::STANDARD.encode(bytes)
    )
}

fn image_mime_type(path: &Path) -> Option<&'static str> {
    if has_extension(path, &["png"]) {
        Some("image/png")
    } else if has_extension(path, &["jpg", "jpeg"]) {
        Some("image/jpeg")
    } else {
        None
    }
}

pub fn load_document(path: &Path) -> Result<SourceDocument> {
    let prefix = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(PASTED_PREFIX)
        .to_string();

    let content = if let Some(mime_type) = image_mime_type(path) {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        SourceContent::Image { bytes, mime_type }
    } else if has_extension(path, &["docx"]) {
        SourceContent::Text(read_docx(path)?)
    } else {
        SourceContent::Text(
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read {} as UTF-8 text", path.display()))?,
        )
    };

    SourceDocument::checked(prefix, content)
}

fn read_docx(path: &Path) -> Result<String> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("{} is not a valid .docx archive", path.display()))?;
    let mut body = String::new();
    archive
        .by_name(DOCX_BODY)
        .with_context(|| format!("{} has no {DOCX_BODY}", path.display()))?
        .read_to_string(&mut body)?;

    Ok(docx_xml_to_text(&body))
}

/// Flattens WordprocessingML to plain text, one line per paragraph.
pub fn docx_xml_to_text(xml: &str) -> String {
    let text = PARAGRAPH_END.replace_all(xml, "\n");
    let text = TAB.replace_all(&text, "\t");
    let text = ANY_TAG.replace_all(&text, "");
    let decoded = html_escape::decode_html_entities(&text);

    decoded
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
