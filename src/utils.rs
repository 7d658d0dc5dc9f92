use std::path::Path;

use anyhow::{Context, Result, anyhow};
use dialoguer::Confirm;
use dialoguer::theme::ColorfulTheme;
use directories::ProjectDirs;

pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|want| ext.eq_ignore_ascii_case(want)))
        .unwrap_or(false)
}

pub fn trim_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

pub fn strip_controls_and_escapes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            // ANSI escape sequence (ESC … letter)
            '\x1b' => {
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out.trim().to_string()
}

pub fn ask_yn(prompt: String) -> Result<bool> {
    println!("{}", prompt);
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Proceed? ")
        .report(true)
        .wait_for_newline(true)
        .interact()
        .context("Failed to read confirmation")
}

pub fn get_data_dir() -> Result<std::path::PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "quizsmith")
        .ok_or_else(|| anyhow!("Could not determine project directory"))?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_controls_and_escapes() {
        let input = "\x1b[1msk-test\x1b[0m\n";
        assert_eq!(strip_controls_and_escapes(input), "sk-test");
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("kapitel.DOCX"), &["docx"]));
        assert!(has_extension(Path::new("seite.jpg"), &["png", "jpg"]));
        assert!(!has_extension(Path::new("notes"), &["txt"]));
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("response", 1), "1 response");
        assert_eq!(pluralize("response", 9), "9 responses");
        assert_eq!(pluralize("response", 0), "0 responses");
    }

    #[test]
    fn test_trim_line() {
        assert_eq!(trim_line("  key \n"), Some("key"));
        assert_eq!(trim_line(" \t "), None);
    }
}
