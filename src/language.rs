use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use serde_json::from_str;

use crate::error::{Result, SessionError};

static LANG_DIR: Dir = include_dir!("src/lang");

/// A static pool of candidate words, embedded in the binary.
#[derive(Deserialize, Clone, Debug)]
pub struct Language {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl Language {
    pub fn load(file_name: &str) -> Result<Self> {
        read_language_from_file(&format!("{file_name}.json"))
    }

    /// Build a pool directly from words, mostly useful for tests and custom pools.
    pub fn from_words<S: Into<String>>(name: &str, words: impl IntoIterator<Item = S>) -> Self {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        Self {
            name: name.to_string(),
            size: words.len() as u32,
            words,
        }
    }
}

fn read_language_from_file(file_name: &str) -> Result<Language> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| SessionError::invalid(format!("word pool {file_name} not found")))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| SessionError::invalid(format!("word pool {file_name} is not utf-8")))?;

    let mut lang: Language = from_str(file_as_str)
        .map_err(|e| SessionError::invalid(format!("word pool {file_name}: {e}")))?;

    // Targets are compared against lower-cased input
    for word in lang.words.iter_mut() {
        *word = word.trim().to_lowercase();
    }
    lang.words.retain(|w| !w.is_empty());

    Ok(lang)
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SupportedLanguage {
    #[default]
    English,
    EnglishLong,
}

impl SupportedLanguage {
    pub fn as_lang(&self) -> Result<Language> {
        Language::load(&self.to_string())
    }
}
