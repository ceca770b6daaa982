//! Interface translation.
//!
//! Template strings are written in English. The `X-Language` request header
//! picks the display language; Spanish is the default. Non-English tables
//! are flat `{"source": "translation"}` JSON files named `{code}.json`,
//! read once at startup.

use std::collections::HashMap;
use std::convert::Infallible;
use std::path::{Path, PathBuf};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use thiserror::Error;
use tracing::{info, warn};

/// Header carrying the shopper's language choice.
pub const LANGUAGE_HEADER: &str = "x-language";

/// Errors loading translation tables.
#[derive(Debug, Error)]
pub enum I18nError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid translation table {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    /// Languages that need a translation table.
    pub const TRANSLATED: [Self; 1] = [Self::Es];

    /// Parse an `X-Language` value. Unknown or missing values mean Spanish.
    #[must_use]
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("en") => Self::En,
            _ => Self::Es,
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }
}

impl<S> FromRequestParts<S> for Language
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_header(
            parts
                .headers
                .get(LANGUAGE_HEADER)
                .and_then(|v| v.to_str().ok()),
        ))
    }
}

/// Translation tables for every non-source language.
#[derive(Debug, Default)]
pub struct Translations {
    tables: HashMap<Language, HashMap<String, String>>,
}

impl Translations {
    /// Load `{code}.json` for each translated language from `dir`.
    ///
    /// A missing file leaves that language untranslated.
    ///
    /// # Errors
    ///
    /// Returns `I18nError` if a table exists but cannot be read or parsed.
    pub async fn load_dir(dir: &Path) -> Result<Self, I18nError> {
        let mut tables = HashMap::new();

        for language in Language::TRANSLATED {
            let path = dir.join(format!("{}.json", language.code()));
            let document = match tokio::fs::read_to_string(&path).await {
                Ok(document) => document,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(path = %path.display(), "Translation table not found, serving source text");
                    continue;
                }
                Err(source) => return Err(I18nError::Io { path, source }),
            };
            let table: HashMap<String, String> = serde_json::from_str(&document)
                .map_err(|source| I18nError::Parse {
                    path: path.clone(),
                    source,
                })?;
            info!(language = language.code(), entries = table.len(), "Translation table loaded");
            tables.insert(language, table);
        }

        Ok(Self { tables })
    }

    /// Build from in-memory tables.
    #[must_use]
    pub const fn from_tables(tables: HashMap<Language, HashMap<String, String>>) -> Self {
        Self { tables }
    }

    /// Translator for one request.
    #[must_use]
    pub fn translator(&self, language: Language) -> Translator<'_> {
        Translator {
            language,
            table: match language {
                Language::En => None,
                Language::Es => self.tables.get(&language),
            },
        }
    }
}

/// Request-scoped translation handle passed to templates.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    language: Language,
    table: Option<&'a HashMap<String, String>>,
}

impl<'a> Translator<'a> {
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Translate `text`, or return it unchanged when no entry exists.
    #[must_use]
    pub fn t<'s>(&self, text: &'s str) -> &'s str
    where
        'a: 's,
    {
        self.table
            .and_then(|table| table.get(text))
            .map_or(text, String::as_str)
    }
}
