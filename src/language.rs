//! Target languages and language classification.
//!
//! Text mode only counts text that a [`LanguageClassifier`] attributes to the
//! requested language. The default classifier is backed by `whatlang`; any
//! `Fn(&str) -> Option<Language>` closure can stand in for it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use whatlang::Lang;

use crate::error::Error;

/// Languages the extractor can target (ISO 639-1 codes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
    De,
    Es,
    It,
    Pt,
    Nl,
    Ru,
    Ja,
    Zh,
    Ko,
    Ar,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 12] = [
        Language::En,
        Language::Fr,
        Language::De,
        Language::Es,
        Language::It,
        Language::Pt,
        Language::Nl,
        Language::Ru,
        Language::Ja,
        Language::Zh,
        Language::Ko,
        Language::Ar,
    ];

    /// ISO 639-1 code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Es => "es",
            Language::It => "it",
            Language::Pt => "pt",
            Language::Nl => "nl",
            Language::Ru => "ru",
            Language::Ja => "ja",
            Language::Zh => "zh",
            Language::Ko => "ko",
            Language::Ar => "ar",
        }
    }

    /// Looks a language up by code. Region suffixes (`en-US`, `pt_BR`) are ignored.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.trim().split(['-', '_']).next().unwrap_or_default();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(primary))
    }

    fn from_whatlang(lang: Lang) -> Option<Self> {
        match lang {
            Lang::Eng => Some(Language::En),
            Lang::Fra => Some(Language::Fr),
            Lang::Deu => Some(Language::De),
            Lang::Spa => Some(Language::Es),
            Lang::Ita => Some(Language::It),
            Lang::Por => Some(Language::Pt),
            Lang::Nld => Some(Language::Nl),
            Lang::Rus => Some(Language::Ru),
            Lang::Jpn => Some(Language::Ja),
            Lang::Cmn => Some(Language::Zh),
            Lang::Kor => Some(Language::Ko),
            Lang::Ara => Some(Language::Ar),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| Error::UnsupportedLanguage(s.to_string()))
    }
}

/// Best-guess language of a string.
///
/// Returns `None` when the language is indeterminate (empty, too short,
/// mixed script) or outside [`Language::ALL`]. Implementations must not
/// panic on any input.
pub trait LanguageClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Option<Language>;
}

impl<F> LanguageClassifier for F
where
    F: Fn(&str) -> Option<Language> + Send + Sync,
{
    fn classify(&self, text: &str) -> Option<Language> {
        self(text)
    }
}

/// Trigram-based classifier using `whatlang`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangClassifier {
    /// Treat guesses whatlang itself flags as unreliable as indeterminate.
    pub require_reliable: bool,
}

impl WhatlangClassifier {
    #[must_use]
    pub fn new(require_reliable: bool) -> Self {
        Self { require_reliable }
    }
}

impl LanguageClassifier for WhatlangClassifier {
    fn classify(&self, text: &str) -> Option<Language> {
        if text.trim().is_empty() {
            return None;
        }
        let info = whatlang::detect(text)?;
        if self.require_reliable && !info.is_reliable() {
            return None;
        }
        Language::from_whatlang(info.lang())
    }
}
