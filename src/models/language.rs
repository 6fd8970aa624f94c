//! Content languages
//!
//! News and promotions are authored in German and optionally translated.
//! Every localized accessor falls back to German when a translation is
//! missing or blank.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported content language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// German, the authoring and fallback language
    #[default]
    De,
    En,
    Fr,
    Ru,
    Uk,
}

impl Language {
    /// All supported languages, fallback first
    pub const ALL: [Language; 5] = [
        Language::De,
        Language::En,
        Language::Fr,
        Language::Ru,
        Language::Uk,
    ];

    /// Two-letter language code
    pub fn code(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
            Language::Fr => "fr",
            Language::Ru => "ru",
            Language::Uk => "uk",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    /// Parse a language code or locale tag such as `en-US` or `uk_UA`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match primary.as_str() {
            "de" => Ok(Language::De),
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            "ru" => Ok(Language::Ru),
            "uk" => Ok(Language::Uk),
            _ => Err(anyhow::anyhow!("Unsupported language: {}", s)),
        }
    }
}

/// Pick the translation for `lang`, falling back to the German text
pub(crate) fn pick<'a>(
    lang: Language,
    de: &'a str,
    en: &'a Option<String>,
    fr: &'a Option<String>,
    ru: &'a Option<String>,
    uk: &'a Option<String>,
) -> &'a str {
    let translated = match lang {
        Language::De => None,
        Language::En => en.as_deref(),
        Language::Fr => fr.as_deref(),
        Language::Ru => ru.as_deref(),
        Language::Uk => uk.as_deref(),
    };
    match translated {
        Some(text) if !text.trim().is_empty() => text,
        _ => de,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_str() {
        assert_eq!("de".parse::<Language>().unwrap(), Language::De);
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
        assert_eq!("en-US".parse::<Language>().unwrap(), Language::En);
        assert_eq!("uk_UA".parse::<Language>().unwrap(), Language::Uk);
        assert!("es".parse::<Language>().is_err());
        assert!("".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_display_matches_code() {
        for lang in Language::ALL {
            assert_eq!(lang.to_string(), lang.code());
            assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
        }
    }

    #[test]
    fn test_pick_falls_back_to_german() {
        let en = Some("Sofa sale".to_string());
        let blank = Some("   ".to_string());
        let none = None;

        assert_eq!(pick(Language::En, "Sofa-Aktion", &en, &none, &none, &none), "Sofa sale");
        assert_eq!(pick(Language::Fr, "Sofa-Aktion", &en, &none, &none, &none), "Sofa-Aktion");
        assert_eq!(pick(Language::Ru, "Sofa-Aktion", &en, &none, &blank, &none), "Sofa-Aktion");
        assert_eq!(pick(Language::De, "Sofa-Aktion", &en, &en, &en, &en), "Sofa-Aktion");
    }
}
