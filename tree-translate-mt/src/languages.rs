//! Language codes understood by the translation provider
//!
//! The provider uses its own codes rather than BCP 47: Japanese is `jp`, Korean
//! `kor`, French `fra`, Traditional Chinese `cht`. `auto` asks the provider to
//! detect the source language and cannot be a target.

use crate::error::{MtError, MtResult};
use serde::Serialize;

/// Code used for source language detection
pub const AUTO: &str = "auto";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

const fn language(code: &'static str, name: &'static str) -> Language {
    Language { code, name }
}

/// All supported languages, most used first
pub const LANGUAGES: &[Language] = &[
    language(AUTO, "Auto-detect"),
    language("zh", "Chinese"),
    language("en", "English"),
    language("jp", "Japanese"),
    language("kor", "Korean"),
    language("fra", "French"),
    language("de", "German"),
    language("ru", "Russian"),
    language("spa", "Spanish"),
    language("it", "Italian"),
    language("pt", "Portuguese"),
    language("ara", "Arabic"),
    language("th", "Thai"),
    language("vie", "Vietnamese"),
    language("cht", "Traditional Chinese"),
    language("pl", "Polish"),
    language("dan", "Danish"),
    language("nl", "Dutch"),
    language("el", "Greek"),
    language("cs", "Czech"),
    language("swe", "Swedish"),
    language("fin", "Finnish"),
    language("rom", "Romanian"),
    language("hu", "Hungarian"),
];

/// English name of a language code
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|language| language.code == code)
        .map(|language| language.name)
}

/// Languages that can be translated into (everything except `auto`)
pub fn target_languages() -> impl Iterator<Item = &'static Language> {
    LANGUAGES.iter().filter(|language| language.code != AUTO)
}

/// Check a source/target pair before any request is made.
pub fn validate_language_pair(from: &str, to: &str) -> MtResult<()> {
    if language_name(from).is_none() {
        return Err(MtError::InvalidLanguage(format!(
            "Unsupported source language '{}'",
            from
        )));
    }
    if to == AUTO {
        return Err(MtError::InvalidLanguage(
            "Target language cannot be 'auto'".to_string(),
        ));
    }
    if !target_languages().any(|language| language.code == to) {
        return Err(MtError::InvalidLanguage(format!(
            "Unsupported target language '{}'",
            to
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_name() {
        assert_eq!(language_name("zh"), Some("Chinese"));
        assert_eq!(language_name("jp"), Some("Japanese"));
        assert_eq!(language_name("ja"), None);
    }

    #[test]
    fn test_valid_pairs() {
        assert!(validate_language_pair("en", "zh").is_ok());
        assert!(validate_language_pair("auto", "fra").is_ok());
        assert!(validate_language_pair("cht", "en").is_ok());
    }

    #[test]
    fn test_auto_target_rejected() {
        match validate_language_pair("en", "auto") {
            Err(MtError::InvalidLanguage(msg)) => assert!(msg.contains("cannot be 'auto'")),
            other => panic!("Expected InvalidLanguage error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_codes_rejected() {
        assert!(validate_language_pair("xx", "en").is_err());
        assert!(validate_language_pair("en", "fr-FR").is_err());
        assert!(validate_language_pair("", "en").is_err());
    }

    #[test]
    fn test_target_languages() {
        assert_eq!(target_languages().count(), LANGUAGES.len() - 1);
        assert!(target_languages().all(|language| language.code != AUTO));
    }
}
