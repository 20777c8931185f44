// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::I18nStore;

const DEFAULT_LANG: &str = "en";

// Language extractor, driven by Accept-Language
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    /// Primary subtag of the first language we have a catalog for ("pt-BR" -> "pt").
    pub fn from_header(header_str: &str) -> Self {
        accept_language::parse(header_str)
            .iter()
            .map(|tag| tag.split('-').next().unwrap_or(tag).to_lowercase())
            .find(|lang| I18nStore::shared().supports(lang))
            .map(Locale)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_primary_subtag() {
        assert_eq!(Locale::from_header("pt-BR,pt;q=0.9,en;q=0.8").0, "pt");
    }

    #[test]
    fn skips_languages_without_catalog() {
        assert_eq!(Locale::from_header("hi-IN,pt;q=0.5").0, "pt");
        assert_eq!(Locale::from_header("fr-FR").0, "en");
    }

    #[test]
    fn empty_header_defaults_to_english() {
        assert_eq!(Locale::from_header("").0, "en");
    }
}
