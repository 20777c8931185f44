// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::LazyLock;

const DEFAULT_LANG: &str = "en";

// Message catalogs are embedded in the binary
const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

static SHARED: LazyLock<I18nStore> = LazyLock::new(I18nStore::load);

/// Translated error messages, indexed by language and then by message key.
#[derive(Debug, Default)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    /// The process-wide store built from the embedded catalogs.
    pub fn shared() -> &'static I18nStore {
        &SHARED
    }

    fn load() -> Self {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            match serde_json::from_str::<HashMap<String, String>>(raw) {
                Ok(messages) => {
                    catalogs.insert((*lang).to_string(), messages);
                }
                Err(e) => tracing::error!("Failed to parse '{}' message catalog: {}", lang, e),
            }
        }
        Self { catalogs }
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.catalogs.contains_key(lang)
    }

    /// Looks up `key` for `lang`, falling back to English and finally to the key itself.
    /// `{name}` placeholders are replaced with the matching entry from `args`.
    pub fn translate(&self, lang: &str, key: &str, args: &[(&str, &str)]) -> String {
        let template = self
            .catalogs
            .get(lang)
            .and_then(|c| c.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|c| c.get(key)))
            .map(String::as_str)
            .unwrap_or(key);

        args.iter().fold(template.to_string(), |msg, (name, value)| {
            msg.replace(&format!("{{{}}}", name), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_into_requested_language() {
        let store = I18nStore::shared();
        assert_eq!(
            store.translate("pt", "invalid_credentials", &[]),
            "E-mail ou senha inválidos."
        );
        assert_eq!(
            store.translate("en", "invalid_credentials", &[]),
            "Invalid email or password."
        );
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::shared();
        assert!(!store.supports("hi"));
        assert_eq!(
            store.translate("hi", "cannot_delete_self", &[]),
            "You cannot remove your own profile."
        );
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        assert_eq!(I18nStore::shared().translate("en", "no_such_key", &[]), "no_such_key");
    }

    #[test]
    fn placeholders_are_substituted() {
        let msg = I18nStore::shared().translate("en", "permission_denied", &[("permission", "news")]);
        assert_eq!(msg, "You need the 'news' permission to access this section.");
    }

    #[test]
    fn every_catalog_has_the_english_keys() {
        let store = I18nStore::shared();
        let english = &store.catalogs["en"];
        for (lang, catalog) in &store.catalogs {
            for key in english.keys() {
                assert!(catalog.contains_key(key), "'{}' is missing '{}'", lang, key);
            }
        }
    }
}
