use serde::{Deserialize, Serialize};

/// Language and country pair sent as `hl` / `gl` on every store request.
///
/// Listing text, prices and even the set of visible apps vary by locale, so a
/// `Locale` travels with each extraction call instead of living in a global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    /// Interface language, e.g. `"en"` or `"pt-BR"`.
    pub language: String,
    /// Two-letter store country, e.g. `"us"`.
    pub country: String,
}

impl Locale {
    #[must_use]
    pub fn new(language: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            country: country.into(),
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("en", "us")
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.language, self.country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_locale_is_english_us() {
        let locale = Locale::default();
        assert_eq!(locale.language, "en");
        assert_eq!(locale.country, "us");
    }

    #[test]
    fn display_joins_language_and_country() {
        assert_eq!(Locale::new("fr", "ca").to_string(), "fr-ca");
    }

    #[test]
    fn locale_serializes_as_plain_object() {
        let json = serde_json::to_value(Locale::new("de", "at")).unwrap();
        assert_eq!(json, serde_json::json!({"language": "de", "country": "at"}));
    }
}
