//! Content languages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language of a job: used for header labels and user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    De,
    En,
}

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::De => "de",
            Lang::En => "en",
        }
    }

    /// Picks the German or English variant.
    pub fn pick<'a>(&self, de: &'a str, en: &'a str) -> &'a str {
        match self {
            Lang::De => de,
            Lang::En => en,
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "de" => Ok(Lang::De),
            "en" => Ok(Lang::En),
            _ => Err(format!("Unknown language: {}", s)),
        }
    }
}

/// A text value held in both content languages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translated {
    pub de: Option<String>,
    pub en: Option<String>,
}

impl Translated {
    pub fn get(&self, lang: Lang) -> Option<&str> {
        match lang {
            Lang::De => self.de.as_deref(),
            Lang::En => self.en.as_deref(),
        }
    }

    /// Value in `lang`, falling back to the other language.
    pub fn get_or_fallback(&self, lang: Lang) -> Option<&str> {
        match lang {
            Lang::De => self.de.as_deref().or(self.en.as_deref()),
            Lang::En => self.en.as_deref().or(self.de.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("DE".parse::<Lang>().unwrap(), Lang::De);
        assert_eq!("en".parse::<Lang>().unwrap(), Lang::En);
        assert!("fr".parse::<Lang>().is_err());
    }

    #[test]
    fn test_pick() {
        assert_eq!(Lang::De.pick("Zeile", "Row"), "Zeile");
        assert_eq!(Lang::En.pick("Zeile", "Row"), "Row");
    }

    #[test]
    fn test_translated_fallback() {
        let title = Translated {
            de: None,
            en: Some("Museum".to_string()),
        };
        assert_eq!(title.get(Lang::De), None);
        assert_eq!(title.get_or_fallback(Lang::De), Some("Museum"));
    }
}
