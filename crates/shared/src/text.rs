//! Text normalisation helpers (slugs, cell trimming).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Transliterates a single character to ASCII, returning `None` when no mapping exists.
fn transliterate(c: char) -> Option<&'static str> {
    let mapped = match c {
        'ä' | 'æ' => "ae",
        'ö' | 'ø' | 'œ' => "oe",
        'ü' => "ue",
        'ß' => "ss",
        'à' | 'á' | 'â' | 'ã' | 'å' => "a",
        'ç' | 'ć' | 'č' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' | 'ń' => "n",
        'ò' | 'ó' | 'ô' | 'õ' => "o",
        'ù' | 'ú' | 'û' => "u",
        'ý' | 'ÿ' => "y",
        'š' | 'ś' => "s",
        'ž' | 'ź' | 'ż' => "z",
        'ł' => "l",
        '&' => " und ",
        _ => return None,
    };
    Some(mapped)
}

/// Builds a URL-safe slug: lower-case ASCII letters and digits joined by single dashes.
///
/// German umlauts are transliterated (`ä` → `ae`), other common accents are stripped.
pub fn slugify(input: &str) -> String {
    let mut ascii = String::with_capacity(input.len());
    for c in input.trim().to_lowercase().chars() {
        match transliterate(c) {
            Some(mapped) => ascii.push_str(mapped),
            None => ascii.push(c),
        }
    }

    NON_SLUG_CHARS
        .replace_all(&ascii, "-")
        .trim_matches('-')
        .to_string()
}

/// Trims a spreadsheet cell, returning `None` for blank cells.
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_simple() {
        assert_eq!(slugify("Museum"), "museum");
        assert_eq!(slugify("Open Air Kino"), "open-air-kino");
    }

    #[test]
    fn test_slugify_umlauts() {
        assert_eq!(slugify("Bühne Köpenick"), "buehne-koepenick");
        assert_eq!(slugify("Straße"), "strasse");
    }

    #[test]
    fn test_slugify_accents() {
        assert_eq!(slugify("Café Mitte"), "cafe-mitte");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  Theater -- / Tanz  "), "theater-tanz");
        assert_eq!(slugify("Kunst & Kultur"), "kunst-und-kultur");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  x "), Some("x".to_string()));
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty(""), None);
    }
}
