//! Taxonomy terms referenced by imported rows.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use shared::text::slugify;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    pub id: Uuid,
    pub taxonomy: String,
    pub slug: String,
    pub name_de: Option<String>,
    pub name_en: Option<String>,
}

/// Pre-loaded terms, looked up by taxonomy and slug.
///
/// A term is found by its slug or by the slug of either translated name, so
/// `Bühne`, `buehne` and `Stage` all resolve the same term.
#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    index: HashMap<(String, String), Term>,
}

impl TermDictionary {
    pub fn new(terms: impl IntoIterator<Item = Term>) -> Self {
        let mut index = HashMap::new();
        for term in terms {
            let keys = [
                Some(term.slug.clone()),
                term.name_de.as_deref().map(slugify),
                term.name_en.as_deref().map(slugify),
            ];
            for key in keys.into_iter().flatten().filter(|k| !k.is_empty()) {
                index
                    .entry((term.taxonomy.clone(), key))
                    .or_insert_with(|| term.clone());
            }
        }
        Self { index }
    }

    pub fn resolve(&self, taxonomy: &str, value: &str) -> Option<&Term> {
        let key = slugify(value);
        if key.is_empty() {
            return None;
        }
        self.index.get(&(taxonomy.to_string(), key))
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
