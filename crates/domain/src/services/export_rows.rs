//! Spreadsheet rows for exports, the inverse of the row transformer.
//!
//! Exported files use the dictionary labels of the job language as headers, so
//! they can be re-imported without manual column assignment.

use std::collections::HashMap;
use uuid::Uuid;

use super::headers::{dictionary, keys, EVENT_TYPE_TAXONOMY, LOCATION_TYPE_TAXONOMY, ROW_NUMBER_HEADER};
use crate::models::{
    Address, Contact, Coordinates, Event, ImportKind, Lang, Location, Term, Translated,
};

/// Lookups needed to render term and venue references.
#[derive(Debug, Clone, Default)]
pub struct ExportLookup {
    pub terms: HashMap<Uuid, Term>,
    /// Location slugs by id, for the event `location` column.
    pub venues: HashMap<Uuid, String>,
}

impl ExportLookup {
    /// Term names of one taxonomy in the order the entity references them.
    fn term_names(&self, taxonomy: &str, ids: &[Uuid], lang: Lang) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.terms.get(id))
            .filter(|term| term.taxonomy == taxonomy)
            .map(|term| {
                let name = match lang {
                    Lang::De => term.name_de.as_ref().or(term.name_en.as_ref()),
                    Lang::En => term.name_en.as_ref().or(term.name_de.as_ref()),
                };
                name.cloned().unwrap_or_else(|| term.slug.clone())
            })
            .collect()
    }
}

/// Header row: `###` followed by all labels of the kind in `lang`.
pub fn header_row(kind: ImportKind, lang: Lang) -> Vec<String> {
    std::iter::once(ROW_NUMBER_HEADER.to_string())
        .chain(dictionary(kind).headers.iter().map(|h| h.label(lang).to_string()))
        .collect()
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn translated(value: &Translated, key: &str) -> Option<String> {
    if key.ends_with("-de") {
        Some(opt(&value.de))
    } else if key.ends_with("-en") {
        Some(opt(&value.en))
    } else {
        None
    }
}

fn address_cell(address: &Address, key: &str) -> Option<String> {
    let value = match key {
        keys::STREET1 => &address.street1,
        keys::STREET2 => &address.street2,
        keys::HOUSE_NUMBER => &address.house_number,
        keys::POST_CODE => &address.post_code,
        keys::CITY => &address.city,
        _ => return None,
    };
    Some(opt(value))
}

fn contact_cell(contact: &Contact, key: &str) -> Option<String> {
    let value = match key {
        keys::PHONE => &contact.phone,
        keys::EMAIL => &contact.email,
        keys::WEBSITE => &contact.website,
        _ => return None,
    };
    Some(opt(value))
}

fn point_cell(point: Option<Coordinates>, key: &str) -> Option<String> {
    match key {
        keys::LAT => Some(point.map(|p| p.lat.to_string()).unwrap_or_default()),
        keys::LNG => Some(point.map(|p| p.lng.to_string()).unwrap_or_default()),
        _ => None,
    }
}

fn nth(values: &[String], index: usize) -> String {
    values.get(index).cloned().unwrap_or_default()
}

/// Cells of one location in dictionary order, prefixed with the row number.
pub fn location_row(number: usize, location: &Location, lookup: &ExportLookup, lang: Lang) -> Vec<String> {
    let data = &location.data;
    let types = lookup.term_names(LOCATION_TYPE_TAXONOMY, &data.term_ids, lang);

    let cells = dictionary(ImportKind::Location).headers.iter().map(|h| {
        let key = h.key;
        let value = match key {
            keys::TITLE_DE | keys::TITLE_EN => translated(&data.title, key),
            keys::DESCRIPTION_DE | keys::DESCRIPTION_EN => translated(&data.description, key),
            keys::FACEBOOK => Some(opt(&data.social.facebook)),
            keys::INSTAGRAM => Some(opt(&data.social.instagram)),
            keys::TWITTER => Some(opt(&data.social.twitter)),
            keys::YOUTUBE => Some(opt(&data.social.youtube)),
            keys::TYPE_1 => Some(nth(&types, 0)),
            keys::TYPE_2 => Some(nth(&types, 1)),
            _ => address_cell(&data.address, key)
                .or_else(|| contact_cell(&data.contact, key))
                .or_else(|| point_cell(data.point, key)),
        };
        value.unwrap_or_default()
    });

    std::iter::once(number.to_string()).chain(cells).collect()
}

/// Cells of one event in dictionary order, prefixed with the row number.
pub fn event_row(number: usize, event: &Event, lookup: &ExportLookup, lang: Lang) -> Vec<String> {
    let data = &event.data;
    let types = lookup.term_names(EVENT_TYPE_TAXONOMY, &data.term_ids, lang);

    let cells = dictionary(ImportKind::Event).headers.iter().map(|h| {
        let key = h.key;
        let value = match key {
            keys::EVENT_ID => Some(opt(&data.event_id)),
            keys::TITLE_DE | keys::TITLE_EN => translated(&data.title, key),
            keys::DESCRIPTION_DE | keys::DESCRIPTION_EN => translated(&data.description, key),
            keys::DATE_BEGIN => data.begins_at.map(|d| d.format("%Y-%m-%d").to_string()),
            keys::TIME_BEGIN => data.begins_at.map(|d| d.format("%H:%M").to_string()),
            keys::DATE_END => data.ends_at.map(|d| d.format("%Y-%m-%d").to_string()),
            keys::TIME_END => data.ends_at.map(|d| d.format("%H:%M").to_string()),
            keys::LOCATION => data.location_id.and_then(|id| lookup.venues.get(&id).cloned()),
            keys::EVENT_TYPE_1 => Some(nth(&types, 0)),
            keys::EVENT_TYPE_2 => Some(nth(&types, 1)),
            _ => address_cell(&data.address, key)
                .or_else(|| contact_cell(&data.contact, key))
                .or_else(|| point_cell(data.point, key)),
        };
        value.unwrap_or_default()
    });

    std::iter::once(number.to_string()).chain(cells).collect()
}
