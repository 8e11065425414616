//! Bilingual header dictionaries for location and event spreadsheets.

use crate::models::{ImportKind, Lang};

/// Reserved header of the row-number column.
pub const ROW_NUMBER_HEADER: &str = "###";

/// Canonical field keys.
pub mod keys {
    pub const TITLE_DE: &str = "title-de";
    pub const TITLE_EN: &str = "title-en";
    pub const DESCRIPTION_DE: &str = "description-de";
    pub const DESCRIPTION_EN: &str = "description-en";
    pub const STREET1: &str = "street1";
    pub const STREET2: &str = "street2";
    pub const HOUSE_NUMBER: &str = "houseNumber";
    pub const POST_CODE: &str = "postCode";
    pub const CITY: &str = "city";
    pub const PHONE: &str = "phone";
    pub const EMAIL: &str = "email";
    pub const WEBSITE: &str = "website";
    pub const FACEBOOK: &str = "facebook";
    pub const INSTAGRAM: &str = "instagram";
    pub const TWITTER: &str = "twitter";
    pub const YOUTUBE: &str = "youtube";
    pub const TYPE_1: &str = "type-1";
    pub const TYPE_2: &str = "type-2";
    pub const LAT: &str = "lat";
    pub const LNG: &str = "lng";

    pub const EVENT_ID: &str = "eventId";
    pub const DATE_BEGIN: &str = "dateBegin";
    pub const TIME_BEGIN: &str = "timeBegin";
    pub const DATE_END: &str = "dateEnd";
    pub const TIME_END: &str = "timeEnd";
    pub const LOCATION: &str = "location";
    pub const EVENT_TYPE_1: &str = "eventType-1";
    pub const EVENT_TYPE_2: &str = "eventType-2";
}

/// Taxonomy fed by the `type-N` columns of location files.
pub const LOCATION_TYPE_TAXONOMY: &str = "type";
/// Taxonomy fed by the `eventType-N` columns of event files.
pub const EVENT_TYPE_TAXONOMY: &str = "eventType";

/// One known column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderDef {
    pub key: &'static str,
    pub de: &'static str,
    pub en: &'static str,
}

impl HeaderDef {
    pub fn label(&self, lang: Lang) -> &'static str {
        match lang {
            Lang::De => self.de,
            Lang::En => self.en,
        }
    }
}

/// Known columns of one import kind, in export order.
#[derive(Debug)]
pub struct HeaderDictionary {
    pub kind: ImportKind,
    pub headers: &'static [HeaderDef],
    /// Keys that must all be mapped.
    pub required: &'static [&'static str],
    /// Groups of keys of which at least one must be mapped.
    pub required_groups: &'static [&'static [&'static str]],
}

impl HeaderDictionary {
    pub fn get(&self, key: &str) -> Option<&HeaderDef> {
        self.headers.iter().find(|h| h.key == key)
    }

    /// Label of `key` in `lang`, or the key itself when unknown.
    pub fn label(&self, key: &str, lang: Lang) -> String {
        self.get(key)
            .map(|h| h.label(lang).to_string())
            .unwrap_or_else(|| key.to_string())
    }

    /// Finds the entry whose German label, English label or key equals `header`
    /// (trimmed, case-insensitive).
    pub fn find_by_header(&self, header: &str) -> Option<&HeaderDef> {
        let needle = header.trim().to_lowercase();
        if needle.is_empty() || needle == ROW_NUMBER_HEADER {
            return None;
        }
        self.headers.iter().find(|h| {
            h.de.to_lowercase() == needle
                || h.en.to_lowercase() == needle
                || h.key.to_lowercase() == needle
        })
    }
}

const fn def(key: &'static str, de: &'static str, en: &'static str) -> HeaderDef {
    HeaderDef { key, de, en }
}

static LOCATION_HEADERS: [HeaderDef; 20] = [
    def(keys::TITLE_DE, "Titel (de)", "Title (de)"),
    def(keys::TITLE_EN, "Titel (en)", "Title (en)"),
    def(keys::DESCRIPTION_DE, "Beschreibung (de)", "Description (de)"),
    def(keys::DESCRIPTION_EN, "Beschreibung (en)", "Description (en)"),
    def(keys::STREET1, "Straße", "Street"),
    def(keys::STREET2, "Adresszusatz", "Address line 2"),
    def(keys::HOUSE_NUMBER, "Hausnummer", "House number"),
    def(keys::POST_CODE, "PLZ", "Postcode"),
    def(keys::CITY, "Ort", "City"),
    def(keys::PHONE, "Telefon", "Phone"),
    def(keys::EMAIL, "E-Mail", "Email"),
    def(keys::WEBSITE, "Webseite", "Website"),
    def(keys::FACEBOOK, "Facebook", "Facebook"),
    def(keys::INSTAGRAM, "Instagram", "Instagram"),
    def(keys::TWITTER, "Twitter", "Twitter"),
    def(keys::YOUTUBE, "YouTube", "YouTube"),
    def(keys::TYPE_1, "Typ 1", "Type 1"),
    def(keys::TYPE_2, "Typ 2", "Type 2"),
    def(keys::LAT, "Breitengrad", "Latitude"),
    def(keys::LNG, "Längengrad", "Longitude"),
];

static EVENT_HEADERS: [HeaderDef; 22] = [
    def(keys::EVENT_ID, "Veranstaltungs-ID", "Event ID"),
    def(keys::TITLE_DE, "Titel (de)", "Title (de)"),
    def(keys::TITLE_EN, "Titel (en)", "Title (en)"),
    def(keys::DESCRIPTION_DE, "Beschreibung (de)", "Description (de)"),
    def(keys::DESCRIPTION_EN, "Beschreibung (en)", "Description (en)"),
    def(keys::DATE_BEGIN, "Beginn (Datum)", "Start date"),
    def(keys::TIME_BEGIN, "Beginn (Uhrzeit)", "Start time"),
    def(keys::DATE_END, "Ende (Datum)", "End date"),
    def(keys::TIME_END, "Ende (Uhrzeit)", "End time"),
    def(keys::LOCATION, "Veranstaltungsort", "Venue"),
    def(keys::STREET1, "Straße", "Street"),
    def(keys::STREET2, "Adresszusatz", "Address line 2"),
    def(keys::HOUSE_NUMBER, "Hausnummer", "House number"),
    def(keys::POST_CODE, "PLZ", "Postcode"),
    def(keys::CITY, "Ort", "City"),
    def(keys::PHONE, "Telefon", "Phone"),
    def(keys::EMAIL, "E-Mail", "Email"),
    def(keys::WEBSITE, "Webseite", "Website"),
    def(keys::EVENT_TYPE_1, "Veranstaltungsart 1", "Event type 1"),
    def(keys::EVENT_TYPE_2, "Veranstaltungsart 2", "Event type 2"),
    def(keys::LAT, "Breitengrad", "Latitude"),
    def(keys::LNG, "Längengrad", "Longitude"),
];

static LOCATION_DICTIONARY: HeaderDictionary = HeaderDictionary {
    kind: ImportKind::Location,
    headers: &LOCATION_HEADERS,
    required: &[
        keys::TITLE_DE,
        keys::STREET1,
        keys::HOUSE_NUMBER,
        keys::POST_CODE,
        keys::CITY,
    ],
    required_groups: &[&[keys::TYPE_1, keys::TYPE_2]],
};

static EVENT_DICTIONARY: HeaderDictionary = HeaderDictionary {
    kind: ImportKind::Event,
    headers: &EVENT_HEADERS,
    required: &[
        keys::EVENT_ID,
        keys::TITLE_DE,
        keys::DATE_BEGIN,
        keys::TIME_BEGIN,
        keys::CITY,
    ],
    required_groups: &[&[keys::EVENT_TYPE_1, keys::EVENT_TYPE_2]],
};

/// Returns the dictionary for an import kind.
pub fn dictionary(kind: ImportKind) -> &'static HeaderDictionary {
    match kind {
        ImportKind::Location => &LOCATION_DICTIONARY,
        ImportKind::Event => &EVENT_DICTIONARY,
    }
}
