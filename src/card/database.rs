use crate::card::types::{normalize_apostrophes, CardRecord};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardDatabaseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Card data parsing error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Card not found: {0}")]
    CardNotFound(String),
    #[error("Card data is missing the '{0}' column")]
    MissingColumn(String),
}

/// Column positions resolved from the header row, matched case-insensitively
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_lowercase(), i))
            .collect();
        Columns { index }
    }

    fn get(&self, row: &StringRecord, column: &str) -> String {
        self.index
            .get(column)
            .and_then(|&i| row.get(i))
            .unwrap_or("")
            .to_string()
    }
}

/// Card database loaded from the tab-delimited `carddata.txt`
pub struct CardDatabase {
    cards: HashMap<String, CardRecord>,
}

impl CardDatabase {
    /// Load cards from a tab-delimited file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CardDatabaseError> {
        let file = std::fs::File::open(path.as_ref())?;
        let db = Self::from_reader(file)?;
        log::info!(
            "Loaded {} cards from {}",
            db.card_count(),
            path.as_ref().display()
        );
        Ok(db)
    }

    /// Load cards from any reader holding tab-delimited card data
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CardDatabaseError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .flexible(true)
            .from_reader(reader);

        let columns = Columns::new(reader.headers()?);
        if !columns.index.contains_key("name") {
            return Err(CardDatabaseError::MissingColumn("Name".to_string()));
        }

        let mut cards = HashMap::new();
        for row in reader.records() {
            let row = row?;
            let record = CardRecord {
                name: normalize_apostrophes(&columns.get(&row, "name")),
                set: columns.get(&row, "set"),
                image_file: columns.get(&row, "imagefile"),
                official_set: columns.get(&row, "officialset"),
                card_type: columns.get(&row, "type"),
                brigade: columns.get(&row, "brigade"),
                strength: columns.get(&row, "strength"),
                toughness: columns.get(&row, "toughness"),
                class: columns.get(&row, "class"),
                identifier: columns.get(&row, "identifier"),
                special_ability: columns.get(&row, "specialability"),
                rarity: columns.get(&row, "rarity"),
                reference: columns.get(&row, "reference"),
                sound: columns.get(&row, "sound"),
                alignment: columns.get(&row, "alignment"),
                legality: columns.get(&row, "legality"),
            };
            if record.name.is_empty() {
                continue;
            }
            cards.insert(record.name.clone(), record);
        }

        Ok(CardDatabase { cards })
    }

    /// Look up a card by (apostrophe-normalized) name
    pub fn get(&self, name: &str) -> Option<&CardRecord> {
        self.cards.get(name)
    }

    /// Get a card by name
    pub fn get_card(&self, name: &str) -> Result<&CardRecord, CardDatabaseError> {
        self.cards
            .get(name)
            .ok_or_else(|| CardDatabaseError::CardNotFound(name.to_string()))
    }

    /// All cards printed in the given official set
    pub fn by_set<'a>(&'a self, official_set: &'a str) -> impl Iterator<Item = &'a CardRecord> {
        self.cards
            .values()
            .filter(move |c| c.official_set == official_set)
    }

    pub fn cards(&self) -> impl Iterator<Item = &CardRecord> {
        self.cards.values()
    }

    /// Get total number of cards
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }
}
