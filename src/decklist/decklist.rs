use crate::card::{
    normalize_apostrophes, normalize_brigade_field, Alignment, BrigadeError, CardDatabase,
    CardRecord,
};
use crate::decklist::tags::{CardTags, TagRules};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecklistError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid quantity '{value}' at line {line}")]
    InvalidQuantity { line: usize, value: String },
    #[error("Please load a deck_file that contains at least one card in the main deck.")]
    EmptyMainDeck,
    #[error("Main deck has {found} cards, at least {required} are required")]
    TooFewCards { found: u32, required: u32 },
    #[error("Reserve has {found} cards, at most {allowed} are allowed")]
    ReserveTooLarge { found: u32, allowed: u32 },
    #[error("Quantity of '{name}' overflows the deck count")]
    QuantityOverflow { name: String },
    #[error(transparent)]
    Brigade(#[from] BrigadeError),
}

/// One `quantity<TAB>name` line of a decklist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckLine {
    pub quantity: u32,
    pub name: String,
}

/// Raw decklist sections before card lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDecklist {
    pub main: Vec<DeckLine>,
    pub reserve: Vec<DeckLine>,
    pub has_reserve: bool,
}

/// Parse the text of a Lackey decklist.
///
/// Lines without a tab are ignored, `Reserve:` starts the reserve section
/// and `Tokens:` ends the list.
pub fn parse_decklist(text: &str) -> Result<ParsedDecklist, DecklistError> {
    let mut parsed = ParsedDecklist::default();

    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.starts_with("Tokens:") {
            break;
        }
        if line.starts_with("Reserve:") {
            parsed.has_reserve = true;
            continue;
        }

        let Some((quantity, name)) = line.split_once('\t') else {
            continue;
        };
        let quantity = quantity.trim();
        let quantity: u32 = quantity.parse().map_err(|_| DecklistError::InvalidQuantity {
            line: line_num + 1,
            value: quantity.to_string(),
        })?;

        let entry = DeckLine {
            quantity,
            name: normalize_apostrophes(name.trim()),
        };
        if parsed.has_reserve {
            parsed.reserve.push(entry);
        } else {
            parsed.main.push(entry);
        }
    }

    Ok(parsed)
}

/// Name used for database lookup: Lackey doubles embedded quotes and may
/// wrap the whole name in quotes.
pub fn lookup_name(name: &str) -> String {
    name.replace("\"\"", "\"").trim_matches('"').to_string()
}

/// A deck card joined with its database record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckCard {
    pub quantity: u32,
    #[serde(flatten)]
    pub record: CardRecord,
    pub brigades: Vec<String>,
    pub tags: CardTags,
}

impl DeckCard {
    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn is_lost_soul(&self) -> bool {
        self.record.is_lost_soul()
    }
}

/// Deck size limits checked before simulating or printing a deck
#[derive(Debug, Clone, Copy)]
pub struct DeckRules {
    pub min_main: u32,
    pub max_reserve: u32,
}

impl Default for DeckRules {
    fn default() -> Self {
        DeckRules {
            min_main: 50,
            max_reserve: 10,
        }
    }
}

/// Serialized deck, keyed by card name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckData {
    pub main_deck: BTreeMap<String, DeckCard>,
    pub reserve: BTreeMap<String, DeckCard>,
}

/// Card tallies by alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentCounts {
    pub good: u32,
    pub evil: u32,
    pub neutral: u32,
    pub other: u32,
}

/// A decklist mapped against the card database
#[derive(Debug, Clone)]
pub struct Decklist {
    pub main: Vec<DeckCard>,
    pub reserve: Vec<DeckCard>,
    pub has_reserve: bool,
    /// Names that were not found in the card database
    pub missing: Vec<String>,
}

impl Decklist {
    /// Load and map a decklist file
    pub fn load<P: AsRef<Path>>(
        path: P,
        db: &CardDatabase,
        rules: &TagRules,
    ) -> Result<Self, DecklistError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded decklist from {}", path.as_ref().display());
        Self::from_text(&text, db, rules)
    }

    /// Load a decklist and reject it if it breaks the size limits
    pub fn load_checked<P: AsRef<Path>>(
        path: P,
        db: &CardDatabase,
        tag_rules: &TagRules,
        deck_rules: DeckRules,
    ) -> Result<Self, DecklistError> {
        let decklist = Self::load(path, db, tag_rules)?;
        decklist.validate(deck_rules)?;
        Ok(decklist)
    }

    pub fn from_text(text: &str, db: &CardDatabase, rules: &TagRules) -> Result<Self, DecklistError> {
        let parsed = parse_decklist(text)?;
        if parsed.main.is_empty() {
            return Err(DecklistError::EmptyMainDeck);
        }

        let mut missing = Vec::new();
        let main = map_card_metadata(&parsed.main, db, rules, &mut missing)?;
        let reserve = map_card_metadata(&parsed.reserve, db, rules, &mut missing)?;

        Ok(Decklist {
            main,
            reserve,
            has_reserve: parsed.has_reserve,
            missing,
        })
    }

    pub fn main_size(&self) -> u32 {
        self.main.iter().map(|c| c.quantity).sum()
    }

    pub fn reserve_size(&self) -> u32 {
        self.reserve.iter().map(|c| c.quantity).sum()
    }

    pub fn lost_soul_count(&self) -> u32 {
        self.main
            .iter()
            .filter(|c| c.is_lost_soul())
            .map(|c| c.quantity)
            .sum()
    }

    /// Check the deck against size limits
    pub fn validate(&self, rules: DeckRules) -> Result<(), DecklistError> {
        let main = self.main_size();
        if main < rules.min_main {
            return Err(DecklistError::TooFewCards {
                found: main,
                required: rules.min_main,
            });
        }
        let reserve = self.reserve_size();
        if reserve > rules.max_reserve {
            return Err(DecklistError::ReserveTooLarge {
                found: reserve,
                allowed: rules.max_reserve,
            });
        }
        Ok(())
    }

    pub fn alignment_counts(&self) -> AlignmentCounts {
        let mut counts = AlignmentCounts::default();
        for card in &self.main {
            match card.record.alignment() {
                Some(Alignment::Good) => counts.good += card.quantity,
                Some(Alignment::Evil) => counts.evil += card.quantity,
                Some(Alignment::Neutral) => counts.neutral += card.quantity,
                None => counts.other += card.quantity,
            }
        }
        counts
    }

    /// One entry per physical card in the main deck
    pub fn expand_main(&self) -> Vec<&DeckCard> {
        self.main
            .iter()
            .flat_map(|c| std::iter::repeat(c).take(c.quantity as usize))
            .collect()
    }

    pub fn to_deck_data(&self) -> DeckData {
        let keyed = |cards: &[DeckCard]| {
            cards
                .iter()
                .map(|c| (c.name().to_string(), c.clone()))
                .collect::<BTreeMap<_, _>>()
        };
        DeckData {
            main_deck: keyed(&self.main),
            reserve: keyed(&self.reserve),
        }
    }

    /// Dump the mapped deck as pretty JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), DecklistError> {
        let json = serde_json::to_string_pretty(&self.to_deck_data())?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn map_card_metadata(
    lines: &[DeckLine],
    db: &CardDatabase,
    rules: &TagRules,
    missing: &mut Vec<String>,
) -> Result<Vec<DeckCard>, DecklistError> {
    let mut cards: Vec<DeckCard> = Vec::new();
    // Section total stays within u32 so the size sums cannot overflow
    let mut total: u32 = 0;

    for line in lines {
        let name = lookup_name(&line.name);
        let Some(record) = db.get(&name) else {
            log::warn!("Could not find {}. Skipping loading it.", line.name);
            missing.push(line.name.clone());
            continue;
        };

        let overflow = || DecklistError::QuantityOverflow {
            name: line.name.clone(),
        };
        total = total.checked_add(line.quantity).ok_or_else(overflow)?;

        // Same card listed twice: keep one entry with the combined count
        if let Some(existing) = cards.iter_mut().find(|c| c.name() == name) {
            existing.quantity = existing.quantity.checked_add(line.quantity).ok_or_else(overflow)?;
            continue;
        }

        let brigades = normalize_brigade_field(&record.brigade, &record.alignment, &line.name)?;
        let tags = rules.tag(&name, record);
        cards.push(DeckCard {
            quantity: line.quantity,
            record: record.clone(),
            brigades,
            tags,
        });
    }

    Ok(cards)
}
