use serde::{Deserialize, Serialize};

/// Card alignment as printed in the card database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Good,
    Evil,
    Neutral,
}

impl Alignment {
    pub fn parse(value: &str) -> Option<Alignment> {
        match value.trim() {
            "Good" => Some(Alignment::Good),
            "Evil" => Some(Alignment::Evil),
            "Neutral" => Some(Alignment::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Good => "Good",
            Alignment::Evil => "Evil",
            Alignment::Neutral => "Neutral",
        }
    }
}

/// One row of the card database. Values are kept exactly as stored;
/// strength and toughness are strings because the database uses blanks
/// and symbols for non-characters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub name: String,
    pub set: String,
    pub image_file: String,
    pub official_set: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub brigade: String,
    pub strength: String,
    pub toughness: String,
    pub class: String,
    pub identifier: String,
    pub special_ability: String,
    pub rarity: String,
    pub reference: String,
    pub sound: String,
    pub alignment: String,
    pub legality: String,
}

impl CardRecord {
    pub fn is_lost_soul(&self) -> bool {
        self.card_type == "Lost Soul"
    }

    pub fn alignment(&self) -> Option<Alignment> {
        Alignment::parse(&self.alignment)
    }
}

/// Replace curly apostrophes with straight ones
pub fn normalize_apostrophes(text: &str) -> String {
    text.replace('\u{2019}', "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_apostrophes() {
        assert_eq!(normalize_apostrophes("Solomon\u{2019}s Temple"), "Solomon's Temple");
        assert_eq!(normalize_apostrophes("Son of God"), "Son of God");
    }

    #[test]
    fn test_alignment_parse() {
        assert_eq!(Alignment::parse("Good"), Some(Alignment::Good));
        assert_eq!(Alignment::parse(" Evil "), Some(Alignment::Evil));
        assert_eq!(Alignment::parse("Neutral"), Some(Alignment::Neutral));
        assert_eq!(Alignment::parse(""), None);
        assert_eq!(Alignment::parse("Good/Evil"), None);
    }

    #[test]
    fn test_is_lost_soul() {
        let card = CardRecord {
            card_type: "Lost Soul".to_string(),
            ..Default::default()
        };
        assert!(card.is_lost_soul());
        assert!(!CardRecord::default().is_lost_soul());
    }
}
