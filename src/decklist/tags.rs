use crate::card::CardRecord;
use serde::{Deserialize, Serialize};

/// Behavioral tags attached to deck cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardTags {
    #[serde(skip_serializing_if = "is_false")]
    pub is_emperor: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_cycler: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_matthew: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_crowds: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Tables deciding which cards get which tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagRules {
    /// Exact card names of the emperors
    pub emperors: Vec<String>,
    /// Exact card names that always cycle
    pub cyclers: Vec<String>,
    /// Special ability phrases (case-insensitive) that mark a cycler
    pub cycler_ability_phrases: Vec<String>,
    /// Name prefixes of the Matthew search cards
    pub matthew_prefixes: Vec<String>,
    /// Name fragments of the Crowds cards
    pub crowds_phrases: Vec<String>,
}

impl Default for TagRules {
    fn default() -> Self {
        let strings = |list: &[&str]| -> Vec<String> { list.iter().map(|s| s.to_string()).collect() };
        TagRules {
            emperors: strings(&[
                "Caesar Augustus",
                "Tiberius Caesar",
                "Caligula",
                "Claudius",
                "Nero",
            ]),
            cyclers: Vec::new(),
            cycler_ability_phrases: strings(&["draw a card", "draw 1 card"]),
            matthew_prefixes: strings(&["Matthew"]),
            crowds_phrases: strings(&["Crowds"]),
        }
    }
}

impl TagRules {
    pub fn tag(&self, card_name: &str, record: &CardRecord) -> CardTags {
        let ability = record.special_ability.to_lowercase();
        CardTags {
            is_emperor: self.emperors.iter().any(|n| n == card_name),
            is_cycler: self.cyclers.iter().any(|n| n == card_name)
                || self
                    .cycler_ability_phrases
                    .iter()
                    .any(|p| ability.contains(&p.to_lowercase())),
            is_matthew: self.matthew_prefixes.iter().any(|p| card_name.starts_with(p.as_str())),
            is_crowds: self.crowds_phrases.iter().any(|p| card_name.contains(p.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ability: &str) -> CardRecord {
        CardRecord {
            special_ability: ability.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_tags() {
        let rules = TagRules::default();
        let tags = rules.tag("Matthew (Ap)", &record("Search your deck for a Hero."));
        assert!(tags.is_matthew);
        assert!(!tags.is_cycler);

        let tags = rules.tag("The Crowds (FoM)", &record(""));
        assert!(tags.is_crowds);

        let tags = rules.tag("Nero", &record(""));
        assert!(tags.is_emperor);
    }

    #[test]
    fn test_cycler_by_ability_phrase() {
        let rules = TagRules::default();
        let tags = rules.tag("Glimpse of Hope", &record("Discard this card. Draw a card."));
        assert!(tags.is_cycler);
    }

    #[test]
    fn test_cycler_by_name() {
        let rules = TagRules {
            cyclers: vec!["Scroll".to_string()],
            ..TagRules::default()
        };
        assert!(rules.tag("Scroll", &record("")).is_cycler);
    }

    #[test]
    fn test_tags_serialize_only_set_flags() {
        let tags = CardTags {
            is_emperor: true,
            ..Default::default()
        };
        let json = serde_json::to_string(&tags).expect("tags should serialize");
        assert_eq!(json, r#"{"is_emperor":true}"#);
    }

    #[test]
    fn test_rules_partial_json_uses_defaults() {
        let rules: TagRules =
            serde_json::from_str(r#"{"emperors": ["Herod"]}"#).expect("rules should parse");
        assert_eq!(rules.emperors, vec!["Herod"]);
        assert_eq!(rules.matthew_prefixes, vec!["Matthew"]);
    }
}
