//! Brigade normalization.
//!
//! The card database stores brigades as free text ("Gold", "Purple/Blue",
//! "Multi", "Red (Gold/Teal)", ...). Reports need a flat list of concrete
//! brigade names where the alignment-dependent ones are resolved:
//! `Gold` becomes `Good Gold` or `Evil Gold`, and `Multi` expands to every
//! brigade of the matching alignment.

use thiserror::Error;

pub const GOOD_BRIGADES: &[&str] = &[
    "Blue",
    "Clay",
    "Good Gold",
    "Green",
    "Purple",
    "Red",
    "Silver",
    "Teal",
    "White",
];

pub const EVIL_BRIGADES: &[&str] = &[
    "Black",
    "Brown",
    "Crimson",
    "Evil Gold",
    "Gray",
    "Orange",
    "Pale Green",
];

/// Neutral cards whose Gold brigade counts as good gold
const NEUTRAL_GOOD_GOLD: &[&str] = &["First Bowl of Wrath (RoJ)", "Banks of the Nile/Pharaoh's Court"];

#[derive(Error, Debug, PartialEq)]
pub enum BrigadeError {
    #[error("Card {card} has an invalid brigade: {brigade}.")]
    InvalidBrigade { card: String, brigade: String },
    #[error("Card {card} has a malformed brigade field: {field}")]
    Malformed { card: String, field: String },
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Brigade lists that the database gets wrong or that can't be parsed
fn brigade_override(card_name: &str) -> Option<Vec<String>> {
    let list: &[&str] = match card_name {
        "Delivered" => &["Green", "Teal", "Evil Gold", "Pale Green"],
        "Eternal Judgment" => &["Green", "White", "Brown", "Crimson"],
        "Scapegoat (PoC)" => &["Teal", "Green", "Crimson"],
        "Zion" => &["Purple"],
        "Ashkelon" => &["Good Gold"],
        "Raamses" => &["White"],
        "Babel (FoM)" => &["Blue"],
        "Sodom & Gomorrah" => &["Silver"],
        "City of Enoch" => &["Blue"],
        "Hebron" => &["Red"],
        "Damascus (LoC)" | "Damascus (Promo)" => &["Red"],
        "Bethlehem (Promo)" => &["White"],
        "Samaria" => &["Green"],
        "Nineveh" => &["Green"],
        "City of Refuge" => &["Teal"],
        "Jerusalem (GoC)" => &["Purple", "Good Gold", "White"],
        "Sychar (GoC)" => &["Good Gold", "Purple"],
        "Fire Foxes" => &["Good Gold", "Crimson", "Black"],
        "Bethlehem (LoC)" => &["Good Gold", "White"],
        "New Jerusalem (Bride of Christ) (RoJ AB)" => GOOD_BRIGADES,
        _ => return None,
    };
    Some(owned(list))
}

/// Split the raw brigade text into its parts
fn split_brigade_field(card_name: &str, brigade: &str) -> Result<Vec<String>, BrigadeError> {
    if let Some(list) = brigade_override(card_name) {
        return Ok(list);
    }

    if brigade.contains("and") {
        let first = brigade.split("and").next().unwrap_or("");
        return Ok(first.trim().split('/').map(str::to_string).collect());
    }

    if brigade.contains('(') {
        let (main, subs) = brigade
            .split_once(" (")
            .filter(|(_, rest)| !rest.contains(" ("))
            .ok_or_else(|| BrigadeError::Malformed {
                card: card_name.to_string(),
                field: brigade.to_string(),
            })?;
        let mut parts: Vec<String> = if main.contains('/') {
            main.trim().split('/').map(str::to_string).collect()
        } else {
            vec![main.to_string()]
        };
        parts.extend(subs.trim_end_matches(')').split('/').map(str::to_string));
        return Ok(parts);
    }

    if brigade.contains('/') {
        return Ok(brigade.split('/').map(str::to_string).collect());
    }

    Ok(vec![brigade.to_string()])
}

fn replace_all(brigades: Vec<String>, from: &str, to: &str) -> Vec<String> {
    brigades
        .into_iter()
        .map(|b| if b == from { to.to_string() } else { b })
        .collect()
}

fn resolve_gold(card_name: &str, alignment: &str, brigades: Vec<String>) -> Vec<String> {
    match alignment {
        "Good" | "" => replace_all(brigades, "Gold", "Good Gold"),
        "Evil" => replace_all(brigades, "Gold", "Evil Gold"),
        "Neutral" => {
            let good = brigades.first().map(String::as_str) == Some("Gold")
                || NEUTRAL_GOOD_GOLD.contains(&card_name);
            let to = if good { "Good Gold" } else { "Evil Gold" };
            replace_all(brigades, "Gold", to)
        }
        _ => brigades,
    }
}

fn resolve_multi(card_name: &str, alignment: &str, brigades: Vec<String>) -> Vec<String> {
    if card_name == "Saul/Paul" {
        return owned(&["Gray", "Good Multi"]);
    }
    match alignment {
        "Good" => replace_all(brigades, "Multi", "Good Multi"),
        "Evil" => replace_all(brigades, "Multi", "Evil Multi"),
        _ if (alignment == "Neutral" && card_name == "Unified Language")
            || card_name == "Philosophy" =>
        {
            owned(&["Good Multi", "Evil Multi"])
        }
        "Neutral" => replace_all(brigades, "Multi", "Good Multi"),
        _ => brigades,
    }
}

/// Swap `Good Multi` / `Evil Multi` markers for the full brigade lists
fn expand_multi(mut brigades: Vec<String>) -> Vec<String> {
    if brigades.iter().any(|b| b == "Good Multi") {
        brigades.retain(|b| b != "Good Multi");
        brigades.extend(owned(GOOD_BRIGADES));
    }
    if brigades.iter().any(|b| b == "Evil Multi") {
        brigades.retain(|b| b != "Evil Multi");
        brigades.extend(owned(EVIL_BRIGADES));
    }
    brigades
}

pub fn is_known_brigade(brigade: &str) -> bool {
    GOOD_BRIGADES.contains(&brigade) || EVIL_BRIGADES.contains(&brigade)
}

/// Normalize a raw brigade field into concrete brigade names
pub fn normalize_brigade_field(
    brigade: &str,
    alignment: &str,
    card_name: &str,
) -> Result<Vec<String>, BrigadeError> {
    if brigade.is_empty() {
        return Ok(Vec::new());
    }

    let mut brigades = split_brigade_field(card_name, brigade)?;

    if brigades.iter().any(|b| b == "Multi") {
        brigades = resolve_multi(card_name, alignment, brigades);
    }
    if brigades.iter().any(|b| b == "Gold") {
        brigades = resolve_gold(card_name, alignment, brigades);
    }
    let brigades = expand_multi(brigades);

    if let Some(bad) = brigades.iter().find(|b| !is_known_brigade(b)) {
        return Err(BrigadeError::InvalidBrigade {
            card: card_name.to_string(),
            brigade: bad.clone(),
        });
    }

    Ok(brigades)
}
