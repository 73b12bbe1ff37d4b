/// First double-quoted nickname with at least one character
fn quoted_nickname(name: &str) -> Option<&str> {
    let quotes: Vec<usize> = name.match_indices('"').map(|(i, _)| i).collect();
    quotes
        .windows(2)
        .find(|w| w[1] > w[0] + 1)
        .map(|w| &name[w[0] + 1..w[1]])
}

/// Text after the first usable `[`, up to a `/` or `]`
fn first_verse(name: &str) -> Option<&str> {
    name.match_indices('[').find_map(|(i, _)| {
        let rest = &name[i + 1..];
        let end = rest.find(|c: char| c == '/' || c == ']').unwrap_or(rest.len());
        (end > 0).then(|| &rest[..end])
    })
}

/// Trailing parenthesized set tag, e.g. `(RoJ)`
fn trailing_set_tag(name: &str) -> Option<&str> {
    let trimmed = name.trim_end();
    let close = trimmed.strip_suffix(')')?.len();
    let search_from = trimmed[..close].rfind(')').map(|i| i + 1).unwrap_or(0);
    let open = trimmed[search_from..close].find('(')? + search_from;
    Some(&trimmed[open..])
}

/// Shorten a card name for printing on a check sheet.
///
/// Lost Souls print as their nickname plus first verse; split cards
/// (`A/B`) print only the first half plus any trailing set tag.
pub fn clean_card_name(card_name: &str, card_type: &str) -> String {
    if card_type == "Lost Soul" && card_name.contains("Lost Soul") {
        if let (Some(nickname), Some(verse)) = (quoted_nickname(card_name), first_verse(card_name)) {
            return format!("{} [{}]", nickname, verse);
        }
        return card_name.split('[').next().unwrap_or("").trim().to_string();
    }

    if card_name.contains('/') && !card_name.contains("(I/J+)") {
        let base = card_name.split('/').next().unwrap_or("").trim();
        return match trailing_set_tag(card_name) {
            Some(tag) => format!("{} {}", base, tag.trim()),
            None => base.to_string(),
        };
    }

    card_name.to_string()
}
