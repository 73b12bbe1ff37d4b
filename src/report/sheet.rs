//! Deck check sheets and reserve lists.

use crate::card::{clean_card_name, Alignment};
use crate::decklist::{DeckCard, DeckData, DeckRules};
use crate::report::pdf::{Font, Page};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

pub const PAGE_WIDTH: f32 = 1137.0;
pub const PAGE_HEIGHT: f32 = 1469.0;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Card '{card}' has alignment '{alignment}', expected Good, Evil or Neutral")]
    UnknownAlignment { card: String, alignment: String },
    #[error("Reserve list contains {found} cards. Maximum allowed is {allowed}.")]
    ReserveTooLarge { found: u32, allowed: u32 },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckType {
    Type1,
    Type2,
}

impl FromStr for DeckType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "type_1" | "t1" => Ok(DeckType::Type1),
            "type_2" | "t2" => Ok(DeckType::Type2),
            other => Err(format!("unknown deck type '{}', use 'type_1' or 'type_2'", other)),
        }
    }
}

impl DeckType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeckType::Type1 => "type_1",
            DeckType::Type2 => "type_2",
        }
    }

    fn layout(&self) -> &'static SheetLayout {
        match self {
            DeckType::Type1 => &TYPE_1,
            DeckType::Type2 => &TYPE_2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CardTypes {
    Only(&'static [&'static str]),
    /// Everything no other section takes
    Misc,
}

/// A block of card lines. `top` is measured down from the top edge.
#[derive(Debug, Clone, Copy)]
struct Section {
    title: &'static str,
    types: CardTypes,
    x: f32,
    top: f32,
    line_spacing: f32,
    count_at: Option<(f32, f32)>,
}

#[derive(Debug, Clone, Copy)]
struct ReserveBlock {
    x: f32,
    top: f32,
    line_spacing: f32,
    with_quantity: bool,
    count_at: Option<(f32, f32)>,
}

#[derive(Debug)]
struct SheetLayout {
    sections: &'static [Section],
    reserve: ReserveBlock,
    /// Total and per-alignment counts in the top right corner
    tallies: bool,
}

const fn section(
    title: &'static str,
    types: CardTypes,
    x: f32,
    top: f32,
    line_spacing: f32,
    count_at: Option<(f32, f32)>,
) -> Section {
    Section {
        title,
        types,
        x,
        top,
        line_spacing,
        count_at,
    }
}

const ARTIFACTS: &[&str] = &["Artifact", "Covenant", "Curse"];

static TYPE_1: SheetLayout = SheetLayout {
    sections: &[
        section("Dominants", CardTypes::Only(&["Dominant"]), 57.0, 177.0, 16.0, None),
        section("Heroes", CardTypes::Only(&["Hero"]), 57.0, 545.0, 16.0, None),
        section("Good Enhancements", CardTypes::Only(&["GE"]), 54.0, 892.0, 16.0, None),
        section("Lost Souls", CardTypes::Only(&["Lost Soul"]), 310.0, 177.0, 16.0, None),
        section("Evil Characters", CardTypes::Only(&["Evil Character"]), 310.0, 545.0, 16.0, None),
        section("Evil Enhancements", CardTypes::Only(&["EE"]), 310.0, 892.0, 16.0, None),
        section("Artifacts", CardTypes::Only(ARTIFACTS), 560.0, 178.0, 16.0, None),
        section("Fortresses & Sites", CardTypes::Only(&["Fortress", "Site"]), 560.0, 471.0, 17.0, None),
        section("Misc", CardTypes::Misc, 560.0, 709.0, 17.0, None),
    ],
    reserve: ReserveBlock {
        x: 580.0,
        top: 910.0,
        line_spacing: 16.0,
        with_quantity: false,
        count_at: None,
    },
    tallies: false,
};

static TYPE_2: SheetLayout = SheetLayout {
    sections: &[
        section("Dominants", CardTypes::Only(&["Dominant"]), 57.0, 178.0, 16.0, Some((124.0, 150.0))),
        section("Heroes", CardTypes::Only(&["Hero"]), 57.0, 575.0, 16.0, Some((96.0, 557.0))),
        section("Good Enhancements", CardTypes::Only(&["GE"]), 57.0, 920.0, 16.0, Some((188.0, 901.0))),
        section("Lost Souls", CardTypes::Only(&["Lost Soul"]), 310.0, 178.0, 16.0, Some((380.0, 150.0))),
        section("Evil Characters", CardTypes::Only(&["Evil Character"]), 310.0, 572.0, 16.0, Some((408.0, 556.0))),
        section("Evil Enhancements", CardTypes::Only(&["EE"]), 310.0, 920.0, 16.0, Some((435.0, 902.0))),
        section("Artifacts", CardTypes::Only(ARTIFACTS), 560.0, 178.0, 16.0, Some((744.0, 151.0))),
        section(
            "Fortresses & Sites",
            CardTypes::Only(&["Fortress", "Site", "City"]),
            560.0,
            474.0,
            16.0,
            Some((710.0, 451.0)),
        ),
        section("Misc", CardTypes::Misc, 560.0, 668.0, 16.0, Some((596.0, 655.0))),
    ],
    reserve: ReserveBlock {
        x: 580.0,
        top: 858.0,
        line_spacing: 16.0,
        with_quantity: true,
        count_at: Some((612.0, 836.0)),
    },
    tallies: true,
};

impl SheetLayout {
    fn section_cards<'a>(
        &self,
        section: &Section,
        main_deck: &'a BTreeMap<String, DeckCard>,
    ) -> Vec<(&'a String, &'a DeckCard)> {
        main_deck
            .iter()
            .filter(|(_, card)| match section.types {
                CardTypes::Only(types) => types.contains(&card.record.card_type.as_str()),
                CardTypes::Misc => !self.is_listed_type(&card.record.card_type),
            })
            .collect()
    }

    fn is_listed_type(&self, card_type: &str) -> bool {
        self.sections.iter().any(|s| match s.types {
            CardTypes::Only(types) => types.contains(&card_type),
            CardTypes::Misc => false,
        })
    }
}

/// Header details printed on every sheet
#[derive(Debug, Clone)]
pub struct SheetMeta {
    pub player_name: String,
    pub deck_name: String,
    pub date: NaiveDate,
}

impl SheetMeta {
    /// Meta stamped with today's local date
    pub fn today(player_name: impl Into<String>, deck_name: impl Into<String>) -> Self {
        SheetMeta {
            player_name: player_name.into(),
            deck_name: deck_name.into(),
            date: chrono::Local::now().date_naive(),
        }
    }
}

fn from_top(top: f32) -> f32 {
    PAGE_HEIGHT - top
}

fn quantity_total<'a>(cards: impl IntoIterator<Item = &'a DeckCard>) -> u32 {
    cards
        .into_iter()
        .fold(0u32, |total, c| total.saturating_add(c.quantity))
}

fn card_line(name: &str, card: &DeckCard, with_quantity: bool) -> String {
    let display = clean_card_name(name, &card.record.card_type);
    if with_quantity {
        format!("{}x {}", card.quantity, display)
    } else {
        display
    }
}

fn place_lines<'a>(
    page: &mut Page,
    cards: impl IntoIterator<Item = (&'a String, &'a DeckCard)>,
    x: f32,
    top: f32,
    line_spacing: f32,
    with_quantity: bool,
) {
    let mut y = from_top(top);
    for (name, card) in cards {
        page.text(Font::Helvetica, 12.0, x, y, card_line(name, card, with_quantity));
        y -= line_spacing;
    }
}

fn draw_header(page: &mut Page, meta: &SheetMeta, title: &str) {
    page.rect(50.0, from_top(80.0), 300.0, 30.0);
    page.text(
        Font::HelveticaBold,
        12.0,
        55.0,
        from_top(70.0),
        format!("{} ({})", meta.player_name.replace('_', " "), title),
    );
    page.text(Font::Helvetica, 10.0, 55.0, from_top(96.0), format!("Deck: {}", meta.deck_name));
    page.text(
        Font::Helvetica,
        10.0,
        55.0,
        from_top(110.0),
        format!("Date: {}", meta.date.format("%Y-%m-%d")),
    );
}

fn check_alignments(main_deck: &BTreeMap<String, DeckCard>) -> Result<(), SheetError> {
    for (name, card) in main_deck {
        if card.record.alignment().is_none() {
            return Err(SheetError::UnknownAlignment {
                card: name.clone(),
                alignment: card.record.alignment.clone(),
            });
        }
    }
    Ok(())
}

fn draw_tallies(page: &mut Page, main_deck: &BTreeMap<String, DeckCard>) {
    let total = quantity_total(main_deck.values());
    page.text(
        Font::HelveticaBold,
        18.0,
        PAGE_WIDTH - 41.0 - 50.0 + 5.0,
        from_top(94.0 + 30.0 - 10.0),
        total.to_string(),
    );

    let count = |alignment: Alignment| {
        quantity_total(main_deck.values().filter(|c| c.record.alignment() == Some(alignment)))
    };
    for (label, alignment, top_margin) in [
        ("Good", Alignment::Good, 29.0),
        ("Evil", Alignment::Evil, 42.0),
        ("Neutral", Alignment::Neutral, 53.0),
    ] {
        page.text(
            Font::Helvetica,
            10.0,
            PAGE_WIDTH - 85.0 - 50.0 + 5.0,
            from_top(top_margin + 30.0 - 10.0),
            format!("{} Count: {}", label, count(alignment)),
        );
    }
}

/// Lay out a deck check sheet. Every section lists its cards sorted by name
/// as `{qty}x {name}`; Type 2 sheets also carry section counts, the main
/// deck total and the alignment tallies.
pub fn build_check_sheet(
    deck: &DeckData,
    deck_type: DeckType,
    meta: &SheetMeta,
) -> Result<Page, SheetError> {
    let layout = deck_type.layout();
    if layout.tallies {
        check_alignments(&deck.main_deck)?;
    }

    let mut page = Page::new(PAGE_WIDTH, PAGE_HEIGHT);
    draw_header(&mut page, meta, deck_type.as_str());

    for section in layout.sections {
        page.text(
            Font::HelveticaBold,
            12.0,
            section.x,
            from_top(section.top - 24.0),
            section.title,
        );
        let cards = layout.section_cards(section, &deck.main_deck);
        if let Some((x, top)) = section.count_at {
            let total = quantity_total(cards.iter().map(|(_, c)| *c));
            page.text(Font::Helvetica, 12.0, x, from_top(top), total.to_string());
        }
        place_lines(&mut page, cards, section.x, section.top, section.line_spacing, true);
    }

    let reserve = &layout.reserve;
    page.text(Font::HelveticaBold, 12.0, reserve.x, from_top(reserve.top - 24.0), "Reserve");
    if let Some((x, top)) = reserve.count_at {
        let total = quantity_total(deck.reserve.values());
        page.text(Font::Helvetica, 12.0, x, from_top(top), total.to_string());
    }
    place_lines(
        &mut page,
        &deck.reserve,
        reserve.x,
        reserve.top,
        reserve.line_spacing,
        reserve.with_quantity,
    );

    if layout.tallies {
        draw_tallies(&mut page, &deck.main_deck);
    }

    Ok(page)
}

const GRID_COLS: usize = 3;
const GRID_ROWS: usize = 4;
const CELL_WIDTH: f32 = 280.0;
const CELL_HEIGHT: f32 = 246.0;
const GRID_START_Y: f32 = 968.0;
const GRID_MARGIN_LEFT: f32 = 60.0;

/// Lay out a reserve list: each physical reserve card gets its own cell of
/// a 3x4 grid, filled row by row in name order.
pub fn build_reserve_sheet(
    reserve: &BTreeMap<String, DeckCard>,
    rules: DeckRules,
    meta: &SheetMeta,
) -> Result<Page, SheetError> {
    let total = quantity_total(reserve.values());
    if total > rules.max_reserve {
        return Err(SheetError::ReserveTooLarge {
            found: total,
            allowed: rules.max_reserve,
        });
    }
    let cells = GRID_COLS * GRID_ROWS;
    if total as usize > cells {
        log::warn!("Reserve has {} cards, only the first {} fit on the sheet", total, cells);
    }

    let mut page = Page::new(PAGE_WIDTH, PAGE_HEIGHT);
    draw_header(&mut page, meta, "reserve list");

    let names = reserve.iter().flat_map(|(name, card)| {
        std::iter::repeat(clean_card_name(name, &card.record.card_type)).take(card.quantity as usize)
    });
    for (cell, name) in names.take(cells).enumerate() {
        let (row, col) = (cell / GRID_COLS, cell % GRID_COLS);
        page.text(
            Font::Helvetica,
            12.0,
            GRID_MARGIN_LEFT + col as f32 * CELL_WIDTH,
            GRID_START_Y - row as f32 * CELL_HEIGHT,
            name,
        );
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardRecord;

    fn card(card_type: &str, alignment: &str, quantity: u32) -> DeckCard {
        DeckCard {
            quantity,
            record: CardRecord {
                card_type: card_type.to_string(),
                alignment: alignment.to_string(),
                ..Default::default()
            },
            brigades: Vec::new(),
            tags: Default::default(),
        }
    }

    fn deck() -> DeckData {
        let mut main_deck = BTreeMap::new();
        main_deck.insert("Son of God".to_string(), card("Dominant", "Good", 1));
        main_deck.insert("Moses (Promo)".to_string(), card("Hero", "Good", 3));
        main_deck.insert("Burial".to_string(), card("EE", "Evil", 2));
        main_deck.insert(
            "Lost Soul \"Hopper\" [II Chronicles 28:13]".to_string(),
            card("Lost Soul", "Neutral", 4),
        );
        main_deck.insert("Jericho (II)".to_string(), card("City", "Neutral", 1));
        let mut reserve = BTreeMap::new();
        reserve.insert("Peter (Ap)".to_string(), card("Hero", "Good", 2));
        DeckData { main_deck, reserve }
    }

    fn meta() -> SheetMeta {
        SheetMeta {
            player_name: "Jane_Doe".to_string(),
            deck_name: "t1_1st_Jane_Doe".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 8, 1).expect("valid date"),
        }
    }

    fn find<'a>(page: &'a Page, text: &str) -> Option<&'a crate::report::pdf::TextItem> {
        page.texts().find(|t| t.text == text)
    }

    #[test]
    fn test_deck_type_from_str() {
        assert_eq!("type_1".parse::<DeckType>(), Ok(DeckType::Type1));
        assert_eq!("TYPE_2".parse::<DeckType>(), Ok(DeckType::Type2));
        assert!("type_3".parse::<DeckType>().is_err());
    }

    #[test]
    fn test_type_1_positions() {
        let page = build_check_sheet(&deck(), DeckType::Type1, &meta()).expect("sheet should build");
        let sog = find(&page, "1x Son of God").expect("dominant listed");
        assert_eq!((sog.x, sog.y), (57.0, PAGE_HEIGHT - 177.0));
        let hopper = find(&page, "4x Hopper [II Chronicles 28:13]").expect("lost soul listed");
        assert_eq!((hopper.x, hopper.y), (310.0, PAGE_HEIGHT - 177.0));
        // City is not a Type 1 section type
        let jericho = find(&page, "1x Jericho (II)").expect("city in misc");
        assert_eq!((jericho.x, jericho.y), (560.0, PAGE_HEIGHT - 709.0));
        // Type 1 reserve is listed without quantities
        let peter = find(&page, "Peter (Ap)").expect("reserve listed");
        assert_eq!((peter.x, peter.y), (580.0, PAGE_HEIGHT - 910.0));
        assert!(page.texts().all(|t| !t.text.starts_with("Good Count")));
    }

    #[test]
    fn test_type_1_and_type_2_share_card_names() {
        let mut data = deck();
        data.main_deck
            .insert("Saul/Paul (Ap)".to_string(), card("Hero", "Good", 1));
        for deck_type in [DeckType::Type1, DeckType::Type2] {
            let page = build_check_sheet(&data, deck_type, &meta()).expect("sheet should build");
            assert!(find(&page, "1x Saul (Ap)").is_some());
            assert!(find(&page, "4x Hopper [II Chronicles 28:13]").is_some());
            assert!(page.texts().all(|t| !t.text.contains("x Lost Soul")));
        }
    }

    #[test]
    fn test_type_2_counts_and_tallies() {
        let page = build_check_sheet(&deck(), DeckType::Type2, &meta()).expect("sheet should build");
        let jericho = find(&page, "1x Jericho (II)").expect("city with fortresses");
        assert_eq!((jericho.x, jericho.y), (560.0, PAGE_HEIGHT - 474.0));
        assert!(find(&page, "2x Peter (Ap)").is_some());

        let total = find(&page, "11").expect("main total");
        assert_eq!(total.font, Font::HelveticaBold);
        assert_eq!(total.size, 18.0);
        assert!(find(&page, "Good Count: 4").is_some());
        assert!(find(&page, "Evil Count: 2").is_some());
        assert!(find(&page, "Neutral Count: 5").is_some());

        let hero_count = page
            .texts()
            .find(|t| t.x == 96.0 && t.y == PAGE_HEIGHT - 557.0)
            .expect("hero count");
        assert_eq!(hero_count.text, "3");
    }

    #[test]
    fn test_sections_sorted_by_name() {
        let mut data = deck();
        data.main_deck.insert("Aaron".to_string(), card("Hero", "Good", 1));
        let page = build_check_sheet(&data, DeckType::Type1, &meta()).expect("sheet should build");
        let aaron = find(&page, "1x Aaron").expect("aaron");
        let moses = find(&page, "3x Moses (Promo)").expect("moses");
        assert_eq!(aaron.y, PAGE_HEIGHT - 545.0);
        assert_eq!(moses.y, PAGE_HEIGHT - 545.0 - 16.0);
    }

    #[test]
    fn test_type_2_rejects_unknown_alignment() {
        let mut data = deck();
        data.main_deck.insert("Mystery".to_string(), card("Hero", "", 1));
        assert!(matches!(
            build_check_sheet(&data, DeckType::Type2, &meta()),
            Err(SheetError::UnknownAlignment { .. })
        ));
        assert!(build_check_sheet(&data, DeckType::Type1, &meta()).is_ok());
    }

    #[test]
    fn test_header_has_date() {
        let page = build_check_sheet(&deck(), DeckType::Type1, &meta()).expect("sheet should build");
        assert!(find(&page, "Date: 2024-08-01").is_some());
        assert!(find(&page, "Jane Doe (type_1)").is_some());
    }

    #[test]
    fn test_reserve_sheet_grid() {
        let data = deck();
        let page = build_reserve_sheet(&data.reserve, DeckRules::default(), &meta()).expect("reserve should build");
        let cells: Vec<_> = page.texts().filter(|t| t.text == "Peter (Ap)").collect();
        assert_eq!(cells.len(), 2);
        assert_eq!((cells[0].x, cells[0].y), (60.0, 968.0));
        assert_eq!((cells[1].x, cells[1].y), (340.0, 968.0));
    }

    #[test]
    fn test_reserve_sheet_wraps_rows() {
        let mut reserve = BTreeMap::new();
        reserve.insert("A".to_string(), card("Hero", "Good", 4));
        let page = build_reserve_sheet(&reserve, DeckRules::default(), &meta()).expect("reserve should build");
        let fourth = page.texts().filter(|t| t.text == "A").nth(3).expect("fourth cell");
        assert_eq!((fourth.x, fourth.y), (60.0, 968.0 - 246.0));
    }

    #[test]
    fn test_reserve_sheet_too_large() {
        let mut reserve = BTreeMap::new();
        reserve.insert("A".to_string(), card("Hero", "Good", 11));
        assert!(matches!(
            build_reserve_sheet(&reserve, DeckRules::default(), &meta()),
            Err(SheetError::ReserveTooLarge { found: 11, allowed: 10 })
        ));
    }

    #[test]
    fn test_reserve_sheet_uses_configured_limit() {
        let mut reserve = BTreeMap::new();
        reserve.insert("A".to_string(), card("Hero", "Good", 4));
        let strict = DeckRules {
            min_main: 50,
            max_reserve: 3,
        };
        assert!(matches!(
            build_reserve_sheet(&reserve, strict, &meta()),
            Err(SheetError::ReserveTooLarge { found: 4, allowed: 3 })
        ));

        let loose = DeckRules {
            min_main: 50,
            max_reserve: 15,
        };
        reserve.insert("B".to_string(), card("Hero", "Good", 10));
        let page = build_reserve_sheet(&reserve, loose, &meta()).expect("reserve should build");
        let cells = page.texts().filter(|t| t.text == "A" || t.text == "B").count();
        assert_eq!(cells, 12);
    }
}
