//! Flat CSV tables built from a folder of decklists.

use crate::card::{normalize_brigade_field, BrigadeError, CardDatabase, CardRecord};
use crate::decklist::{
    decklist_id, list_decklists, lookup_name, parse_decklist, place, player_name, DeckRules,
    Decklist, DecklistError, FilenameError, TagRules,
};
use crate::simulation::{build_sim_deck, run_simulation, SimulationConfig, SimulationResults};
use indicatif::ProgressBar;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Decklist error: {0}")]
    Decklist(#[from] DecklistError),
    #[error("Brigade error: {0}")]
    Brigade(#[from] BrigadeError),
    #[error("Decklist name error: {0}")]
    Filename(#[from] FilenameError),
}

/// One decklist line in `cards.csv`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardRow {
    pub card_id: String,
    pub decklist_id: String,
    pub place: Option<u32>,
    pub player_name: String,
    pub quantity: u32,
    pub brigade: String,
    pub n_brigades: usize,
    pub card_name: String,
    pub in_reserve: bool,
    pub image_file: String,
    pub official_set: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub strength: String,
    pub toughness: String,
    pub class: String,
    pub identifier: String,
    pub special_ability: String,
    pub rarity: String,
    pub reference: String,
    pub alignment: String,
    pub legality: String,
}

/// Rows for every card line of one decklist. Cards missing from the
/// database are kept with blank metadata.
pub fn card_rows(id: &str, text: &str, db: &CardDatabase) -> Result<Vec<CardRow>, TableError> {
    let player = player_name(id)?;
    let place = place(id);
    let parsed = parse_decklist(text)?;

    let lines = parsed
        .main
        .iter()
        .map(|line| (line, false))
        .chain(parsed.reserve.iter().map(|line| (line, true)));

    let blank = CardRecord::default();
    let mut rows = Vec::new();
    for (line, in_reserve) in lines {
        let record = match db.get(&lookup_name(&line.name)) {
            Some(record) => record,
            None => {
                log::debug!("{}: no card data for {}", id, line.name);
                &blank
            }
        };
        let brigades = normalize_brigade_field(&record.brigade, &record.alignment, &line.name)?;

        rows.push(CardRow {
            card_id: format!("{}_{}", player, record.image_file),
            decklist_id: id.to_string(),
            place,
            player_name: player.clone(),
            quantity: line.quantity,
            brigade: brigades.join("/"),
            n_brigades: brigades.len(),
            card_name: line.name.clone(),
            in_reserve,
            image_file: record.image_file.clone(),
            official_set: record.official_set.clone(),
            card_type: record.card_type.clone(),
            strength: record.strength.clone(),
            toughness: record.toughness.clone(),
            class: record.class.clone(),
            identifier: record.identifier.clone(),
            special_ability: record.special_ability.clone(),
            rarity: record.rarity.clone(),
            reference: record.reference.clone(),
            alignment: record.alignment.clone(),
            legality: record.legality.clone(),
        });
    }
    Ok(rows)
}

/// Write rows under a single header line
pub fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), TableError> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

fn create_output(out_path: &Path) -> Result<std::fs::File, TableError> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(std::fs::File::create(out_path)?)
}

/// `cards.csv` over every decklist in `dir`, in file name order
pub fn build_cards_table(
    dir: &Path,
    db: &CardDatabase,
    out_path: &Path,
) -> Result<usize, TableError> {
    let mut rows = Vec::new();
    for path in list_decklists(dir)? {
        let id = decklist_id(&path);
        let text = std::fs::read_to_string(&path)?;
        let deck_rows = card_rows(&id, &text, db)?;
        log::info!("Deck for {} from {}: {} rows", player_name(&id)?, id, deck_rows.len());
        rows.extend(deck_rows);
    }

    write_rows(create_output(out_path)?, &rows)?;
    log::info!("Wrote {} card rows to {}", rows.len(), out_path.display());
    Ok(rows.len())
}

/// One decklist in `decks.csv`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckRow {
    pub decklist_id: String,
    pub player_name: String,
    pub place: Option<u32>,
    pub main_size: u32,
    pub reserve_size: u32,
    pub lost_souls: u32,
    pub good_count: u32,
    pub evil_count: u32,
    pub neutral_count: u32,
    pub m_count: Option<f64>,
    pub whiff_percentage: Option<f64>,
}

pub fn deck_row(
    id: &str,
    decklist: &Decklist,
    results: Option<&SimulationResults>,
) -> Result<DeckRow, TableError> {
    let counts = decklist.alignment_counts();
    Ok(DeckRow {
        decklist_id: id.to_string(),
        player_name: player_name(id)?,
        place: place(id),
        main_size: decklist.main_size(),
        reserve_size: decklist.reserve_size(),
        lost_souls: decklist.lost_soul_count(),
        good_count: counts.good,
        evil_count: counts.evil,
        neutral_count: counts.neutral,
        m_count: results.map(|r| r.m_count),
        whiff_percentage: results.map(|r| r.whiff_percentage),
    })
}

/// Simulate one deck for the table; decks that cannot be simulated get
/// blank simulation columns.
fn simulate_for_table(
    id: &str,
    decklist: &Decklist,
    deck_rules: DeckRules,
    config: &SimulationConfig,
) -> Option<SimulationResults> {
    if let Err(e) = decklist.validate(deck_rules) {
        log::warn!("Not simulating {}: {}", id, e);
        return None;
    }
    match run_simulation(&build_sim_deck(decklist), config, &ProgressBar::hidden()) {
        Ok(results) => Some(results),
        Err(e) => {
            log::warn!("Not simulating {}: {}", id, e);
            None
        }
    }
}

/// `decks.csv` over every decklist in `dir`; with a simulation config each
/// deck also gets its m_count
pub fn build_decks_table(
    dir: &Path,
    db: &CardDatabase,
    tag_rules: &TagRules,
    deck_rules: DeckRules,
    simulation: Option<&SimulationConfig>,
    out_path: &Path,
) -> Result<Vec<DeckRow>, TableError> {
    let mut rows = Vec::new();
    for path in list_decklists(dir)? {
        let id = decklist_id(&path);
        let decklist = Decklist::load(&path, db, tag_rules)?;
        let results =
            simulation.and_then(|config| simulate_for_table(&id, &decklist, deck_rules, config));
        rows.push(deck_row(&id, &decklist, results.as_ref())?);
    }

    write_rows(create_output(out_path)?, &rows)?;
    log::info!("Wrote {} deck rows to {}", rows.len(), out_path.display());
    Ok(rows)
}
