#[allow(clippy::module_inception)]
pub mod decklist;
pub mod filename;
pub mod tags;

pub use decklist::{
    lookup_name, parse_decklist, AlignmentCounts, DeckCard, DeckData, DeckRules, Decklist,
    DecklistError,
};
pub use filename::{decklist_id, find_decklist_file, find_decks, list_decklists, place, player_name, FilenameError};
pub use tags::{CardTags, TagRules};
