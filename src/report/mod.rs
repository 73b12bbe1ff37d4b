pub mod pairings;
pub mod pdf;
pub mod sheet;
pub mod tables;

pub use pairings::{parse_pairings, standings, write_pairings_table, Outcome, Pairing, PairingsError, Standing};
pub use pdf::{write_pdf, Font, Page};
pub use sheet::{build_check_sheet, build_reserve_sheet, DeckType, SheetError, SheetMeta};
pub use tables::{build_cards_table, build_decks_table, card_rows, deck_row, write_rows, CardRow, DeckRow, TableError};
