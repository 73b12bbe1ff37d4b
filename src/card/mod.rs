pub mod brigades;
pub mod database;
pub mod names;
pub mod types;

pub use brigades::{normalize_brigade_field, BrigadeError, EVIL_BRIGADES, GOOD_BRIGADES};
pub use database::{CardDatabase, CardDatabaseError};
pub use names::clean_card_name;
pub use types::{normalize_apostrophes, Alignment, CardRecord};
