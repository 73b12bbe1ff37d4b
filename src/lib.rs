pub mod card;
pub mod config;
pub mod decklist;
pub mod report;
pub mod rng;
pub mod simulation;
pub mod tagger;
