use crate::decklist::Decklist;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How cyclers behave when drawn into the opening hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclerLogic {
    /// Cyclers are ordinary cards
    Keep,
    /// Cyclers are set aside and replaced by the next card
    Cycle,
}

impl FromStr for CyclerLogic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keep" => Ok(CyclerLogic::Keep),
            "cycle" => Ok(CyclerLogic::Cycle),
            other => Err(format!("unknown cycler logic '{}', use 'keep' or 'cycle'", other)),
        }
    }
}

/// The parts of a card the draw simulation cares about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimCard {
    pub lost_soul: bool,
    pub cycler: bool,
    pub matthew: bool,
    pub crowds: bool,
}

impl SimCard {
    pub fn is_target(&self) -> bool {
        self.matthew || self.crowds
    }
}

/// Flatten a decklist's main deck into simulation cards
pub fn build_sim_deck(decklist: &Decklist) -> Vec<SimCard> {
    decklist
        .expand_main()
        .into_iter()
        .map(|card| SimCard {
            lost_soul: card.is_lost_soul(),
            cycler: card.tags.is_cycler,
            matthew: card.tags.is_matthew,
            crowds: card.tags.is_crowds,
        })
        .collect()
}

/// Cards drawn for one opening hand
#[derive(Debug, Clone, Default)]
pub struct OpeningHand {
    pub hand: Vec<SimCard>,
    /// Lost Souls and cycled cards drawn while filling the hand
    pub set_aside: Vec<SimCard>,
    pub lost_souls: u32,
}

impl OpeningHand {
    /// Put every drawn card back into the library
    pub fn return_to(&mut self, library: &mut Vec<SimCard>) {
        library.append(&mut self.hand);
        library.append(&mut self.set_aside);
        self.lost_souls = 0;
    }
}

/// Draw from the top (end) of the library until the hand holds `hand_size`
/// keepable cards. Lost Souls never stay in hand; cyclers are replaced too
/// under [`CyclerLogic::Cycle`]. Stops early if the library runs out.
pub fn draw_opening_hand(
    library: &mut Vec<SimCard>,
    hand_size: usize,
    cycler_logic: CyclerLogic,
) -> OpeningHand {
    let mut opening = OpeningHand {
        hand: Vec::with_capacity(hand_size),
        ..Default::default()
    };

    while opening.hand.len() < hand_size {
        let Some(card) = library.pop() else {
            break;
        };
        if card.lost_soul {
            opening.lost_souls += 1;
            opening.set_aside.push(card);
        } else if card.cycler && cycler_logic == CyclerLogic::Cycle {
            opening.set_aside.push(card);
        } else {
            opening.hand.push(card);
        }
    }

    opening
}
