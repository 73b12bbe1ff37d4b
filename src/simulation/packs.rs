//! Booster pack opening simulation.

use crate::card::{CardDatabase, CardRecord};
use crate::rng::GameRng;
use rayon::prelude::*;
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackError {
    #[error("Unknown set '{set}', known sets: {known}")]
    UnknownSet { set: String, known: String },
    #[error("Not enough {rarity} cards in {set}: need {needed}, have {available}")]
    PoolTooSmall {
        set: String,
        rarity: String,
        needed: usize,
        available: usize,
    },
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Which cards fill a group of pack slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRarity {
    /// Any card of the set (sets without rarities, like Roots)
    Any,
    /// One Rare or Ultra-Rare
    RareOrUltraRare,
    /// Cards with this exact rarity
    Exactly(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct PackSlot {
    pub set: &'static str,
    pub rarity: SlotRarity,
    pub count: usize,
}

/// Slots of every pack for the sets we can simulate
pub fn pack_distribution(set_name: &str) -> Option<&'static [PackSlot]> {
    const ISRAELS_INHERITANCE: &[PackSlot] = &[
        PackSlot {
            set: "Roots",
            rarity: SlotRarity::Any,
            count: 5,
        },
        PackSlot {
            set: "Israel's Inheritance",
            rarity: SlotRarity::RareOrUltraRare,
            count: 1,
        },
        PackSlot {
            set: "Israel's Inheritance",
            rarity: SlotRarity::Exactly("Common"),
            count: 3,
        },
    ];

    match set_name {
        "Israel's Inheritance" => Some(ISRAELS_INHERITANCE),
        _ => None,
    }
}

pub const KNOWN_SETS: &[&str] = &["Israel's Inheritance"];

fn slot_pool<'a>(slot: &PackSlot, db: &'a CardDatabase) -> Vec<&'a CardRecord> {
    let mut pool: Vec<&CardRecord> = db
        .by_set(slot.set)
        .filter(|card| match slot.rarity {
            SlotRarity::Any => true,
            SlotRarity::RareOrUltraRare => card.rarity == "Rare" || card.rarity == "Ultra-Rare",
            SlotRarity::Exactly(rarity) => card.rarity == rarity,
        })
        .collect();
    // Database order is a hash map's; sort so a seed always opens the same pack
    pool.sort_by(|a, b| a.name.cmp(&b.name));
    pool
}

fn rarity_label(rarity: SlotRarity) -> String {
    match rarity {
        SlotRarity::Any => "any".to_string(),
        SlotRarity::RareOrUltraRare => "Rare/Ultra-Rare".to_string(),
        SlotRarity::Exactly(r) => r.to_string(),
    }
}

/// Card pools for every slot of a set's packs, built once and reused for
/// each pack opened
#[derive(Debug)]
pub struct PackPools<'a> {
    slots: Vec<(PackSlot, Vec<&'a CardRecord>)>,
}

impl<'a> PackPools<'a> {
    pub fn new(set_name: &str, db: &'a CardDatabase) -> Result<Self, PackError> {
        let slots = pack_distribution(set_name).ok_or_else(|| PackError::UnknownSet {
            set: set_name.to_string(),
            known: KNOWN_SETS.join(", "),
        })?;

        let mut pools = Vec::with_capacity(slots.len());
        for slot in slots {
            let pool = slot_pool(slot, db);
            if pool.len() < slot.count {
                return Err(PackError::PoolTooSmall {
                    set: slot.set.to_string(),
                    rarity: rarity_label(slot.rarity),
                    needed: slot.count,
                    available: pool.len(),
                });
            }
            pools.push((*slot, pool));
        }
        Ok(PackPools { slots: pools })
    }

    pub fn pool_sizes(&self) -> Vec<usize> {
        self.slots.iter().map(|(_, pool)| pool.len()).collect()
    }

    /// Open one pack: each slot samples its pool without replacement
    pub fn open(&self, rng: &mut GameRng) -> Vec<CardRecord> {
        let mut pack = Vec::new();
        for (slot, pool) in &self.slots {
            for idx in rng.sample(pool.len(), slot.count) {
                pack.push(pool[idx].clone());
            }
        }
        pack
    }
}

pub fn open_pack(
    set_name: &str,
    db: &CardDatabase,
    rng: &mut GameRng,
) -> Result<Vec<CardRecord>, PackError> {
    Ok(PackPools::new(set_name, db)?.open(rng))
}

/// `n_simulations` runs of opening `n_packs` packs each
pub fn simulate_packs(
    set_name: &str,
    n_simulations: usize,
    n_packs: usize,
    db: &CardDatabase,
    seed: Option<u64>,
) -> Result<Vec<Vec<Vec<CardRecord>>>, PackError> {
    let base_seed = GameRng::new(seed).seed();
    log::info!(
        "Opening {} x {} packs of {} (seed {})",
        n_simulations,
        n_packs,
        set_name,
        base_seed
    );

    let pools = PackPools::new(set_name, db)?;
    Ok((0..n_simulations)
        .into_par_iter()
        .map(|i| {
            let mut rng = GameRng::new(Some(base_seed.wrapping_add(i as u64)));
            (0..n_packs).map(|_| pools.open(&mut rng)).collect()
        })
        .collect())
}

/// Write one row per opened card
pub fn write_packs_csv<W: Write>(
    writer: W,
    simulations: &[Vec<Vec<CardRecord>>],
) -> Result<(), PackError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "PK",
        "SimulationNumber",
        "PackNumber",
        "CardName",
        "Rarity",
        "SetName",
        "Brigade",
        "Type",
        "Strength",
        "Toughness",
        "Class",
        "Identifier",
        "Reference",
        "Alignment",
    ])?;

    for (sim_num, simulation) in simulations.iter().enumerate() {
        for (pack_num, pack) in simulation.iter().enumerate() {
            for card in pack {
                let (sim, pack) = ((sim_num + 1).to_string(), (pack_num + 1).to_string());
                csv.write_record([
                    format!("{}_{}_{}", sim, pack, card.name).as_str(),
                    &sim,
                    &pack,
                    &card.name,
                    &card.rarity,
                    &card.official_set,
                    &card.brigade,
                    &card.card_type,
                    &card.strength,
                    &card.toughness,
                    &card.class,
                    &card.identifier,
                    &card.reference,
                    &card.alignment,
                ])?;
            }
        }
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_db() -> CardDatabase {
        CardDatabase::from_path("fixtures/carddata.txt").expect("Failed to load cards")
    }

    #[test]
    fn test_open_pack_composition() {
        let db = fixture_db();
        let mut rng = GameRng::new(Some(11));
        let pack = open_pack("Israel's Inheritance", &db, &mut rng).expect("pack should open");
        assert_eq!(pack.len(), 9);
        assert_eq!(pack.iter().filter(|c| c.official_set == "Roots").count(), 5);
        let inheritance: Vec<_> = pack.iter().filter(|c| c.official_set == "Israel's Inheritance").collect();
        assert_eq!(inheritance.iter().filter(|c| c.rarity == "Common").count(), 3);
        assert_eq!(
            inheritance.iter().filter(|c| c.rarity == "Rare" || c.rarity == "Ultra-Rare").count(),
            1
        );
    }

    #[test]
    fn test_slot_has_no_duplicates() {
        let db = fixture_db();
        let mut rng = GameRng::new(Some(3));
        for _ in 0..20 {
            let pack = open_pack("Israel's Inheritance", &db, &mut rng).expect("pack should open");
            let mut roots: Vec<&str> = pack
                .iter()
                .filter(|c| c.official_set == "Roots")
                .map(|c| c.name.as_str())
                .collect();
            roots.sort_unstable();
            roots.dedup();
            assert_eq!(roots.len(), 5);
        }
    }

    #[test]
    fn test_unknown_set() {
        let db = fixture_db();
        let mut rng = GameRng::new(Some(1));
        assert!(matches!(
            open_pack("Nonexistent", &db, &mut rng),
            Err(PackError::UnknownSet { .. })
        ));
    }

    #[test]
    fn test_pool_too_small() {
        let db = CardDatabase::from_reader("Name\tOfficialSet\tRarity\nAbraham (Roots)\tRoots\t\n".as_bytes())
            .expect("Failed to load cards");
        let mut rng = GameRng::new(Some(1));
        assert!(matches!(
            open_pack("Israel's Inheritance", &db, &mut rng),
            Err(PackError::PoolTooSmall { needed: 5, available: 1, .. })
        ));
    }

    #[test]
    fn test_pools_reused_across_packs() {
        let db = fixture_db();
        let pools = PackPools::new("Israel's Inheritance", &db).expect("pools should build");
        let sizes = pools.pool_sizes();
        assert_eq!(sizes.len(), 3);
        assert_eq!(sizes[0], db.by_set("Roots").count());

        let mut shared = GameRng::new(Some(21));
        let mut fresh = GameRng::new(Some(21));
        for _ in 0..5 {
            let from_pools = pools.open(&mut shared);
            let from_db = open_pack("Israel's Inheritance", &db, &mut fresh).expect("pack should open");
            assert_eq!(from_pools, from_db);
        }
    }

    #[test]
    fn test_simulate_packs_is_reproducible() {
        let db = fixture_db();
        let a = simulate_packs("Israel's Inheritance", 4, 6, &db, Some(99)).expect("packs should open");
        let b = simulate_packs("Israel's Inheritance", 4, 6, &db, Some(99)).expect("packs should open");
        assert_eq!(a.len(), 4);
        assert!(a.iter().all(|sim| sim.len() == 6));
        assert_eq!(a, b);
    }

    #[test]
    fn test_write_packs_csv() {
        let db = fixture_db();
        let sims = simulate_packs("Israel's Inheritance", 2, 1, &db, Some(5)).expect("packs should open");
        let mut out = Vec::new();
        write_packs_csv(&mut out, &sims).expect("csv should write");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + 2 * 9);
        assert!(lines[0].starts_with("PK,SimulationNumber,PackNumber,CardName"));
        assert!(lines[1].starts_with("1_1_"));
        assert!(lines[10].starts_with("2_1_"));
    }
}
