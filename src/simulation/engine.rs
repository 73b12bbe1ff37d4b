use crate::card::CardDatabase;
use crate::decklist::{DeckRules, Decklist, DecklistError, TagRules};
use crate::rng::GameRng;
use crate::simulation::hand::{build_sim_deck, CyclerLogic, SimCard};
use crate::simulation::mulligan::{run_trial, TrialResult};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("{name} must be between 0 and 1, got {value}")]
    InvalidRate { name: &'static str, value: f64 },
    #[error("n_simulations must be at least 1")]
    NoSimulations,
    #[error("hand_size must be at least 1")]
    NoHandSize,
    #[error("Deck has no cards to simulate")]
    EmptyDeck,
    #[error("Deck has no Matthew or Crowds cards, every hand would whiff")]
    NoTargets,
    #[error("Decklist error: {0}")]
    Decklist(#[from] DecklistError),
}

/// Parameters of an m_count simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub n_simulations: usize,
    pub cycler_logic: CyclerLogic,
    pub crowds_ineffectiveness_weight: f64,
    pub matthew_fizzle_rate: f64,
    pub hand_size: usize,
    pub max_mulligans: u32,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            n_simulations: 10_000,
            cycler_logic: CyclerLogic::Cycle,
            crowds_ineffectiveness_weight: 0.5,
            matthew_fizzle_rate: 0.1,
            hand_size: 8,
            max_mulligans: 10,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        for (name, value) in [
            ("crowds_ineffectiveness_weight", self.crowds_ineffectiveness_weight),
            ("matthew_fizzle_rate", self.matthew_fizzle_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimulationError::InvalidRate { name, value });
            }
        }
        if self.n_simulations == 0 {
            return Err(SimulationError::NoSimulations);
        }
        if self.hand_size == 0 {
            return Err(SimulationError::NoHandSize);
        }
        Ok(())
    }
}

/// Aggregate statistics over all trials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResults {
    pub n_simulations: usize,
    pub seed: u64,
    /// Mean number of mulligans before a hit
    pub m_count: f64,
    /// Percent of first hands that missed
    pub whiff_percentage: f64,
    /// Percent of trials that never hit within the mulligan limit
    pub exhausted_percentage: f64,
    pub avg_lost_souls: f64,
    pub median_mulligans: u32,
    pub p90_mulligans: u32,
    /// Trials per mulligan count
    pub distribution: BTreeMap<u32, usize>,
}

/// Simulation results together with the deck they were run on
#[derive(Debug, Clone)]
pub struct DeckSimulation {
    pub results: SimulationResults,
    pub decklist: Decklist,
}

fn percentile(sorted: &[u32], pct: f64) -> u32 {
    if sorted.is_empty() {
        return 0;
    }
    let idx = ((sorted.len() as f64 - 1.0) * pct / 100.0).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

pub fn aggregate_results(trials: &[TrialResult], seed: u64) -> SimulationResults {
    let n = trials.len().max(1) as f64;

    let mut mulligans: Vec<u32> = trials.iter().map(|t| t.mulligans).collect();
    mulligans.sort_unstable();

    let mut distribution = BTreeMap::new();
    for m in &mulligans {
        *distribution.entry(*m).or_insert(0) += 1;
    }

    let whiffs = trials.iter().filter(|t| !t.first_hand_hit).count();
    let exhausted = trials.iter().filter(|t| !t.hit).count();
    let lost_souls: u64 = trials.iter().map(|t| t.lost_souls_drawn as u64).sum();
    let total_mulligans: u64 = mulligans.iter().map(|&m| m as u64).sum();

    SimulationResults {
        n_simulations: trials.len(),
        seed,
        m_count: total_mulligans as f64 / n,
        whiff_percentage: whiffs as f64 / n * 100.0,
        exhausted_percentage: exhausted as f64 / n * 100.0,
        avg_lost_souls: lost_souls as f64 / n,
        median_mulligans: percentile(&mulligans, 50.0),
        p90_mulligans: percentile(&mulligans, 90.0),
        distribution,
    }
}

/// Run `n_simulations` trials in parallel. Trial `i` is seeded with
/// `seed + i`, so a fixed seed gives the same results on any thread count.
pub fn run_simulation(
    deck: &[SimCard],
    config: &SimulationConfig,
    progress: &ProgressBar,
) -> Result<SimulationResults, SimulationError> {
    config.validate()?;
    if deck.is_empty() {
        return Err(SimulationError::EmptyDeck);
    }
    if !deck.iter().any(SimCard::is_target) {
        return Err(SimulationError::NoTargets);
    }

    let base_seed = GameRng::new(config.seed).seed();
    log::info!(
        "Running {} simulations (seed {}, hand size {}, cyclers {:?})",
        config.n_simulations,
        base_seed,
        config.hand_size,
        config.cycler_logic
    );

    progress.set_length(config.n_simulations as u64);
    let trials: Vec<TrialResult> = (0..config.n_simulations)
        .into_par_iter()
        .map(|i| {
            let result = run_trial(deck, base_seed.wrapping_add(i as u64), config);
            progress.inc(1);
            result
        })
        .collect();
    progress.finish_and_clear();

    Ok(aggregate_results(&trials, base_seed))
}

/// Load a decklist, check it, and simulate it
pub fn get_simulation_results<P: AsRef<Path>>(
    decklist_path: P,
    db: &CardDatabase,
    tag_rules: &TagRules,
    deck_rules: DeckRules,
    config: &SimulationConfig,
    progress: &ProgressBar,
) -> Result<DeckSimulation, SimulationError> {
    let decklist = Decklist::load_checked(decklist_path, db, tag_rules, deck_rules)?;
    let deck = build_sim_deck(&decklist);
    let results = run_simulation(&deck, config, progress)?;
    Ok(DeckSimulation { results, decklist })
}

pub fn print_results(results: &SimulationResults, deck_name: &str, only_matthew_results: bool) {
    if only_matthew_results {
        println!("{}: m_count {:.3}", deck_name, results.m_count);
        return;
    }

    println!("\n=== m_count Simulation ===\n");
    println!("Deck: {}", deck_name);
    println!("Simulations: {}", results.n_simulations);
    println!("Seed: {}", results.seed);
    println!();
    println!("m_count:              {:.3}", results.m_count);
    println!("First hand whiffs:    {:.1}%", results.whiff_percentage);
    println!("Never hit:            {:.1}%", results.exhausted_percentage);
    println!("Avg Lost Souls drawn: {:.2}", results.avg_lost_souls);
    println!(
        "Mulligans median/p90: {}/{}",
        results.median_mulligans, results.p90_mulligans
    );
    println!();

    println!("Mulligan distribution:");
    for (mulligans, count) in &results.distribution {
        let pct = *count as f64 / results.n_simulations as f64 * 100.0;
        let bar = "█".repeat((pct / 2.0) as usize);
        println!("  {:2}: {:5.1}% {} ({})", mulligans, pct, bar, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck_with_matthews(matthews: usize, size: usize) -> Vec<SimCard> {
        let mut deck = vec![SimCard::default(); size - matthews];
        deck.extend(vec![
            SimCard {
                matthew: true,
                ..Default::default()
            };
            matthews
        ]);
        deck
    }

    #[test]
    fn test_config_validation() {
        assert!(SimulationConfig::default().validate().is_ok());

        let bad_rate = SimulationConfig {
            matthew_fizzle_rate: 1.5,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            bad_rate.validate(),
            Err(SimulationError::InvalidRate { name: "matthew_fizzle_rate", .. })
        ));

        let no_sims = SimulationConfig {
            n_simulations: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(no_sims.validate(), Err(SimulationError::NoSimulations)));
    }

    #[test]
    fn test_no_targets() {
        let deck = vec![SimCard::default(); 50];
        let result = run_simulation(&deck, &SimulationConfig::default(), &ProgressBar::hidden());
        assert!(matches!(result, Err(SimulationError::NoTargets)));
    }

    #[test]
    fn test_empty_deck() {
        let result = run_simulation(&[], &SimulationConfig::default(), &ProgressBar::hidden());
        assert!(matches!(result, Err(SimulationError::EmptyDeck)));
    }

    #[test]
    fn test_seeded_simulation_is_reproducible() {
        let deck = deck_with_matthews(3, 50);
        let config = SimulationConfig {
            n_simulations: 2_000,
            seed: Some(77),
            ..SimulationConfig::default()
        };
        let a = run_simulation(&deck, &config, &ProgressBar::hidden()).expect("simulation should run");
        let b = run_simulation(&deck, &config, &ProgressBar::hidden()).expect("simulation should run");
        assert_eq!(a.m_count, b.m_count);
        assert_eq!(a.distribution, b.distribution);
        assert_eq!(a.seed, 77);
    }

    #[test]
    fn test_whiff_rate_matches_hypergeometric() {
        // P(no Matthew in 8 of 50 with 3 copies) = C(47,8)/C(50,8) ~= 58.6%
        let deck = deck_with_matthews(3, 50);
        let config = SimulationConfig {
            n_simulations: 20_000,
            matthew_fizzle_rate: 0.0,
            seed: Some(2024),
            ..SimulationConfig::default()
        };
        let results = run_simulation(&deck, &config, &ProgressBar::hidden()).expect("simulation should run");
        assert!(
            (55.0..62.0).contains(&results.whiff_percentage),
            "whiff rate {} out of range",
            results.whiff_percentage
        );
        // Geometric mean of (1 - p) / p ~= 1.41, slightly lowered by the mulligan cap
        assert!(
            (1.2..1.6).contains(&results.m_count),
            "m_count {} out of range",
            results.m_count
        );
    }

    #[test]
    fn test_aggregate_results() {
        let trial = |mulligans, first_hand_hit, hit| TrialResult {
            mulligans,
            first_hand_hit,
            hit,
            lost_souls_drawn: 2,
        };
        let trials = vec![
            trial(0, true, true),
            trial(0, true, true),
            trial(2, false, true),
            trial(10, false, false),
        ];
        let results = aggregate_results(&trials, 5);
        assert_eq!(results.n_simulations, 4);
        assert!((results.m_count - 3.0).abs() < 1e-9);
        assert!((results.whiff_percentage - 50.0).abs() < 1e-9);
        assert!((results.exhausted_percentage - 25.0).abs() < 1e-9);
        assert!((results.avg_lost_souls - 2.0).abs() < 1e-9);
        assert_eq!(results.distribution.get(&0), Some(&2));
        assert_eq!(results.p90_mulligans, 10);
    }

    #[test]
    fn test_percentile() {
        assert_eq!(percentile(&[], 50.0), 0);
        assert_eq!(percentile(&[0, 1, 2, 3, 4], 50.0), 2);
        assert_eq!(percentile(&[0, 1, 2, 3, 4], 100.0), 4);
    }
}
