use crate::rng::GameRng;
use crate::simulation::engine::SimulationConfig;
use crate::simulation::hand::{draw_opening_hand, SimCard};

/// Outcome of one simulated game start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialResult {
    /// Redraws taken before a hit (or before giving up)
    pub mulligans: u32,
    /// The very first hand was a hit
    pub first_hand_hit: bool,
    /// A hit was eventually found within the mulligan limit
    pub hit: bool,
    /// Lost Souls drawn while filling the first hand
    pub lost_souls_drawn: u32,
}

/// Roll every target card in hand. Matthew cards resolve unless they
/// fizzle; Crowds cards only work some of the time.
pub fn hand_hits(hand: &[SimCard], config: &SimulationConfig, rng: &mut GameRng) -> bool {
    hand.iter().any(|card| {
        (card.matthew && !rng.chance(config.matthew_fizzle_rate))
            || (card.crowds && rng.chance(1.0 - config.crowds_ineffectiveness_weight))
    })
}

/// Shuffle, draw, and redraw until a hit or the mulligan limit
pub fn run_trial(deck: &[SimCard], seed: u64, config: &SimulationConfig) -> TrialResult {
    let mut rng = GameRng::new(Some(seed));
    let mut library = deck.to_vec();
    rng.shuffle(&mut library);

    let mut opening = draw_opening_hand(&mut library, config.hand_size, config.cycler_logic);
    let lost_souls_drawn = opening.lost_souls;
    let mut hit = hand_hits(&opening.hand, config, &mut rng);
    let first_hand_hit = hit;

    let mut mulligans = 0;
    while !hit && mulligans < config.max_mulligans {
        opening.return_to(&mut library);
        rng.shuffle(&mut library);
        opening = draw_opening_hand(&mut library, config.hand_size, config.cycler_logic);
        hit = hand_hits(&opening.hand, config, &mut rng);
        mulligans += 1;
    }

    TrialResult {
        mulligans,
        first_hand_hit,
        hit,
        lost_souls_drawn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matthew() -> SimCard {
        SimCard {
            matthew: true,
            ..Default::default()
        }
    }

    fn crowds() -> SimCard {
        SimCard {
            crowds: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_guaranteed_hit() {
        let deck = vec![matthew(); 50];
        let config = SimulationConfig {
            matthew_fizzle_rate: 0.0,
            ..SimulationConfig::default()
        };
        let result = run_trial(&deck, 1, &config);
        assert_eq!(result.mulligans, 0);
        assert!(result.first_hand_hit);
        assert!(result.hit);
    }

    #[test]
    fn test_always_fizzles_hits_mulligan_limit() {
        let deck = vec![matthew(); 50];
        let config = SimulationConfig {
            matthew_fizzle_rate: 1.0,
            max_mulligans: 4,
            ..SimulationConfig::default()
        };
        let result = run_trial(&deck, 1, &config);
        assert_eq!(result.mulligans, 4);
        assert!(!result.first_hand_hit);
        assert!(!result.hit);
    }

    #[test]
    fn test_crowds_weight() {
        let deck = vec![crowds(); 50];
        let never = SimulationConfig {
            crowds_ineffectiveness_weight: 1.0,
            ..SimulationConfig::default()
        };
        assert!(!run_trial(&deck, 3, &never).first_hand_hit);

        let always = SimulationConfig {
            crowds_ineffectiveness_weight: 0.0,
            ..SimulationConfig::default()
        };
        assert!(run_trial(&deck, 3, &always).first_hand_hit);
    }

    #[test]
    fn test_hand_without_targets_misses() {
        let hand = vec![SimCard::default(); 8];
        let mut rng = GameRng::new(Some(9));
        assert!(!hand_hits(&hand, &SimulationConfig::default(), &mut rng));
    }

    #[test]
    fn test_same_seed_same_trial() {
        let mut deck = vec![SimCard::default(); 45];
        deck.extend(vec![matthew(); 3]);
        deck.extend(vec![crowds(); 2]);
        let config = SimulationConfig::default();
        for seed in 0..20 {
            assert_eq!(run_trial(&deck, seed, &config), run_trial(&deck, seed, &config));
        }
    }
}
