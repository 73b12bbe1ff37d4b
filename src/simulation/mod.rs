pub mod engine;
pub mod hand;
pub mod mulligan;
pub mod packs;

pub use engine::{
    aggregate_results, get_simulation_results, print_results, run_simulation, DeckSimulation,
    SimulationConfig, SimulationError, SimulationResults,
};
pub use hand::{build_sim_deck, draw_opening_hand, CyclerLogic, SimCard};
pub use mulligan::{run_trial, TrialResult};
pub use packs::{open_pack, simulate_packs, write_packs_csv, PackError, PackPools};
