use criterion::{black_box, criterion_group, criterion_main, Criterion};
use indicatif::ProgressBar;
use redemption_decks::card::CardDatabase;
use redemption_decks::decklist::{Decklist, TagRules};
use redemption_decks::simulation::{build_sim_deck, run_simulation, run_trial, SimulationConfig};

const CARD_DATA: &str = "fixtures/carddata.txt";
const DECKLIST: &str = "fixtures/decklists/t1_1st_Jane_Doe.txt";

fn benchmark_single_trial(c: &mut Criterion) {
    let db = CardDatabase::from_path(CARD_DATA).expect("Failed to load cards");
    let decklist = Decklist::load(DECKLIST, &db, &TagRules::default()).expect("Failed to load deck");
    let deck = build_sim_deck(&decklist);
    let config = SimulationConfig::default();

    c.bench_function("single_trial_seed_12345", |b| {
        b.iter(|| run_trial(black_box(&deck), black_box(12345), black_box(&config)))
    });
}

fn benchmark_simulation(c: &mut Criterion) {
    let db = CardDatabase::from_path(CARD_DATA).expect("Failed to load cards");
    let decklist = Decklist::load(DECKLIST, &db, &TagRules::default()).expect("Failed to load deck");
    let deck = build_sim_deck(&decklist);
    let config = SimulationConfig {
        n_simulations: 1_000,
        seed: Some(1),
        ..SimulationConfig::default()
    };

    c.bench_function("1000_trials", |b| {
        b.iter(|| run_simulation(black_box(&deck), black_box(&config), &ProgressBar::hidden()))
    });
}

fn benchmark_decklist_loading(c: &mut Criterion) {
    let db = CardDatabase::from_path(CARD_DATA).expect("Failed to load cards");
    let rules = TagRules::default();

    c.bench_function("load_decklist", |b| {
        b.iter(|| Decklist::load(black_box(DECKLIST), black_box(&db), black_box(&rules)))
    });
}

criterion_group!(benches, benchmark_single_trial, benchmark_simulation, benchmark_decklist_loading);
criterion_main!(benches);
