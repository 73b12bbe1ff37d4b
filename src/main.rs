use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use redemption_decks::card::CardDatabase;
use redemption_decks::config::Config;
use redemption_decks::decklist::{decklist_id, find_decklist_file, find_decks, player_name, Decklist};
use redemption_decks::report::{
    build_cards_table, build_check_sheet, build_decks_table, build_reserve_sheet, parse_pairings,
    standings, write_pairings_table, write_pdf, DeckType, Page, SheetMeta,
};
use redemption_decks::simulation::{
    get_simulation_results, print_results, simulate_packs, write_packs_csv, CyclerLogic,
};
use redemption_decks::tagger::CardDataFile;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "decks")]
#[command(about = "Redemption tournament decklist pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data folder holding carddata/, decklists/, tables/ and output/
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write cards.csv with one row per decklist line
    Cards,

    /// Write decks.csv with one row per decklist
    Decks {
        /// Also run the m_count simulation for every deck
        #[arg(long)]
        simulate: bool,

        /// Simulations per deck
        #[arg(short, long)]
        num_simulations: Option<usize>,

        /// Seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Run the m_count simulation for one deck
    Simulate {
        /// Decklist file, or a file name prefix in the decklists folder
        deck: String,

        /// Number of simulations
        #[arg(short, long)]
        num_simulations: Option<usize>,

        /// How cyclers are handled: "keep" or "cycle"
        #[arg(long)]
        cycler_logic: Option<CyclerLogic>,

        /// Chance that a Crowds card does nothing
        #[arg(long)]
        crowds_weight: Option<f64>,

        /// Chance that a Matthew card fizzles
        #[arg(long)]
        fizzle_rate: Option<f64>,

        /// Seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print only the m_count line
        #[arg(long)]
        only_matthew: bool,
    },

    /// Simulate opening booster packs
    Packs {
        /// Set to open
        #[arg(long, default_value = "Israel's Inheritance")]
        set: String,

        /// Number of simulations
        #[arg(short, long, default_value = "100")]
        num_simulations: usize,

        /// Packs opened per simulation
        #[arg(short, long, default_value = "36")]
        packs: usize,

        /// Seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Render deck check sheets
    Sheet {
        /// A specific deck file name (prefix match)
        #[arg(long)]
        deck_name: Option<String>,

        /// Prefix to match multiple decks
        #[arg(long)]
        prefix: Option<String>,

        /// "type_1" or "type_2"
        #[arg(long)]
        deck_type: DeckType,

        /// "pdf" or "json"
        #[arg(long, default_value = "pdf")]
        mode: SheetMode,
    },

    /// Render the reserve list for one deck
    ReserveSheet {
        /// Deck file name (prefix match)
        deck: String,
    },

    /// Standings and pairings table from a results CSV
    Pairings {
        /// Results CSV (Round, Player, Opponent, Result)
        file: PathBuf,
    },

    /// Rewrite the card database file unchanged (CRLF, no quoting)
    Tag {
        /// Output file; defaults to rewriting the card database in place
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetMode {
    Pdf,
    Json,
}

impl FromStr for SheetMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(SheetMode::Pdf),
            "json" => Ok(SheetMode::Json),
            other => Err(format!("unknown mode '{}', use 'pdf' or 'json'", other)),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = exit_on_err(
        Config::load_or_default(cli.config.as_deref()),
        "Failed to load config",
    );
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match cli.command {
        Commands::Cards => write_cards(&config),
        Commands::Decks {
            simulate,
            num_simulations,
            seed,
        } => {
            if let Some(n) = num_simulations {
                config.simulation.n_simulations = n;
            }
            if seed.is_some() {
                config.simulation.seed = seed;
            }
            write_decks(&config, simulate);
        }
        Commands::Simulate {
            deck,
            num_simulations,
            cycler_logic,
            crowds_weight,
            fizzle_rate,
            seed,
            only_matthew,
        } => {
            let sim = &mut config.simulation;
            if let Some(n) = num_simulations {
                sim.n_simulations = n;
            }
            if let Some(logic) = cycler_logic {
                sim.cycler_logic = logic;
            }
            if let Some(weight) = crowds_weight {
                sim.crowds_ineffectiveness_weight = weight;
            }
            if let Some(rate) = fizzle_rate {
                sim.matthew_fizzle_rate = rate;
            }
            if seed.is_some() {
                sim.seed = seed;
            }
            simulate_deck(&config, &deck, only_matthew);
        }
        Commands::Packs {
            set,
            num_simulations,
            packs,
            seed,
        } => open_packs(&config, &set, num_simulations, packs, seed),
        Commands::Sheet {
            deck_name,
            prefix,
            deck_type,
            mode,
        } => render_sheets(&config, deck_name, prefix, deck_type, mode),
        Commands::ReserveSheet { deck } => render_reserve_sheet(&config, &deck),
        Commands::Pairings { file } => write_pairings(&config, &file),
        Commands::Tag { out } => rewrite_card_data(&config, out),
    }
}

fn exit_on_err<T, E: Display>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("✗ {}: {}", context, e);
            std::process::exit(1);
        }
    }
}

fn load_db(config: &Config) -> CardDatabase {
    let path = config.card_data_path();
    match CardDatabase::from_path(&path) {
        Ok(db) => {
            eprintln!("✓ Loaded {} cards from {}", db.card_count(), path.display());
            db
        }
        Err(e) => {
            eprintln!("✗ Failed to load cards from {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn write_cards(config: &Config) {
    let db = load_db(config);
    let out = config.tables_dir().join("cards.csv");
    let rows = exit_on_err(
        build_cards_table(&config.decklists_dir(), &db, &out),
        "Failed to write cards table",
    );
    println!("✓ Wrote {} card rows to {}", rows, out.display());
}

fn write_decks(config: &Config, simulate: bool) {
    let db = load_db(config);
    let out = config.tables_dir().join("decks.csv");
    let simulation = simulate.then_some(&config.simulation);
    let rows = exit_on_err(
        build_decks_table(
            &config.decklists_dir(),
            &db,
            &config.tags,
            config.deck_rules(),
            simulation,
            &out,
        ),
        "Failed to write decks table",
    );

    println!("\n=== Decks ===\n");
    println!(
        "{:32} {:>5} {:>5} {:>7} {:>4} {:>4} {:>4} {:>8}",
        "Decklist", "Place", "Main", "Reserve", "LS", "Good", "Evil", "m_count"
    );
    println!("{:-<78}", "");
    for row in &rows {
        let place = row.place.map(|p| p.to_string()).unwrap_or_default();
        let m_count = row
            .m_count
            .map(|m| format!("{:.3}", m))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:32} {:>5} {:>5} {:>7} {:>4} {:>4} {:>4} {:>8}",
            row.decklist_id,
            place,
            row.main_size,
            row.reserve_size,
            row.lost_souls,
            row.good_count,
            row.evil_count,
            m_count
        );
    }
    println!("\n✓ Wrote {} deck rows to {}", rows.len(), out.display());
}

/// A path that exists is used as-is; anything else is a prefix in the
/// decklists folder
fn resolve_deck(config: &Config, deck: &str) -> PathBuf {
    let path = PathBuf::from(deck);
    if path.is_file() {
        return path;
    }
    exit_on_err(
        find_decklist_file(&config.decklists_dir(), deck),
        "Failed to find decklist",
    )
}

fn simulation_progress(n: usize) -> ProgressBar {
    let bar = ProgressBar::new(n as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} hands ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar
}

fn simulate_deck(config: &Config, deck: &str, only_matthew: bool) {
    let db = load_db(config);
    let path = resolve_deck(config, deck);
    let progress = if only_matthew {
        ProgressBar::hidden()
    } else {
        simulation_progress(config.simulation.n_simulations)
    };

    let start = std::time::Instant::now();
    let simulation = exit_on_err(
        get_simulation_results(
            &path,
            &db,
            &config.tags,
            config.deck_rules(),
            &config.simulation,
            &progress,
        ),
        "Simulation failed",
    );
    let elapsed = start.elapsed();

    print_results(&simulation.results, &decklist_id(&path), only_matthew);
    if !only_matthew {
        if !simulation.decklist.missing.is_empty() {
            println!("\nCards not found: {}", simulation.decklist.missing.join(", "));
        }
        println!(
            "\nSimulation completed in {:.2?} ({:.0} hands/sec)",
            elapsed,
            simulation.results.n_simulations as f64 / elapsed.as_secs_f64()
        );
    }
}

fn open_packs(config: &Config, set: &str, n_simulations: usize, n_packs: usize, seed: Option<u64>) {
    let db = load_db(config);
    let simulations = exit_on_err(
        simulate_packs(set, n_simulations, n_packs, &db, seed),
        "Failed to open packs",
    );

    let file_name = format!("packs_{}.csv", set.to_lowercase().replace(['\'', ' '], "_"));
    let out = config.tables_dir().join(file_name);
    exit_on_err(
        std::fs::create_dir_all(config.tables_dir()),
        "Failed to create tables folder",
    );
    let file = exit_on_err(std::fs::File::create(&out), "Failed to create packs table");
    exit_on_err(write_packs_csv(file, &simulations), "Failed to write packs table");

    let cards: usize = simulations.iter().flatten().map(|pack| pack.len()).sum();
    println!(
        "✓ Opened {} x {} packs of {} ({} cards) into {}",
        n_simulations,
        n_packs,
        set,
        cards,
        out.display()
    );
}

fn deck_meta(path: &Path) -> SheetMeta {
    let id = decklist_id(path);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| id.clone());
    let player = player_name(&id).unwrap_or_else(|_| stem.clone());
    SheetMeta::today(player, stem)
}

fn save_pdf(page: &Page, out: &Path) {
    let file = exit_on_err(std::fs::File::create(out), "Failed to create PDF");
    exit_on_err(write_pdf(page, std::io::BufWriter::new(file)), "Failed to write PDF");
    println!("✓ Wrote {}", out.display());
}

fn render_sheets(
    config: &Config,
    deck_name: Option<String>,
    prefix: Option<String>,
    deck_type: DeckType,
    mode: SheetMode,
) {
    let dir = config.decklists_dir();
    let decks = match (deck_name, prefix) {
        (_, Some(prefix)) => exit_on_err(find_decks(&dir, &prefix), "Failed to list decks"),
        (Some(name), None) => vec![exit_on_err(
            find_decklist_file(&dir, &name),
            "Failed to find decklist",
        )],
        (None, None) => {
            eprintln!("✗ Either --deck-name or --prefix must be provided");
            std::process::exit(1);
        }
    };

    let db = load_db(config);
    let out_dir = config.output_dir();
    exit_on_err(std::fs::create_dir_all(&out_dir), "Failed to create output folder");

    for path in decks {
        let decklist = exit_on_err(
            Decklist::load_checked(&path, &db, &config.tags, config.deck_rules()),
            "Failed to load decklist",
        );
        let meta = deck_meta(&path);
        match mode {
            SheetMode::Json => {
                let out = out_dir.join(format!("{}.json", meta.deck_name));
                exit_on_err(decklist.write_json(&out), "Failed to write deck JSON");
                println!("✓ Wrote {}", out.display());
            }
            SheetMode::Pdf => {
                let page = exit_on_err(
                    build_check_sheet(&decklist.to_deck_data(), deck_type, &meta),
                    "Failed to build check sheet",
                );
                let out = out_dir.join(format!("{}_{}.pdf", meta.deck_name, deck_type.as_str()));
                save_pdf(&page, &out);
            }
        }
    }
}

fn render_reserve_sheet(config: &Config, deck: &str) {
    let db = load_db(config);
    let path = resolve_deck(config, deck);
    let decklist = exit_on_err(
        Decklist::load_checked(&path, &db, &config.tags, config.deck_rules()),
        "Failed to load decklist",
    );
    let meta = deck_meta(&path);
    let page = exit_on_err(
        build_reserve_sheet(&decklist.to_deck_data().reserve, config.deck_rules(), &meta),
        "Failed to build reserve list",
    );

    let out_dir = config.output_dir();
    exit_on_err(std::fs::create_dir_all(&out_dir), "Failed to create output folder");
    save_pdf(&page, &out_dir.join(format!("{}_reserve.pdf", meta.deck_name)));
}

fn write_pairings(config: &Config, file: &Path) {
    let input = exit_on_err(std::fs::File::open(file), "Failed to open pairings");
    let pairings = exit_on_err(parse_pairings(input), "Failed to parse pairings");

    println!("\n=== Standings ===\n");
    for (i, standing) in standings(&pairings).iter().enumerate() {
        println!(
            "{:3}. {:24} {:3} pts  ({}-{}-{}, {} bye)",
            i + 1,
            standing.player_name,
            standing.points,
            standing.wins,
            standing.losses,
            standing.ties,
            standing.byes
        );
    }

    let tables = config.tables_dir();
    exit_on_err(std::fs::create_dir_all(&tables), "Failed to create tables folder");
    let out = tables.join("pairings.csv");
    let output = exit_on_err(std::fs::File::create(&out), "Failed to create pairings table");
    exit_on_err(write_pairings_table(output, &pairings), "Failed to write pairings table");
    println!("\n✓ Wrote {} pairings to {}", pairings.len(), out.display());
}

fn rewrite_card_data(config: &Config, out: Option<PathBuf>) {
    let path = config.card_data_path();
    let file = exit_on_err(CardDataFile::read(&path), "Failed to read card data");
    let out = out.unwrap_or(path);
    exit_on_err(file.write(&out), "Failed to write card data");
    println!("✓ Wrote {} cards to {}", file.len(), out.display());
}
