use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fretdrill::config::{data_dir, CONFIG_FILE};
use fretdrill::driver::simulate::{parse_position, run_simulation, LearnerModel};
use fretdrill::driver::terminal::{StdinInput, TerminalRenderer};
use fretdrill::driver::Driver;
use fretdrill::{load_config, save_config, DrillConfig, Fretboard, Position, Session};

/// fretdrill - adaptive fretboard note-naming drill
#[derive(Parser)]
#[command(name = "fretdrill")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Adaptive fretboard note-naming drill", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to .fretdrill/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for reproducible position sampling
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive drill in the terminal
    Drill {
        /// Print the session summary as JSON when done
        #[arg(long)]
        json: bool,
    },

    /// Show the note at a string/fret position
    Note {
        /// String index, 0 = highest-pitched string
        #[arg(long)]
        string: u8,
        /// Fret number, 0 = open string
        #[arg(long)]
        fret: u8,
    },

    /// Simulate a learner and report how sampling adapts
    Simulate {
        #[command(flatten)]
        learner: LearnerArgs,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show per-position difficulty weights after a simulated run
    Weights {
        #[command(flatten)]
        learner: LearnerArgs,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Args)]
struct LearnerArgs {
    /// Number of exercises to play
    #[arg(long, default_value = "50")]
    exercises: usize,
    /// Accuracy on ordinary positions (0.0 - 1.0)
    #[arg(long, default_value = "0.9")]
    accuracy: f64,
    /// Accuracy on weak positions (0.0 - 1.0)
    #[arg(long, default_value = "0.3")]
    weak_accuracy: f64,
    /// Weak position as <string>:<fret>, repeatable
    #[arg(long = "weak")]
    weak: Vec<String>,
}

impl LearnerArgs {
    fn model(&self, board: &Fretboard) -> Result<LearnerModel> {
        let weak = self
            .weak
            .iter()
            .map(|raw| parse_position(raw, board))
            .collect::<Result<Vec<Position>>>()?;
        LearnerModel::new(self.accuracy, self.weak_accuracy, weak)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The drill draws on stdout, so keep logs quiet there unless asked
    let is_drill = matches!(cli.command, Commands::Drill { .. });
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else if is_drill {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => data_dir()?.join(CONFIG_FILE),
    };

    match cli.command {
        Commands::Drill { json } => {
            let config = load_config(&config_path)?;
            let session: Session<usize> = new_session(&config, cli.seed)?;
            let renderer = TerminalRenderer::new(std::io::stdout(), &config);
            let driver = Driver::new(session, renderer, StdinInput::new(), &config);

            println!("🎸 Name each highlighted note: A-G for naturals, a-g for flats.");
            println!("   Press Enter after typing; Ctrl+D or Ctrl+C to finish.");
            let summary = driver.run().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }
        Commands::Note { string, fret } => {
            let config = load_config(&config_path)?;
            let board = Fretboard::from_config(&config)?;
            let note = board.note_at(Position::new(string, fret))?;
            println!("String {} fret {}: {}", string, fret, note);
        }
        Commands::Simulate { learner, json } => {
            let config = load_config(&config_path)?;
            let mut session: Session = new_session(&config, cli.seed)?;
            let model = learner.model(session.fretboard())?;
            let mut rng = learner_rng(cli.seed);
            let report = run_simulation(&mut session, &model, learner.exercises, &mut rng);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("fretdrill Simulation");
                println!("====================");
                println!("Exercises: {}", report.exercises);
                println!("Answers: {}", report.answers);
                println!(
                    "Recent accuracy: {:.0}%",
                    report.summary.ledger.accuracy * 100.0
                );
                if !model.weak_positions.is_empty() {
                    println!(
                        "Weak positions quizzed: {:.1}% of items (uniform: {:.1}%)",
                        report.weak_share * 100.0,
                        report.uniform_share * 100.0
                    );
                }
                println!("Hardest positions:");
                for r in &report.summary.hardest {
                    println!(
                        "  {} ({}): difficulty {:.2}, {}/{} correct",
                        r.position, r.note, r.difficulty, r.correct, r.attempts
                    );
                }
            }
        }
        Commands::Weights { learner } => {
            let config = load_config(&config_path)?;
            let mut session: Session = new_session(&config, cli.seed)?;
            let model = learner.model(session.fretboard())?;
            let mut rng = learner_rng(cli.seed);
            run_simulation(&mut session, &model, learner.exercises, &mut rng);

            let weights = session.difficulty_map();
            let board = session.fretboard();
            print!("{:>8}", "");
            for fret in 0..board.fret_count() {
                print!("{:>7}", format!("fret {}", fret));
            }
            println!();
            for string in 0..board.string_count() {
                print!("{:>8}", format!("{} ({})", string, config.tuning[string as usize]));
                for fret in 0..board.fret_count() {
                    let weight = weights
                        .get(&Position::new(string, fret))
                        .copied()
                        .unwrap_or(0.0);
                    print!("{:>7.2}", weight);
                }
                println!();
            }
        }
        Commands::Init { force } => {
            if config_path.exists() && !force {
                println!("⚠️  Config already exists at {}", config_path.display());
                println!("   Use --force to overwrite");
                return Ok(());
            }
            info!("Writing default config");
            save_config(&DrillConfig::default(), &config_path)?;
            println!("✅ Wrote default config to {}", config_path.display());
        }
        Commands::Config => {
            let config = load_config(&config_path)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn new_session<H>(config: &DrillConfig, seed: Option<u64>) -> Result<Session<H>> {
    let session = match seed {
        Some(seed) => Session::with_seed(config, seed)?,
        None => Session::new(config)?,
    };
    Ok(session)
}

fn learner_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    }
}
