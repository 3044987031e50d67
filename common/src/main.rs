use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use cnf_minesweeper::*;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Board presets: (width, height, mines).
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    fn dimensions(self) -> (usize, usize, usize) {
        match self {
            Difficulty::Easy => (9, 9, 10),
            Difficulty::Medium => (16, 16, 25),
            Difficulty::Hard => (30, 16, 99),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Matching {
    Committed,
    Within,
}

/// Plays a game of Minesweeper with a CNF reasoning agent.
#[derive(Parser, Debug)]
#[command(name = "cnf-minesweeper", version, about)]
struct Cli {
    /// Board preset.
    #[arg(value_enum, default_value_t = Difficulty::Easy)]
    difficulty: Difficulty,

    /// Overrides the preset width.
    #[arg(long)]
    width: Option<usize>,

    /// Overrides the preset height.
    #[arg(long)]
    height: Option<usize>,

    /// Overrides the preset mine count.
    #[arg(long)]
    mines: Option<usize>,

    /// Initial safe cells are round(sqrt(width * height)) times this value.
    #[arg(long, default_value_t = 1)]
    safe_multiplier: usize,

    /// Seed for the mine layout. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many turns.
    #[arg(long, default_value_t = 10_000)]
    max_turns: usize,

    /// Pause between board actions, to make the game watchable.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Check the knowledge base with a SAT solver after every turn.
    #[arg(long, default_value_t = false)]
    audit: bool,

    /// Turns with an unchanged knowledge base before guessing.
    #[arg(long, default_value_t = 5)]
    stagnation_window: usize,

    /// Matching pass used on reasoning-only turns.
    #[arg(long, value_enum, default_value_t = Matching::Committed)]
    matching: Matching,

    /// End a matching pass at the first clause equal to a committed fact.
    #[arg(long, default_value_t = false)]
    early_exit: bool,
}

impl Cli {
    fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            stagnation_window: self.stagnation_window,
            matching: match self.matching {
                Matching::Committed => MatchingStrategy::AgainstCommitted,
                Matching::Within => MatchingStrategy::WithinKnowledgeBase,
            },
            duplicate_policy: if self.early_exit {
                DuplicatePolicy::EarlyExit
            } else {
                DuplicatePolicy::FinishPass
            },
        }
    }
}

/// Logs what a full SAT check proves that the clause store could not.
fn report_missed_facts(knowledge: &KnowledgeBase) {
    match knowledge.missed_facts() {
        Ok(missed) if missed.is_empty() => {
            info!("Audit: no forced cell left, a guess was needed")
        }
        Ok(missed) => {
            for literal in missed {
                warn!("Audit: {} is forced but was not derived", literal);
            }
        }
        Err(e) => warn!("Audit: entailment check failed: {}", e),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // --- 1. Initialization ---
    let (width, height, mines) = cli.difficulty.dimensions();
    let width = cli.width.unwrap_or(width);
    let height = cli.height.unwrap_or(height);
    let mines = cli.mines.unwrap_or(mines);
    anyhow::ensure!(
        mines < width * height,
        "{} mines do not fit on a {}x{} board",
        mines,
        width,
        height
    );

    let seed = cli.seed.unwrap_or_else(rand::random);
    info!("{}x{} board with {} mines, seed {}", width, height, mines, seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let game = Game::new(width, height, mines, cli.safe_multiplier, &mut rng);
    let mut agent = Agent::new(game, cli.agent_config());

    // --- 2. Game Loop ---
    let mut turn = 0;
    while agent.board().state() == GameState::Playing && turn < cli.max_turns {
        turn += 1;
        let action = agent.step()?;
        debug!("Turn {}: {:?}", turn, action);

        if cli.audit {
            match agent.knowledge().audit() {
                Ok(true) => {}
                Ok(false) => warn!("Turn {}: knowledge base is inconsistent", turn),
                Err(e) => warn!("Turn {}: audit failed: {}", turn, e),
            }
        }

        if action == Move::Stuck {
            if cli.audit {
                report_missed_facts(agent.knowledge());
            }
            break;
        }
        if action.cell().is_some() && cli.delay_ms > 0 {
            println!("{}", agent.board());
            thread::sleep(Duration::from_millis(cli.delay_ms));
        }
    }

    // --- 3. Final Result ---
    println!("{}", agent.board());
    let stats = agent.stats();
    info!(
        "{} turns: {} revealed, {} flagged, {} guessed, {} reasoning",
        turn, stats.revealed, stats.flagged, stats.guessed, stats.reasoned
    );

    match agent.board().state() {
        GameState::Won => println!("Result: The agent won!"),
        GameState::Lost => println!("Result: The agent hit a mine and lost."),
        GameState::Playing => println!("Result: The agent could not finish the game."),
    }
    Ok(())
}
