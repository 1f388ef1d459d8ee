//! `mines`: generate, solve, and replay push-block levels from the command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use mines_core::{
    AttemptProgress, Direction, GameOptions, GenerationConfig, LevelState, LiveLevel, Monster, Pos, Solution,
    SolutionMove, Solvability, SolveLimits, SolveParams, create_game_with_progress, load_snapshot, replay_moves,
    replay_solution, save_snapshot, solve_block_puzzle,
};
use serde::Serialize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log every generation attempt and solver cap hit
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a level and print its map
    Generate {
        #[arg(short, long, default_value_t = 1)]
        level: u32,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 18)]
        width: usize,
        #[arg(long, default_value_t = 12)]
        height: usize,
        /// TOML file with generation settings
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Overrides `workers` from the config file
        #[arg(long)]
        workers: Option<usize>,
        /// Write a JSON snapshot of the accepted level here
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print each evaluated attempt to stderr
        #[arg(long)]
        progress: bool,
        /// Print a JSON summary instead of the map
        #[arg(long)]
        json: bool,
    },
    /// Solve a saved level
    Solve {
        snapshot: PathBuf,
        #[arg(long)]
        max_states: Option<usize>,
        #[arg(long)]
        max_pushes: Option<u32>,
        #[arg(long)]
        max_steps: Option<u32>,
        /// Print the solution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay a route on a saved level
    Replay {
        snapshot: PathBuf,
        /// Route in `udlr` notation, upper case for pushes. Defaults to the stored solution.
        #[arg(short, long, requires = "start")]
        moves: Option<String>,
        /// Start cell as `x,y`
        #[arg(long)]
        start: Option<String>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LevelSummary<'a> {
    level: u32,
    seed: u64,
    attempt_seed: u64,
    width: usize,
    height: usize,
    solvability: Solvability,
    min_pushes: Option<u32>,
    fingerprint: String,
    monsters: &'a [Monster],
    solution: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Commands::Generate { level, seed, width, height, config, workers, out, progress, json } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(workers) = workers {
                config.workers = workers;
            }
            let options = GameOptions::new(level, seed).with_size(width, height).with_config(config);
            generate(&options, out.as_deref(), progress, json)
        }
        Commands::Solve { snapshot, max_states, max_pushes, max_steps, json } => {
            let mut limits = SolveLimits::default();
            if let Some(max_states) = max_states {
                limits.max_states = max_states;
            }
            limits.max_pushes = max_pushes;
            limits.max_steps = max_steps;
            solve(&snapshot, limits, json)
        }
        Commands::Replay { snapshot, moves, start } => replay(&snapshot, moves.as_deref(), start.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<GenerationConfig> {
    let Some(path) = path else {
        return Ok(GenerationConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    GenerationConfig::from_toml(&text).with_context(|| format!("Invalid config file: {}", path.display()))
}

fn generate(options: &GameOptions, out: Option<&Path>, progress: bool, json: bool) -> Result<()> {
    let level = create_game_with_progress(options, |attempt: &AttemptProgress| {
        if progress {
            eprintln!(
                "attempt {:>3} {:?} seed {} ({}x{}) min pushes {}",
                attempt.attempt,
                attempt.pass,
                attempt.seed,
                attempt.width,
                attempt.height,
                attempt.min_pushes.map_or_else(|| "-".to_string(), |pushes| pushes.to_string())
            );
        }
    });

    if let Some(path) = out {
        save_snapshot(path, &level)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
        info!("snapshot written to {}", path.display());
    }

    if json {
        let summary = LevelSummary {
            level: level.level,
            seed: level.seed,
            attempt_seed: level.attempt_seed,
            width: level.width,
            height: level.height,
            solvability: level.solvability,
            min_pushes: level.min_pushes,
            fingerprint: format!("{:016x}", level.fingerprint()),
            monsters: &level.monsters,
            solution: level.solution.as_ref().map(|solution| format_moves(&solution.moves)),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print!("{}", level.tiles.render_ascii(&level.monsters));
    println!(
        "level {} seed {} (attempt seed {}): {:?}, min pushes {}",
        level.level,
        level.seed,
        level.attempt_seed,
        level.solvability,
        level.min_pushes.map_or_else(|| "unknown".to_string(), |pushes| pushes.to_string())
    );
    if let Some(solution) = &level.solution {
        print_solution(solution);
    }
    println!("fingerprint {:016x}", level.fingerprint());
    Ok(())
}

fn load_level(path: &Path) -> Result<LevelState> {
    load_snapshot(path).with_context(|| format!("Failed to load snapshot: {}", path.display()))
}

fn solve(path: &Path, limits: SolveLimits, json: bool) -> Result<()> {
    let level = load_level(path)?;
    let params = SolveParams::for_level(&level).with_limits(limits);
    let Some(solution) = solve_block_puzzle(&params) else {
        bail!("no solution within {} states", limits.max_states);
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&solution)?);
    } else {
        print_solution(&solution);
    }
    Ok(())
}

fn replay(path: &Path, moves: Option<&str>, start: Option<&str>) -> Result<()> {
    let level = load_level(path)?;
    let outcome = match (moves, start) {
        (Some(moves), Some(start)) => {
            let start = parse_start(start)?;
            let moves = parse_moves(moves)?;
            replay_moves(&level, start, &moves).context("Replay rejected a move")?
        }
        _ => {
            let solution = match &level.solution {
                Some(solution) => solution.clone(),
                None => solve_block_puzzle(&SolveParams::for_level(&level))
                    .context("Level has no stored solution and the solver found none")?,
            };
            replay_solution(&level, &solution).context("Stored solution failed to replay")?
        }
    };

    print!("{}", render_live(&outcome.live));
    println!(
        "ended at ({}, {}) after {} pushes; exit reached: {}",
        outcome.final_pos.x, outcome.final_pos.y, outcome.pushes, outcome.reached_exit
    );
    println!("{} events logged", outcome.live.log().len());
    Ok(())
}

fn render_live(live: &LiveLevel) -> String {
    let monsters: Vec<Monster> = live
        .monsters()
        .map(|monster| Monster { id: monster.id, kind: monster.kind, pos: monster.pos })
        .collect();
    let mut map = live.tiles().render_ascii(&monsters);
    for player in live.players() {
        let offset = player.pos.y as usize * (live.tiles().width() + 1) + player.pos.x as usize;
        map.replace_range(offset..offset + 1, "@");
    }
    map
}

fn print_solution(solution: &Solution) {
    println!(
        "solution from ({}, {}): {} pushes, {} steps, {} unintuitive, {} blocks, {} revisited squares ({} revisits)",
        solution.start.x,
        solution.start.y,
        solution.pushes,
        solution.steps,
        solution.unintuitive_pushes,
        solution.distinct_blocks_pushed,
        solution.revisited_squares,
        solution.revisit_events
    );
    println!("{}", format_moves(&solution.moves));
}

fn move_letter(step: SolutionMove) -> char {
    let letter = match step.dir {
        Direction::Up => 'u',
        Direction::Down => 'd',
        Direction::Left => 'l',
        Direction::Right => 'r',
    };
    if step.push { letter.to_ascii_uppercase() } else { letter }
}

fn format_moves(moves: &[SolutionMove]) -> String {
    moves.iter().map(|&step| move_letter(step)).collect()
}

fn parse_moves(text: &str) -> Result<Vec<SolutionMove>> {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            let dir = match c.to_ascii_lowercase() {
                'u' => Direction::Up,
                'd' => Direction::Down,
                'l' => Direction::Left,
                'r' => Direction::Right,
                other => bail!("unknown move {other:?}; expected one of udlr"),
            };
            Ok(SolutionMove { dir, push: c.is_ascii_uppercase() })
        })
        .collect()
}

fn parse_start(text: &str) -> Result<Pos> {
    let (x, y) = text.split_once(',').with_context(|| format!("Start must be `x,y`, got {text:?}"))?;
    let x = x.trim().parse().with_context(|| format!("Bad start column {x:?}"))?;
    let y = y.trim().parse().with_context(|| format!("Bad start row {y:?}"))?;
    Ok(Pos { y, x })
}
