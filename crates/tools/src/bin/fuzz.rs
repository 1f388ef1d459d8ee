use anyhow::{Result, ensure};
use clap::Parser;
use env_logger::Env;
use log::{info, warn};
use mines_core::mapgen::{mobility_region_size, reachable_from_start};
use mines_core::{
    Direction, GameOptions, GenerationConfig, LevelState, LiveLevel, Solvability, SolveParams, Tile,
    create_game, replay_solution, solve_block_puzzle,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Levels to generate and check
    #[arg(short, long, default_value_t = 50)]
    runs: u32,
    #[arg(long, default_value_t = 10)]
    max_level: u32,
    /// Random live moves per level
    #[arg(long, default_value_t = 500)]
    walk: u32,
    #[arg(long, default_value_t = 40)]
    max_attempts: u32,
}

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p]
}

fn check_generated(level: &LevelState, floor: usize) -> Result<()> {
    let context = format!("level {} seed {}", level.level, level.seed);
    ensure!(
        matches!(level.tiles.tile_at(level.exit), Tile::Exit { .. }),
        "{context}: exit tile missing"
    );

    let reachable = reachable_from_start(&level.tiles, level.start_area);
    for monster in &level.monsters {
        ensure!(
            !reachable[level.tiles.index(monster.pos)],
            "{context}: monster {} starts within walking reach",
            monster.id
        );
        if level.solvability != Solvability::Unverified {
            ensure!(
                mobility_region_size(&level.tiles, monster.pos) >= floor,
                "{context}: monster {} is boxed in",
                monster.id
            );
        }
    }

    if let Some(solution) = &level.solution {
        let outcome = replay_solution(level, solution)?;
        ensure!(outcome.pushes == solution.pushes, "{context}: push count drifted during replay");
    } else if level.solvability != Solvability::Unverified {
        ensure!(
            solve_block_puzzle(&SolveParams::for_level(level)).is_none(),
            "{context}: accepted without a stored solution although one exists"
        );
        warn!("{context}: verified level whose full solve hit the state cap");
    }
    Ok(())
}

fn random_walk(level: &LevelState, rng: &mut ChaCha8Rng, moves: u32) -> Result<()> {
    let mut live = LiveLevel::from_level(level);
    let player = live.add_player(level.start_area.center())?;
    let blocks = level.tiles.tiles().iter().filter(|tile| tile.is_block()).count();

    for _ in 0..moves {
        let _ = live.move_player(player, choose(rng, &Direction::ALL));
        let keys: Vec<_> = live.monsters().map(|monster| monster.key).collect();
        if !keys.is_empty() {
            let _ = live.move_monster(choose(rng, &keys), choose(rng, &Direction::ALL));
        }

        let tiles = live.tiles();
        ensure!(
            tiles.tiles().iter().filter(|tile| tile.is_block()).count() == blocks,
            "level {} seed {}: block count changed",
            level.level,
            level.seed
        );
        for monster in live.monsters() {
            ensure!(tiles.tile_at(monster.pos).is_open_floor(), "monster {} left open floor", monster.id);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!("Starting fuzz harness on seed {} for {} levels...", args.seed, args.runs);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let config = GenerationConfig { max_attempts: args.max_attempts, ..GenerationConfig::default() };
    let mut degraded = 0;

    for run in 0..args.runs {
        let level_number = 1 + (rng.next_u64() % u64::from(args.max_level.max(1))) as u32;
        let seed = rng.next_u64();
        let level = create_game(&GameOptions::new(level_number, seed).with_config(config.clone()));
        if level.solvability == Solvability::Unverified {
            degraded += 1;
        }

        check_generated(&level, config.mobility_floor)?;
        random_walk(&level, &mut rng, args.walk)?;
        info!("run {run}: level {level_number} seed {seed} {:?} ok", level.solvability);
    }

    println!("Fuzzing completed successfully ({degraded} unverified levels).");
    Ok(())
}
