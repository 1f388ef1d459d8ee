use mines_core::mapgen::{mobility_region_size, reachable_from_start};
use mines_core::{
    Direction, GameOptions, GenerationConfig, LevelState, LiveLevel, Solvability, SolveParams, Tile, create_game,
    replay_solution, solve_block_puzzle,
};
use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

fn quick_level(level: u32, seed: u64) -> LevelState {
    let config = GenerationConfig { max_attempts: 8, max_states: 60_000, ..GenerationConfig::default() };
    create_game(&GameOptions::new(level, seed).with_config(config))
}

fn check_level(level: &LevelState) -> Result<(), String> {
    let context = format!("level={} seed={}", level.level, level.seed);

    if level.solvability != Solvability::Unverified {
        for monster in &level.monsters {
            let reach = mobility_region_size(&level.tiles, monster.pos);
            if reach < 5 {
                return Err(format!("{context}: monster {} can only reach {reach} cells", monster.id));
            }
        }
    }

    let reachable = reachable_from_start(&level.tiles, level.start_area);
    for monster in &level.monsters {
        if reachable[level.tiles.index(monster.pos)] {
            return Err(format!("{context}: monster {} is walkable from the start", monster.id));
        }
    }
    for pos in level.tiles.positions() {
        if !reachable[level.tiles.index(pos)] {
            continue;
        }
        for direction in Direction::ALL {
            let next = pos.step(direction);
            if level.tiles.tile_at(next).is_open_floor() && !reachable[level.tiles.index(next)] {
                return Err(format!("{context}: reachability leaks at {next:?}"));
            }
        }
    }

    if let Some(solution) = solve_block_puzzle(&SolveParams::for_level(level)) {
        replay_solution(level, &solution).map_err(|error| format!("{context}: {error}"))?;
    }
    Ok(())
}

#[test]
fn generated_levels_keep_their_invariants() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(12));
    let inputs = (1_u32..=8, any::<u64>());

    runner
        .run(&inputs, |(level, seed)| {
            check_level(&quick_level(level, seed)).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("generated levels should keep their invariants");
}

#[test]
fn random_walks_never_corrupt_the_live_level() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(12));
    let inputs = (1_u32..=6, any::<u64>(), any::<u64>());

    runner
        .run(&inputs, |(level_number, seed, walk_seed)| {
            let level = quick_level(level_number, seed);
            let mut live = LiveLevel::from_level(&level);
            let start = level.start_area.center();
            let player = live.add_player(start).map_err(|error| TestCaseError::fail(error.to_string()))?;
            let blocks_before = level.tiles.tiles().iter().filter(|tile| tile.is_block()).count();
            let mut rng = ChaCha8Rng::seed_from_u64(walk_seed);
            let mut seen: Vec<bool> = live.tiles().tiles().iter().map(Tile::uncovered).collect();

            for step in 0..300 {
                let direction = Direction::ALL[(rng.next_u64() % 4) as usize];
                let _ = live.move_player(player, direction);
                if rng.next_u64() % 3 == 0 {
                    let keys: Vec<_> = live.monsters().map(|monster| monster.key).collect();
                    if !keys.is_empty() {
                        let key = keys[(rng.next_u64() % keys.len() as u64) as usize];
                        let _ = live.move_monster(key, Direction::ALL[(rng.next_u64() % 4) as usize]);
                    }
                }

                for (index, tile) in live.tiles().tiles().iter().enumerate() {
                    if seen[index] && !tile.uncovered() {
                        let pos = live.tiles().pos_of(index);
                        return Err(TestCaseError::fail(format!("step {step}: {pos:?} went back to hidden")));
                    }
                    seen[index] = tile.uncovered();
                }
            }

            let tiles = live.tiles();
            let blocks_after = tiles.tiles().iter().filter(|tile| tile.is_block()).count();
            if blocks_after != blocks_before {
                return Err(TestCaseError::fail(format!("{blocks_before} blocks became {blocks_after}")));
            }
            let pos = live.player(player).map(|state| state.pos);
            let Some(pos) = pos else {
                return Err(TestCaseError::fail("player vanished"));
            };
            if matches!(tiles.tile_at(pos), Tile::Rock | Tile::Block { .. }) {
                return Err(TestCaseError::fail(format!("player stands inside {:?}", tiles.tile_at(pos))));
            }
            for monster in live.monsters() {
                if !tiles.tile_at(monster.pos).is_open_floor() {
                    return Err(TestCaseError::fail(format!("monster {} left open floor", monster.id)));
                }
            }
            Ok(())
        })
        .expect("live moves should preserve board invariants");
}
