use std::collections::{HashMap, VecDeque};

use log::{debug, warn};
use xxhash_rust::xxh3::Xxh3Builder;

use super::terrain::{StateKey, Terrain};
use super::{CANCEL_CHECK_INTERVAL, SolveParams};
use crate::types::Direction;

/// Minimum pushes needed to reach the exit, without building a move list.
///
/// Runs the same transitions as [`super::solve_block_puzzle`] as a 0-1 BFS: walking
/// costs nothing and each push costs one. `limits.max_steps` does not apply here.
pub fn estimate_min_pushes(params: &SolveParams<'_>) -> Option<u32> {
    let terrain = Terrain::from_grid(params.tiles, params.exit)?;
    let limits = params.limits;
    let mut best: HashMap<StateKey, u32, Xxh3Builder> = HashMap::with_hasher(Xxh3Builder::new());
    let mut queue = VecDeque::new();

    for cell in params.start_area.cells() {
        if let Some(key) = terrain.start_state(cell)
            && !best.contains_key(&key)
        {
            best.insert(key.clone(), 0);
            queue.push_back((key, 0u32));
        }
    }

    let mut expanded = 0usize;
    while let Some((key, pushes)) = queue.pop_front() {
        if best.get(&key).is_some_and(|&recorded| recorded < pushes) {
            continue;
        }
        if key.player == terrain.exit() {
            return Some(pushes);
        }

        expanded += 1;
        if expanded % CANCEL_CHECK_INTERVAL == 0 && params.is_cancelled() {
            warn!("push estimate cancelled after {expanded} expansions");
            return None;
        }

        for direction in Direction::ALL {
            let Some(transition) = terrain.advance(&key, direction) else {
                continue;
            };
            let pushed = transition.pushed();
            let next_pushes = pushes + u32::from(pushed);
            if limits.max_pushes.is_some_and(|max| next_pushes > max) {
                continue;
            }
            match best.get(&transition.next) {
                Some(&recorded) if recorded <= next_pushes => continue,
                Some(_) => {}
                None if best.len() >= limits.max_states => {
                    debug!("push estimate hit the {} state cap", limits.max_states);
                    return None;
                }
                None => {}
            }
            best.insert(transition.next.clone(), next_pushes);
            if pushed {
                queue.push_back((transition.next, next_pushes));
            } else {
                queue.push_front((transition.next, next_pushes));
            }
        }
    }
    None
}
