//! Dijkstra search ordered by `(pushes, steps)` with move reconstruction.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use log::{debug, warn};
use xxhash_rust::xxh3::Xxh3Builder;

use super::analysis::analyze_moves;
use super::terrain::{StateKey, Terrain};
use super::{CANCEL_CHECK_INTERVAL, Solution, SolutionMove, SolveParams};
use crate::types::Direction;

struct SearchNode {
    key: StateKey,
    parent: Option<usize>,
    via: Option<SolutionMove>,
    pushes: u32,
    steps: u32,
}

#[derive(Clone, Copy)]
struct Recorded {
    pushes: u32,
    steps: u32,
    node: usize,
}

/// Finds the cheapest route from any start-area cell to the exit.
///
/// Returns `None` when the exit is unreachable, when a cap in `params.limits`
/// is hit first, or when the cancel token fires.
pub fn solve_block_puzzle(params: &SolveParams<'_>) -> Option<Solution> {
    let terrain = Terrain::from_grid(params.tiles, params.exit)?;
    let (root, moves) = search(&terrain, params)?;
    let start = terrain.pos_of(root.player);
    let stats = analyze_moves(&terrain, root, &moves)?;
    Some(Solution::from_stats(moves, start, stats))
}

fn search(terrain: &Terrain, params: &SolveParams<'_>) -> Option<(StateKey, Vec<SolutionMove>)> {
    let limits = params.limits;
    let mut nodes: Vec<SearchNode> = Vec::new();
    let mut best: HashMap<StateKey, Recorded, Xxh3Builder> = HashMap::with_hasher(Xxh3Builder::new());
    let mut frontier = BinaryHeap::new();

    for cell in params.start_area.cells() {
        let Some(key) = terrain.start_state(cell) else {
            continue;
        };
        if best.contains_key(&key) {
            continue;
        }
        let node = nodes.len();
        best.insert(key.clone(), Recorded { pushes: 0, steps: 0, node });
        nodes.push(SearchNode { key, parent: None, via: None, pushes: 0, steps: 0 });
        frontier.push(Reverse((0u32, 0u32, node)));
    }

    let mut expanded = 0usize;
    while let Some(Reverse((pushes, steps, node))) = frontier.pop() {
        if best.get(&nodes[node].key).is_some_and(|recorded| recorded.node != node) {
            continue;
        }
        if nodes[node].key.player == terrain.exit() {
            return Some(reconstruct(&nodes, node));
        }

        expanded += 1;
        if expanded % CANCEL_CHECK_INTERVAL == 0 && params.is_cancelled() {
            warn!("puzzle search cancelled after {expanded} expansions");
            return None;
        }

        for direction in Direction::ALL {
            let Some(transition) = terrain.advance(&nodes[node].key, direction) else {
                continue;
            };
            let pushed = transition.pushed();
            let next_pushes = pushes + u32::from(pushed);
            let next_steps = steps + 1;
            if !limits.allows(next_pushes, next_steps) {
                continue;
            }

            if let Some(recorded) = best.get(&transition.next) {
                if (next_pushes, next_steps) >= (recorded.pushes, recorded.steps) {
                    continue;
                }
            } else if best.len() >= limits.max_states {
                debug!("puzzle search hit the {} state cap", limits.max_states);
                return None;
            }

            let next_node = nodes.len();
            best.insert(
                transition.next.clone(),
                Recorded { pushes: next_pushes, steps: next_steps, node: next_node },
            );
            nodes.push(SearchNode {
                key: transition.next,
                parent: Some(node),
                via: Some(SolutionMove { dir: direction, push: pushed }),
                pushes: next_pushes,
                steps: next_steps,
            });
            frontier.push(Reverse((next_pushes, next_steps, next_node)));
        }
    }
    None
}

fn reconstruct(nodes: &[SearchNode], goal: usize) -> (StateKey, Vec<SolutionMove>) {
    let mut moves = Vec::with_capacity(nodes[goal].steps as usize);
    let mut cursor = goal;
    while let (Some(parent), Some(via)) = (nodes[cursor].parent, nodes[cursor].via) {
        moves.push(via);
        cursor = parent;
    }
    moves.reverse();
    debug_assert_eq!(moves.iter().filter(|step| step.push).count() as u32, nodes[goal].pushes);
    (nodes[cursor].key.clone(), moves)
}
