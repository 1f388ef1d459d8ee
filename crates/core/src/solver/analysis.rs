//! Secondary statistics for a move list, replayed against the original layout.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::SolutionMove;
use super::terrain::{StateKey, Terrain};
use crate::state::Grid;
use crate::types::Pos;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionStats {
    pub pushes: u32,
    pub steps: u32,
    /// Pushes that leave the block next to the player farther from the exit.
    pub unintuitive_pushes: u32,
    pub distinct_blocks_pushed: u32,
    /// Cells entered more than once; the start cell counts as already entered.
    pub revisited_squares: u32,
    /// Total entries beyond the first, summed over all cells.
    pub revisit_events: u32,
}

/// Replays `moves` from `start` on the original block layout of `tiles`.
///
/// Returns `None` if `start` cannot hold a player, any move is illegal, or a
/// move's push flag disagrees with what the move actually does.
pub fn analyze_solution(
    tiles: &Grid,
    exit: Pos,
    start: Pos,
    moves: &[SolutionMove],
) -> Option<SolutionStats> {
    let terrain = Terrain::from_grid(tiles, exit)?;
    let state = terrain.start_state(start)?;
    analyze_moves(&terrain, state, moves)
}

pub(super) fn analyze_moves(
    terrain: &Terrain,
    mut state: StateKey,
    moves: &[SolutionMove],
) -> Option<SolutionStats> {
    let exit = terrain.exit_pos();
    let mut stats = SolutionStats::default();
    let mut pushed_slots = BTreeSet::new();
    let mut visits: HashMap<u32, u32> = HashMap::new();
    visits.insert(state.player, 1);

    for step in moves {
        let transition = terrain.advance(&state, step.dir)?;
        if transition.pushed() != step.push {
            return None;
        }
        stats.steps += 1;
        if let Some(&head) = transition.moved.first() {
            stats.pushes += 1;
            let before = terrain.pos_of(state.blocks[head]).manhattan(exit);
            let after = terrain.pos_of(transition.next.blocks[head]).manhattan(exit);
            if after > before {
                stats.unintuitive_pushes += 1;
            }
            pushed_slots.extend(transition.moved.iter().copied());
        }
        *visits.entry(transition.next.player).or_insert(0) += 1;
        state = transition.next;
    }

    stats.distinct_blocks_pushed = pushed_slots.len() as u32;
    for &count in visits.values().filter(|&&count| count > 1) {
        stats.revisited_squares += 1;
        stats.revisit_events += count - 1;
    }
    Some(stats)
}
