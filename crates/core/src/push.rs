//! Chain-push rule shared by the solver's search edges and live gameplay.
//! Both callers walk chains through this module so a precomputed solution stays
//! valid when replayed against a live grid. Boards differ only in what they
//! accept as a landing cell.

use thiserror::Error;

use crate::types::{Direction, DirectionSet, Pos};

/// Why the cell just past a chain cannot take the tail block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LandingBlocker {
    #[error("solid rock")]
    Rock,
    #[error("the exit")]
    Exit,
    #[error("a trap")]
    Trap,
    #[error("treasure")]
    Treasure,
    #[error("a magic item")]
    MagicItem,
    #[error("another block")]
    Block,
    #[error("a player with nowhere to go")]
    PinnedPlayer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ChainBlocked {
    #[error("no block at ({}, {})", .at.x, .at.y)]
    NoBlock { at: Pos },
    #[error("block at ({}, {}) cannot be pushed {direction:?}", .at.x, .at.y)]
    DirectionNotAllowed { at: Pos, direction: Direction },
    #[error("block chain would leave the grid at ({}, {})", .at.x, .at.y)]
    OffGrid { at: Pos },
    #[error("landing cell ({}, {}) holds {reason}", .at.x, .at.y)]
    LandingBlocked { at: Pos, reason: LandingBlocker },
}

/// A board the chain walk can inspect.
pub trait ChainBoard {
    fn in_bounds(&self, pos: Pos) -> bool;

    /// Push directions of the block at `pos`, or `None` when no block is there.
    fn block_directions(&self, pos: Pos) -> Option<DirectionSet>;

    /// Whether the tail block of a chain may come to rest on `pos`.
    fn check_landing(&self, pos: Pos) -> Result<(), LandingBlocker>;
}

/// A legal push: every cell in `cells` shifts one step along `direction`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushChain {
    pub direction: Direction,
    /// Block cells from the head (next to the pusher) to the tail.
    pub cells: Vec<Pos>,
    pub landing: Pos,
}

impl PushChain {
    pub fn head(&self) -> Pos {
        self.cells[0]
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Walks the run of consecutive blocks starting at `head` along `direction`.
pub fn walk_push_chain<B>(board: &B, head: Pos, direction: Direction) -> Result<PushChain, ChainBlocked>
where
    B: ChainBoard + ?Sized,
{
    let mut cells = Vec::new();
    let mut cursor = head;
    while let Some(directions) = board.block_directions(cursor) {
        if !directions.contains(direction) {
            return Err(ChainBlocked::DirectionNotAllowed { at: cursor, direction });
        }
        cells.push(cursor);
        cursor = cursor.step(direction);
        if !board.in_bounds(cursor) {
            return Err(ChainBlocked::OffGrid { at: cursor });
        }
    }
    if cells.is_empty() {
        return Err(ChainBlocked::NoBlock { at: head });
    }

    board
        .check_landing(cursor)
        .map_err(|reason| ChainBlocked::LandingBlocked { at: cursor, reason })?;
    Ok(PushChain { direction, cells, landing: cursor })
}
