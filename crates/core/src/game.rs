//! Live play on an accepted level.
//!
//! A [`LiveLevel`] owns its own copy of the grid. Players and monsters move one
//! cell at a time; walking into a block pushes its whole chain through
//! [`walk_push_chain`], the same rule the solver searches with. On top of that
//! rule the live board lets a block land on a player (who is shoved one cell
//! further), on a monster (crushed), or on treasure (destroyed).

use std::mem;

use log::debug;
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::push::{ChainBlocked, ChainBoard, LandingBlocker, PushChain, walk_push_chain};
use crate::state::{Grid, LevelState};
use crate::types::{Direction, DirectionSet, Monster, MonsterKind, Pos, Tile};

new_key_type! {
    pub struct PlayerId;
    pub struct MonsterKey;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub pos: Pos,
    pub gold: u32,
    pub items: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveMonster {
    pub key: MonsterKey,
    /// Id from the generated level.
    pub id: u32,
    pub kind: MonsterKind,
    pub pos: Pos,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PlayerMoved { player: PlayerId, from: Pos, to: Pos },
    MonsterMoved { monster: u32, from: Pos, to: Pos },
    BlocksPushed { direction: Direction, count: usize, landing: Pos },
    PlayerShoved { player: PlayerId, to: Pos },
    MonsterCrushed { monster: u32, at: Pos },
    TreasureCrushed { value: u32, at: Pos },
    TreasureCollected { player: PlayerId, value: u32 },
    MagicItemCollected { player: PlayerId, item_name: String },
    TrapTriggered { player: PlayerId, message: String },
    /// A player and a monster met. Combat is resolved outside this crate.
    Encounter { player: PlayerId, monster: u32 },
    ExitReached { player: PlayerId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("({}, {}) is outside the grid", .at.x, .at.y)]
    OutOfBounds { at: Pos },
    #[error("({}, {}) is solid rock", .at.x, .at.y)]
    Rock { at: Pos },
    #[error("({}, {}) is already occupied", .at.x, .at.y)]
    Occupied { at: Pos },
    #[error("monsters cannot walk onto ({}, {})", .at.x, .at.y)]
    Impassable { at: Pos },
    #[error("no such player or monster")]
    UnknownActor,
    #[error("push rejected: {0}")]
    Push(#[from] ChainBlocked),
}

/// What an accepted move did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub from: Pos,
    /// Equal to `from` when a monster stopped at a player.
    pub to: Pos,
    /// Number of blocks shifted.
    pub pushed: usize,
}

impl MoveOutcome {
    pub fn pushed(&self) -> bool {
        self.pushed > 0
    }
}

#[derive(Clone, Debug)]
pub struct LiveLevel {
    tiles: Grid,
    exit: Pos,
    players: SlotMap<PlayerId, Player>,
    monsters: SlotMap<MonsterKey, LiveMonster>,
    log: Vec<GameEvent>,
}

impl LiveLevel {
    pub fn new(tiles: Grid, exit: Pos, monsters: &[Monster]) -> Self {
        let mut live = SlotMap::with_key();
        for monster in monsters {
            let key = live.insert(LiveMonster {
                key: MonsterKey::default(),
                id: monster.id,
                kind: monster.kind,
                pos: monster.pos,
            });
            live[key].key = key;
        }
        Self { tiles, exit, players: SlotMap::with_key(), monsters: live, log: Vec::new() }
    }

    pub fn from_level(level: &LevelState) -> Self {
        Self::new(level.tiles.clone(), level.exit, &level.monsters)
    }

    /// Places a player on `pos`. The cell must be walkable and free.
    pub fn add_player(&mut self, pos: Pos) -> Result<PlayerId, MoveError> {
        if !self.tiles.in_bounds(pos) {
            return Err(MoveError::OutOfBounds { at: pos });
        }
        match self.tiles.tile_at(pos) {
            Tile::Rock => return Err(MoveError::Rock { at: pos }),
            Tile::Block { .. } => return Err(MoveError::Occupied { at: pos }),
            _ => {}
        }
        if self.player_at(pos).is_some() || self.monster_at(pos).is_some() {
            return Err(MoveError::Occupied { at: pos });
        }

        let id = self.players.insert(Player {
            id: PlayerId::default(),
            pos,
            gold: 0,
            items: Vec::new(),
        });
        self.players[id].id = id;
        self.tiles.uncover(pos);
        Ok(id)
    }

    pub fn tiles(&self) -> &Grid {
        &self.tiles
    }

    pub fn exit(&self) -> Pos {
        self.exit
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn monster(&self, key: MonsterKey) -> Option<&LiveMonster> {
        self.monsters.get(key)
    }

    pub fn monsters(&self) -> impl Iterator<Item = &LiveMonster> {
        self.monsters.values()
    }

    pub fn monster_at(&self, pos: Pos) -> Option<&LiveMonster> {
        self.monsters.values().find(|monster| monster.pos == pos)
    }

    pub fn log(&self) -> &[GameEvent] {
        &self.log
    }

    pub fn reached_exit(&self, id: PlayerId) -> bool {
        self.players.get(id).is_some_and(|player| player.pos == self.exit)
    }

    pub fn move_player(&mut self, id: PlayerId, direction: Direction) -> Result<MoveOutcome, MoveError> {
        let from = self.players.get(id).ok_or(MoveError::UnknownActor)?.pos;
        let to = from.step(direction);
        if !self.tiles.in_bounds(to) {
            return Err(MoveError::OutOfBounds { at: to });
        }

        let pushed = match self.tiles.tile_at(to) {
            Tile::Rock => return Err(MoveError::Rock { at: to }),
            Tile::Block { .. } => {
                let chain = walk_push_chain(&self.board(direction), to, direction)?;
                self.apply_push(&chain);
                chain.len()
            }
            _ => {
                if self.player_at(to).is_some() {
                    return Err(MoveError::Occupied { at: to });
                }
                0
            }
        };

        self.players[id].pos = to;
        self.log.push(GameEvent::PlayerMoved { player: id, from, to });
        self.enter_cell(id, to);
        Ok(MoveOutcome { from, to, pushed })
    }

    /// Moves a monster over open floor. Monsters push blocks like players do
    /// but never collect anything.
    pub fn move_monster(&mut self, key: MonsterKey, direction: Direction) -> Result<MoveOutcome, MoveError> {
        let monster = self.monsters.get(key).ok_or(MoveError::UnknownActor)?;
        let (from, monster_id) = (monster.pos, monster.id);
        let to = from.step(direction);
        if !self.tiles.in_bounds(to) {
            return Err(MoveError::OutOfBounds { at: to });
        }
        if let Some(player) = self.player_at(to) {
            self.log.push(GameEvent::Encounter { player, monster: monster_id });
            return Ok(MoveOutcome { from, to: from, pushed: 0 });
        }

        let pushed = match self.tiles.tile_at(to) {
            Tile::Rock => return Err(MoveError::Rock { at: to }),
            Tile::Block { .. } => {
                let chain = walk_push_chain(&self.board(direction), to, direction)?;
                self.apply_push(&chain);
                chain.len()
            }
            tile if tile.is_open_floor() => {
                if self.monster_at(to).is_some() {
                    return Err(MoveError::Occupied { at: to });
                }
                0
            }
            _ => return Err(MoveError::Impassable { at: to }),
        };

        self.monsters[key].pos = to;
        self.log.push(GameEvent::MonsterMoved { monster: monster_id, from, to });
        Ok(MoveOutcome { from, to, pushed })
    }

    fn player_at(&self, pos: Pos) -> Option<PlayerId> {
        self.players.values().find(|player| player.pos == pos).map(|player| player.id)
    }

    fn board(&self, direction: Direction) -> RuntimeBoard<'_> {
        RuntimeBoard { level: self, direction }
    }

    /// Clears the landing cell, then shifts the chain tail first.
    fn apply_push(&mut self, chain: &PushChain) {
        let landing = chain.landing;
        let crushed: Vec<MonsterKey> = self
            .monsters
            .values()
            .filter(|monster| monster.pos == landing)
            .map(|monster| monster.key)
            .collect();
        for key in crushed {
            if let Some(monster) = self.monsters.remove(key) {
                debug!("block crushed monster {} at {:?}", monster.id, landing);
                self.log.push(GameEvent::MonsterCrushed { monster: monster.id, at: landing });
            }
        }
        if let Tile::Treasure { value, .. } = self.tiles.tile_at(landing) {
            self.log.push(GameEvent::TreasureCrushed { value: *value, at: landing });
        }
        if let Some(player) = self.player_at(landing) {
            let to = landing.step(chain.direction);
            self.players[player].pos = to;
            self.log.push(GameEvent::PlayerShoved { player, to });
            self.enter_cell(player, to);
        }

        for &cell in chain.cells.iter().rev() {
            let target = cell.step(chain.direction);
            let mut tile = self.tiles.tile_at(cell).clone();
            if self.tiles.tile_at(target).uncovered() {
                tile.uncover();
            }
            self.tiles.set_tile(target, tile);
        }
        self.tiles.set_tile(chain.head(), Tile::Empty { uncovered: true });
        self.log.push(GameEvent::BlocksPushed {
            direction: chain.direction,
            count: chain.len(),
            landing,
        });
    }

    fn enter_cell(&mut self, id: PlayerId, pos: Pos) {
        let Some(tile) = self.tiles.tile_mut(pos) else {
            return;
        };
        match tile {
            Tile::Treasure { value, .. } => {
                let value = *value;
                *tile = Tile::Empty { uncovered: true };
                self.players[id].gold += value;
                self.log.push(GameEvent::TreasureCollected { player: id, value });
            }
            Tile::MagicItem { item_name, .. } => {
                let item_name = mem::take(item_name);
                *tile = Tile::Empty { uncovered: true };
                self.players[id].items.push(item_name.clone());
                self.log.push(GameEvent::MagicItemCollected { player: id, item_name });
            }
            Tile::Trap { message, uncovered: false } => {
                let message = message.clone();
                self.log.push(GameEvent::TrapTriggered { player: id, message });
            }
            Tile::Exit { .. } => self.log.push(GameEvent::ExitReached { player: id }),
            _ => {}
        }
        self.tiles.uncover(pos);

        let met: Vec<u32> =
            self.monsters.values().filter(|monster| monster.pos == pos).map(|monster| monster.id).collect();
        for monster in met {
            self.log.push(GameEvent::Encounter { player: id, monster });
        }
    }
}

/// Live view used for one push: landing rules see players and monsters.
struct RuntimeBoard<'a> {
    level: &'a LiveLevel,
    direction: Direction,
}

impl RuntimeBoard<'_> {
    fn can_take_shoved_player(&self, pos: Pos) -> bool {
        let tiles = &self.level.tiles;
        tiles.in_bounds(pos)
            && !matches!(tiles.tile_at(pos), Tile::Rock | Tile::Block { .. })
            && self.level.player_at(pos).is_none()
            && self.level.monster_at(pos).is_none()
    }
}

impl ChainBoard for RuntimeBoard<'_> {
    fn in_bounds(&self, pos: Pos) -> bool {
        self.level.tiles.in_bounds(pos)
    }

    fn block_directions(&self, pos: Pos) -> Option<DirectionSet> {
        self.level.tiles.tile_at(pos).block_directions()
    }

    fn check_landing(&self, pos: Pos) -> Result<(), LandingBlocker> {
        match self.level.tiles.tile_at(pos) {
            Tile::Rock => Err(LandingBlocker::Rock),
            Tile::Exit { .. } => Err(LandingBlocker::Exit),
            Tile::Trap { .. } => Err(LandingBlocker::Trap),
            Tile::MagicItem { .. } => Err(LandingBlocker::MagicItem),
            Tile::Block { .. } => Err(LandingBlocker::Block),
            Tile::Empty { .. } | Tile::Treasure { .. } => {
                if self.level.player_at(pos).is_some()
                    && !self.can_take_shoved_player(pos.step(self.direction))
                {
                    return Err(LandingBlocker::PinnedPlayer);
                }
                Ok(())
            }
        }
    }
}
