//! Tile grid storage and the accepted level record handed to callers.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

use crate::solver::Solution;
use crate::types::{Monster, Pos, Rect, Tile};

static OUT_OF_BOUNDS: Tile = Tile::Rock;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "GridRows", try_from = "GridRows")]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn filled(width: usize, height: usize, tile: Tile) -> Self {
        Self { width, height, tiles: vec![tile; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Inside the grid and off its outer border.
    pub fn is_interior(&self, pos: Pos) -> bool {
        pos.x >= 1
            && pos.y >= 1
            && (pos.x as usize) < self.width - 1
            && (pos.y as usize) < self.height - 1
    }

    /// Out-of-bounds positions read as rock.
    pub fn tile_at(&self, pos: Pos) -> &Tile {
        if !self.in_bounds(pos) {
            return &OUT_OF_BOUNDS;
        }
        &self.tiles[self.index(pos)]
    }

    pub fn tile_mut(&mut self, pos: Pos) -> Option<&mut Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        let idx = self.index(pos);
        Some(&mut self.tiles[idx])
    }

    pub fn set_tile(&mut self, pos: Pos, tile: Tile) {
        if let Some(slot) = self.tile_mut(pos) {
            *slot = tile;
        }
    }

    pub fn uncover(&mut self, pos: Pos) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.uncover();
        }
    }

    pub fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }

    pub fn pos_of(&self, index: usize) -> Pos {
        Pos { y: (index / self.width) as i32, x: (index % self.width) as i32 }
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let width = self.width;
        (0..self.width * self.height).map(move |index| Pos {
            y: (index / width) as i32,
            x: (index % width) as i32,
        })
    }

    pub fn render_ascii(&self, monsters: &[Monster]) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Pos { y: y as i32, x: x as i32 };
                let glyph = monsters
                    .iter()
                    .find(|monster| monster.pos == pos)
                    .map_or_else(|| self.tile_at(pos).glyph(), |monster| monster.kind.glyph());
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Error)]
#[error("grid rows do not match {width}x{height}")]
pub struct GridShapeError {
    width: usize,
    height: usize,
}

/// Row-nested JSON mirror of [`Grid`].
#[derive(Clone, Debug, Serialize, Deserialize)]
struct GridRows {
    width: usize,
    height: usize,
    rows: Vec<Vec<Tile>>,
}

impl From<Grid> for GridRows {
    fn from(grid: Grid) -> Self {
        let rows = if grid.width == 0 {
            Vec::new()
        } else {
            grid.tiles.chunks(grid.width).map(<[Tile]>::to_vec).collect()
        };
        Self { width: grid.width, height: grid.height, rows }
    }
}

impl TryFrom<GridRows> for Grid {
    type Error = GridShapeError;

    fn try_from(rows: GridRows) -> Result<Self, Self::Error> {
        let shape_error = GridShapeError { width: rows.width, height: rows.height };
        if rows.width < 3 || rows.height < 3 || rows.rows.len() != rows.height {
            return Err(shape_error);
        }
        if rows.rows.iter().any(|row| row.len() != rows.width) {
            return Err(shape_error);
        }
        let tiles = rows.rows.into_iter().flatten().collect();
        Ok(Self { width: rows.width, height: rows.height, tiles })
    }
}

/// How much the generator was able to prove about an accepted level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Solvability {
    /// Solvable and at or above the level's push target.
    Proven,
    /// Solvable, but the difficulty target was not reached.
    BestEffort,
    /// No solvability proof; a degraded fallback level.
    Unverified,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelState {
    pub tiles: Grid,
    pub start_area: Rect,
    pub exit: Pos,
    pub monsters: Vec<Monster>,
    pub width: usize,
    pub height: usize,
    pub level: u32,
    pub seed: u64,
    pub attempt_seed: u64,
    pub solvability: Solvability,
    pub min_pushes: Option<u32>,
    pub solution: Option<Solution>,
}

impl LevelState {
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        bytes.extend(self.level.to_le_bytes());
        bytes.extend(self.seed.to_le_bytes());
        bytes.extend(self.attempt_seed.to_le_bytes());
        for tile in self.tiles.tiles() {
            push_tile_bytes(&mut bytes, tile);
        }
        for value in [self.start_area.x, self.start_area.y, self.start_area.width, self.start_area.height]
        {
            bytes.extend((value as u32).to_le_bytes());
        }
        bytes.extend(self.exit.y.to_le_bytes());
        bytes.extend(self.exit.x.to_le_bytes());

        bytes.extend((self.monsters.len() as u32).to_le_bytes());
        for monster in &self.monsters {
            bytes.extend(monster.id.to_le_bytes());
            bytes.push(monster.kind as u8);
            bytes.extend(monster.pos.y.to_le_bytes());
            bytes.extend(monster.pos.x.to_le_bytes());
        }

        bytes.push(self.solvability as u8);
        bytes.extend(self.min_pushes.unwrap_or(u32::MAX).to_le_bytes());
        bytes
    }

    /// Stable 64-bit hash of [`Self::canonical_bytes`].
    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    pub fn monster_at(&self, pos: Pos) -> Option<&Monster> {
        self.monsters.iter().find(|monster| monster.pos == pos)
    }
}

fn push_tile_bytes(bytes: &mut Vec<u8>, tile: &Tile) {
    match tile {
        Tile::Rock => bytes.push(0),
        Tile::Empty { uncovered } => {
            bytes.push(1);
            bytes.push(u8::from(*uncovered));
        }
        Tile::Block { directions, uncovered } => {
            bytes.push(2);
            bytes.push(directions.bits());
            bytes.push(u8::from(*uncovered));
        }
        Tile::Trap { message, uncovered } => {
            bytes.push(3);
            push_str_bytes(bytes, message);
            bytes.push(u8::from(*uncovered));
        }
        Tile::Treasure { value, uncovered } => {
            bytes.push(4);
            bytes.extend(value.to_le_bytes());
            bytes.push(u8::from(*uncovered));
        }
        Tile::MagicItem { item_name, uncovered } => {
            bytes.push(5);
            push_str_bytes(bytes, item_name);
            bytes.push(u8::from(*uncovered));
        }
        Tile::Exit { uncovered } => {
            bytes.push(6);
            bytes.push(u8::from(*uncovered));
        }
    }
}

fn push_str_bytes(bytes: &mut Vec<u8>, text: &str) {
    bytes.extend((text.len() as u32).to_le_bytes());
    bytes.extend(text.as_bytes());
}
