use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn step(self, direction: Direction) -> Self {
        let (dy, dx) = direction.delta();
        Self { y: self.y + dy, x: self.x + dx }
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Direction of a single orthogonal step from `self` to `next`, if they are adjacent.
    pub fn direction_to(self, next: Pos) -> Option<Direction> {
        Direction::ALL.into_iter().find(|&direction| self.step(direction) == next)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Clockwise from up; every neighbour scan in the crate uses this order.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Direction::Up => 0b0001,
            Direction::Down => 0b0010,
            Direction::Left => 0b0100,
            Direction::Right => 0b1000,
        }
    }
}

/// Set of directions a block may be pushed along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Direction>", into = "Vec<Direction>")]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub const EMPTY: DirectionSet = DirectionSet(0);
    pub const ALL: DirectionSet = DirectionSet(0b1111);

    pub fn single(direction: Direction) -> Self {
        Self(direction.bit())
    }

    /// Both directions along the axis of `direction`.
    pub fn axis(direction: Direction) -> Self {
        Self(direction.bit() | direction.reverse().bit())
    }

    pub fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |&direction| self.contains(direction))
    }
}

impl From<Vec<Direction>> for DirectionSet {
    fn from(directions: Vec<Direction>) -> Self {
        let mut set = DirectionSet::EMPTY;
        for direction in directions {
            set.insert(direction);
        }
        set
    }
}

impl From<DirectionSet> for Vec<Direction> {
    fn from(set: DirectionSet) -> Self {
        set.iter().collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Tile {
    Rock,
    Empty { uncovered: bool },
    Block { directions: DirectionSet, uncovered: bool },
    Trap { message: String, uncovered: bool },
    Treasure { value: u32, uncovered: bool },
    MagicItem { item_name: String, uncovered: bool },
    Exit { uncovered: bool },
}

impl Tile {
    pub const HIDDEN_FLOOR: Tile = Tile::Empty { uncovered: false };

    pub fn is_rock(&self) -> bool {
        matches!(self, Tile::Rock)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Tile::Empty { .. })
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Tile::Block { .. })
    }

    /// Floor that flood fills and monsters may cross: plain floor and treasure.
    pub fn is_open_floor(&self) -> bool {
        matches!(self, Tile::Empty { .. } | Tile::Treasure { .. })
    }

    pub fn block_directions(&self) -> Option<DirectionSet> {
        match self {
            Tile::Block { directions, .. } => Some(*directions),
            _ => None,
        }
    }

    pub fn uncovered(&self) -> bool {
        match self {
            Tile::Rock => false,
            Tile::Empty { uncovered }
            | Tile::Block { uncovered, .. }
            | Tile::Trap { uncovered, .. }
            | Tile::Treasure { uncovered, .. }
            | Tile::MagicItem { uncovered, .. }
            | Tile::Exit { uncovered } => *uncovered,
        }
    }

    /// Marks the tile as seen. Visibility never reverts.
    pub fn uncover(&mut self) {
        match self {
            Tile::Rock => {}
            Tile::Empty { uncovered }
            | Tile::Block { uncovered, .. }
            | Tile::Trap { uncovered, .. }
            | Tile::Treasure { uncovered, .. }
            | Tile::MagicItem { uncovered, .. }
            | Tile::Exit { uncovered } => *uncovered = true,
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            Tile::Rock => '#',
            Tile::Empty { .. } => '.',
            Tile::Block { directions, .. } if *directions == DirectionSet::ALL => '+',
            Tile::Block { .. } => 'B',
            Tile::Trap { .. } => '^',
            Tile::Treasure { .. } => '$',
            Tile::MagicItem { .. } => '*',
            Tile::Exit { .. } => '>',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonsterKind {
    Green,
    Yellow,
    Red,
    Violet,
}

impl MonsterKind {
    pub const ALL: [MonsterKind; 4] =
        [MonsterKind::Green, MonsterKind::Yellow, MonsterKind::Red, MonsterKind::Violet];

    pub fn glyph(self) -> char {
        match self {
            MonsterKind::Green => 'g',
            MonsterKind::Yellow => 'y',
            MonsterKind::Red => 'r',
            MonsterKind::Violet => 'v',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: MonsterKind,
    #[serde(flatten)]
    pub pos: Pos,
}

/// Axis-aligned rectangle of cells, used for the start area and generated rooms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn right(self) -> usize {
        self.x + self.width - 1
    }

    pub fn bottom(self) -> usize {
        self.y + self.height - 1
    }

    pub fn center(self) -> Pos {
        Pos { y: (self.y + (self.height / 2)) as i32, x: (self.x + (self.width / 2)) as i32 }
    }

    pub fn expanded(self, margin: usize) -> Self {
        let expanded_x = self.x.saturating_sub(margin);
        let expanded_y = self.y.saturating_sub(margin);
        let expanded_right = self.right().saturating_add(margin);
        let expanded_bottom = self.bottom().saturating_add(margin);
        Self {
            x: expanded_x,
            y: expanded_y,
            width: expanded_right - expanded_x + 1,
            height: expanded_bottom - expanded_y + 1,
        }
    }

    pub fn intersects(self, other: &Self) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    pub fn contains(self, pos: Pos) -> bool {
        if pos.x < 0 || pos.y < 0 {
            return false;
        }
        let px = pos.x as usize;
        let py = pos.y as usize;
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Cells in row-major order.
    pub fn cells(self) -> impl Iterator<Item = Pos> {
        (self.y..=self.bottom()).flat_map(move |y| {
            (self.x..=self.right()).map(move |x| Pos { y: y as i32, x: x as i32 })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_set_serializes_as_direction_names() {
        let set = DirectionSet::axis(Direction::Left);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["right","left"]"#);
        let decoded: DirectionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, set);
    }

    #[test]
    fn tile_json_uses_kebab_case_tags_and_camel_case_fields() {
        let tile = Tile::MagicItem { item_name: "Lantern".to_string(), uncovered: false };
        let json = serde_json::to_string(&tile).unwrap();
        assert_eq!(json, r#"{"type":"magic-item","itemName":"Lantern","uncovered":false}"#);
        assert_eq!(serde_json::from_str::<Tile>(&json).unwrap(), tile);
    }

    #[test]
    fn uncover_is_sticky_and_rock_stays_hidden() {
        let mut floor = Tile::HIDDEN_FLOOR;
        floor.uncover();
        floor.uncover();
        assert!(floor.uncovered());

        let mut rock = Tile::Rock;
        rock.uncover();
        assert!(!rock.uncovered());
    }

    #[test]
    fn rect_cells_cover_the_area_row_major() {
        let rect = Rect { x: 1, y: 1, width: 3, height: 3 };
        let cells: Vec<Pos> = rect.cells().collect();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], Pos { y: 1, x: 1 });
        assert_eq!(cells[1], Pos { y: 1, x: 2 });
        assert_eq!(cells[8], Pos { y: 3, x: 3 });
        assert_eq!(rect.center(), Pos { y: 2, x: 2 });
    }
}
