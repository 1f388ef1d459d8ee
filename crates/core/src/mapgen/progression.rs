//! Level-scaled counts and quotas used by layout and placement.

use crate::types::MonsterKind;

pub const MAX_ROOMS: usize = 6;

pub fn target_pushes(level: u32, pushes_per_level: u32) -> u32 {
    level.saturating_mul(pushes_per_level)
}

pub fn monster_quota(level: u32, kind: MonsterKind) -> usize {
    let count = match kind {
        MonsterKind::Green => 1 + level / 3,
        MonsterKind::Yellow if level >= 2 => 1 + (level - 2) / 3,
        MonsterKind::Red if level >= 3 => 1 + (level - 3) / 4,
        MonsterKind::Violet if level >= 4 => 1 + (level - 4) / 5,
        _ => 0,
    };
    count as usize
}

pub(super) fn room_count(level: u32) -> usize {
    (2 + level as usize).min(MAX_ROOMS)
}

/// `min(main_path_len / 3, floor(3 + 1.5 * level))`.
pub(super) fn block_count(level: u32, main_path_len: usize) -> usize {
    let scaled = 3 + (3 * level as usize) / 2;
    (main_path_len / 3).min(scaled)
}

pub(super) fn trap_count(level: u32) -> usize {
    6 + 2 * level as usize
}

pub(super) fn treasure_cap(level: u32) -> usize {
    4 + 2 * level as usize
}

pub(super) fn magic_item_count(level: u32) -> usize {
    (1 + level as usize / 2).min(3)
}

pub(super) fn contested_room_bonus(level: u32) -> usize {
    1 + level as usize / 3
}
