//! JSON snapshots of accepted levels.
//!
//! A snapshot is the [`LevelState`] JSON mirror with two extra fields:
//! `formatVersion` and a `fingerprint` (xxh3 of the level's canonical bytes).
//! Tiles are nested rows of `{"type": ...}` objects, blocks carry their
//! `directions` arrays. Loading checks the version, the grid shape, and the
//! fingerprint before handing the level back.
//!
//! Saving writes a sibling temp file and renames it over the target, so a
//! crash never leaves a half-written snapshot behind.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::LevelState;
use crate::types::Pos;

pub const SNAPSHOT_FORMAT_VERSION: u16 = 1;

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSnapshot {
    pub format_version: u16,
    pub fingerprint: u64,
    #[serde(flatten)]
    pub level: LevelState,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot format version {found} (expected {expected})", expected = SNAPSHOT_FORMAT_VERSION)]
    UnsupportedVersion { found: u16 },
    #[error("snapshot shape mismatch: {message}")]
    ShapeMismatch { message: String },
    #[error("snapshot fingerprint {stored:#018x} does not match its level ({computed:#018x})")]
    FingerprintMismatch { stored: u64, computed: u64 },
}

impl LevelSnapshot {
    pub fn new(level: LevelState) -> Self {
        Self { format_version: SNAPSHOT_FORMAT_VERSION, fingerprint: level.fingerprint(), level }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses and validates a snapshot.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(text)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn into_level(self) -> LevelState {
        self.level
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion { found: self.format_version });
        }
        check_shape(&self.level)?;
        let computed = self.level.fingerprint();
        if computed != self.fingerprint {
            return Err(SnapshotError::FingerprintMismatch { stored: self.fingerprint, computed });
        }
        Ok(())
    }
}

fn shape_error(message: String) -> SnapshotError {
    SnapshotError::ShapeMismatch { message }
}

fn check_shape(level: &LevelState) -> Result<(), SnapshotError> {
    let tiles = &level.tiles;
    if (level.width, level.height) != (tiles.width(), tiles.height()) {
        return Err(shape_error(format!(
            "declared {}x{} but tiles are {}x{}",
            level.width,
            level.height,
            tiles.width(),
            tiles.height()
        )));
    }
    if !tiles.in_bounds(level.exit) {
        return Err(shape_error(format!("exit ({}, {}) is off the grid", level.exit.x, level.exit.y)));
    }
    let area = level.start_area;
    let corner = Pos { y: area.bottom() as i32, x: area.right() as i32 };
    if area.width == 0 || area.height == 0 || !tiles.in_bounds(corner) {
        return Err(shape_error("start area does not fit the grid".to_string()));
    }
    if let Some(monster) = level.monsters.iter().find(|monster| !tiles.in_bounds(monster.pos)) {
        return Err(shape_error(format!("monster {} is off the grid", monster.id)));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `level` to `path`, creating parent directories as needed.
pub fn save_snapshot(path: &Path, level: &LevelState) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = LevelSnapshot::new(level.clone()).to_json()?;

    let tmp = temp_path(path);
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }
    fs::rename(&tmp, path)?;
    debug!("saved level {} snapshot to {}", level.level, path.display());
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<LevelState, SnapshotError> {
    let text = fs::read_to_string(path)?;
    Ok(LevelSnapshot::from_json(&text)?.into_level())
}
