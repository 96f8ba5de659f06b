//! Immutable board snapshot: occupied cells plus an optional falling piece.
//!
//! Every transition returns a new snapshot; nothing is mutated in place.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::zobrist_key;
use crate::config::{BoardConfig, ConfigError};
use crate::{CellSet, Move, PlacedPiece, Point, Shape};

/// Keeps active-piece cell keys apart from occupied-cell keys.
const PIECE_SALT: u64 = 0x5bd1_e995_7f4a_7c15;
/// Keeps the piece anchor key apart from its cell keys.
const ANCHOR_SALT: u64 = 0x2545_f491_4f6c_dd1d;

#[derive(Clone, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRepr", into = "SnapshotRepr")]
pub struct Snapshot {
    occupied: CellSet,
    piece: Option<PlacedPiece>,
}

/// Result of applying one elementary move.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Transition {
    /// The piece is still active in the new snapshot.
    Falling(Snapshot),
    /// The piece was merged and full rows removed; no active piece remains.
    Landed {
        snapshot: Snapshot,
        lines_cleared: usize,
    },
}

impl Transition {
    pub fn snapshot(&self) -> &Snapshot {
        match self {
            Transition::Falling(s) => s,
            Transition::Landed { snapshot, .. } => snapshot,
        }
    }

    pub fn into_snapshot(self) -> Snapshot {
        match self {
            Transition::Falling(s) => s,
            Transition::Landed { snapshot, .. } => snapshot,
        }
    }

    pub fn is_landed(&self) -> bool {
        matches!(self, Transition::Landed { .. })
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl Snapshot {
    pub fn new(config: BoardConfig) -> Self {
        Self::from_occupied(CellSet::with_config(config))
    }

    pub fn empty(width: usize, height: usize) -> Result<Self, ConfigError> {
        Ok(Self::new(BoardConfig::new(width, height)?))
    }

    /// Terminal snapshot (no active piece) over the given cells.
    pub fn from_occupied(occupied: CellSet) -> Self {
        Self {
            occupied,
            piece: None,
        }
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.occupied.width()
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.occupied.height()
    }

    #[inline(always)]
    pub fn occupied(&self) -> &CellSet {
        &self.occupied
    }

    #[inline(always)]
    pub fn piece(&self) -> Option<&PlacedPiece> {
        self.piece.as_ref()
    }

    pub fn spawn_anchor(&self) -> Point {
        Point::new((self.width() / 2) as i32, 0)
    }

    /// Place `shape`, un-rotated, at the spawn anchor. Any active piece is
    /// replaced. `None` means the spawn cells are taken: game over.
    pub fn spawn(&self, shape: Shape) -> Option<Snapshot> {
        let piece = PlacedPiece::spawn(shape, self.spawn_anchor());
        self.is_legal(&piece).then(|| Snapshot {
            occupied: self.occupied.clone(),
            piece: Some(piece),
        })
    }

    /// Inside the side walls, above the floor, and clear of occupied cells.
    /// Rows above the top edge are allowed.
    pub fn is_legal(&self, piece: &PlacedPiece) -> bool {
        let (w, h) = (self.width() as i32, self.height() as i32);
        piece.cells().iter().all(|c| {
            c.col >= 0 && c.col < w && c.row < h && !self.occupied.contains_cell(c.col, c.row)
        })
    }

    /// Any cell on the bottom row or resting on an occupied cell.
    pub fn has_landed(&self, piece: &PlacedPiece) -> bool {
        let bottom = self.height() as i32 - 1;
        piece
            .cells()
            .iter()
            .any(|c| c.row == bottom || self.occupied.contains_cell(c.col, c.row + 1))
    }

    /// Apply one elementary move to the active piece.
    ///
    /// `None` when there is no active piece or the transformed piece is not
    /// legal. Otherwise: if the current piece has already landed it is merged
    /// where it is; if the transformed piece lands it is merged; else the
    /// transformed piece keeps falling.
    pub fn transition(&self, mv: Move) -> Option<Transition> {
        let current = self.piece.as_ref()?;
        let next = mv.apply(current);
        if !self.is_legal(&next) {
            return None;
        }
        if self.has_landed(current) {
            return Some(self.merge(current));
        }
        if self.has_landed(&next) {
            return Some(self.merge(&next));
        }
        Some(Transition::Falling(Snapshot {
            occupied: self.occupied.clone(),
            piece: Some(next),
        }))
    }

    pub fn apply_move(&self, mv: Move) -> Option<Snapshot> {
        self.transition(mv).map(Transition::into_snapshot)
    }

    /// Merge the active piece where it stands. `None` without an active piece.
    pub fn lock_piece(&self) -> Option<Transition> {
        self.piece.as_ref().map(|piece| self.merge(piece))
    }

    /// Merge `piece` into the occupied cells and clear full rows. Cells above
    /// the top edge have nowhere to go and are dropped.
    fn merge(&self, piece: &PlacedPiece) -> Transition {
        let mut occupied = self.occupied.clone();
        for c in piece.cells() {
            occupied.insert_cell(c.col, c.row);
        }
        let (occupied, lines_cleared) = occupied.clear_full_rows();
        Transition::Landed {
            snapshot: Snapshot::from_occupied(occupied),
            lines_cleared,
        }
    }

    /// 64-bit fingerprint of occupied cells and the active piece.
    ///
    /// The piece contributes its cells and its anchor, so two pieces over
    /// the same cells but with a different anchor/offset split differ. Each
    /// key is salted once, per role.
    pub fn fingerprint(&self) -> u64 {
        let w = self.width() as i64;
        let key = |p: Point, salt: u64| zobrist_key((p.row as i64 * w + p.col as i64) as u64 ^ salt);
        let piece_hash = self.piece.as_ref().map_or(0, |piece| {
            piece
                .cells()
                .iter()
                .fold(key(piece.anchor, ANCHOR_SALT), |acc, &c| acc ^ key(c, PIECE_SALT))
        });
        self.occupied.fingerprint() ^ piece_hash
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match &self.piece {
            Some(piece) if !self.is_legal(piece) => Err(ConfigError::IllegalPiece),
            _ => Ok(()),
        }
    }
}

/// Bordered text grid, `X` for occupied or active-piece cells.
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = self.piece.map(|p| p.cells());
        let in_piece = |pt: Point| active.is_some_and(|cells| cells.contains(&pt));
        let border = "-".repeat(self.width());
        writeln!(f, "+{border}+")?;
        for y in 0..self.height() as i32 {
            write!(f, "|")?;
            for x in 0..self.width() as i32 {
                let filled =
                    self.occupied.contains_cell(x, y) || in_piece(Point::new(x, y));
                write!(f, "{}", if filled { 'X' } else { ' ' })?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "+{border}+")
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct SnapshotRepr {
    occupied: CellSet,
    piece: Option<PlacedPiece>,
}

impl From<Snapshot> for SnapshotRepr {
    fn from(s: Snapshot) -> Self {
        Self {
            occupied: s.occupied,
            piece: s.piece,
        }
    }
}

impl TryFrom<SnapshotRepr> for Snapshot {
    type Error = ConfigError;

    fn try_from(repr: SnapshotRepr) -> Result<Self, Self::Error> {
        let snapshot = Snapshot {
            occupied: repr.occupied,
            piece: repr.piece,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }
}
