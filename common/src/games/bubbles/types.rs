use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::games::SessionRng;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::Red,
        Color::Blue,
        Color::Green,
        Color::Yellow,
        Color::Purple,
    ];

    pub fn random(rng: &mut SessionRng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn symbol(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Blue => 'B',
            Color::Green => 'G',
            Color::Yellow => 'Y',
            Color::Purple => 'P',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.symbol() == symbol)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct PieceId(u32);

impl PieceId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a piece owned by the scene; the board only tracks id and color.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Piece {
    pub id: PieceId,
    pub color: Color,
}

impl Piece {
    pub fn new(id: PieceId, color: Color) -> Self {
        Self { id, color }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Position> {
        Some(Position {
            row: self.row.checked_add_signed(d_row)?,
            col: self.col.checked_add_signed(d_col)?,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RemovalReason {
    Matched,
    Detached,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PieceRemoved {
    pub position: Position,
    pub piece: Piece,
    pub reason: RemovalReason,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameOverReason {
    BoardCleared,
    BoardOverflow,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    PieceAttached {
        position: Position,
        piece: Piece,
    },
    PieceRemoved(PieceRemoved),
    ScoreAdded {
        matched: usize,
        floating: usize,
        points: u32,
        total: u32,
    },
    ShiftWarning {
        delay: Duration,
    },
    BoardShifted {
        anchor_row: usize,
        discarded: usize,
    },
    GameOver {
        reason: GameOverReason,
    },
}
