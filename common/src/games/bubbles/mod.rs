mod board;
mod game_state;
mod geometry;
mod piece_factory;
mod resolver;
mod scoring;
mod settings;
mod types;

pub use board::{Board, DiscardRemovals, MatchOutcome, RemovalObserver};
pub use game_state::BubbleGameState;
pub use geometry::{GridGeometry, GridShape, RowWidth};
pub use piece_factory::{PieceFactory, SequentialPieceFactory};
pub use resolver::{AttachOutcome, MatchResolver};
pub use scoring::{ScoreSink, Scoreboard};
pub use settings::*;
pub use types::{
    Color, GameEvent, GameOverReason, GameStatus, Piece, PieceId, PieceRemoved, Position,
    RemovalReason,
};
