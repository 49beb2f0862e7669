use super::board::{Board, RemovalObserver};
use super::scoring::ScoreSink;
use super::types::Position;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct AttachOutcome {
    pub matched: usize,
    pub floating: usize,
    pub points: u32,
    pub game_over: bool,
    /// Only evaluated after a match; the caller decides when to declare the win.
    pub board_cleared: bool,
}

pub struct MatchResolver;

impl MatchResolver {
    /// Runs match, prune, game-over check and win check, in that order, for a
    /// piece that has just been placed at `position`. The win check is skipped
    /// when nothing matched, since only a match can empty the board.
    pub fn on_piece_attached<S, O>(
        board: &mut Board,
        position: Position,
        scoring: &mut S,
        observer: &mut O,
    ) -> AttachOutcome
    where
        S: ScoreSink + ?Sized,
        O: RemovalObserver + ?Sized,
    {
        let outcome = board.resolve_match(position, observer);

        let mut result = AttachOutcome {
            matched: outcome.matched,
            floating: outcome.floating,
            ..AttachOutcome::default()
        };

        if outcome.matched > 0 {
            result.points = scoring.on_match(outcome.matched, outcome.floating);
        }

        result.game_over = board.check_game_over();

        if outcome.matched > 0 {
            result.board_cleared = board.check_win();
        }

        result
    }
}
