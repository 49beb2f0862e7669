use bubble_common::games::SessionRng;
use bubble_common::games::bubbles::{Board, BubbleGameState, Color, Piece, PieceId, Position};

use crate::config::BotKind;
use crate::placement::{Placement, WorldPoint};

/// Aim point for the current piece, or `None` when there is nothing to shoot
/// or nowhere to attach.
pub fn calculate_shot(
    bot: BotKind,
    state: &BubbleGameState,
    placement: &Placement,
    rng: &mut SessionRng,
) -> Option<WorldPoint> {
    let piece = state.current_piece()?;
    let target = pick_target(bot, state.board(), piece.color, rng)?;
    Some(placement.cell_center(state.board(), target))
}

pub fn pick_target(
    bot: BotKind,
    board: &Board,
    color: Color,
    rng: &mut SessionRng,
) -> Option<Position> {
    let candidates = board.attachable_cells();
    match bot {
        BotKind::Random => rng.choose(&candidates).copied(),
        BotKind::Greedy => pick_largest_group(board, color, &candidates, rng),
    }
}

fn pick_largest_group(
    board: &Board,
    color: Color,
    candidates: &[Position],
    rng: &mut SessionRng,
) -> Option<Position> {
    let mut best = Vec::new();
    let mut best_size = 0;

    for &pos in candidates {
        let size = group_size_with(board, pos, color);
        if size > best_size {
            best_size = size;
            best.clear();
            best.push(pos);
        } else if size == best_size {
            best.push(pos);
        }
    }

    rng.choose(&best).copied()
}

/// Size of the same-color group `pos` would belong to if a `color` piece sat there.
fn group_size_with(board: &Board, pos: Position, color: Color) -> usize {
    let mut trial = board.clone();
    trial.set(pos, Some(Piece::new(PieceId::new(0), color)));
    trial.same_color_group(pos).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bubble_common::games::bubbles::{BoardSettings, BubbleSettings};

    fn place(board: &mut Board, row: usize, col: usize, color: Color) {
        board.set(Position::new(row, col), Some(Piece::new(PieceId::new(1), color)));
    }

    #[test]
    fn test_greedy_joins_largest_group() {
        let mut board = Board::new(&BoardSettings::default());
        place(&mut board, 0, 0, Color::Red);
        place(&mut board, 0, 1, Color::Red);
        place(&mut board, 0, 5, Color::Blue);
        let mut rng = SessionRng::new(3);

        for _ in 0..20 {
            let target = pick_target(BotKind::Greedy, &board, Color::Red, &mut rng).unwrap();
            assert!(
                [Position::new(0, 2), Position::new(1, 0), Position::new(1, 1)].contains(&target),
                "unexpected target {}",
                target
            );
        }
    }

    #[test]
    fn test_random_targets_are_attachable() {
        let mut board = Board::new(&BoardSettings::default());
        place(&mut board, 0, 3, Color::Green);
        let attachable = board.attachable_cells();
        let mut rng = SessionRng::new(8);

        for _ in 0..50 {
            let target = pick_target(BotKind::Random, &board, Color::Yellow, &mut rng).unwrap();
            assert!(attachable.contains(&target));
        }
    }

    #[test]
    fn test_no_shot_without_current_piece() {
        let state = BubbleGameState::create(BubbleSettings::default(), 1, None).unwrap();
        let mut rng = SessionRng::new(1);

        let shot = calculate_shot(BotKind::Greedy, &state, &Placement::default(), &mut rng);

        assert_eq!(shot, None);
    }

    #[test]
    fn test_shot_lands_on_target_cell() {
        let state = BubbleGameState::with_seed(BubbleSettings::default(), 11).unwrap();
        let placement = Placement::default();
        let mut rng = SessionRng::new(4);

        let aim = calculate_shot(BotKind::Greedy, &state, &placement, &mut rng).unwrap();
        let cell = placement.nearest_empty_cell(state.board(), aim).unwrap();

        assert_eq!(placement.cell_center(state.board(), cell), aim);
        assert!(state.board().attachable_cells().contains(&cell));
    }
}
