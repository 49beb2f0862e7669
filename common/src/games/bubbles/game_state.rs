use std::time::Duration;

use crate::config::Validate;
use crate::games::SessionRng;
use crate::{log, log_error};

use super::board::Board;
use super::geometry::GridShape;
use super::piece_factory::{PieceFactory, SequentialPieceFactory};
use super::resolver::MatchResolver;
use super::scoring::Scoreboard;
use super::settings::BubbleSettings;
use super::types::{GameEvent, GameOverReason, GameStatus, Piece, Position};

/// One match: the board plus the shot queue, score, shift timer and status.
pub struct BubbleGameState {
    settings: BubbleSettings,
    board: Board,
    scoreboard: Scoreboard,
    factory: Option<Box<dyn PieceFactory>>,
    rng: SessionRng,
    current: Option<Piece>,
    next: Option<Piece>,
    status: GameStatus,
    game_over_reason: Option<GameOverReason>,
    shift_timer: Duration,
    /// Remaining warning time of every armed shift, oldest first.
    pending_shifts: Vec<Duration>,
    pending_win: Option<Duration>,
    shots_fired: u32,
    shifts: u32,
}

impl BubbleGameState {
    /// Without a factory the match cannot be set up: the error is logged and
    /// the board stays empty with nothing to shoot.
    pub fn create(
        settings: BubbleSettings,
        seed: u64,
        factory: Option<Box<dyn PieceFactory>>,
    ) -> Result<Self, String> {
        settings.validate()?;

        let mut state = Self {
            settings,
            board: Board::new(&settings.board),
            scoreboard: Scoreboard::new(settings.base_points, settings.bonus_points),
            factory,
            rng: SessionRng::new(seed),
            current: None,
            next: None,
            status: GameStatus::InProgress,
            game_over_reason: None,
            shift_timer: Duration::ZERO,
            pending_shifts: Vec::new(),
            pending_win: None,
            shots_fired: 0,
            shifts: 0,
        };
        state.initialize();
        Ok(state)
    }

    pub fn with_seed(settings: BubbleSettings, seed: u64) -> Result<Self, String> {
        Self::create(settings, seed, Some(Box::new(SequentialPieceFactory::new())))
    }

    fn initialize(&mut self) {
        let Some(factory) = self.factory.as_mut() else {
            log_error!("No piece factory configured, skipping board initialization");
            return;
        };

        self.board.initialize_random(
            self.settings.initial_rows,
            self.settings.spawn_chance,
            factory.as_mut(),
            &mut self.rng,
        );
        self.current = Some(factory.create_random(&mut self.rng));
        self.next = Some(factory.create_random(&mut self.rng));
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn settings(&self) -> &BubbleSettings {
        &self.settings
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over_reason
    }

    pub fn score(&self) -> u32 {
        self.scoreboard.score()
    }

    pub fn current_piece(&self) -> Option<Piece> {
        self.current
    }

    pub fn next_piece(&self) -> Option<Piece> {
        self.next
    }

    pub fn shots_fired(&self) -> u32 {
        self.shots_fired
    }

    pub fn shifts(&self) -> u32 {
        self.shifts
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn is_win_pending(&self) -> bool {
        self.pending_win.is_some()
    }

    pub fn is_shift_pending(&self) -> bool {
        !self.pending_shifts.is_empty()
    }

    /// Places the current piece at `position` and resolves the consequences.
    pub fn attach_current(&mut self, position: Position) -> Result<Vec<GameEvent>, String> {
        if self.status != GameStatus::InProgress {
            return Err("Game is already over".to_string());
        }
        if !self.board.is_inside(position) {
            return Err(format!("Cell {} is outside the board", position));
        }
        if position.row < self.board.anchor_row() {
            return Err(format!(
                "Cell {} is above the anchor row {}",
                position,
                self.board.anchor_row()
            ));
        }
        if self.board.get(position).is_some() {
            return Err(format!("Cell {} is already occupied", position));
        }
        let Some(piece) = self.current.take() else {
            return Err("No piece ready to attach".to_string());
        };

        self.board.set(position, Some(piece));
        self.shots_fired += 1;

        let mut events = vec![GameEvent::PieceAttached { position, piece }];
        let mut removals = Vec::new();
        let outcome = MatchResolver::on_piece_attached(
            &mut self.board,
            position,
            &mut self.scoreboard,
            &mut removals,
        );
        events.extend(removals.into_iter().map(GameEvent::PieceRemoved));

        if outcome.points > 0 {
            events.push(GameEvent::ScoreAdded {
                matched: outcome.matched,
                floating: outcome.floating,
                points: outcome.points,
                total: self.scoreboard.score(),
            });
        }

        if outcome.game_over {
            events.push(self.finish(GameOverReason::BoardOverflow));
        } else if outcome.board_cleared && self.pending_win.is_none() {
            let delay = self.settings.win_delay();
            if delay.is_zero() {
                events.push(self.finish(GameOverReason::BoardCleared));
            } else {
                self.pending_win = Some(delay);
            }
        }

        if self.status == GameStatus::InProgress {
            self.advance_queue();
        }

        Ok(events)
    }

    /// Advances the clock by `elapsed`: fires a pending win and every shift whose
    /// warning ran out, then arms one more shift once the interval has passed.
    /// Armed shifts queue up, so a warning longer than the interval still
    /// yields one shift per interval.
    pub fn update(&mut self, elapsed: Duration) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.status != GameStatus::InProgress {
            return events;
        }

        if let Some(remaining) = self.pending_win {
            if elapsed >= remaining {
                events.push(self.finish(GameOverReason::BoardCleared));
                return events;
            }
            self.pending_win = Some(remaining - elapsed);
        }

        let mut due = 0;
        self.pending_shifts.retain_mut(|remaining| {
            if elapsed >= *remaining {
                due += 1;
                false
            } else {
                *remaining -= elapsed;
                true
            }
        });
        for _ in 0..due {
            events.extend(self.apply_shift());
            if self.status != GameStatus::InProgress {
                return events;
            }
        }

        self.shift_timer += elapsed;
        if self.shift_timer >= self.settings.shift_interval() {
            self.shift_timer = Duration::ZERO;

            let warning = self.settings.shift_warning();
            events.push(GameEvent::ShiftWarning { delay: warning });
            if warning.is_zero() {
                events.extend(self.apply_shift());
            } else {
                self.pending_shifts.push(warning);
            }
        }

        events
    }

    fn apply_shift(&mut self) -> Vec<GameEvent> {
        let discarded = self.board.shift_down();
        self.shifts += 1;

        let mut events = vec![GameEvent::BoardShifted {
            anchor_row: self.board.anchor_row(),
            discarded,
        }];
        if self.board.check_game_over() {
            events.push(self.finish(GameOverReason::BoardOverflow));
        }
        events
    }

    fn advance_queue(&mut self) {
        self.current = self.next.take();
        if let Some(factory) = self.factory.as_mut() {
            self.next = Some(factory.create_random(&mut self.rng));
        }
    }

    fn finish(&mut self, reason: GameOverReason) -> GameEvent {
        self.status = match reason {
            GameOverReason::BoardCleared => GameStatus::Won,
            GameOverReason::BoardOverflow => GameStatus::Lost,
        };
        self.game_over_reason = Some(reason);
        self.pending_win = None;
        self.pending_shifts.clear();

        log!(
            "Game over ({:?}): score {}, {} shot(s), {} shift(s)",
            reason,
            self.scoreboard.score(),
            self.shots_fired,
            self.shifts
        );
        GameEvent::GameOver { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::bubbles::settings::BoardSettings;
    use crate::games::bubbles::types::{Color, PieceId, RemovalReason};

    struct ScriptedFactory {
        colors: Vec<Color>,
        issued: u32,
    }

    impl ScriptedFactory {
        fn boxed(colors: &[Color]) -> Option<Box<dyn PieceFactory>> {
            Some(Box::new(Self {
                colors: colors.to_vec(),
                issued: 0,
            }))
        }
    }

    impl PieceFactory for ScriptedFactory {
        fn create(&mut self, color: Color) -> Piece {
            self.issued += 1;
            Piece::new(PieceId::new(self.issued), color)
        }

        fn create_random(&mut self, _rng: &mut SessionRng) -> Piece {
            let color = self.colors[self.issued as usize % self.colors.len()];
            self.create(color)
        }
    }

    fn empty_board_settings() -> BubbleSettings {
        BubbleSettings {
            initial_rows: 0,
            ..BubbleSettings::default()
        }
    }

    fn scripted(settings: BubbleSettings, colors: &[Color]) -> BubbleGameState {
        BubbleGameState::create(settings, 1, ScriptedFactory::boxed(colors)).unwrap()
    }

    #[test]
    fn test_create_fills_initial_rows_and_queue() {
        let state = BubbleGameState::with_seed(BubbleSettings::default(), 42).unwrap();

        assert_eq!(state.status(), GameStatus::InProgress);
        assert!(state.board().occupied().all(|(pos, _)| pos.row < 4));
        assert!(state.current_piece().is_some());
        assert!(state.next_piece().is_some());
        assert_ne!(state.current_piece(), state.next_piece());
        assert_eq!(state.seed(), 42);
    }

    #[test]
    fn test_create_rejects_invalid_settings() {
        let settings = BubbleSettings {
            board: BoardSettings {
                rows: 1,
                ..BoardSettings::default()
            },
            initial_rows: 1,
            ..BubbleSettings::default()
        };

        assert!(BubbleGameState::with_seed(settings, 1).is_err());
    }

    #[test]
    fn test_missing_factory_leaves_board_empty() {
        let mut state = BubbleGameState::create(BubbleSettings::default(), 1, None).unwrap();

        assert!(state.board().check_win());
        assert!(state.current_piece().is_none());
        assert!(state.attach_current(Position::new(0, 0)).is_err());
        assert_eq!(state.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_same_seed_same_match() {
        let a = BubbleGameState::with_seed(BubbleSettings::default(), 9).unwrap();
        let b = BubbleGameState::with_seed(BubbleSettings::default(), 9).unwrap();

        let a_cells: Vec<_> = a.board().occupied().collect();
        let b_cells: Vec<_> = b.board().occupied().collect();
        assert_eq!(a_cells, b_cells);
        assert_eq!(a.current_piece(), b.current_piece());
        assert_eq!(a.next_piece(), b.next_piece());
    }

    #[test]
    fn test_attach_advances_queue() {
        let mut state = scripted(empty_board_settings(), &[Color::Red, Color::Blue, Color::Green]);
        let next = state.next_piece();

        let events = state.attach_current(Position::new(0, 0)).unwrap();

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            GameEvent::PieceAttached { piece, .. } if piece.color == Color::Red
        ));
        assert_eq!(state.current_piece(), next);
        assert_eq!(state.next_piece().map(|p| p.color), Some(Color::Green));
        assert_eq!(state.shots_fired(), 1);
    }

    #[test]
    fn test_attach_rejects_bad_cells() {
        let mut state = scripted(empty_board_settings(), &[Color::Red, Color::Blue]);
        state.attach_current(Position::new(0, 0)).unwrap();

        assert!(state.attach_current(Position::new(0, 0)).is_err());
        assert!(state.attach_current(Position::new(1, 7)).is_err());
        assert!(state.attach_current(Position::new(11, 0)).is_err());
        assert_eq!(state.shots_fired(), 1);
        assert!(state.current_piece().is_some());
    }

    #[test]
    fn test_attach_rejects_cells_above_anchor() {
        let settings = BubbleSettings {
            shift_interval_ms: 100,
            shift_warning_ms: 0,
            ..empty_board_settings()
        };
        let mut state = scripted(settings, &[Color::Red]);

        state.update(Duration::from_millis(100));

        assert_eq!(state.board().anchor_row(), 1);
        assert!(state.attach_current(Position::new(0, 0)).is_err());
        assert!(state.attach_current(Position::new(1, 0)).is_ok());
    }

    #[test]
    fn test_match_scores_and_defers_win() {
        let mut state = scripted(empty_board_settings(), &[Color::Red]);
        state.attach_current(Position::new(0, 0)).unwrap();
        state.attach_current(Position::new(0, 1)).unwrap();

        let events = state.attach_current(Position::new(0, 2)).unwrap();

        let matched = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PieceRemoved(r) if r.reason == RemovalReason::Matched))
            .count();
        assert_eq!(matched, 3);
        assert!(events.contains(&GameEvent::ScoreAdded {
            matched: 3,
            floating: 0,
            points: 30,
            total: 30,
        }));
        assert_eq!(state.score(), 30);
        assert!(state.is_win_pending());
        assert_eq!(state.status(), GameStatus::InProgress);

        assert!(state.update(Duration::from_millis(500)).is_empty());
        let events = state.update(Duration::from_millis(600));

        assert_eq!(
            events,
            vec![GameEvent::GameOver {
                reason: GameOverReason::BoardCleared
            }]
        );
        assert_eq!(state.status(), GameStatus::Won);
        assert_eq!(state.game_over_reason(), Some(GameOverReason::BoardCleared));
    }

    #[test]
    fn test_zero_win_delay_wins_immediately() {
        let settings = BubbleSettings {
            win_delay_ms: 0,
            ..empty_board_settings()
        };
        let mut state = scripted(settings, &[Color::Blue]);
        state.attach_current(Position::new(0, 3)).unwrap();
        state.attach_current(Position::new(0, 4)).unwrap();

        let events = state.attach_current(Position::new(1, 3)).unwrap();

        assert_eq!(
            events.last(),
            Some(&GameEvent::GameOver {
                reason: GameOverReason::BoardCleared
            })
        );
        assert_eq!(state.status(), GameStatus::Won);
        assert!(state.attach_current(Position::new(0, 0)).is_err());
    }

    #[test]
    fn test_shift_warning_then_shift() {
        let settings = BubbleSettings {
            shift_interval_ms: 1000,
            shift_warning_ms: 200,
            ..BubbleSettings::default()
        };
        let mut state = BubbleGameState::with_seed(settings, 5).unwrap();
        let before: Vec<_> = state.board().occupied().collect();

        assert!(state.update(Duration::from_millis(999)).is_empty());
        assert_eq!(
            state.update(Duration::from_millis(1)),
            vec![GameEvent::ShiftWarning {
                delay: Duration::from_millis(200)
            }]
        );
        assert!(state.is_shift_pending());
        assert!(state.update(Duration::from_millis(199)).is_empty());

        let events = state.update(Duration::from_millis(1));

        assert_eq!(
            events,
            vec![GameEvent::BoardShifted {
                anchor_row: 1,
                discarded: 0
            }]
        );
        assert_eq!(state.shifts(), 1);
        let after: Vec<_> = state.board().occupied().collect();
        assert_eq!(before.len(), after.len());
        for ((old_pos, old_piece), (new_pos, new_piece)) in before.iter().zip(after.iter()) {
            assert_eq!(new_pos.row, old_pos.row + 1);
            assert_eq!(new_pos.col, old_pos.col);
            assert_eq!(old_piece, new_piece);
        }
    }

    #[test]
    fn test_every_interval_shifts_when_warning_outlasts_interval() {
        let settings = BubbleSettings {
            shift_interval_ms: 100,
            shift_warning_ms: 150,
            ..empty_board_settings()
        };
        let mut state = scripted(settings, &[Color::Red]);
        let mut warnings = 0;

        for _ in 0..100 {
            warnings += state
                .update(Duration::from_millis(10))
                .iter()
                .filter(|e| matches!(e, GameEvent::ShiftWarning { .. }))
                .count();
        }

        assert_eq!(warnings, 10);
        assert_eq!(state.shifts(), 8);
        assert!(state.is_shift_pending());

        for _ in 0..15 {
            state.update(Duration::from_millis(10));
        }

        assert_eq!(state.shifts(), 10);
        assert_eq!(state.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_shift_into_last_row_loses() {
        let settings = BubbleSettings {
            board: BoardSettings {
                rows: 3,
                ..BoardSettings::default()
            },
            initial_rows: 2,
            spawn_chance: 1.0,
            shift_interval_ms: 100,
            shift_warning_ms: 0,
            ..BubbleSettings::default()
        };
        let mut state = BubbleGameState::with_seed(settings, 5).unwrap();

        let events = state.update(Duration::from_millis(100));

        assert_eq!(
            events.last(),
            Some(&GameEvent::GameOver {
                reason: GameOverReason::BoardOverflow
            })
        );
        assert_eq!(state.status(), GameStatus::Lost);
        assert!(state.update(Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn test_attach_in_last_row_loses_without_match() {
        let settings = BubbleSettings {
            board: BoardSettings {
                rows: 3,
                ..BoardSettings::default()
            },
            ..empty_board_settings()
        };
        let mut state = scripted(settings, &[Color::Yellow, Color::Purple]);

        let events = state.attach_current(Position::new(2, 5)).unwrap();

        assert_eq!(
            events.last(),
            Some(&GameEvent::GameOver {
                reason: GameOverReason::BoardOverflow
            })
        );
        assert_eq!(state.status(), GameStatus::Lost);
        assert!(state.current_piece().is_none());
    }
}
