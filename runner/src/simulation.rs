use std::fmt;
use std::time::Duration;

use bubble_common::games::SessionRng;
use bubble_common::games::bubbles::{
    Board, BubbleGameState, BubbleSettings, GameEvent, GameStatus, GridShape,
};
use bubble_common::{log, log_debug, log_warn};
use ringbuffer::{AllocRingBuffer, RingBuffer};
use tokio::time::interval;

use crate::bot_controller::calculate_shot;
use crate::config::SimulationConfig;
use crate::placement::Placement;

/// Keeps the bot's choices off the match's own random stream.
const BOT_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameSummary {
    pub seed: u64,
    pub status: GameStatus,
    pub score: u32,
    pub shots: u32,
    pub shifts: u32,
    pub frames: u64,
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seed {}: {:?} with score {} after {} shot(s), {} shift(s), {} frame(s)",
            self.seed, self.status, self.score, self.shots, self.shifts, self.frames
        )
    }
}

pub struct Simulation {
    settings: BubbleSettings,
    config: SimulationConfig,
    placement: Placement,
}

impl Simulation {
    pub fn new(settings: BubbleSettings, config: SimulationConfig) -> Self {
        Self {
            settings,
            config,
            placement: Placement::default(),
        }
    }

    /// Plays one match with the configured bot until it ends or the frame
    /// limit is hit. A match cut off by the limit reports `InProgress`.
    pub async fn run_game(&self, seed: u64) -> Result<GameSummary, String> {
        let mut state = BubbleGameState::with_seed(self.settings, seed)?;
        let mut bot_rng = SessionRng::new(seed ^ BOT_SEED_SALT);
        let mut event_log: AllocRingBuffer<String> =
            AllocRingBuffer::new(self.config.event_log_size);

        let frame = self.config.frame();
        let shot_interval = self.config.shot_interval();
        let mut ticker = self.config.realtime.then(|| interval(frame));
        let mut since_shot = Duration::ZERO;
        let mut frames = 0u64;

        log!(
            "Starting game with seed {} ({} piece(s) on the board)",
            seed,
            state.board().occupied_count()
        );

        while state.status() == GameStatus::InProgress && frames < self.config.max_frames {
            match ticker.as_mut() {
                Some(ticker) => {
                    ticker.tick().await;
                }
                None => tokio::task::yield_now().await,
            }
            frames += 1;

            record_events(&mut event_log, state.update(frame));

            since_shot += frame;
            if since_shot < shot_interval || state.status() != GameStatus::InProgress {
                continue;
            }
            since_shot = Duration::ZERO;

            let Some(aim) = calculate_shot(self.config.bot, &state, &self.placement, &mut bot_rng)
            else {
                log_debug!("Bot has nothing to shoot at frame {}", frames);
                continue;
            };
            let Some(cell) = self.placement.nearest_empty_cell(state.board(), aim) else {
                log_warn!("No free cell near aim point ({:.2}, {:.2})", aim.x, aim.y);
                continue;
            };

            match state.attach_current(cell) {
                Ok(events) => record_events(&mut event_log, events),
                Err(e) => log_warn!("Shot at {} rejected: {}", cell, e),
            }
        }

        if state.status() == GameStatus::InProgress {
            log_warn!("Game with seed {} stopped after {} frame(s)", seed, frames);
        }

        for line in event_log.iter() {
            log_debug!("  {}", line);
        }
        log_debug!("Final board:\n{}", render_board(state.board()));

        Ok(GameSummary {
            seed,
            status: state.status(),
            score: state.score(),
            shots: state.shots_fired(),
            shifts: state.shifts(),
            frames,
        })
    }
}

fn record_events(event_log: &mut AllocRingBuffer<String>, events: Vec<GameEvent>) {
    for event in events {
        event_log.enqueue(describe_event(&event));
    }
}

pub fn describe_event(event: &GameEvent) -> String {
    match event {
        GameEvent::PieceAttached { position, piece } => {
            format!("{:?} piece {} attached at {}", piece.color, piece.id, position)
        }
        GameEvent::PieceRemoved(removal) => format!(
            "{:?} piece {} removed from {} ({:?})",
            removal.piece.color, removal.piece.id, removal.position, removal.reason
        ),
        GameEvent::ScoreAdded {
            matched,
            floating,
            points,
            total,
        } => format!(
            "+{} points for {} matched and {} floating, total {}",
            points, matched, floating, total
        ),
        GameEvent::ShiftWarning { delay } => {
            format!("Board shifts in {} ms", delay.as_millis())
        }
        GameEvent::BoardShifted {
            anchor_row,
            discarded,
        } => format!(
            "Board shifted, anchor row {}, {} piece(s) pushed off",
            anchor_row, discarded
        ),
        GameEvent::GameOver { reason } => format!("Game over: {:?}", reason),
    }
}

/// One line per row, narrow rows indented by one space.
pub fn render_board(board: &Board) -> String {
    (0..board.row_count())
        .map(|row| {
            let cells: Vec<String> = board
                .row(row)
                .unwrap_or_default()
                .iter()
                .map(|cell| cell.map_or('.', |piece| piece.color.symbol()).to_string())
                .collect();
            let indent = if board.column_count(row) < board.wide_columns() { " " } else { "" };
            format!("{}{}", indent, cells.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
