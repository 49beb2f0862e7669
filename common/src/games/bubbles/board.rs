use std::collections::VecDeque;

use crate::games::SessionRng;
use crate::log_debug;

use super::geometry::{GridShape, RowWidth};
use super::piece_factory::PieceFactory;
use super::settings::BoardSettings;
use super::types::{Piece, PieceRemoved, Position, RemovalReason};

/// Receives every piece the board takes off the grid.
pub trait RemovalObserver {
    fn on_removed(&mut self, removal: PieceRemoved);
}

impl RemovalObserver for Vec<PieceRemoved> {
    fn on_removed(&mut self, removal: PieceRemoved) {
        self.push(removal);
    }
}

/// Drops removed pieces outright, with no fall-out notification.
pub struct DiscardRemovals;

impl RemovalObserver for DiscardRemovals {
    fn on_removed(&mut self, _removal: PieceRemoved) {}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MatchOutcome {
    pub matched: usize,
    pub floating: usize,
}

#[derive(Clone, Debug)]
pub struct Board {
    rows: VecDeque<Vec<Option<Piece>>>,
    wide_columns: usize,
    min_match_size: usize,
    anchor_row: usize,
}

impl Board {
    pub fn new(settings: &BoardSettings) -> Self {
        let rows = (0..settings.rows)
            .map(|row| vec![None; RowWidth::for_parity(row).column_count(settings.wide_columns)])
            .collect();

        Self {
            rows,
            wide_columns: settings.wide_columns,
            min_match_size: settings.min_match_size,
            anchor_row: 0,
        }
    }

    /// Rows are given top to bottom, one character per cell: a color symbol or `.`.
    #[cfg(test)]
    pub(crate) fn from_layout(settings: &BoardSettings, layout: &[&str]) -> Self {
        use super::types::{Color, PieceId};

        let mut board = Self::new(settings);
        let mut next_id = 0;
        for (row, line) in layout.iter().enumerate() {
            assert_eq!(
                line.chars().count(),
                board.column_count(row),
                "row {} has the wrong width",
                row
            );
            for (col, symbol) in line.chars().enumerate() {
                if let Some(color) = Color::from_symbol(symbol) {
                    next_id += 1;
                    board.set(
                        Position::new(row, col),
                        Some(Piece::new(PieceId::new(next_id), color)),
                    );
                }
            }
        }
        board
    }

    pub fn wide_columns(&self) -> usize {
        self.wide_columns
    }

    /// Row that seeds reachability. It moves down with the content on every shift.
    pub fn anchor_row(&self) -> usize {
        self.anchor_row
    }

    pub fn get(&self, pos: Position) -> Option<Piece> {
        self.rows.get(pos.row)?.get(pos.col).copied().flatten()
    }

    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        if let Some(cell) = self
            .rows
            .get_mut(pos.row)
            .and_then(|row| row.get_mut(pos.col))
        {
            *cell = piece;
        }
    }

    pub fn is_empty_cell(&self, pos: Position) -> bool {
        self.is_inside(pos) && self.get(pos).is_none()
    }

    pub fn row(&self, row: usize) -> Option<&[Option<Piece>]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn occupied(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.map(|piece| (Position::new(row, col), piece)))
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.rows.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    /// Empty cells a moving piece could stick to: on the anchor row, or below
    /// it and touching an occupied cell.
    pub fn attachable_cells(&self) -> Vec<Position> {
        self.positions()
            .into_iter()
            .filter(|&pos| pos.row >= self.anchor_row && self.get(pos).is_none())
            .filter(|&pos| {
                pos.row == self.anchor_row
                    || self.neighbors(pos).into_iter().any(|n| self.get(n).is_some())
            })
            .collect()
    }

    fn visited_grid(&self) -> Vec<Vec<bool>> {
        self.rows.iter().map(|row| vec![false; row.len()]).collect()
    }

    /// Breadth-first order, starting with `start`. Empty when `start` holds no piece.
    pub fn same_color_group(&self, start: Position) -> Vec<Position> {
        let Some(start_piece) = self.get(start) else {
            return Vec::new();
        };

        let mut visited = self.visited_grid();
        let mut queue = VecDeque::new();
        let mut group = Vec::new();

        visited[start.row][start.col] = true;
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            group.push(pos);

            for neighbor in self.neighbors(pos) {
                if visited[neighbor.row][neighbor.col] {
                    continue;
                }
                if self
                    .get(neighbor)
                    .is_some_and(|piece| piece.color == start_piece.color)
                {
                    visited[neighbor.row][neighbor.col] = true;
                    queue.push_back(neighbor);
                }
            }
        }

        group
    }

    pub fn remove_cells<O>(
        &mut self,
        positions: &[Position],
        reason: RemovalReason,
        observer: &mut O,
    ) -> usize
    where
        O: RemovalObserver + ?Sized,
    {
        let mut removed = 0;
        for &position in positions {
            let Some(piece) = self.get(position) else {
                continue;
            };
            self.set(position, None);
            observer.on_removed(PieceRemoved {
                position,
                piece,
                reason,
            });
            removed += 1;
        }
        removed
    }

    /// Removes the same-color group at `start` when it reaches the minimum
    /// match size, then prunes whatever lost its connection to the anchor.
    pub fn resolve_match<O>(&mut self, start: Position, observer: &mut O) -> MatchOutcome
    where
        O: RemovalObserver + ?Sized,
    {
        let group = self.same_color_group(start);
        log_debug!("Group at {} has {} piece(s)", start, group.len());

        if group.is_empty() || group.len() < self.min_match_size {
            return MatchOutcome::default();
        }

        let matched = self.remove_cells(&group, RemovalReason::Matched, observer);
        let floating = self.prune_floating(observer);

        MatchOutcome { matched, floating }
    }

    /// Multi-source BFS from every occupied anchor cell; occupied cells it
    /// never reaches are removed as detached.
    pub fn prune_floating<O>(&mut self, observer: &mut O) -> usize
    where
        O: RemovalObserver + ?Sized,
    {
        let mut visited = self.visited_grid();
        let mut queue = VecDeque::new();

        if let Some(anchor) = self.rows.get(self.anchor_row) {
            for (col, cell) in anchor.iter().enumerate() {
                if cell.is_some() {
                    visited[self.anchor_row][col] = true;
                    queue.push_back(Position::new(self.anchor_row, col));
                }
            }
        }

        while let Some(pos) = queue.pop_front() {
            for neighbor in self.neighbors(pos) {
                if !visited[neighbor.row][neighbor.col] && self.get(neighbor).is_some() {
                    visited[neighbor.row][neighbor.col] = true;
                    queue.push_back(neighbor);
                }
            }
        }

        let floating: Vec<Position> = self
            .occupied()
            .map(|(pos, _)| pos)
            .filter(|pos| !visited[pos.row][pos.col])
            .collect();

        let removed = self.remove_cells(&floating, RemovalReason::Detached, observer);
        if removed > 0 {
            log_debug!("Pruned {} floating piece(s)", removed);
        }
        removed
    }

    /// Moves every row down by one, evicting the last row, and opens an empty
    /// top row of the width opposite to the previous top row. Returns the
    /// number of pieces evicted.
    pub fn shift_down(&mut self) -> usize {
        let previous_top = self.row_width(0).unwrap_or(RowWidth::Wide);

        let discarded = self
            .rows
            .pop_back()
            .map_or(0, |row| row.iter().flatten().count());

        self.rows.push_front(vec![
            None;
            previous_top.opposite().column_count(self.wide_columns)
        ]);
        self.anchor_row = (self.anchor_row + 1).min(self.rows.len().saturating_sub(1));

        log_debug!(
            "Board shifted down, anchor row {}, {} piece(s) evicted",
            self.anchor_row,
            discarded
        );
        discarded
    }

    pub fn check_game_over(&self) -> bool {
        self.rows
            .back()
            .is_some_and(|row| row.iter().any(Option::is_some))
    }

    pub fn check_win(&self) -> bool {
        self.rows.iter().flatten().all(Option::is_none)
    }

    /// Fills the top `initial_rows` rows at random and drops anything left
    /// unsupported. Returns the number of pieces on the board afterwards.
    pub fn initialize_random<F>(
        &mut self,
        initial_rows: usize,
        spawn_chance: f64,
        factory: &mut F,
        rng: &mut SessionRng,
    ) -> usize
    where
        F: PieceFactory + ?Sized,
    {
        let max_row = initial_rows.min(self.row_count());

        for row in 0..max_row {
            for col in 0..self.column_count(row) {
                if rng.chance(spawn_chance) {
                    let piece = factory.create_random(rng);
                    self.set(Position::new(row, col), Some(piece));
                }
            }
        }

        let dropped = self.prune_floating(&mut DiscardRemovals);
        let placed = self.occupied_count();
        log_debug!(
            "Initialized {} row(s): {} piece(s) placed, {} unsupported dropped",
            max_row,
            placed,
            dropped
        );
        placed
    }
}

impl GridShape for Board {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    fn row_width(&self, row: usize) -> Option<RowWidth> {
        let row = self.rows.get(row)?;
        Some(if row.len() == self.wide_columns {
            RowWidth::Wide
        } else {
            RowWidth::Narrow
        })
    }
}
