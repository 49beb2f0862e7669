use bubble_common::games::bubbles::{Board, GridShape, Position, RowWidth};

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(self, other: WorldPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Maps grid cells to world space and back. Rows grow downwards along -y;
/// narrow rows are offset by half a piece.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Placement {
    origin: WorldPoint,
    diameter: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self::new(WorldPoint::default(), 1.0)
    }
}

impl Placement {
    pub fn new(origin: WorldPoint, diameter: f64) -> Self {
        Self { origin, diameter }
    }

    pub fn cell_center<G: GridShape + ?Sized>(&self, grid: &G, pos: Position) -> WorldPoint {
        let mut x = self.origin.x + pos.col as f64 * self.diameter;
        if grid.row_width(pos.row) == Some(RowWidth::Narrow) {
            x += self.diameter / 2.0;
        }
        let y = self.origin.y - pos.row as f64 * self.diameter;
        WorldPoint::new(x, y)
    }

    /// Closest empty cell at or below the anchor row; `None` when every such cell is taken.
    pub fn nearest_empty_cell(&self, board: &Board, point: WorldPoint) -> Option<Position> {
        board
            .positions()
            .into_iter()
            .filter(|&pos| pos.row >= board.anchor_row() && board.get(pos).is_none())
            .min_by(|&a, &b| {
                let da = self.cell_center(board, a).distance_squared(point);
                let db = self.cell_center(board, b).distance_squared(point);
                da.total_cmp(&db)
            })
    }
}
