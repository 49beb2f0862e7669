use super::types::Position;

/// Offsets as (row, col): left, right, upper-left, upper-right, lower-left, lower-right.
const WIDE_OFFSETS: [(isize, isize); 6] = [(0, -1), (0, 1), (-1, -1), (-1, 0), (1, -1), (1, 0)];
const NARROW_OFFSETS: [(isize, isize); 6] = [(0, -1), (0, 1), (-1, 0), (-1, 1), (1, 0), (1, 1)];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RowWidth {
    Wide,
    Narrow,
}

impl RowWidth {
    pub fn for_parity(row: usize) -> Self {
        if row % 2 == 0 {
            RowWidth::Wide
        } else {
            RowWidth::Narrow
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            RowWidth::Wide => RowWidth::Narrow,
            RowWidth::Narrow => RowWidth::Wide,
        }
    }

    pub fn column_count(self, wide_columns: usize) -> usize {
        match self {
            RowWidth::Wide => wide_columns,
            RowWidth::Narrow => wide_columns.saturating_sub(1),
        }
    }

    fn neighbor_offsets(self) -> &'static [(isize, isize); 6] {
        match self {
            RowWidth::Wide => &WIDE_OFFSETS,
            RowWidth::Narrow => &NARROW_OFFSETS,
        }
    }
}

/// Staggered grid whose rows alternate between a wide and a narrow width.
pub trait GridShape {
    fn row_count(&self) -> usize;

    /// 0 for rows outside the grid.
    fn column_count(&self, row: usize) -> usize;

    fn row_width(&self, row: usize) -> Option<RowWidth>;

    fn is_inside(&self, pos: Position) -> bool {
        pos.row < self.row_count() && pos.col < self.column_count(pos.row)
    }

    /// Diagonal offsets follow the width of `pos.row`; each candidate is then
    /// checked against the width of its own row.
    fn neighbors(&self, pos: Position) -> Vec<Position> {
        let Some(width) = self.row_width(pos.row) else {
            return Vec::new();
        };

        width
            .neighbor_offsets()
            .iter()
            .filter_map(|&(d_row, d_col)| pos.offset(d_row, d_col))
            .filter(|&candidate| self.is_inside(candidate))
            .collect()
    }

    fn positions(&self) -> Vec<Position> {
        (0..self.row_count())
            .flat_map(|row| (0..self.column_count(row)).map(move |col| Position::new(row, col)))
            .collect()
    }
}

/// Row widths derived purely from parity: even rows wide, odd rows narrow.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GridGeometry {
    rows: usize,
    wide_columns: usize,
}

impl GridGeometry {
    pub fn new(rows: usize, wide_columns: usize) -> Self {
        Self { rows, wide_columns }
    }
}

impl GridShape for GridGeometry {
    fn row_count(&self) -> usize {
        self.rows
    }

    fn column_count(&self, row: usize) -> usize {
        self.row_width(row)
            .map_or(0, |width| width.column_count(self.wide_columns))
    }

    fn row_width(&self, row: usize) -> Option<RowWidth> {
        (row < self.rows).then(|| RowWidth::for_parity(row))
    }
}
