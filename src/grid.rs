use crate::constants::*;
use crate::error::SolverError;
use crate::location::*;
use bitflags::*;

bitflags! {
    /// Classification of one tile, derived from the raw tile id and the
    /// monster/treasure tables.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TileFlags: u8 {
        const NONE = 0;
        const WALL = 1;
        const MONSTER = 2;
        const TREASURE = 4;
    }
}

impl TileFlags {
    /// Walkable means a region tile: neither wall nor monster.
    #[inline]
    pub fn is_walkable(self) -> bool {
        !self.intersects(TileFlags::WALL | TileFlags::MONSTER)
    }
}

/// A rectangular tile grid stored as a flat row-major buffer.
#[derive(Clone)]
pub struct TileGrid {
    rows: usize,
    cols: usize,
    buffer: Vec<i16>,
}

impl TileGrid {
    /// Build a grid from nested rows, rejecting empty, ragged, or
    /// oversized input.
    pub fn from_rows(rows: &[Vec<i16>]) -> Result<TileGrid, SolverError> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(SolverError::InvalidGrid("grid has no tiles".into()));
        }
        let cols = rows[0].len();
        if rows.len() > MAX_GRID_DIM || cols > MAX_GRID_DIM {
            return Err(SolverError::InvalidGrid(format!(
                "{}x{} exceeds the {}x{} limit",
                rows.len(),
                cols,
                MAX_GRID_DIM,
                MAX_GRID_DIM
            )));
        }
        let mut buffer = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(SolverError::InvalidGrid("rows have uneven lengths".into()));
            }
            buffer.extend_from_slice(row);
        }
        Ok(TileGrid {
            rows: rows.len(),
            cols,
            buffer,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, pos: Location) -> i16 {
        self.get_xy(pos.x(), pos.y())
    }

    #[inline]
    pub fn get_xy(&self, x: u8, y: u8) -> i16 {
        self.buffer[x as usize * self.cols + y as usize]
    }

    pub fn in_bounds(&self, pos: Location) -> bool {
        (pos.x() as usize) < self.rows && (pos.y() as usize) < self.cols
    }

    pub fn is_wall(&self, pos: Location) -> bool {
        self.get(pos) == TILE_WALL
    }

    /// A copy of the grid with one tile replaced. Used by the driver to
    /// knock out wall candidates.
    pub fn with_tile(&self, pos: Location, value: i16) -> TileGrid {
        let mut grid = self.clone();
        grid.buffer[pos.x() as usize * self.cols + pos.y() as usize] = value;
        grid
    }

    pub fn positions(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.rows).flat_map(move |x| (0..self.cols).map(move |y| Location::from_coords(x as u32, y as u32)))
    }
}

/// A grid-sized scratch array for flood fills and region maps.
#[derive(Clone)]
pub struct GridArray<T: Copy> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy> GridArray<T> {
    pub fn new(rows: usize, cols: usize, initial: T) -> Self {
        GridArray {
            rows,
            cols,
            data: vec![initial; rows * cols],
        }
    }

    #[inline]
    pub fn get(&self, pos: Location) -> T {
        self.data[pos.x() as usize * self.cols + pos.y() as usize]
    }

    #[inline]
    pub fn set(&mut self, pos: Location, value: T) {
        self.data[pos.x() as usize * self.cols + pos.y() as usize] = value;
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }
}

/// Neighbor offsets for 4-directional (cardinal) movement.
pub const NEIGHBORS_4: [(i8, i8); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];
