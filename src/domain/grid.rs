/// TileGrid: the static terrain of a level.
///
/// ## Lifecycle
///
///   1. `build()` parses text rows through a `Legend`.
///      Terrain symbols become `Tile::Solid`, entity symbols become
///      `Tile::Spawn` and are reported back as `SpawnMarker`s.
///   2. The level loader instantiates each spawn, hands it to its owner,
///      then calls `clear_cell()` on the marker.
///   3. From then on the grid holds terrain only. `clear_cell()` is the
///      sole mutator and nothing calls it after setup.
///
/// ## Coordinates
///
/// Cells are addressed `(row, col)`, zero-indexed. Cell `(r, c)` covers
/// world pixels `[c * cell.width, (c + 1) * cell.width)` horizontally and
/// `[r * cell.height, (r + 1) * cell.height)` vertically.
/// Anything outside the grid is open space.

use std::collections::HashMap;

use super::entity::EntityKind;
use super::tile::Tile;
use crate::error::GridError;

/// What a legend symbol stands for.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SymbolKind {
    Terrain(String),
    Entity(EntityKind),
}

/// Symbol → kind mapping consumed by `TileGrid::build`.
#[derive(Clone, Debug, Default)]
pub struct Legend {
    symbols: HashMap<char, SymbolKind>,
}

impl Legend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terrain(mut self, symbol: char, name: &str) -> Self {
        self.insert(symbol, SymbolKind::Terrain(name.to_string()));
        self
    }

    pub fn entity(mut self, symbol: char, kind: EntityKind) -> Self {
        self.insert(symbol, SymbolKind::Entity(kind));
        self
    }

    pub fn insert(&mut self, symbol: char, kind: SymbolKind) {
        self.symbols.insert(symbol, kind);
    }

    pub fn get(&self, symbol: char) -> Option<&SymbolKind> {
        self.symbols.get(&symbol)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CellSize {
    pub width: f64,
    pub height: f64,
}

/// World-pixel rectangle.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A spawn cell found during `build`, queued for extraction.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SpawnMarker {
    pub kind: EntityKind,
    pub row: usize,
    pub col: usize,
    /// Pixel center of the cell.
    pub center_x: f64,
    pub center_y: f64,
}

impl SpawnMarker {
    /// Top-left position that centers a `width` x `height` body on the cell.
    pub fn position_for(&self, width: f64, height: f64) -> (f64, f64) {
        (self.center_x - width / 2.0, self.center_y - height / 2.0)
    }
}

#[derive(Clone, Debug)]
pub struct TileGrid {
    cells: Vec<Vec<Tile>>,
    rows: usize,
    cols: usize,
    cell: CellSize,
}

// ── Construction ──

impl TileGrid {
    /// Parse `rows` into a grid. Whitespace is empty; every other character
    /// must be in `legend`. Rows must all be the same length.
    pub fn build<S: AsRef<str>>(
        rows: &[S],
        legend: &Legend,
        cell: CellSize,
    ) -> Result<(TileGrid, Vec<SpawnMarker>), GridError> {
        let first = rows.first().ok_or(GridError::NoRows)?;
        let cols = first.as_ref().chars().count();

        let mut cells = Vec::with_capacity(rows.len());
        let mut spawns = vec![];

        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let actual = line.chars().count();
            if actual != cols {
                return Err(GridError::RaggedRow { row, expected: cols, actual });
            }

            let mut out = Vec::with_capacity(cols);
            for (col, ch) in line.chars().enumerate() {
                if ch.is_whitespace() {
                    out.push(Tile::Empty);
                    continue;
                }
                match legend.get(ch) {
                    Some(SymbolKind::Terrain(name)) => out.push(Tile::Solid(name.clone())),
                    Some(SymbolKind::Entity(kind)) => {
                        out.push(Tile::Spawn(*kind));
                        spawns.push(SpawnMarker {
                            kind: *kind,
                            row,
                            col,
                            center_x: (col as f64 + 0.5) * cell.width,
                            center_y: (row as f64 + 0.5) * cell.height,
                        });
                    }
                    None => return Err(GridError::UnmappedSymbol { symbol: ch, row, col }),
                }
            }
            cells.push(out);
        }

        let grid = TileGrid { cells, rows: rows.len(), cols, cell };
        Ok((grid, spawns))
    }
}

// ── Queries ──

impl TileGrid {
    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }
    pub fn cell_size(&self) -> CellSize { self.cell }

    pub fn pixel_width(&self) -> f64 {
        self.cols as f64 * self.cell.width
    }

    pub fn pixel_height(&self) -> f64 {
        self.rows as f64 * self.cell.height
    }

    fn check(&self, row: usize, col: usize) -> Result<(), GridError> {
        if row < self.rows && col < self.cols {
            Ok(())
        } else {
            Err(GridError::OutOfRange { row, col, rows: self.rows, cols: self.cols })
        }
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Result<&Tile, GridError> {
        self.check(row, col)?;
        Ok(&self.cells[row][col])
    }

    /// Solid terrain at `(row, col)`. Cells outside the grid are open space.
    #[inline]
    pub fn is_solid(&self, row: usize, col: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .map_or(false, Tile::is_solid)
    }

    pub fn cell_bounds(&self, row: usize, col: usize) -> Result<Rect, GridError> {
        self.check(row, col)?;
        Ok(Rect {
            x: col as f64 * self.cell.width,
            y: row as f64 * self.cell.height,
            width: self.cell.width,
            height: self.cell.height,
        })
    }

    /// Lazy row-major traversal of `(tile, row, col)`. Restartable.
    pub fn cells(&self) -> impl Iterator<Item = (&Tile, usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, line)| {
            line.iter().enumerate().map(move |(col, tile)| (tile, row, col))
        })
    }

    pub fn for_each<F: FnMut(&Tile, usize, usize)>(&self, mut visitor: F) {
        for (tile, row, col) in self.cells() {
            visitor(tile, row, col);
        }
    }
}

// ── Mutation ──

impl TileGrid {
    /// Reset a cell to empty. Used once per spawn marker during level setup.
    pub fn clear_cell(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        self.check(row, col)?;
        self.cells[row][col] = Tile::Empty;
        Ok(())
    }
}
