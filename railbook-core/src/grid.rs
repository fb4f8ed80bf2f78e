use std::sync::atomic::{AtomicU8, Ordering};

const CELL_AVAILABLE: u8 = 0;
const CELL_BOOKED: u8 = 1;

/// State of a single seat cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatState {
    Available,
    Booked,
}

/// Fixed-size seat map for one train.
///
/// Cells are atomics so claims use compare-and-set and readers (seat-map
/// display, snapshots) never need the train's booking lock.
pub struct SeatGrid {
    rows: usize,
    cols: usize,
    cells: Vec<AtomicU8>,
}

impl SeatGrid {
    /// Create a grid with every seat available
    pub fn new(rows: usize, cols: usize) -> Self {
        let cells = (0..rows * cols).map(|_| AtomicU8::new(CELL_AVAILABLE)).collect();
        Self { rows, cols, cells }
    }

    /// Rebuild a grid from a 0/1 matrix (the persisted layout).
    /// Rejects ragged rows and cell values other than 0 or 1.
    pub fn from_cells(cells: &[Vec<u8>]) -> Result<Self, GridError> {
        let rows = cells.len();
        let cols = cells.first().map(|r| r.len()).unwrap_or(0);

        let mut flat = Vec::with_capacity(rows * cols);
        for row in cells {
            if row.len() != cols {
                return Err(GridError::MalformedGrid(format!(
                    "ragged row: expected {} columns, found {}",
                    cols,
                    row.len()
                )));
            }
            for &cell in row {
                if cell != CELL_AVAILABLE && cell != CELL_BOOKED {
                    return Err(GridError::MalformedGrid(format!("invalid cell value {}", cell)));
                }
                flat.push(AtomicU8::new(cell));
            }
        }

        Ok(Self { rows, cols, cells: flat })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_valid_coordinate(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Attempt the Available -> Booked transition.
    ///
    /// Returns `Ok(true)` on success, `Ok(false)` if the seat was already
    /// booked. A lost claim is a normal outcome, not an error.
    pub fn try_claim(&self, row: usize, col: usize) -> Result<bool, GridError> {
        let cell = self.cell(row, col)?;
        Ok(cell
            .compare_exchange(CELL_AVAILABLE, CELL_BOOKED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok())
    }

    /// Booked -> Available. Idempotent: releasing an available seat is a no-op.
    pub fn release(&self, row: usize, col: usize) -> Result<(), GridError> {
        let cell = self.cell(row, col)?;
        cell.store(CELL_AVAILABLE, Ordering::Release);
        Ok(())
    }

    pub fn state(&self, row: usize, col: usize) -> Result<SeatState, GridError> {
        let cell = self.cell(row, col)?;
        Ok(match cell.load(Ordering::Acquire) {
            CELL_AVAILABLE => SeatState::Available,
            _ => SeatState::Booked,
        })
    }

    /// Dump the grid as a 0/1 matrix for persistence or display
    pub fn to_cells(&self) -> Vec<Vec<u8>> {
        (0..self.rows)
            .map(|r| {
                (0..self.cols)
                    .map(|c| self.cells[r * self.cols + c].load(Ordering::Acquire))
                    .collect()
            })
            .collect()
    }

    /// Coordinates of every booked seat, row-major order
    pub fn booked_seats(&self) -> Vec<(usize, usize)> {
        let mut booked = Vec::new();
        for r in 0..self.rows {
            for c in 0..self.cols {
                if self.cells[r * self.cols + c].load(Ordering::Acquire) == CELL_BOOKED {
                    booked.push((r, c));
                }
            }
        }
        booked
    }

    fn cell(&self, row: usize, col: usize) -> Result<&AtomicU8, GridError> {
        if !self.is_valid_coordinate(row, col) {
            return Err(GridError::InvalidCoordinate { row, col });
        }
        Ok(&self.cells[row * self.cols + col])
    }
}

impl std::fmt::Debug for SeatGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeatGrid")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("booked", &self.booked_seats().len())
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("seat coordinate out of bounds: ({row}, {col})")]
    InvalidCoordinate { row: usize, col: usize },

    #[error("malformed seat grid: {0}")]
    MalformedGrid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_then_reclaim_fails() {
        let grid = SeatGrid::new(5, 6);

        assert!(grid.try_claim(0, 0).unwrap());
        assert_eq!(grid.state(0, 0).unwrap(), SeatState::Booked);

        // Second claim on the same seat loses
        assert!(!grid.try_claim(0, 0).unwrap());
    }

    #[test]
    fn test_release_is_idempotent() {
        let grid = SeatGrid::new(2, 2);

        grid.try_claim(1, 1).unwrap();
        grid.release(1, 1).unwrap();
        assert_eq!(grid.state(1, 1).unwrap(), SeatState::Available);

        // Releasing an already-available seat is a no-op
        grid.release(1, 1).unwrap();
        assert_eq!(grid.state(1, 1).unwrap(), SeatState::Available);
    }

    #[test]
    fn test_out_of_bounds_is_an_error() {
        let grid = SeatGrid::new(5, 6);

        assert!(matches!(
            grid.try_claim(5, 0),
            Err(GridError::InvalidCoordinate { row: 5, col: 0 })
        ));
        assert!(matches!(grid.release(0, 6), Err(GridError::InvalidCoordinate { .. })));
        assert!(!grid.is_valid_coordinate(5, 6));
        assert!(grid.is_valid_coordinate(4, 5));
    }

    #[test]
    fn test_cells_round_trip() {
        let grid = SeatGrid::new(3, 4);
        grid.try_claim(0, 1).unwrap();
        grid.try_claim(2, 3).unwrap();

        let cells = grid.to_cells();
        assert_eq!(cells[0][1], 1);
        assert_eq!(cells[1][2], 0);

        let restored = SeatGrid::from_cells(&cells).unwrap();
        assert_eq!(restored.state(0, 1).unwrap(), SeatState::Booked);
        assert_eq!(restored.state(2, 3).unwrap(), SeatState::Booked);
        assert_eq!(restored.booked_seats(), vec![(0, 1), (2, 3)]);
    }

    #[test]
    fn test_malformed_cells_rejected() {
        assert!(matches!(
            SeatGrid::from_cells(&[vec![0, 1], vec![0]]),
            Err(GridError::MalformedGrid(_))
        ));
        assert!(matches!(
            SeatGrid::from_cells(&[vec![0, 2]]),
            Err(GridError::MalformedGrid(_))
        ));
    }
}
