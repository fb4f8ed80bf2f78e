use crate::grid::SeatGrid;
use chrono::NaiveTime;
use std::collections::HashMap;

/// One train in the catalog.
///
/// Identity and route are immutable reference data supplied by the catalog
/// loader at startup; only the seat grid mutates, and only through
/// `SeatGrid`'s claim/release operations.
#[derive(Debug)]
pub struct Train {
    pub train_id: String,
    pub train_number: String,
    /// Ordered station codes, order = travel direction
    pub stations: Vec<String>,
    pub station_times: HashMap<String, NaiveTime>,
    pub grid: SeatGrid,
}

impl Train {
    pub fn new(
        train_id: impl Into<String>,
        train_number: impl Into<String>,
        stations: Vec<String>,
        station_times: HashMap<String, NaiveTime>,
        grid: SeatGrid,
    ) -> Self {
        Self {
            train_id: train_id.into(),
            train_number: train_number.into(),
            stations,
            station_times,
            grid,
        }
    }

    /// Position of a station in the travel order, case-insensitive
    pub fn station_index(&self, station: &str) -> Option<usize> {
        self.stations.iter().position(|s| s.eq_ignore_ascii_case(station))
    }

    /// A train serves source -> destination iff both stations appear in its
    /// route and source strictly precedes destination. Same-station and
    /// reversed trips are invalid.
    pub fn serves_route(&self, source: &str, destination: &str) -> bool {
        match (self.station_index(source), self.station_index(destination)) {
            (Some(src), Some(dst)) => src < dst,
            _ => false,
        }
    }
}
