use chrono::NaiveTime;
use railbook_core::{SeatGrid, StoreError, Train};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Persisted form of one train: route data plus the seat grid as a 0/1
/// matrix, matching the original localDb layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainRecord {
    pub train_id: String,
    pub train_number: String,
    pub stations: Vec<String>,
    pub station_times: HashMap<String, NaiveTime>,
    pub seats: Vec<Vec<u8>>,
}

impl TrainRecord {
    pub fn into_train(self) -> Result<Train, StoreError> {
        let grid = SeatGrid::from_cells(&self.seats).map_err(|e| {
            StoreError::CorruptState(format!("train {}: {}", self.train_id, e))
        })?;
        Ok(Train::new(
            self.train_id,
            self.train_number,
            self.stations,
            self.station_times,
            grid,
        ))
    }
}

impl From<&Train> for TrainRecord {
    fn from(train: &Train) -> Self {
        Self {
            train_id: train.train_id.clone(),
            train_number: train.train_number.clone(),
            stations: train.stations.clone(),
            station_times: train.station_times.clone(),
            seats: train.grid.to_cells(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railbook_core::SeatState;

    #[test]
    fn test_train_record_round_trip() {
        let grid = SeatGrid::new(2, 3);
        grid.try_claim(1, 2).unwrap();
        let train = Train::new(
            "T001",
            "12301",
            vec!["delhi".to_string(), "mumbai".to_string()],
            HashMap::new(),
            grid,
        );

        let record = TrainRecord::from(&train);
        assert_eq!(record.seats, vec![vec![0, 0, 0], vec![0, 0, 1]]);

        let restored = record.into_train().unwrap();
        assert_eq!(restored.train_id, "T001");
        assert_eq!(restored.grid.state(1, 2).unwrap(), SeatState::Booked);
        assert_eq!(restored.grid.state(0, 0).unwrap(), SeatState::Available);
    }

    #[test]
    fn test_malformed_grid_is_corrupt_state() {
        let record = TrainRecord {
            train_id: "T001".to_string(),
            train_number: "12301".to_string(),
            stations: vec![],
            station_times: HashMap::new(),
            seats: vec![vec![0, 7]],
        };
        assert!(matches!(record.into_train(), Err(StoreError::CorruptState(_))));
    }
}
