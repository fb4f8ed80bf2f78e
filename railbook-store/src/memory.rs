use crate::records::TrainRecord;
use async_trait::async_trait;
use railbook_core::{RestoredState, SnapshotStore, StoreError, Ticket, Train};
use std::sync::Mutex;

/// In-memory snapshot store for tests and embedded use.
///
/// Holds the same record layout the JSON store writes, so restore exercises
/// the identical record -> domain conversion path.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<(Vec<TrainRecord>, Vec<Ticket>)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tickets in the last snapshot
    pub fn ticket_count(&self) -> usize {
        self.state.lock().expect("memory store poisoned").1.len()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn snapshot(&self, trains: &[&Train], tickets: &[Ticket]) -> Result<(), StoreError> {
        let records: Vec<TrainRecord> = trains.iter().map(|t| TrainRecord::from(*t)).collect();
        let mut state = self.state.lock().expect("memory store poisoned");
        *state = (records, tickets.to_vec());
        Ok(())
    }

    async fn restore(&self) -> Result<RestoredState, StoreError> {
        let (records, tickets) = {
            let state = self.state.lock().expect("memory store poisoned");
            state.clone()
        };
        let trains = records
            .into_iter()
            .map(TrainRecord::into_train)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RestoredState { trains, tickets })
    }
}
