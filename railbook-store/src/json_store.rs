use crate::records::TrainRecord;
use async_trait::async_trait;
use railbook_core::{RestoredState, SnapshotStore, StoreError, Ticket, Train};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const TRAINS_FILE: &str = "trains.json";
const TICKETS_FILE: &str = "tickets.json";

/// JSON-file snapshot store.
///
/// Each logical record (train catalog, ticket ledger) lives in its own file
/// under `data_dir`. Writes go to a sibling temp file, fsync, then atomic
/// rename, so no reader ever observes a half-written snapshot.
pub struct JsonSnapshotStore {
    trains_path: PathBuf,
    tickets_path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            trains_path: data_dir.join(TRAINS_FILE),
            tickets_path: data_dir.join(TICKETS_FILE),
        }
    }

    async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp, path).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "snapshot record written");
        Ok(())
    }

    async fn write_records(
        &self,
        trains: &[TrainRecord],
        tickets: &[Ticket],
    ) -> Result<(), StoreError> {
        let train_bytes = serde_json::to_vec_pretty(trains)
            .map_err(|e| StoreError::CorruptState(format!("encoding trains: {}", e)))?;
        let ticket_bytes = serde_json::to_vec_pretty(tickets)
            .map_err(|e| StoreError::CorruptState(format!("encoding tickets: {}", e)))?;

        Self::write_atomic(&self.trains_path, &train_bytes).await?;
        Self::write_atomic(&self.tickets_path, &ticket_bytes).await?;
        Ok(())
    }

    /// Read a record file; a missing file yields `None` so the caller can
    /// seed an initial empty snapshot.
    async fn read_record<T: serde::de::DeserializeOwned>(
        path: &Path,
    ) -> Result<Option<T>, StoreError> {
        match fs::read(path).await {
            Ok(bytes) => {
                let value = serde_json::from_slice(&bytes).map_err(|e| {
                    StoreError::CorruptState(format!("{}: {}", path.display(), e))
                })?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SnapshotStore for JsonSnapshotStore {
    async fn snapshot(&self, trains: &[&Train], tickets: &[Ticket]) -> Result<(), StoreError> {
        let records: Vec<TrainRecord> = trains.iter().map(|t| TrainRecord::from(*t)).collect();
        self.write_records(&records, tickets).await
    }

    async fn restore(&self) -> Result<RestoredState, StoreError> {
        let train_records: Option<Vec<TrainRecord>> = Self::read_record(&self.trains_path).await?;
        let tickets: Option<Vec<Ticket>> = Self::read_record(&self.tickets_path).await?;

        let seed_needed = train_records.is_none() || tickets.is_none();
        let train_records = train_records.unwrap_or_default();
        let tickets = tickets.unwrap_or_default();

        if seed_needed {
            info!(
                trains = %self.trains_path.display(),
                tickets = %self.tickets_path.display(),
                "no previous snapshot, writing initial state"
            );
            self.write_records(&train_records, &tickets).await?;
        }

        let trains = train_records
            .into_iter()
            .map(TrainRecord::into_train)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RestoredState { trains, tickets })
    }
}
