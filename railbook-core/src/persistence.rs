use crate::ticket::Ticket;
use crate::train::Train;
use async_trait::async_trait;

/// State reconstructed from the last durable snapshot
pub struct RestoredState {
    pub trains: Vec<Train>,
    pub tickets: Vec<Ticket>,
}

/// Durable snapshot/restore of the train catalog and ticket ledger.
///
/// Implementations must make `snapshot` crash-safe: a reader (including a
/// later `restore`) never observes a partially-written record. The engine
/// bounds each call with its own timeout, so implementations need not.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Write a complete, self-consistent view of both logical records
    async fn snapshot(&self, trains: &[&Train], tickets: &[Ticket]) -> Result<(), StoreError>;

    /// Reconstruct state at startup. Missing backing files yield empty state
    /// (after writing an initial empty snapshot); corrupt files are an error,
    /// never silently discarded.
    async fn restore(&self) -> Result<RestoredState, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("persisted state is corrupt: {0}")]
    CorruptState(String),
}
