use railbook_core::{LedgerError, StoreError};

/// Booking failures.
///
/// Validation variants are caller mistakes and never retried here.
/// `SeatAlreadyBooked` is an expected outcome under contention, not a fault.
/// `DuplicateReservation` marks a broken invariant and is logged before it
/// surfaces. Durability variants mean the booking was fully rolled back and
/// is safe to re-attempt.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("train not found: {0}")]
    TrainNotFound(String),

    #[error("invalid seat coordinate ({row}, {col})")]
    InvalidSeat { row: usize, col: usize },

    // Field is named `origin` rather than `source` so thiserror does not
    // treat it as the error's source
    #[error("train {train_id} does not serve {origin} -> {destination}")]
    InvalidRoute {
        train_id: String,
        origin: String,
        destination: String,
    },

    #[error("seat already booked")]
    SeatAlreadyBooked,

    #[error("reservation integrity violation: {0}")]
    DuplicateReservation(#[source] LedgerError),

    #[error("booking was not persisted: {0}")]
    PersistenceFailure(#[source] StoreError),

    #[error("persistence timed out; booking rolled back")]
    PersistenceTimeout,

    #[error("operation cancelled by caller deadline")]
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum CancelError {
    #[error("ticket not found: {0}")]
    TicketNotFound(String),

    #[error("ledger integrity violation: {0}")]
    Integrity(String),

    #[error("operation cancelled by caller deadline")]
    Cancelled,
}

/// How a cancellation completed.
///
/// Cancellation prioritizes seat availability over strict durability: once
/// the ledger entry is gone and the seat released, a failed snapshot write
/// surfaces as a warning rather than undoing the cancellation.
#[derive(Debug)]
pub enum CancelOutcome {
    /// Committed in memory and captured by a durable snapshot
    Durable,
    /// Committed in memory; the snapshot write failed and the state will be
    /// captured by the next successful persist
    PersistenceWarning(String),
}
