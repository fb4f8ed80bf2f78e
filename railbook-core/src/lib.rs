pub mod grid;
pub mod ledger;
pub mod persistence;
pub mod search;
pub mod ticket;
pub mod train;
pub mod user;

pub use grid::{GridError, SeatGrid, SeatState};
pub use ledger::{LedgerError, ReservationLedger};
pub use persistence::{RestoredState, SnapshotStore, StoreError};
pub use ticket::Ticket;
pub use train::Train;
pub use user::User;
