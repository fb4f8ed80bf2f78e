pub mod errors;
pub mod service;

pub use errors::{BookingError, CancelError, CancelOutcome};
pub use service::{BookingRequest, ReservationService};
