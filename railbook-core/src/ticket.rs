use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An active reservation. Owned exclusively by the `ReservationLedger`;
/// everything else holds copies or ticket-id references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub train_id: String,
    pub row: usize,
    pub col: usize,
    pub user_id: String,
    pub source: String,
    pub destination: String,
    pub travel_date: NaiveDate,
}

impl Ticket {
    /// Create a ticket with a freshly generated id
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        train_id: impl Into<String>,
        row: usize,
        col: usize,
        user_id: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
        travel_date: NaiveDate,
    ) -> Self {
        Self {
            ticket_id: format!("TN-{}", Uuid::new_v4().simple()),
            train_id: train_id.into(),
            row,
            col,
            user_id: user_id.into(),
            source: source.into(),
            destination: destination.into(),
            travel_date,
        }
    }

    /// The seat this ticket holds, keyed the way the ledger indexes it
    pub fn seat_key(&self) -> (String, usize, usize) {
        (self.train_id.clone(), self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_deserialization() {
        let json = r#"
            {
                "ticket_id": "TN-7f3a",
                "train_id": "T001",
                "row": 0,
                "col": 3,
                "user_id": "user-1",
                "source": "delhi",
                "destination": "mumbai",
                "travel_date": "2026-09-01"
            }
        "#;
        let ticket: Ticket = serde_json::from_str(json).expect("failed to deserialize");
        assert_eq!(ticket.ticket_id, "TN-7f3a");
        assert_eq!(ticket.travel_date, NaiveDate::from_ymd_opt(2026, 9, 1).unwrap());
        assert_eq!(ticket.seat_key(), ("T001".to_string(), 0, 3));
    }

    #[test]
    fn test_ticket_ids_are_unique() {
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let a = Ticket::new("T001", 0, 0, "user-1", "delhi", "mumbai", date);
        let b = Ticket::new("T001", 0, 1, "user-1", "delhi", "mumbai", date);

        assert!(a.ticket_id.starts_with("TN-"));
        assert_ne!(a.ticket_id, b.ticket_id);
    }
}
