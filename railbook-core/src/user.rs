use crate::ticket::Ticket;
use serde::{Deserialize, Serialize};

/// Display-side view of an account.
///
/// The core only ever sees an already-authenticated `user_id`; password
/// hashing and verification live in the authentication collaborator.
/// `ticket_ids` is a presentation cache; the ledger stays authoritative
/// for who holds which seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub hashed_password: String,
    #[serde(default)]
    pub ticket_ids: Vec<String>,
}

impl User {
    pub fn new(user_id: impl Into<String>, hashed_password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            hashed_password: hashed_password.into(),
            ticket_ids: Vec::new(),
        }
    }

    /// Refresh the ticket-id cache from ledger-owned records
    pub fn attach_tickets(&mut self, tickets: &[Ticket]) {
        self.ticket_ids = tickets.iter().map(|t| t.ticket_id.clone()).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_attach_tickets_replaces_cache() {
        let mut user = User::new("user-1", "$2b$12$abcdef");
        user.ticket_ids = vec!["TN-stale".to_string()];

        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let ticket = Ticket::new("T001", 0, 0, "user-1", "delhi", "mumbai", date);
        user.attach_tickets(std::slice::from_ref(&ticket));

        assert_eq!(user.ticket_ids, vec![ticket.ticket_id]);
    }
}
