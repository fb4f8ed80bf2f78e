use crate::ticket::Ticket;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Authoritative mapping from ticket ids to reservation records.
///
/// The ledger owns ticket records outright and keeps two reverse indexes:
/// seat -> ticket (so a seat can never carry two active tickets) and
/// user -> tickets in insertion order.
#[derive(Debug, Default)]
pub struct ReservationLedger {
    tickets: HashMap<String, Ticket>,
    /// Insertion order of ticket ids, for stable iteration and snapshots
    order: Vec<String>,
    by_seat: HashMap<(String, usize, usize), String>,
    by_user: HashMap<String, Vec<String>>,
}

impl ReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted tickets. Duplicate ticket ids or two
    /// tickets on one seat mean the snapshot violates the model invariant.
    pub fn from_tickets(tickets: Vec<Ticket>) -> Result<Self, LedgerError> {
        let mut ledger = Self::new();
        for ticket in tickets {
            if ledger.tickets.contains_key(&ticket.ticket_id) {
                return Err(LedgerError::DuplicateTicketId(ticket.ticket_id));
            }
            if ledger.by_seat.contains_key(&ticket.seat_key()) {
                return Err(LedgerError::DuplicateReservation {
                    train_id: ticket.train_id,
                    row: ticket.row,
                    col: ticket.col,
                });
            }
            ledger.insert(ticket);
        }
        Ok(ledger)
    }

    /// Allocate a fresh ticket for a seat and record it.
    ///
    /// `DuplicateReservation` here means a caller claimed a seat that already
    /// carries an active ticket: a concurrency bug upstream, not user error.
    #[allow(clippy::too_many_arguments)]
    pub fn create_ticket(
        &mut self,
        train_id: &str,
        row: usize,
        col: usize,
        user_id: &str,
        source: &str,
        destination: &str,
        travel_date: NaiveDate,
    ) -> Result<Ticket, LedgerError> {
        let seat_key = (train_id.to_string(), row, col);
        if self.by_seat.contains_key(&seat_key) {
            return Err(LedgerError::DuplicateReservation {
                train_id: train_id.to_string(),
                row,
                col,
            });
        }

        let ticket = Ticket::new(train_id, row, col, user_id, source, destination, travel_date);
        self.insert(ticket.clone());
        Ok(ticket)
    }

    /// Remove and return a ticket
    pub fn cancel_ticket(&mut self, ticket_id: &str) -> Result<Ticket, LedgerError> {
        let ticket = self
            .tickets
            .remove(ticket_id)
            .ok_or_else(|| LedgerError::TicketNotFound(ticket_id.to_string()))?;

        self.order.retain(|id| id != ticket_id);
        self.by_seat.remove(&ticket.seat_key());
        if let Some(ids) = self.by_user.get_mut(&ticket.user_id) {
            ids.retain(|id| id != ticket_id);
            if ids.is_empty() {
                self.by_user.remove(&ticket.user_id);
            }
        }

        Ok(ticket)
    }

    pub fn get(&self, ticket_id: &str) -> Option<&Ticket> {
        self.tickets.get(ticket_id)
    }

    /// Reverse lookup by seat, for reconciliation and debugging
    pub fn find_by_train_seat(&self, train_id: &str, row: usize, col: usize) -> Option<&Ticket> {
        self.by_seat
            .get(&(train_id.to_string(), row, col))
            .and_then(|id| self.tickets.get(id))
    }

    /// A user's tickets in the order they were booked
    pub fn tickets_for_user(&self, user_id: &str) -> Vec<&Ticket> {
        self.by_user
            .get(user_id)
            .map(|ids| ids.iter().filter_map(|id| self.tickets.get(id)).collect())
            .unwrap_or_default()
    }

    /// All tickets in insertion order, for snapshots
    pub fn tickets(&self) -> Vec<Ticket> {
        self.order.iter().filter_map(|id| self.tickets.get(id)).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    fn insert(&mut self, ticket: Ticket) {
        self.by_seat.insert(ticket.seat_key(), ticket.ticket_id.clone());
        self.by_user
            .entry(ticket.user_id.clone())
            .or_default()
            .push(ticket.ticket_id.clone());
        self.order.push(ticket.ticket_id.clone());
        self.tickets.insert(ticket.ticket_id.clone(), ticket);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("seat ({row}, {col}) on train {train_id} already has an active ticket")]
    DuplicateReservation { train_id: String, row: usize, col: usize },

    #[error("duplicate ticket id in ledger: {0}")]
    DuplicateTicketId(String),

    #[error("ticket not found: {0}")]
    TicketNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
    }

    #[test]
    fn test_create_then_cancel_round_trip() {
        let mut ledger = ReservationLedger::new();

        let ticket = ledger
            .create_ticket("T001", 0, 0, "user-1", "delhi", "mumbai", date())
            .unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(
            ledger.find_by_train_seat("T001", 0, 0).unwrap().ticket_id,
            ticket.ticket_id
        );

        let cancelled = ledger.cancel_ticket(&ticket.ticket_id).unwrap();
        assert_eq!(cancelled, ticket);
        assert!(ledger.is_empty());
        assert!(ledger.find_by_train_seat("T001", 0, 0).is_none());
        assert!(ledger.tickets_for_user("user-1").is_empty());
    }

    #[test]
    fn test_duplicate_seat_rejected() {
        let mut ledger = ReservationLedger::new();
        ledger
            .create_ticket("T001", 2, 3, "user-1", "delhi", "mumbai", date())
            .unwrap();

        let err = ledger
            .create_ticket("T001", 2, 3, "user-2", "delhi", "jaipur", date())
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateReservation { row: 2, col: 3, .. }));

        // Same coordinates on another train are fine
        ledger
            .create_ticket("T002", 2, 3, "user-2", "bangalore", "delhi", date())
            .unwrap();
    }

    #[test]
    fn test_cancel_unknown_ticket() {
        let mut ledger = ReservationLedger::new();
        let err = ledger.cancel_ticket("TN-9999").unwrap_err();
        assert!(matches!(err, LedgerError::TicketNotFound(id) if id == "TN-9999"));
    }

    #[test]
    fn test_tickets_for_user_in_booking_order() {
        let mut ledger = ReservationLedger::new();
        let first = ledger
            .create_ticket("T001", 0, 0, "user-1", "delhi", "mumbai", date())
            .unwrap();
        ledger
            .create_ticket("T001", 0, 1, "user-2", "delhi", "jaipur", date())
            .unwrap();
        let second = ledger
            .create_ticket("T002", 1, 0, "user-1", "bangalore", "delhi", date())
            .unwrap();

        let tickets = ledger.tickets_for_user("user-1");
        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].ticket_id, first.ticket_id);
        assert_eq!(tickets[1].ticket_id, second.ticket_id);
    }

    #[test]
    fn test_from_tickets_rejects_invariant_breaks() {
        let a = Ticket::new("T001", 0, 0, "user-1", "delhi", "mumbai", date());
        let mut b = Ticket::new("T001", 0, 0, "user-2", "delhi", "jaipur", date());

        // Two tickets on one seat
        let err = ReservationLedger::from_tickets(vec![a.clone(), b.clone()]).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateReservation { .. }));

        // Duplicate ticket id
        b.ticket_id = a.ticket_id.clone();
        b.col = 1;
        let err = ReservationLedger::from_tickets(vec![a, b]).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateTicketId(_)));
    }
}
