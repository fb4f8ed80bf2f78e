use crate::errors::{BookingError, CancelError, CancelOutcome};
use chrono::NaiveDate;
use railbook_core::search::filter_routes;
use railbook_core::{
    ReservationLedger, RestoredState, SeatState, SnapshotStore, StoreError, Ticket, Train, User,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Mutex as TrainGate;
use tokio::time::{timeout, Instant};
use tracing::{error, info, warn};

/// One booking attempt, as handed over by the presentation layer.
/// The caller is already authenticated; `user_id` is trusted.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub train_id: String,
    pub row: usize,
    pub col: usize,
    pub user_id: String,
    pub source: String,
    pub destination: String,
    pub travel_date: NaiveDate,
}

struct TrainEntry {
    train: Train,
    /// Exclusive critical section for this train's claim + ledger + persist
    /// sequence. Different trains book fully in parallel.
    gate: TrainGate<()>,
}

/// Orchestrates booking and cancellation across the seat grids, the
/// reservation ledger and the snapshot store.
///
/// The service guarantees at most one active ticket per seat: the seat claim,
/// the ledger insert and the durability checkpoint all happen under the
/// owning train's gate, and any later failure compensates by undoing the
/// earlier steps.
pub struct ReservationService {
    trains: HashMap<String, TrainEntry>,
    ledger: Mutex<ReservationLedger>,
    store: Arc<dyn SnapshotStore>,
    persist_timeout: Duration,
}

impl std::fmt::Debug for ReservationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationService")
            .field("trains", &self.trains.len())
            .field("persist_timeout", &self.persist_timeout)
            .finish()
    }
}

impl ReservationService {
    /// Fresh instance over a catalog supplied by the train-catalog loader
    pub fn new(trains: Vec<Train>, store: Arc<dyn SnapshotStore>, persist_timeout: Duration) -> Self {
        let trains = trains
            .into_iter()
            .map(|train| {
                (
                    train.train_id.clone(),
                    TrainEntry { train, gate: TrainGate::new(()) },
                )
            })
            .collect();

        Self {
            trains,
            ledger: Mutex::new(ReservationLedger::new()),
            store,
            persist_timeout,
        }
    }

    /// Rebuild the service from the last durable snapshot.
    ///
    /// The ledger is authoritative: a ticket referencing an unknown train,
    /// an out-of-bounds seat or an already-ticketed seat means the snapshot
    /// broke the model invariant and restore fails with `CorruptState`. A
    /// booked cell with no matching ticket (possible if a crash landed
    /// between the two record writes) is released with a warning; an
    /// over-released seat is the safer failure mode.
    pub async fn restore(
        store: Arc<dyn SnapshotStore>,
        persist_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let RestoredState { trains, tickets } = store.restore().await?;

        let ledger = ReservationLedger::from_tickets(tickets)
            .map_err(|e| StoreError::CorruptState(e.to_string()))?;

        let mut entries: HashMap<String, TrainEntry> = HashMap::new();
        for train in trains {
            if entries.contains_key(&train.train_id) {
                return Err(StoreError::CorruptState(format!(
                    "duplicate train id in catalog: {}",
                    train.train_id
                )));
            }
            entries.insert(
                train.train_id.clone(),
                TrainEntry { train, gate: TrainGate::new(()) },
            );
        }

        for ticket in ledger.tickets() {
            let entry = entries.get(&ticket.train_id).ok_or_else(|| {
                StoreError::CorruptState(format!(
                    "ticket {} references unknown train {}",
                    ticket.ticket_id, ticket.train_id
                ))
            })?;
            if !entry.train.grid.is_valid_coordinate(ticket.row, ticket.col) {
                return Err(StoreError::CorruptState(format!(
                    "ticket {} references seat ({}, {}) outside the grid",
                    ticket.ticket_id, ticket.row, ticket.col
                )));
            }
            if let Ok(SeatState::Available) = entry.train.grid.state(ticket.row, ticket.col) {
                // Persisted grid lagged behind the ledger; re-derive the claim
                let _ = entry.train.grid.try_claim(ticket.row, ticket.col);
                warn!(
                    ticket_id = %ticket.ticket_id,
                    train_id = %ticket.train_id,
                    row = ticket.row,
                    col = ticket.col,
                    "restored seat claim missing from persisted grid"
                );
            }
        }

        for entry in entries.values() {
            for (row, col) in entry.train.grid.booked_seats() {
                if ledger.find_by_train_seat(&entry.train.train_id, row, col).is_none() {
                    let _ = entry.train.grid.release(row, col);
                    warn!(
                        train_id = %entry.train.train_id,
                        row,
                        col,
                        "releasing booked seat with no ledger ticket"
                    );
                }
            }
        }

        Ok(Self {
            trains: entries,
            ledger: Mutex::new(ledger),
            store,
            persist_timeout,
        })
    }

    /// Trains serving source -> destination, pure filter over the catalog
    pub fn search_routes(&self, source: &str, destination: &str) -> Vec<&Train> {
        filter_routes(self.trains.values().map(|e| &e.train), source, destination)
    }

    pub fn train(&self, train_id: &str) -> Option<&Train> {
        self.trains.get(train_id).map(|e| &e.train)
    }

    /// Seat map for display
    pub fn seat_map(&self, train_id: &str) -> Result<Vec<Vec<SeatState>>, BookingError> {
        let entry = self
            .trains
            .get(train_id)
            .ok_or_else(|| BookingError::TrainNotFound(train_id.to_string()))?;

        Ok(entry
            .train
            .grid
            .to_cells()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| if cell == 0 { SeatState::Available } else { SeatState::Booked })
                    .collect()
            })
            .collect())
    }

    pub fn tickets_for_user(&self, user_id: &str) -> Vec<Ticket> {
        let ledger = self.ledger.lock().expect("ledger lock poisoned");
        ledger.tickets_for_user(user_id).into_iter().cloned().collect()
    }

    /// Refresh a display-side `User` with its ledger-owned ticket ids
    pub fn hydrate_user(&self, user: &mut User) {
        let tickets = self.tickets_for_user(&user.user_id);
        user.attach_tickets(&tickets);
    }

    /// Book one seat.
    ///
    /// The claim, the ledger insert and the snapshot write run under the
    /// train's gate. A failure after the claim compensates: the seat is
    /// released (and the ticket removed) before the error surfaces, so a
    /// retried `book` simply re-validates and re-claims.
    pub async fn book(
        &self,
        req: BookingRequest,
        deadline: Option<Instant>,
    ) -> Result<Ticket, BookingError> {
        let entry = self
            .trains
            .get(&req.train_id)
            .ok_or_else(|| BookingError::TrainNotFound(req.train_id.clone()))?;

        if !entry.train.grid.is_valid_coordinate(req.row, req.col) {
            return Err(BookingError::InvalidSeat { row: req.row, col: req.col });
        }
        if !entry.train.serves_route(&req.source, &req.destination) {
            return Err(BookingError::InvalidRoute {
                train_id: req.train_id.clone(),
                origin: req.source.clone(),
                destination: req.destination.clone(),
            });
        }
        if deadline_expired(deadline) {
            return Err(BookingError::Cancelled);
        }

        let _gate = entry.gate.lock().await;

        // The gate wait may have consumed the caller's budget
        if deadline_expired(deadline) {
            return Err(BookingError::Cancelled);
        }

        let claimed = entry
            .train
            .grid
            .try_claim(req.row, req.col)
            .map_err(|_| BookingError::InvalidSeat { row: req.row, col: req.col })?;
        if !claimed {
            return Err(BookingError::SeatAlreadyBooked);
        }

        let created = {
            let mut ledger = self.ledger.lock().expect("ledger lock poisoned");
            ledger.create_ticket(
                &req.train_id,
                req.row,
                req.col,
                &req.user_id,
                &req.source,
                &req.destination,
                req.travel_date,
            )
        };
        let ticket = match created {
            Ok(ticket) => ticket,
            Err(e) => {
                // Should be unreachable under the gate; compensate and surface
                let _ = entry.train.grid.release(req.row, req.col);
                error!(train_id = %req.train_id, row = req.row, col = req.col, error = %e,
                    "seat claimed but ledger already holds a ticket");
                return Err(BookingError::DuplicateReservation(e));
            }
        };

        if let Err(e) = self.persist(deadline).await {
            // Never report success for state that did not survive durability
            {
                let mut ledger = self.ledger.lock().expect("ledger lock poisoned");
                let _ = ledger.cancel_ticket(&ticket.ticket_id);
            }
            let _ = entry.train.grid.release(req.row, req.col);
            // A concurrent operation on another train may have snapshotted
            // the ledger while it still held this ticket; overwrite so a
            // crash cannot resurrect a booking the caller saw fail
            if self.persist(None).await.is_err() {
                warn!(
                    train_id = %req.train_id,
                    row = req.row,
                    col = req.col,
                    "rollback snapshot failed; last durable snapshot may predate the rollback"
                );
            }
            return Err(match e {
                PersistError::Timeout { deadline_bound: true } => BookingError::Cancelled,
                PersistError::Timeout { deadline_bound: false } => BookingError::PersistenceTimeout,
                PersistError::Failure(e) => BookingError::PersistenceFailure(e),
            });
        }

        info!(
            ticket_id = %ticket.ticket_id,
            train_id = %req.train_id,
            row = req.row,
            col = req.col,
            user_id = %req.user_id,
            "seat booked"
        );
        Ok(ticket)
    }

    /// Cancel a ticket, releasing exactly the seat it recorded.
    ///
    /// Once the ledger entry is removed and the seat released the
    /// cancellation is committed; a failed snapshot write downgrades to
    /// `CancelOutcome::PersistenceWarning` rather than resurrecting the
    /// booking.
    pub async fn cancel(
        &self,
        ticket_id: &str,
        deadline: Option<Instant>,
    ) -> Result<CancelOutcome, CancelError> {
        if deadline_expired(deadline) {
            return Err(CancelError::Cancelled);
        }

        let ticket = {
            let ledger = self.ledger.lock().expect("ledger lock poisoned");
            ledger
                .get(ticket_id)
                .cloned()
                .ok_or_else(|| CancelError::TicketNotFound(ticket_id.to_string()))?
        };

        let entry = self.trains.get(&ticket.train_id).ok_or_else(|| {
            error!(ticket_id = %ticket_id, train_id = %ticket.train_id,
                "ledger ticket references a train missing from the catalog");
            CancelError::Integrity(format!("ticket {} references unknown train", ticket_id))
        })?;

        let _gate = entry.gate.lock().await;

        // No state has changed yet, so an expired deadline is still a clean abort
        if deadline_expired(deadline) {
            return Err(CancelError::Cancelled);
        }

        let ticket = {
            let mut ledger = self.ledger.lock().expect("ledger lock poisoned");
            match ledger.cancel_ticket(ticket_id) {
                Ok(ticket) => ticket,
                // Lost a race against another cancel of the same ticket
                Err(_) => return Err(CancelError::TicketNotFound(ticket_id.to_string())),
            }
        };
        let _ = entry.train.grid.release(ticket.row, ticket.col);

        let outcome = match self.persist(deadline).await {
            Ok(()) => CancelOutcome::Durable,
            Err(e) => {
                let reason = match e {
                    PersistError::Timeout { .. } => "snapshot timed out".to_string(),
                    PersistError::Failure(e) => e.to_string(),
                };
                warn!(
                    ticket_id = %ticket_id,
                    train_id = %ticket.train_id,
                    reason = %reason,
                    "cancellation committed in memory but not yet persisted"
                );
                CancelOutcome::PersistenceWarning(reason)
            }
        };

        info!(
            ticket_id = %ticket_id,
            train_id = %ticket.train_id,
            row = ticket.row,
            col = ticket.col,
            "ticket cancelled"
        );
        Ok(outcome)
    }

    /// Snapshot the whole catalog and ledger, bounded by the persistence
    /// timeout and, if tighter, the caller's deadline
    async fn persist(&self, deadline: Option<Instant>) -> Result<(), PersistError> {
        let mut limit = self.persist_timeout;
        let mut deadline_bound = false;
        if let Some(d) = deadline {
            let remaining = d.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(PersistError::Timeout { deadline_bound: true });
            }
            if remaining < limit {
                limit = remaining;
                deadline_bound = true;
            }
        }

        let trains: Vec<&Train> = self.trains.values().map(|e| &e.train).collect();
        let tickets = {
            let ledger = self.ledger.lock().expect("ledger lock poisoned");
            ledger.tickets()
        };

        match timeout(limit, self.store.snapshot(&trains, &tickets)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(PersistError::Failure(e)),
            Err(_) => Err(PersistError::Timeout { deadline_bound }),
        }
    }
}

enum PersistError {
    Timeout { deadline_bound: bool },
    Failure(StoreError),
}

fn deadline_expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}
