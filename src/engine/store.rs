use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use ulid::Ulid;

use crate::limits::MAX_RESERVATIONS_PER_TELESCOPE;
use crate::model::{ReminderKind, Reservation, ReservationStatus, Window};

use super::BookingError;

pub type SharedCalendar = Arc<RwLock<Calendar>>;

/// One telescope's reservations, sorted by window start. All writes to
/// it happen under the calendar's write lock, which is what makes the
/// conflict check and the insert one logical unit.
#[derive(Debug)]
pub struct Calendar {
    pub telescope_id: Ulid,
    pub reservations: Vec<Reservation>,
}

impl Calendar {
    pub fn new(telescope_id: Ulid) -> Self {
        Self {
            telescope_id,
            reservations: Vec::new(),
        }
    }

    /// Insert keeping sort order by window start.
    pub fn insert_sorted(&mut self, reservation: Reservation) {
        let pos = self
            .reservations
            .binary_search_by_key(&reservation.window.start, |r| r.window.start)
            .unwrap_or_else(|e| e);
        self.reservations.insert(pos, reservation);
    }

    pub fn find(&self, id: &Ulid) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == *id)
    }

    pub fn find_mut(&mut self, id: &Ulid) -> Option<&mut Reservation> {
        self.reservations.iter_mut().find(|r| r.id == *id)
    }

    /// Active (pending/confirmed) reservations whose window overlaps the
    /// query. Binary search skips everything starting at or after
    /// `query.end`; cancelled and completed rows do not occupy slots.
    pub fn overlapping_active(&self, query: &Window) -> impl Iterator<Item = &Reservation> {
        let right_bound = self
            .reservations
            .partition_point(|r| r.window.start < query.end);
        self.reservations[..right_bound]
            .iter()
            .filter(move |r| r.is_active() && r.window.end > query.start)
    }
}

/// Authoritative reservation record. Calendars are sharded per
/// telescope so creates on different telescopes never contend.
pub struct ReservationStore {
    calendars: DashMap<Ulid, SharedCalendar>,
    /// Reverse lookup: reservation id -> telescope id.
    index: DashMap<Ulid, Ulid>,
}

impl Default for ReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservationStore {
    pub fn new() -> Self {
        Self {
            calendars: DashMap::new(),
            index: DashMap::new(),
        }
    }

    fn calendar(&self, telescope_id: Ulid) -> SharedCalendar {
        self.calendars
            .entry(telescope_id)
            .or_insert_with(|| Arc::new(RwLock::new(Calendar::new(telescope_id))))
            .value()
            .clone()
    }

    async fn resolve_read(
        &self,
        id: &Ulid,
    ) -> Result<OwnedRwLockReadGuard<Calendar>, BookingError> {
        let telescope_id = self
            .index
            .get(id)
            .map(|e| *e.value())
            .ok_or(BookingError::NotFound(*id))?;
        let cal = self
            .calendars
            .get(&telescope_id)
            .map(|e| e.value().clone())
            .ok_or(BookingError::NotFound(*id))?;
        Ok(cal.read_owned().await)
    }

    /// Lookup reservation -> telescope, then take the calendar write lock.
    async fn resolve_write(
        &self,
        id: &Ulid,
    ) -> Result<OwnedRwLockWriteGuard<Calendar>, BookingError> {
        let telescope_id = self
            .index
            .get(id)
            .map(|e| *e.value())
            .ok_or(BookingError::NotFound(*id))?;
        let cal = self
            .calendars
            .get(&telescope_id)
            .map(|e| e.value().clone())
            .ok_or(BookingError::NotFound(*id))?;
        Ok(cal.write_owned().await)
    }

    /// Check-and-insert under the telescope's write lock. Exactly one of
    /// two racing overlapping candidates wins; the loser gets `Conflict`
    /// naming the reservation that beat it.
    pub async fn try_create(&self, candidate: Reservation) -> Result<Reservation, BookingError> {
        let cal = self.calendar(candidate.telescope_id);
        let mut guard = cal.write().await;
        if guard.reservations.len() >= MAX_RESERVATIONS_PER_TELESCOPE {
            return Err(BookingError::LimitExceeded("too many reservations on telescope"));
        }
        if let Some(existing) = guard.overlapping_active(&candidate.window).next() {
            return Err(BookingError::Conflict(existing.id));
        }
        guard.insert_sorted(candidate.clone());
        self.index.insert(candidate.id, candidate.telescope_id);
        Ok(candidate)
    }

    pub async fn get(&self, id: &Ulid) -> Result<Reservation, BookingError> {
        let guard = self.resolve_read(id).await?;
        guard.find(id).cloned().ok_or(BookingError::NotFound(*id))
    }

    /// Apply a status transition. Only graph-legal moves go through; the
    /// time window is untouched, so no overlap re-check is needed.
    pub async fn update_status(
        &self,
        id: &Ulid,
        new_status: ReservationStatus,
    ) -> Result<Reservation, BookingError> {
        let mut guard = self.resolve_write(id).await?;
        let reservation = guard.find_mut(id).ok_or(BookingError::NotFound(*id))?;
        if !reservation.status.can_transition_to(new_status) {
            return Err(BookingError::InvalidTransition {
                from: reservation.status,
                to: new_status,
            });
        }
        reservation.status = new_status;
        Ok(reservation.clone())
    }

    /// Flip a reminder flag false -> true. Returns false without touching
    /// anything when the flag is already set or the reservation reached a
    /// terminal status (the reminder facet is frozen there).
    pub async fn mark_reminder_sent(
        &self,
        id: &Ulid,
        kind: ReminderKind,
    ) -> Result<bool, BookingError> {
        let mut guard = self.resolve_write(id).await?;
        let reservation = guard.find_mut(id).ok_or(BookingError::NotFound(*id))?;
        if reservation.status.is_terminal() {
            return Ok(false);
        }
        let flag = match kind {
            ReminderKind::Daily => &mut reservation.daily_reminder_sent,
            ReminderKind::Imminent => &mut reservation.imminent_reminder_sent,
        };
        if *flag {
            return Ok(false);
        }
        *flag = true;
        Ok(true)
    }

    /// Active reservations on one telescope intersecting the window.
    pub async fn active_in_window(&self, telescope_id: &Ulid, window: &Window) -> Vec<Reservation> {
        let Some(cal) = self.calendars.get(telescope_id).map(|e| e.value().clone()) else {
            return Vec::new();
        };
        let guard = cal.read().await;
        guard.overlapping_active(window).cloned().collect()
    }

    /// Scan every calendar and keep reservations matching the predicate.
    /// Calendars are cloned out of the map first so the scan never holds
    /// a DashMap shard across an await.
    pub async fn collect_where<F>(&self, pred: F) -> Vec<Reservation>
    where
        F: Fn(&Reservation) -> bool,
    {
        let calendars: Vec<SharedCalendar> =
            self.calendars.iter().map(|e| e.value().clone()).collect();
        let mut out = Vec::new();
        for cal in calendars {
            let guard = cal.read().await;
            out.extend(guard.reservations.iter().filter(|r| pred(r)).cloned());
        }
        out
    }

    pub async fn for_telescope(&self, telescope_id: &Ulid) -> Vec<Reservation> {
        let Some(cal) = self.calendars.get(telescope_id).map(|e| e.value().clone()) else {
            return Vec::new();
        };
        let guard = cal.read().await;
        guard.reservations.clone()
    }
}
