use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use ulid::Ulid;

use crate::model::{Reservation, TimeSlot, Window};

use super::availability::{filter_available, materialize_template};
use super::{BookingError, Engine};

/// Midnight at the start of the day after `now`, in UTC.
fn next_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    (now.date_naive() + chrono::Days::new(1))
        .and_time(NaiveTime::MIN)
        .and_utc()
}

impl Engine {
    /// Free slots for one telescope on one observing date. Recomputed
    /// from the store on every call; other writers mutate reservation
    /// state between calls, so nothing here is cached.
    pub async fn list_available_slots(
        &self,
        telescope_id: Ulid,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, BookingError> {
        let telescope = self.registry.get_active(&telescope_id)?;

        // The night template runs past midnight, so fetch reservations
        // across both calendar days it can touch.
        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let fetch = Window::new(day_start, day_start + Duration::days(2));
        let taken = self.store.active_in_window(&telescope_id, &fetch).await;
        let occupied: Vec<Window> = taken.iter().map(|r| r.window).collect();

        let slots = materialize_template(&telescope.slot_template, date);
        Ok(filter_available(slots, &occupied, self.now()))
    }

    pub async fn get_reservation(&self, id: Ulid) -> Result<Reservation, BookingError> {
        self.store.get(&id).await
    }

    /// A user's bookings, newest first.
    pub async fn reservations_for_owner(&self, owner_id: Ulid) -> Vec<Reservation> {
        let mut out = self
            .store
            .collect_where(|r| r.owner_id == owner_id)
            .await;
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    /// Every reservation on a telescope, in start order.
    pub async fn reservations_for_telescope(&self, telescope_id: Ulid) -> Vec<Reservation> {
        self.store.for_telescope(&telescope_id).await
    }

    // ── Reminder sweep selections ────────────────────────────────

    /// Active reservations starting tomorrow (the 24 hour window from
    /// the next midnight) that have not had their daily reminder.
    pub async fn due_daily_reminders(&self, now: DateTime<Utc>) -> Vec<Reservation> {
        let window_start = next_midnight(now);
        let window_end = window_start + Duration::days(1);
        self.store
            .collect_where(|r| {
                r.is_active()
                    && !r.daily_reminder_sent
                    && r.window.start >= window_start
                    && r.window.start < window_end
            })
            .await
    }

    /// Active reservations whose time-until-start sits inside the
    /// imminent window and that have not had their imminent reminder.
    /// The window is wider than the sweep period (config-validated), so
    /// nothing slips between consecutive sweeps.
    pub async fn due_imminent_reminders(&self, now: DateTime<Utc>) -> Vec<Reservation> {
        let min = self.config().imminent_window_min;
        let max = self.config().imminent_window_max;
        self.store
            .collect_where(|r| {
                if !r.is_active() || r.imminent_reminder_sent {
                    return false;
                }
                let until = r.window.start - now;
                until >= min && until <= max
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn next_midnight_rolls_forward() {
        let noon = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        assert_eq!(
            next_midnight(noon),
            Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap()
        );
        // Just before midnight still targets the coming midnight.
        let late = Utc.with_ymd_and_hms(2024, 1, 2, 23, 59, 59).unwrap();
        assert_eq!(
            next_midnight(late),
            Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap()
        );
    }
}
