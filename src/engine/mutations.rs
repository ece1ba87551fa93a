use chrono::{DateTime, Utc};
use tracing::{info, warn};
use ulid::Ulid;

use crate::events::BookingEvent;
use crate::limits::*;
use crate::model::{ActorRole, Reservation, ReservationStatus, Window};
use crate::observability;

use super::{BookingError, Engine};

impl Engine {
    /// Create a reservation. Validation short-circuits in a fixed order;
    /// the conflict check itself happens inside the store, under the
    /// telescope's write lock.
    pub async fn create_booking(
        &self,
        telescope_id: Ulid,
        owner_id: Ulid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        purpose: &str,
        notes: Option<&str>,
    ) -> Result<Reservation, BookingError> {
        if end <= start {
            return Err(BookingError::InvalidWindow);
        }
        let now = self.now();
        if start <= now {
            return Err(BookingError::PastBooking);
        }
        let purpose_len = purpose.chars().count();
        if !(MIN_PURPOSE_LEN..=MAX_PURPOSE_LEN).contains(&purpose_len) {
            return Err(BookingError::InvalidPurpose { len: purpose_len });
        }
        if let Some(n) = notes {
            let notes_len = n.chars().count();
            if notes_len > MAX_NOTES_LEN {
                return Err(BookingError::InvalidNotes { len: notes_len });
            }
        }
        self.registry.get_active(&telescope_id)?;

        let candidate = Reservation::new(
            telescope_id,
            owner_id,
            Window::new(start, end),
            purpose.to_string(),
            notes.map(str::to_string),
            now,
        );
        let created = match self.store.try_create(candidate).await {
            Ok(r) => r,
            Err(e) => {
                if matches!(e, BookingError::Conflict(_)) {
                    metrics::counter!(observability::BOOKING_CONFLICTS_TOTAL).increment(1);
                }
                return Err(e);
            }
        };

        metrics::counter!(observability::BOOKINGS_CREATED_TOTAL).increment(1);
        info!(
            "booking {} created on telescope {} for [{}, {})",
            created.id, telescope_id, created.window.start, created.window.end
        );

        // Side effects are best-effort: a failed notice never rolls the
        // reservation back.
        if let Err(e) = self.notifier().booking_created(&created).await {
            warn!("created notification failed for {}: {e}", created.id);
        }
        self.events.publish(
            telescope_id,
            &BookingEvent::Created {
                reservation: created.clone(),
            },
        );

        Ok(created)
    }

    /// Owner-initiated cancellation. The lookup is owner-scoped: asking
    /// about someone else's booking reads the same as asking about a
    /// booking that does not exist.
    pub async fn cancel_booking(
        &self,
        id: Ulid,
        requester_id: Ulid,
    ) -> Result<Reservation, BookingError> {
        let existing = self.store.get(&id).await?;
        if existing.owner_id != requester_id {
            return Err(BookingError::NotFound(id));
        }
        if existing.status.is_terminal() {
            return Err(BookingError::AlreadyTerminal(existing.status));
        }
        let now = self.now();
        if existing.window.start - now < self.config().cancel_cutoff {
            return Err(BookingError::CutoffExceeded {
                min_notice_hours: self.config().cancel_cutoff.num_hours(),
            });
        }

        let cancelled = self
            .store
            .update_status(&id, ReservationStatus::Cancelled)
            .await?;

        metrics::counter!(observability::BOOKINGS_CANCELLED_TOTAL).increment(1);
        info!(
            "booking {} cancelled on telescope {}",
            cancelled.id, cancelled.telescope_id
        );

        if let Err(e) = self.notifier().booking_cancelled(&cancelled).await {
            warn!("cancelled notification failed for {}: {e}", cancelled.id);
        }
        self.events.publish(
            cancelled.telescope_id,
            &BookingEvent::Cancelled {
                reservation: cancelled.clone(),
            },
        );

        Ok(cancelled)
    }

    /// Administrative status override. Any graph-legal transition, no
    /// cancellation cutoff, but only for admins.
    pub async fn set_status(
        &self,
        id: Ulid,
        new_status: ReservationStatus,
        actor_role: ActorRole,
    ) -> Result<Reservation, BookingError> {
        if actor_role != ActorRole::Admin {
            return Err(BookingError::AdminRequired);
        }
        let previous = self.store.get(&id).await?.status;
        let updated = self.store.update_status(&id, new_status).await?;

        metrics::counter!(observability::STATUS_OVERRIDES_TOTAL).increment(1);
        info!(
            "booking {} status {} -> {} (admin)",
            updated.id, previous, updated.status
        );

        self.events.publish(
            updated.telescope_id,
            &BookingEvent::StatusChanged {
                reservation: updated.clone(),
                previous,
            },
        );

        Ok(updated)
    }
}
