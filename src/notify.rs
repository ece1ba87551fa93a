use async_trait::async_trait;
use tracing::info;

use crate::model::{ReminderKind, Reservation};

/// A notification attempt that did not go through. Failures here are
/// logged by the caller and never abort the booking operation.
#[derive(Debug)]
pub struct NotifyError(pub String);

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for NotifyError {}

pub type NotifyResult = Result<(), NotifyError>;

/// Outbound messaging boundary (mail, SMS, whatever the deployment
/// wires in). Each method may fail independently.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_created(&self, reservation: &Reservation) -> NotifyResult;
    async fn booking_cancelled(&self, reservation: &Reservation) -> NotifyResult;
    async fn reminder(&self, reservation: &Reservation, kind: ReminderKind) -> NotifyResult;
}

/// Default wiring: log what a real sender would deliver.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn booking_created(&self, reservation: &Reservation) -> NotifyResult {
        info!(
            "booking created notice for {} (telescope {}, starts {})",
            reservation.id, reservation.telescope_id, reservation.window.start
        );
        Ok(())
    }

    async fn booking_cancelled(&self, reservation: &Reservation) -> NotifyResult {
        info!(
            "booking cancelled notice for {} (telescope {})",
            reservation.id, reservation.telescope_id
        );
        Ok(())
    }

    async fn reminder(&self, reservation: &Reservation, kind: ReminderKind) -> NotifyResult {
        info!(
            "{} reminder for {} (starts {})",
            kind.as_str(),
            reservation.id,
            reservation.window.start
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use ulid::Ulid;

    use super::*;

    /// Records every delivery and can be told to fail, globally or for
    /// specific reservations.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        pub created: Mutex<Vec<Ulid>>,
        pub cancelled: Mutex<Vec<Ulid>>,
        pub reminders: Mutex<Vec<(Ulid, ReminderKind)>>,
        fail_all: AtomicBool,
        fail_for: Mutex<HashSet<Ulid>>,
    }

    impl RecordingNotifier {
        pub fn set_fail_all(&self, fail: bool) {
            self.fail_all.store(fail, Ordering::SeqCst);
        }

        pub fn fail_for(&self, id: Ulid) {
            self.fail_for.lock().unwrap().insert(id);
        }

        pub fn clear_failures(&self) {
            self.fail_all.store(false, Ordering::SeqCst);
            self.fail_for.lock().unwrap().clear();
        }

        pub fn reminder_count(&self) -> usize {
            self.reminders.lock().unwrap().len()
        }

        pub fn reminded(&self, id: Ulid, kind: ReminderKind) -> bool {
            self.reminders.lock().unwrap().contains(&(id, kind))
        }

        fn check(&self, id: Ulid) -> NotifyResult {
            if self.fail_all.load(Ordering::SeqCst) || self.fail_for.lock().unwrap().contains(&id) {
                return Err(NotifyError(format!("synthetic delivery failure for {id}")));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn booking_created(&self, reservation: &Reservation) -> NotifyResult {
            self.check(reservation.id)?;
            self.created.lock().unwrap().push(reservation.id);
            Ok(())
        }

        async fn booking_cancelled(&self, reservation: &Reservation) -> NotifyResult {
            self.check(reservation.id)?;
            self.cancelled.lock().unwrap().push(reservation.id);
            Ok(())
        }

        async fn reminder(&self, reservation: &Reservation, kind: ReminderKind) -> NotifyResult {
            self.check(reservation.id)?;
            self.reminders.lock().unwrap().push((reservation.id, kind));
            Ok(())
        }
    }
}
