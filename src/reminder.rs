use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::engine::{BookingError, Engine};
use crate::model::{ReminderKind, Reservation};
use crate::observability;

/// What one sweep did. Failed items keep their flag unset and come back
/// on a later sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub selected: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Recurring reminder process: a daily sweep for next-day bookings and a
/// short-period sweep for bookings about to start. Owns its lifecycle so
/// embedders start and stop it explicitly, and tests call the sweep
/// methods directly instead of waiting on timers.
pub struct ReminderScheduler {
    engine: Arc<Engine>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
}

impl ReminderScheduler {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            shutdown: Mutex::new(None),
        }
    }

    /// Spawn the two timer tasks. Validates the sweep configuration
    /// first; a second call while running is a no-op.
    pub fn start(&self) -> Result<(), BookingError> {
        self.engine.config().validate()?;

        let mut guard = self.shutdown.lock().expect("scheduler lock poisoned");
        if guard.is_some() {
            return Ok(());
        }
        let (tx, rx) = watch::channel(false);
        *guard = Some(tx);

        tokio::spawn(run_daily_loop(self.engine.clone(), rx.clone()));
        tokio::spawn(run_imminent_loop(self.engine.clone(), rx));
        info!("reminder scheduler started");
        Ok(())
    }

    /// Signal both loops to exit. A sweep already in progress finishes
    /// its current pass first; nothing is interrupted mid-notification.
    pub fn stop(&self) {
        let sender = self.shutdown.lock().expect("scheduler lock poisoned").take();
        if let Some(tx) = sender {
            let _ = tx.send(true);
            info!("reminder scheduler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown
            .lock()
            .expect("scheduler lock poisoned")
            .is_some()
    }

    /// One pass of the daily sweep: everything starting tomorrow that
    /// has not been reminded yet.
    pub async fn run_daily_sweep(&self) -> SweepStats {
        let now = self.engine.now();
        let due = self.engine.due_daily_reminders(now).await;
        run_sweep(&self.engine, due, ReminderKind::Daily).await
    }

    /// One pass of the imminent sweep: everything starting inside the
    /// configured minutes-until-start window.
    pub async fn run_imminent_sweep(&self) -> SweepStats {
        let now = self.engine.now();
        let due = self.engine.due_imminent_reminders(now).await;
        run_sweep(&self.engine, due, ReminderKind::Imminent).await
    }
}

/// Deliver reminders for the selected reservations. Per-item isolation:
/// a failure or timeout is logged, the flag stays unset, and the sweep
/// moves on to the next item.
async fn run_sweep(engine: &Engine, due: Vec<Reservation>, kind: ReminderKind) -> SweepStats {
    let started = std::time::Instant::now();
    let mut stats = SweepStats {
        selected: due.len(),
        ..SweepStats::default()
    };

    for reservation in &due {
        if !deliver(engine, reservation, kind).await {
            stats.failed += 1;
            metrics::counter!(observability::REMINDER_FAILURES_TOTAL, "kind" => kind.as_str())
                .increment(1);
            continue;
        }
        match engine.store.mark_reminder_sent(&reservation.id, kind).await {
            Ok(true) => {
                stats.sent += 1;
                metrics::counter!(observability::REMINDERS_SENT_TOTAL, "kind" => kind.as_str())
                    .increment(1);
            }
            // Lost a race with a terminal transition or another sweep;
            // the selection predicate keeps this harmless.
            Ok(false) => debug!("sweep skip {}: flag already settled", reservation.id),
            Err(e) => warn!("sweep could not persist flag for {}: {e}", reservation.id),
        }
    }

    metrics::histogram!(observability::SWEEP_DURATION_SECONDS, "kind" => kind.as_str())
        .record(started.elapsed().as_secs_f64());
    if stats.sent > 0 {
        info!("{} sweep sent {} reminders", kind.as_str(), stats.sent);
    }
    stats
}

/// Attempt one notification, bounded by the configured timeout so a slow
/// sender cannot stall the rest of the sweep.
async fn deliver(engine: &Engine, reservation: &Reservation, kind: ReminderKind) -> bool {
    let attempt = tokio::time::timeout(
        engine.config().notify_timeout,
        engine.notifier().reminder(reservation, kind),
    )
    .await;
    match attempt {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!("{} reminder failed for {}: {e}", kind.as_str(), reservation.id);
            false
        }
        Err(_) => {
            warn!("{} reminder timed out for {}", kind.as_str(), reservation.id);
            false
        }
    }
}

/// Sleep until the configured fire hour, sweep, repeat.
async fn run_daily_loop(engine: Arc<Engine>, mut shutdown: watch::Receiver<bool>) {
    loop {
        let wait = duration_until_hour(engine.now(), engine.config().daily_fire_hour);
        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                let now = engine.now();
                let due = engine.due_daily_reminders(now).await;
                run_sweep(&engine, due, ReminderKind::Daily).await;
            }
            _ = shutdown.changed() => return,
        }
    }
}

async fn run_imminent_loop(engine: Arc<Engine>, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(engine.config().imminent_period);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = engine.now();
                let due = engine.due_imminent_reminders(now).await;
                run_sweep(&engine, due, ReminderKind::Imminent).await;
            }
            _ = shutdown.changed() => return,
        }
    }
}

/// Wall-clock delay until the next occurrence of `hour:00` UTC.
fn duration_until_hour(now: DateTime<Utc>, hour: u32) -> std::time::Duration {
    let fire_time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date_naive().and_time(fire_time).and_utc();
    let fire = if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    };
    (fire - now).to_std().unwrap_or_default()
}
