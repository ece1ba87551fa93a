mod availability;
mod error;
mod mutations;
mod queries;
mod registry;
mod store;

pub use availability::{filter_available, materialize_template};
pub use error::BookingError;
pub use registry::TelescopeRegistry;
pub use store::{Calendar, ReservationStore, SharedCalendar};

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::clock::{Clock, SystemClock};
use crate::config::BookingConfig;
use crate::events::EventHub;
use crate::notify::{LogNotifier, Notifier};

/// The scheduling core: telescope catalog, reservation store, and the
/// outbound boundaries (notifier, fan-out, clock) everything else is
/// wired through.
pub struct Engine {
    pub registry: TelescopeRegistry,
    pub store: ReservationStore,
    pub events: Arc<EventHub>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: BookingConfig,
}

impl Engine {
    pub fn new(config: BookingConfig, clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            registry: TelescopeRegistry::new(),
            store: ReservationStore::new(),
            events: Arc::new(EventHub::new()),
            notifier,
            clock,
            config,
        }
    }

    /// System clock, log-only notifier, default policy.
    pub fn with_defaults() -> Self {
        Self::new(
            BookingConfig::default(),
            Arc::new(SystemClock),
            Arc::new(LogNotifier),
        )
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }
}
