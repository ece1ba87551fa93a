use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use ulid::Ulid;

use crate::model::{Reservation, ReservationStatus};

const CHANNEL_CAPACITY: usize = 256;

/// Real-time fan-out payloads, one channel per telescope. Fire and
/// forget: a lagging or absent subscriber never blocks the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingEvent {
    Created {
        reservation: Reservation,
    },
    Cancelled {
        reservation: Reservation,
    },
    StatusChanged {
        reservation: Reservation,
        previous: ReservationStatus,
    },
}

impl BookingEvent {
    /// Channel event name, matching what the embedding layer emits.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "booking-created",
            Self::Cancelled { .. } => "booking-cancelled",
            Self::StatusChanged { .. } => "booking-updated",
        }
    }

    /// JSON payload for transports that do not speak the native type.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Broadcast hub keyed by telescope.
pub struct EventHub {
    channels: DashMap<Ulid, broadcast::Sender<BookingEvent>>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to a telescope's events. Creates the channel if needed.
    pub fn subscribe(&self, telescope_id: Ulid) -> broadcast::Receiver<BookingEvent> {
        let sender = self
            .channels
            .entry(telescope_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Publish an event. No-op if nobody is listening.
    pub fn publish(&self, telescope_id: Ulid, event: &BookingEvent) {
        if let Some(sender) = self.channels.get(&telescope_id) {
            let _ = sender.send(event.clone());
        }
    }

    /// Drop a telescope's channel (e.g. after decommissioning).
    pub fn remove(&self, telescope_id: &Ulid) {
        self.channels.remove(telescope_id);
    }
}
