#![forbid(unsafe_code)]
//! Scheduling core for a shared-telescope observatory.
//!
//! Callers ask for a night's free slots, book one, and cancel with
//! enough notice; a background scheduler reminds owners before their
//! session starts. Conflict checking is atomic per telescope, so two
//! racing requests for the same window produce exactly one reservation.
//!
//! HTTP, authentication, durable storage, and real mail delivery live
//! outside this crate and plug in at the [`notify::Notifier`],
//! [`events::EventHub`], and [`clock::Clock`] boundaries.

pub mod clock;
pub mod config;
pub mod engine;
pub mod events;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
pub mod reminder;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::BookingConfig;
pub use engine::{BookingError, Engine, ReservationStore, TelescopeRegistry};
pub use events::{BookingEvent, EventHub};
pub use model::{
    ActorRole, ReminderKind, Reservation, ReservationStatus, SlotOffset, Telescope, TimeSlot,
    Window, default_night_template,
};
pub use notify::{LogNotifier, Notifier, NotifyError};
pub use reminder::{ReminderScheduler, SweepStats};
