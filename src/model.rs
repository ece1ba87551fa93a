use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(start < end, "Window start must be before end");
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Window) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

/// Reservation lifecycle. `Cancelled` and `Completed` are terminal:
/// once reached, neither status nor reminder flags may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    /// Active reservations occupy their slot and receive reminders.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// The only legal moves: pending <-> confirmed, and either of those
    /// into cancelled or completed. Terminal states have no exits.
    pub fn can_transition_to(&self, next: Self) -> bool {
        match (self, next) {
            (Self::Pending, Self::Confirmed) | (Self::Confirmed, Self::Pending) => true,
            (Self::Pending | Self::Confirmed, Self::Cancelled | Self::Completed) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two reminder types a reservation receives, each at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Daily,
    Imminent,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Imminent => "imminent",
        }
    }
}

/// Who is asking for an administrative operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    User,
    Admin,
}

/// A booked observation session on one telescope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Ulid,
    pub telescope_id: Ulid,
    pub owner_id: Ulid,
    pub window: Window,
    pub purpose: String,
    pub notes: Option<String>,
    pub status: ReservationStatus,
    pub daily_reminder_sent: bool,
    pub imminent_reminder_sent: bool,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(
        telescope_id: Ulid,
        owner_id: Ulid,
        window: Window,
        purpose: String,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Ulid::new(),
            telescope_id,
            owner_id,
            window,
            purpose,
            notes,
            status: ReservationStatus::Pending,
            daily_reminder_sent: false,
            imminent_reminder_sent: false,
            created_at,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn reminder_sent(&self, kind: ReminderKind) -> bool {
        match kind {
            ReminderKind::Daily => self.daily_reminder_sent,
            ReminderKind::Imminent => self.imminent_reminder_sent,
        }
    }
}

/// One slot in a telescope's nightly template, as an offset from the
/// anchor date's midnight. Offsets of 1440 or more land on the next
/// calendar day (the 00:00-06:00 tail of an observing night).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOffset {
    pub start_offset_min: i64,
    pub duration_min: i64,
}

/// The standard observing night: twelve one-hour slots from 18:00
/// through 06:00 the following morning.
pub fn default_night_template() -> Vec<SlotOffset> {
    (0..12)
        .map(|i| SlotOffset {
            start_offset_min: 18 * 60 + i * 60,
            duration_min: 60,
        })
        .collect()
}

/// A bookable instrument. Administered outside the scheduling core;
/// the core only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Telescope {
    pub id: Ulid,
    pub name: String,
    pub location: Option<String>,
    pub active: bool,
    pub slot_template: Vec<SlotOffset>,
}

impl Telescope {
    /// A telescope with the standard night template, active by default.
    pub fn new(id: Ulid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            location: None,
            active: true,
            slot_template: default_night_template(),
        }
    }
}

/// A concrete, date-anchored slot as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub window: Window,
    pub label: String,
}
