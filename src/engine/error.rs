use ulid::Ulid;

use crate::model::ReservationStatus;

#[derive(Debug)]
pub enum BookingError {
    /// End not after start.
    InvalidWindow,
    /// Start time not strictly in the future.
    PastBooking,
    InvalidPurpose { len: usize },
    InvalidNotes { len: usize },
    /// Telescope absent or deactivated.
    ResourceUnavailable(Ulid),
    NotFound(Ulid),
    AlreadyExists(Ulid),
    /// Window overlaps the named existing reservation.
    Conflict(Ulid),
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },
    /// Cancellation requested on an already cancelled/completed booking.
    AlreadyTerminal(ReservationStatus),
    /// Cancellation requested inside the notice window. Carries the
    /// threshold so callers can explain it.
    CutoffExceeded { min_notice_hours: i64 },
    AdminRequired,
    InvalidConfig(&'static str),
    LimitExceeded(&'static str),
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::InvalidWindow => write!(f, "end time must be after start time"),
            BookingError::PastBooking => write!(f, "cannot book a slot in the past"),
            BookingError::InvalidPurpose { len } => {
                write!(f, "purpose must be 10-500 characters, got {len}")
            }
            BookingError::InvalidNotes { len } => {
                write!(f, "notes must be at most 1000 characters, got {len}")
            }
            BookingError::ResourceUnavailable(id) => {
                write!(f, "telescope not available: {id}")
            }
            BookingError::NotFound(id) => write!(f, "not found: {id}"),
            BookingError::AlreadyExists(id) => write!(f, "already exists: {id}"),
            BookingError::Conflict(id) => {
                write!(f, "time slot already booked by reservation: {id}")
            }
            BookingError::InvalidTransition { from, to } => {
                write!(f, "illegal status transition: {from} -> {to}")
            }
            BookingError::AlreadyTerminal(status) => {
                write!(f, "booking is already {status}")
            }
            BookingError::CutoffExceeded { min_notice_hours } => {
                write!(
                    f,
                    "cannot cancel less than {min_notice_hours} hours before start"
                )
            }
            BookingError::AdminRequired => write!(f, "admin role required"),
            BookingError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            BookingError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for BookingError {}
