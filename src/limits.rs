//! Hard input bounds. Policy knobs that may vary per deployment live in
//! [`crate::config::BookingConfig`] instead.

pub const MIN_PURPOSE_LEN: usize = 10;
pub const MAX_PURPOSE_LEN: usize = 500;
pub const MAX_NOTES_LEN: usize = 1000;

pub const MAX_NAME_LEN: usize = 256;
pub const MAX_TELESCOPES: usize = 1024;
pub const MAX_TEMPLATE_SLOTS: usize = 64;

pub const MAX_RESERVATIONS_PER_TELESCOPE: usize = 100_000;
