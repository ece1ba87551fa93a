use std::str::FromStr;

use chrono::Duration;

use crate::engine::BookingError;

/// Scheduling policy. Defaults match the deployed system; every knob can
/// be overridden through `SKYBOOK_*` environment variables.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Minimum notice required to cancel a reservation.
    pub cancel_cutoff: Duration,
    /// UTC hour at which the daily reminder sweep fires.
    pub daily_fire_hour: u32,
    /// Period of the imminent reminder sweep.
    pub imminent_period: std::time::Duration,
    /// Lower bound of the minutes-until-start window the imminent sweep
    /// selects.
    pub imminent_window_min: Duration,
    /// Upper bound of the same window. The window width must be at least
    /// `imminent_period`, otherwise bookings can fall between two sweeps.
    pub imminent_window_max: Duration,
    /// Upper bound on a single notification attempt inside a sweep.
    pub notify_timeout: std::time::Duration,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            cancel_cutoff: Duration::hours(2),
            daily_fire_hour: 10,
            imminent_period: std::time::Duration::from_secs(30 * 60),
            imminent_window_min: Duration::minutes(90),
            imminent_window_max: Duration::minutes(120),
            notify_timeout: std::time::Duration::from_secs(10),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

impl BookingConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(h) = env_parse::<i64>("SKYBOOK_CANCEL_CUTOFF_HOURS") {
            cfg.cancel_cutoff = Duration::hours(h);
        }
        if let Some(h) = env_parse::<u32>("SKYBOOK_DAILY_REMINDER_HOUR") {
            cfg.daily_fire_hour = h;
        }
        if let Some(m) = env_parse::<u64>("SKYBOOK_IMMINENT_PERIOD_MINUTES") {
            cfg.imminent_period = std::time::Duration::from_secs(m * 60);
        }
        if let Some(m) = env_parse::<i64>("SKYBOOK_IMMINENT_WINDOW_MIN_MINUTES") {
            cfg.imminent_window_min = Duration::minutes(m);
        }
        if let Some(m) = env_parse::<i64>("SKYBOOK_IMMINENT_WINDOW_MAX_MINUTES") {
            cfg.imminent_window_max = Duration::minutes(m);
        }
        if let Some(s) = env_parse::<u64>("SKYBOOK_NOTIFY_TIMEOUT_SECONDS") {
            cfg.notify_timeout = std::time::Duration::from_secs(s);
        }
        cfg
    }

    /// Reject configurations that would silently skip bookings.
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.cancel_cutoff < Duration::zero() {
            return Err(BookingError::InvalidConfig("cancel cutoff must not be negative"));
        }
        if self.daily_fire_hour > 23 {
            return Err(BookingError::InvalidConfig("daily fire hour must be 0-23"));
        }
        if self.imminent_window_max <= self.imminent_window_min {
            return Err(BookingError::InvalidConfig(
                "imminent window max must exceed its min",
            ));
        }
        // A window narrower than the sweep period leaves gaps: a booking
        // can enter and leave the window entirely between two sweeps.
        let width = self.imminent_window_max - self.imminent_window_min;
        let period = Duration::from_std(self.imminent_period)
            .map_err(|_| BookingError::InvalidConfig("imminent period out of range"))?;
        if width < period {
            return Err(BookingError::InvalidConfig(
                "imminent window width must cover the sweep period",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        BookingConfig::default().validate().unwrap();
    }

    #[test]
    fn default_values() {
        let cfg = BookingConfig::default();
        assert_eq!(cfg.cancel_cutoff, Duration::hours(2));
        assert_eq!(cfg.daily_fire_hour, 10);
        assert_eq!(cfg.imminent_period.as_secs(), 1800);
        assert_eq!(cfg.imminent_window_min, Duration::minutes(90));
        assert_eq!(cfg.imminent_window_max, Duration::minutes(120));
    }

    #[test]
    fn window_narrower_than_period_rejected() {
        let cfg = BookingConfig {
            imminent_period: std::time::Duration::from_secs(45 * 60),
            ..BookingConfig::default()
        };
        // 30 minute window, 45 minute period: bookings can be skipped.
        assert!(matches!(
            cfg.validate(),
            Err(BookingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn window_equal_to_period_accepted() {
        let cfg = BookingConfig {
            imminent_period: std::time::Duration::from_secs(30 * 60),
            ..BookingConfig::default()
        };
        cfg.validate().unwrap();
    }

    #[test]
    fn inverted_window_rejected() {
        let cfg = BookingConfig {
            imminent_window_min: Duration::minutes(120),
            imminent_window_max: Duration::minutes(90),
            ..BookingConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn out_of_range_fire_hour_rejected() {
        let cfg = BookingConfig {
            daily_fire_hour: 24,
            ..BookingConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
