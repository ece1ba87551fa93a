use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::model::{SlotOffset, TimeSlot, Window};

// ── Availability Algorithm ────────────────────────────────────────

/// Anchor a slot template to a calendar date. Offsets are minutes from
/// that date's midnight UTC, so offsets of 1440+ land on the following
/// day without special casing. Template order is preserved.
pub fn materialize_template(template: &[SlotOffset], date: NaiveDate) -> Vec<TimeSlot> {
    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    template
        .iter()
        .map(|slot| {
            let start = midnight + Duration::minutes(slot.start_offset_min);
            let end = start + Duration::minutes(slot.duration_min);
            TimeSlot {
                window: Window::new(start, end),
                label: format!("{} - {}", start.format("%H:%M"), end.format("%H:%M")),
            }
        })
        .collect()
}

/// Keep slots that start strictly after `now` and overlap none of the
/// occupied windows (same half-open test the store uses to reject
/// conflicting creates).
pub fn filter_available(
    slots: Vec<TimeSlot>,
    occupied: &[Window],
    now: DateTime<Utc>,
) -> Vec<TimeSlot> {
    slots
        .into_iter()
        .filter(|slot| slot.window.start > now)
        .filter(|slot| !occupied.iter().any(|w| w.overlaps(&slot.window)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::default_night_template;
    use chrono::TimeZone;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, m, 0).unwrap()
    }

    #[test]
    fn template_anchors_to_date() {
        let slots = materialize_template(&default_night_template(), date());
        assert_eq!(slots.len(), 12);
        assert_eq!(slots[0].window.start, at(2, 18, 0));
        assert_eq!(slots[0].window.end, at(2, 19, 0));
        assert_eq!(slots[0].label, "18:00 - 19:00");
    }

    #[test]
    fn offsets_past_midnight_roll_to_next_day() {
        let slots = materialize_template(&default_night_template(), date());
        // Slot 6 is the first after midnight: 00:00 on January 3rd.
        assert_eq!(slots[6].window.start, at(3, 0, 0));
        assert_eq!(slots[6].label, "00:00 - 01:00");
        assert_eq!(slots[11].window.start, at(3, 5, 0));
        assert_eq!(slots[11].window.end, at(3, 6, 0));
    }

    #[test]
    fn template_order_preserved() {
        let slots = materialize_template(&default_night_template(), date());
        for pair in slots.windows(2) {
            assert!(pair[0].window.start < pair[1].window.start);
        }
    }

    #[test]
    fn occupied_slot_filtered_out() {
        let slots = materialize_template(&default_night_template(), date());
        let occupied = vec![Window::new(at(2, 18, 0), at(2, 19, 0))];
        let free = filter_available(slots, &occupied, at(2, 12, 0));
        assert_eq!(free.len(), 11);
        assert_eq!(free[0].window.start, at(2, 19, 0));
    }

    #[test]
    fn partial_overlap_blocks_slot() {
        let slots = materialize_template(&default_night_template(), date());
        // 18:30-19:30 straddles two template slots; both are blocked.
        let occupied = vec![Window::new(at(2, 18, 30), at(2, 19, 30))];
        let free = filter_available(slots, &occupied, at(2, 12, 0));
        assert_eq!(free.len(), 10);
        assert_eq!(free[0].window.start, at(2, 20, 0));
    }

    #[test]
    fn past_slots_filtered_out() {
        let slots = materialize_template(&default_night_template(), date());
        // At 20:30 the 18, 19 and 20 o'clock slots have already started.
        let free = filter_available(slots, &[], at(2, 20, 30));
        assert_eq!(free.len(), 9);
        assert_eq!(free[0].window.start, at(2, 21, 0));
    }

    #[test]
    fn slot_starting_exactly_now_is_past() {
        let slots = materialize_template(&default_night_template(), date());
        let free = filter_available(slots, &[], at(2, 18, 0));
        // Strictly-after test: the 18:00 slot is gone.
        assert_eq!(free.len(), 11);
        assert_eq!(free[0].window.start, at(2, 19, 0));
    }

    #[test]
    fn no_reservations_all_future_slots_free() {
        let slots = materialize_template(&default_night_template(), date());
        let free = filter_available(slots.clone(), &[], at(2, 12, 0));
        assert_eq!(free, slots);
    }

    #[test]
    fn fully_booked_night_is_empty_not_error() {
        let slots = materialize_template(&default_night_template(), date());
        let occupied: Vec<Window> = slots.iter().map(|s| s.window).collect();
        let free = filter_available(slots, &occupied, at(2, 12, 0));
        assert!(free.is_empty());
    }

    #[test]
    fn empty_template_empty_slots() {
        assert!(materialize_template(&[], date()).is_empty());
    }
}
