use dashmap::DashMap;
use ulid::Ulid;

use crate::limits::*;
use crate::model::{SlotOffset, Telescope};

use super::BookingError;

/// Catalog of bookable telescopes. The scheduling paths only read it;
/// mutation is reserved for administrative callers.
pub struct TelescopeRegistry {
    telescopes: DashMap<Ulid, Telescope>,
}

impl Default for TelescopeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_template(template: &[SlotOffset]) -> Result<(), BookingError> {
    if template.len() > MAX_TEMPLATE_SLOTS {
        return Err(BookingError::LimitExceeded("too many template slots"));
    }
    if template.iter().any(|s| s.duration_min <= 0) {
        return Err(BookingError::LimitExceeded("slot duration must be positive"));
    }
    if template.iter().any(|s| s.start_offset_min < 0) {
        return Err(BookingError::LimitExceeded("slot offset must not be negative"));
    }
    Ok(())
}

impl TelescopeRegistry {
    pub fn new() -> Self {
        Self {
            telescopes: DashMap::new(),
        }
    }

    pub fn add(&self, telescope: Telescope) -> Result<(), BookingError> {
        if self.telescopes.len() >= MAX_TELESCOPES {
            return Err(BookingError::LimitExceeded("too many telescopes"));
        }
        if telescope.name.len() > MAX_NAME_LEN {
            return Err(BookingError::LimitExceeded("telescope name too long"));
        }
        validate_template(&telescope.slot_template)?;
        if self.telescopes.contains_key(&telescope.id) {
            return Err(BookingError::AlreadyExists(telescope.id));
        }
        self.telescopes.insert(telescope.id, telescope);
        Ok(())
    }

    pub fn set_active(&self, id: &Ulid, active: bool) -> Result<(), BookingError> {
        let mut entry = self
            .telescopes
            .get_mut(id)
            .ok_or(BookingError::NotFound(*id))?;
        entry.active = active;
        Ok(())
    }

    pub fn set_template(&self, id: &Ulid, template: Vec<SlotOffset>) -> Result<(), BookingError> {
        validate_template(&template)?;
        let mut entry = self
            .telescopes
            .get_mut(id)
            .ok_or(BookingError::NotFound(*id))?;
        entry.slot_template = template;
        Ok(())
    }

    pub fn get(&self, id: &Ulid) -> Option<Telescope> {
        self.telescopes.get(id).map(|e| e.value().clone())
    }

    /// Absent and deactivated look the same to booking paths: the
    /// telescope cannot be booked.
    pub fn get_active(&self, id: &Ulid) -> Result<Telescope, BookingError> {
        match self.telescopes.get(id) {
            Some(entry) if entry.active => Ok(entry.value().clone()),
            _ => Err(BookingError::ResourceUnavailable(*id)),
        }
    }

    pub fn slot_template(&self, id: &Ulid) -> Result<Vec<SlotOffset>, BookingError> {
        self.get_active(id).map(|t| t.slot_template)
    }

    pub fn list_active(&self) -> Vec<Telescope> {
        self.telescopes
            .iter()
            .filter(|e| e.value().active)
            .map(|e| e.value().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::default_night_template;

    #[test]
    fn add_and_get_active() {
        let registry = TelescopeRegistry::new();
        let t = Telescope::new(Ulid::new(), "Celestron C14");
        let id = t.id;
        registry.add(t).unwrap();

        let fetched = registry.get_active(&id).unwrap();
        assert_eq!(fetched.name, "Celestron C14");
        assert_eq!(fetched.slot_template, default_night_template());
    }

    #[test]
    fn duplicate_id_rejected() {
        let registry = TelescopeRegistry::new();
        let t = Telescope::new(Ulid::new(), "Dobson 16");
        let id = t.id;
        registry.add(t.clone()).unwrap();
        assert!(matches!(
            registry.add(t),
            Err(BookingError::AlreadyExists(got)) if got == id
        ));
    }

    #[test]
    fn inactive_is_unavailable() {
        let registry = TelescopeRegistry::new();
        let t = Telescope::new(Ulid::new(), "Meade LX200");
        let id = t.id;
        registry.add(t).unwrap();
        registry.set_active(&id, false).unwrap();

        assert!(matches!(
            registry.get_active(&id),
            Err(BookingError::ResourceUnavailable(got)) if got == id
        ));
        // Still visible to plain get.
        assert!(registry.get(&id).is_some());
    }

    #[test]
    fn unknown_is_unavailable() {
        let registry = TelescopeRegistry::new();
        assert!(matches!(
            registry.get_active(&Ulid::new()),
            Err(BookingError::ResourceUnavailable(_))
        ));
    }

    #[test]
    fn set_active_unknown_not_found() {
        let registry = TelescopeRegistry::new();
        assert!(matches!(
            registry.set_active(&Ulid::new(), true),
            Err(BookingError::NotFound(_))
        ));
    }

    #[test]
    fn list_active_filters_deactivated() {
        let registry = TelescopeRegistry::new();
        let a = Telescope::new(Ulid::new(), "A");
        let b = Telescope::new(Ulid::new(), "B");
        let b_id = b.id;
        registry.add(a).unwrap();
        registry.add(b).unwrap();
        registry.set_active(&b_id, false).unwrap();

        let active = registry.list_active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "A");
    }

    #[test]
    fn bad_template_rejected() {
        let registry = TelescopeRegistry::new();
        let mut t = Telescope::new(Ulid::new(), "Refractor");
        t.slot_template = vec![SlotOffset {
            start_offset_min: 18 * 60,
            duration_min: 0,
        }];
        assert!(matches!(
            registry.add(t),
            Err(BookingError::LimitExceeded(_))
        ));
    }

    #[test]
    fn set_template_replaces() {
        let registry = TelescopeRegistry::new();
        let t = Telescope::new(Ulid::new(), "Wide field");
        let id = t.id;
        registry.add(t).unwrap();

        let template = vec![SlotOffset {
            start_offset_min: 20 * 60,
            duration_min: 120,
        }];
        registry.set_template(&id, template.clone()).unwrap();
        assert_eq!(registry.slot_template(&id).unwrap(), template);
    }
}
