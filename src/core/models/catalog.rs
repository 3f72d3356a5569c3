//! Unit catalogue

use super::Unit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The set of units a plan may draw from, indexed by unit code
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitCatalog {
    units: BTreeMap<String, Unit>,
}

impl UnitCatalog {
    /// Create a new empty catalogue
    #[must_use]
    pub const fn new() -> Self {
        Self {
            units: BTreeMap::new(),
        }
    }

    /// Add a unit to the catalogue
    ///
    /// # Returns
    /// `true` if the unit was added, `false` if a unit with that code already exists
    pub fn add(&mut self, unit: Unit) -> bool {
        if self.units.contains_key(&unit.code) {
            return false;
        }
        self.units.insert(unit.code.clone(), unit);
        true
    }

    /// Get a unit by code
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Unit> {
        self.units.get(code)
    }

    /// Whether the catalogue contains a unit
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.units.contains_key(code)
    }

    /// Number of units
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the catalogue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterate over units in code order
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Credit points for a unit, zero when unknown
    #[must_use]
    pub fn credit_points(&self, code: &str) -> u32 {
        self.get(code).map_or(0, |u| u.credit_points)
    }

    /// Largest credit-point value of any unit in the catalogue
    #[must_use]
    pub fn max_credit_points(&self) -> u32 {
        self.units
            .values()
            .map(|u| u.credit_points)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut catalog = UnitCatalog::new();
        assert!(catalog.add(Unit::new("CAB201".to_string(), "Programming".to_string())));
        assert!(!catalog.add(Unit::new("CAB201".to_string(), "Duplicate".to_string())));

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("CAB201").map(|u| u.title.as_str()), Some("Programming"));
        assert!(catalog.get("CAB202").is_none());
    }

    #[test]
    fn test_credit_points() {
        let mut catalog = UnitCatalog::new();
        catalog.add(Unit::new("CAB201".to_string(), "Programming".to_string()));
        catalog.add(
            Unit::new("IFN711".to_string(), "Capstone".to_string()).with_credit_points(24),
        );

        assert_eq!(catalog.credit_points("CAB201"), 12);
        assert_eq!(catalog.credit_points("NOPE"), 0);
        assert_eq!(catalog.max_credit_points(), 24);
    }

    #[test]
    fn test_iter_in_code_order() {
        let mut catalog = UnitCatalog::new();
        catalog.add(Unit::new("CAB302".to_string(), "B".to_string()));
        catalog.add(Unit::new("CAB201".to_string(), "A".to_string()));

        let codes: Vec<_> = catalog.iter().map(|u| u.code.as_str()).collect();
        assert_eq!(codes, vec!["CAB201", "CAB302"]);
    }
}
