//! Two-stage weighted assignment of events to rooms.
//!
//! The first roll picks a category, the second picks an event name inside
//! that category. Both rolls are cumulative with an inclusive lower bound.

use crate::env::{RngOracle, pick_weighted, total_weight};

/// An event name with its weight inside a category.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightedName {
    pub name: String,
    pub weight: u32,
}

impl WeightedName {
    pub fn new(name: impl Into<String>, weight: u32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// One category of the first-stage roll.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryTable {
    pub category: String,
    pub weight: u32,
    pub events: Vec<WeightedName>,
}

impl CategoryTable {
    pub fn new(category: impl Into<String>, weight: u32, events: Vec<WeightedName>) -> Self {
        Self {
            category: category.into(),
            weight,
            events,
        }
    }

    pub fn total_weight(&self) -> u32 {
        total_weight(&self.events, |entry| entry.weight)
    }
}

/// Room assignment table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssignmentTable {
    pub categories: Vec<CategoryTable>,
}

impl AssignmentTable {
    pub fn new(categories: Vec<CategoryTable>) -> Self {
        Self { categories }
    }

    pub fn total_weight(&self) -> u32 {
        total_weight(&self.categories, |category| category.weight)
    }

    /// Pure two-stage pick for the given rolls.
    ///
    /// `category_roll` must be below [`total_weight`](Self::total_weight)
    /// and `event_roll` below the chosen category's total.
    pub fn pick(&self, category_roll: u32, event_roll: u32) -> Option<(&CategoryTable, &str)> {
        let category = pick_weighted(&self.categories, |c| c.weight, category_roll)?;
        let event = pick_weighted(&category.events, |e| e.weight, event_roll)?;
        Some((category, event.name.as_str()))
    }

    pub fn category(&self, category_roll: u32) -> Option<&CategoryTable> {
        pick_weighted(&self.categories, |c| c.weight, category_roll)
    }

    /// Rolls both stages with the given seeds.
    pub fn roll<R>(&self, rng: &R, category_seed: u64, event_seed: u64) -> Option<&str>
    where
        R: RngOracle + ?Sized,
    {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }
        let category = self.category(rng.below(category_seed, total))?;
        let total = category.total_weight();
        if total == 0 {
            return None;
        }
        let event = pick_weighted(&category.events, |e| e.weight, rng.below(event_seed, total))?;
        Some(event.name.as_str())
    }
}

impl Default for AssignmentTable {
    fn default() -> Self {
        Self::new(vec![
            CategoryTable::new("quartz", 100_000, vec![WeightedName::new("Quartz", 100)]),
            CategoryTable::new(
                "encounter",
                45,
                vec![
                    WeightedName::new("Copper", 40),
                    WeightedName::new("Bronze", 30),
                    WeightedName::new("Silver", 20),
                    WeightedName::new("Iron", 10),
                ],
            ),
            CategoryTable::new(
                "good_omen",
                30,
                vec![
                    WeightedName::new("Emerald", 40),
                    WeightedName::new("Gold", 60),
                ],
            ),
            CategoryTable::new(
                "bad_omen",
                15,
                vec![
                    WeightedName::new("Rhinestone", 80),
                    WeightedName::new("Amethyst", 20),
                ],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_roll_selects_the_first_category() {
        let table = AssignmentTable::default();
        let picked = table.pick(0, 0).map(|(c, e)| (c.category.as_str(), e));
        assert_eq!(picked, Some(("quartz", "Quartz")));
    }

    #[test]
    fn later_categories_start_after_the_cumulative_weight() {
        let table = AssignmentTable::default();
        assert_eq!(table.category(99_999).map(|c| c.category.as_str()), Some("quartz"));
        assert_eq!(table.category(100_000).map(|c| c.category.as_str()), Some("encounter"));
        assert_eq!(table.category(100_045).map(|c| c.category.as_str()), Some("good_omen"));
        assert_eq!(table.category(100_089).map(|c| c.category.as_str()), Some("bad_omen"));
        assert!(table.category(100_090).is_none());
    }

    #[test]
    fn second_stage_picks_inside_the_category() {
        let table = AssignmentTable::default();
        assert_eq!(table.pick(100_050, 0).map(|(_, e)| e), Some("Emerald"));
        assert_eq!(table.pick(100_050, 40).map(|(_, e)| e), Some("Gold"));
    }
}
