use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::features::wizard::schemas::{Availability, AvailabilityOverride, MAX_NUMERIC_VALUE};

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
pub enum DateAction {
    Block,
    Unblock,
    Price,
}

impl Availability {
    /// Writes one override per date; an existing override for the same date
    /// is replaced. Special prices are capped like any other money field.
    pub fn apply(&mut self, dates: &[NaiveDate], action: DateAction, special_price: Option<f64>) {
        let special_price = special_price
            .filter(|price| price.is_finite() && *price > 0.0)
            .map(|price| price.min(MAX_NUMERIC_VALUE));

        for date in dates {
            let entry = match action {
                DateAction::Block => AvailabilityOverride {
                    date: *date,
                    is_available: false,
                    special_price: None,
                },
                DateAction::Unblock => AvailabilityOverride {
                    date: *date,
                    is_available: true,
                    special_price: None,
                },
                DateAction::Price => AvailabilityOverride {
                    date: *date,
                    is_available: true,
                    special_price,
                },
            };

            match self
                .overrides
                .binary_search_by(|existing| existing.date.cmp(date))
            {
                Ok(index) => self.overrides[index] = entry,
                Err(index) => self.overrides.insert(index, entry),
            }
        }
    }

    pub fn override_for(&self, date: NaiveDate) -> Option<&AvailabilityOverride> {
        self.overrides
            .binary_search_by(|existing| existing.date.cmp(&date))
            .ok()
            .map(|index| &self.overrides[index])
    }

    pub fn is_blocked(&self, date: NaiveDate) -> bool {
        match self.override_for(date) {
            Some(entry) => !entry.is_available,
            None => !self.default_availability,
        }
    }

    pub fn special_price(&self, date: NaiveDate) -> Option<f64> {
        self.override_for(date).and_then(|entry| entry.special_price)
    }

    pub fn set_default(&mut self, available: bool) {
        self.default_availability = available;
    }

    pub fn toggle_default(&mut self) {
        self.default_availability = !self.default_availability;
    }

    pub fn reset(&mut self) {
        self.overrides.clear();
        self.default_availability = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    #[test]
    fn last_write_wins_per_date() {
        let mut availability = Availability::default();
        availability.apply(&[day(3), day(1)], DateAction::Block, None);
        availability.apply(&[day(1)], DateAction::Price, Some(80.0));

        assert_eq!(availability.overrides.len(), 2);
        assert_eq!(availability.overrides[0].date, day(1));
        assert!(!availability.is_blocked(day(1)));
        assert_eq!(availability.special_price(day(1)), Some(80.0));
        assert!(availability.is_blocked(day(3)));
    }

    #[test]
    fn overrides_stay_sorted_and_unique() {
        let mut availability = Availability::default();
        availability.apply(&[day(9), day(2), day(5)], DateAction::Block, None);
        availability.apply(&[day(5), day(2)], DateAction::Unblock, None);

        let dates: Vec<_> = availability.overrides.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![day(2), day(5), day(9)]);
    }

    #[test]
    fn non_positive_special_price_is_dropped() {
        let mut availability = Availability::default();
        availability.apply(&[day(4)], DateAction::Price, Some(0.0));
        assert_eq!(availability.special_price(day(4)), None);
        assert!(!availability.is_blocked(day(4)));
    }

    #[test]
    fn special_price_is_capped() {
        let mut availability = Availability::default();
        availability.apply(&[day(6)], DateAction::Price, Some(1e12));
        assert_eq!(availability.special_price(day(6)), Some(MAX_NUMERIC_VALUE));
    }

    #[test]
    fn default_applies_to_dates_without_override() {
        let mut availability = Availability::default();
        availability.apply(&[day(10)], DateAction::Unblock, None);
        availability.toggle_default();

        assert!(availability.is_blocked(day(11)));
        assert!(!availability.is_blocked(day(10)));

        availability.reset();
        assert!(availability.overrides.is_empty());
        assert!(!availability.is_blocked(day(11)));
    }
}
