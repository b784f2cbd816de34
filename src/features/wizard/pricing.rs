use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::features::wizard::{
    schemas::{MAX_NUMERIC_VALUE, Pricing},
    units::parse_numeric,
};

#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
pub enum PricingField {
    PricePerHour,
    PricePerDay,
    MinimumHours,
    DiscountWeekly,
    DiscountMonthly,
}

enum FieldKind {
    Money,
    Percentage,
    WholeNumber,
}

impl PricingField {
    pub const ALL: [PricingField; 5] = [
        PricingField::PricePerHour,
        PricingField::PricePerDay,
        PricingField::MinimumHours,
        PricingField::DiscountWeekly,
        PricingField::DiscountMonthly,
    ];

    fn kind(&self) -> FieldKind {
        match self {
            Self::PricePerHour | Self::PricePerDay => FieldKind::Money,
            Self::DiscountWeekly | Self::DiscountMonthly => FieldKind::Percentage,
            Self::MinimumHours => FieldKind::WholeNumber,
        }
    }

    pub fn read(&self, pricing: &Pricing) -> f64 {
        match self {
            Self::PricePerHour => pricing.price_per_hour,
            Self::PricePerDay => pricing.price_per_day,
            Self::MinimumHours => f64::from(pricing.minimum_hours),
            Self::DiscountWeekly => pricing.discount_weekly,
            Self::DiscountMonthly => pricing.discount_monthly,
        }
    }

    fn write(&self, pricing: &mut Pricing, value: f64) {
        match self {
            Self::PricePerHour => pricing.price_per_hour = value,
            Self::PricePerDay => pricing.price_per_day = value,
            Self::MinimumHours => pricing.minimum_hours = value as u32,
            Self::DiscountWeekly => pricing.discount_weekly = value,
            Self::DiscountMonthly => pricing.discount_monthly = value,
        }
    }

    /// Bounds a parsed keystroke to what the field can hold.
    pub fn bound(&self, value: f64) -> f64 {
        match self.kind() {
            FieldKind::Money => value.min(MAX_NUMERIC_VALUE),
            FieldKind::Percentage => value.min(100.0),
            FieldKind::WholeNumber => value.round().min(f64::from(u32::MAX)),
        }
    }

    pub fn format(&self, value: f64) -> String {
        if value == 0.0 {
            return String::new();
        }
        match self.kind() {
            FieldKind::WholeNumber => format!("{}", value.round() as u64),
            FieldKind::Money | FieldKind::Percentage => {
                let fixed = format!("{value:.2}");
                fixed.trim_end_matches('0').trim_end_matches('.').to_string()
            }
        }
    }
}

/// The strings currently shown in the pricing inputs.
#[derive(Serialize, PartialEq, Eq, Default, Clone, Debug)]
#[serde(transparent)]
pub struct PricingInputs(BTreeMap<PricingField, String>);

impl PricingInputs {
    pub fn from_form(pricing: &Pricing) -> Self {
        let mut inputs = Self::default();
        for field in PricingField::ALL {
            inputs.blur(pricing, field);
        }
        inputs
    }

    pub fn display(&self, field: PricingField) -> &str {
        self.0.get(&field).map(String::as_str).unwrap_or_default()
    }

    pub fn input(&mut self, pricing: &mut Pricing, field: PricingField, raw: &str) -> Option<f64> {
        self.0.insert(field, raw.to_string());

        let value = field.bound(parse_numeric(raw)?);
        field.write(pricing, value);
        Some(value)
    }

    pub fn blur(&mut self, pricing: &Pricing, field: PricingField) {
        self.0.insert(field, field.format(field.read(pricing)));
    }
}
