//! Display-side handling of dimension fields.
//!
//! Dimensions are stored in square feet / feet no matter what the owner sees.
//! The metric/imperial preference only changes the strings shown in the
//! inputs; keystrokes are converted back to the stored unit before they are
//! written to the form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::features::{
    properties::models::UnitPreference, wizard::schemas::Dimensions,
};

pub const SQFT_TO_SQM: f64 = 0.092903;
pub const FT_TO_M: f64 = 0.3048;

#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
pub enum DimensionField {
    SizeSqft,
    CeilingHeightFt,
    WidthFt,
    LengthFt,
}

impl DimensionField {
    pub const ALL: [DimensionField; 4] = [
        DimensionField::SizeSqft,
        DimensionField::CeilingHeightFt,
        DimensionField::WidthFt,
        DimensionField::LengthFt,
    ];

    fn metric_factor(&self) -> f64 {
        match self {
            Self::SizeSqft => SQFT_TO_SQM,
            _ => FT_TO_M,
        }
    }

    pub fn read(&self, dimensions: &Dimensions) -> Option<f64> {
        match self {
            Self::SizeSqft => Some(dimensions.size_sqft),
            Self::CeilingHeightFt => dimensions.ceiling_height_ft,
            Self::WidthFt => dimensions.width_ft,
            Self::LengthFt => dimensions.length_ft,
        }
    }

    fn write(&self, dimensions: &mut Dimensions, value: f64) {
        match self {
            Self::SizeSqft => dimensions.size_sqft = value,
            Self::CeilingHeightFt => dimensions.ceiling_height_ft = Some(value),
            Self::WidthFt => dimensions.width_ft = Some(value),
            Self::LengthFt => dimensions.length_ft = Some(value),
        }
    }
}

/// Keeps digits and the first decimal point; later points are dropped.
pub fn sanitize_numeric(raw: &str) -> String {
    let mut seen_point = false;
    raw.chars()
        .filter(|c| {
            if c.is_ascii_digit() {
                true
            } else if *c == '.' && !seen_point {
                seen_point = true;
                true
            } else {
                false
            }
        })
        .collect()
}

/// Parses a keystroke into a finite, non-negative number.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let sanitized = sanitize_numeric(raw);
    let value = sanitized.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

pub fn to_display(stored: f64, field: DimensionField, unit: UnitPreference) -> f64 {
    match unit {
        UnitPreference::Metric => stored * field.metric_factor(),
        UnitPreference::Imperial => stored,
    }
}

pub fn from_display(shown: f64, field: DimensionField, unit: UnitPreference) -> f64 {
    match unit {
        UnitPreference::Metric => shown / field.metric_factor(),
        UnitPreference::Imperial => shown,
    }
}

pub fn format_display(stored: Option<f64>, field: DimensionField, unit: UnitPreference) -> String {
    match stored {
        Some(value) if value != 0.0 => format!("{:.2}", to_display(value, field, unit)),
        _ => String::new(),
    }
}

/// The strings currently shown in the four dimension inputs.
#[derive(Serialize, PartialEq, Eq, Default, Clone, Debug)]
#[serde(transparent)]
pub struct DimensionInputs(BTreeMap<DimensionField, String>);

impl DimensionInputs {
    pub fn from_form(dimensions: &Dimensions) -> Self {
        let mut inputs = Self::default();
        inputs.refresh(dimensions);
        inputs
    }

    pub fn display(&self, field: DimensionField) -> &str {
        self.0.get(&field).map(String::as_str).unwrap_or_default()
    }

    /// Recomputes every display string from the stored values.
    pub fn refresh(&mut self, dimensions: &Dimensions) {
        for field in DimensionField::ALL {
            self.0.insert(
                field,
                format_display(field.read(dimensions), field, dimensions.unit_preference),
            );
        }
    }

    /// Shows `raw` as typed and writes the converted value when it parses.
    /// Returns the stored value that was written, if any.
    pub fn input(
        &mut self,
        dimensions: &mut Dimensions,
        field: DimensionField,
        raw: &str,
    ) -> Option<f64> {
        self.0.insert(field, raw.to_string());

        let shown = parse_numeric(raw)?;
        let stored = from_display(shown, field, dimensions.unit_preference);
        field.write(dimensions, stored);
        Some(stored)
    }

    pub fn blur(&mut self, dimensions: &Dimensions, field: DimensionField) {
        self.0.insert(
            field,
            format_display(field.read(dimensions), field, dimensions.unit_preference),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dimensions(size_sqft: f64) -> Dimensions {
        Dimensions {
            size_sqft,
            ..Dimensions::default()
        }
    }

    #[test]
    fn sanitize_keeps_digits_and_first_point() {
        assert_eq!(sanitize_numeric("1,2a3.4.5"), "123.45");
        assert_eq!(sanitize_numeric("-12"), "12");
        assert_eq!(sanitize_numeric("abc"), "");
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("."), None);
        assert_eq!(parse_numeric("12."), Some(12.0));
    }

    #[test]
    fn toggling_units_only_changes_display() {
        let mut form = dimensions(1000.0);
        let mut inputs = DimensionInputs::from_form(&form);
        assert_eq!(inputs.display(DimensionField::SizeSqft), "92.90");

        form.unit_preference = form.unit_preference.toggled();
        inputs.refresh(&form);
        assert_eq!(inputs.display(DimensionField::SizeSqft), "1000.00");
        assert_eq!(form.size_sqft, 1000.0);

        form.unit_preference = form.unit_preference.toggled();
        inputs.refresh(&form);
        assert_eq!(inputs.display(DimensionField::SizeSqft), "92.90");
        assert_eq!(form.size_sqft, 1000.0);
    }

    #[test]
    fn conversion_round_trips() {
        for stored in [0.5, 12.0, 1000.0, 8_750.25, 99_999.99] {
            for field in DimensionField::ALL {
                let shown = to_display(stored, field, UnitPreference::Metric);
                let back = from_display(shown, field, UnitPreference::Metric);
                assert!((back - stored).abs() < 0.01, "{field:?} {stored} -> {back}");
            }
        }
    }

    #[test]
    fn metric_input_is_stored_in_feet() {
        let mut form = dimensions(0.0);
        let mut inputs = DimensionInputs::from_form(&form);

        let stored = inputs
            .input(&mut form, DimensionField::WidthFt, "3.048")
            .unwrap();
        assert!((stored - 10.0).abs() < 1e-9);
        assert_eq!(form.width_ft, Some(stored));
        assert_eq!(inputs.display(DimensionField::WidthFt), "3.048");

        inputs.blur(&form, DimensionField::WidthFt);
        assert_eq!(inputs.display(DimensionField::WidthFt), "3.05");
    }

    #[test]
    fn unparsable_input_leaves_stored_value() {
        let mut form = dimensions(250.0);
        form.unit_preference = UnitPreference::Imperial;
        let mut inputs = DimensionInputs::from_form(&form);

        assert_eq!(inputs.input(&mut form, DimensionField::SizeSqft, "abc"), None);
        assert_eq!(form.size_sqft, 250.0);
        assert_eq!(inputs.display(DimensionField::SizeSqft), "abc");

        inputs.blur(&form, DimensionField::SizeSqft);
        assert_eq!(inputs.display(DimensionField::SizeSqft), "250.00");
    }

    #[test]
    fn absent_optional_dimensions_display_empty() {
        let inputs = DimensionInputs::from_form(&dimensions(0.0));
        for field in DimensionField::ALL {
            assert_eq!(inputs.display(field), "");
        }
    }
}
