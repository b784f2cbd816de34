use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::{
    properties::models::{Amenity, CancellationPolicy, NearbyFacility, PropertyType, UnitPreference},
    wizard::{availability::DateAction, controller::PropertyWizard, photos::UploadReport},
};

/// Largest value the numeric(10,2) columns can hold.
pub const MAX_NUMERIC_VALUE: f64 = 99_999_999.99;

// -- =====================
// -- STEPS
// -- =====================
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Basics,
    Address,
    Dimensions,
    Capacity,
    Photos,
    Pricing,
    Rules,
    Availability,
}

pub const TOTAL_STEPS: usize = 8;

impl WizardStep {
    pub const ALL: [WizardStep; TOTAL_STEPS] = [
        WizardStep::Basics,
        WizardStep::Address,
        WizardStep::Dimensions,
        WizardStep::Capacity,
        WizardStep::Photos,
        WizardStep::Pricing,
        WizardStep::Rules,
        WizardStep::Availability,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Basics => "Basic information",
            Self::Address => "Location",
            Self::Dimensions => "Dimensions",
            Self::Capacity => "Amenities & capacity",
            Self::Photos => "Photos",
            Self::Pricing => "Pricing",
            Self::Rules => "Rules & policies",
            Self::Availability => "Availability",
        }
    }
}

// -- =====================
// -- FORM SECTIONS
// -- =====================
#[derive(Serialize, Deserialize, Validate, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct BasicDetails {
    #[validate(length(min = 3, message = "Property name must be at least 3 characters"))]
    pub name: String,
    #[validate(required(message = "Select a property type"))]
    pub property_type: Option<PropertyType>,
    #[validate(length(min = 20, message = "Description must be at least 20 characters"))]
    pub description: String,
}

impl Default for BasicDetails {
    fn default() -> Self {
        Self {
            name: String::new(),
            property_type: Some(PropertyType::default()),
            description: String::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Validate, PartialEq, Default, Clone, Debug)]
#[serde(default)]
pub struct AddressDetails {
    #[validate(length(min = 3, message = "Address line 1 is required"))]
    pub address_line1: String,
    pub address_line2: Option<String>,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State/Province is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "Post number is required"))]
    pub postal_code: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Dimensions are always held in square feet / feet.
#[derive(Serialize, Deserialize, Validate, PartialEq, Default, Clone, Debug)]
#[serde(default)]
pub struct Dimensions {
    #[validate(range(exclusive_min = 0.0, message = "Size must be a positive number"))]
    pub size_sqft: f64,
    #[validate(range(exclusive_min = 0.0, message = "Ceiling height must be a positive number"))]
    pub ceiling_height_ft: Option<f64>,
    #[validate(range(exclusive_min = 0.0, message = "Width must be a positive number"))]
    pub width_ft: Option<f64>,
    #[validate(range(exclusive_min = 0.0, message = "Length must be a positive number"))]
    pub length_ft: Option<f64>,
    pub unit_preference: UnitPreference,
}

#[derive(Serialize, Deserialize, Validate, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct CapacityDetails {
    #[validate(range(min = 1, message = "Maximum guests must be a positive number"))]
    pub max_guests: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub amenities: BTreeSet<Amenity>,
    pub nearby_facilities: BTreeSet<NearbyFacility>,
    pub additional_info: Option<String>,
}

impl Default for CapacityDetails {
    fn default() -> Self {
        Self {
            max_guests: 10,
            bedrooms: 1,
            bathrooms: 1,
            amenities: BTreeSet::new(),
            nearby_facilities: BTreeSet::new(),
            additional_info: None,
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct ImageRecord {
    pub id: Uuid,
    pub storage_path: String,
    pub public_url: String,
    pub display_name: String,
    pub byte_size: u64,
    pub mime_type: String,
}

#[derive(Serialize, Deserialize, Validate, PartialEq, Eq, Default, Clone, Debug)]
#[serde(default)]
#[validate(schema(function = "validate_cover_index"))]
pub struct PhotoSet {
    pub images: Vec<ImageRecord>,
    pub cover_image_index: Option<usize>,
}

fn validate_cover_index(photos: &PhotoSet) -> Result<(), ValidationError> {
    match photos.cover_image_index {
        Some(index) if index >= photos.images.len() => {
            let mut error = ValidationError::new("cover_image_index");
            error.message = Some("Cover image must be one of the uploaded photos".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

#[derive(Serialize, Deserialize, Validate, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct Pricing {
    #[validate(range(exclusive_min = 0.0, message = "Hourly rate must be a positive number"))]
    pub price_per_hour: f64,
    #[validate(range(exclusive_min = 0.0, message = "Daily rate must be a positive number"))]
    pub price_per_day: f64,
    #[validate(range(min = 1, message = "Minimum hours must be a positive integer"))]
    pub minimum_hours: u32,
    #[validate(range(min = 0.0, max = 100.0, message = "Weekly discount must be between 0 and 100"))]
    pub discount_weekly: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "Monthly discount must be between 0 and 100"))]
    pub discount_monthly: f64,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            price_per_hour: 0.0,
            price_per_day: 0.0,
            minimum_hours: 1,
            discount_weekly: 0.0,
            discount_monthly: 0.0,
        }
    }
}

#[derive(Serialize, Deserialize, Validate, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct RulesDetails {
    pub rules: Option<String>,
    #[validate(required(message = "Select a cancellation policy"))]
    pub cancellation_policy: Option<CancellationPolicy>,
    pub noise_restrictions: bool,
    pub no_smoking: bool,
    pub no_pets: bool,
    pub no_parties: bool,
}

impl Default for RulesDetails {
    fn default() -> Self {
        Self {
            rules: None,
            cancellation_policy: Some(CancellationPolicy::default()),
            noise_restrictions: false,
            no_smoking: false,
            no_pets: false,
            no_parties: false,
        }
    }
}

#[derive(Serialize, Deserialize, Validate, PartialEq, Clone, Debug)]
pub struct AvailabilityOverride {
    pub date: NaiveDate,
    pub is_available: bool,
    #[validate(range(min = 0.0, message = "Special price must be 0 or more"))]
    pub special_price: Option<f64>,
}

/// Sparse per-date overrides kept sorted by date, one entry per date.
#[derive(Serialize, Deserialize, Validate, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct Availability {
    pub default_availability: bool,
    #[validate(nested)]
    pub overrides: Vec<AvailabilityOverride>,
}

impl Default for Availability {
    fn default() -> Self {
        Self {
            default_availability: true,
            overrides: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Validate, PartialEq, Default, Clone, Debug)]
#[serde(default)]
pub struct PropertyFormValue {
    #[validate(nested)]
    pub basics: BasicDetails,
    #[validate(nested)]
    pub address: AddressDetails,
    #[validate(nested)]
    pub dimensions: Dimensions,
    #[validate(nested)]
    pub capacity: CapacityDetails,
    #[validate(nested)]
    pub photos: PhotoSet,
    #[validate(nested)]
    pub pricing: Pricing,
    #[validate(nested)]
    pub rules: RulesDetails,
    #[validate(nested)]
    pub availability: Availability,
}

// -- =====================
// -- IN
// -- =====================

/// Free-form sections a client may replace wholesale. Dimensions, pricing,
/// photos and availability go through their own endpoints.
#[derive(Deserialize, Default, Debug)]
pub struct FormPatch {
    pub basics: Option<BasicDetails>,
    pub address: Option<AddressDetails>,
    pub capacity: Option<CapacityDetails>,
    pub rules: Option<RulesDetails>,
}

#[derive(Deserialize, Debug)]
pub struct GoToIn {
    pub step: usize,
}

#[derive(Deserialize, Debug)]
pub struct FieldInputIn {
    pub value: String,
}

#[derive(Deserialize, Debug)]
pub struct CoverIn {
    pub index: usize,
}

#[derive(Deserialize, Debug)]
pub struct ReorderIn {
    pub from: usize,
    pub to: usize,
}

#[derive(Deserialize, Debug)]
pub struct AvailabilityIn {
    pub dates: Vec<NaiveDate>,
    pub action: DateAction,
    pub special_price: Option<f64>,
}

#[derive(Deserialize, Debug)]
pub struct DefaultAvailabilityIn {
    pub available: Option<bool>,
}

// -- =====================
// -- OUT
// -- =====================
#[derive(Serialize, Debug)]
pub struct WizardOut<'a> {
    pub id: Uuid,
    pub step_title: &'static str,
    #[serde(flatten)]
    pub wizard: &'a PropertyWizard,
}

#[derive(Serialize, Debug)]
pub struct UploadOut<'a> {
    pub id: Uuid,
    pub step_title: &'static str,
    pub report: UploadReport,
    #[serde(flatten)]
    pub wizard: &'a PropertyWizard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_fresh_wizard() {
        let form = PropertyFormValue::default();
        assert_eq!(form.capacity.max_guests, 10);
        assert_eq!(form.capacity.bedrooms, 1);
        assert_eq!(form.pricing.minimum_hours, 1);
        assert_eq!(form.basics.property_type, Some(PropertyType::House));
        assert_eq!(form.rules.cancellation_policy, Some(CancellationPolicy::Flexible));
        assert_eq!(form.dimensions.unit_preference, UnitPreference::Metric);
        assert!(form.dimensions.width_ft.is_none());
        assert!(form.availability.default_availability);
        assert!(form.photos.images.is_empty());
    }

    #[test]
    fn step_indices_follow_declaration_order() {
        for (index, step) in WizardStep::ALL.iter().enumerate() {
            assert_eq!(step.index(), index);
            assert_eq!(WizardStep::from_index(index), Some(*step));
        }
        assert_eq!(WizardStep::from_index(TOTAL_STEPS), None);
    }

    #[test]
    fn dangling_cover_index_is_invalid() {
        let photos = PhotoSet {
            images: Vec::new(),
            cover_image_index: Some(0),
        };
        assert!(photos.validate().is_err());
        assert!(PhotoSet::default().validate().is_ok());
    }

    #[test]
    fn sections_deserialize_with_missing_fields() {
        let capacity: CapacityDetails =
            serde_json::from_str(r#"{"max_guests": 4, "amenities": ["wifi", "green_screen"]}"#)
                .unwrap();
        assert_eq!(capacity.max_guests, 4);
        assert_eq!(capacity.bathrooms, 1);
        assert!(capacity.amenities.contains(&Amenity::GreenScreen));
    }
}
