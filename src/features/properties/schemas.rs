use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::{
    properties::models::{
        CancellationPolicy, Property, PropertyImage, PropertyStatus, PropertyType, UnitPreference,
    },
    wizard::schemas::AvailabilityOverride,
};

// -- =====================
// -- IN
// -- =====================

/// Row values for a new listing, already hardened for the numeric columns.
#[derive(Serialize, PartialEq, Clone, Debug)]
pub struct PropertyPayload {
    pub name: String,
    pub property_type: PropertyType,
    pub description: String,

    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub size_sqft: Option<BigDecimal>,
    pub ceiling_height_ft: Option<BigDecimal>,
    pub width_ft: Option<BigDecimal>,
    pub length_ft: Option<BigDecimal>,
    pub unit_preference: UnitPreference,

    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub amenities: Vec<String>,
    pub nearby_facilities: Vec<String>,
    pub additional_info: Option<String>,

    pub price_per_hour: Option<BigDecimal>,
    pub price_per_day: Option<BigDecimal>,
    pub minimum_hours: i32,
    pub discount_weekly: Option<BigDecimal>,
    pub discount_monthly: Option<BigDecimal>,

    pub rules: Option<String>,
    pub cancellation_policy: CancellationPolicy,
    pub noise_restrictions: bool,
    pub no_smoking: bool,
    pub no_pets: bool,
    pub no_parties: bool,

    pub default_availability: bool,
    pub availability: Vec<AvailabilityOverride>,
}

#[derive(Serialize, PartialEq, Eq, Clone, Debug)]
pub struct PropertyImageIn {
    pub property_id: Uuid,
    pub storage_path: String,
    pub url: String,
    pub display_name: String,
    pub byte_size: i64,
    pub mime_type: String,
    pub position: i32,
    pub is_cover: bool,
}

#[derive(Deserialize, Debug)]
pub struct StatusUpdate {
    pub status: PropertyStatus,
}

// -- =====================
// -- OUT
// -- =====================
#[derive(Serialize, Debug)]
pub struct PropertyOut {
    #[serde(flatten)]
    pub property: Property,
    pub images: Vec<PropertyImage>,
}

#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct PropertySummary {
    pub id: Uuid,
    pub name: String,
    pub property_type: PropertyType,
    pub city: String,
    pub country: String,
    pub price_per_hour: Option<BigDecimal>,
    pub price_per_day: Option<BigDecimal>,
    pub max_guests: i32,
    pub status: PropertyStatus,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
