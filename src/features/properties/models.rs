use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type, types::Json};
use uuid::Uuid;

use crate::features::wizard::schemas::AvailabilityOverride;

#[derive(Type, Deserialize, Serialize, PartialEq, Eq, Default, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "property_type", rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    House,
    Apartment,
    Studio,
    Loft,
    Warehouse,
    Office,
    Retail,
    Outdoor,
    Garden,
    Other,
}

#[derive(Type, Deserialize, Serialize, PartialEq, Eq, Default, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "cancellation_policy", rename_all = "lowercase")]
pub enum CancellationPolicy {
    #[default]
    Flexible,
    Moderate,
    Strict,
}

#[derive(Type, Deserialize, Serialize, PartialEq, Eq, Default, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "unit_preference", rename_all = "lowercase")]
pub enum UnitPreference {
    #[default]
    Metric,
    Imperial,
}

impl UnitPreference {
    pub fn toggled(self) -> Self {
        match self {
            Self::Metric => Self::Imperial,
            Self::Imperial => Self::Metric,
        }
    }
}

#[derive(Type, Deserialize, Serialize, PartialEq, Eq, Default, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "property_status", rename_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

#[derive(Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Amenity {
    Parking,
    Wifi,
    Kitchen,
    Bathroom,
    Furniture,
    Heating,
    AirConditioning,
    NaturalLight,
    Blackout,
    PowerOutlets,
    LoadingArea,
    SoundSystem,
    GreenScreen,
}

impl Amenity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parking => "parking",
            Self::Wifi => "wifi",
            Self::Kitchen => "kitchen",
            Self::Bathroom => "bathroom",
            Self::Furniture => "furniture",
            Self::Heating => "heating",
            Self::AirConditioning => "air_conditioning",
            Self::NaturalLight => "natural_light",
            Self::Blackout => "blackout",
            Self::PowerOutlets => "power_outlets",
            Self::LoadingArea => "loading_area",
            Self::SoundSystem => "sound_system",
            Self::GreenScreen => "green_screen",
        }
    }
}

#[derive(Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
pub enum NearbyFacility {
    Restaurants,
    Cafes,
    PublicTransport,
    Parking,
    Shops,
    Parks,
    Hospitals,
    Schools,
}

impl NearbyFacility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restaurants => "restaurants",
            Self::Cafes => "cafes",
            Self::PublicTransport => "public_transport",
            Self::Parking => "parking",
            Self::Shops => "shops",
            Self::Parks => "parks",
            Self::Hospitals => "hospitals",
            Self::Schools => "schools",
        }
    }
}

#[derive(FromRow, Deserialize, Serialize, PartialEq, Debug, Clone)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
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
    pub discount_weekly: BigDecimal,
    pub discount_monthly: BigDecimal,
    pub rules: Option<String>,
    pub cancellation_policy: CancellationPolicy,
    pub noise_restrictions: bool,
    pub no_smoking: bool,
    pub no_pets: bool,
    pub no_parties: bool,
    pub default_availability: bool,
    pub availability: Json<Vec<AvailabilityOverride>>,
    pub status: PropertyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(FromRow, Deserialize, Serialize, PartialEq, Eq, Debug, Clone)]
pub struct PropertyImage {
    pub id: Uuid,
    pub property_id: Uuid,
    pub storage_path: String,
    pub url: String,
    pub display_name: String,
    pub byte_size: i64,
    pub mime_type: String,
    pub position: i32,
    pub is_cover: bool,
    pub created_at: DateTime<Utc>,
}
