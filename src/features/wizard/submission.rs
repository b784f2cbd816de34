use std::str::FromStr;

use bigdecimal::BigDecimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    features::{
        properties::{
            models::{CancellationPolicy, Property, PropertyType},
            repository::PropertyStore,
            schemas::{PropertyImageIn, PropertyPayload},
        },
        wizard::schemas::{AvailabilityOverride, MAX_NUMERIC_VALUE, PhotoSet, PropertyFormValue},
    },
    utilities::errors::AppError,
};

/// Maps a form number onto a numeric(10,2) value. Non-finite input becomes
/// `None`; the magnitude is capped at 99,999,999.99.
pub fn sanitize_numeric_field(value: f64) -> Option<BigDecimal> {
    BigDecimal::from_str(&fixed_precision(value)?).ok()
}

/// Same hardening for numbers that travel inside the JSONB availability column.
fn sanitize_json_number(value: f64) -> Option<f64> {
    fixed_precision(value)?.parse().ok()
}

fn fixed_precision(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let capped = value.clamp(-MAX_NUMERIC_VALUE, MAX_NUMERIC_VALUE);
    Some(format!("{capped:.2}"))
}

fn sanitize_optional(value: Option<f64>) -> Option<BigDecimal> {
    value.and_then(sanitize_numeric_field)
}

fn sanitize_overrides(overrides: &[AvailabilityOverride]) -> Vec<AvailabilityOverride> {
    overrides
        .iter()
        .map(|entry| AvailabilityOverride {
            special_price: entry.special_price.and_then(sanitize_json_number),
            ..entry.clone()
        })
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

pub fn build_payload(form: &PropertyFormValue) -> PropertyPayload {
    let PropertyFormValue {
        basics,
        address,
        dimensions,
        capacity,
        pricing,
        rules,
        availability,
        ..
    } = form;

    PropertyPayload {
        name: basics.name.trim().to_string(),
        property_type: basics.property_type.unwrap_or(PropertyType::default()),
        description: basics.description.trim().to_string(),

        address_line1: address.address_line1.trim().to_string(),
        address_line2: non_empty(&address.address_line2),
        city: address.city.trim().to_string(),
        state: address.state.trim().to_string(),
        postal_code: address.postal_code.trim().to_string(),
        country: address.country.trim().to_string(),
        latitude: address.latitude.filter(|value| value.is_finite()),
        longitude: address.longitude.filter(|value| value.is_finite()),

        size_sqft: sanitize_numeric_field(dimensions.size_sqft),
        ceiling_height_ft: sanitize_optional(dimensions.ceiling_height_ft),
        width_ft: sanitize_optional(dimensions.width_ft),
        length_ft: sanitize_optional(dimensions.length_ft),
        unit_preference: dimensions.unit_preference,

        max_guests: to_i32(capacity.max_guests),
        bedrooms: to_i32(capacity.bedrooms),
        bathrooms: to_i32(capacity.bathrooms),
        amenities: capacity
            .amenities
            .iter()
            .map(|amenity| amenity.as_str().to_string())
            .collect(),
        nearby_facilities: capacity
            .nearby_facilities
            .iter()
            .map(|facility| facility.as_str().to_string())
            .collect(),
        additional_info: non_empty(&capacity.additional_info),

        price_per_hour: sanitize_numeric_field(pricing.price_per_hour),
        price_per_day: sanitize_numeric_field(pricing.price_per_day),
        minimum_hours: to_i32(pricing.minimum_hours),
        discount_weekly: sanitize_numeric_field(pricing.discount_weekly),
        discount_monthly: sanitize_numeric_field(pricing.discount_monthly),

        rules: non_empty(&rules.rules),
        cancellation_policy: rules
            .cancellation_policy
            .unwrap_or(CancellationPolicy::default()),
        noise_restrictions: rules.noise_restrictions,
        no_smoking: rules.no_smoking,
        no_pets: rules.no_pets,
        no_parties: rules.no_parties,

        default_availability: availability.default_availability,
        availability: sanitize_overrides(&availability.overrides),
    }
}

/// One row per photo in display order; the cover defaults to the first.
pub fn image_rows(property_id: Uuid, photos: &PhotoSet) -> Vec<PropertyImageIn> {
    let cover = photos.cover_image_index.unwrap_or(0);
    photos
        .images
        .iter()
        .enumerate()
        .map(|(index, image)| PropertyImageIn {
            property_id,
            storage_path: image.storage_path.clone(),
            url: image.public_url.clone(),
            display_name: image.display_name.clone(),
            byte_size: i64::try_from(image.byte_size).unwrap_or(i64::MAX),
            mime_type: image.mime_type.clone(),
            position: i32::try_from(index).unwrap_or(i32::MAX),
            is_cover: index == cover,
        })
        .collect()
}

/// Creates the listing, then its image rows. A failed image write is logged
/// and the listing is still reported as created.
pub async fn submit_property(
    store: &dyn PropertyStore,
    owner_id: Uuid,
    form: &PropertyFormValue,
) -> Result<Property, AppError> {
    let payload = build_payload(form);
    let property = store.insert_property(owner_id, &payload).await?;
    info!("listing {} created by {}", property.id, owner_id);

    let rows = image_rows(property.id, &form.photos);
    if !rows.is_empty()
        && let Err(e) = store.insert_images(&rows).await
    {
        warn!(
            "listing {} created but {} image rows were not saved: {}",
            property.id,
            rows.len(),
            e
        );
    }

    Ok(property)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::features::{
        properties::models::PropertyStatus,
        wizard::schemas::{ImageRecord, PropertyFormValue},
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use sqlx::types::Json;
    use std::sync::Mutex;

    pub fn property_from(owner_id: Uuid, payload: &PropertyPayload) -> Property {
        Property {
            id: Uuid::new_v4(),
            owner_id,
            name: payload.name.clone(),
            property_type: payload.property_type,
            description: payload.description.clone(),
            address_line1: payload.address_line1.clone(),
            address_line2: payload.address_line2.clone(),
            city: payload.city.clone(),
            state: payload.state.clone(),
            postal_code: payload.postal_code.clone(),
            country: payload.country.clone(),
            latitude: payload.latitude,
            longitude: payload.longitude,
            size_sqft: payload.size_sqft.clone(),
            ceiling_height_ft: payload.ceiling_height_ft.clone(),
            width_ft: payload.width_ft.clone(),
            length_ft: payload.length_ft.clone(),
            unit_preference: payload.unit_preference,
            max_guests: payload.max_guests,
            bedrooms: payload.bedrooms,
            bathrooms: payload.bathrooms,
            amenities: payload.amenities.clone(),
            nearby_facilities: payload.nearby_facilities.clone(),
            additional_info: payload.additional_info.clone(),
            price_per_hour: payload.price_per_hour.clone(),
            price_per_day: payload.price_per_day.clone(),
            minimum_hours: payload.minimum_hours,
            discount_weekly: payload.discount_weekly.clone().unwrap_or_default(),
            discount_monthly: payload.discount_monthly.clone().unwrap_or_default(),
            rules: payload.rules.clone(),
            cancellation_policy: payload.cancellation_policy,
            noise_restrictions: payload.noise_restrictions,
            no_smoking: payload.no_smoking,
            no_pets: payload.no_pets,
            no_parties: payload.no_parties,
            default_availability: payload.default_availability,
            availability: Json(payload.availability.clone()),
            status: PropertyStatus::Draft,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Records every write; image writes fail when `fail_images` is set.
    #[derive(Default)]
    pub struct RecordingStore {
        pub fail_images: bool,
        pub properties: Mutex<Vec<(Uuid, PropertyPayload)>>,
        pub images: Mutex<Vec<PropertyImageIn>>,
    }

    #[async_trait]
    impl PropertyStore for RecordingStore {
        async fn insert_property(
            &self,
            owner_id: Uuid,
            payload: &PropertyPayload,
        ) -> Result<Property, AppError> {
            self.properties
                .lock()
                .unwrap()
                .push((owner_id, payload.clone()));
            Ok(property_from(owner_id, payload))
        }

        async fn insert_images(&self, images: &[PropertyImageIn]) -> Result<(), AppError> {
            if self.fail_images {
                return Err(AppError::InternalError("image table offline".to_string()));
            }
            self.images.lock().unwrap().extend_from_slice(images);
            Ok(())
        }

        async fn image_slots(&self, property_id: Uuid) -> Result<(i32, bool), AppError> {
            let images = self.images.lock().unwrap();
            let existing = images.iter().filter(|row| row.property_id == property_id);
            let next = existing.clone().map(|row| row.position + 1).max().unwrap_or(0);
            let has_cover = existing.clone().any(|row| row.is_cover);
            Ok((next, has_cover))
        }
    }

    pub struct FailingStore;

    #[async_trait]
    impl PropertyStore for FailingStore {
        async fn insert_property(&self, _: Uuid, _: &PropertyPayload) -> Result<Property, AppError> {
            Err(AppError::InternalError("database offline".to_string()))
        }

        async fn insert_images(&self, _: &[PropertyImageIn]) -> Result<(), AppError> {
            Err(AppError::InternalError("database offline".to_string()))
        }

        async fn image_slots(&self, _: Uuid) -> Result<(i32, bool), AppError> {
            Err(AppError::InternalError("database offline".to_string()))
        }
    }

    fn image(name: &str) -> ImageRecord {
        ImageRecord {
            id: Uuid::new_v4(),
            storage_path: format!("properties/owner/{name}"),
            public_url: format!("https://cdn.example.com/properties/owner/{name}"),
            display_name: name.to_string(),
            byte_size: 2048,
            mime_type: "image/jpeg".to_string(),
        }
    }

    #[test]
    fn numeric_fields_are_hardened() {
        assert_eq!(sanitize_numeric_field(f64::NAN), None);
        assert_eq!(sanitize_numeric_field(f64::INFINITY), None);
        assert_eq!(
            sanitize_numeric_field(1e12),
            Some(BigDecimal::from_str("99999999.99").unwrap())
        );
        assert_eq!(
            sanitize_numeric_field(-1e12),
            Some(BigDecimal::from_str("-99999999.99").unwrap())
        );
        assert_eq!(
            sanitize_numeric_field(49.999),
            Some(BigDecimal::from_str("50.00").unwrap())
        );
    }

    #[test]
    fn payload_uses_stored_units_and_tag_names() {
        let mut form = PropertyFormValue::default();
        form.dimensions.size_sqft = 1000.0;
        form.dimensions.width_ft = Some(f64::NAN);
        form.capacity.amenities.insert(crate::features::properties::models::Amenity::AirConditioning);
        form.address.address_line2 = Some("  ".to_string());

        let payload = build_payload(&form);
        assert_eq!(payload.size_sqft, Some(BigDecimal::from_str("1000").unwrap()));
        assert_eq!(payload.width_ft, None);
        assert_eq!(payload.amenities, vec!["air_conditioning".to_string()]);
        assert_eq!(payload.address_line2, None);
    }

    #[test]
    fn special_prices_are_hardened() {
        let mut form = PropertyFormValue::default();
        let date = chrono::NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        form.availability.overrides.push(AvailabilityOverride {
            date,
            is_available: true,
            special_price: Some(1e12),
        });
        form.availability.overrides.push(AvailabilityOverride {
            date: date.succ_opt().unwrap(),
            is_available: true,
            special_price: Some(f64::NAN),
        });

        let payload = build_payload(&form);
        assert_eq!(payload.availability[0].special_price, Some(MAX_NUMERIC_VALUE));
        assert_eq!(payload.availability[1].special_price, None);
        assert_eq!(payload.availability[1].date, date.succ_opt().unwrap());
    }

    #[test]
    fn image_rows_mark_the_cover() {
        let photos = PhotoSet {
            images: vec![image("a.jpg"), image("b.jpg"), image("c.jpg")],
            cover_image_index: Some(2),
        };
        let rows = image_rows(Uuid::new_v4(), &photos);
        let flags: Vec<_> = rows.iter().map(|row| (row.position, row.is_cover)).collect();
        assert_eq!(flags, vec![(0, false), (1, false), (2, true)]);

        let photos = PhotoSet {
            cover_image_index: None,
            ..photos
        };
        assert!(image_rows(Uuid::new_v4(), &photos)[0].is_cover);
    }

    #[tokio::test]
    async fn image_write_failure_still_returns_listing() {
        let store = RecordingStore {
            fail_images: true,
            ..RecordingStore::default()
        };
        let mut form = PropertyFormValue::default();
        form.photos.images.push(image("a.jpg"));
        form.photos.cover_image_index = Some(0);

        let owner = Uuid::new_v4();
        let property = submit_property(&store, owner, &form).await.unwrap();
        assert_eq!(property.owner_id, owner);
        assert_eq!(store.properties.lock().unwrap().len(), 1);
        assert!(store.images.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn property_failure_is_returned() {
        let form = PropertyFormValue::default();
        assert!(submit_property(&FailingStore, Uuid::new_v4(), &form).await.is_err());
    }
}
