use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};
use tracing::debug;
use uuid::Uuid;

use crate::{
    features::{
        properties::{
            models::{Property, PropertyImage, PropertyStatus},
            schemas::{PropertyImageIn, PropertyOut, PropertyPayload, PropertySummary},
        },
        schemas::Pagination,
    },
    services::database::Database,
    utilities::errors::AppError,
};

/// Persistence collaborator for listing and image writes.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn insert_property(
        &self,
        owner_id: Uuid,
        payload: &PropertyPayload,
    ) -> Result<Property, AppError>;

    async fn insert_images(&self, images: &[PropertyImageIn]) -> Result<(), AppError>;

    /// Next free position and whether a cover is already set.
    async fn image_slots(&self, property_id: Uuid) -> Result<(i32, bool), AppError>;
}

#[async_trait]
impl PropertyStore for Database {
    async fn insert_property(
        &self,
        owner_id: Uuid,
        payload: &PropertyPayload,
    ) -> Result<Property, AppError> {
        insert_property(&self.pool, owner_id, payload).await
    }

    async fn insert_images(&self, images: &[PropertyImageIn]) -> Result<(), AppError> {
        insert_images(&self.pool, images).await
    }

    async fn image_slots(&self, property_id: Uuid) -> Result<(i32, bool), AppError> {
        image_slots(&self.pool, property_id).await
    }
}

const SUMMARY_COLUMNS: &str = r#"
    SELECT
        p.id,
        p.name,
        p.property_type,
        p.city,
        p.country,
        p.price_per_hour,
        p.price_per_day,
        p.max_guests,
        p.status,
        (
            SELECT i.url FROM property_images i
            WHERE i.property_id = p.id
            ORDER BY i.is_cover DESC, i.position ASC
            LIMIT 1
        ) AS cover_url,
        p.created_at
    FROM properties p
"#;

pub async fn insert_property(
    pool: &PgPool,
    owner_id: Uuid,
    payload: &PropertyPayload,
) -> Result<Property, AppError> {
    let property = sqlx::query_as::<_, Property>(
        r#"
        INSERT INTO properties (
            owner_id,
            name,
            property_type,
            description,
            address_line1,
            address_line2,
            city,
            state,
            postal_code,
            country,
            latitude,
            longitude,
            size_sqft,
            ceiling_height_ft,
            width_ft,
            length_ft,
            unit_preference,
            max_guests,
            bedrooms,
            bathrooms,
            amenities,
            nearby_facilities,
            additional_info,
            price_per_hour,
            price_per_day,
            minimum_hours,
            discount_weekly,
            discount_monthly,
            rules,
            cancellation_policy,
            noise_restrictions,
            no_smoking,
            no_pets,
            no_parties,
            default_availability,
            availability)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20,
            $21,$22,$23,$24,$25,$26,COALESCE($27, 0),COALESCE($28, 0),$29,$30,$31,$32,$33,$34,$35,$36)
        RETURNING *
        "#,
    )
    .bind(owner_id)
    .bind(&payload.name)
    .bind(payload.property_type)
    .bind(&payload.description)
    .bind(&payload.address_line1)
    .bind(&payload.address_line2)
    .bind(&payload.city)
    .bind(&payload.state)
    .bind(&payload.postal_code)
    .bind(&payload.country)
    .bind(payload.latitude)
    .bind(payload.longitude)
    .bind(&payload.size_sqft)
    .bind(&payload.ceiling_height_ft)
    .bind(&payload.width_ft)
    .bind(&payload.length_ft)
    .bind(payload.unit_preference)
    .bind(payload.max_guests)
    .bind(payload.bedrooms)
    .bind(payload.bathrooms)
    .bind(&payload.amenities)
    .bind(&payload.nearby_facilities)
    .bind(&payload.additional_info)
    .bind(&payload.price_per_hour)
    .bind(&payload.price_per_day)
    .bind(payload.minimum_hours)
    .bind(&payload.discount_weekly)
    .bind(&payload.discount_monthly)
    .bind(&payload.rules)
    .bind(payload.cancellation_policy)
    .bind(payload.noise_restrictions)
    .bind(payload.no_smoking)
    .bind(payload.no_pets)
    .bind(payload.no_parties)
    .bind(payload.default_availability)
    .bind(Json(&payload.availability))
    .fetch_one(pool)
    .await?;

    debug!("created property {} for owner {}", property.id, owner_id);
    Ok(property)
}

pub async fn insert_images(pool: &PgPool, images: &[PropertyImageIn]) -> Result<(), AppError> {
    if images.is_empty() {
        return Ok(());
    }

    let mut query_builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO property_images (property_id, storage_path, url, display_name, byte_size, mime_type, position, is_cover) ",
    );
    query_builder.push_values(images, |mut row, image| {
        row.push_bind(image.property_id)
            .push_bind(&image.storage_path)
            .push_bind(&image.url)
            .push_bind(&image.display_name)
            .push_bind(image.byte_size)
            .push_bind(&image.mime_type)
            .push_bind(image.position)
            .push_bind(image.is_cover);
    });
    query_builder.build().execute(pool).await?;

    Ok(())
}

pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<PropertySummary>, AppError> {
    let mut query_builder = QueryBuilder::<Postgres>::new(SUMMARY_COLUMNS);
    query_builder
        .push(" WHERE p.owner_id = ")
        .push_bind(owner_id)
        .push(" ORDER BY p.created_at DESC");

    let properties = query_builder
        .build_query_as::<PropertySummary>()
        .fetch_all(pool)
        .await?;
    Ok(properties)
}

pub async fn list_published(
    pool: &PgPool,
    pagination: &Pagination,
) -> Result<Vec<PropertySummary>, AppError> {
    let mut query_builder = QueryBuilder::<Postgres>::new(SUMMARY_COLUMNS);
    query_builder
        .push(" WHERE p.status = ")
        .push_bind(PropertyStatus::Published)
        .push(" ORDER BY p.created_at DESC LIMIT ")
        .push_bind(pagination.limit)
        .push(" OFFSET ")
        .push_bind(pagination.offset);

    let properties = query_builder
        .build_query_as::<PropertySummary>()
        .fetch_all(pool)
        .await?;
    Ok(properties)
}

pub async fn find_property(pool: &PgPool, property_id: Uuid) -> Result<Property, AppError> {
    sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
        .bind(property_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Property {property_id} not found")))
}

pub async fn list_images(pool: &PgPool, property_id: Uuid) -> Result<Vec<PropertyImage>, AppError> {
    let images = sqlx::query_as::<_, PropertyImage>(
        "SELECT * FROM property_images WHERE property_id = $1 ORDER BY position ASC",
    )
    .bind(property_id)
    .fetch_all(pool)
    .await?;
    Ok(images)
}

pub async fn get_one_property(pool: &PgPool, property_id: Uuid) -> Result<PropertyOut, AppError> {
    let property = find_property(pool, property_id).await?;
    let images = list_images(pool, property_id).await?;
    Ok(PropertyOut { property, images })
}

/// Loads a listing and checks that `owner_id` owns it.
pub async fn find_owned_property(
    pool: &PgPool,
    owner_id: Uuid,
    property_id: Uuid,
) -> Result<Property, AppError> {
    let property = find_property(pool, property_id).await?;
    if property.owner_id != owner_id {
        return Err(AppError::ForbiddenError(
            "You can only manage your own listings".to_string(),
        ));
    }
    Ok(property)
}

pub async fn update_status(
    pool: &PgPool,
    owner_id: Uuid,
    property_id: Uuid,
    status: PropertyStatus,
) -> Result<Property, AppError> {
    find_owned_property(pool, owner_id, property_id).await?;

    let property = sqlx::query_as::<_, Property>(
        "UPDATE properties SET status = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(status)
    .bind(property_id)
    .fetch_one(pool)
    .await?;

    debug!("property {} is now {:?}", property_id, status);
    Ok(property)
}

/// Where appended photos start and whether the listing already has a cover.
pub async fn image_slots(pool: &PgPool, property_id: Uuid) -> Result<(i32, bool), AppError> {
    let (next_position, has_cover): (i32, bool) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(MAX(position) + 1, 0)::int4,
            COALESCE(BOOL_OR(is_cover), false)
        FROM property_images
        WHERE property_id = $1
        "#,
    )
    .bind(property_id)
    .fetch_one(pool)
    .await?;
    Ok((next_position, has_cover))
}
