use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    features::{
        properties::{
            models::PropertyStatus,
            repository::{
                PropertyStore, find_owned_property, get_one_property, list_by_owner, list_images,
                list_published, update_status,
            },
            schemas::{PropertyImageIn, StatusUpdate},
        },
        schemas::{Page, Pagination},
        wizard::photos::{UploadFile, read_upload_files, upload_one, validate_upload},
    },
    services::{database::Database, storage::ObjectStorage},
    utilities::{errors::AppError, session::Session},
};

pub async fn get_dashboard_properties_handler(
    session: Session,
    State(database): State<Database>,
) -> Result<Response, AppError> {
    let owner_id = session.require_session()?;
    let properties = list_by_owner(&database.pool, owner_id).await?;
    debug!("owner {} has {} listings", owner_id, properties.len());
    Ok(Json(properties).into_response())
}

pub async fn get_many_properties_handler(
    State(database): State<Database>,
    Query(pagination): Query<Pagination>,
) -> Result<Response, AppError> {
    pagination.validate()?;

    let items = list_published(&database.pool, &pagination).await?;
    Ok(Json(Page {
        items,
        offset: pagination.offset,
        limit: pagination.limit,
    })
    .into_response())
}

/// Published listings are public; drafts and archived ones only show to
/// their owner.
pub async fn get_one_property_handler(
    session: Session,
    State(database): State<Database>,
    Path(property_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let property = get_one_property(&database.pool, property_id).await?;

    let is_owner = session.get_session() == Some(property.property.owner_id);
    if property.property.status != PropertyStatus::Published && !is_owner {
        return Err(AppError::NotFoundError(format!(
            "Property {property_id} not found"
        )));
    }

    Ok(Json(property).into_response())
}

pub async fn update_property_status_handler(
    session: Session,
    State(database): State<Database>,
    Path(property_id): Path<Uuid>,
    Json(status_update): Json<StatusUpdate>,
) -> Result<Response, AppError> {
    let owner_id = session.require_session()?;
    let property = update_status(&database.pool, owner_id, property_id, status_update.status).await?;
    info!("listing {} moved to {:?}", property_id, property.status);
    Ok(Json(property).into_response())
}

/// Appends photos to an existing listing. The whole batch is rejected if any
/// file fails the type or size check.
pub async fn add_property_photos_handler(
    session: Session,
    State(database): State<Database>,
    State(storage): State<Arc<dyn ObjectStorage>>,
    Path(property_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let owner_id = session.require_session()?;
    find_owned_property(&database.pool, owner_id, property_id).await?;

    let files = read_upload_files(multipart).await?;
    attach_photos(storage.as_ref(), &database, owner_id, property_id, &files).await?;

    let images = list_images(&database.pool, property_id).await?;
    Ok((StatusCode::CREATED, Json(images)).into_response())
}

/// Uploads `files` and records them after the listing's existing photos; the
/// first one becomes the cover when none is set. Nothing is kept on failure:
/// objects already uploaded in the batch are removed again.
pub async fn attach_photos(
    storage: &dyn ObjectStorage,
    store: &dyn PropertyStore,
    owner_id: Uuid,
    property_id: Uuid,
    files: &[UploadFile],
) -> Result<Vec<PropertyImageIn>, AppError> {
    for file in files {
        validate_upload(file)?;
    }

    let (next_position, has_cover) = store.image_slots(property_id).await?;

    let mut rows = Vec::with_capacity(files.len());
    for (offset, file) in files.iter().enumerate() {
        let record = match upload_one(storage, owner_id, file).await {
            Ok(record) => record,
            Err(e) => {
                warn!("upload of {} failed for {}: {}", file.file_name, property_id, e);
                remove_uploads(storage, &rows).await;
                return Err(e);
            }
        };
        rows.push(PropertyImageIn {
            property_id,
            storage_path: record.storage_path,
            url: record.public_url,
            display_name: record.display_name,
            byte_size: i64::try_from(record.byte_size).unwrap_or(i64::MAX),
            mime_type: record.mime_type,
            position: next_position + i32::try_from(offset).unwrap_or(i32::MAX),
            is_cover: !has_cover && offset == 0,
        });
    }

    if let Err(e) = store.insert_images(&rows).await {
        warn!("photo rows for {} were not saved, removing uploads: {}", property_id, e);
        remove_uploads(storage, &rows).await;
        return Err(e);
    }

    info!("{} photos added to {}", rows.len(), property_id);
    Ok(rows)
}

async fn remove_uploads(storage: &dyn ObjectStorage, rows: &[PropertyImageIn]) {
    if rows.is_empty() {
        return;
    }
    let paths: Vec<String> = rows.iter().map(|row| row.storage_path.clone()).collect();
    if let Err(e) = storage.remove(&paths).await {
        warn!("failed to remove orphaned uploads: {}", e);
    }
}
