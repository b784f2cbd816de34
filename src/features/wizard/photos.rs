use axum::extract::Multipart;
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    features::wizard::schemas::{ImageRecord, PhotoSet},
    services::storage::ObjectStorage,
    utilities::errors::AppError,
};

pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadFile {
    /// Declared content type, or the sniffed one when the client sent none.
    pub fn mime_type(&self) -> Option<String> {
        match self.content_type.as_deref() {
            Some(declared) if !declared.is_empty() && declared != "application/octet-stream" => {
                Some(declared.to_string())
            }
            _ => infer::get(&self.bytes).map(|kind| kind.mime_type().to_string()),
        }
    }
}

/// Collects every file part of a multipart body, in the order sent.
pub async fn read_upload_files(mut multipart: Multipart) -> Result<Vec<UploadFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::InvalidFormData("Failed to read multipart stream".into()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let Some(file_name) = field.file_name().map(str::to_string) else {
            warn!("Unknown multipart field: {}", name);
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::InvalidFormData(format!("Failed to read {file_name}")))?;

        debug!("received {} ({} bytes)", file_name, bytes.len());
        files.push(UploadFile {
            file_name,
            content_type,
            bytes,
        });
    }

    if files.is_empty() {
        return Err(AppError::InvalidFormData("No photos were attached".into()));
    }
    Ok(files)
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

/// Checks type and size; returns the accepted mime type.
pub fn validate_upload(file: &UploadFile) -> Result<&'static str, AppError> {
    let mime_type = file.mime_type();
    let Some(accepted) = ALLOWED_MIME_TYPES
        .iter()
        .copied()
        .find(|allowed| mime_type.as_deref() == Some(*allowed))
    else {
        return Err(AppError::InvalidImageFormatError(format!(
            "{} is not a JPEG, PNG or WebP image",
            file.file_name
        )));
    };

    if file.bytes.len() > MAX_FILE_SIZE {
        return Err(AppError::FileTooLargeError {
            file_name: file.file_name.clone(),
            size: file.bytes.len(),
        });
    }

    Ok(accepted)
}

pub fn storage_path(owner_id: Uuid, mime_type: &str) -> String {
    format!(
        "properties/{owner_id}/{}.{}",
        Uuid::new_v4(),
        extension_for(mime_type)
    )
}

/// Uploads one validated file under the owner's namespace.
pub async fn upload_one(
    storage: &dyn ObjectStorage,
    owner_id: Uuid,
    file: &UploadFile,
) -> Result<ImageRecord, AppError> {
    let mime_type = validate_upload(file)?;
    let path = storage_path(owner_id, mime_type);
    let stored = storage.upload(&path, file.bytes.clone(), mime_type).await?;

    Ok(ImageRecord {
        id: Uuid::new_v4(),
        public_url: storage.public_url(&stored),
        storage_path: stored,
        display_name: file.file_name.clone(),
        byte_size: file.bytes.len() as u64,
        mime_type: mime_type.to_string(),
    })
}

#[derive(Serialize, PartialEq, Eq, Clone, Debug)]
pub struct UploadFailure {
    pub file_name: String,
    pub error: String,
}

#[derive(Serialize, PartialEq, Eq, Default, Clone, Debug)]
pub struct UploadReport {
    pub uploaded: Vec<ImageRecord>,
    pub failed: Vec<UploadFailure>,
}

impl PhotoSet {
    /// Uploads files one at a time in input order. A failing file is
    /// reported and skipped; the rest of the batch still runs.
    pub async fn add_files(
        &mut self,
        storage: &dyn ObjectStorage,
        owner_id: Uuid,
        files: Vec<UploadFile>,
    ) -> UploadReport {
        let mut report = UploadReport::default();

        for file in files {
            match upload_one(storage, owner_id, &file).await {
                Ok(record) => {
                    debug!("uploaded {} to {}", record.display_name, record.storage_path);
                    self.images.push(record.clone());
                    report.uploaded.push(record);
                }
                Err(e) => {
                    warn!("upload of {} failed: {}", file.file_name, e);
                    report.failed.push(UploadFailure {
                        file_name: file.file_name,
                        error: e.to_string(),
                    });
                }
            }
        }

        if self.cover_image_index.is_none() && !self.images.is_empty() {
            self.cover_image_index = Some(0);
        }

        report
    }

    /// Deletes the stored object first; the record is kept if that fails.
    pub async fn remove_image(
        &mut self,
        storage: &dyn ObjectStorage,
        image_id: Uuid,
    ) -> Result<ImageRecord, AppError> {
        let index = self
            .images
            .iter()
            .position(|image| image.id == image_id)
            .ok_or_else(|| AppError::NotFoundError(format!("Image {image_id} not found")))?;

        storage
            .remove(std::slice::from_ref(&self.images[index].storage_path))
            .await?;

        let removed = self.images.remove(index);
        self.cover_image_index = match self.cover_image_index {
            Some(cover) if cover == index => (!self.images.is_empty()).then_some(0),
            Some(cover) if cover > index => Some(cover - 1),
            other => other,
        };

        Ok(removed)
    }

    pub fn set_cover(&mut self, index: usize) -> Result<(), AppError> {
        if index >= self.images.len() {
            return Err(AppError::ValidationError(format!(
                "Cover index {index} is out of range"
            )));
        }
        self.cover_image_index = Some(index);
        Ok(())
    }

    /// Moves one image; the cover keeps pointing at the same image.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), AppError> {
        let len = self.images.len();
        if from >= len || to >= len {
            return Err(AppError::ValidationError(format!(
                "Cannot move photo {from} to {to} with {len} photos"
            )));
        }

        let moved = self.images.remove(from);
        self.images.insert(to, moved);

        self.cover_image_index = self.cover_image_index.map(|cover| {
            if cover == from {
                to
            } else if from < cover && cover <= to {
                cover - 1
            } else if to <= cover && cover < from {
                cover + 1
            } else {
                cover
            }
        });

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::storage::BucketStorage;
    use async_trait::async_trait;
    use object_store::memory::InMemory;
    use std::{collections::HashSet, sync::Arc};
    use url::Url;

    pub fn memory_storage() -> BucketStorage {
        BucketStorage::new(
            Arc::new(InMemory::new()),
            Url::parse("https://cdn.example.com/property-images/").unwrap(),
        )
    }

    pub struct BrokenStorage;

    #[async_trait]
    impl ObjectStorage for BrokenStorage {
        async fn upload(&self, _: &str, _: Bytes, _: &str) -> Result<String, AppError> {
            Err(AppError::InternalError("bucket unavailable".to_string()))
        }

        fn public_url(&self, path: &str) -> String {
            path.to_string()
        }

        async fn remove(&self, _: &[String]) -> Result<(), AppError> {
            Err(AppError::InternalError("bucket unavailable".to_string()))
        }
    }

    pub fn file(name: &str, content_type: &str, size: usize) -> UploadFile {
        UploadFile {
            file_name: name.to_string(),
            content_type: Some(content_type.to_string()),
            bytes: Bytes::from(vec![0u8; size]),
        }
    }

    async fn photo_set(count: usize) -> PhotoSet {
        let storage = memory_storage();
        let mut photos = PhotoSet::default();
        let files = (0..count)
            .map(|i| file(&format!("photo-{i}.jpg"), "image/jpeg", 1024))
            .collect();
        photos.add_files(&storage, Uuid::new_v4(), files).await;
        photos
    }

    #[tokio::test]
    async fn oversized_file_fails_while_batch_continues() {
        let storage = memory_storage();
        let owner = Uuid::new_v4();
        let mut photos = PhotoSet::default();

        let report = photos
            .add_files(
                &storage,
                owner,
                vec![
                    file("huge.jpg", "image/jpeg", 6 * 1024 * 1024),
                    file("room.png", "image/png", 2 * 1024 * 1024),
                ],
            )
            .await;

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].file_name, "huge.jpg");
        assert!(report.failed[0].error.contains("5MB"));
        assert_eq!(photos.images.len(), 1);
        assert_eq!(photos.images[0].display_name, "room.png");
        assert!(
            photos.images[0]
                .storage_path
                .starts_with(&format!("properties/{owner}/"))
        );
        assert!(photos.images[0].storage_path.ends_with(".png"));
        assert!(
            photos.images[0]
                .public_url
                .starts_with("https://cdn.example.com/property-images/properties/")
        );
        assert_eq!(photos.cover_image_index, Some(0));
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected() {
        let storage = memory_storage();
        let mut photos = PhotoSet::default();
        let report = photos
            .add_files(
                &storage,
                Uuid::new_v4(),
                vec![file("notes.gif", "image/gif", 10)],
            )
            .await;

        assert!(photos.images.is_empty());
        assert_eq!(photos.cover_image_index, None);
        assert_eq!(report.failed.len(), 1);
    }

    #[test]
    fn missing_content_type_is_sniffed() {
        let png_header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let upload = UploadFile {
            file_name: "scan".to_string(),
            content_type: Some("application/octet-stream".to_string()),
            bytes: Bytes::copy_from_slice(&png_header),
        };
        assert_eq!(validate_upload(&upload).unwrap(), "image/png");
    }

    #[tokio::test]
    async fn storage_failure_leaves_form_untouched() {
        let mut photos = PhotoSet::default();
        let report = photos
            .add_files(
                &BrokenStorage,
                Uuid::new_v4(),
                vec![file("a.jpg", "image/jpeg", 10)],
            )
            .await;
        assert!(photos.images.is_empty());
        assert_eq!(report.failed.len(), 1);

        let mut photos = photo_set(2).await;
        let id = photos.images[0].id;
        assert!(photos.remove_image(&BrokenStorage, id).await.is_err());
        assert_eq!(photos.images.len(), 2);
    }

    #[tokio::test]
    async fn removing_cover_points_at_first_image() {
        let storage = memory_storage();
        let mut photos = photo_set(3).await;
        photos.set_cover(1).unwrap();

        let id = photos.images[1].id;
        photos.remove_image(&storage, id).await.unwrap();
        assert_eq!(photos.images.len(), 2);
        assert_eq!(photos.cover_image_index, Some(0));
    }

    #[tokio::test]
    async fn removing_before_cover_shifts_it() {
        let storage = memory_storage();
        let mut photos = photo_set(3).await;
        photos.set_cover(2).unwrap();
        let cover_id = photos.images[2].id;

        let id = photos.images[0].id;
        photos.remove_image(&storage, id).await.unwrap();
        assert_eq!(photos.cover_image_index, Some(1));
        assert_eq!(photos.images[1].id, cover_id);
    }

    #[tokio::test]
    async fn removing_last_image_clears_cover() {
        let storage = memory_storage();
        let mut photos = photo_set(1).await;
        let id = photos.images[0].id;
        photos.remove_image(&storage, id).await.unwrap();
        assert!(photos.images.is_empty());
        assert_eq!(photos.cover_image_index, None);
    }

    #[tokio::test]
    async fn reorder_keeps_ids_and_cover() {
        let mut photos = photo_set(5).await;
        let ids: HashSet<Uuid> = photos.images.iter().map(|image| image.id).collect();

        for (cover, from, to) in [(1, 0, 3), (3, 4, 0), (2, 2, 4), (0, 3, 4)] {
            photos.set_cover(cover).unwrap();
            let cover_id = photos.images[cover].id;

            photos.reorder(from, to).unwrap();

            let after: HashSet<Uuid> = photos.images.iter().map(|image| image.id).collect();
            assert_eq!(after, ids);
            let new_cover = photos.cover_image_index.unwrap();
            assert_eq!(photos.images[new_cover].id, cover_id);
        }
    }

    #[tokio::test]
    async fn out_of_range_indices_are_rejected() {
        let mut photos = photo_set(2).await;
        assert!(photos.set_cover(2).is_err());
        assert!(photos.reorder(0, 2).is_err());
        assert_eq!(photos.cover_image_index, Some(0));
    }
}
