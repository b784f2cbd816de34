use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::{
    features::wizard::{
        controller::{SubmissionStatus, WizardContext},
        photos::read_upload_files,
        pricing::PricingField,
        schemas::{
            AvailabilityIn, CoverIn, DefaultAvailabilityIn, FieldInputIn, FormPatch, GoToIn,
            ReorderIn, UploadOut, WizardOut,
        },
        sessions::{SharedWizard, WizardSessions},
        units::DimensionField,
    },
    services::{database::Database, storage::ObjectStorage},
    utilities::{errors::AppError, session::Session},
};

async fn open_wizard(
    wizards: &WizardSessions,
    session: &Session,
    wizard_id: Uuid,
) -> Result<SharedWizard, AppError> {
    let owner_id = session.require_session()?;
    wizards.get(wizard_id, owner_id).await
}

async fn wizard_response(wizard_id: Uuid, shared: &SharedWizard) -> Response {
    let guard = shared.lock().await;
    Json(WizardOut {
        id: wizard_id,
        step_title: guard.wizard.step().title(),
        wizard: &guard.wizard,
    })
    .into_response()
}

pub async fn create_wizard_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
) -> Result<Response, AppError> {
    let owner_id = session.require_session()?;
    let (wizard_id, shared) = wizards.create(owner_id).await;

    let guard = shared.lock().await;
    Ok((
        StatusCode::CREATED,
        Json(WizardOut {
            id: wizard_id,
            step_title: guard.wizard.step().title(),
            wizard: &guard.wizard,
        }),
    )
        .into_response())
}

pub async fn get_wizard_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    Ok(wizard_response(wizard_id, &shared).await)
}

pub async fn discard_wizard_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let owner_id = session.require_session()?;
    wizards.discard(wizard_id, owner_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn update_form_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path(wizard_id): Path<Uuid>,
    Json(patch): Json<FormPatch>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    shared.lock().await.wizard.apply_patch(patch);
    Ok(wizard_response(wizard_id, &shared).await)
}

// -- =====================
// -- NAVIGATION
// -- =====================
pub async fn next_step_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    let advanced = shared.lock().await.wizard.next();
    debug!("wizard {} next: advanced={}", wizard_id, advanced);
    Ok(wizard_response(wizard_id, &shared).await)
}

pub async fn previous_step_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    shared.lock().await.wizard.previous();
    Ok(wizard_response(wizard_id, &shared).await)
}

pub async fn go_to_step_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path(wizard_id): Path<Uuid>,
    Json(go_to): Json<GoToIn>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    if !shared.lock().await.wizard.go_to(go_to.step) {
        return Err(AppError::ValidationError(format!(
            "Step {} does not exist",
            go_to.step
        )));
    }
    Ok(wizard_response(wizard_id, &shared).await)
}

// -- =====================
// -- DIMENSIONS & PRICING
// -- =====================
pub async fn toggle_units_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    shared.lock().await.wizard.toggle_units();
    Ok(wizard_response(wizard_id, &shared).await)
}

pub async fn input_dimension_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path((wizard_id, field)): Path<(Uuid, DimensionField)>,
    Json(input): Json<FieldInputIn>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    shared
        .lock()
        .await
        .wizard
        .input_dimension(field, &input.value);
    Ok(wizard_response(wizard_id, &shared).await)
}

pub async fn blur_dimension_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path((wizard_id, field)): Path<(Uuid, DimensionField)>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    shared.lock().await.wizard.blur_dimension(field);
    Ok(wizard_response(wizard_id, &shared).await)
}

pub async fn input_pricing_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path((wizard_id, field)): Path<(Uuid, PricingField)>,
    Json(input): Json<FieldInputIn>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    shared
        .lock()
        .await
        .wizard
        .input_pricing(field, &input.value);
    Ok(wizard_response(wizard_id, &shared).await)
}

pub async fn blur_pricing_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path((wizard_id, field)): Path<(Uuid, PricingField)>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    shared.lock().await.wizard.blur_pricing(field);
    Ok(wizard_response(wizard_id, &shared).await)
}

// -- =====================
// -- PHOTOS
// -- =====================
pub async fn upload_photos_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    State(storage): State<Arc<dyn ObjectStorage>>,
    State(database): State<Database>,
    Path(wizard_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    let files = read_upload_files(multipart).await?;
    let ctx = WizardContext {
        session,
        storage,
        store: Arc::new(database),
    };

    let mut guard = shared.lock().await;
    let report = guard.wizard.add_photos(&ctx, files).await?;
    Ok(Json(UploadOut {
        id: wizard_id,
        step_title: guard.wizard.step().title(),
        report,
        wizard: &guard.wizard,
    })
    .into_response())
}

pub async fn remove_photo_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    State(storage): State<Arc<dyn ObjectStorage>>,
    State(database): State<Database>,
    Path((wizard_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    let ctx = WizardContext {
        session,
        storage,
        store: Arc::new(database),
    };

    shared
        .lock()
        .await
        .wizard
        .remove_photo(&ctx, image_id)
        .await?;
    Ok(wizard_response(wizard_id, &shared).await)
}

pub async fn set_cover_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path(wizard_id): Path<Uuid>,
    Json(cover): Json<CoverIn>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    shared.lock().await.wizard.set_cover(cover.index)?;
    Ok(wizard_response(wizard_id, &shared).await)
}

pub async fn reorder_photos_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path(wizard_id): Path<Uuid>,
    Json(reorder): Json<ReorderIn>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    shared
        .lock()
        .await
        .wizard
        .reorder_photos(reorder.from, reorder.to)?;
    Ok(wizard_response(wizard_id, &shared).await)
}

// -- =====================
// -- AVAILABILITY
// -- =====================
pub async fn apply_availability_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path(wizard_id): Path<Uuid>,
    Json(availability): Json<AvailabilityIn>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    shared.lock().await.wizard.apply_availability(
        &availability.dates,
        availability.action,
        availability.special_price,
    );
    Ok(wizard_response(wizard_id, &shared).await)
}

pub async fn reset_availability_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    shared.lock().await.wizard.reset_availability();
    Ok(wizard_response(wizard_id, &shared).await)
}

pub async fn default_availability_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    Path(wizard_id): Path<Uuid>,
    Json(default): Json<DefaultAvailabilityIn>,
) -> Result<Response, AppError> {
    let shared = open_wizard(&wizards, &session, wizard_id).await?;
    shared
        .lock()
        .await
        .wizard
        .set_default_availability(default.available);
    Ok(wizard_response(wizard_id, &shared).await)
}

// -- =====================
// -- SUBMISSION
// -- =====================
pub async fn submit_wizard_handler(
    session: Session,
    State(wizards): State<WizardSessions>,
    State(storage): State<Arc<dyn ObjectStorage>>,
    State(database): State<Database>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let owner_id = session.require_session()?;
    let ctx = WizardContext {
        session,
        storage,
        store: Arc::new(database),
    };

    let (submission, errors) = wizards.submit(wizard_id, owner_id, &ctx).await?;
    let status = match submission.status {
        SubmissionStatus::Success => StatusCode::CREATED,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };

    Ok((
        status,
        Json(json!({
            "id": wizard_id,
            "submission": submission,
            "errors": errors,
        })),
    )
        .into_response())
}
