use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    features::{
        properties::repository::PropertyStore,
        wizard::{
            availability::DateAction,
            photos::{UploadFile, UploadReport},
            pricing::{PricingField, PricingInputs},
            schemas::{FormPatch, ImageRecord, PropertyFormValue, TOTAL_STEPS, WizardStep},
            submission::submit_property,
            units::{DimensionField, DimensionInputs},
            validation::{FieldErrors, validate_form, validate_step},
        },
    },
    services::storage::ObjectStorage,
    utilities::{errors::AppError, session::Session},
};

/// Collaborators handed to the wizard for one call.
#[derive(Clone)]
pub struct WizardContext {
    pub session: Session,
    pub storage: Arc<dyn ObjectStorage>,
    pub store: Arc<dyn PropertyStore>,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Default, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Success,
    Error,
}

#[derive(Serialize, PartialEq, Eq, Default, Clone, Debug)]
pub struct SubmissionState {
    pub status: SubmissionStatus,
    pub message: Option<String>,
    pub property_id: Option<Uuid>,
}

impl SubmissionState {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            status: SubmissionStatus::Error,
            message: Some(message.into()),
            property_id: None,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct PropertyWizard {
    current_step: usize,
    total_steps: usize,
    form: PropertyFormValue,
    errors: FieldErrors,
    dimension_inputs: DimensionInputs,
    pricing_inputs: PricingInputs,
    submission: SubmissionState,
}

impl Default for PropertyWizard {
    fn default() -> Self {
        Self::new(PropertyFormValue::default())
    }
}

impl PropertyWizard {
    pub fn new(form: PropertyFormValue) -> Self {
        Self {
            current_step: 0,
            total_steps: TOTAL_STEPS,
            dimension_inputs: DimensionInputs::from_form(&form.dimensions),
            pricing_inputs: PricingInputs::from_form(&form.pricing),
            form,
            errors: FieldErrors::default(),
            submission: SubmissionState::default(),
        }
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn step(&self) -> WizardStep {
        WizardStep::from_index(self.current_step).unwrap_or(WizardStep::Basics)
    }

    pub fn form(&self) -> &PropertyFormValue {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    pub fn dimension_inputs(&self) -> &DimensionInputs {
        &self.dimension_inputs
    }

    pub fn pricing_inputs(&self) -> &PricingInputs {
        &self.pricing_inputs
    }

    pub fn is_first(&self) -> bool {
        self.current_step == 0
    }

    pub fn is_last(&self) -> bool {
        self.current_step + 1 == TOTAL_STEPS
    }

    // -- navigation

    /// Validates the active step and advances when it passes. Failures are
    /// left in `errors()`; the step does not change.
    pub fn next(&mut self) -> bool {
        let errors = validate_step(self.step(), &self.form);
        if !errors.is_empty() {
            debug!("step {:?} blocked by {:?}", self.step(), errors);
            self.errors = errors;
            return false;
        }

        self.errors = FieldErrors::default();
        if self.is_last() {
            return false;
        }
        self.current_step += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.errors = FieldErrors::default();
        self.current_step -= 1;
        true
    }

    pub fn go_to(&mut self, step: usize) -> bool {
        if step >= TOTAL_STEPS {
            return false;
        }
        self.errors = FieldErrors::default();
        self.current_step = step;
        true
    }

    // -- free-form sections

    pub fn apply_patch(&mut self, patch: FormPatch) {
        let FormPatch {
            basics,
            address,
            capacity,
            rules,
        } = patch;

        if let Some(basics) = basics {
            self.form.basics = basics;
        }
        if let Some(address) = address {
            self.form.address = address;
        }
        if let Some(capacity) = capacity {
            self.form.capacity = capacity;
        }
        if let Some(rules) = rules {
            self.form.rules = rules;
        }
    }

    // -- dimensions

    pub fn toggle_units(&mut self) {
        let dimensions = &mut self.form.dimensions;
        dimensions.unit_preference = dimensions.unit_preference.toggled();
        self.dimension_inputs.refresh(dimensions);
    }

    pub fn input_dimension(&mut self, field: DimensionField, raw: &str) -> Option<f64> {
        self.dimension_inputs
            .input(&mut self.form.dimensions, field, raw)
    }

    pub fn blur_dimension(&mut self, field: DimensionField) {
        self.dimension_inputs.blur(&self.form.dimensions, field);
    }

    // -- pricing

    pub fn input_pricing(&mut self, field: PricingField, raw: &str) -> Option<f64> {
        self.pricing_inputs.input(&mut self.form.pricing, field, raw)
    }

    pub fn blur_pricing(&mut self, field: PricingField) {
        self.pricing_inputs.blur(&self.form.pricing, field);
    }

    // -- photos

    pub async fn add_photos(
        &mut self,
        ctx: &WizardContext,
        files: Vec<UploadFile>,
    ) -> Result<UploadReport, AppError> {
        let owner_id = ctx.session.require_session()?;
        Ok(self
            .form
            .photos
            .add_files(ctx.storage.as_ref(), owner_id, files)
            .await)
    }

    pub async fn remove_photo(
        &mut self,
        ctx: &WizardContext,
        image_id: Uuid,
    ) -> Result<ImageRecord, AppError> {
        ctx.session.require_session()?;
        self.form
            .photos
            .remove_image(ctx.storage.as_ref(), image_id)
            .await
    }

    pub fn set_cover(&mut self, index: usize) -> Result<(), AppError> {
        self.form.photos.set_cover(index)
    }

    pub fn reorder_photos(&mut self, from: usize, to: usize) -> Result<(), AppError> {
        self.form.photos.reorder(from, to)
    }

    // -- availability

    pub fn apply_availability(
        &mut self,
        dates: &[NaiveDate],
        action: DateAction,
        special_price: Option<f64>,
    ) {
        self.form.availability.apply(dates, action, special_price);
    }

    /// `None` flips the current default.
    pub fn set_default_availability(&mut self, available: Option<bool>) {
        match available {
            Some(available) => self.form.availability.set_default(available),
            None => self.form.availability.toggle_default(),
        }
    }

    pub fn reset_availability(&mut self) {
        self.form.availability.reset();
    }

    // -- submission

    /// Validates the whole form and creates the listing. Every failure ends
    /// up in `submission()`; the form is kept so the owner can retry.
    pub async fn submit(&mut self, ctx: &WizardContext) -> &SubmissionState {
        if self.submission.status == SubmissionStatus::Success {
            return &self.submission;
        }

        let errors = validate_form(&self.form);
        if !errors.is_empty() {
            self.submission = SubmissionState::failed(format!(
                "Please fix the highlighted fields: {}",
                errors.summary()
            ));
            self.errors = errors;
            return &self.submission;
        }
        self.errors = FieldErrors::default();

        let owner_id = match ctx.session.require_session() {
            Ok(owner_id) => owner_id,
            Err(e) => {
                warn!("listing submitted without a session");
                self.submission = SubmissionState::failed(e.to_string());
                return &self.submission;
            }
        };

        self.submission = match submit_property(ctx.store.as_ref(), owner_id, &self.form).await {
            Ok(property) => SubmissionState {
                status: SubmissionStatus::Success,
                message: Some("Property created successfully".to_string()),
                property_id: Some(property.id),
            },
            Err(e) => {
                warn!("failed to create listing: {}", e);
                SubmissionState::failed(e.to_string())
            }
        };
        &self.submission
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{
        properties::models::Amenity,
        wizard::{
            photos::tests::{file, memory_storage},
            submission::tests::{FailingStore, RecordingStore},
        },
    };

    fn context(session: Session, store: Arc<dyn PropertyStore>) -> WizardContext {
        WizardContext {
            session,
            storage: Arc::new(memory_storage()),
            store,
        }
    }

    fn valid_form() -> PropertyFormValue {
        let mut form = PropertyFormValue::default();
        form.basics.name = "Sunlit loft".to_string();
        form.basics.description = "Bright open-plan loft with skylights".to_string();
        form.address.address_line1 = "12 Harbour Street".to_string();
        form.address.city = "Oslo".to_string();
        form.address.state = "Oslo".to_string();
        form.address.postal_code = "0150".to_string();
        form.address.country = "Norway".to_string();
        form.dimensions.size_sqft = 1000.0;
        form.capacity.amenities.insert(Amenity::Wifi);
        form.pricing.price_per_hour = 45.0;
        form.pricing.price_per_day = 300.0;
        form
    }

    #[test]
    fn next_advances_by_one_and_keeps_the_form() {
        let mut wizard = PropertyWizard::new(valid_form());
        let before = wizard.form().clone();

        for expected in 1..TOTAL_STEPS {
            assert!(wizard.next());
            assert_eq!(wizard.current_step(), expected);
            assert_eq!(wizard.form(), &before);
        }
        assert!(wizard.is_last());
        assert!(!wizard.next());
        assert_eq!(wizard.current_step(), TOTAL_STEPS - 1);
    }

    #[test]
    fn invalid_step_keeps_position_and_reports_errors() {
        let mut wizard = PropertyWizard::default();
        assert!(!wizard.next());
        assert_eq!(wizard.current_step(), 0);
        assert!(!wizard.errors().is_empty());
        assert!(wizard.errors().contains("name"));
    }

    #[test]
    fn negative_hourly_rate_blocks_pricing_step() {
        let mut form = valid_form();
        form.pricing.price_per_hour = -5.0;
        let mut wizard = PropertyWizard::new(form);

        assert!(wizard.go_to(WizardStep::Pricing.index()));
        assert!(!wizard.next());
        assert_eq!(wizard.step(), WizardStep::Pricing);
        let messages = wizard.errors().get("price_per_hour").unwrap();
        assert!(messages[0].contains("positive"));
    }

    #[test]
    fn previous_and_go_to_skip_validation() {
        let mut wizard = PropertyWizard::default();
        assert!(!wizard.previous());
        assert!(wizard.is_first());

        assert!(wizard.go_to(5));
        assert_eq!(wizard.current_step(), 5);
        assert!(wizard.previous());
        assert_eq!(wizard.current_step(), 4);

        assert!(!wizard.go_to(TOTAL_STEPS));
        assert_eq!(wizard.current_step(), 4);
    }

    #[test]
    fn unit_toggle_scenario() {
        let mut wizard = PropertyWizard::new(valid_form());
        assert_eq!(
            wizard.dimension_inputs().display(DimensionField::SizeSqft),
            "92.90"
        );
        wizard.toggle_units();
        assert_eq!(
            wizard.dimension_inputs().display(DimensionField::SizeSqft),
            "1000.00"
        );
        wizard.toggle_units();
        assert_eq!(
            wizard.dimension_inputs().display(DimensionField::SizeSqft),
            "92.90"
        );
        assert_eq!(wizard.form().dimensions.size_sqft, 1000.0);
    }

    #[test]
    fn discount_keystrokes_are_clamped() {
        let mut wizard = PropertyWizard::default();
        assert_eq!(
            wizard.input_pricing(PricingField::DiscountWeekly, "150"),
            Some(100.0)
        );
        assert_eq!(wizard.form().pricing.discount_weekly, 100.0);
    }

    #[test]
    fn patch_replaces_only_given_sections() {
        let mut wizard = PropertyWizard::new(valid_form());
        let patch: FormPatch =
            serde_json::from_str(r#"{"rules": {"no_pets": true, "cancellation_policy": "strict"}}"#)
                .unwrap();
        wizard.apply_patch(patch);

        assert!(wizard.form().rules.no_pets);
        assert_eq!(wizard.form().basics.name, "Sunlit loft");
    }

    #[tokio::test]
    async fn submit_creates_listing_with_images() {
        let store = Arc::new(RecordingStore::default());
        let owner = Uuid::new_v4();
        let ctx = context(Session::authenticated(owner), store.clone());

        let mut wizard = PropertyWizard::new(valid_form());
        let report = wizard
            .add_photos(
                &ctx,
                vec![
                    file("a.jpg", "image/jpeg", 1024),
                    file("b.webp", "image/webp", 1024),
                ],
            )
            .await
            .unwrap();
        assert_eq!(report.uploaded.len(), 2);
        wizard.set_cover(1).unwrap();

        let state = wizard.submit(&ctx).await.clone();
        assert_eq!(state.status, SubmissionStatus::Success);
        assert!(state.property_id.is_some());

        let properties = store.properties.lock().unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].0, owner);
        let images = store.images.lock().unwrap();
        assert_eq!(images.len(), 2);
        assert!(images[1].is_cover);
        assert_eq!(Some(images[0].property_id), state.property_id);
    }

    #[tokio::test]
    async fn submit_without_session_is_an_error() {
        let store = Arc::new(RecordingStore::default());
        let ctx = context(Session::anonymous(), store.clone());
        let mut wizard = PropertyWizard::new(valid_form());

        let state = wizard.submit(&ctx).await;
        assert_eq!(state.status, SubmissionStatus::Error);
        assert!(store.properties.lock().unwrap().is_empty());

        let upload = wizard
            .add_photos(&ctx, vec![file("a.jpg", "image/jpeg", 10)])
            .await;
        assert!(matches!(upload, Err(AppError::UnauthorizedError)));
    }

    #[tokio::test]
    async fn invalid_form_is_not_submitted() {
        let store = Arc::new(RecordingStore::default());
        let ctx = context(Session::authenticated(Uuid::new_v4()), store.clone());
        let mut wizard = PropertyWizard::default();

        let state = wizard.submit(&ctx).await;
        assert_eq!(state.status, SubmissionStatus::Error);
        assert!(!wizard.errors().is_empty());
        assert!(store.properties.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_keeps_the_form_for_retry() {
        let ctx = context(Session::authenticated(Uuid::new_v4()), Arc::new(FailingStore));
        let mut wizard = PropertyWizard::new(valid_form());

        let state = wizard.submit(&ctx).await.clone();
        assert_eq!(state.status, SubmissionStatus::Error);
        assert!(state.message.unwrap().contains("database offline"));
        assert_eq!(wizard.form(), &valid_form());
    }

    #[tokio::test]
    async fn image_metadata_failure_still_succeeds() {
        let store = Arc::new(RecordingStore {
            fail_images: true,
            ..RecordingStore::default()
        });
        let ctx = context(Session::authenticated(Uuid::new_v4()), store.clone());
        let mut wizard = PropertyWizard::new(valid_form());
        wizard
            .add_photos(&ctx, vec![file("a.jpg", "image/jpeg", 10)])
            .await
            .unwrap();

        let state = wizard.submit(&ctx).await;
        assert_eq!(state.status, SubmissionStatus::Success);
    }

    #[test]
    fn availability_last_write_wins() {
        let mut wizard = PropertyWizard::default();
        let date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        wizard.apply_availability(&[date], DateAction::Block, None);
        wizard.apply_availability(&[date], DateAction::Price, Some(120.0));

        let availability = &wizard.form().availability;
        assert_eq!(availability.overrides.len(), 1);
        assert!(!availability.is_blocked(date));
        assert_eq!(availability.special_price(date), Some(120.0));

        wizard.set_default_availability(None);
        assert!(!wizard.form().availability.default_availability);
    }
}
