use std::collections::BTreeMap;

use serde::Serialize;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::features::wizard::schemas::{PropertyFormValue, WizardStep};

/// Field name -> messages, shown inline next to the offending inputs.
#[derive(Serialize, PartialEq, Eq, Default, Clone, Debug)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// First message of every field, joined for a single-line summary.
    pub fn summary(&self) -> String {
        self.0
            .values()
            .filter_map(|messages| messages.first())
            .cloned()
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn collect(&mut self, errors: &ValidationErrors, prefix: Option<&str>) {
        for (field, kind) in errors.errors() {
            let field: &str = field;
            match kind {
                ValidationErrorsKind::Field(list) => {
                    for error in list {
                        // struct-level errors are reported under their code
                        let name = if field == "__all__" {
                            error.code.to_string()
                        } else {
                            field.to_string()
                        };
                        let key = match prefix {
                            Some(prefix) => format!("{prefix}.{name}"),
                            None => name,
                        };
                        let message = error
                            .message
                            .as_ref()
                            .map(|message| message.to_string())
                            .unwrap_or_else(|| format!("{key} is invalid"));
                        self.insert(key, message);
                    }
                }
                // sections flatten into their leaf field names
                ValidationErrorsKind::Struct(inner) => self.collect(inner, prefix),
                ValidationErrorsKind::List(items) => {
                    for (index, inner) in items {
                        let item_prefix = match prefix {
                            Some(prefix) => format!("{prefix}.{field}[{index}]"),
                            None => format!("{field}[{index}]"),
                        };
                        self.collect(inner, Some(&item_prefix));
                    }
                }
            }
        }
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut field_errors = FieldErrors::default();
        field_errors.collect(errors, None);
        field_errors
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        FieldErrors::from(&errors)
    }
}

fn into_field_errors(result: Result<(), ValidationErrors>) -> FieldErrors {
    match result {
        Ok(()) => FieldErrors::default(),
        Err(errors) => errors.into(),
    }
}

/// Validates only the fields owned by `step`.
pub fn validate_step(step: WizardStep, form: &PropertyFormValue) -> FieldErrors {
    let result = match step {
        WizardStep::Basics => form.basics.validate(),
        WizardStep::Address => form.address.validate(),
        WizardStep::Dimensions => form.dimensions.validate(),
        WizardStep::Capacity => form.capacity.validate(),
        WizardStep::Photos => form.photos.validate(),
        WizardStep::Pricing => form.pricing.validate(),
        WizardStep::Rules => form.rules.validate(),
        WizardStep::Availability => form.availability.validate(),
    };
    into_field_errors(result)
}

pub fn validate_form(form: &PropertyFormValue) -> FieldErrors {
    into_field_errors(form.validate())
}
