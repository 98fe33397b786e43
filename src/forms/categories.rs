use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::category::{Category, NewCategory};
use crate::domain::types::{CategoryId, CategoryName, TypeConstraintError};
use crate::forms::{FieldErrors, FormPhase, require_text};

pub const NAME_REQUIRED: &str = "Category name is required";

fn validate_name(value: &str) -> Result<(), ValidationError> {
    require_text(value, NAME_REQUIRED)
}

/// Raw category form fields as posted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, Validate)]
pub struct CategoryForm {
    #[validate(custom(function = "validate_name"))]
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl From<&Category> for CategoryForm {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.to_string(),
            description: category.description.clone().unwrap_or_default(),
        }
    }
}

/// Validated category submission.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFormPayload {
    pub name: CategoryName,
    pub description: Option<String>,
}

impl CategoryFormPayload {
    pub fn into_new_category(self) -> NewCategory {
        NewCategory {
            name: self.name,
            description: self.description,
        }
    }

    /// Full replacement record for the category stored at `id`.
    pub fn into_category(self, id: CategoryId) -> Category {
        self.into_new_category().with_id(id)
    }
}

#[derive(Debug, Error)]
pub enum CategoryFormError {
    #[error("Category form validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("Category form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for CategoryFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<TypeConstraintError> for CategoryFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<CategoryForm> for CategoryFormPayload {
    type Error = CategoryFormError;

    fn try_from(value: CategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let description = value.description.trim();

        Ok(Self {
            name: CategoryName::new(value.name)?,
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }
}

/// Fields of [`CategoryForm`] a user can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Name,
    Description,
}

impl CategoryField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
        }
    }
}

/// Category form together with its validation state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryFormState {
    pub values: CategoryForm,
    pub errors: FieldErrors,
    pub phase: FormPhase,
}

impl CategoryFormState {
    /// Empty form, or one pre-filled from an existing category.
    pub fn new(initial: Option<&Category>) -> Self {
        Self {
            values: initial.map(CategoryForm::from).unwrap_or_default(),
            errors: FieldErrors::new(),
            phase: FormPhase::Idle,
        }
    }

    /// State of a form the browser has just posted.
    pub fn submitted(values: CategoryForm) -> Self {
        Self {
            values,
            errors: FieldErrors::new(),
            phase: FormPhase::Editing,
        }
    }

    /// Change one field. A pending error on that field is cleared right away
    /// and only re-checked on the next submit.
    pub fn edit(mut self, field: CategoryField, value: impl Into<String>) -> Self {
        let value = value.into();
        match field {
            CategoryField::Name => self.values.name = value,
            CategoryField::Description => self.values.description = value,
        }
        self.errors.clear(field.as_str());
        self.phase = FormPhase::Editing;
        self
    }

    /// Validate every field. On failure the form comes back with one message
    /// per invalid field and nothing may be written.
    pub fn submit(mut self) -> Result<CategoryFormPayload, Self> {
        match CategoryFormPayload::try_from(self.values.clone()) {
            Ok(payload) => Ok(payload),
            Err(err) => {
                self.errors = match &err {
                    CategoryFormError::Validation(errors) => FieldErrors::from(errors),
                    CategoryFormError::TypeConstraint(_) => {
                        let mut errors = FieldErrors::new();
                        errors.set(CategoryField::Name.as_str(), NAME_REQUIRED);
                        errors
                    }
                };
                self.phase = FormPhase::Editing;
                Err(self)
            }
        }
    }

    /// Attach an error coming from outside validation, e.g. a store failure
    /// reported against a field.
    pub fn with_error(mut self, field: CategoryField, message: impl Into<String>) -> Self {
        self.errors.set(field.as_str(), message);
        self
    }
}
