use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::category::Category;
use crate::domain::listing::{Listing, NewListing};
use crate::domain::types::{
    CategoryId, ImageUrl, ListingDescription, ListingPrice, ListingTitle, TypeConstraintError,
    is_valid_key, is_valid_url,
};
use crate::forms::{FieldErrors, FormPhase, field_error, require_text};

pub const TITLE_REQUIRED: &str = "Title is required";
pub const DESCRIPTION_REQUIRED: &str = "Description is required";
pub const PRICE_REQUIRED: &str = "Price is required";
pub const PRICE_NOT_POSITIVE: &str = "Price must be a positive number";
pub const CATEGORY_REQUIRED: &str = "Category is required";
pub const CATEGORY_UNKNOWN: &str = "Selected category does not exist";
pub const IMAGE_URL_REQUIRED: &str = "Image URL is required";
pub const IMAGE_URL_INVALID: &str = "Please enter a valid URL";

/// Parse a price as typed into the form.
pub fn parse_price(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price > 0.0)
}

fn validate_title(value: &str) -> Result<(), ValidationError> {
    require_text(value, TITLE_REQUIRED)
}

fn validate_description(value: &str) -> Result<(), ValidationError> {
    require_text(value, DESCRIPTION_REQUIRED)
}

fn validate_price(value: &str) -> Result<(), ValidationError> {
    require_text(value, PRICE_REQUIRED)?;
    match parse_price(value) {
        Some(_) => Ok(()),
        None => Err(field_error("positive", PRICE_NOT_POSITIVE)),
    }
}

fn validate_category_id(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(field_error("required", CATEGORY_REQUIRED))
    } else if !is_valid_key(value) {
        Err(field_error("unknown", CATEGORY_UNKNOWN))
    } else {
        Ok(())
    }
}

fn validate_image_url(value: &str) -> Result<(), ValidationError> {
    require_text(value, IMAGE_URL_REQUIRED)?;
    if is_valid_url(value.trim()) {
        Ok(())
    } else {
        Err(field_error("url", IMAGE_URL_INVALID))
    }
}

/// Raw listing form fields as posted by the browser. The price stays text
/// until submit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, Validate)]
pub struct ListingForm {
    #[validate(custom(function = "validate_title"))]
    #[serde(default)]
    pub title: String,
    #[validate(custom(function = "validate_description"))]
    #[serde(default)]
    pub description: String,
    #[validate(custom(function = "validate_price"))]
    #[serde(default)]
    pub price: String,
    #[validate(custom(function = "validate_category_id"))]
    #[serde(default)]
    pub category_id: String,
    #[validate(custom(function = "validate_image_url"))]
    #[serde(default)]
    pub image_url: String,
}

impl From<&Listing> for ListingForm {
    fn from(listing: &Listing) -> Self {
        Self {
            title: listing.title.to_string(),
            description: listing.description.to_string(),
            price: listing.price.to_string(),
            category_id: listing.category_id.to_string(),
            image_url: listing.image_url.to_string(),
        }
    }
}

/// Validated listing submission. Timestamps are never part of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFormPayload {
    pub title: ListingTitle,
    pub description: ListingDescription,
    pub price: ListingPrice,
    pub category_id: CategoryId,
    pub image_url: ImageUrl,
}

impl ListingFormPayload {
    pub fn into_new_listing(self) -> NewListing {
        NewListing {
            title: self.title,
            description: self.description,
            price: self.price,
            category_id: self.category_id,
            image_url: self.image_url,
        }
    }
}

#[derive(Debug, Error)]
pub enum ListingFormError {
    #[error("Listing form validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("Listing form contains invalid data: {0}")]
    TypeConstraint(TypeConstraintError),
}

impl From<ValidationErrors> for ListingFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<TypeConstraintError> for ListingFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value)
    }
}

impl TryFrom<ListingForm> for ListingFormPayload {
    type Error = ListingFormError;

    fn try_from(value: ListingForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let price = parse_price(&value.price)
            .ok_or(TypeConstraintError::NonPositiveNumber("price"))?;

        Ok(Self {
            title: ListingTitle::new(value.title)?,
            description: ListingDescription::new(value.description)?,
            price: ListingPrice::new(price)?,
            category_id: CategoryId::new(value.category_id)?,
            image_url: ImageUrl::new(value.image_url)?,
        })
    }
}

/// Fields of [`ListingForm`] a user can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingField {
    Title,
    Description,
    Price,
    CategoryId,
    ImageUrl,
}

impl ListingField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Price => "price",
            Self::CategoryId => "category_id",
            Self::ImageUrl => "image_url",
        }
    }
}

/// Options of the category selector.
///
/// The list is fetched when the form opens. A category id supplied up front
/// (e.g. when arriving from a category page) waits in `Pending` and is applied
/// once the list arrives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CategoryOptions {
    Pending { preselected: Option<String> },
    Loaded { categories: Vec<Category> },
}

/// Listing form together with its validation state and category options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingFormState {
    pub values: ListingForm,
    pub errors: FieldErrors,
    pub phase: FormPhase,
    pub options: CategoryOptions,
}

impl ListingFormState {
    /// Open the form, pre-filled from `initial` when editing.
    pub fn new(initial: Option<&Listing>, preselected: Option<String>) -> Self {
        Self {
            values: initial.map(ListingForm::from).unwrap_or_default(),
            errors: FieldErrors::new(),
            phase: FormPhase::Idle,
            options: CategoryOptions::Pending {
                preselected: preselected.filter(|id| !id.is_empty()),
            },
        }
    }

    /// State of a form the browser has just posted.
    pub fn submitted(values: ListingForm) -> Self {
        Self {
            values,
            errors: FieldErrors::new(),
            phase: FormPhase::Editing,
            options: CategoryOptions::Pending { preselected: None },
        }
    }

    /// Second step of opening the form: the category list arrived.
    ///
    /// A pending pre-selection is applied only while it is still relevant:
    /// the user has not picked a category yet and the id is among the loaded
    /// categories.
    pub fn categories_loaded(mut self, categories: Vec<Category>) -> Self {
        if let CategoryOptions::Pending {
            preselected: Some(id),
        } = &self.options
        {
            let known = categories.iter().any(|c| c.id.as_str() == id.as_str());
            if self.values.category_id.is_empty() && known {
                self.values.category_id = id.clone();
            }
        }
        self.options = CategoryOptions::Loaded { categories };
        self
    }

    /// Categories available for selection; empty until loaded.
    pub fn categories(&self) -> &[Category] {
        match &self.options {
            CategoryOptions::Loaded { categories } => categories,
            CategoryOptions::Pending { .. } => &[],
        }
    }

    /// Change one field, clearing its pending error until the next submit.
    pub fn edit(mut self, field: ListingField, value: impl Into<String>) -> Self {
        let value = value.into();
        match field {
            ListingField::Title => self.values.title = value,
            ListingField::Description => self.values.description = value,
            ListingField::Price => self.values.price = value,
            ListingField::CategoryId => self.values.category_id = value,
            ListingField::ImageUrl => self.values.image_url = value,
        }
        self.errors.clear(field.as_str());
        self.phase = FormPhase::Editing;
        self
    }

    /// Validate every field independently. On failure the form comes back
    /// with one message per invalid field.
    pub fn submit(mut self) -> Result<ListingFormPayload, Self> {
        match ListingFormPayload::try_from(self.values.clone()) {
            Ok(payload) => Ok(payload),
            Err(err) => {
                self.errors = match &err {
                    ListingFormError::Validation(errors) => FieldErrors::from(errors),
                    ListingFormError::TypeConstraint(e) => {
                        let mut errors = FieldErrors::new();
                        errors.set(field_for_constraint(e).as_str(), e.to_string());
                        errors
                    }
                };
                self.phase = FormPhase::Editing;
                Err(self)
            }
        }
    }

    /// Attach an error produced outside validation, such as a category that
    /// disappeared between rendering and submitting.
    pub fn with_error(mut self, field: ListingField, message: impl Into<String>) -> Self {
        self.errors.set(field.as_str(), message);
        self.phase = FormPhase::Editing;
        self
    }
}

fn field_for_constraint(error: &TypeConstraintError) -> ListingField {
    match error {
        TypeConstraintError::InvalidKey(_) => ListingField::CategoryId,
        TypeConstraintError::NonPositiveNumber(_) => ListingField::Price,
        TypeConstraintError::InvalidUrl(_) => ListingField::ImageUrl,
        TypeConstraintError::EmptyString("description") => ListingField::Description,
        _ => ListingField::Title,
    }
}
