//! # Validation Module
//!
//! Form validation rules, run client-side before a request is issued.
//!
//! ## Strategy
//! Validation here is the first of two layers: it gives immediate feedback
//! without a round trip, and the server re-validates everything (422
//! responses carry field-keyed message lists for anything missed here).
//!
//! Schema-level validators collect every failure instead of stopping at
//! the first, so forms can highlight all broken fields at once.

use std::collections::HashMap;

use crate::error::ValidationError;
use crate::types::{
    CreateCategoryRequest, CreateProductRequest, CreateUserRequest, LoginCredentials,
    RegisterData, UpdateTransactionRequest, UpdateUserRequest,
};

/// Result of a schema validation: empty error list means valid.
pub type SchemaResult = Result<(), Vec<ValidationError>>;

const MAX_TEXT: usize = 255;
const MAX_DESCRIPTION: usize = 1000;
const MIN_PASSWORD: usize = 8;
const MAX_PRICE: i64 = 999_999_999;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates an email address.
///
/// ## Rules
/// - required, at most 255 characters
/// - one `@` with a non-empty local part and a dotted domain
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > MAX_TEXT {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_TEXT,
        });
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must be a valid email address".to_string(),
        });
    }

    Ok(())
}

/// Validates a password.
///
/// ## Rules
/// - required, 8 to 255 characters
/// - `strong`: must contain a lowercase letter, an uppercase letter, and a
///   digit (applied on registration, not on login)
pub fn validate_password(password: &str, strong: bool) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.len() < MIN_PASSWORD {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD,
        });
    }

    if password.len() > MAX_TEXT {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: MAX_TEXT,
        });
    }

    if strong {
        let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        if !(has_lower && has_upper && has_digit) {
            return Err(ValidationError::InvalidFormat {
                field: "password".to_string(),
                reason: "must contain a lowercase letter, an uppercase letter, and a number"
                    .to_string(),
            });
        }
    }

    Ok(())
}

/// Validates a person name.
///
/// ## Rules
/// - required, 2 to 255 characters
/// - letters and spaces only
pub fn validate_person_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() < 2 {
        return Err(ValidationError::TooShort {
            field: "name".to_string(),
            min: 2,
        });
    }

    if name.len() > MAX_TEXT {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_TEXT,
        });
    }

    if !name.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return Err(ValidationError::InvalidFormat {
            field: "name".to_string(),
            reason: "can only contain letters and spaces".to_string(),
        });
    }

    Ok(())
}

/// Validates a product or category display name (1 to 255 characters).
pub fn validate_title(field: &str, value: &str) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_TEXT {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT,
        });
    }

    Ok(())
}

/// Validates an optional long-form description (max 1000 characters).
pub fn validate_description(description: Option<&str>) -> Result<(), ValidationError> {
    if let Some(text) = description {
        if text.len() > MAX_DESCRIPTION {
            return Err(ValidationError::TooLong {
                field: "description".to_string(),
                max: MAX_DESCRIPTION,
            });
        }
    }
    Ok(())
}

/// Validates a price in rupiah (non-negative, below the sanity ceiling).
pub fn validate_price(rupiah: i64) -> Result<(), ValidationError> {
    if rupiah < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    if rupiah > MAX_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE,
        });
    }

    Ok(())
}

/// Validates a stock count (non-negative).
pub fn validate_stock(stock: i64) -> Result<(), ValidationError> {
    if stock < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

/// Validates a requested cart quantity (1 to the per-line maximum).
///
/// Quantity forms call this before issuing a request; zero is not an
/// error here because stores translate it into a removal.
pub fn validate_quantity(quantity: i64) -> Result<(), ValidationError> {
    if quantity < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "quantity".to_string(),
        });
    }

    if quantity > crate::MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: crate::MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates optional notes attached to an order (max 1000 characters).
pub fn validate_notes(notes: Option<&str>) -> Result<(), ValidationError> {
    if let Some(text) = notes {
        if text.len() > MAX_DESCRIPTION {
            return Err(ValidationError::TooLong {
                field: "notes".to_string(),
                max: MAX_DESCRIPTION,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Schema Validators
// =============================================================================

fn collect(checks: Vec<Result<(), ValidationError>>) -> SchemaResult {
    let errors: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Login form: email + password (no strength requirement).
pub fn validate_login(credentials: &LoginCredentials) -> SchemaResult {
    collect(vec![
        validate_email(&credentials.email),
        validate_password(&credentials.password, false),
    ])
}

/// Registration form: name, email, strong password, matching confirmation.
pub fn validate_register(data: &RegisterData) -> SchemaResult {
    let mut checks = vec![
        validate_person_name(&data.name),
        validate_email(&data.email),
        validate_password(&data.password, true),
    ];

    if data.password_confirmation.is_empty() {
        checks.push(Err(ValidationError::Required {
            field: "password_confirmation".to_string(),
        }));
    } else if data.password != data.password_confirmation {
        checks.push(Err(ValidationError::Mismatch {
            field: "password_confirmation".to_string(),
            other: "password".to_string(),
        }));
    }

    collect(checks)
}

/// Admin user creation form.
pub fn validate_create_user(data: &CreateUserRequest) -> SchemaResult {
    collect(vec![
        validate_person_name(&data.name),
        validate_email(&data.email),
        validate_password(&data.password, false),
    ])
}

/// Admin user update form (password optional: empty means unchanged).
pub fn validate_update_user(data: &UpdateUserRequest) -> SchemaResult {
    let mut checks = vec![
        validate_person_name(&data.name),
        validate_email(&data.email),
    ];

    if let Some(password) = data.password.as_deref() {
        if !password.is_empty() {
            checks.push(validate_password(password, false));
        }
    }

    collect(checks)
}

/// Product form.
pub fn validate_product(data: &CreateProductRequest) -> SchemaResult {
    collect(vec![
        validate_title("name", &data.name),
        validate_description(data.description.as_deref()),
        validate_price(data.price.rupiah()),
        validate_stock(data.stock),
    ])
}

/// Category form.
pub fn validate_category(data: &CreateCategoryRequest) -> SchemaResult {
    collect(vec![
        validate_title("name", &data.name),
        validate_description(data.description.as_deref()),
    ])
}

/// Admin transaction update form.
pub fn validate_transaction_update(data: &UpdateTransactionRequest) -> SchemaResult {
    collect(vec![validate_notes(data.notes.as_deref())])
}

/// Groups schema errors by field, mirroring the server's 422 shape.
pub fn errors_by_field(errors: &[ValidationError]) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for error in errors {
        map.entry(error.field().to_string())
            .or_default()
            .push(error.to_string());
    }
    map
}

// =============================================================================
// Unit Tests
// =============================================================================
