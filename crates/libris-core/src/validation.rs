//! # Validation Module
//!
//! Input validation for admin forms, payments and dates.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation                                                 │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Field rules, run before any store is touched                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Ledger                                                       │
//! │  ├── Copy-count invariants                                             │
//! │  └── Uniqueness (ISBN, email)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use libris_core::validation::{parse_date, validate_isbn};
//!
//! assert!(validate_isbn("978-0-7432-7356-5").is_ok());
//! assert!(parse_date("2023-06-15").is_ok());
//! assert!(parse_date("15/06/2023").is_err());
//! ```

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{NewBorrower, NewTitle, TitleDetails};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Date format used across the library: `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an ISBN-10 or ISBN-13.
///
/// ## Rules
/// - Hyphens and spaces are ignored
/// - 13 digits, or 10 characters where only the last may be `X`
/// - Check digits are not verified (the catalog holds hand-entered data)
pub fn validate_isbn(isbn: &str) -> ValidationResult<()> {
    let digits: Vec<char> = isbn.chars().filter(|c| *c != '-' && *c != ' ').collect();

    if digits.is_empty() {
        return Err(ValidationError::Required {
            field: "isbn".to_string(),
        });
    }

    let valid = match digits.len() {
        13 => digits.iter().all(|c| c.is_ascii_digit()),
        10 => {
            digits[..9].iter().all(|c| c.is_ascii_digit())
                && (digits[9].is_ascii_digit() || digits[9] == 'X' || digits[9] == 'x')
        }
        _ => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "isbn".to_string(),
            reason: "must be 10 or 13 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address (shape only).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    validate_text("email", email, 254)?;

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid || email.contains(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates a catalog search term.
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates copy counts of a title.
///
/// ## Rules
/// - `total_copies >= 1`
/// - `0 <= available_copies <= total_copies`
pub fn validate_copies(total_copies: u32, available_copies: u32) -> ValidationResult<()> {
    if total_copies == 0 {
        return Err(ValidationError::MustBePositive {
            field: "total_copies".to_string(),
        });
    }

    if available_copies > total_copies {
        return Err(ValidationError::OutOfRange {
            field: "available_copies".to_string(),
            min: 0,
            max: i64::from(total_copies),
        });
    }

    Ok(())
}

/// Validates a publication year.
pub fn validate_publication_year(year: i32) -> ValidationResult<()> {
    if !(0..=9999).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field: "publication_year".to_string(),
            min: 0,
            max: 9999,
        });
    }

    Ok(())
}

/// Validates a payment amount.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// ## Errors
/// `InvalidAmount` rather than a `ValidationError`: the ledger reports it
/// to the payment view as-is.
pub fn validate_payment_amount(amount: Money) -> CoreResult<()> {
    if !amount.is_positive() {
        return Err(CoreError::InvalidAmount {
            reason: format!("{} is not a positive amount", amount),
        });
    }

    Ok(())
}

// =============================================================================
// Dates
// =============================================================================

/// Parses a `YYYY-MM-DD` calendar date.
///
/// ## Errors
/// `InvalidDate` carrying the offending input.
pub fn parse_date(value: &str) -> CoreResult<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|e| CoreError::invalid_date(trimmed, e.to_string()))
}

// =============================================================================
// Form Validators
// =============================================================================

/// Validates the bibliographic fields of a title.
pub fn validate_title_details(details: &TitleDetails) -> ValidationResult<()> {
    validate_text("title", &details.title, 200)?;
    validate_text("author", &details.author, 200)?;
    validate_isbn(&details.isbn)?;
    validate_publication_year(details.publication_year)?;
    validate_text("genre", &details.genre, 50)?;
    Ok(())
}

/// Validates the admin "Add Book" form.
pub fn validate_new_title(new_title: &NewTitle) -> ValidationResult<()> {
    validate_text("title", &new_title.title, 200)?;
    validate_text("author", &new_title.author, 200)?;
    validate_isbn(&new_title.isbn)?;
    validate_publication_year(new_title.publication_year)?;
    validate_text("genre", &new_title.genre, 50)?;
    validate_copies(new_title.total_copies, new_title.available_copies)?;
    Ok(())
}

/// Validates the admin "Add User" form.
pub fn validate_new_borrower(borrower: &NewBorrower) -> ValidationResult<()> {
    validate_text("name", &borrower.name, 100)?;
    validate_email(&borrower.email)?;
    Ok(())
}

/// Normalizes an ISBN for uniqueness checks (digits and `X` only).
pub fn normalize_isbn(isbn: &str) -> String {
    isbn.chars()
        .filter(|c| *c != '-' && *c != ' ')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
