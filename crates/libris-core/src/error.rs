//! # Error Types
//!
//! Domain-specific error types for libris-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  CoreError        - Ledger and lifecycle failures                      │
//! │  ├── NotFound            unknown title / loan / borrower               │
//! │  ├── Unavailable         no copies left to borrow                      │
//! │  ├── AlreadyReturned     double return                                 │
//! │  ├── InvariantViolation  over-return, a caller/data defect             │
//! │  ├── InvalidAmount       non-positive payment                          │
//! │  ├── InvalidDate         malformed or out-of-order date                │
//! │  └── Validation          wraps ValidationError                         │
//! │                                                                         │
//! │  ValidationError  - Input validation failures (admin forms)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → presentation layer message        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (title ID, loan ID, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each variant is either user-facing or a defect, see [`CoreError::is_user_facing`]

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors returned by ledger operations.
///
/// All of them are terminal for the single requested operation and none is
/// retried internally. Nothing here should bring the process down.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Unknown title, loan, borrower or payment.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Title has no copies left on the shelf.
    ///
    /// ## User Workflow
    /// ```text
    /// Click "Borrow" on a title
    ///      │
    ///      ▼
    /// Inventory: available_copies = 0
    ///      │
    ///      ▼
    /// Unavailable { title_id: "3" }
    ///      │
    ///      ▼
    /// UI shows: "Book is not available"
    /// ```
    #[error("Title {title_id} has no copies available")]
    Unavailable { title_id: String },

    /// Loan has already been returned.
    #[error("Loan {loan_id} has already been returned")]
    AlreadyReturned { loan_id: String },

    /// An operation would break a copy-count invariant.
    ///
    /// ## When This Occurs
    /// - Returning a copy when `available_copies == total_copies`
    ///
    /// This means the data or the caller is broken. It is logged as a defect
    /// and the operation is aborted without partial state change.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Payment amount is invalid.
    #[error("Invalid payment amount: {reason}")]
    InvalidAmount { reason: String },

    /// Date input is malformed or out of order.
    #[error("Invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    /// Title still has copies out on loan.
    #[error("Title {title_id} has {active_loans} active loan(s)")]
    TitleInUse { title_id: String, active_loans: usize },

    /// Borrower still holds books.
    #[error("Borrower {borrower_id} has {active_loans} active loan(s)")]
    BorrowerHasLoans {
        borrower_id: String,
        active_loans: usize,
    },

    /// Unique value already taken (ISBN, email).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Configuration could not be loaded or is out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an InvalidDate error.
    pub fn invalid_date(value: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidDate {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error should be rendered to the user as an
    /// actionable message rather than reported as a defect.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            CoreError::InvariantViolation(_) | CoreError::Config(_)
        )
    }

    /// Short machine-readable code for the presentation layer.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::Unavailable { .. } => "UNAVAILABLE",
            CoreError::AlreadyReturned { .. } => "ALREADY_RETURNED",
            CoreError::InvariantViolation(_) => "INVARIANT_VIOLATION",
            CoreError::InvalidAmount { .. } => "INVALID_AMOUNT",
            CoreError::InvalidDate { .. } => "INVALID_DATE",
            CoreError::TitleInUse { .. } => "TITLE_IN_USE",
            CoreError::BorrowerHasLoans { .. } => "BORROWER_HAS_LOANS",
            CoreError::Duplicate { .. } => "DUPLICATE",
            CoreError::Config(_) => "CONFIG_ERROR",
            CoreError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when admin form input doesn't meet requirements.
/// Used for early validation before any store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid ISBN, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
