//! # libris-core: Pure Business Logic for Libris
//!
//! This crate is the **heart** of Libris. It holds the loan and fine rules
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Libris Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Presentation (not in this workspace)         │   │
//! │  │    Catalog ──► Book Details ──► Profile ──► Payment ──► Admin   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ in-process calls                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    libris-ledger                                │   │
//! │  │    borrow, return_loan, settle_payment, borrower_summary       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ libris-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   fine    │  │ validation│  │   │
//! │  │   │  Title    │  │   Money   │  │FinePolicy │  │   rules   │  │   │
//! │  │   │  Loan     │  │           │  │ Overdue.. │  │   dates   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO STORAGE • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Title, Loan, Payment, Borrower, read models)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`fine`] - Overdue and fine calculation
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation and date parsing
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use libris_core::{FinePolicy, Money};
//!
//! let policy = FinePolicy::new(30, Money::from_cents(100));
//! let borrowed = NaiveDate::from_ymd_opt(2023, 5, 15).unwrap();
//! let due = policy.due_date(borrowed);
//! assert_eq!(due, NaiveDate::from_ymd_opt(2023, 6, 14).unwrap());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fine;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use fine::{FinePolicy, OverdueAssessment};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default loan period in days.
pub const DEFAULT_LOAN_PERIOD_DAYS: u32 = 30;

/// Default fine per overdue day, in cents ($1.00).
pub const DEFAULT_DAILY_FINE_CENTS: i64 = 100;

/// Titles with less than this share of copies on the shelf are "low stock"
/// on the admin dashboard.
pub const DEFAULT_LOW_STOCK_PERCENT: u32 = 30;
