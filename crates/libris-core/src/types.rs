//! # Domain Types
//!
//! Core domain types used throughout Libris.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Title       │   │      Loan       │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  title_id       │   │  id             │       │
//! │  │  isbn           │   │  borrower_id ───┼─┐ │  borrower_id ───┼─┐     │
//! │  │  total_copies   │   │  due_date       │ │ │  amount         │ │     │
//! │  │  available_...  │   │  status         │ │ │  applied_amount │ │     │
//! │  └─────────────────┘   └─────────────────┘ │ └─────────────────┘ │     │
//! │                                            ▼                     ▼     │
//! │                                   ┌─────────────────┐                  │
//! │                                   │    Borrower     │                  │
//! │                                   │  id, name, role │                  │
//! │                                   └─────────────────┘                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fines are deliberately absent from `Loan`: they are derived by
//! [`crate::fine::FinePolicy`] on every query.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::fine::OverdueAssessment;
use crate::money::Money;
use crate::validation::normalize_isbn;

// =============================================================================
// Title
// =============================================================================

/// A catalog entry and its copy counts (not a physical copy).
///
/// ## Invariant
/// `available_copies <= total_copies` and `total_copies >= 1`. Only the
/// ledger changes `available_copies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub id: String,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i32,
    pub publisher: String,
    pub genre: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub total_copies: u32,
    pub available_copies: u32,
}

impl Title {
    /// True while at least one copy is on the shelf.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// Copies currently out on loan.
    #[inline]
    pub fn on_loan(&self) -> u32 {
        self.total_copies.saturating_sub(self.available_copies)
    }

    /// Availability snapshot for the catalog and details views.
    pub fn availability(&self) -> Availability {
        Availability {
            available: self.is_available(),
            available_copies: self.available_copies,
            total_copies: self.total_copies,
        }
    }

    /// True if the available share is strictly below `percent`.
    pub fn is_low_stock(&self, percent: u32) -> bool {
        // available / total < percent / 100, in integers
        u64::from(self.available_copies) * 100 < u64::from(percent) * u64::from(self.total_copies)
    }
}

/// Copy counts of a title at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub available: bool,
    pub available_copies: u32,
    pub total_copies: u32,
}

/// Admin form input for a new title.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewTitle {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i32,
    pub publisher: String,
    pub genre: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub total_copies: u32,
    pub available_copies: u32,
}

/// Editable bibliographic fields. Copy counts are changed separately.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TitleDetails {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i32,
    pub publisher: String,
    pub genre: String,
    pub description: String,
    pub cover_image: Option<String>,
}

impl From<&Title> for TitleDetails {
    fn from(title: &Title) -> Self {
        TitleDetails {
            title: title.title.clone(),
            author: title.author.clone(),
            isbn: title.isbn.clone(),
            publication_year: title.publication_year,
            publisher: title.publisher.clone(),
            genre: title.genre.clone(),
            description: title.description.clone(),
            cover_image: title.cover_image.clone(),
        }
    }
}

// =============================================================================
// Loan
// =============================================================================

/// Lifecycle of a loan: `Active --(return)--> Returned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Borrower holds the copy.
    Active,
    /// Copy is back on the shelf. Terminal.
    Returned,
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Active
    }
}

/// One borrower holding one copy of a title for a bounded period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: String,
    pub title_id: String,
    pub borrower_id: String,
    #[ts(as = "String")]
    pub borrow_date: NaiveDate,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
}

impl Loan {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// Date fines are measured against: the return date once returned,
    /// otherwise `now`.
    #[inline]
    pub fn effective_date(&self, now: NaiveDate) -> NaiveDate {
        self.return_date.unwrap_or(now)
    }
}

// =============================================================================
// Payment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    #[serde(rename = "paypal")]
    PayPal,
    Cash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
    Pending,
    Failed,
}

/// An entry in the append-only payment log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub borrower_id: String,
    /// Amount the borrower paid.
    pub amount: Money,
    /// Portion of `amount` credited against outstanding fines when the
    /// payment was recorded. Excess is not kept as credit.
    pub applied_amount: Money,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub description: String,
}

impl Payment {
    /// Amount that counts toward the borrower's balance.
    #[inline]
    pub fn credited(&self) -> Money {
        match self.status {
            PaymentStatus::Completed => self.applied_amount,
            PaymentStatus::Pending | PaymentStatus::Failed => Money::zero(),
        }
    }
}

// =============================================================================
// Borrower
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(rename = "user")]
    Member,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::Member
    }
}

/// A library member.
///
/// The ledger never holds a "current user": callers pass the borrower id of
/// their own session context into each operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Borrower {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[ts(as = "String")]
    pub member_since: NaiveDate,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Admin form input for registering or editing a borrower.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewBorrower {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

// =============================================================================
// Read Models
// =============================================================================

/// Per-borrower aggregate for the profile header and dues screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BorrowerSummary {
    pub borrower_id: String,
    pub active_loans: usize,
    pub overdue_loans: usize,
    pub returned_loans: usize,
    pub total_fine_owed: Money,
}

/// An active loan joined with its title and current fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BorrowedTitle {
    pub loan: Loan,
    pub title: Title,
    pub assessment: OverdueAssessment,
}

/// Result of a successful return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReturnReceipt {
    pub loan: Loan,
    /// Fine settled by this return (informational).
    pub fine: OverdueAssessment,
}

/// One row of the admin dues screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OverdueEntry {
    pub loan: Loan,
    pub title_name: String,
    pub borrower_name: String,
    pub assessment: OverdueAssessment,
}

/// Admin dashboard statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    pub total_titles: usize,
    pub total_copies: u64,
    pub available_copies: u64,
    pub copies_on_loan: u64,
    pub active_loans: usize,
    pub overdue_loans: usize,
    pub total_borrowers: usize,
    pub members: usize,
    pub total_fines_owed: Money,
    /// Completed payments received from the first of the month through
    /// the dashboard date.
    pub fines_collected: Money,
    /// Ids of titles whose available share is below the low-stock threshold.
    pub low_stock_titles: Vec<String>,
}

// =============================================================================
// Catalog Query
// =============================================================================

/// Availability filter of the catalog and admin book screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityFilter {
    All,
    Available,
    Unavailable,
}

impl Default for AvailabilityFilter {
    fn default() -> Self {
        AvailabilityFilter::All
    }
}

/// Catalog search parameters. An empty query matches every title.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    /// Case-insensitive substring of title, author or ISBN.
    pub term: String,
    /// Exact genre; empty means any.
    pub genre: String,
    pub availability: AvailabilityFilter,
}

impl CatalogQuery {
    pub fn matches(&self, title: &Title) -> bool {
        let term = self.term.trim().to_lowercase();
        if !term.is_empty()
            && !title.title.to_lowercase().contains(&term)
            && !title.author.to_lowercase().contains(&term)
            && !isbn_contains(&title.isbn, &term)
        {
            return false;
        }

        if !self.genre.is_empty() && title.genre != self.genre {
            return false;
        }

        match self.availability {
            AvailabilityFilter::All => true,
            AvailabilityFilter::Available => title.is_available(),
            AvailabilityFilter::Unavailable => !title.is_available(),
        }
    }
}

/// Hyphens and spaces are ignored on both sides.
fn isbn_contains(isbn: &str, term: &str) -> bool {
    let term = normalize_isbn(term);
    !term.is_empty() && normalize_isbn(isbn).contains(&term)
}

// =============================================================================
// Unit Tests
// =============================================================================
