//! # Store Module
//!
//! In-memory stores behind the ledger.
//!
//! ## Store Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stores and Who Mutates Them                          │
//! │                                                                         │
//! │  Ledger::borrow / return_loan / settle_payment                         │
//! │       │                                                                 │
//! │       ├──► Inventory          copy counts per title                    │
//! │       ├──► LoanStore          active + historical loans                │
//! │       ├──► PaymentLog         append-only payments                     │
//! │       └──► BorrowerDirectory  known borrowers                          │
//! │                                                                         │
//! │  Each store checks its own preconditions. Rules spanning two stores    │
//! │  (copies vs. loans, fines vs. payments) live in the ledger.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Stores
//!
//! - [`Inventory`] - Titles, copy counts, catalog search
//! - [`LoanStore`] - Loan records and their status
//! - [`PaymentLog`] - Append-only payment history
//! - [`BorrowerDirectory`] - Library members

pub mod borrowers;
pub mod inventory;
pub mod loans;
pub mod payments;

pub use borrowers::BorrowerDirectory;
pub use inventory::Inventory;
pub use loans::LoanStore;
pub use payments::PaymentLog;
