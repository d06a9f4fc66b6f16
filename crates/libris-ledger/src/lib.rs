//! # libris-ledger: Loan Ledger for Libris
//!
//! This crate owns the mutable state of the library and the rules that keep
//! it consistent: a copy is on loan exactly when an active loan says so, and
//! a borrower's balance is always derived from loans and payments.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Libris Data Flow                                 │
//! │                                                                         │
//! │  View action (Borrow Now, Return, Pay)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  libris-ledger (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   LedgerHandle ──► Ledger ──┬──► Inventory                     │   │
//! │  │        │                    ├──► LoanStore                     │   │
//! │  │        │                    ├──► PaymentLog                    │   │
//! │  │        │                    └──► BorrowerDirectory             │   │
//! │  │        ▼                                                        │   │
//! │  │   LedgerEvent (broadcast)                                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │                                ▼                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           libris-core: types, Money, FinePolicy                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`ledger`] - Borrow, return, payments, summaries and admin views
//! - [`store`] - The four in-memory stores
//! - [`handle`] - Shared handle with change notifications
//! - [`events`] - Change notification payloads
//! - [`config`] - TOML / environment configuration
//! - [`seed`] - Demo library
//!
//! ## Usage
//!
//! ```rust,ignore
//! use libris_ledger::{Ledger, LedgerConfig};
//!
//! let config = LedgerConfig::load(None)?;
//! let mut ledger = Ledger::new(&config);
//!
//! let loan = ledger.borrow("3", "1", today)?;
//! let receipt = ledger.return_loan(&loan.id, later)?;
//! let owed = ledger.outstanding_balance("1", later)?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod events;
pub mod handle;
pub mod ledger;
pub mod seed;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::LedgerConfig;
pub use events::LedgerEvent;
pub use handle::LedgerHandle;
pub use ledger::Ledger;
pub use seed::demo_library;

// Store re-exports for convenience
pub use store::{BorrowerDirectory, Inventory, LoanStore, PaymentLog};
