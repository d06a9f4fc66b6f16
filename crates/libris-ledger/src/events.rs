//! # Ledger Events
//!
//! Change notifications published after every successful mutation.
//!
//! Views subscribe and re-derive what they show (filtered catalog, profile
//! rows, dues list) instead of patching their own copies of the data.

use serde::Serialize;

use libris_core::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LedgerEvent {
    #[serde(rename_all = "camelCase")]
    TitleBorrowed {
        loan_id: String,
        title_id: String,
        borrower_id: String,
        available_copies: u32,
    },

    #[serde(rename_all = "camelCase")]
    LoanReturned {
        loan_id: String,
        title_id: String,
        borrower_id: String,
        available_copies: u32,
        fine: Money,
    },

    #[serde(rename_all = "camelCase")]
    PaymentSettled {
        payment_id: String,
        borrower_id: String,
        amount: Money,
        applied_amount: Money,
    },

    #[serde(rename_all = "camelCase")]
    TitleAdded { title_id: String },

    #[serde(rename_all = "camelCase")]
    TitleUpdated { title_id: String },

    #[serde(rename_all = "camelCase")]
    TitleRemoved { title_id: String },

    #[serde(rename_all = "camelCase")]
    BorrowerRegistered { borrower_id: String },

    #[serde(rename_all = "camelCase")]
    BorrowerUpdated { borrower_id: String },

    #[serde(rename_all = "camelCase")]
    BorrowerRemoved { borrower_id: String },
}

impl LedgerEvent {
    /// Title whose copy counts or details changed, if any.
    pub fn title_id(&self) -> Option<&str> {
        match self {
            LedgerEvent::TitleBorrowed { title_id, .. }
            | LedgerEvent::LoanReturned { title_id, .. }
            | LedgerEvent::TitleAdded { title_id }
            | LedgerEvent::TitleUpdated { title_id }
            | LedgerEvent::TitleRemoved { title_id } => Some(title_id),
            _ => None,
        }
    }

    /// Borrower whose loans, balance or profile changed, if any.
    pub fn borrower_id(&self) -> Option<&str> {
        match self {
            LedgerEvent::TitleBorrowed { borrower_id, .. }
            | LedgerEvent::LoanReturned { borrower_id, .. }
            | LedgerEvent::PaymentSettled { borrower_id, .. }
            | LedgerEvent::BorrowerRegistered { borrower_id }
            | LedgerEvent::BorrowerUpdated { borrower_id }
            | LedgerEvent::BorrowerRemoved { borrower_id } => Some(borrower_id),
            _ => None,
        }
    }
}
