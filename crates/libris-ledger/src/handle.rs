//! # Ledger Handle
//!
//! Shared, cloneable access to one [`Ledger`] plus a change feed.
//!
//! ## Thread Safety
//! The ledger sits behind `Arc<Mutex<_>>`. Each operation holds the lock for
//! its whole read-check-write sequence, so concurrent borrows of the last
//! copy cannot both succeed.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  caller ──► handle.borrow() ──► lock ──► ledger.borrow() ──► unlock     │
//! │                                                   │                     │
//! │                                        Ok(loan)   ▼                     │
//! │                                   broadcast::Sender<LedgerEvent>        │
//! │                                     │           │           │           │
//! │                                     ▼           ▼           ▼           │
//! │                                  catalog     profile      admin         │
//! │                                   view        view        view          │
//! │                                                                         │
//! │  Failed operations publish nothing.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tokio::sync::broadcast;
use tracing::trace;

use libris_core::{
    Borrower, CoreResult, Loan, Money, NewBorrower, NewTitle, Payment, PaymentMethod,
    ReturnReceipt, Title, TitleDetails,
};

use crate::events::LedgerEvent;
use crate::ledger::Ledger;

/// Cloneable handle to a shared ledger.
#[derive(Debug, Clone)]
pub struct LedgerHandle {
    ledger: Arc<Mutex<Ledger>>,
    events: broadcast::Sender<LedgerEvent>,
}

impl LedgerHandle {
    /// Wraps a ledger. `capacity` is the number of events a slow
    /// subscriber may fall behind before it starts missing them.
    pub fn new(ledger: Ledger, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        LedgerHandle {
            ledger: Arc::new(Mutex::new(ledger)),
            events,
        }
    }

    /// Receives every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Executes a function with read access to the ledger.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let stats = handle.with_ledger(|ledger| ledger.library_stats(today));
    /// ```
    pub fn with_ledger<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Ledger) -> R,
    {
        f(&self.lock())
    }

    // A panic while holding the lock cannot leave the stores half-updated:
    // every mutation validates before it writes.
    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: LedgerEvent) {
        trace!(?event, "Publishing ledger event");
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    // =========================================================================
    // Loan Lifecycle
    // =========================================================================

    pub fn borrow(&self, title_id: &str, borrower_id: &str, now: NaiveDate) -> CoreResult<Loan> {
        let (loan, available_copies) = {
            let mut ledger = self.lock();
            let loan = ledger.borrow(title_id, borrower_id, now)?;
            let available = ledger.get_availability(title_id)?.available_copies;
            (loan, available)
        };

        self.publish(LedgerEvent::TitleBorrowed {
            loan_id: loan.id.clone(),
            title_id: loan.title_id.clone(),
            borrower_id: loan.borrower_id.clone(),
            available_copies,
        });
        Ok(loan)
    }

    pub fn return_loan(&self, loan_id: &str, now: NaiveDate) -> CoreResult<ReturnReceipt> {
        let (receipt, available_copies) = {
            let mut ledger = self.lock();
            let receipt = ledger.return_loan(loan_id, now)?;
            let available = ledger.get_availability(&receipt.loan.title_id)?.available_copies;
            (receipt, available)
        };

        self.publish(LedgerEvent::LoanReturned {
            loan_id: receipt.loan.id.clone(),
            title_id: receipt.loan.title_id.clone(),
            borrower_id: receipt.loan.borrower_id.clone(),
            available_copies,
            fine: receipt.fine.fine,
        });
        Ok(receipt)
    }

    // =========================================================================
    // Payments
    // =========================================================================

    pub fn settle_payment(
        &self,
        borrower_id: &str,
        amount: Money,
        method: PaymentMethod,
        now: NaiveDate,
    ) -> CoreResult<Payment> {
        let payment = self.lock().settle_payment(borrower_id, amount, method, now)?;
        self.publish_payment(&payment);
        Ok(payment)
    }

    pub fn mark_paid(&self, borrower_id: &str, method: PaymentMethod, now: NaiveDate) -> CoreResult<Payment> {
        let payment = self.lock().mark_paid(borrower_id, method, now)?;
        self.publish_payment(&payment);
        Ok(payment)
    }

    fn publish_payment(&self, payment: &Payment) {
        self.publish(LedgerEvent::PaymentSettled {
            payment_id: payment.id.clone(),
            borrower_id: payment.borrower_id.clone(),
            amount: payment.amount,
            applied_amount: payment.applied_amount,
        });
    }

    // =========================================================================
    // Admin
    // =========================================================================

    pub fn add_title(&self, new_title: NewTitle) -> CoreResult<Title> {
        let title = self.lock().add_title(new_title)?;
        self.publish(LedgerEvent::TitleAdded {
            title_id: title.id.clone(),
        });
        Ok(title)
    }

    pub fn update_title(&self, title_id: &str, details: TitleDetails) -> CoreResult<Title> {
        let title = self.lock().update_title(title_id, details)?;
        self.publish(LedgerEvent::TitleUpdated {
            title_id: title.id.clone(),
        });
        Ok(title)
    }

    pub fn set_total_copies(&self, title_id: &str, total: u32) -> CoreResult<Title> {
        let title = self.lock().set_total_copies(title_id, total)?;
        self.publish(LedgerEvent::TitleUpdated {
            title_id: title.id.clone(),
        });
        Ok(title)
    }

    pub fn remove_title(&self, title_id: &str) -> CoreResult<Title> {
        let title = self.lock().remove_title(title_id)?;
        self.publish(LedgerEvent::TitleRemoved {
            title_id: title.id.clone(),
        });
        Ok(title)
    }

    pub fn register_borrower(&self, form: NewBorrower, member_since: NaiveDate) -> CoreResult<Borrower> {
        let borrower = self.lock().register_borrower(form, member_since)?;
        self.publish(LedgerEvent::BorrowerRegistered {
            borrower_id: borrower.id.clone(),
        });
        Ok(borrower)
    }

    pub fn update_borrower(&self, borrower_id: &str, form: NewBorrower) -> CoreResult<Borrower> {
        let borrower = self.lock().update_borrower(borrower_id, form)?;
        self.publish(LedgerEvent::BorrowerUpdated {
            borrower_id: borrower.id.clone(),
        });
        Ok(borrower)
    }

    pub fn remove_borrower(&self, borrower_id: &str) -> CoreResult<Borrower> {
        let borrower = self.lock().remove_borrower(borrower_id)?;
        self.publish(LedgerEvent::BorrowerRemoved {
            borrower_id: borrower.id.clone(),
        });
        Ok(borrower)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
