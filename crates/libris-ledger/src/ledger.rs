//! # Loan Ledger
//!
//! Orchestrates the inventory, loan store, payment log and borrower
//! directory. Every operation that touches more than one store goes through
//! here, so that copy counts and active loans never disagree.
//!
//! ## Borrow / Return Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  borrow(title, borrower, now)                                           │
//! │    1. borrower registered?            no  → NotFound                    │
//! │    2. inventory.decrement_available   0   → Unavailable (no change)     │
//! │    3. loans.create_loan               (cannot fail)                     │
//! │                                                                         │
//! │  return_loan(loan, now)                                                 │
//! │    1. loans.check_returnable          → NotFound / AlreadyReturned      │
//! │    2. inventory.check_increment       → InvariantViolation (logged)     │
//! │    3. loans.mark_returned + inventory.increment_available               │
//! │    4. fine = compute_overdue(due, now) (informational)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Balance
//! ```text
//!   outstanding(b, now) = max(0, Σ fine(loan, now) − Σ credited(payment))
//!                                  all loans of b     completed payments of b
//! ```
//! Fines are never stored. A returned loan's fine is frozen at its return
//! date; an active loan's fine keeps growing with `now`.

use chrono::{Datelike, NaiveDate};
use tracing::{error, info, warn};

use libris_core::validation::validate_payment_amount;
use libris_core::{
    Availability, Borrower, BorrowedTitle, BorrowerSummary, CatalogQuery, CoreError, CoreResult,
    FinePolicy, LibraryStats, Loan, Money, NewBorrower, NewTitle, OverdueEntry, Payment,
    PaymentMethod, ReturnReceipt, Role, Title, TitleDetails, ValidationError,
    DEFAULT_LOW_STOCK_PERCENT,
};

use crate::config::LedgerConfig;
use crate::store::{BorrowerDirectory, Inventory, LoanStore, PaymentLog};

/// The whole library state plus the rules that keep it consistent.
#[derive(Debug, Clone)]
pub struct Ledger {
    policy: FinePolicy,
    low_stock_percent: u32,
    inventory: Inventory,
    loans: LoanStore,
    payments: PaymentLog,
    borrowers: BorrowerDirectory,
}

impl Default for Ledger {
    fn default() -> Self {
        Ledger::with_policy(FinePolicy::default())
    }
}

impl Ledger {
    /// Creates an empty ledger from configuration.
    pub fn new(config: &LedgerConfig) -> Self {
        let mut ledger = Ledger::with_policy(config.fine_policy());
        ledger.low_stock_percent = config.low_stock_percent;
        ledger
    }

    /// Creates an empty ledger with the given fine policy.
    pub fn with_policy(policy: FinePolicy) -> Self {
        Ledger {
            policy,
            low_stock_percent: DEFAULT_LOW_STOCK_PERCENT,
            inventory: Inventory::new(),
            loans: LoanStore::new(policy),
            payments: PaymentLog::new(),
            borrowers: BorrowerDirectory::new(),
        }
    }

    pub fn policy(&self) -> &FinePolicy {
        &self.policy
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn loans(&self) -> &LoanStore {
        &self.loans
    }

    pub fn payments(&self) -> &PaymentLog {
        &self.payments
    }

    pub fn borrowers(&self) -> &BorrowerDirectory {
        &self.borrowers
    }

    // =========================================================================
    // Loan Lifecycle
    // =========================================================================

    /// Checks out one copy of a title to a borrower.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown borrower or title
    /// - `Unavailable` if no copies are left
    ///
    /// On error nothing changes.
    pub fn borrow(&mut self, title_id: &str, borrower_id: &str, now: NaiveDate) -> CoreResult<Loan> {
        self.try_borrow(title_id, borrower_id, now)
            .inspect_err(|e| log_rejection("borrow", e))
    }

    fn try_borrow(&mut self, title_id: &str, borrower_id: &str, now: NaiveDate) -> CoreResult<Loan> {
        self.borrowers.get(borrower_id)?;
        let availability = self.inventory.decrement_available(title_id)?;
        let loan = self.loans.create_loan(title_id, borrower_id, now);

        info!(
            loan_id = %loan.id,
            title_id,
            borrower_id,
            due = %loan.due_date,
            available = availability.available_copies,
            "Title borrowed"
        );
        Ok(loan)
    }

    /// Returns an active loan on `now` and puts the copy back.
    ///
    /// The receipt carries the overdue assessment at the return date. It is
    /// informational; the amount stays part of the borrower's balance until
    /// paid.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown loan
    /// - `AlreadyReturned` if the loan was returned before
    /// - `InvalidDate` if `now` is before the borrow date
    /// - `InvariantViolation` if the title already has every copy on the
    ///   shelf; this is a bug, and nothing is changed
    pub fn return_loan(&mut self, loan_id: &str, now: NaiveDate) -> CoreResult<ReturnReceipt> {
        self.try_return(loan_id, now)
            .inspect_err(|e| log_rejection("return", e))
    }

    fn try_return(&mut self, loan_id: &str, now: NaiveDate) -> CoreResult<ReturnReceipt> {
        let title_id = self.loans.check_returnable(loan_id, now)?.title_id.clone();
        self.inventory.check_increment(&title_id)?;

        let loan = self.loans.mark_returned(loan_id, now)?;
        let availability = self.inventory.increment_available(&title_id)?;
        let fine = self.policy.compute_overdue(loan.due_date, now);

        info!(
            loan_id,
            title_id = %title_id,
            borrower_id = %loan.borrower_id,
            overdue_days = fine.overdue_days,
            fine = %fine.fine,
            available = availability.available_copies,
            "Loan returned"
        );
        Ok(ReturnReceipt { loan, fine })
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Records a payment against a borrower's outstanding fines.
    ///
    /// Credits `min(amount, outstanding)`. Paying more than is owed is not
    /// an error, but the excess is not carried forward as credit.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown borrower
    /// - `InvalidAmount` if `amount` is not positive
    pub fn settle_payment(
        &mut self,
        borrower_id: &str,
        amount: Money,
        method: PaymentMethod,
        now: NaiveDate,
    ) -> CoreResult<Payment> {
        let overdue = self.overdue_count(borrower_id, now);
        self.settle_payment_with_description(
            borrower_id,
            amount,
            method,
            now,
            format!("Payment for {} overdue books", overdue),
        )
    }

    /// [`Ledger::settle_payment`] with a custom description.
    pub fn settle_payment_with_description(
        &mut self,
        borrower_id: &str,
        amount: Money,
        method: PaymentMethod,
        now: NaiveDate,
        description: impl Into<String>,
    ) -> CoreResult<Payment> {
        self.try_settle(borrower_id, amount, method, now, description.into())
            .inspect_err(|e| log_rejection("settle_payment", e))
    }

    fn try_settle(
        &mut self,
        borrower_id: &str,
        amount: Money,
        method: PaymentMethod,
        now: NaiveDate,
        description: String,
    ) -> CoreResult<Payment> {
        validate_payment_amount(amount)?;
        self.borrowers.get(borrower_id)?;

        let outstanding = self.balance_of(borrower_id, now);
        let applied = amount.min(outstanding);
        let payment = self
            .payments
            .record(borrower_id, amount, applied, method, now, description);

        if applied < amount {
            warn!(
                borrower_id,
                amount = %amount,
                applied = %applied,
                "Payment exceeds outstanding balance; excess not credited"
            );
        }
        let remaining = outstanding - applied;
        info!(
            payment_id = %payment.id,
            borrower_id,
            amount = %amount,
            applied = %applied,
            remaining = %remaining,
            "Payment settled"
        );
        Ok(payment)
    }

    /// Pays the borrower's full outstanding balance.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown borrower
    /// - `InvalidAmount` if nothing is owed
    pub fn mark_paid(&mut self, borrower_id: &str, method: PaymentMethod, now: NaiveDate) -> CoreResult<Payment> {
        let outstanding = self.outstanding_balance(borrower_id, now)?;
        if !outstanding.is_positive() {
            let err = CoreError::InvalidAmount {
                reason: format!("borrower {} owes nothing", borrower_id),
            };
            log_rejection("mark_paid", &err);
            return Err(err);
        }
        self.settle_payment_with_description(borrower_id, outstanding, method, now, "Fines marked as paid")
    }

    /// Appends a historical payment record as-is (seed data, imports).
    ///
    /// ## Errors
    /// - `NotFound` for an unknown borrower
    /// - `InvalidAmount` if the amount is not positive or the applied
    ///   amount is outside `0..=amount`
    pub fn import_payment(&mut self, payment: Payment) -> CoreResult<()> {
        self.borrowers.get(&payment.borrower_id)?;
        validate_payment_amount(payment.amount)?;
        if payment.applied_amount.is_negative() || payment.applied_amount > payment.amount {
            return Err(CoreError::InvalidAmount {
                reason: format!(
                    "applied amount {} must be between $0.00 and {}",
                    payment.applied_amount, payment.amount
                ),
            });
        }
        self.payments.append(payment);
        Ok(())
    }

    // =========================================================================
    // Borrower Queries
    // =========================================================================

    /// What the borrower owes on `now`, never negative.
    pub fn outstanding_balance(&self, borrower_id: &str, now: NaiveDate) -> CoreResult<Money> {
        self.borrowers.get(borrower_id)?;
        Ok(self.balance_of(borrower_id, now))
    }

    fn balance_of(&self, borrower_id: &str, now: NaiveDate) -> Money {
        let gross: Money = self
            .loans
            .list_for_borrower(borrower_id)
            .map(|loan| self.policy.assess_loan(loan, now).fine)
            .sum();
        (gross - self.payments.credited_total(borrower_id)).clamp_non_negative()
    }

    /// Loan counts and balance of a borrower on `now`.
    pub fn borrower_summary(&self, borrower_id: &str, now: NaiveDate) -> CoreResult<BorrowerSummary> {
        self.borrowers.get(borrower_id)?;

        let mut summary = BorrowerSummary {
            borrower_id: borrower_id.to_string(),
            active_loans: 0,
            overdue_loans: 0,
            returned_loans: 0,
            total_fine_owed: self.balance_of(borrower_id, now),
        };

        for loan in self.loans.list_for_borrower(borrower_id) {
            if loan.is_active() {
                summary.active_loans += 1;
            } else {
                summary.returned_loans += 1;
            }
        }
        summary.overdue_loans = self.overdue_count(borrower_id, now);
        Ok(summary)
    }

    /// Every loan of a borrower, active and returned, oldest first.
    pub fn list_loans_for_borrower(&self, borrower_id: &str) -> CoreResult<Vec<Loan>> {
        self.borrowers.get(borrower_id)?;
        Ok(self.loans.list_for_borrower(borrower_id).cloned().collect())
    }

    /// Every payment of a borrower, oldest first.
    pub fn list_payments(&self, borrower_id: &str) -> CoreResult<Vec<Payment>> {
        self.borrowers.get(borrower_id)?;
        Ok(self.payments.list_for_borrower(borrower_id).cloned().collect())
    }

    /// Active loans of a borrower joined with their titles and assessed on
    /// `now`.
    pub fn borrowed_titles(&self, borrower_id: &str, now: NaiveDate) -> CoreResult<Vec<BorrowedTitle>> {
        self.borrowers.get(borrower_id)?;

        self.loans
            .list_for_borrower(borrower_id)
            .filter(|loan| loan.is_active())
            .map(|loan| {
                let title = self.inventory.get(&loan.title_id)?.clone();
                Ok(BorrowedTitle {
                    loan: loan.clone(),
                    title,
                    assessment: self.policy.assess_loan(loan, now),
                })
            })
            .collect()
    }

    // =========================================================================
    // Catalog Queries
    // =========================================================================

    pub fn title(&self, title_id: &str) -> CoreResult<&Title> {
        self.inventory.get(title_id)
    }

    pub fn get_availability(&self, title_id: &str) -> CoreResult<Availability> {
        self.inventory.get_availability(title_id)
    }

    pub fn search_catalog(&self, query: &CatalogQuery) -> CoreResult<Vec<Title>> {
        self.inventory.search(query)
    }

    pub fn genres(&self) -> Vec<String> {
        self.inventory.genres()
    }

    // =========================================================================
    // Admin Views
    // =========================================================================

    /// Active overdue loans on `now`, most overdue first.
    pub fn overdue_loans(&self, now: NaiveDate) -> Vec<OverdueEntry> {
        let mut entries: Vec<OverdueEntry> = self
            .loans
            .active_loans()
            .filter_map(|loan| {
                let assessment = self.policy.assess_loan(loan, now);
                if !assessment.is_overdue {
                    return None;
                }
                Some(OverdueEntry {
                    loan: loan.clone(),
                    title_name: self
                        .inventory
                        .get(&loan.title_id)
                        .map_or_else(|_| loan.title_id.clone(), |t| t.title.clone()),
                    borrower_name: self
                        .borrowers
                        .get(&loan.borrower_id)
                        .map_or_else(|_| loan.borrower_id.clone(), |b| b.name.clone()),
                    assessment,
                })
            })
            .collect();

        entries.sort_by(|a, b| b.assessment.overdue_days.cmp(&a.assessment.overdue_days));
        entries
    }

    /// Dashboard totals on `now`.
    pub fn library_stats(&self, now: NaiveDate) -> LibraryStats {
        let mut stats = LibraryStats {
            total_titles: self.inventory.len(),
            total_copies: 0,
            available_copies: 0,
            copies_on_loan: 0,
            active_loans: 0,
            overdue_loans: 0,
            total_borrowers: self.borrowers.len(),
            members: 0,
            total_fines_owed: Money::zero(),
            fines_collected: self.payments.collected_between(month_start(now), now),
            low_stock_titles: Vec::new(),
        };

        for title in self.inventory.iter() {
            stats.total_copies += u64::from(title.total_copies);
            stats.available_copies += u64::from(title.available_copies);
            stats.copies_on_loan += u64::from(title.on_loan());
            if title.is_low_stock(self.low_stock_percent) {
                stats.low_stock_titles.push(title.id.clone());
            }
        }

        for loan in self.loans.active_loans() {
            stats.active_loans += 1;
            if self.policy.assess_loan(loan, now).is_overdue {
                stats.overdue_loans += 1;
            }
        }

        for borrower in self.borrowers.iter() {
            if borrower.role == Role::Member {
                stats.members += 1;
            }
            stats.total_fines_owed += self.balance_of(&borrower.id, now);
        }

        stats
    }

    /// Borrowers matching `term` (name or email) and `role`. With
    /// `only_overdue`, keeps those holding at least one overdue loan on `now`.
    pub fn search_borrowers(
        &self,
        term: &str,
        role: Option<Role>,
        only_overdue: bool,
        now: NaiveDate,
    ) -> Vec<Borrower> {
        self.borrowers
            .search(term, role)
            .filter(|b| !only_overdue || self.has_overdue_loan(&b.id, now))
            .cloned()
            .collect()
    }

    fn has_overdue_loan(&self, borrower_id: &str, now: NaiveDate) -> bool {
        self.overdue_count(borrower_id, now) > 0
    }

    fn overdue_count(&self, borrower_id: &str, now: NaiveDate) -> usize {
        self.loans
            .list_for_borrower(borrower_id)
            .filter(|loan| loan.is_active() && self.policy.assess_loan(loan, now).is_overdue)
            .count()
    }

    // =========================================================================
    // Admin: Catalog Maintenance
    // =========================================================================

    /// Inserts a fully formed title (seed data, imports).
    ///
    /// Every copy must be on the shelf: copies only leave it through
    /// [`Ledger::borrow`], so that each one off the shelf has a loan.
    pub fn insert_title(&mut self, title: Title) -> CoreResult<()> {
        check_full_shelf(title.total_copies, title.available_copies)
            .and_then(|()| self.inventory.insert(title))
            .inspect_err(|e| log_rejection("insert_title", e))
    }

    /// Adds a title from the admin form. A new title has no loans, so the
    /// form must put every copy on the shelf.
    pub fn add_title(&mut self, new_title: NewTitle) -> CoreResult<Title> {
        let title = check_full_shelf(new_title.total_copies, new_title.available_copies)
            .and_then(|()| self.inventory.add_title(new_title))
            .inspect_err(|e| log_rejection("add_title", e))?;
        info!(title_id = %title.id, title = %title.title, copies = title.total_copies, "Title added");
        Ok(title)
    }

    pub fn update_title(&mut self, title_id: &str, details: TitleDetails) -> CoreResult<Title> {
        let title = self
            .inventory
            .update_details(title_id, details)
            .inspect_err(|e| log_rejection("update_title", e))?;
        info!(title_id, "Title updated");
        Ok(title)
    }

    /// Changes how many copies the library owns. Copies on loan stay on
    /// loan.
    pub fn set_total_copies(&mut self, title_id: &str, total: u32) -> CoreResult<Title> {
        let title = self
            .inventory
            .set_total_copies(title_id, total)
            .inspect_err(|e| log_rejection("set_total_copies", e))?;
        info!(title_id, total, available = title.available_copies, "Copy count changed");
        Ok(title)
    }

    /// Removes a title from the catalog.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown title
    /// - `TitleInUse` while any copy is on loan
    pub fn remove_title(&mut self, title_id: &str) -> CoreResult<Title> {
        self.try_remove_title(title_id)
            .inspect_err(|e| log_rejection("remove_title", e))
    }

    fn try_remove_title(&mut self, title_id: &str) -> CoreResult<Title> {
        let on_loan = self.inventory.get(title_id)?.on_loan() as usize;
        let active_loans = self.loans.active_count_for_title(title_id).max(on_loan);
        if active_loans > 0 {
            return Err(CoreError::TitleInUse {
                title_id: title_id.to_string(),
                active_loans,
            });
        }

        let title = self.inventory.remove(title_id)?;
        info!(title_id, title = %title.title, "Title removed");
        Ok(title)
    }

    // =========================================================================
    // Admin: Borrower Maintenance
    // =========================================================================

    /// Inserts a fully formed borrower (seed data, imports).
    pub fn insert_borrower(&mut self, borrower: Borrower) -> CoreResult<()> {
        self.borrowers.insert(borrower)
    }

    pub fn register_borrower(&mut self, form: NewBorrower, member_since: NaiveDate) -> CoreResult<Borrower> {
        let borrower = self
            .borrowers
            .register(form, member_since)
            .inspect_err(|e| log_rejection("register_borrower", e))?;
        info!(borrower_id = %borrower.id, role = ?borrower.role, "Borrower registered");
        Ok(borrower)
    }

    pub fn update_borrower(&mut self, borrower_id: &str, form: NewBorrower) -> CoreResult<Borrower> {
        let borrower = self
            .borrowers
            .update(borrower_id, form)
            .inspect_err(|e| log_rejection("update_borrower", e))?;
        info!(borrower_id, "Borrower updated");
        Ok(borrower)
    }

    /// Removes a borrower. Their loan and payment history stays.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown borrower
    /// - `BorrowerHasLoans` while they hold any active loan
    pub fn remove_borrower(&mut self, borrower_id: &str) -> CoreResult<Borrower> {
        self.try_remove_borrower(borrower_id)
            .inspect_err(|e| log_rejection("remove_borrower", e))
    }

    fn try_remove_borrower(&mut self, borrower_id: &str) -> CoreResult<Borrower> {
        self.borrowers.get(borrower_id)?;

        let active_loans = self.loans.active_count_for_borrower(borrower_id);
        if active_loans > 0 {
            return Err(CoreError::BorrowerHasLoans {
                borrower_id: borrower_id.to_string(),
                active_loans,
            });
        }

        let borrower = self.borrowers.remove(borrower_id)?;
        info!(borrower_id, "Borrower removed");
        Ok(borrower)
    }
}

/// Rejected requests are warnings; broken invariants are errors.
fn check_full_shelf(total_copies: u32, available_copies: u32) -> CoreResult<()> {
    if available_copies != total_copies {
        return Err(ValidationError::OutOfRange {
            field: "available_copies".to_string(),
            min: i64::from(total_copies),
            max: i64::from(total_copies),
        }
        .into());
    }
    Ok(())
}

fn month_start(now: NaiveDate) -> NaiveDate {
    now.with_day(1).unwrap_or(now)
}

fn log_rejection(operation: &str, err: &CoreError) {
    if err.is_user_facing() {
        warn!(operation, code = err.code(), error = %err, "Request rejected");
    } else {
        error!(operation, code = err.code(), error = %err, "Ledger invariant violated");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use libris_core::{LoanStatus, PaymentStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A title with every copy on the shelf.
    fn title(id: &str, copies: u32) -> Title {
        Title {
            id: id.to_string(),
            title: format!("Title {}", id),
            author: "Author".to_string(),
            isbn: format!("978-0-00-00000{}-0", id),
            publication_year: 2000,
            publisher: "Publisher".to_string(),
            genre: "Fiction".to_string(),
            description: String::new(),
            cover_image: None,
            total_copies: copies,
            available_copies: copies,
        }
    }

    fn borrower(id: &str, role: Role) -> Borrower {
        Borrower {
            id: id.to_string(),
            name: format!("Borrower {}", id),
            email: format!("b{}@example.com", id),
            role,
            member_since: date(2022, 1, 1),
            phone_number: None,
            address: None,
        }
    }

    /// One title with 3 copies on the shelf, one member "u1".
    fn ledger() -> Ledger {
        let mut ledger = Ledger::default();
        ledger.insert_title(title("1", 3)).unwrap();
        ledger.insert_borrower(borrower("u1", Role::Member)).unwrap();
        ledger
    }

    // ----- borrow -----

    #[test]
    fn test_borrow_creates_loan_and_takes_copy() {
        let mut ledger = ledger();
        let loan = ledger.borrow("1", "u1", date(2023, 5, 15)).unwrap();

        assert_eq!(loan.due_date, date(2023, 6, 14));
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(ledger.get_availability("1").unwrap().available_copies, 2);
        assert_eq!(ledger.list_loans_for_borrower("u1").unwrap().len(), 1);
    }

    #[test]
    fn test_borrow_last_copy_then_unavailable() {
        let mut ledger = Ledger::default();
        ledger.insert_title(title("1", 1)).unwrap();
        ledger.insert_borrower(borrower("u1", Role::Member)).unwrap();

        ledger.borrow("1", "u1", date(2023, 5, 15)).unwrap();
        assert_eq!(ledger.get_availability("1").unwrap().available_copies, 0);

        let err = ledger.borrow("1", "u1", date(2023, 5, 15)).unwrap_err();
        assert!(matches!(err, CoreError::Unavailable { .. }));
        assert_eq!(ledger.loans().len(), 1);
        assert_eq!(ledger.get_availability("1").unwrap().available_copies, 0);
    }

    #[test]
    fn test_borrow_unknown_title_or_borrower_changes_nothing() {
        let mut ledger = ledger();

        let err = ledger.borrow("missing", "u1", date(2023, 5, 15)).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));

        let err = ledger.borrow("1", "nobody", date(2023, 5, 15)).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));

        assert!(ledger.loans().is_empty());
        assert_eq!(ledger.get_availability("1").unwrap().available_copies, 3);
    }

    #[test]
    fn test_same_borrower_may_hold_two_copies() {
        let mut ledger = ledger();
        ledger.borrow("1", "u1", date(2023, 5, 15)).unwrap();
        ledger.borrow("1", "u1", date(2023, 5, 15)).unwrap();

        assert_eq!(ledger.get_availability("1").unwrap().available_copies, 1);
        assert_eq!(ledger.borrower_summary("u1", date(2023, 5, 15)).unwrap().active_loans, 2);
    }

    // ----- return -----

    #[test]
    fn test_return_overdue_loan() {
        let mut ledger = ledger();
        let loan = ledger.borrow("1", "u1", date(2023, 5, 16)).unwrap();
        assert_eq!(loan.due_date, date(2023, 6, 15));

        let receipt = ledger.return_loan(&loan.id, date(2023, 6, 20)).unwrap();
        assert_eq!(receipt.loan.status, LoanStatus::Returned);
        assert_eq!(receipt.loan.return_date, Some(date(2023, 6, 20)));
        assert_eq!(receipt.fine.overdue_days, 5);
        assert_eq!(receipt.fine.fine, Money::from_cents(500));
        assert_eq!(ledger.get_availability("1").unwrap().available_copies, 3);
    }

    #[test]
    fn test_return_on_time_has_no_fine() {
        let mut ledger = ledger();
        let loan = ledger.borrow("1", "u1", date(2023, 5, 15)).unwrap();
        let receipt = ledger.return_loan(&loan.id, date(2023, 6, 14)).unwrap();

        assert!(!receipt.fine.is_overdue);
        assert!(receipt.fine.fine.is_zero());
    }

    #[test]
    fn test_return_twice_is_rejected() {
        let mut ledger = ledger();
        let loan = ledger.borrow("1", "u1", date(2023, 5, 15)).unwrap();
        ledger.return_loan(&loan.id, date(2023, 5, 20)).unwrap();

        let err = ledger.return_loan(&loan.id, date(2023, 5, 21)).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyReturned { .. }));
        assert_eq!(ledger.get_availability("1").unwrap().available_copies, 3);
    }

    #[test]
    fn test_return_unknown_loan() {
        let mut ledger = ledger();
        let err = ledger.return_loan("missing", date(2023, 5, 21)).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_return_before_borrow_date_is_rejected() {
        let mut ledger = ledger();
        let loan = ledger.borrow("1", "u1", date(2023, 5, 15)).unwrap();
        let err = ledger.return_loan(&loan.id, date(2023, 5, 14)).unwrap_err();

        assert!(matches!(err, CoreError::InvalidDate { .. }));
        assert!(ledger.loans().get(&loan.id).unwrap().is_active());
    }

    #[test]
    fn test_return_onto_full_shelf_changes_nothing() {
        let mut ledger = Ledger::default();
        ledger.insert_title(title("9", 1)).unwrap();
        ledger.insert_borrower(borrower("u1", Role::Member)).unwrap();
        let loan = ledger.borrow("9", "u1", date(2023, 5, 15)).unwrap();

        // Shelf count drifts back to full while the loan is still active.
        ledger.inventory.increment_available("9").unwrap();

        let err = ledger.return_loan(&loan.id, date(2023, 5, 20)).unwrap_err();
        assert!(matches!(err, CoreError::InvariantViolation(_)));
        assert!(ledger.loans().get(&loan.id).unwrap().is_active());
        assert_eq!(ledger.get_availability("9").unwrap().available_copies, 1);
    }

    // ----- balance and payments -----

    #[test]
    fn test_balance_grows_with_now_and_freezes_on_return() {
        let mut ledger = ledger();
        let loan = ledger.borrow("1", "u1", date(2023, 5, 15)).unwrap();

        assert!(ledger.outstanding_balance("u1", date(2023, 6, 14)).unwrap().is_zero());
        assert_eq!(
            ledger.outstanding_balance("u1", date(2023, 6, 17)).unwrap(),
            Money::from_cents(300)
        );

        ledger.return_loan(&loan.id, date(2023, 6, 17)).unwrap();
        assert_eq!(
            ledger.outstanding_balance("u1", date(2023, 12, 31)).unwrap(),
            Money::from_cents(300)
        );
    }

    #[test]
    fn test_partial_payment_then_overpayment() {
        let mut ledger = ledger();
        let loan = ledger.borrow("1", "u1", date(2023, 5, 16)).unwrap();
        ledger.return_loan(&loan.id, date(2023, 6, 20)).unwrap();
        let now = date(2023, 6, 21);

        let first = ledger
            .settle_payment("u1", Money::from_cents(300), PaymentMethod::CreditCard, now)
            .unwrap();
        assert_eq!(first.applied_amount, Money::from_cents(300));
        assert_eq!(first.status, PaymentStatus::Completed);
        assert_eq!(ledger.outstanding_balance("u1", now).unwrap(), Money::from_cents(200));

        let second = ledger
            .settle_payment("u1", Money::from_cents(1000), PaymentMethod::Cash, now)
            .unwrap();
        assert_eq!(second.amount, Money::from_cents(1000));
        assert_eq!(second.applied_amount, Money::from_cents(200));
        assert!(ledger.outstanding_balance("u1", now).unwrap().is_zero());

        // Excess is not carried forward against later fines.
        let next = ledger.borrow("1", "u1", date(2023, 7, 1)).unwrap();
        assert_eq!(next.due_date, date(2023, 7, 31));
        assert_eq!(
            ledger.outstanding_balance("u1", date(2023, 8, 2)).unwrap(),
            Money::from_cents(200)
        );
        assert_eq!(ledger.list_payments("u1").unwrap().len(), 2);
    }

    #[test]
    fn test_payment_with_nothing_owed_is_recorded() {
        let mut ledger = ledger();
        let payment = ledger
            .settle_payment("u1", Money::from_cents(250), PaymentMethod::PayPal, date(2023, 4, 10))
            .unwrap();

        assert!(payment.applied_amount.is_zero());
        assert_eq!(payment.description, "Payment for 0 overdue books");
        assert_eq!(ledger.list_payments("u1").unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_payments_record_nothing() {
        let mut ledger = ledger();
        let now = date(2023, 6, 1);

        let err = ledger
            .settle_payment("u1", Money::zero(), PaymentMethod::Cash, now)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));

        let err = ledger
            .settle_payment("u1", Money::from_cents(-100), PaymentMethod::Cash, now)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));

        let err = ledger
            .settle_payment("nobody", Money::from_cents(100), PaymentMethod::Cash, now)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));

        assert!(ledger.payments().is_empty());
    }

    #[test]
    fn test_default_description_counts_overdue_loans() {
        let mut ledger = ledger();
        ledger.borrow("1", "u1", date(2023, 5, 1)).unwrap();
        ledger.borrow("1", "u1", date(2023, 5, 2)).unwrap();

        let payment = ledger
            .settle_payment("u1", Money::from_cents(100), PaymentMethod::Cash, date(2023, 6, 5))
            .unwrap();
        assert_eq!(payment.description, "Payment for 2 overdue books");
    }

    #[test]
    fn test_mark_paid_clears_balance() {
        let mut ledger = ledger();
        ledger.borrow("1", "u1", date(2023, 5, 15)).unwrap();
        let now = date(2023, 6, 24);

        let payment = ledger.mark_paid("u1", PaymentMethod::Cash, now).unwrap();
        assert_eq!(payment.amount, Money::from_cents(1000));
        assert!(ledger.outstanding_balance("u1", now).unwrap().is_zero());

        let err = ledger.mark_paid("u1", PaymentMethod::Cash, now).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));
    }

    #[test]
    fn test_import_payment_checks_applied_amount() {
        let mut ledger = ledger();
        let mut payment = Payment {
            id: "p1".to_string(),
            borrower_id: "u1".to_string(),
            amount: Money::from_cents(250),
            applied_amount: Money::from_cents(300),
            date: date(2023, 4, 10),
            method: PaymentMethod::CreditCard,
            status: PaymentStatus::Completed,
            description: "Late return".to_string(),
        };
        assert!(ledger.import_payment(payment.clone()).is_err());

        payment.applied_amount = Money::zero();
        ledger.import_payment(payment).unwrap();
        assert_eq!(ledger.list_payments("u1").unwrap().len(), 1);
    }

    // ----- summaries and admin views -----

    #[test]
    fn test_borrower_summary_counts() {
        let mut ledger = ledger();
        let returned = ledger.borrow("1", "u1", date(2023, 5, 1)).unwrap();
        ledger.return_loan(&returned.id, date(2023, 5, 10)).unwrap();
        ledger.borrow("1", "u1", date(2023, 5, 16)).unwrap();
        ledger.borrow("1", "u1", date(2023, 6, 1)).unwrap();

        let summary = ledger.borrower_summary("u1", date(2023, 6, 20)).unwrap();
        assert_eq!(summary.active_loans, 2);
        assert_eq!(summary.overdue_loans, 1);
        assert_eq!(summary.returned_loans, 1);
        assert_eq!(summary.total_fine_owed, Money::from_cents(500));

        assert!(matches!(
            ledger.borrower_summary("nobody", date(2023, 6, 20)),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_borrowed_titles_join() {
        let mut ledger = ledger();
        ledger.borrow("1", "u1", date(2023, 5, 16)).unwrap();

        let rows = ledger.borrowed_titles("u1", date(2023, 6, 18)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title.id, "1");
        assert_eq!(rows[0].assessment.overdue_days, 3);
    }

    #[test]
    fn test_overdue_loans_sorted_most_overdue_first() {
        let mut ledger = ledger();
        ledger.insert_borrower(borrower("u2", Role::Member)).unwrap();
        ledger.borrow("1", "u1", date(2023, 5, 20)).unwrap();
        ledger.borrow("1", "u2", date(2023, 5, 10)).unwrap();

        let overdue = ledger.overdue_loans(date(2023, 6, 25));
        assert_eq!(overdue.len(), 2);
        assert_eq!(overdue[0].borrower_name, "Borrower u2");
        assert_eq!(overdue[0].assessment.overdue_days, 16);
        assert_eq!(overdue[1].title_name, "Title 1");
    }

    #[test]
    fn test_library_stats() {
        let mut ledger = ledger();
        ledger.insert_title(title("2", 4)).unwrap();
        ledger.insert_borrower(borrower("a", Role::Admin)).unwrap();
        ledger.borrow("1", "u1", date(2023, 5, 1)).unwrap();
        for _ in 0..3 {
            ledger.borrow("2", "a", date(2023, 6, 1)).unwrap();
        }

        let stats = ledger.library_stats(date(2023, 6, 5));
        assert_eq!(stats.total_titles, 2);
        assert_eq!(stats.total_copies, 7);
        assert_eq!(stats.available_copies, 3);
        assert_eq!(stats.copies_on_loan, 4);
        assert_eq!(stats.active_loans, 4);
        assert_eq!(stats.overdue_loans, 1);
        assert_eq!(stats.total_borrowers, 2);
        assert_eq!(stats.members, 1);
        assert_eq!(stats.total_fines_owed, Money::from_cents(500));
        assert!(stats.fines_collected.is_zero());
        assert_eq!(stats.low_stock_titles, vec!["2".to_string()]);
    }

    #[test]
    fn test_library_stats_fines_collected_this_month() {
        let mut ledger = ledger();
        ledger.borrow("1", "u1", date(2023, 4, 1)).unwrap();
        ledger
            .settle_payment("u1", Money::from_cents(300), PaymentMethod::Cash, date(2023, 5, 30))
            .unwrap();
        ledger
            .settle_payment("u1", Money::from_cents(200), PaymentMethod::Cash, date(2023, 6, 1))
            .unwrap();
        ledger
            .settle_payment("u1", Money::from_cents(100), PaymentMethod::Cash, date(2023, 6, 5))
            .unwrap();

        assert_eq!(
            ledger.library_stats(date(2023, 6, 4)).fines_collected,
            Money::from_cents(200)
        );
        assert_eq!(
            ledger.library_stats(date(2023, 6, 30)).fines_collected,
            Money::from_cents(300)
        );
        assert_eq!(
            ledger.library_stats(date(2023, 7, 1)).fines_collected,
            Money::zero()
        );
    }

    #[test]
    fn test_huge_daily_rate_saturates_balance() {
        let mut ledger = Ledger::with_policy(FinePolicy::new(30, Money::from_cents(i64::MAX)));
        ledger.insert_title(title("1", 2)).unwrap();
        ledger.insert_borrower(borrower("u1", Role::Member)).unwrap();
        ledger.borrow("1", "u1", date(2023, 5, 1)).unwrap();
        ledger.borrow("1", "u1", date(2023, 5, 1)).unwrap();

        let now = date(2023, 6, 10);
        assert_eq!(
            ledger.outstanding_balance("u1", now).unwrap(),
            Money::from_cents(i64::MAX)
        );
        assert_eq!(ledger.library_stats(now).total_fines_owed, Money::from_cents(i64::MAX));
    }

    #[test]
    fn test_search_borrowers_only_overdue() {
        let mut ledger = ledger();
        ledger.insert_borrower(borrower("u2", Role::Member)).unwrap();
        ledger.borrow("1", "u2", date(2023, 5, 1)).unwrap();
        let now = date(2023, 6, 5);

        assert_eq!(ledger.search_borrowers("", None, false, now).len(), 2);
        let overdue = ledger.search_borrowers("", Some(Role::Member), true, now);
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, "u2");
    }

    // ----- admin maintenance -----

    #[test]
    fn test_remove_title_in_use() {
        let mut ledger = ledger();
        let loan = ledger.borrow("1", "u1", date(2023, 5, 15)).unwrap();

        let err = ledger.remove_title("1").unwrap_err();
        assert!(matches!(err, CoreError::TitleInUse { active_loans: 1, .. }));

        ledger.return_loan(&loan.id, date(2023, 5, 20)).unwrap();
        ledger.remove_title("1").unwrap();
        assert!(ledger.title("1").is_err());
    }

    #[test]
    fn test_insert_title_requires_full_shelf() {
        let mut ledger = Ledger::default();
        let mut partial = title("1", 5);
        partial.available_copies = 3;

        let err = ledger.insert_title(partial).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(ledger.inventory().is_empty());
    }

    #[test]
    fn test_add_title_requires_full_shelf() {
        let mut ledger = Ledger::default();
        let mut form = NewTitle {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: "9780441172719".to_string(),
            publication_year: 1965,
            publisher: "Chilton".to_string(),
            genre: "Science Fiction".to_string(),
            description: String::new(),
            cover_image: None,
            total_copies: 4,
            available_copies: 2,
        };

        let err = ledger.add_title(form.clone()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(ledger.inventory().is_empty());

        form.available_copies = 4;
        let title = ledger.add_title(form).unwrap();
        assert_eq!(title.on_loan(), 0);
    }

    #[test]
    fn test_remove_title_with_copy_off_shelf_but_no_loan() {
        let mut ledger = ledger();

        // Shelf count drifts down without a loan behind it.
        ledger.inventory.decrement_available("1").unwrap();

        let err = ledger.remove_title("1").unwrap_err();
        assert!(matches!(err, CoreError::TitleInUse { active_loans: 1, .. }));
        assert!(ledger.title("1").is_ok());
    }

    #[test]
    fn test_remove_borrower_with_loans() {
        let mut ledger = ledger();
        let loan = ledger.borrow("1", "u1", date(2023, 5, 15)).unwrap();

        let err = ledger.remove_borrower("u1").unwrap_err();
        assert!(matches!(err, CoreError::BorrowerHasLoans { .. }));

        ledger.return_loan(&loan.id, date(2023, 5, 20)).unwrap();
        ledger.remove_borrower("u1").unwrap();
        assert_eq!(ledger.loans().len(), 1);
    }

    #[test]
    fn test_set_total_copies_keeps_loans_out() {
        let mut ledger = ledger();
        ledger.borrow("1", "u1", date(2023, 5, 15)).unwrap();
        ledger.borrow("1", "u1", date(2023, 5, 15)).unwrap();

        let updated = ledger.set_total_copies("1", 8).unwrap();
        assert_eq!(updated.total_copies, 8);
        assert_eq!(updated.available_copies, 6);
        assert!(ledger.set_total_copies("1", 1).is_err());
    }

    #[test]
    fn test_config_drives_policy() {
        let config = LedgerConfig {
            loan_period_days: 14,
            daily_fine_cents: 25,
            ..LedgerConfig::default()
        };
        let mut ledger = Ledger::new(&config);
        ledger.insert_title(title("1", 1)).unwrap();
        ledger.insert_borrower(borrower("u1", Role::Member)).unwrap();

        let loan = ledger.borrow("1", "u1", date(2023, 5, 1)).unwrap();
        assert_eq!(loan.due_date, date(2023, 5, 15));
        assert_eq!(
            ledger.outstanding_balance("u1", date(2023, 5, 19)).unwrap(),
            Money::from_cents(100)
        );
    }
}
