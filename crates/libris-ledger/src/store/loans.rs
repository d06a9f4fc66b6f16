//! # Loan Record Store
//!
//! Active and historical loans. Loans are never deleted; a returned loan
//! stays in the store as history.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use libris_core::{CoreError, CoreResult, FinePolicy, Loan, LoanStatus};

#[derive(Debug, Clone)]
pub struct LoanStore {
    policy: FinePolicy,
    loans: Vec<Loan>,
    index: HashMap<String, usize>,
}

impl LoanStore {
    pub fn new(policy: FinePolicy) -> Self {
        LoanStore {
            policy,
            loans: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    /// Creates an active loan due one loan period after `borrow_date`.
    ///
    /// Always succeeds: the caller has already taken a copy off the shelf.
    pub fn create_loan(&mut self, title_id: &str, borrower_id: &str, borrow_date: NaiveDate) -> Loan {
        let loan = Loan {
            id: Uuid::new_v4().to_string(),
            title_id: title_id.to_string(),
            borrower_id: borrower_id.to_string(),
            borrow_date,
            due_date: self.policy.due_date(borrow_date),
            return_date: None,
            status: LoanStatus::Active,
        };

        debug!(loan_id = %loan.id, title_id, borrower_id, due = %loan.due_date, "Loan created");
        self.index.insert(loan.id.clone(), self.loans.len());
        self.loans.push(loan.clone());
        loan
    }

    /// Any loan, active or returned.
    pub fn get(&self, loan_id: &str) -> CoreResult<&Loan> {
        self.index
            .get(loan_id)
            .map(|&i| &self.loans[i])
            .ok_or_else(|| CoreError::not_found("Loan", loan_id))
    }

    /// An active loan. Returned loans are reported as `NotFound`.
    pub fn find_active_loan(&self, loan_id: &str) -> CoreResult<&Loan> {
        self.get(loan_id)
            .ok()
            .filter(|loan| loan.is_active())
            .ok_or_else(|| CoreError::not_found("Active loan", loan_id))
    }

    /// Moves a loan to `Returned`.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown loan
    /// - `AlreadyReturned` if the loan was returned before; nothing changes
    /// - `InvalidDate` if `return_date` is before the borrow date
    pub fn mark_returned(&mut self, loan_id: &str, return_date: NaiveDate) -> CoreResult<Loan> {
        self.check_returnable(loan_id, return_date)?;

        let i = self.index[loan_id];
        let loan = &mut self.loans[i];
        loan.status = LoanStatus::Returned;
        loan.return_date = Some(return_date);

        debug!(loan_id, returned = %return_date, "Loan returned");
        Ok(loan.clone())
    }

    /// Runs every check of [`LoanStore::mark_returned`] without changing
    /// anything.
    pub fn check_returnable(&self, loan_id: &str, return_date: NaiveDate) -> CoreResult<&Loan> {
        let loan = self.get(loan_id)?;

        if loan.status == LoanStatus::Returned {
            return Err(CoreError::AlreadyReturned {
                loan_id: loan_id.to_string(),
            });
        }
        if return_date < loan.borrow_date {
            return Err(CoreError::invalid_date(
                return_date.to_string(),
                format!("before borrow date {}", loan.borrow_date),
            ));
        }

        Ok(loan)
    }

    /// Loans of one borrower in insertion order.
    pub fn list_for_borrower<'a>(&'a self, borrower_id: &'a str) -> impl Iterator<Item = &'a Loan> + 'a {
        self.loans.iter().filter(move |l| l.borrower_id == borrower_id)
    }

    pub fn active_loans(&self) -> impl Iterator<Item = &Loan> {
        self.loans.iter().filter(|l| l.is_active())
    }

    pub fn active_count_for_title(&self, title_id: &str) -> usize {
        self.active_loans().filter(|l| l.title_id == title_id).count()
    }

    pub fn active_count_for_borrower(&self, borrower_id: &str) -> usize {
        self.active_loans().filter(|l| l.borrower_id == borrower_id).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Loan> {
        self.loans.iter()
    }

    pub fn policy(&self) -> &FinePolicy {
        &self.policy
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_loan_sets_due_date() {
        let mut store = LoanStore::new(FinePolicy::default());
        let loan = store.create_loan("T", "U", date(2023, 5, 15));

        assert_eq!(loan.due_date, date(2023, 6, 14));
        assert_eq!(loan.status, LoanStatus::Active);
        assert!(loan.return_date.is_none());
        assert_eq!(store.find_active_loan(&loan.id).unwrap(), &loan);
    }

    #[test]
    fn test_mark_returned_once() {
        let mut store = LoanStore::new(FinePolicy::default());
        let loan = store.create_loan("T", "U", date(2023, 5, 15));

        let returned = store.mark_returned(&loan.id, date(2023, 6, 1)).unwrap();
        assert_eq!(returned.status, LoanStatus::Returned);
        assert_eq!(returned.return_date, Some(date(2023, 6, 1)));

        let err = store.mark_returned(&loan.id, date(2023, 6, 2)).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyReturned { .. }));
        assert_eq!(store.get(&loan.id).unwrap().return_date, Some(date(2023, 6, 1)));

        assert!(matches!(
            store.find_active_loan(&loan.id),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_mark_returned_unknown_or_backdated() {
        let mut store = LoanStore::new(FinePolicy::default());
        assert!(matches!(
            store.mark_returned("nope", date(2023, 6, 1)),
            Err(CoreError::NotFound { .. })
        ));

        let loan = store.create_loan("T", "U", date(2023, 5, 15));
        assert!(matches!(
            store.mark_returned(&loan.id, date(2023, 5, 14)),
            Err(CoreError::InvalidDate { .. })
        ));
        assert!(store.get(&loan.id).unwrap().is_active());
    }

    #[test]
    fn test_list_for_borrower_in_insertion_order() {
        let mut store = LoanStore::new(FinePolicy::default());
        let a = store.create_loan("T1", "U", date(2023, 5, 1));
        store.create_loan("T2", "V", date(2023, 5, 2));
        let c = store.create_loan("T3", "U", date(2023, 5, 3));

        let ids: Vec<&str> = store.list_for_borrower("U").map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec![a.id.as_str(), c.id.as_str()]);

        store.mark_returned(&a.id, date(2023, 5, 10)).unwrap();
        assert_eq!(store.active_count_for_borrower("U"), 1);
        assert_eq!(store.active_count_for_title("T1"), 0);
        assert_eq!(store.list_for_borrower("U").count(), 2);
    }
}
