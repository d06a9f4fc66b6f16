//! # Fine Calculator
//!
//! Pure overdue and fine computation.
//!
//! ## Why Recompute Every Time?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cached fine on the loan                 Derived fine (this module)     │
//! │  ───────────────────────                 ──────────────────────────     │
//! │  fine: 5.00 written on 2023-06-20        compute_overdue(due, today)    │
//! │  still 5.00 on 2023-06-25  ❌ stale      10.00 on 2023-06-25  ✅        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here reads the clock. The caller passes the effective date in,
//! so the same inputs always produce the same assessment.
//!
//! ## Usage
//! ```rust
//! use chrono::NaiveDate;
//! use libris_core::fine::FinePolicy;
//!
//! let policy = FinePolicy::default(); // 30 days, $1.00/day
//! let due = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
//! let today = NaiveDate::from_ymd_opt(2023, 6, 20).unwrap();
//!
//! let assessment = policy.compute_overdue(due, today);
//! assert!(assessment.is_overdue);
//! assert_eq!(assessment.overdue_days, 5);
//! assert_eq!(assessment.fine.to_string(), "$5.00");
//! ```

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::Loan;
use crate::validation::parse_date;
use crate::{DEFAULT_DAILY_FINE_CENTS, DEFAULT_LOAN_PERIOD_DAYS};

/// Overdue status of a loan at one effective date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OverdueAssessment {
    pub is_overdue: bool,
    pub overdue_days: i64,
    pub fine: Money,
}

impl OverdueAssessment {
    /// Assessment of a loan that is not overdue.
    pub const fn on_time() -> Self {
        OverdueAssessment {
            is_overdue: false,
            overdue_days: 0,
            fine: Money::zero(),
        }
    }
}

/// Loan period and daily fine rate.
///
/// The historical sample data mixes $1.00/day fines with flat amounts, so
/// the rate is configuration rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinePolicy {
    pub loan_period_days: u32,
    pub daily_rate: Money,
}

impl Default for FinePolicy {
    fn default() -> Self {
        FinePolicy {
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
            daily_rate: Money::from_cents(DEFAULT_DAILY_FINE_CENTS),
        }
    }
}

impl FinePolicy {
    pub fn new(loan_period_days: u32, daily_rate: Money) -> Self {
        FinePolicy {
            loan_period_days,
            daily_rate,
        }
    }

    /// Due date of a loan borrowed on `borrow_date`.
    ///
    /// Saturates at the maximum representable date instead of panicking.
    pub fn due_date(&self, borrow_date: NaiveDate) -> NaiveDate {
        borrow_date
            .checked_add_days(Days::new(u64::from(self.loan_period_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Computes overdue days and fine for `due_date` evaluated at
    /// `effective_date`.
    ///
    /// ## Rules
    /// - overdue only when `effective_date > due_date`
    /// - `overdue_days` is the number of whole days past due, else 0
    /// - `fine = overdue_days × daily_rate`
    pub fn compute_overdue(&self, due_date: NaiveDate, effective_date: NaiveDate) -> OverdueAssessment {
        if effective_date <= due_date {
            return OverdueAssessment::on_time();
        }

        let overdue_days = (effective_date - due_date).num_days();
        OverdueAssessment {
            is_overdue: true,
            overdue_days,
            fine: self.daily_rate.times(overdue_days),
        }
    }

    /// Same as [`FinePolicy::compute_overdue`] for `YYYY-MM-DD` strings.
    ///
    /// ## Errors
    /// `InvalidDate` if either date is malformed.
    pub fn compute_overdue_str(&self, due_date: &str, effective_date: &str) -> CoreResult<OverdueAssessment> {
        let due = parse_date(due_date)?;
        let effective = parse_date(effective_date)?;
        Ok(self.compute_overdue(due, effective))
    }

    /// Assesses a loan: a returned loan is frozen at its return date, an
    /// active one keeps accruing until `now`.
    pub fn assess_loan(&self, loan: &Loan, now: NaiveDate) -> OverdueAssessment {
        self.compute_overdue(loan.due_date, loan.effective_date(now))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
