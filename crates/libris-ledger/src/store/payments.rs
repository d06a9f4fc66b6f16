//! # Payment Log
//!
//! Append-only record of fine payments. There is no update or delete: a
//! correction is a new entry.

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use libris_core::{Money, Payment, PaymentMethod, PaymentStatus};

#[derive(Debug, Clone, Default)]
pub struct PaymentLog {
    payments: Vec<Payment>,
}

impl PaymentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    /// Appends a completed payment and returns it.
    pub fn record(
        &mut self,
        borrower_id: &str,
        amount: Money,
        applied_amount: Money,
        method: PaymentMethod,
        date: NaiveDate,
        description: String,
    ) -> Payment {
        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            borrower_id: borrower_id.to_string(),
            amount,
            applied_amount,
            date,
            method,
            status: PaymentStatus::Completed,
            description,
        };

        self.append(payment.clone());
        payment
    }

    /// Appends an existing payment record as-is.
    pub fn append(&mut self, payment: Payment) {
        debug!(
            payment_id = %payment.id,
            borrower_id = %payment.borrower_id,
            amount = %payment.amount,
            applied = %payment.applied_amount,
            "Payment appended"
        );
        self.payments.push(payment);
    }

    /// Payments of one borrower in insertion order.
    pub fn list_for_borrower<'a>(&'a self, borrower_id: &'a str) -> impl Iterator<Item = &'a Payment> + 'a {
        self.payments.iter().filter(move |p| p.borrower_id == borrower_id)
    }

    /// Sum credited against a borrower's fines by completed payments.
    pub fn credited_total(&self, borrower_id: &str) -> Money {
        self.list_for_borrower(borrower_id).map(Payment::credited).sum()
    }

    /// Money received by completed payments dated `from..=to`, whether or
    /// not it was applied to a fine.
    pub fn collected_between(&self, from: NaiveDate, to: NaiveDate) -> Money {
        self.payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed && p.date >= from && p.date <= to)
            .map(|p| p.amount)
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Payment> {
        self.payments.iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, d).unwrap()
    }

    #[test]
    fn test_record_and_list() {
        let mut log = PaymentLog::new();
        let first = log.record(
            "1",
            Money::from_cents(500),
            Money::from_cents(300),
            PaymentMethod::CreditCard,
            date(1),
            "Overdue fine".to_string(),
        );
        log.record(
            "2",
            Money::from_cents(100),
            Money::from_cents(100),
            PaymentMethod::Cash,
            date(2),
            String::new(),
        );

        assert_eq!(first.status, PaymentStatus::Completed);
        assert_eq!(log.len(), 2);
        assert_eq!(log.list_for_borrower("1").count(), 1);
        assert_eq!(log.credited_total("1"), Money::from_cents(300));
    }

    #[test]
    fn test_failed_payments_do_not_count() {
        let mut log = PaymentLog::new();
        log.append(Payment {
            id: "p".to_string(),
            borrower_id: "1".to_string(),
            amount: Money::from_cents(500),
            applied_amount: Money::from_cents(500),
            date: date(3),
            method: PaymentMethod::PayPal,
            status: PaymentStatus::Failed,
            description: String::new(),
        });

        assert!(log.credited_total("1").is_zero());
        assert_eq!(log.list_for_borrower("1").count(), 1);
    }

    #[test]
    fn test_collected_between_counts_completed_payments_in_window() {
        let mut log = PaymentLog::new();
        for (day, cents, status) in [
            (1, 200, PaymentStatus::Completed),
            (10, 300, PaymentStatus::Completed),
            (12, 900, PaymentStatus::Failed),
            (20, 400, PaymentStatus::Completed),
        ] {
            log.append(Payment {
                id: format!("p{}", day),
                borrower_id: "1".to_string(),
                amount: Money::from_cents(cents),
                applied_amount: Money::zero(),
                date: date(day),
                method: PaymentMethod::Cash,
                status,
                description: String::new(),
            });
        }

        assert_eq!(log.collected_between(date(1), date(10)), Money::from_cents(500));
        assert_eq!(log.collected_between(date(11), date(19)), Money::zero());
        assert_eq!(log.collected_between(date(1), date(30)), Money::from_cents(900));
    }
}
