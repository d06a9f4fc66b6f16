//! # Demo Library
//!
//! A small library used by the `seed` binary and by tests: eight titles,
//! six members, one admin, twenty-seven active loans and a short payment
//! history. Every copy off the shelf is out on a loan made through
//! [`Ledger::borrow`].
//!
//! ## Contents
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Loans of John Doe (borrower "1")                                       │
//! │                                                                         │
//! │  title                     borrowed     due          on 2023-06-20      │
//! │  ───────────────────────   ──────────   ──────────   ─────────────      │
//! │  Sapiens                   2023-05-16   2023-06-15   5 days, $5.00      │
//! │  The Hobbit                2023-05-21   2023-06-20   due today          │
//! │  To Kill a Mockingbird     2023-06-01   2023-07-01   not due            │
//! │                                                                         │
//! │  Due dates assume the default 30-day loan period.                       │
//! │                                                                         │
//! │  The remaining copies off the shelf are out with patrons "4".."7",      │
//! │  borrowed between 2023-06-05 and 2023-06-14 and not yet due.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Historical payments are imported with nothing applied: the fines they
//! paid belong to loans that predate this ledger.

use chrono::NaiveDate;
use tracing::info;

use libris_core::{
    Borrower, CoreError, CoreResult, Money, Payment, PaymentMethod, PaymentStatus, Role, Title,
};

use crate::config::LedgerConfig;
use crate::ledger::Ledger;

/// Demo member with active loans.
pub const DEMO_MEMBER_ID: &str = "1";
/// Demo member without loans.
pub const DEMO_SECOND_MEMBER_ID: &str = "2";
/// Demo administrator.
pub const DEMO_ADMIN_ID: &str = "3";

/// Members holding the rest of the copies on loan.
const PATRONS: &[(&str, &str, &str)] = &[
    ("4", "Maria Garcia", "maria@example.com"),
    ("5", "Wei Chen", "wei@example.com"),
    ("6", "Samuel Okafor", "samuel@example.com"),
    ("7", "Priya Patel", "priya@example.com"),
];

/// (id, title, author, isbn, year, publisher, genre, description, total, available)
type TitleRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    i32,
    &'static str,
    &'static str,
    &'static str,
    u32,
    u32,
);

/// Shelf counts after the demo loans below have been made.
const TITLES: &[TitleRow] = &[
    (
        "1",
        "The Great Gatsby",
        "F. Scott Fitzgerald",
        "9780743273565",
        1925,
        "Scribner",
        "Classic",
        "A novel of disillusionment and thwarted romance set during the Roaring Twenties.",
        5,
        3,
    ),
    (
        "2",
        "To Kill a Mockingbird",
        "Harper Lee",
        "9780061120084",
        1960,
        "HarperCollins",
        "Classic",
        "A novel about racial inequality and moral growth set in the American South.",
        8,
        2,
    ),
    (
        "3",
        "Sapiens: A Brief History of Humankind",
        "Yuval Noah Harari",
        "9780062316097",
        2014,
        "Harper",
        "Non-fiction",
        "A survey of the history of humankind from the Stone Age up to the twenty-first century.",
        3,
        0,
    ),
    (
        "4",
        "The Lord of the Rings",
        "J.R.R. Tolkien",
        "9780618640157",
        1954,
        "Mariner Books",
        "Fantasy",
        "An epic high-fantasy novel set in Middle-earth, following the quest to destroy the One Ring.",
        6,
        4,
    ),
    (
        "5",
        "Harry Potter and the Philosopher's Stone",
        "J.K. Rowling",
        "9781408855652",
        1997,
        "Bloomsbury",
        "Fantasy",
        "The first novel in the Harry Potter series, following a young wizard at Hogwarts.",
        10,
        7,
    ),
    (
        "6",
        "The Catcher in the Rye",
        "J.D. Salinger",
        "9780316769488",
        1951,
        "Little, Brown and Company",
        "Classic",
        "Teenage alienation and loss of innocence through the eyes of Holden Caulfield.",
        4,
        2,
    ),
    (
        "7",
        "The Hobbit",
        "J.R.R. Tolkien",
        "9780547928227",
        1937,
        "Houghton Mifflin Harcourt",
        "Fantasy",
        "Bilbo Baggins sets out to win a share of the treasure guarded by Smaug the dragon.",
        5,
        0,
    ),
    (
        "8",
        "Pride and Prejudice",
        "Jane Austen",
        "9780141439518",
        1813,
        "Penguin Classics",
        "Classic",
        "A romantic novel of manners following Elizabeth Bennet and Mr. Darcy.",
        7,
        3,
    ),
];

/// (title id, borrow date) for the demo member.
const LOANS: &[(&str, (i32, u32, u32))] = &[
    ("3", (2023, 5, 16)),
    ("7", (2023, 5, 21)),
    ("2", (2023, 6, 1)),
];

fn date(y: i32, m: u32, d: u32) -> CoreResult<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| CoreError::invalid_date(format!("{}-{}-{}", y, m, d), "no such day"))
}

/// Builds the demo library under the given configuration.
pub fn demo_library(config: &LedgerConfig) -> CoreResult<Ledger> {
    let mut ledger = Ledger::new(config);

    for &(id, title, author, isbn, year, publisher, genre, description, total, _) in TITLES {
        ledger.insert_title(Title {
            id: id.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
            publication_year: year,
            publisher: publisher.to_string(),
            genre: genre.to_string(),
            description: description.to_string(),
            cover_image: None,
            total_copies: total,
            available_copies: total,
        })?;
    }

    for borrower in borrowers()? {
        ledger.insert_borrower(borrower)?;
    }

    for &(title_id, (y, m, d)) in LOANS {
        ledger.borrow(title_id, DEMO_MEMBER_ID, date(y, m, d)?)?;
    }

    // Lend out whatever is still above the listed shelf count
    let mut next = 0usize;
    for &(id, .., available) in TITLES {
        while ledger.get_availability(id)?.available_copies > available {
            let (patron, ..) = PATRONS[next % PATRONS.len()];
            ledger.borrow(id, patron, date(2023, 6, 5 + (next % 10) as u32)?)?;
            next += 1;
        }
    }

    for payment in payments()? {
        ledger.import_payment(payment)?;
    }

    info!(
        titles = ledger.inventory().len(),
        borrowers = ledger.borrowers().len(),
        loans = ledger.loans().len(),
        payments = ledger.payments().len(),
        "Demo library ready"
    );
    Ok(ledger)
}

fn borrowers() -> CoreResult<Vec<Borrower>> {
    let mut borrowers = vec![
        Borrower {
            id: DEMO_MEMBER_ID.to_string(),
            name: "John Doe".to_string(),
            email: "user@example.com".to_string(),
            role: Role::Member,
            member_since: date(2022, 5, 15)?,
            phone_number: Some("555-123-4567".to_string()),
            address: Some("123 Main St, Anytown, USA".to_string()),
        },
        Borrower {
            id: DEMO_SECOND_MEMBER_ID.to_string(),
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
            role: Role::Member,
            member_since: date(2022, 7, 22)?,
            phone_number: Some("555-987-6543".to_string()),
            address: Some("456 Elm St, Othertown, USA".to_string()),
        },
        Borrower {
            id: DEMO_ADMIN_ID.to_string(),
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
            member_since: date(2021, 1, 10)?,
            phone_number: Some("555-555-5555".to_string()),
            address: Some("Library Admin Office".to_string()),
        },
    ];

    for &(id, name, email) in PATRONS {
        borrowers.push(Borrower {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Member,
            member_since: date(2023, 1, 9)?,
            phone_number: None,
            address: None,
        });
    }
    Ok(borrowers)
}

fn payments() -> CoreResult<Vec<Payment>> {
    let history = [
        ("1", DEMO_MEMBER_ID, 250, date(2023, 4, 10)?, PaymentMethod::CreditCard, "The Hobbit"),
        ("2", DEMO_MEMBER_ID, 500, date(2023, 6, 5)?, PaymentMethod::PayPal, "Sapiens"),
        ("3", DEMO_SECOND_MEMBER_ID, 300, date(2023, 5, 22)?, PaymentMethod::CreditCard, "Pride and Prejudice"),
    ];

    Ok(history
        .into_iter()
        .map(|(id, borrower_id, cents, date, method, title)| Payment {
            id: id.to_string(),
            borrower_id: borrower_id.to_string(),
            amount: Money::from_cents(cents),
            applied_amount: Money::zero(),
            date,
            method,
            status: PaymentStatus::Completed,
            description: format!("Overdue fine for \"{}\"", title),
        })
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, d).unwrap()
    }

    #[test]
    fn test_demo_library_shelf_counts() {
        let ledger = demo_library(&LedgerConfig::default()).unwrap();

        assert_eq!(ledger.inventory().len(), 8);
        assert_eq!(ledger.get_availability("3").unwrap().available_copies, 0);
        assert_eq!(ledger.get_availability("7").unwrap().available_copies, 0);
        assert_eq!(ledger.get_availability("2").unwrap().available_copies, 2);
        assert_eq!(ledger.get_availability("5").unwrap().available_copies, 7);
    }

    #[test]
    fn test_demo_member_on_june_20() {
        let ledger = demo_library(&LedgerConfig::default()).unwrap();
        let now = day(6, 20);

        let rows = ledger.borrowed_titles(DEMO_MEMBER_ID, now).unwrap();
        let due: Vec<_> = rows.iter().map(|r| r.loan.due_date).collect();
        assert_eq!(due, vec![day(6, 15), day(6, 20), day(7, 1)]);

        let summary = ledger.borrower_summary(DEMO_MEMBER_ID, now).unwrap();
        assert_eq!(summary.active_loans, 3);
        assert_eq!(summary.overdue_loans, 1);
        assert_eq!(summary.total_fine_owed, Money::from_cents(500));

        assert_eq!(ledger.list_payments(DEMO_MEMBER_ID).unwrap().len(), 2);
    }

    #[test]
    fn test_demo_stats() {
        let ledger = demo_library(&LedgerConfig::default()).unwrap();
        let stats = ledger.library_stats(day(6, 20));

        assert_eq!(stats.total_borrowers, 7);
        assert_eq!(stats.members, 6);
        assert_eq!(stats.active_loans, 27);
        assert_eq!(stats.copies_on_loan, 27);
        assert_eq!(stats.overdue_loans, 1);
        assert_eq!(stats.fines_collected, Money::from_cents(500));
        assert!(stats.low_stock_titles.contains(&"3".to_string()));
        assert!(stats.low_stock_titles.contains(&"7".to_string()));
        assert!(stats.low_stock_titles.contains(&"2".to_string()));
        assert!(!stats.low_stock_titles.contains(&"5".to_string()));
    }

    #[test]
    fn test_every_copy_off_the_shelf_has_a_loan() {
        let ledger = demo_library(&LedgerConfig::default()).unwrap();

        for title in ledger.inventory().iter() {
            assert_eq!(
                title.on_loan() as usize,
                ledger.loans().active_count_for_title(&title.id),
                "title {}",
                title.id
            );
        }
    }

    #[test]
    fn test_seeded_title_with_copies_out_cannot_be_removed() {
        let mut ledger = demo_library(&LedgerConfig::default()).unwrap();

        // Gatsby: two copies out with patrons, none with the demo member
        let result = ledger.remove_title("1");
        assert!(matches!(result, Err(CoreError::TitleInUse { .. })));
        assert!(ledger.title("1").is_ok());
    }

    #[test]
    fn test_patron_loans_are_not_overdue() {
        let ledger = demo_library(&LedgerConfig::default()).unwrap();
        let overdue = ledger.overdue_loans(day(6, 20));

        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].loan.borrower_id, DEMO_MEMBER_ID);
    }

    #[test]
    fn test_second_member_owes_nothing() {
        let ledger = demo_library(&LedgerConfig::default()).unwrap();
        let balance = ledger
            .outstanding_balance(DEMO_SECOND_MEMBER_ID, day(6, 20))
            .unwrap();
        assert!(balance.is_zero());
    }
}
