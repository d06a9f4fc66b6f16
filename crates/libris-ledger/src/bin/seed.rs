//! # Demo Library Walkthrough
//!
//! Loads the demo library and runs one borrow / return / pay cycle against
//! it, printing what each view would show.
//!
//! ## Usage
//! ```bash
//! # Walk through the demo as of 2023-06-20 (default)
//! cargo run -p libris-ledger --bin seed
//!
//! # Pick another "today"
//! cargo run -p libris-ledger --bin seed -- --today 2023-07-04
//!
//! # Use a config file (env vars still override it)
//! cargo run -p libris-ledger --bin seed -- --config ./libris.toml
//!
//! # Machine-readable output
//! cargo run -p libris-ledger --bin seed -- --json
//! ```

use std::env;
use std::path::PathBuf;

use libris_core::validation::parse_date;
use libris_core::{AvailabilityFilter, CatalogQuery, Money, PaymentMethod};
use libris_ledger::seed::{DEMO_MEMBER_ID, DEMO_SECOND_MEMBER_ID};
use libris_ledger::{demo_library, LedgerConfig, LedgerHandle};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut today = String::from("2023-06-20");
    let mut config_path: Option<PathBuf> = None;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--today" | "-t" => {
                if i + 1 < args.len() {
                    today = args[i + 1].clone();
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--json" | "-j" => json = true,
            "--help" | "-h" => {
                println!("Libris Demo Library");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -t, --today <DATE>    Date to evaluate fines on, YYYY-MM-DD (default: 2023-06-20)");
                println!("  -c, --config <PATH>   TOML config file (default: none)");
                println!("  -j, --json            Print views as JSON");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            other => warn!(argument = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let today = parse_date(&today)?;
    let config = LedgerConfig::load(config_path.as_deref())?;
    let handle = LedgerHandle::new(demo_library(&config)?, config.event_capacity);

    // Log every change the walkthrough makes
    let mut events = handle.subscribe();
    let listener = tokio::spawn(async move {
        let mut seen = 0usize;
        loop {
            match events.recv().await {
                Ok(event) => {
                    info!(?event, "Ledger changed");
                    seen += 1;
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event listener lagged; some changes were not logged");
                }
                Err(RecvError::Closed) => break,
            }
        }
        seen
    });

    println!("📚 Libris Demo Library");
    println!("======================");
    println!("Today: {}", today);
    println!(
        "Loan period: {} days, fine: {}/day",
        config.loan_period_days,
        Money::from_cents(config.daily_fine_cents)
    );
    println!();

    // Dashboard
    let stats = handle.with_ledger(|ledger| ledger.library_stats(today));
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Titles: {}  Copies: {} ({} on loan)", stats.total_titles, stats.total_copies, stats.copies_on_loan);
        println!("Active loans: {}  Overdue: {}", stats.active_loans, stats.overdue_loans);
        println!("Fines owed: {}  Collected this month: {}", stats.total_fines_owed, stats.fines_collected);
        println!("Low stock: {:?}", stats.low_stock_titles);
    }
    println!();

    // Overdue list
    println!("Overdue loans:");
    for entry in handle.with_ledger(|ledger| ledger.overdue_loans(today)) {
        println!(
            "  {} - {} ({} days, {})",
            entry.title_name, entry.borrower_name, entry.assessment.overdue_days, entry.assessment.fine
        );
    }
    println!();

    // Catalog
    let available = handle.with_ledger(|ledger| {
        ledger.search_catalog(&CatalogQuery {
            availability: AvailabilityFilter::Available,
            ..CatalogQuery::default()
        })
    })?;
    println!("Available titles: {}", available.len());
    println!();

    // Borrow, return and pay
    let loan = handle.borrow("5", DEMO_SECOND_MEMBER_ID, today)?;
    println!("✓ Borrowed \"5\" for {}, due {}", DEMO_SECOND_MEMBER_ID, loan.due_date);

    let borrowed = handle.with_ledger(|ledger| ledger.borrowed_titles(DEMO_MEMBER_ID, today))?;
    if let Some(first) = borrowed.first() {
        let receipt = handle.return_loan(&first.loan.id, today)?;
        println!(
            "✓ Returned \"{}\": {} days overdue, fine {}",
            first.title.title, receipt.fine.overdue_days, receipt.fine.fine
        );
    }

    let owed = handle.with_ledger(|ledger| ledger.outstanding_balance(DEMO_MEMBER_ID, today))?;
    if owed.is_positive() {
        let payment = handle.mark_paid(DEMO_MEMBER_ID, PaymentMethod::CreditCard, today)?;
        println!("✓ Paid {} by {:?}", payment.amount, payment.method);
    } else {
        println!("  Nothing owed by {}", DEMO_MEMBER_ID);
    }
    println!();

    // Profile
    let summary = handle.with_ledger(|ledger| ledger.borrower_summary(DEMO_MEMBER_ID, today))?;
    let payments = handle.with_ledger(|ledger| ledger.list_payments(DEMO_MEMBER_ID))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        println!("{}", serde_json::to_string_pretty(&payments)?);
    } else {
        println!(
            "Borrower {}: {} active, {} overdue, {} returned, owes {}",
            summary.borrower_id,
            summary.active_loans,
            summary.overdue_loans,
            summary.returned_loans,
            summary.total_fine_owed
        );
        for payment in &payments {
            println!("  {} {} {}", payment.date, payment.amount, payment.description);
        }
    }

    // Closing the last sender ends the listener
    drop(handle);
    let seen = listener.await?;
    println!();
    println!("✓ Walkthrough complete ({} events)", seen);

    Ok(())
}
