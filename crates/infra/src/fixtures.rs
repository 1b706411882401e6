//! Synthetic dataset seeding for dev/demo environments.
//!
//! Mirrors the shape of a small production book: 30 customers, each with
//! 3–10 invoices, random status and amount, sent within the last 6 months.
//! Chronology numbers come from the store's sequence, so the seeded dataset
//! carries a strictly increasing, gapless global sequence starting at 1.

use chrono::{Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;

use ledgerly_billing::{Customer, InvoiceDraft, InvoiceStatus};
use ledgerly_core::{Amount, CustomerId, InvoiceId, UserId};

use crate::store::{CustomerStore, InvoiceStore, StoreError, StoreResult};

const CUSTOMER_COUNT: usize = 30;
const INVOICES_PER_CUSTOMER: core::ops::RangeInclusive<u32> = 3..=10;
/// Amounts in [250, 5000], two decimal places.
const AMOUNT_CENTS: core::ops::RangeInclusive<i64> = 25_000..=500_000;
const SIX_MONTHS_MINUTES: i64 = 6 * 30 * 24 * 60;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Edsger", "Grace", "Barbara", "Donald", "Leslie", "Niklaus", "Margaret",
    "Dennis", "Radia", "Tony",
];
const LAST_NAMES: &[&str] = &[
    "Lovelace", "Turing", "Dijkstra", "Hopper", "Liskov", "Knuth", "Lamport", "Wirth", "Hamilton",
    "Ritchie", "Perlman", "Hoare",
];
const COMPANIES: &[&str] = &[
    "Analytical Engines", "Colossus Ltd", "Structured Works", "Compiler & Co", "Abstraction SA",
    "Literate Systems", "Clockwork Logic", "Pascaline GmbH",
];

/// Outcome of a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers: usize,
    pub invoices: usize,
}

/// Populate the store with the synthetic dataset.
pub async fn seed(
    customers: &dyn CustomerStore,
    invoices: &dyn InvoiceStore,
) -> StoreResult<SeedSummary> {
    let mut rng = rand::rng();
    let mut invoice_count = 0usize;

    for n in 0..CUSTOMER_COUNT {
        let first = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
        let last = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
        let email = format!(
            "{}.{}{}@example.com",
            first.to_lowercase(),
            last.to_lowercase(),
            n
        );
        let company = COMPANIES[rng.random_range(0..COMPANIES.len())].to_string();

        let customer = Customer::new(
            CustomerId::new(),
            first,
            last,
            email,
            Some(company),
            UserId::new(),
        )
        .map_err(StoreError::from)?;
        let customer = customers.insert(customer).await?;

        for _ in 0..rng.random_range(INVOICES_PER_CUSTOMER) {
            let amount = Amount::new(Decimal::new(rng.random_range(AMOUNT_CENTS), 2))?;
            let sent_at = Utc::now() - Duration::minutes(rng.random_range(0..=SIX_MONTHS_MINUTES));
            let status = InvoiceStatus::ALL[rng.random_range(0..InvoiceStatus::ALL.len())];

            let draft = InvoiceDraft {
                amount,
                sent_at,
                status,
                customer_id: customer.id_typed(),
            };
            invoices.insert(InvoiceId::new(), draft).await?;
            invoice_count += 1;
        }
    }

    tracing::info!(
        customers = CUSTOMER_COUNT,
        invoices = invoice_count,
        "seeded fixture dataset"
    );

    Ok(SeedSummary {
        customers: CUSTOMER_COUNT,
        invoices: invoice_count,
    })
}
