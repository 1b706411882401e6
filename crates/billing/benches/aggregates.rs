use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::Utc;
use ledgerly_billing::{Customer, Invoice, InvoiceDraft, InvoiceStatus};
use ledgerly_core::{Amount, CustomerId, InvoiceId, UserId};
use rust_decimal::Decimal;

fn customer_with_invoices(count: usize) -> Customer {
    let customer = Customer::new(
        CustomerId::new(),
        "Bench",
        "Customer",
        "bench@example.com",
        None,
        UserId::new(),
    )
    .expect("valid bench customer");

    let invoices = (0..count)
        .map(|i| {
            let status = InvoiceStatus::ALL[i % InvoiceStatus::ALL.len()];
            Invoice::new(
                InvoiceId::new(),
                InvoiceDraft {
                    amount: Amount::new(Decimal::new(25_000 + i as i64, 2)).expect("non-negative"),
                    sent_at: Utc::now(),
                    status,
                    customer_id: customer.id_typed(),
                },
                i as i64 + 1,
            )
            .expect("valid bench invoice")
        })
        .collect();

    customer.with_invoices(invoices)
}

fn bench_aggregates(c: &mut Criterion) {
    let mut group = c.benchmark_group("customer_aggregates");

    for &count in &[10usize, 100, 1_000, 10_000] {
        let customer = customer_with_invoices(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("total_amount", count), &customer, |b, cu| {
            b.iter(|| black_box(cu.total_amount()))
        });

        group.bench_with_input(
            BenchmarkId::new("unpaid_amount", count),
            &customer,
            |b, cu| b.iter(|| black_box(cu.unpaid_amount())),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_aggregates);
criterion_main!(benches);
