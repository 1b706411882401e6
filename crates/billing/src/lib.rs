//! Billing domain module (customers and their invoices).
//!
//! This crate contains business rules for customers and invoices,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod customer;
pub mod invoice;
pub mod validate;

pub use customer::Customer;
pub use invoice::{Invoice, InvoiceDraft, InvoiceStatus};
