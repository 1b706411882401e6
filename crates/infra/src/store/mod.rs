//! Storage gateway traits and implementations.
//!
//! The gateway owns the commit boundary and the chronology sequence: invoice
//! creation assigns `chrono` from an atomic counter, and the increment
//! operation is atomic at this boundary, so concurrent increments can never
//! lose an update.

use async_trait::async_trait;
use thiserror::Error;

use ledgerly_billing::{Customer, Invoice, InvoiceDraft};
use ledgerly_core::{CustomerId, DomainError, InvoiceId};

use crate::query::{CustomerFilter, CustomerSort, InvoiceFilter, InvoiceSort, Pagination};

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryStore;

/// Storage gateway error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The targeted record does not exist.
    #[error("not found")]
    NotFound,

    /// A domain rule rejected the record (validation, conflict).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backend failed (pool, query, lock). Propagated unmodified, no retry.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Gateway for customer records.
///
/// Reads return customers hydrated with their invoice collection so derived
/// aggregates can be computed; writes persist scalar fields only (the
/// collection is derived from the invoice table on read).
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn insert(&self, customer: Customer) -> StoreResult<Customer>;
    async fn get(&self, id: CustomerId) -> StoreResult<Customer>;
    async fn update(&self, customer: Customer) -> StoreResult<Customer>;
    /// Delete a customer and, by exclusive ownership, its invoices.
    async fn delete(&self, id: CustomerId) -> StoreResult<()>;
    async fn list(
        &self,
        filter: &CustomerFilter,
        sort: Option<CustomerSort>,
        page: Pagination,
    ) -> StoreResult<Vec<Customer>>;
}

/// Gateway for invoice records.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Persist a draft under the given id, assigning the next chronology
    /// number from the store's atomic sequence.
    async fn insert(&self, id: InvoiceId, draft: InvoiceDraft) -> StoreResult<Invoice>;
    async fn get(&self, id: InvoiceId) -> StoreResult<Invoice>;
    /// Replace the writable fields; id and chronology number are kept.
    async fn update(&self, id: InvoiceId, draft: InvoiceDraft) -> StoreResult<Invoice>;
    async fn delete(&self, id: InvoiceId) -> StoreResult<()>;
    async fn list(
        &self,
        filter: &InvoiceFilter,
        sort: Option<InvoiceSort>,
        page: Pagination,
    ) -> StoreResult<Vec<Invoice>>;
    /// A customer's invoices in insertion order (ascending chronology).
    async fn list_for_customer(&self, customer_id: CustomerId) -> StoreResult<Vec<Invoice>>;
    /// Atomically add one to the invoice's chronology number and return the
    /// updated record.
    async fn increment_chrono(&self, id: InvoiceId) -> StoreResult<Invoice>;
}
