//! Infrastructure layer: storage gateways, query model, fixtures.

pub mod fixtures;
pub mod query;
pub mod store;

pub use query::{
    CustomerFilter, CustomerSort, CustomerSortField, InvoiceFilter, InvoiceSort, InvoiceSortField,
    Pagination, SortDir,
};
pub use store::{CustomerStore, InMemoryStore, InvoiceStore, StoreError};

#[cfg(feature = "postgres")]
pub use store::postgres::PostgresStore;
