//! Query model for collection endpoints.
//!
//! Exact-match filters, whitelisted sort fields, and capped pagination.
//! Parsing query-string values into these types happens at the API boundary;
//! stores only ever see validated enums.

use serde::{Deserialize, Serialize};

use ledgerly_billing::{Customer, Invoice, InvoiceStatus};
use ledgerly_core::{CustomerId, DomainError};

/// Pagination parameters for collection queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of records to return.
    pub limit: u32,
    /// Offset for pagination (0-based).
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 50, // Safe default
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(50).min(1000), // Cap at 1000 for safety
            offset: offset.unwrap_or(0),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl core::str::FromStr for SortDir {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            other => Err(DomainError::validation(format!(
                "order must be asc or desc (got {other:?})"
            ))),
        }
    }
}

/// Exact-match filter criteria for customer listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
}

impl CustomerFilter {
    pub fn matches(&self, customer: &Customer) -> bool {
        self.first_name
            .as_deref()
            .is_none_or(|v| customer.first_name() == v)
            && self
                .last_name
                .as_deref()
                .is_none_or(|v| customer.last_name() == v)
            && self.email.as_deref().is_none_or(|v| customer.email() == v)
            && self
                .company
                .as_deref()
                .is_none_or(|v| customer.company() == Some(v))
    }
}

/// Sortable customer fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerSortField {
    FirstName,
    LastName,
    Email,
    Company,
}

impl CustomerSortField {
    /// Column name in the relational schema.
    pub fn column(self) -> &'static str {
        match self {
            CustomerSortField::FirstName => "first_name",
            CustomerSortField::LastName => "last_name",
            CustomerSortField::Email => "email",
            CustomerSortField::Company => "company",
        }
    }
}

impl core::str::FromStr for CustomerSortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_name" => Ok(CustomerSortField::FirstName),
            "last_name" => Ok(CustomerSortField::LastName),
            "email" => Ok(CustomerSortField::Email),
            "company" => Ok(CustomerSortField::Company),
            other => Err(DomainError::validation(format!(
                "order_by must be one of first_name, last_name, email, company (got {other:?})"
            ))),
        }
    }
}

/// Requested ordering for customer listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerSort {
    pub field: CustomerSortField,
    pub dir: SortDir,
}

/// Exact-match filter criteria for invoice listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub chrono: Option<i64>,
    pub customer_id: Option<CustomerId>,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.status.is_none_or(|v| invoice.status() == v)
            && self.chrono.is_none_or(|v| invoice.chrono() == v)
            && self
                .customer_id
                .is_none_or(|v| invoice.customer_id() == Some(v))
    }
}

/// Sortable invoice fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceSortField {
    Chrono,
    Amount,
    SentAt,
}

impl InvoiceSortField {
    /// Column name in the relational schema.
    pub fn column(self) -> &'static str {
        match self {
            InvoiceSortField::Chrono => "chrono",
            InvoiceSortField::Amount => "amount",
            InvoiceSortField::SentAt => "sent_at",
        }
    }
}

impl core::str::FromStr for InvoiceSortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chrono" => Ok(InvoiceSortField::Chrono),
            "amount" => Ok(InvoiceSortField::Amount),
            "sent_at" => Ok(InvoiceSortField::SentAt),
            other => Err(DomainError::validation(format!(
                "order_by must be one of chrono, amount, sent_at (got {other:?})"
            ))),
        }
    }
}

/// Requested ordering for invoice listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceSort {
    pub field: InvoiceSortField,
    pub dir: SortDir,
}
