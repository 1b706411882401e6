use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use ledgerly_billing::{Customer, Invoice, InvoiceDraft, InvoiceStatus};
use ledgerly_core::{Amount, CustomerId, DomainError, DomainResult, UserId};
use ledgerly_infra::{
    CustomerFilter, CustomerSort, InvoiceFilter, InvoiceSort, Pagination, SortDir,
};

// -------------------------
// Request DTOs
// -------------------------

/// Body for `POST /customers` and `PUT /customers/:id` (full replacement).
#[derive(Debug, Deserialize)]
pub struct CustomerPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    pub user_id: String,
}

impl CustomerPayload {
    /// Validate and build the domain entity under the given id.
    pub fn into_customer(self, id: CustomerId) -> DomainResult<Customer> {
        let user_id: UserId = self.user_id.parse()?;
        Customer::new(
            id,
            self.first_name,
            self.last_name,
            self.email,
            self.company,
            user_id,
        )
    }
}

/// Body for `POST /invoices` and `PUT /invoices/:id` (full replacement).
///
/// The chronology number is never writable through the API: the store assigns
/// it at creation and keeps it on update.
#[derive(Debug, Deserialize)]
pub struct InvoicePayload {
    pub amount: Decimal,
    pub sent_at: String, // RFC3339
    pub status: String,
    pub customer_id: String,
}

impl InvoicePayload {
    pub fn into_draft(self) -> DomainResult<InvoiceDraft> {
        let amount = Amount::new(self.amount)?;
        let sent_at = DateTime::parse_from_rfc3339(&self.sent_at)
            .map_err(|_| DomainError::validation("sent_at must be RFC3339"))?
            .with_timezone(&Utc);
        let status: InvoiceStatus = self.status.parse()?;
        let customer_id: CustomerId = self.customer_id.parse()?;
        Ok(InvoiceDraft {
            amount,
            sent_at,
            status,
            customer_id,
        })
    }
}

// -------------------------
// Query-string DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CustomerListQuery {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub order_by: Option<String>,
    pub order: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl CustomerListQuery {
    pub fn into_parts(self) -> DomainResult<(CustomerFilter, Option<CustomerSort>, Pagination)> {
        let filter = CustomerFilter {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            company: self.company,
        };
        let sort = parse_sort(self.order_by, self.order)?
            .map(|(field, dir)| CustomerSort { field, dir });
        Ok((filter, sort, Pagination::new(self.limit, self.offset)))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceListQuery {
    pub status: Option<String>,
    pub chrono: Option<i64>,
    pub customer_id: Option<String>,
    pub order_by: Option<String>,
    pub order: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl InvoiceListQuery {
    pub fn into_parts(self) -> DomainResult<(InvoiceFilter, Option<InvoiceSort>, Pagination)> {
        let filter = InvoiceFilter {
            status: self.status.as_deref().map(str::parse).transpose()?,
            chrono: self.chrono,
            customer_id: self.customer_id.as_deref().map(str::parse).transpose()?,
        };
        let sort =
            parse_sort(self.order_by, self.order)?.map(|(field, dir)| InvoiceSort { field, dir });
        Ok((filter, sort, Pagination::new(self.limit, self.offset)))
    }
}

fn parse_sort<F: core::str::FromStr<Err = DomainError>>(
    order_by: Option<String>,
    order: Option<String>,
) -> DomainResult<Option<(F, SortDir)>> {
    let Some(field) = order_by else {
        return Ok(None);
    };
    let field: F = field.parse()?;
    let dir = match order {
        None => SortDir::default(),
        Some(dir) => dir.parse()?,
    };
    Ok(Some((field, dir)))
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn customer_to_json(customer: &Customer) -> serde_json::Value {
    serde_json::json!({
        "id": customer.id_typed().to_string(),
        "first_name": customer.first_name(),
        "last_name": customer.last_name(),
        "email": customer.email(),
        "company": customer.company(),
        "user_id": customer.user_id().to_string(),
        "total_amount": customer.total_amount().to_string(),
        "unpaid_amount": customer.unpaid_amount().to_string(),
        "invoices": customer
            .invoices()
            .iter()
            .map(nested_invoice_to_json)
            .collect::<Vec<_>>(),
    })
}

pub fn invoice_to_json(invoice: &Invoice) -> serde_json::Value {
    serde_json::json!({
        "id": invoice.id_typed().to_string(),
        "amount": invoice.amount().to_string(),
        "sent_at": invoice.sent_at().to_rfc3339(),
        "status": invoice.status().as_str(),
        "chrono": invoice.chrono(),
        "customer": invoice.customer_id().map(|c| c.to_string()),
    })
}

/// Invoice representation embedded in a customer response: omits the
/// back-reference to avoid cyclic output.
pub fn nested_invoice_to_json(invoice: &Invoice) -> serde_json::Value {
    serde_json::json!({
        "id": invoice.id_typed().to_string(),
        "amount": invoice.amount().to_string(),
        "sent_at": invoice.sent_at().to_rfc3339(),
        "status": invoice.status().as_str(),
        "chrono": invoice.chrono(),
    })
}
