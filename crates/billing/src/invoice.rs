use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerly_core::{Amount, CustomerId, DomainError, DomainResult, Entity, InvoiceId};

use crate::validate;

/// Invoice status.
///
/// Serialized as the uppercase wire strings (`SENT`, `PAID`, `CANCELLED`).
/// This is a free-form field, not a transition graph: any status can be
/// written over any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    Sent,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 3] = [
        InvoiceStatus::Sent,
        InvoiceStatus::Paid,
        InvoiceStatus::Cancelled,
    ];

    /// Settled invoices are excluded from the unpaid aggregate.
    pub fn is_settled(self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Sent => "SENT",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }
}

impl core::str::FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SENT" => Ok(InvoiceStatus::Sent),
            "PAID" => Ok(InvoiceStatus::Paid),
            "CANCELLED" => Ok(InvoiceStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "status must be one of SENT, PAID, CANCELLED (got {other:?})"
            ))),
        }
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writable invoice fields, validated by type.
///
/// A draft is what write operations carry: the store assigns `id` and the
/// chronology number when the draft is persisted, and keeps both on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub amount: Amount,
    pub sent_at: DateTime<Utc>,
    pub status: InvoiceStatus,
    pub customer_id: CustomerId,
}

/// Entity: Invoice.
///
/// The chronology number (`chrono`) has exactly two write paths: assignment
/// from the store's sequence at creation, and [`Invoice::increment_chrono`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    id: InvoiceId,
    amount: Amount,
    sent_at: DateTime<Utc>,
    status: InvoiceStatus,
    chrono: i64,
    customer_id: Option<CustomerId>,
}

impl Invoice {
    /// Assemble an invoice from a draft plus the store-assigned parts.
    pub fn new(id: InvoiceId, draft: InvoiceDraft, chrono: i64) -> DomainResult<Self> {
        validate::chrono_number(chrono)?;
        Ok(Self {
            id,
            amount: draft.amount,
            sent_at: draft.sent_at,
            status: draft.status,
            chrono,
            customer_id: Some(draft.customer_id),
        })
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn chrono(&self) -> i64 {
        self.chrono
    }

    /// Back-reference to the owning customer; `None` only while detached.
    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    /// Increment the chronology number by one.
    ///
    /// Stores call this under their own atomicity guarantee (write lock or a
    /// single UPDATE statement), which is what keeps concurrent increments
    /// from losing updates.
    pub fn increment_chrono(&mut self) {
        self.chrono += 1;
    }

    pub(crate) fn assign_customer(&mut self, customer_id: CustomerId) {
        self.customer_id = Some(customer_id);
    }

    pub(crate) fn detach_customer(&mut self) {
        self.customer_id = None;
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
