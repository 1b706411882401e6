use ledgerly_core::{Amount, CustomerId, DomainResult, Entity, UserId};

use crate::invoice::Invoice;
use crate::validate;

/// Entity: Customer.
///
/// A customer exclusively owns an insertion-ordered invoice collection. The
/// collection and each invoice's back-reference are mutated only through
/// [`Customer::add_invoice`] and [`Customer::remove_invoice`]; the `Vec`
/// itself is never exposed mutably.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: CustomerId,
    first_name: String,
    last_name: String,
    email: String,
    company: Option<String>,
    user_id: UserId,
    invoices: Vec<Invoice>,
}

impl Customer {
    /// Validate fields and create a customer with an empty invoice collection.
    pub fn new(
        id: CustomerId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        company: Option<String>,
        user_id: UserId,
    ) -> DomainResult<Self> {
        let first_name = first_name.into();
        let last_name = last_name.into();
        let email = email.into();

        validate::name("first name", &first_name)?;
        validate::name("last name", &last_name)?;
        validate::email(&email)?;

        Ok(Self {
            id,
            first_name,
            last_name,
            email,
            company,
            user_id,
            invoices: Vec::new(),
        })
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    /// Owning account (authorization scope), mandatory.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Owned invoices, in insertion order.
    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    /// Add an invoice to the collection and point its back-reference here.
    ///
    /// Idempotent: adding an invoice that is already present (by id) is a
    /// no-op and leaves the caller's invoice untouched.
    pub fn add_invoice(&mut self, invoice: &mut Invoice) {
        if self.invoices.iter().any(|i| i.id() == invoice.id()) {
            return;
        }
        invoice.assign_customer(self.id);
        self.invoices.push(invoice.clone());
    }

    /// Remove an invoice from the collection.
    ///
    /// Idempotent: removing an absent invoice is a no-op. The back-reference
    /// is cleared only if it still points at this customer, so a reference
    /// already reassigned elsewhere is never clobbered.
    pub fn remove_invoice(&mut self, invoice: &mut Invoice) {
        let before = self.invoices.len();
        self.invoices.retain(|i| i.id() != invoice.id());
        if self.invoices.len() == before {
            return;
        }
        if invoice.customer_id() == Some(self.id) {
            invoice.detach_customer();
        }
    }

    /// Attach a batch of invoices through the single mutation path.
    ///
    /// Used by stores when hydrating a customer together with its invoices.
    pub fn with_invoices(mut self, invoices: Vec<Invoice>) -> Self {
        for mut invoice in invoices {
            self.add_invoice(&mut invoice);
        }
        self
    }

    /// Sum of all owned invoice amounts, regardless of status.
    pub fn total_amount(&self) -> Amount {
        self.invoices.iter().map(Invoice::amount).sum()
    }

    /// Sum of owned invoice amounts that are not yet settled.
    pub fn unpaid_amount(&self) -> Amount {
        self.invoices
            .iter()
            .filter(|i| !i.status().is_settled())
            .map(Invoice::amount)
            .sum()
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
