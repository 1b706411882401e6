//! In-memory storage gateway for tests/dev.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use ledgerly_billing::{Customer, Invoice, InvoiceDraft};
use ledgerly_core::{CustomerId, DomainError, Entity, InvoiceId};

use crate::query::{
    CustomerFilter, CustomerSort, CustomerSortField, InvoiceFilter, InvoiceSort, InvoiceSortField,
    Pagination, SortDir,
};
use crate::store::{CustomerStore, InvoiceStore, StoreError, StoreResult};

/// Keyed record table guarded by a read/write lock.
#[derive(Debug)]
struct Table<E: Entity> {
    inner: RwLock<HashMap<E::Id, E>>,
}

impl<E> Table<E>
where
    E: Entity + Clone,
{
    fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn lock_poisoned() -> StoreError {
        StoreError::Backend("record table lock poisoned".to_string())
    }

    fn get(&self, id: &E::Id) -> StoreResult<Option<E>> {
        let map = self.inner.read().map_err(|_| Self::lock_poisoned())?;
        Ok(map.get(id).cloned())
    }

    /// Insert a record that must not exist yet.
    fn insert_new(&self, entity: E) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| Self::lock_poisoned())?;
        if map.contains_key(entity.id()) {
            return Err(StoreError::Domain(DomainError::conflict(
                "record already exists",
            )));
        }
        map.insert(entity.id().clone(), entity);
        Ok(())
    }

    /// Replace a record that must already exist.
    fn replace(&self, entity: E) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| Self::lock_poisoned())?;
        if !map.contains_key(entity.id()) {
            return Err(StoreError::NotFound);
        }
        map.insert(entity.id().clone(), entity);
        Ok(())
    }

    fn remove(&self, id: &E::Id) -> StoreResult<Option<E>> {
        let mut map = self.inner.write().map_err(|_| Self::lock_poisoned())?;
        Ok(map.remove(id))
    }

    fn retain(&self, f: impl FnMut(&E::Id, &mut E) -> bool) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| Self::lock_poisoned())?;
        map.retain(f);
        Ok(())
    }

    fn values(&self) -> StoreResult<Vec<E>> {
        let map = self.inner.read().map_err(|_| Self::lock_poisoned())?;
        Ok(map.values().cloned().collect())
    }

    /// Mutate a record in place under the write lock.
    fn update_with<T>(
        &self,
        id: &E::Id,
        f: impl FnOnce(&mut E) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut map = self.inner.write().map_err(|_| Self::lock_poisoned())?;
        let entity = map.get_mut(id).ok_or(StoreError::NotFound)?;
        f(entity)
    }
}

/// In-memory store for customers and invoices.
///
/// The chronology sequence is an atomic counter; increments happen under the
/// invoice table's write lock, so the counter semantics match the Postgres
/// store's single-statement UPDATE.
#[derive(Debug)]
pub struct InMemoryStore {
    customers: Table<Customer>,
    invoices: Table<Invoice>,
    chrono_seq: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            customers: Table::new(),
            invoices: Table::new(),
            chrono_seq: AtomicI64::new(0),
        }
    }

    fn next_chrono(&self) -> i64 {
        self.chrono_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn invoices_of(&self, customer_id: CustomerId) -> StoreResult<Vec<Invoice>> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .values()?
            .into_iter()
            .filter(|i| i.customer_id() == Some(customer_id))
            .collect();
        // Insertion order: chronology numbers are assigned monotonically.
        invoices.sort_by_key(Invoice::chrono);
        Ok(invoices)
    }

    fn hydrate(&self, customer: Customer) -> StoreResult<Customer> {
        let invoices = self.invoices_of(customer.id_typed())?;
        Ok(customer.with_invoices(invoices))
    }

    fn ensure_customer_exists(&self, id: CustomerId) -> StoreResult<()> {
        if self.customers.get(&id)?.is_none() {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_customers(customers: &mut [Customer], sort: Option<CustomerSort>) {
    match sort {
        // Default: creation order (identifiers are time-ordered).
        None => customers.sort_by_key(|c| *c.id_typed().as_uuid()),
        Some(CustomerSort { field, dir }) => {
            customers.sort_by(|a, b| {
                let ord = match field {
                    CustomerSortField::FirstName => a.first_name().cmp(b.first_name()),
                    CustomerSortField::LastName => a.last_name().cmp(b.last_name()),
                    CustomerSortField::Email => a.email().cmp(b.email()),
                    CustomerSortField::Company => a.company().cmp(&b.company()),
                };
                match dir {
                    SortDir::Asc => ord,
                    SortDir::Desc => ord.reverse(),
                }
            });
        }
    }
}

fn sort_invoices(invoices: &mut [Invoice], sort: Option<InvoiceSort>) {
    match sort {
        None => invoices.sort_by_key(Invoice::chrono),
        Some(InvoiceSort { field, dir }) => {
            invoices.sort_by(|a, b| {
                let ord = match field {
                    InvoiceSortField::Chrono => a.chrono().cmp(&b.chrono()),
                    InvoiceSortField::Amount => a.amount().cmp(&b.amount()),
                    InvoiceSortField::SentAt => a.sent_at().cmp(&b.sent_at()),
                };
                match dir {
                    SortDir::Asc => ord,
                    SortDir::Desc => ord.reverse(),
                }
            });
        }
    }
}

fn paginate<T>(items: Vec<T>, page: Pagination) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

#[async_trait]
impl CustomerStore for InMemoryStore {
    async fn insert(&self, customer: Customer) -> StoreResult<Customer> {
        self.customers.insert_new(customer.clone())?;
        Ok(customer)
    }

    async fn get(&self, id: CustomerId) -> StoreResult<Customer> {
        let customer = self.customers.get(&id)?.ok_or(StoreError::NotFound)?;
        self.hydrate(customer)
    }

    async fn update(&self, customer: Customer) -> StoreResult<Customer> {
        self.customers.replace(customer.clone())?;
        self.hydrate(customer)
    }

    async fn delete(&self, id: CustomerId) -> StoreResult<()> {
        self.customers.remove(&id)?.ok_or(StoreError::NotFound)?;
        // Exclusive ownership: the customer's invoices go with it.
        self.invoices
            .retain(|_, invoice| invoice.customer_id() != Some(id))?;
        Ok(())
    }

    async fn list(
        &self,
        filter: &CustomerFilter,
        sort: Option<CustomerSort>,
        page: Pagination,
    ) -> StoreResult<Vec<Customer>> {
        let mut customers: Vec<Customer> = self
            .customers
            .values()?
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect();
        sort_customers(&mut customers, sort);
        paginate(customers, page)
            .into_iter()
            .map(|c| self.hydrate(c))
            .collect()
    }
}

#[async_trait]
impl InvoiceStore for InMemoryStore {
    async fn insert(&self, id: InvoiceId, draft: InvoiceDraft) -> StoreResult<Invoice> {
        self.ensure_customer_exists(draft.customer_id)?;
        let chrono = self.next_chrono();
        let invoice = Invoice::new(id, draft, chrono)?;
        self.invoices.insert_new(invoice.clone())?;
        tracing::debug!(invoice_id = %id, chrono, "invoice created");
        Ok(invoice)
    }

    async fn get(&self, id: InvoiceId) -> StoreResult<Invoice> {
        self.invoices.get(&id)?.ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: InvoiceId, draft: InvoiceDraft) -> StoreResult<Invoice> {
        self.ensure_customer_exists(draft.customer_id)?;
        self.invoices.update_with(&id, |invoice| {
            let updated = Invoice::new(id, draft, invoice.chrono())?;
            *invoice = updated.clone();
            Ok(updated)
        })
    }

    async fn delete(&self, id: InvoiceId) -> StoreResult<()> {
        self.invoices.remove(&id)?.ok_or(StoreError::NotFound)?;
        Ok(())
    }

    async fn list(
        &self,
        filter: &InvoiceFilter,
        sort: Option<InvoiceSort>,
        page: Pagination,
    ) -> StoreResult<Vec<Invoice>> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .values()?
            .into_iter()
            .filter(|i| filter.matches(i))
            .collect();
        sort_invoices(&mut invoices, sort);
        Ok(paginate(invoices, page))
    }

    async fn list_for_customer(&self, customer_id: CustomerId) -> StoreResult<Vec<Invoice>> {
        self.ensure_customer_exists(customer_id)?;
        self.invoices_of(customer_id)
    }

    async fn increment_chrono(&self, id: InvoiceId) -> StoreResult<Invoice> {
        let updated = self.invoices.update_with(&id, |invoice| {
            invoice.increment_chrono();
            Ok(invoice.clone())
        })?;
        tracing::debug!(invoice_id = %id, chrono = updated.chrono(), "chronology incremented");
        Ok(updated)
    }
}
