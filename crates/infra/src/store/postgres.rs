//! Postgres-backed storage gateway.
//!
//! Tables and the `invoice_chrono_seq` sequence are defined in
//! `crates/infra/schema.sql`. The chronology number is assigned with
//! `nextval` at insert and bumped with a single `UPDATE ... SET chrono =
//! chrono + 1 ... RETURNING` statement, so both write paths are atomic on
//! the database side.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use ledgerly_billing::{Customer, Invoice, InvoiceDraft, InvoiceStatus};
use ledgerly_core::{Amount, CustomerId, DomainError, InvoiceId, UserId};

use crate::query::{CustomerFilter, CustomerSort, InvoiceFilter, InvoiceSort, Pagination, SortDir};
use crate::store::{CustomerStore, InvoiceStore, StoreError, StoreResult};

/// Postgres store for customers and invoices.
///
/// Uses the SQLx connection pool, which is thread-safe; every operation is a
/// single statement (or an existence check plus one statement), so the
/// all-or-nothing guarantee holds at single-entity granularity.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| StoreError::Backend(format!("connect: {e}")))?;
        Ok(Self::new(pool))
    }

    async fn customer_exists(&self, id: CustomerId) -> StoreResult<()> {
        let row = sqlx::query("SELECT 1 FROM customers WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("customer_exists", e))?;
        if row.is_none() {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn invoices_of(&self, customer_id: CustomerId) -> StoreResult<Vec<Invoice>> {
        let rows = sqlx::query(
            r#"
            SELECT id, amount, sent_at, status, chrono, customer_id
            FROM invoices
            WHERE customer_id = $1
            ORDER BY chrono ASC
            "#,
        )
        .bind(customer_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_invoices_of_customer", e))?;

        rows.iter().map(invoice_from_row).collect()
    }

    async fn hydrate(&self, customer: Customer) -> StoreResult<Customer> {
        let invoices = self.invoices_of(customer.id_typed()).await?;
        Ok(customer.with_invoices(invoices))
    }
}

fn map_sqlx_error(operation: &str, e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::Backend(format!("database error in {operation}: {other}")),
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

fn row_error(operation: &str, e: sqlx::Error) -> StoreError {
    StoreError::Backend(format!("failed to read {operation} row: {e}"))
}

fn customer_from_row(row: &PgRow) -> StoreResult<Customer> {
    let id: Uuid = row.try_get("id").map_err(|e| row_error("customer", e))?;
    let first_name: String = row
        .try_get("first_name")
        .map_err(|e| row_error("customer", e))?;
    let last_name: String = row
        .try_get("last_name")
        .map_err(|e| row_error("customer", e))?;
    let email: String = row.try_get("email").map_err(|e| row_error("customer", e))?;
    let company: Option<String> = row
        .try_get("company")
        .map_err(|e| row_error("customer", e))?;
    let user_id: Uuid = row
        .try_get("user_id")
        .map_err(|e| row_error("customer", e))?;

    Customer::new(
        CustomerId::from_uuid(id),
        first_name,
        last_name,
        email,
        company,
        UserId::from_uuid(user_id),
    )
    .map_err(StoreError::from)
}

fn invoice_from_row(row: &PgRow) -> StoreResult<Invoice> {
    let id: Uuid = row.try_get("id").map_err(|e| row_error("invoice", e))?;
    let amount: Decimal = row.try_get("amount").map_err(|e| row_error("invoice", e))?;
    let sent_at: chrono::DateTime<chrono::Utc> = row
        .try_get("sent_at")
        .map_err(|e| row_error("invoice", e))?;
    let status: String = row.try_get("status").map_err(|e| row_error("invoice", e))?;
    let chrono: i64 = row.try_get("chrono").map_err(|e| row_error("invoice", e))?;
    let customer_id: Uuid = row
        .try_get("customer_id")
        .map_err(|e| row_error("invoice", e))?;

    let draft = InvoiceDraft {
        amount: Amount::new(amount)?,
        sent_at,
        status: status.parse::<InvoiceStatus>()?,
        customer_id: CustomerId::from_uuid(customer_id),
    };
    Invoice::new(InvoiceId::from_uuid(id), draft, chrono).map_err(StoreError::from)
}

fn order_clause(column: &'static str, dir: SortDir) -> String {
    // Column names come from the whitelisted sort-field enums, never from
    // user input.
    let dir = match dir {
        SortDir::Asc => "ASC",
        SortDir::Desc => "DESC",
    };
    format!("ORDER BY {column} {dir}")
}

#[async_trait]
impl CustomerStore for PostgresStore {
    async fn insert(&self, customer: Customer) -> StoreResult<Customer> {
        let result = sqlx::query(
            r#"
            INSERT INTO customers (id, first_name, last_name, email, company, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(customer.id_typed().as_uuid())
        .bind(customer.first_name())
        .bind(customer.last_name())
        .bind(customer.email())
        .bind(customer.company())
        .bind(customer.user_id().as_uuid())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(customer),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Domain(DomainError::conflict(
                "customer already exists",
            ))),
            Err(e) => Err(map_sqlx_error("insert_customer", e)),
        }
    }

    async fn get(&self, id: CustomerId) -> StoreResult<Customer> {
        let row = sqlx::query(
            r#"
            SELECT id, first_name, last_name, email, company, user_id
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_customer", e))?
        .ok_or(StoreError::NotFound)?;

        self.hydrate(customer_from_row(&row)?).await
    }

    async fn update(&self, customer: Customer) -> StoreResult<Customer> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET first_name = $2,
                last_name = $3,
                email = $4,
                company = $5,
                user_id = $6
            WHERE id = $1
            "#,
        )
        .bind(customer.id_typed().as_uuid())
        .bind(customer.first_name())
        .bind(customer.last_name())
        .bind(customer.email())
        .bind(customer.company())
        .bind(customer.user_id().as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_customer", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.hydrate(customer).await
    }

    async fn delete(&self, id: CustomerId) -> StoreResult<()> {
        // ON DELETE CASCADE removes the customer's invoices with it.
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_customer", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(
        &self,
        filter: &CustomerFilter,
        sort: Option<CustomerSort>,
        page: Pagination,
    ) -> StoreResult<Vec<Customer>> {
        let order = match sort {
            // Default: creation order (identifiers are time-ordered).
            None => order_clause("id", SortDir::Asc),
            Some(CustomerSort { field, dir }) => order_clause(field.column(), dir),
        };
        let sql = format!(
            r#"
            SELECT id, first_name, last_name, email, company, user_id
            FROM customers
            WHERE ($1::text IS NULL OR first_name = $1)
              AND ($2::text IS NULL OR last_name = $2)
              AND ($3::text IS NULL OR email = $3)
              AND ($4::text IS NULL OR company = $4)
            {order}
            LIMIT $5 OFFSET $6
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(filter.first_name.as_deref())
            .bind(filter.last_name.as_deref())
            .bind(filter.email.as_deref())
            .bind(filter.company.as_deref())
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_customers", e))?;

        let mut customers = Vec::with_capacity(rows.len());
        for row in &rows {
            customers.push(self.hydrate(customer_from_row(row)?).await?);
        }
        Ok(customers)
    }
}

#[async_trait]
impl InvoiceStore for PostgresStore {
    async fn insert(&self, id: InvoiceId, draft: InvoiceDraft) -> StoreResult<Invoice> {
        self.customer_exists(draft.customer_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO invoices (id, amount, sent_at, status, chrono, customer_id)
            VALUES ($1, $2, $3, $4, nextval('invoice_chrono_seq'), $5)
            RETURNING id, amount, sent_at, status, chrono, customer_id
            "#,
        )
        .bind(id.as_uuid())
        .bind(draft.amount.as_decimal())
        .bind(draft.sent_at)
        .bind(draft.status.as_str())
        .bind(draft.customer_id.as_uuid())
        .fetch_one(&self.pool)
        .await;

        let row = match result {
            Ok(row) => row,
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::Domain(DomainError::conflict(
                    "invoice already exists",
                )));
            }
            Err(e) => return Err(map_sqlx_error("insert_invoice", e)),
        };

        let invoice = invoice_from_row(&row)?;
        tracing::debug!(invoice_id = %id, chrono = invoice.chrono(), "invoice created");
        Ok(invoice)
    }

    async fn get(&self, id: InvoiceId) -> StoreResult<Invoice> {
        let row = sqlx::query(
            r#"
            SELECT id, amount, sent_at, status, chrono, customer_id
            FROM invoices
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_invoice", e))?
        .ok_or(StoreError::NotFound)?;

        invoice_from_row(&row)
    }

    async fn update(&self, id: InvoiceId, draft: InvoiceDraft) -> StoreResult<Invoice> {
        self.customer_exists(draft.customer_id).await?;

        let row = sqlx::query(
            r#"
            UPDATE invoices
            SET amount = $2,
                sent_at = $3,
                status = $4,
                customer_id = $5
            WHERE id = $1
            RETURNING id, amount, sent_at, status, chrono, customer_id
            "#,
        )
        .bind(id.as_uuid())
        .bind(draft.amount.as_decimal())
        .bind(draft.sent_at)
        .bind(draft.status.as_str())
        .bind(draft.customer_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_invoice", e))?
        .ok_or(StoreError::NotFound)?;

        invoice_from_row(&row)
    }

    async fn delete(&self, id: InvoiceId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_invoice", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(
        &self,
        filter: &InvoiceFilter,
        sort: Option<InvoiceSort>,
        page: Pagination,
    ) -> StoreResult<Vec<Invoice>> {
        let order = match sort {
            None => order_clause("chrono", SortDir::Asc),
            Some(InvoiceSort { field, dir }) => order_clause(field.column(), dir),
        };
        let sql = format!(
            r#"
            SELECT id, amount, sent_at, status, chrono, customer_id
            FROM invoices
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::bigint IS NULL OR chrono = $2)
              AND ($3::uuid IS NULL OR customer_id = $3)
            {order}
            LIMIT $4 OFFSET $5
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(filter.status.map(InvoiceStatus::as_str))
            .bind(filter.chrono)
            .bind(filter.customer_id.map(|c| *c.as_uuid()))
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_invoices", e))?;

        rows.iter().map(invoice_from_row).collect()
    }

    async fn list_for_customer(&self, customer_id: CustomerId) -> StoreResult<Vec<Invoice>> {
        self.customer_exists(customer_id).await?;
        self.invoices_of(customer_id).await
    }

    async fn increment_chrono(&self, id: InvoiceId) -> StoreResult<Invoice> {
        let row = sqlx::query(
            r#"
            UPDATE invoices
            SET chrono = chrono + 1
            WHERE id = $1
            RETURNING id, amount, sent_at, status, chrono, customer_id
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("increment_chrono", e))?
        .ok_or(StoreError::NotFound)?;

        let invoice = invoice_from_row(&row)?;
        tracing::debug!(invoice_id = %id, chrono = invoice.chrono(), "chronology incremented");
        Ok(invoice)
    }
}
