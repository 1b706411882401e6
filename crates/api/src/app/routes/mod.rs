use axum::Router;

pub mod customers;
pub mod invoices;
pub mod system;

/// Router for all resource endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/customers", customers::router())
        .nest("/invoices", invoices::router())
}
