use reqwest::StatusCode;
use serde_json::json;

use ledgerly_api::app::{build_app, services::AppServices};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = build_app(AppServices::in_memory());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn customer_payload(last_name: &str) -> serde_json::Value {
    json!({
        "first_name": "Ada",
        "last_name": last_name,
        "email": "ada@example.com",
        "company": "Analytical Engines",
        "user_id": uuid::Uuid::now_v7().to_string(),
    })
}

async fn create_customer(client: &reqwest::Client, base_url: &str) -> String {
    let res = client
        .post(format!("{}/customers", base_url))
        .json(&customer_payload("Lovelace"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn create_invoice(
    client: &reqwest::Client,
    base_url: &str,
    customer_id: &str,
    amount: f64,
    status: &str,
) -> serde_json::Value {
    let res = client
        .post(format!("{}/invoices", base_url))
        .json(&json!({
            "amount": amount,
            "sent_at": "2026-02-14T09:30:00Z",
            "status": status,
            "customer_id": customer_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn customer_lifecycle_create_update_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Create
    let res = client
        .post(format!("{}/customers", srv.base_url))
        .json(&customer_payload("Lovelace"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["total_amount"], "0");
    assert_eq!(created["unpaid_amount"], "0");
    assert_eq!(created["invoices"].as_array().unwrap().len(), 0);

    // Update (full replacement)
    let res = client
        .put(format!("{}/customers/{}", srv.base_url, id))
        .json(&customer_payload("King-Noel"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["last_name"], "King-Noel");

    // Delete
    let res = client
        .delete(format!("{}/customers/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/customers/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejects_invalid_customer_payloads() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut short_name = customer_payload("Lovelace");
    short_name["first_name"] = json!("Al");
    let res = client
        .post(format!("{}/customers", srv.base_url))
        .json(&short_name)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let mut bad_email = customer_payload("Lovelace");
    bad_email["email"] = json!("not-an-email");
    let res = client
        .post(format!("{}/customers", srv.base_url))
        .json(&bad_email)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let mut bad_user = customer_payload("Lovelace");
    bad_user["user_id"] = json!("not-a-uuid");
    let res = client
        .post(format!("{}/customers", srv.base_url))
        .json(&bad_user)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn invoices_get_sequential_chronology_and_increment() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let customer_id = create_customer(&client, &srv.base_url).await;

    let first = create_invoice(&client, &srv.base_url, &customer_id, 250.0, "SENT").await;
    let second = create_invoice(&client, &srv.base_url, &customer_id, 300.0, "SENT").await;
    assert_eq!(first["chrono"], 1);
    assert_eq!(second["chrono"], 2);

    // Increment the first invoice; only chrono changes.
    let res = client
        .post(format!(
            "{}/invoices/{}/increment",
            srv.base_url,
            first["id"].as_str().unwrap()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bumped: serde_json::Value = res.json().await.unwrap();
    assert_eq!(bumped["chrono"], 2);
    assert_eq!(bumped["id"], first["id"]);
    assert_eq!(bumped["amount"], first["amount"]);
    assert_eq!(bumped["status"], first["status"]);
    assert_eq!(bumped["sent_at"], first["sent_at"]);
    assert_eq!(bumped["customer"], first["customer"]);

    // Unknown invoice id resolves to not-found.
    let res = client
        .post(format!(
            "{}/invoices/{}/increment",
            srv.base_url,
            uuid::Uuid::now_v7()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customer_response_carries_aggregates_and_nested_invoices() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let customer_id = create_customer(&client, &srv.base_url).await;

    create_invoice(&client, &srv.base_url, &customer_id, 100.0, "SENT").await;
    create_invoice(&client, &srv.base_url, &customer_id, 200.0, "PAID").await;
    create_invoice(&client, &srv.base_url, &customer_id, 300.0, "CANCELLED").await;

    let res = client
        .get(format!("{}/customers/{}", srv.base_url, customer_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let customer: serde_json::Value = res.json().await.unwrap();

    assert_eq!(customer["total_amount"], "600");
    assert_eq!(customer["unpaid_amount"], "100");

    let nested = customer["invoices"].as_array().unwrap();
    assert_eq!(nested.len(), 3);
    for invoice in nested {
        // Nested representations omit the back-reference (cyclic output).
        assert!(invoice.get("customer").is_none());
    }

    // Subresource: same invoices in insertion order, full representation.
    let res = client
        .get(format!("{}/customers/{}/invoices", srv.base_url, customer_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    let chronos: Vec<i64> = items.iter().map(|i| i["chrono"].as_i64().unwrap()).collect();
    assert_eq!(chronos, vec![1, 2, 3]);
    for invoice in items {
        assert_eq!(invoice["customer"].as_str().unwrap(), customer_id);
    }
}

#[tokio::test]
async fn invoice_listing_supports_filters_and_ordering() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let customer_id = create_customer(&client, &srv.base_url).await;

    create_invoice(&client, &srv.base_url, &customer_id, 100.0, "SENT").await;
    create_invoice(&client, &srv.base_url, &customer_id, 300.0, "PAID").await;
    create_invoice(&client, &srv.base_url, &customer_id, 200.0, "SENT").await;

    // Exact-match filter on status.
    let res = client
        .get(format!("{}/invoices?status=PAID", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["amount"], "300");

    // Ordering on a declared field.
    let res = client
        .get(format!(
            "{}/invoices?order_by=amount&order=desc",
            srv.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let amounts: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["amount"].as_str().unwrap())
        .collect();
    assert_eq!(amounts, vec!["300", "200", "100"]);

    // Undeclared sort fields are rejected.
    let res = client
        .get(format!("{}/invoices?order_by=password", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customer_listing_supports_exact_match_search() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create_customer(&client, &srv.base_url).await;
    let res = client
        .post(format!("{}/customers", srv.base_url))
        .json(&json!({
            "first_name": "Grace",
            "last_name": "Hopper",
            "email": "grace@example.com",
            "user_id": uuid::Uuid::now_v7().to_string(),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(format!(
            "{}/customers?email=grace@example.com",
            srv.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["first_name"], "Grace");
    assert_eq!(items[0]["company"], serde_json::Value::Null);
}

#[tokio::test]
async fn invoice_update_keeps_id_and_chronology() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let customer_id = create_customer(&client, &srv.base_url).await;

    let created = create_invoice(&client, &srv.base_url, &customer_id, 100.0, "SENT").await;
    let id = created["id"].as_str().unwrap();

    let res = client
        .put(format!("{}/invoices/{}", srv.base_url, id))
        .json(&json!({
            "amount": 450.25,
            "sent_at": "2026-03-01T12:00:00Z",
            "status": "PAID",
            "customer_id": customer_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();

    assert_eq!(updated["id"].as_str().unwrap(), id);
    assert_eq!(updated["chrono"], created["chrono"]);
    assert_eq!(updated["amount"], "450.25");
    assert_eq!(updated["status"], "PAID");
}

#[tokio::test]
async fn invoice_for_unknown_customer_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/invoices", srv.base_url))
        .json(&json!({
            "amount": 100.0,
            "sent_at": "2026-02-14T09:30:00Z",
            "status": "SENT",
            "customer_id": uuid::Uuid::now_v7().to_string(),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Unknown status strings are a validation failure, not a store error.
    let customer_id = create_customer(&client, &srv.base_url).await;
    let res = client
        .post(format!("{}/invoices", srv.base_url))
        .json(&json!({
            "amount": 100.0,
            "sent_at": "2026-02-14T09:30:00Z",
            "status": "VOID",
            "customer_id": customer_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_customer_removes_its_invoices() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let customer_id = create_customer(&client, &srv.base_url).await;
    let invoice = create_invoice(&client, &srv.base_url, &customer_id, 100.0, "SENT").await;

    let res = client
        .delete(format!("{}/customers/{}", srv.base_url, customer_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!(
            "{}/invoices/{}",
            srv.base_url,
            invoice["id"].as_str().unwrap()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
