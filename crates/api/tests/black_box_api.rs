use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::Value;

use stockroom_infra::Warehouse;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory stores, ephemeral port.
        let app = stockroom_api::app::build_app(Arc::new(Warehouse::in_memory()));
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

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn post_form(
    client: &reqwest::Client,
    server: &TestServer,
    path: &str,
    form: &[(&str, &str)],
) -> (StatusCode, Value) {
    let res = client.post(server.url(path)).form(form).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

async fn get_json(client: &reqwest::Client, server: &TestServer, path: &str) -> (StatusCode, Value) {
    let res = client.get(server.url(path)).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

fn report_rows(body: &Value) -> Vec<(String, String, i64)> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| {
            (
                row["product"].as_str().unwrap().to_string(),
                row["location"].as_str().unwrap().to_string(),
                row["qty"].as_i64().unwrap(),
            )
        })
        .collect()
}

async fn seed_catalog(client: &reqwest::Client, server: &TestServer) {
    let (status, _) = post_form(client, server, "/products", &[("product_id", "P1"), ("name", "Widget")]).await;
    assert_eq!(status, StatusCode::CREATED);
    for (id, name) in [("L1", "Aisle"), ("L2", "Bay")] {
        let (status, _) = post_form(client, server, "/locations", &[("location_id", id), ("name", name)]).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[tokio::test]
async fn health_is_ok() {
    let server = TestServer::spawn().await;
    let res = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn products_create_list_view_edit() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = post_form(
        &client,
        &server,
        "/products",
        &[("product_id", " P1 "), ("name", "Widget"), ("description", "")],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["product_id"], "P1");
    assert!(body["description"].is_null());

    let (status, body) = post_form(&client, &server, "/products", &[("product_id", "P1"), ("name", "Impostor")]).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_key");

    let (status, body) = post_form(&client, &server, "/products", &[("product_id", "P2"), ("name", "  ")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (status, body) = get_json(&client, &server, "/products").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Widget");

    let (status, body) = post_form(
        &client,
        &server,
        "/products/P1/edit",
        &[("name", "Gadget"), ("description", "blue")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Gadget");

    let (status, body) = get_json(&client, &server, "/products/P1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["description"], "blue");
    assert_eq!(body["movements"].as_array().unwrap().len(), 0);

    let (status, body) = get_json(&client, &server, "/products/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = post_form(&client, &server, "/products/nope/edit", &[("name", "Ghost")]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get_json(&client, &server, "/products/%20").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn taken_movement_id_is_a_conflict_even_without_locations() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    seed_catalog(&client, &server).await;

    let (status, _) = post_form(
        &client,
        &server,
        "/movements",
        &[("movement_id", "M1"), ("product_id", "P1"), ("to_location", "L1"), ("qty", "10")],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_form(
        &client,
        &server,
        "/movements",
        &[("movement_id", "M1"), ("product_id", "P1"), ("qty", "1")],
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_key");
}

#[tokio::test]
async fn movements_drive_the_balance_report() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    seed_catalog(&client, &server).await;

    let (status, body) = post_form(
        &client,
        &server,
        "/movements",
        &[("movement_id", "M1"), ("product_id", "P1"), ("to_location", "L1"), ("qty", "10")],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["from_location"].is_null());
    assert!(body["timestamp"].is_string());

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let (status, _) = post_form(
        &client,
        &server,
        "/movements",
        &[
            ("movement_id", "M2"),
            ("product_id", "P1"),
            ("from_location", "L1"),
            ("to_location", "L2"),
            ("qty", "4"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_form(
        &client,
        &server,
        "/movements",
        &[("movement_id", "M3"), ("product_id", "P1"), ("qty", "1")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (status, body) = post_form(
        &client,
        &server,
        "/movements",
        &[("movement_id", "M4"), ("product_id", "P1"), ("to_location", "L1"), ("qty", "ten")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (_, body) = get_json(&client, &server, "/report").await;
    assert_eq!(
        report_rows(&body),
        vec![
            ("Widget".to_string(), "Aisle".to_string(), 6),
            ("Widget".to_string(), "Bay".to_string(), 4),
        ]
    );

    let (_, body) = get_json(&client, &server, "/movements").await;
    let ids: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["movement_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["M2", "M1"]);

    let (_, body) = get_json(&client, &server, "/locations/L2").await;
    assert_eq!(body["location"]["name"], "Bay");
    assert_eq!(body["movements"].as_array().unwrap().len(), 1);

    let (_, body) = get_json(&client, &server, "/products/P1").await;
    assert_eq!(body["movements"][0]["movement_id"], "M2");

    let (_, body) = get_json(&client, &server, "/movements/options").await;
    assert_eq!(body["products"].as_array().unwrap().len(), 1);
    assert_eq!(body["locations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn movement_edit_moves_stock_and_rejects_invalid_edits() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    seed_catalog(&client, &server).await;

    let (status, created) = post_form(
        &client,
        &server,
        "/movements",
        &[("movement_id", "M1"), ("product_id", "P1"), ("to_location", "L1"), ("qty", "5")],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_form(
        &client,
        &server,
        "/movements/M1/edit",
        &[("product_id", "P1"), ("to_location", "L2"), ("qty", "5")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timestamp"], created["timestamp"]);

    let (_, body) = get_json(&client, &server, "/report").await;
    assert_eq!(report_rows(&body), vec![("Widget".to_string(), "Bay".to_string(), 5)]);

    let (status, _) = post_form(
        &client,
        &server,
        "/movements/M1/edit",
        &[("product_id", "P1"), ("from_location", ""), ("to_location", ""), ("qty", "5")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(&client, &server, "/movements/M1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["to_location"], "L2");

    let (status, _) = get_json(&client, &server, "/movements/M9").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
