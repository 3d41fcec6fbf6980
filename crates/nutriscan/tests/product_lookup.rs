use nutriscan::config::ProductApiConfig;
use nutriscan::product::OpenFoodFactsClient;
use serde_json::json;
use std::time::Duration;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenFoodFactsClient {
    OpenFoodFactsClient::new(&ProductApiConfig {
        base_url: format!("{}/", server.uri()),
        timeout: Duration::from_secs(2),
    })
    .expect("client builds")
}

#[tokio::test]
async fn found_product_is_returned() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/api/v0/product/3017620422003.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 1,
            "code": "3017620422003",
            "product": {
                "product_name": "Nutella",
                "brands": "Ferrero",
                "image_front_small_url": "https://images.example/small.jpg",
                "nutriments": { "sugars_100g": 56.3, "fat_100g": 30.9 }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let product = client_for(&server)
        .fetch_product("3017620422003")
        .await
        .expect("product found");

    assert_eq!(product.product_name.as_deref(), Some("Nutella"));
    assert_eq!(product.brands.as_deref(), Some("Ferrero"));
    assert_eq!(product.display_image(), Some("https://images.example/small.jpg"));
    assert_eq!(product.nutriments.get("sugars_100g"), Some(&json!(56.3)));
}

#[tokio::test]
async fn status_zero_means_not_found() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 0,
            "status_verbose": "product not found"
        })))
        .mount(&server)
        .await;

    assert!(client_for(&server).fetch_product("0000000000").await.is_none());
}

#[tokio::test]
async fn upstream_error_status_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(client_for(&server).fetch_product("12345678").await.is_none());
}

#[tokio::test]
async fn malformed_body_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    assert!(client_for(&server).fetch_product("12345678").await.is_none());
}

#[tokio::test]
async fn status_one_without_product_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 1 })))
        .mount(&server)
        .await;

    assert!(client_for(&server).fetch_product("12345678").await.is_none());
}

#[tokio::test]
async fn short_barcode_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);

    assert!(client.fetch_product("1234").await.is_none());
    assert!(client.fetch_product("12 34 5").await.is_none());
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": 1, "product": {} }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    let client = OpenFoodFactsClient::new(&ProductApiConfig {
        base_url: server.uri(),
        timeout: Duration::from_millis(50),
    })
    .expect("client builds");

    assert!(client.fetch_product("12345678").await.is_none());
}
