//! Integration tests for the cart recovery endpoint.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront running against that database
//!
//! Tests seed abandoned-cart rows directly through sqlx, then exercise the
//! HTTP surface.
//!
//! Run with: cargo test -p nordic-aroma-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

use nordic_aroma_core::AbandonedCartStatus;
use nordic_aroma_integration_tests::{storefront_base_url, test_pool};

fn recover_url() -> String {
    format!("{}/api/cart/recover", storefront_base_url())
}

/// Seed an abandoned cart and return its recovery token.
async fn seed_abandoned_cart(pool: &PgPool, status: AbandonedCartStatus) -> String {
    let token = format!("it-{}", Uuid::new_v4().simple());
    let cart_id = format!("cart-{}", Uuid::new_v4().simple());

    sqlx::query(
        "INSERT INTO abandoned_carts \
             (cart_id, email, items, subtotal, total, currency, recovery_token, \
              abandoned_at, status) \
         VALUES ($1, 'integration@example.se', $2, 1049.48, 1049.48, 'SEK', $3, \
                 NOW() - INTERVAL '2 hours', $4)",
    )
    .bind(&cart_id)
    .bind(json!([
        {"product_id": 1, "quantity": 2, "price": "299.99"},
        {"product_id": 2, "quantity": 1, "price": "449.50"}
    ]))
    .bind(&token)
    .bind(status.to_string())
    .execute(pool)
    .await
    .expect("Failed to seed abandoned cart");

    token
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_recover_get_returns_cart_snapshot() {
    let pool = test_pool().await;
    let token = seed_abandoned_cart(&pool, AbandonedCartStatus::Abandoned).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(recover_url())
        .query(&[("token", token.as_str())])
        .send()
        .await
        .expect("Failed to call recover");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "integration@example.se");
    assert_eq!(body["total"], "1049.48");
    assert_eq!(body["items"].as_array().expect("items").len(), 2);

    // Resolve does not consume the token: a second read still succeeds
    let resp = client
        .get(recover_url())
        .query(&[("token", token.as_str())])
        .send()
        .await
        .expect("Failed to call recover");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_recover_post_matches_get() {
    let pool = test_pool().await;
    let token = seed_abandoned_cart(&pool, AbandonedCartStatus::Reminded).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(recover_url())
        .json(&json!({"token": token}))
        .send()
        .await
        .expect("Failed to call recover");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], "1049.48");
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_recover_unknown_token_is_404() {
    let client = reqwest::Client::new();

    let resp = client
        .get(recover_url())
        .query(&[("token", "never-existed")])
        .send()
        .await
        .expect("Failed to call recover");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_recover_consumed_token_is_404_with_same_body() {
    let pool = test_pool().await;
    let token = seed_abandoned_cart(&pool, AbandonedCartStatus::Recovered).await;
    let client = reqwest::Client::new();

    let consumed = client
        .get(recover_url())
        .query(&[("token", token.as_str())])
        .send()
        .await
        .expect("Failed to call recover");
    assert_eq!(consumed.status(), StatusCode::NOT_FOUND);
    let consumed_body = consumed.text().await.expect("body");

    let unknown = client
        .get(recover_url())
        .query(&[("token", "never-existed")])
        .send()
        .await
        .expect("Failed to call recover");
    let unknown_body = unknown.text().await.expect("body");

    // Nothing distinguishes "already recovered" from "never existed"
    assert_eq!(consumed_body, unknown_body);
}
