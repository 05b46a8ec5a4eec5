// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transaction recording, duplicate-hash rejection, status updates, and
//! filtered listings.

use axum::http::StatusCode;
use serde_json::json;

mod common;

const WALLET: &str = "0xstaker00000000000000000000000000000000bb";
const HASH: &str = "0xhash0000000000000000000000000000000000000000000000000000000001";

#[tokio::test]
async fn test_create_transaction() {
    let (app, _store) = common::create_test_app();
    common::create_user(&app, WALLET).await;

    let (status, body) = common::request(
        &app,
        "POST",
        "/api/transactions",
        Some(json!({
            "walletAddress": WALLET,
            "transactionType": "deposit",
            "transactionHash": HASH,
            "amount": 42.5,
            "tokenSymbol": "MATIC"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["transaction_type"], json!("deposit"));
    assert_eq!(body["status"], json!("pending"));
    assert_eq!(body["amount"], json!(42.5));
}

#[tokio::test]
async fn test_transaction_for_unknown_user_is_404() {
    let (app, _store) = common::create_test_app();

    let (status, _) = common::request(
        &app,
        "POST",
        "/api/transactions",
        Some(json!({
            "walletAddress": "0xghost",
            "transactionType": "deposit"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_hash_conflicts() {
    let (app, _store) = common::create_test_app();
    common::create_user(&app, WALLET).await;

    let payload = json!({
        "walletAddress": WALLET,
        "transactionType": "deposit",
        "transactionHash": HASH,
        "amount": 1.0
    });
    let (status, _) =
        common::request(&app, "POST", "/api/transactions", Some(payload.clone()), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) =
        common::request(&app, "POST", "/api/transactions", Some(payload), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("conflict"));
}

#[tokio::test]
async fn test_status_update_sets_completed_at() {
    let (app, _store) = common::create_test_app();
    common::create_user(&app, WALLET).await;

    common::request(
        &app,
        "POST",
        "/api/transactions",
        Some(json!({
            "walletAddress": WALLET,
            "transactionType": "withdraw",
            "transactionHash": HASH,
            "amount": 5.0
        })),
        None,
    )
    .await;

    let (status, body) = common::request(
        &app,
        "PUT",
        "/api/transactions",
        Some(json!({ "transactionHash": HASH, "status": "completed" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("completed"));
    assert!(body["completed_at"].is_string());

    // Unknown hash is a 404
    let (status, _) = common::request(
        &app,
        "PUT",
        "/api/transactions",
        Some(json!({ "transactionHash": "0xnope", "status": "completed" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_filtered_listing_with_pagination() {
    let (app, _store) = common::create_test_app();
    common::create_user(&app, WALLET).await;
    common::create_user(&app, "0xother").await;

    for (i, (wallet, tx_type)) in [
        (WALLET, "stake"),
        (WALLET, "deposit"),
        ("0xother", "stake"),
    ]
    .iter()
    .enumerate()
    {
        let (status, _) = common::request(
            &app,
            "POST",
            "/api/transactions",
            Some(json!({
                "walletAddress": wallet,
                "transactionType": tx_type,
                "transactionHash": format!("0xhash{}", i),
                "amount": 10.0
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = common::request(
        &app,
        "GET",
        &format!("/api/transactions?walletAddress={WALLET}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], json!(2));
    for tx in body["transactions"].as_array().unwrap() {
        assert_eq!(tx["wallet_address"], json!(WALLET));
    }

    let (status, body) = common::request(
        &app,
        "GET",
        "/api/transactions?type=stake",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], json!(2));
    for tx in body["transactions"].as_array().unwrap() {
        assert_eq!(tx["transaction_type"], json!("stake"));
    }
}

#[tokio::test]
async fn test_missing_required_fields_rejected() {
    let (app, _store) = common::create_test_app();
    common::create_user(&app, WALLET).await;

    let (status, _) = common::request(
        &app,
        "POST",
        "/api/transactions",
        Some(json!({ "walletAddress": WALLET, "transactionType": "" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::request(
        &app,
        "PUT",
        "/api/transactions",
        Some(json!({ "transactionHash": "", "status": "completed" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
