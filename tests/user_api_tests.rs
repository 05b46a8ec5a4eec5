// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User CRUD: creation defaults, conflicts, partial updates, deletion.

use axum::http::StatusCode;
use serde_json::json;

mod common;

const WALLET: &str = "0x1a2b3c4d5e6f00000000000000000000000000aa";

#[tokio::test]
async fn test_create_user_applies_defaults() {
    let (app, _store) = common::create_test_app();

    let user = common::create_user(&app, WALLET).await;
    // Default username is PREDIK_ + wallet chars 2..6
    assert_eq!(user["username"], json!("PREDIK_1a2b"));
    assert_eq!(user["xp"], json!(0));
    assert_eq!(user["level"], json!(1));
    assert_eq!(user["preferred_assets"], json!(["MATIC", "ETH", "BTC"]));
    assert_eq!(user["trading_type"], json!("Spot"));
    assert_eq!(user["email_verified"], json!(false));
}

#[tokio::test]
async fn test_create_user_with_explicit_username() {
    let (app, _store) = common::create_test_app();

    let (status, user) = common::request(
        &app,
        "POST",
        "/api/users",
        Some(json!({ "walletAddress": WALLET, "username": "trader_joe" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["username"], json!("trader_joe"));
}

#[tokio::test]
async fn test_duplicate_wallet_conflicts() {
    let (app, _store) = common::create_test_app();
    common::create_user(&app, WALLET).await;

    let (status, body) = common::request(
        &app,
        "POST",
        "/api/users",
        Some(json!({ "walletAddress": WALLET })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("conflict"));
}

#[tokio::test]
async fn test_get_unknown_user_is_404() {
    let (app, _store) = common::create_test_app();
    let (status, _) = common::request(&app, "GET", "/api/users/0xmissing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_updates_only_provided_fields() {
    let (app, _store) = common::create_test_app();
    common::create_user(&app, WALLET).await;

    let (status, user) = common::request(
        &app,
        "PATCH",
        &format!("/api/users/{WALLET}"),
        Some(json!({ "bio": "Long-time staker", "tradingType": "Futures" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["bio"], json!("Long-time staker"));
    assert_eq!(user["trading_type"], json!("Futures"));
    // Untouched fields survive
    assert_eq!(user["username"], json!("PREDIK_1a2b"));
    assert_eq!(user["xp"], json!(0));
}

#[tokio::test]
async fn test_patch_cannot_change_xp_or_level() {
    let (app, _store) = common::create_test_app();
    common::create_user(&app, WALLET).await;

    // xp/level are not part of the update type; unknown fields are ignored
    let (status, user) = common::request(
        &app,
        "PATCH",
        &format!("/api/users/{WALLET}"),
        Some(json!({ "xp": 99999, "level": 42, "bio": "hi" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["xp"], json!(0));
    assert_eq!(user["level"], json!(1));
    assert_eq!(user["bio"], json!("hi"));
}

#[tokio::test]
async fn test_empty_patch_echoes_current_profile() {
    let (app, _store) = common::create_test_app();
    common::create_user(&app, WALLET).await;

    let (status, user) = common::request(
        &app,
        "PATCH",
        &format!("/api/users/{WALLET}"),
        Some(json!({})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], json!("PREDIK_1a2b"));
}

#[tokio::test]
async fn test_put_requires_username() {
    let (app, _store) = common::create_test_app();
    common::create_user(&app, WALLET).await;

    let (status, _) = common::request(
        &app,
        "PUT",
        &format!("/api/users/{WALLET}"),
        Some(json!({ "bio": "no name" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, user) = common::request(
        &app,
        "PUT",
        &format!("/api/users/{WALLET}"),
        Some(json!({ "username": "renamed", "bio": "with name" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], json!("renamed"));
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let (app, _store) = common::create_test_app();
    common::create_user(&app, WALLET).await;

    let (status, _) =
        common::request(&app, "DELETE", &format!("/api/users/{WALLET}"), None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = common::request(
        &app,
        "DELETE",
        &format!("/api/users/{WALLET}?confirmed=true"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (status, _) = common::request(&app, "GET", &format!("/api/users/{WALLET}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_purges_dependent_data() {
    let (app, _store) = common::create_test_app();
    common::create_user(&app, WALLET).await;
    let task = common::create_task(
        &app,
        json!({
            "title": "t",
            "description": "d",
            "xp": 50,
            "difficulty": "Easy",
            "taskType": "profile"
        }),
    )
    .await;
    common::complete_task(&app, WALLET, task).await;

    common::request(
        &app,
        "DELETE",
        &format!("/api/users/{WALLET}?confirmed=true"),
        None,
        None,
    )
    .await;

    // Completion statistics no longer reference the user
    let (status, stats) = common::request(&app, "GET", "/api/tasks/complete", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["taskStats"][0]["completion_count"], json!(0));
    assert!(stats["recentCompletions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_users_ordered_by_xp() {
    let (app, _store) = common::create_test_app();
    common::create_user(&app, "0xlow").await;
    common::create_user(&app, "0xhigh").await;
    let task = common::create_task(
        &app,
        json!({
            "title": "t",
            "description": "d",
            "xp": 100,
            "difficulty": "Easy",
            "taskType": "profile"
        }),
    )
    .await;
    common::complete_task(&app, "0xhigh", task).await;

    let (status, body) = common::request(&app, "GET", "/api/users", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users[0]["wallet_address"], json!("0xhigh"));
    assert_eq!(users[1]["wallet_address"], json!("0xlow"));
}

#[tokio::test]
async fn test_user_search_requires_three_chars() {
    let (app, _store) = common::create_test_app();
    common::create_user(&app, WALLET).await;

    let (status, _) = common::request(&app, "GET", "/api/users/search?q=ab", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        common::request(&app, "GET", "/api/users/search?q=PREDIK", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}
