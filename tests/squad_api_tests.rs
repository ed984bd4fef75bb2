// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Squad API integration tests.
//!
//! Drives the roster endpoints end to end: adds, tier-gated denials,
//! filtering, and self-location reports, asserting on the returned view
//! models rather than internal state.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tagyou_tracker::services::registry::PremiumRegistry;
use tower::ServiceExt;

mod common;

const USER_ID: &str = "u1";
const EMAIL: &str = "alex@example.com";

async fn send(
    app: &Router,
    token: &str,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json");

    let request = match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn member_body(name: &str) -> Value {
    json!({
        "name": name,
        "phone": "+447700900124",
        "relationship": "Friend"
    })
}

#[tokio::test]
async fn test_basic_tier_add_then_capacity_denied() {
    let (app, state, _) = common::create_test_app();
    let token = common::create_test_jwt(USER_ID, EMAIL, &state.config.jwt_signing_key);

    let (status, body) = send(
        &app,
        &token,
        "POST",
        "/api/squad/members",
        Some(member_body("Sarah Williams")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "added");

    // Second add hits the free limit of 1: upgrade prompt, not an error
    let (status, body) = send(
        &app,
        &token,
        "POST",
        "/api/squad/members",
        Some(member_body("Mike Davis")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "upgrade_required");
    assert_eq!(body["free_limit"], 1);

    let (_, squad) = send(&app, &token, "GET", "/api/squad", None).await;
    assert_eq!(squad["member_count"], 1);
}

#[tokio::test]
async fn test_invalid_draft_is_a_noop() {
    let (app, state, _) = common::create_test_app();
    let token = common::create_test_jwt(USER_ID, EMAIL, &state.config.jwt_signing_key);

    let (status, body) = send(
        &app,
        &token,
        "POST",
        "/api/squad/members",
        Some(json!({ "name": "", "phone": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "invalid");
    let missing: Vec<String> = body["missing"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(missing, vec!["name", "phone", "relationship"]);

    let (_, squad) = send(&app, &token, "GET", "/api/squad", None).await;
    assert_eq!(squad["member_count"], 0);
}

#[tokio::test]
async fn test_premium_user_adds_beyond_free_limit() {
    let (app, state, registry) = common::create_test_app();
    let token = common::create_test_jwt(USER_ID, EMAIL, &state.config.jwt_signing_key);

    registry
        .add_premium_user(EMAIL, json!({}))
        .await
        .expect("mock add");

    for name in ["Sarah Williams", "Mike Davis", "Emma Wilson"] {
        let (status, body) = send(
            &app,
            &token,
            "POST",
            "/api/squad/members",
            Some(member_body(name)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "added", "add failed for {}", name);
    }

    // Premium tier was cached after the first resolution
    assert_eq!(registry.lookup_calls(), 1);

    let (_, squad) = send(&app, &token, "GET", "/api/squad", None).await;
    assert_eq!(squad["member_count"], 3);
    assert_eq!(squad["tier"]["tier"], "Premium");
    assert_eq!(squad["can_add_more"], true);
}

#[tokio::test]
async fn test_search_filters_by_area_case_insensitive() {
    let (app, state, _) = common::create_test_app();
    let token = common::create_test_jwt(USER_ID, EMAIL, &state.config.jwt_signing_key);

    let (_, added) = send(
        &app,
        &token,
        "POST",
        "/api/squad/members",
        Some(member_body("Sarah Williams")),
    )
    .await;
    let member_id = added["member_id"].as_u64().unwrap();

    // Simulated grant assigns the first gazetteer area
    let (status, _) = send(
        &app,
        &token,
        "POST",
        &format!("/api/squad/members/{}/request-location", member_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, squad) = send(&app, &token, "GET", "/api/squad?search=LADBROKE", None).await;
    assert_eq!(squad["members"].as_array().unwrap().len(), 1);
    assert_eq!(squad["members"][0]["area"], "Ladbroke Grove Station");

    let (_, squad) = send(&app, &token, "GET", "/api/squad?search=nowhere", None).await;
    assert!(squad["members"].as_array().unwrap().is_empty());
    // Filtering never mutates the roster
    assert_eq!(squad["member_count"], 1);
}

#[tokio::test]
async fn test_request_location_unknown_member_is_404() {
    let (app, state, _) = common::create_test_app();
    let token = common::create_test_jwt(USER_ID, EMAIL, &state.config.jwt_signing_key);

    let (status, body) = send(
        &app,
        &token,
        "POST",
        "/api/squad/members/9999/request-location",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_self_location_report_and_removal() {
    let (app, state, _) = common::create_test_app();
    let token = common::create_test_jwt(USER_ID, EMAIL, &state.config.jwt_signing_key);

    let (status, body) = send(
        &app,
        &token,
        "PUT",
        "/api/location",
        Some(json!({ "latitude": 51.5172, "longitude": -0.2107, "accuracy": 15.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["area"], "Ladbroke Grove Station");
    assert_eq!(body["sharing"], true);

    // The self entry appears in the squad with the You relationship
    let (_, squad) = send(&app, &token, "GET", "/api/squad", None).await;
    assert_eq!(squad["member_count"], 1);
    assert_eq!(squad["sharing_count"], 1);
    assert_eq!(squad["members"][0]["relationship"], "You");
    assert_eq!(squad["members"][0]["freshness"], "live");

    // Preference is remembered for the next session
    let (_, me) = send(&app, &token, "GET", "/api/me", None).await;
    assert_eq!(me["remembered_sharing"], true);

    // Stop sharing: the row remains, location is gone
    let (status, body) = send(&app, &token, "DELETE", "/api/location", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sharing"], false);

    let (_, squad) = send(&app, &token, "GET", "/api/squad", None).await;
    assert_eq!(squad["member_count"], 1);
    assert_eq!(squad["sharing_count"], 0);
    assert_eq!(squad["members"][0]["freshness"], "offline");
    assert!(squad["members"][0]["area"].is_null());
}

#[tokio::test]
async fn test_out_of_range_position_is_rejected() {
    let (app, state, _) = common::create_test_app();
    let token = common::create_test_jwt(USER_ID, EMAIL, &state.config.jwt_signing_key);

    let (status, body) = send(
        &app,
        &token,
        "PUT",
        "/api/location",
        Some(json!({ "latitude": 123.0, "longitude": -0.2107 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_visibility_toggle_keeps_roster() {
    let (app, state, _) = common::create_test_app();
    let token = common::create_test_jwt(USER_ID, EMAIL, &state.config.jwt_signing_key);

    send(
        &app,
        &token,
        "POST",
        "/api/squad/members",
        Some(member_body("Sarah Williams")),
    )
    .await;

    let (_, shown) = send(
        &app,
        &token,
        "PUT",
        "/api/squad/visibility",
        Some(json!({ "visible": true })),
    )
    .await;
    assert_eq!(shown["visible"], true);

    let (_, hidden) = send(
        &app,
        &token,
        "PUT",
        "/api/squad/visibility",
        Some(json!({ "visible": false })),
    )
    .await;
    assert_eq!(hidden["visible"], false);
    assert_eq!(hidden["member_count"], 1);
}

#[tokio::test]
async fn test_contact_links_gated_by_tier() {
    let (app, state, registry) = common::create_test_app();
    let token = common::create_test_jwt(USER_ID, EMAIL, &state.config.jwt_signing_key);

    send(
        &app,
        &token,
        "POST",
        "/api/squad/members",
        Some(member_body("Sarah Williams")),
    )
    .await;

    let (_, squad) = send(&app, &token, "GET", "/api/squad", None).await;
    assert!(squad["members"][0]["whatsapp_url"].is_null());
    assert!(squad["members"][0]["tel_url"].is_null());

    // Flip to premium through the tier override used by the webhook
    registry
        .add_premium_user(EMAIL, json!({}))
        .await
        .expect("mock add");
    state
        .tier_service
        .set_tier(EMAIL, tagyou_tracker::models::Tier::Premium);

    let (_, squad) = send(&app, &token, "GET", "/api/squad", None).await;
    let member = &squad["members"][0];
    assert!(member["whatsapp_url"]
        .as_str()
        .unwrap()
        .starts_with("https://wa.me/"));
    assert!(member["tel_url"].as_str().unwrap().starts_with("tel:"));
}

#[tokio::test]
async fn test_invite_creation() {
    let (app, state, _) = common::create_test_app();
    let token = common::create_test_jwt(USER_ID, EMAIL, &state.config.jwt_signing_key);

    let (status, invite) = send(&app, &token, "POST", "/api/invites", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(invite["url"].as_str().unwrap().contains("/invite?code="));
    assert!(invite["whatsapp_url"]
        .as_str()
        .unwrap()
        .starts_with("https://wa.me/?text="));

    // The minted code verifies against the same signing key
    let claims = state
        .invites
        .verify_code(invite["code"].as_str().unwrap())
        .expect("invite should verify");
    assert_eq!(claims.inviter_email, EMAIL);
}
