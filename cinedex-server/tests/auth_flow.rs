use anyhow::Result;
use axum::http::StatusCode;
use cinedex_core::api::routes::{utils as route_utils, v1};
use serde_json::{Value, json};

mod support;

use support::{
    PASSWORD, admin_token, bearer, build_test_app, register, token_for,
};

#[tokio::test]
async fn first_registration_becomes_admin() -> Result<()> {
    let app = build_test_app().await?;

    let first = register(&app.server, "alice").await;
    assert_eq!(first["token_type"], "Bearer");
    assert_eq!(first["expires_in"], 600);
    assert_eq!(first["user"]["role"], "admin");
    assert!(first["user"].get("password").is_none());

    let second = register(&app.server, "bob").await;
    assert_eq!(second["user"]["role"], "user");
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_conflicts() -> Result<()> {
    let app = build_test_app().await?;
    register(&app.server, "alice").await;

    let response = app
        .server
        .post(v1::auth::REGISTER)
        .json(&json!({
            "username": "Alice",
            "email": "someone-else@example.com",
            "password": PASSWORD,
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["success"], false);
    Ok(())
}

#[tokio::test]
async fn invalid_registration_is_a_bad_request() -> Result<()> {
    let app = build_test_app().await?;

    let response = app
        .server
        .post(v1::auth::REGISTER)
        .json(&json!({
            "username": "a",
            "email": "not-an-email",
            "password": "short",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let malformed = app
        .server
        .post(v1::auth::REGISTER)
        .json(&json!({ "username": "alice" }))
        .await;
    malformed.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(malformed.json::<Value>()["error"]["status"], 400);
    Ok(())
}

#[tokio::test]
async fn login_accepts_username_or_email() -> Result<()> {
    let app = build_test_app().await?;
    register(&app.server, "alice").await;

    for identifier in ["alice", "ALICE@example.com"] {
        let response = app
            .server
            .post(v1::auth::LOGIN)
            .json(&json!({ "username": identifier, "password": PASSWORD }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["data"]["access_token"].as_str().is_some());
        assert!(body["data"]["user"]["last_login"].is_string());
    }
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() -> Result<()> {
    let app = build_test_app().await?;
    register(&app.server, "alice").await;

    let wrong_password = app
        .server
        .post(v1::auth::LOGIN)
        .json(&json!({ "username": "alice", "password": "not-the-password" }))
        .await;
    wrong_password.assert_status(StatusCode::UNAUTHORIZED);

    let unknown_user = app
        .server
        .post(v1::auth::LOGIN)
        .json(&json!({ "username": "mallory", "password": PASSWORD }))
        .await;
    unknown_user.assert_status(StatusCode::UNAUTHORIZED);

    assert_eq!(
        wrong_password.json::<Value>()["error"]["message"],
        unknown_user.json::<Value>()["error"]["message"]
    );
    Ok(())
}

#[tokio::test]
async fn me_requires_a_valid_token() -> Result<()> {
    let app = build_test_app().await?;
    let token = token_for(&app.server, "alice").await;

    let me = app
        .server
        .get(v1::auth::ME)
        .add_header("Authorization", bearer(&token))
        .await;
    me.assert_status_ok();
    assert_eq!(me.json::<Value>()["data"]["username"], "alice");

    app.server
        .get(v1::auth::ME)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .get(v1::auth::ME)
        .add_header("Authorization", "Bearer not.a.token")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .get(v1::auth::ME)
        .add_header("Authorization", format!("Basic {token}"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn deactivated_accounts_lose_access() -> Result<()> {
    let app = build_test_app().await?;
    let admin = admin_token(&app.server).await;
    let bob = register(&app.server, "bob").await;
    let bob_token = bob["access_token"].as_str().unwrap().to_string();
    let bob_item = route_utils::replace_param(
        v1::users::ITEM,
        "{id}",
        bob["user"]["id"].as_str().unwrap(),
    );

    app.server
        .patch(&bob_item)
        .add_header("Authorization", bearer(&admin))
        .json(&json!({ "is_active": false }))
        .await
        .assert_status_ok();

    let me = app
        .server
        .get(v1::auth::ME)
        .add_header("Authorization", bearer(&bob_token))
        .await;
    me.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        me.json::<Value>()["error"]["message"],
        "Account is deactivated"
    );

    let login = app
        .server
        .post(v1::auth::LOGIN)
        .json(&json!({ "username": "bob", "password": PASSWORD }))
        .await;
    login.assert_status(StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn role_change_invalidates_earlier_tokens() -> Result<()> {
    let app = build_test_app().await?;
    let admin = admin_token(&app.server).await;
    let bob = register(&app.server, "bob").await;
    let bob_token = bob["access_token"].as_str().unwrap().to_string();
    let bob_item = route_utils::replace_param(
        v1::users::ITEM,
        "{id}",
        bob["user"]["id"].as_str().unwrap(),
    );

    app.server
        .patch(&bob_item)
        .add_header("Authorization", bearer(&admin))
        .json(&json!({ "role": "admin" }))
        .await
        .assert_status_ok();

    app.server
        .get(v1::users::COLLECTION)
        .add_header("Authorization", bearer(&bob_token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let fresh = app
        .server
        .post(v1::auth::LOGIN)
        .json(&json!({ "username": "bob", "password": PASSWORD }))
        .await
        .json::<Value>();
    let fresh_token = fresh["data"]["access_token"].as_str().unwrap();
    app.server
        .get(v1::users::COLLECTION)
        .add_header("Authorization", bearer(fresh_token))
        .await
        .assert_status_ok();
    Ok(())
}
