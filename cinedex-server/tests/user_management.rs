use anyhow::Result;
use axum::http::StatusCode;
use cinedex_core::api::routes::{utils as route_utils, v1};
use serde_json::{Value, json};

mod support;

use support::{
    PASSWORD, admin_token, bearer, build_test_app, register, token_for,
};

fn user_item(user: &Value) -> String {
    let id = user["id"].as_str().unwrap();
    route_utils::replace_param(v1::users::ITEM, "{id}", id)
}

#[tokio::test]
async fn admin_lists_and_filters_users() -> Result<()> {
    let app = build_test_app().await?;
    let admin = admin_token(&app.server).await;
    for name in ["bob", "carol", "dave"] {
        register(&app.server, name).await;
    }

    let all = app
        .server
        .get(v1::users::COLLECTION)
        .add_header("Authorization", bearer(&admin))
        .await;
    all.assert_status_ok();
    assert_eq!(all.json::<Value>()["total"], 4);

    let path = route_utils::with_query(
        v1::users::COLLECTION,
        "role=user&sort=-username&limit=2",
    );
    let body = app
        .server
        .get(&path)
        .add_header("Authorization", bearer(&admin))
        .await
        .json::<Value>();
    assert_eq!(body["total"], 3);
    assert_eq!(body["data"][0]["username"], "dave");
    assert_eq!(body["data"][1]["username"], "carol");
    assert_eq!(body["pagination"]["next"], json!({ "page": 2, "limit": 2 }));
    Ok(())
}

#[tokio::test]
async fn user_administration_rejects_plain_users() -> Result<()> {
    let app = build_test_app().await?;
    let admin = register(&app.server, "admin").await;
    let viewer = token_for(&app.server, "viewer").await;

    let list = app
        .server
        .get(v1::users::COLLECTION)
        .add_header("Authorization", bearer(&viewer))
        .await;
    list.assert_status(StatusCode::FORBIDDEN);

    let delete = app
        .server
        .delete(&user_item(&admin["user"]))
        .add_header("Authorization", bearer(&viewer))
        .await;
    delete.assert_status(StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn admin_cannot_delete_own_account() -> Result<()> {
    let app = build_test_app().await?;
    let admin = register(&app.server, "admin").await;
    let token = admin["access_token"].as_str().unwrap();

    let response = app
        .server
        .delete(&user_item(&admin["user"]))
        .add_header("Authorization", bearer(token))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn admin_cannot_demote_or_deactivate_self() -> Result<()> {
    let app = build_test_app().await?;
    let admin = register(&app.server, "admin").await;
    let token = admin["access_token"].as_str().unwrap();
    let item = user_item(&admin["user"]);

    for body in [json!({ "role": "user" }), json!({ "is_active": false })] {
        let response = app
            .server
            .patch(&item)
            .add_header("Authorization", bearer(token))
            .json(&body)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    let renamed = app
        .server
        .patch(&item)
        .add_header("Authorization", bearer(token))
        .json(&json!({ "display_name": "Chief", "role": "admin" }))
        .await;
    renamed.assert_status_ok();
    let user = &renamed.json::<Value>()["data"];
    assert_eq!(user["role"], "admin");
    assert_eq!(user["is_active"], true);
    Ok(())
}

#[tokio::test]
async fn deleting_a_user_revokes_their_token() -> Result<()> {
    let app = build_test_app().await?;
    let admin = admin_token(&app.server).await;
    let bob = register(&app.server, "bob").await;
    let bob_token = bob["access_token"].as_str().unwrap();
    let item = user_item(&bob["user"]);

    app.server
        .delete(&item)
        .add_header("Authorization", bearer(&admin))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .delete(&item)
        .add_header("Authorization", bearer(&admin))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let me = app
        .server
        .get(v1::auth::ME)
        .add_header("Authorization", bearer(bob_token))
        .await;
    me.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(me.json::<Value>()["error"]["message"], "User no longer exists");
    Ok(())
}

#[tokio::test]
async fn empty_admin_update_is_rejected() -> Result<()> {
    let app = build_test_app().await?;
    let admin = admin_token(&app.server).await;
    let bob = register(&app.server, "bob").await;

    app.server
        .patch(&user_item(&bob["user"]))
        .add_header("Authorization", bearer(&admin))
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn profile_update_changes_display_name_and_email() -> Result<()> {
    let app = build_test_app().await?;
    let token = token_for(&app.server, "alice").await;

    let response = app
        .server
        .patch(v1::users::CURRENT)
        .add_header("Authorization", bearer(&token))
        .json(&json!({
            "display_name": "Alice L.",
            "email": "Alice.L@Example.com",
        }))
        .await;
    response.assert_status_ok();
    let user = &response.json::<Value>()["data"];
    assert_eq!(user["display_name"], "Alice L.");
    assert_eq!(user["email"], "alice.l@example.com");
    Ok(())
}

#[tokio::test]
async fn profile_email_must_stay_unique() -> Result<()> {
    let app = build_test_app().await?;
    register(&app.server, "alice").await;
    let bob = token_for(&app.server, "bob").await;

    app.server
        .patch(v1::users::CURRENT)
        .add_header("Authorization", bearer(&bob))
        .json(&json!({ "email": "alice@example.com" }))
        .await
        .assert_status(StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn password_change_requires_the_current_password() -> Result<()> {
    let app = build_test_app().await?;
    let token = token_for(&app.server, "alice").await;
    let new_password = "a-brand-new-password";

    app.server
        .patch(v1::users::CURRENT)
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "new_password": new_password }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .patch(v1::users::CURRENT)
        .add_header("Authorization", bearer(&token))
        .json(&json!({
            "current_password": "wrong-password",
            "new_password": new_password,
        }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .patch(v1::users::CURRENT)
        .add_header("Authorization", bearer(&token))
        .json(&json!({
            "current_password": PASSWORD,
            "new_password": new_password,
        }))
        .await
        .assert_status_ok();

    app.server
        .post(v1::auth::LOGIN)
        .json(&json!({ "username": "alice", "password": PASSWORD }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .post(v1::auth::LOGIN)
        .json(&json!({ "username": "alice", "password": new_password }))
        .await
        .assert_status_ok();
    Ok(())
}
