//! End-to-end flow over the stock user resource: CRUD, login, role gates.

use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};

use minirest::auth::{AuthContext, JwtCodec};
use minirest::dispatcher::RequestDispatcher;
use minirest::handlers::mount_user_routes;
use minirest::store::MemoryStore;

const SECRET: &str = "user-api-test-secret";

fn setup() -> (RequestDispatcher, JwtCodec) {
    let codec = JwtCodec::new(SECRET, 1);
    let mut dispatcher = RequestDispatcher::new();
    mount_user_routes(&mut dispatcher, Arc::new(MemoryStore::new()), codec.clone());
    (dispatcher, codec)
}

async fn create_user(dispatcher: &RequestDispatcher, record: Value) -> Result<Value> {
    let created = dispatcher
        .dispatch("POST", "/user", &record.to_string(), &AuthContext::anonymous())
        .await
        .map_err(|e| anyhow::anyhow!("create failed: {e}"))?;
    Ok(serde_json::from_str(&created)?)
}

async fn login(dispatcher: &RequestDispatcher, name: &str, password: &str) -> Result<String> {
    dispatcher
        .dispatch(
            "PUT",
            "/user/login",
            &json!({"name": name, "password": password}).to_string(),
            &AuthContext::anonymous(),
        )
        .await
        .map_err(|e| anyhow::anyhow!("login failed: {e}"))
}

#[tokio::test]
async fn register_login_and_read_back() -> Result<()> {
    let (dispatcher, codec) = setup();

    let created = create_user(
        &dispatcher,
        json!({"name": "ada", "password": "pw", "email": "ada@example.com"}),
    )
    .await?;
    let id = created["id"].as_str().expect("created user has an id");
    assert!(created.get("password").is_none());

    let token = login(&dispatcher, "ada", "pw").await?;
    let credentials = codec.decode(&token)?;
    assert_eq!(credentials.subject, id);

    let fetched = dispatcher
        .dispatch("GET", &format!("/user/{id}"), "", &AuthContext::anonymous())
        .await
        .unwrap();
    let fetched: Value = serde_json::from_str(&fetched)?;
    assert_eq!(fetched["name"], "ada");
    assert!(fetched.get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn listing_hides_passwords_for_every_user() -> Result<()> {
    let (dispatcher, _) = setup();
    create_user(&dispatcher, json!({"name": "ada", "password": "one"})).await?;
    create_user(&dispatcher, json!({"name": "grace", "password": "two"})).await?;

    let listed = dispatcher
        .dispatch("GET", "/user", "", &AuthContext::anonymous())
        .await
        .unwrap();
    let listed: Value = serde_json::from_str(&listed)?;
    let rows = listed.as_array().expect("list returns an array");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.get("password").is_none()));
    Ok(())
}

#[tokio::test]
async fn update_requires_authentication() -> Result<()> {
    let (dispatcher, codec) = setup();
    let created = create_user(&dispatcher, json!({"name": "ada", "password": "pw"})).await?;
    let id = created["id"].as_str().unwrap();

    let body = json!({"id": id, "name": "ada lovelace", "password": "pw"}).to_string();

    let err = dispatcher
        .dispatch("PUT", "/user", &body, &AuthContext::anonymous())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    let token = login(&dispatcher, "ada", "pw").await?;
    let ctx = AuthContext::authenticated(codec.decode(&token)?);
    let updated = dispatcher.dispatch("PUT", "/user", &body, &ctx).await.unwrap();
    let updated: Value = serde_json::from_str(&updated)?;
    assert_eq!(updated["name"], "ada lovelace");
    Ok(())
}

#[tokio::test]
async fn password_survives_an_authenticated_update() -> Result<()> {
    let (dispatcher, codec) = setup();
    let created = create_user(&dispatcher, json!({"name": "ada", "password": "pw"})).await?;
    let id = created["id"].as_str().unwrap();

    let token = login(&dispatcher, "ada", "pw").await?;
    let ctx = AuthContext::authenticated(codec.decode(&token)?);
    dispatcher
        .dispatch(
            "PUT",
            "/user",
            &json!({"id": id, "name": "ada", "password": "rotated"}).to_string(),
            &ctx,
        )
        .await
        .unwrap();

    // the old password no longer logs in, the new one does
    assert!(login(&dispatcher, "ada", "pw").await.is_err());
    login(&dispatcher, "ada", "rotated").await?;
    Ok(())
}

#[tokio::test]
async fn deletion_is_admin_only() -> Result<()> {
    let (dispatcher, codec) = setup();
    create_user(&dispatcher, json!({"name": "ada", "password": "pw", "role": "user"})).await?;
    let victim = create_user(&dispatcher, json!({"name": "bob", "password": "pw"})).await?;
    let victim_id = victim["id"].as_str().unwrap();
    create_user(
        &dispatcher,
        json!({"name": "root", "password": "pw", "role": "admin"}),
    )
    .await?;

    let user_token = login(&dispatcher, "ada", "pw").await?;
    let user_ctx = AuthContext::authenticated(codec.decode(&user_token)?);
    let err = dispatcher
        .dispatch("DELETE", &format!("/user/{victim_id}"), "", &user_ctx)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
    assert!(err.message().contains("RoleAtLeast(Admin)"));

    let admin_token = login(&dispatcher, "root", "pw").await?;
    let admin_ctx = AuthContext::authenticated(codec.decode(&admin_token)?);
    dispatcher
        .dispatch("DELETE", &format!("/user/{victim_id}"), "", &admin_ctx)
        .await
        .unwrap();

    let err = dispatcher
        .dispatch("GET", &format!("/user/{victim_id}"), "", &AuthContext::anonymous())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
    Ok(())
}

#[tokio::test]
async fn login_ambiguity_is_refused() -> Result<()> {
    // two users sharing a name and password cannot log in
    let (dispatcher, _) = setup();
    create_user(&dispatcher, json!({"name": "twin", "password": "pw"})).await?;
    create_user(&dispatcher, json!({"name": "twin", "password": "pw"})).await?;

    let err = login(&dispatcher, "twin", "pw").await.unwrap_err();
    assert!(err.to_string().contains("login failed"));
    Ok(())
}
