//! The stock `user` namespace: default CRUD scaffolding plus login.
//!
//! Create and update shadow the stock handlers so passwords are digested
//! before they reach the store; registering the same route shape replaces
//! the stock route in place.

use std::sync::Arc;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::auth::{Credentials, Guard, JwtCodec, Role};
use crate::dispatcher::RequestDispatcher;
use crate::error::ApiError;
use crate::resource::{require_object, strip_hidden, to_body, Resource, RouteGuards};
use crate::routing::{handler_fn, Verb};
use crate::store::{DataStore, Filter};

/// Mounts the user resource under the `user` namespace.
///
/// Reads and registration are public; updates require authentication and
/// deletion requires an admin credential.
pub fn mount_user_routes(
    dispatcher: &mut RequestDispatcher,
    store: Arc<dyn DataStore>,
    codec: JwtCodec,
) {
    let resource = Resource::new("user", store.clone()).hide("password");
    let router = dispatcher.namespace_mut("user");
    resource.mount(
        router,
        RouteGuards {
            update: vec![Guard::Authenticated],
            delete: vec![Guard::RoleAtLeast(Role::Admin)],
            ..RouteGuards::default()
        },
    );

    let create_store = store.clone();
    router.register(
        Verb::Post,
        "",
        handler_fn(move |_params, body| {
            let store = create_store.clone();
            async move { create(store, body).await }
        }),
        Vec::new(),
    );

    let update_store = store.clone();
    router.register(
        Verb::Put,
        "",
        handler_fn(move |_params, body| {
            let store = update_store.clone();
            async move { update(store, body).await }
        }),
        vec![Guard::Authenticated],
    );

    router.register(
        Verb::Put,
        "login",
        handler_fn(move |_params, body| {
            let store = store.clone();
            let codec = codec.clone();
            async move { login(store, codec, body).await }
        }),
        Vec::new(),
    );
}

async fn create(store: Arc<dyn DataStore>, body: Value) -> Result<String, ApiError> {
    let mut record = require_object(body)?;
    digest_password_field(&mut record);
    let created = store.insert(record).await?;
    to_body(&sanitize(created))
}

async fn update(store: Arc<dyn DataStore>, body: Value) -> Result<String, ApiError> {
    let mut record = require_object(body)?;
    digest_password_field(&mut record);
    let updated = store.update(record).await?;
    to_body(&sanitize(updated))
}

/// `PUT user/login` with `{name, password}`: exactly one stored user may
/// carry that name and password digest, and that user gets a token.
async fn login(store: Arc<dyn DataStore>, codec: JwtCodec, body: Value) -> Result<String, ApiError> {
    let name = require_string_field(&body, "name")?;
    let password = require_string_field(&body, "password")?;

    let filter = Filter::new()
        .eq("name", name)
        .eq("password", digest_password(password));
    let matched = store.query(&filter).await?;
    if matched.len() != 1 {
        tracing::warn!(name, matches = matched.len(), "login rejected");
        return Err(ApiError::unauthorized("invalid name or password"));
    }

    let user = &matched[0];
    let subject = user
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::internal_server_error("stored user record has no id"))?;
    let role = user
        .get("role")
        .and_then(|role| serde_json::from_value::<Role>(role.clone()).ok())
        .unwrap_or(Role::User);

    let token = codec.encode(&Credentials {
        subject: subject.to_string(),
        role,
    })?;
    Ok(token)
}

/// Hex SHA-256 digest stored in place of the raw password.
pub fn digest_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn digest_password_field(record: &mut Value) {
    if let Some(map) = record.as_object_mut() {
        if let Some(raw) = map.get("password").and_then(Value::as_str).map(str::to_owned) {
            map.insert("password".to_string(), Value::String(digest_password(&raw)));
        }
    }
}

fn sanitize(record: Value) -> Value {
    strip_hidden(record, &["password".to_string()])
}

fn require_string_field<'a>(body: &'a Value, field: &'static str) -> Result<&'a str, ApiError> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request(format!("missing field: {field}")))
}
