use std::sync::Arc;

use serde_json::Value;

use crate::auth::Guard;
use crate::error::ApiError;
use crate::routing::{handler_fn, Router, Verb};
use crate::store::{DataStore, Filter};

/// Guard lists for the stock CRUD routes, chosen per operation by the
/// caller mounting the resource.
#[derive(Debug, Clone, Default)]
pub struct RouteGuards {
    pub list: Vec<Guard>,
    pub fetch: Vec<Guard>,
    pub create: Vec<Guard>,
    pub update: Vec<Guard>,
    pub delete: Vec<Guard>,
}

/// Generic CRUD scaffolding: maps the default verb/path table onto a
/// [`DataStore`].
///
/// | route          | operation                     |
/// |----------------|-------------------------------|
/// | `GET    ""`    | list all records              |
/// | `GET    "$id"` | fetch one record by id        |
/// | `POST   ""`    | create from the request body  |
/// | `PUT    ""`    | update from the request body  |
/// | `DELETE "$id"` | delete by id                  |
///
/// Hidden fields are stripped from every response. Callers can shadow any
/// of these routes afterwards; re-registering the same shape replaces the
/// stock handler in place.
pub struct Resource {
    name: String,
    store: Arc<dyn DataStore>,
    hidden: Arc<Vec<String>>,
}

impl Resource {
    pub fn new(name: impl Into<String>, store: Arc<dyn DataStore>) -> Self {
        Self {
            name: name.into(),
            store,
            hidden: Arc::new(Vec::new()),
        }
    }

    /// Marks a field as hidden: stored, but never serialized into a
    /// response.
    pub fn hide(mut self, field: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.hidden).push(field.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> Arc<dyn DataStore> {
        self.store.clone()
    }

    pub fn hidden_fields(&self) -> &[String] {
        &self.hidden
    }

    /// Registers the five default CRUD routes on `router`.
    pub fn mount(&self, router: &mut Router, guards: RouteGuards) {
        let name = self.name.clone();

        let store = self.store.clone();
        let hidden = self.hidden.clone();
        router.register(
            Verb::Get,
            "",
            handler_fn(move |_params, _body| {
                let store = store.clone();
                let hidden = hidden.clone();
                async move {
                    let rows = store.query(&Filter::new()).await?;
                    let rows: Vec<Value> = rows
                        .into_iter()
                        .map(|row| strip_hidden(row, &hidden))
                        .collect();
                    to_body(&Value::Array(rows))
                }
            }),
            guards.list,
        );

        let store = self.store.clone();
        let hidden = self.hidden.clone();
        let resource = name.clone();
        router.register(
            Verb::Get,
            "$id",
            handler_fn(move |params, _body| {
                let store = store.clone();
                let hidden = hidden.clone();
                let resource = resource.clone();
                async move {
                    let id = require_param(&params, "id")?;
                    let rows = store.query(&Filter::new().eq("id", id.as_str())).await?;
                    let row = rows.into_iter().next().ok_or_else(|| {
                        ApiError::not_found(format!("{resource} '{id}' not found"))
                    })?;
                    to_body(&strip_hidden(row, &hidden))
                }
            }),
            guards.fetch,
        );

        let store = self.store.clone();
        let hidden = self.hidden.clone();
        router.register(
            Verb::Post,
            "",
            handler_fn(move |_params, body| {
                let store = store.clone();
                let hidden = hidden.clone();
                async move {
                    let created = store.insert(require_object(body)?).await?;
                    to_body(&strip_hidden(created, &hidden))
                }
            }),
            guards.create,
        );

        let store = self.store.clone();
        let hidden = self.hidden.clone();
        router.register(
            Verb::Put,
            "",
            handler_fn(move |_params, body| {
                let store = store.clone();
                let hidden = hidden.clone();
                async move {
                    let updated = store.update(require_object(body)?).await?;
                    to_body(&strip_hidden(updated, &hidden))
                }
            }),
            guards.update,
        );

        let store = self.store.clone();
        router.register(
            Verb::Delete,
            "$id",
            handler_fn(move |params, _body| {
                let store = store.clone();
                async move {
                    let id = require_param(&params, "id")?;
                    store.delete(&id).await?;
                    Ok(String::new())
                }
            }),
            guards.delete,
        );
    }
}

/// Removes hidden fields from a record on its way out.
pub fn strip_hidden(mut record: Value, hidden: &[String]) -> Value {
    if let Some(map) = record.as_object_mut() {
        for field in hidden {
            map.remove(field);
        }
    }
    record
}

pub(crate) fn require_param(
    params: &crate::routing::RouteParams,
    name: &str,
) -> Result<String, ApiError> {
    params
        .get(name)
        .map(str::to_owned)
        .ok_or_else(|| ApiError::bad_request(format!("missing path parameter: {name}")))
}

pub(crate) fn require_object(body: Value) -> Result<Value, ApiError> {
    if body.is_object() {
        Ok(body)
    } else {
        Err(ApiError::bad_request("request body must be a JSON object"))
    }
}

pub(crate) fn to_body(value: &Value) -> Result<String, ApiError> {
    serde_json::to_string(value)
        .map_err(|e| ApiError::internal_server_error(format!("failed to serialize response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthContext;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn mounted() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let resource = Resource::new("widget", store.clone()).hide("secret");
        let mut router = Router::new();
        resource.mount(&mut router, RouteGuards::default());
        (router, store)
    }

    async fn invoke(router: &Router, verb: Verb, path: &str, body: Value) -> Result<String, ApiError> {
        let resolution = router.resolve(verb, path, &AuthContext::anonymous())?;
        resolution.route.handler().call(resolution.params, body).await
    }

    #[test]
    fn mount_registers_the_five_default_routes() {
        let (router, _) = mounted();
        assert_eq!(router.len(), 5);
    }

    #[tokio::test]
    async fn create_then_fetch_round_trip() {
        let (router, _) = mounted();

        let created = invoke(&router, Verb::Post, "", json!({"id": "w1", "size": 3}))
            .await
            .unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&created).unwrap(),
            json!({"id": "w1", "size": 3})
        );

        let fetched = invoke(&router, Verb::Get, "w1", json!({})).await.unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&fetched).unwrap(),
            json!({"id": "w1", "size": 3})
        );
    }

    #[tokio::test]
    async fn hidden_fields_never_leave_the_api() {
        let (router, store) = mounted();
        store
            .insert(json!({"id": "w1", "secret": "s3cr3t", "size": 1}))
            .await
            .unwrap();

        let listed = invoke(&router, Verb::Get, "", json!({})).await.unwrap();
        assert!(!listed.contains("s3cr3t"));

        let fetched = invoke(&router, Verb::Get, "w1", json!({})).await.unwrap();
        assert!(!fetched.contains("s3cr3t"));
    }

    #[tokio::test]
    async fn fetch_of_missing_record_is_not_found() {
        let (router, _) = mounted();
        let err = invoke(&router, Verb::Get, "ghost", json!({})).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn update_and_delete_flow() {
        let (router, _) = mounted();
        invoke(&router, Verb::Post, "", json!({"id": "w1", "size": 1}))
            .await
            .unwrap();

        let updated = invoke(&router, Verb::Put, "", json!({"id": "w1", "size": 9}))
            .await
            .unwrap();
        assert!(updated.contains("\"size\":9"));

        let gone = invoke(&router, Verb::Delete, "w1", json!({})).await.unwrap();
        assert_eq!(gone, "");

        let err = invoke(&router, Verb::Get, "w1", json!({})).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn non_object_create_body_is_rejected() {
        let (router, _) = mounted();
        let err = invoke(&router, Verb::Post, "", json!([1, 2])).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
