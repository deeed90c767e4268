//! Routing engine behavior through the public dispatch surface.

use anyhow::Result;
use serde_json::json;

use minirest::auth::AuthContext;
use minirest::dispatcher::RequestDispatcher;
use minirest::routing::{handler_fn, Verb};

fn reply(text: &'static str) -> minirest::routing::BoxedHandler {
    handler_fn(move |_params, _body| async move { Ok(text.to_string()) })
}

#[tokio::test]
async fn most_specific_route_wins_end_to_end() -> Result<()> {
    let mut dispatcher = RequestDispatcher::new();
    let router = dispatcher.namespace_mut("task");
    router.register(Verb::Get, "", reply("all"), Vec::new());
    router.register(Verb::Get, "$id", reply("one"), Vec::new());
    router.register(Verb::Get, "summary", reply("summary"), Vec::new());

    let ctx = AuthContext::anonymous();
    assert_eq!(dispatcher.dispatch("GET", "/task", "", &ctx).await.unwrap(), "all");
    assert_eq!(dispatcher.dispatch("GET", "/task/42", "", &ctx).await.unwrap(), "one");
    // the literal out-ranks the parameter even though both match
    assert_eq!(
        dispatcher.dispatch("GET", "/task/summary", "", &ctx).await.unwrap(),
        "summary"
    );
    Ok(())
}

#[tokio::test]
async fn parameters_reach_the_handler_in_segment_order() -> Result<()> {
    let mut dispatcher = RequestDispatcher::new();
    dispatcher.namespace_mut("task").register(
        Verb::Put,
        "$id/$state",
        handler_fn(|params, _body| async move {
            let ordered: Vec<String> = params
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            Ok(ordered.join(","))
        }),
        Vec::new(),
    );

    let out = dispatcher
        .dispatch("PUT", "/task/7/done", "", &AuthContext::anonymous())
        .await
        .unwrap();
    assert_eq!(out, "id=7,state=done");
    Ok(())
}

#[tokio::test]
async fn re_registration_replaces_the_live_handler() -> Result<()> {
    let mut dispatcher = RequestDispatcher::new();
    dispatcher
        .namespace_mut("task")
        .register(Verb::Get, "$id", reply("old"), Vec::new());
    dispatcher
        .namespace_mut("task")
        .register(Verb::Get, "$key", reply("new"), Vec::new());

    assert_eq!(dispatcher.namespace("task").unwrap().len(), 1);
    assert_eq!(
        dispatcher
            .dispatch("GET", "/task/42", "", &AuthContext::anonymous())
            .await
            .unwrap(),
        "new"
    );
    Ok(())
}

#[tokio::test]
async fn ambiguous_tables_surface_as_a_server_error() -> Result<()> {
    let mut dispatcher = RequestDispatcher::new();
    let router = dispatcher.namespace_mut("task");
    router.register(Verb::Get, "open/$id", reply("left"), Vec::new());
    router.register(Verb::Get, "$state/recent", reply("right"), Vec::new());

    let err = dispatcher
        .dispatch("GET", "/task/open/recent", "", &AuthContext::anonymous())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 500);

    // paths matched by only one of the patterns still resolve
    assert_eq!(
        dispatcher
            .dispatch("GET", "/task/open/7", "", &AuthContext::anonymous())
            .await
            .unwrap(),
        "left"
    );
    Ok(())
}

#[tokio::test]
async fn cleared_namespace_stops_matching() -> Result<()> {
    let mut dispatcher = RequestDispatcher::new();
    dispatcher
        .namespace_mut("task")
        .register(Verb::Get, "", reply("all"), Vec::new());

    dispatcher.namespace_mut("task").clear();

    let err = dispatcher
        .dispatch("GET", "/task", "", &AuthContext::anonymous())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
    Ok(())
}

#[tokio::test]
async fn body_handling_matches_the_contract() -> Result<()> {
    let mut dispatcher = RequestDispatcher::new();
    dispatcher.namespace_mut("task").register(
        Verb::Post,
        "",
        handler_fn(|_params, body| async move { Ok(body.to_string()) }),
        Vec::new(),
    );

    let ctx = AuthContext::anonymous();

    // empty body arrives as an empty object
    let echoed = dispatcher.dispatch("POST", "/task", "", &ctx).await.unwrap();
    assert_eq!(serde_json::from_str::<serde_json::Value>(&echoed)?, json!({}));

    // structured bodies pass through intact
    let echoed = dispatcher
        .dispatch("POST", "/task", r#"{"title": "write tests"}"#, &ctx)
        .await
        .unwrap();
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&echoed)?,
        json!({"title": "write tests"})
    );

    // anything unparseable is rejected before routing side effects
    let err = dispatcher.dispatch("POST", "/task", "not json", &ctx).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_JSON");
    Ok(())
}
