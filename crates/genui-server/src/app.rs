//! Router Assembly

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::handlers::{
    batch_handler, config_schema, health_check, input_schema, invoke_handler, output_schema,
};
use crate::state::AppState;

/// CORS for the configured origins, credentials allowed
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Wildcards are not allowed together with credentials, so mirror instead.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        // Health
        .route("/health", get(health_check))
        // Chat runnable
        .route("/chat/invoke", post(invoke_handler))
        .route("/chat/batch", post(batch_handler))
        .route("/chat/input_schema", get(input_schema))
        .route("/chat/output_schema", get(output_schema))
        .route("/chat/config_schema", get(config_schema))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
        response::Response,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use genui_core::{
        Completion, GenerationOptions, GraphBuilder, LlmProvider, Message, RawToolCall, Result,
        ToolSchema,
    };

    /// Provider that replays completions in order
    struct ScriptedProvider {
        replies: Mutex<Vec<Completion>>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            _messages: &[Message],
            _tools: &[ToolSchema],
            options: &GenerationOptions,
        ) -> Result<Completion> {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Ok(Completion::text(&options.model, "out of script"));
            }
            Ok(replies.remove(0))
        }
    }

    fn app(replies: Vec<Completion>) -> Router {
        let provider = Arc::new(ScriptedProvider {
            replies: Mutex::new(replies),
        });
        let graph = GraphBuilder::new()
            .provider(provider)
            .tools(genui_tools::default_registry(Arc::new(HashMap::new())))
            .build()
            .unwrap();
        build_router(AppState::new(graph), &ServerConfig::default())
    }

    fn tool_call(name: &str, arguments: Value) -> Completion {
        Completion::tool_calls(
            "gpt-4o",
            vec![RawToolCall {
                id: Some("call_1".into()),
                name: name.into(),
                arguments: arguments.to_string(),
            }],
        )
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_lists_tools() {
        let response = app(vec![]).oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(
            body["tools"],
            json!(["github-repo", "invoice-parser", "weather-data"])
        );
    }

    #[tokio::test]
    async fn test_invoke_plain_text_terminates() {
        let response = app(vec![Completion::text("gpt-4o", "Hello! How can I help?")])
            .oneshot(post_json(
                "/chat/invoke",
                &json!({"input": {"input": [{"type": "human", "content": "hi"}]}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["output"]["result"], "Hello! How can I help?");
        assert!(body["output"].get("tool_calls").is_none());
        assert!(body["output"].get("tool_result").is_none());
        assert_eq!(body["output"]["input"][0]["role"], "user");
        assert!(body["metadata"]["run_id"].is_string());
    }

    #[tokio::test]
    async fn test_invoke_dispatches_invoice_parser() {
        let response = app(vec![tool_call(
            "invoice-parser",
            json!({
                "orderId": "ORD-9",
                "lineItems": [{"name": "Cable", "quantity": 3, "price": 5.0}]
            }),
        )])
        .oneshot(post_json(
            "/chat/invoke",
            &json!({"input": [{"role": "user", "content": "parse this invoice"}]}),
        ))
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["output"]["tool_calls"][0]["name"], "invoice-parser");
        assert_eq!(body["output"]["tool_result"]["orderId"], "ORD-9");
        assert_eq!(body["output"]["tool_result"]["total"], 15.0);
        assert_eq!(body["output"]["tool_result"]["lineItems"][0]["price"], 5.0);
    }

    #[tokio::test]
    async fn test_missing_credential_is_server_error() {
        let response = app(vec![tool_call(
            "github-repo",
            json!({"owner": "rust-lang", "repo": "rust"}),
        )])
        .oneshot(post_json(
            "/chat/invoke",
            &json!({"input": [{"role": "user", "content": "tell me about rust-lang/rust"}]}),
        ))
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(response).await;
        assert_eq!(body["code"], "MISSING_CREDENTIAL");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_missing_required_argument_is_bad_request() {
        let response = app(vec![tool_call("weather-data", json!({"city": "Rome"}))])
            .oneshot(post_json(
                "/chat/invoke",
                &json!({"input": [{"role": "user", "content": "weather in Rome"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "TOOL_VALIDATION");
    }

    #[tokio::test]
    async fn test_batch_runs_each_input() {
        let response = app(vec![
            Completion::text("gpt-4o", "first"),
            Completion::text("gpt-4o", "second"),
        ])
        .oneshot(post_json(
            "/chat/batch",
            &json!({"inputs": [
                {"input": [{"role": "user", "content": "one"}]},
                {"input": [{"role": "user", "content": "two"}]}
            ]}),
        ))
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["output"][0]["result"], "first");
        assert_eq!(body["output"][1]["result"], "second");
        let run_ids = body["metadata"]["run_ids"].as_array().unwrap();
        assert_eq!(run_ids.len(), 2);
        assert_ne!(run_ids[0], run_ids[1]);
    }

    #[tokio::test]
    async fn test_schemas_are_served() {
        let router = app(vec![]);
        for (uri, title) in [
            ("/chat/input_schema", "ChatInput"),
            ("/chat/output_schema", "DecisionState"),
            ("/chat/config_schema", "RunConfig"),
        ] {
            let response = router.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_eq!(json_body(response).await["title"], title);
        }
    }

    #[tokio::test]
    async fn test_cors_preflight_for_local_frontend() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/chat/invoke")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app(vec![]).oneshot(request).await.unwrap();
        let headers = response.headers();

        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn test_cors_rejects_unknown_origin() {
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://evil.example.com")
            .body(Body::empty())
            .unwrap();

        let response = app(vec![]).oneshot(request).await.unwrap();
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }
}
