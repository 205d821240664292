//! HTTP API for the chat pipeline.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use companion_core::AppError;
use companion_knowledge::{ChatResult, ChatService};
use companion_prompt::ChatMessage;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
struct AppState {
    chat: ChatService,
}

/// Body of `POST /api/chat`. The last message is the current question.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// Body returned by `POST /api/chat`.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    #[serde(flatten)]
    pub result: ChatResult,

    /// Counselor contact details, present only when escalating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_message: Option<&'static str>,
}

/// Build the router with CORS restricted to `allowed_origins`.
pub fn build_app(chat: ChatService, allowed_origins: &[String]) -> Result<Router> {
    let state = AppState { chat };

    Ok(Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/health", get(health))
        .layer(cors_layer(allowed_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Serve until Ctrl-C.
pub async fn run_server(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}

// Credentials rule out wildcards, so methods and headers mirror the request.
fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid allowed origin: {:?}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let result = state.chat.respond(&request.messages).await?;
    let escalation_message = result
        .should_escalate
        .then(|| state.chat.safety().escalation_response());

    Ok(Json(ChatResponse {
        result,
        escalation_message,
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        let status = match value {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("chat request failed: {}", value);
        }
        Self {
            status,
            message: value.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use companion_knowledge::{ConditionRecord, Generator, KnowledgeBase, ResultTypeCatalog};
    use companion_safety::ESCALATION_RESPONSE;
    use std::sync::Arc;
    use tower::ServiceExt;

    const ORIGIN: &str = "http://localhost:3000";

    fn app() -> Router {
        let knowledge = KnowledgeBase {
            conditions: vec![ConditionRecord {
                name: "Cystic Fibrosis".to_string(),
                description: "Affects the lungs".to_string(),
                inheritance: "Autosomal recessive".to_string(),
                frequency: "1 in 2,500".to_string(),
                key_facts: vec![],
                keywords: vec!["cystic fibrosis".to_string()],
                risk_level: None,
            }],
            result_types: ResultTypeCatalog {
                low_risk: "low".to_string(),
                high_risk: "high".to_string(),
                carrier_positive: "carrier".to_string(),
            },
        };
        let chat = ChatService::new(Arc::new(knowledge), Generator::fallback_only()).unwrap();
        build_app(chat, &[ORIGIN.to_string()]).unwrap()
    }

    fn chat_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let req = Request::builder()
            .method("GET")
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_chat_returns_result() {
        let req = chat_request(serde_json::json!({
            "messages": [
                { "role": "user", "content": "Hi" },
                { "role": "assistant", "content": "Hello! How can I help?" },
                { "role": "user", "content": "What is cystic fibrosis?" }
            ]
        }));
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let json = json_body(res).await;
        assert_eq!(json["sources"], serde_json::json!(["Cystic Fibrosis"]));
        assert_eq!(json["should_escalate"], false);
        assert!((json["confidence"].as_f64().unwrap() - 0.4).abs() < 1e-6);
        assert!(json["response"].as_str().unwrap().contains("UNITY Complete"));
        assert!(json.get("escalation_message").is_none());
    }

    #[tokio::test]
    async fn test_escalation_includes_contact_block() {
        let req = chat_request(serde_json::json!({
            "messages": [{ "role": "user", "content": "I'm very worried about my results" }]
        }));
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let json = json_body(res).await;
        assert_eq!(json["should_escalate"], true);
        assert_eq!(json["escalation_message"], ESCALATION_RESPONSE);
    }

    #[tokio::test]
    async fn test_empty_messages_is_bad_request() {
        let req = chat_request(serde_json::json!({ "messages": [] }));
        let res = app().oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json = json_body(res).await;
        assert!(json["error"].as_str().unwrap().contains("At least one message"));
    }

    #[tokio::test]
    async fn test_unknown_role_is_rejected() {
        let req = chat_request(serde_json::json!({
            "messages": [{ "role": "system", "content": "hi" }]
        }));
        let res = app().oneshot(req).await.unwrap();
        assert!(res.status().is_client_error());
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/chat")
            .header(header::ORIGIN, ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();

        let headers = res.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn test_cors_ignores_other_origins() {
        let req = Request::builder()
            .method("GET")
            .uri("/health")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();

        assert!(res
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        assert!(cors_layer(&["http://localhost\n".to_string()]).is_err());
    }
}
