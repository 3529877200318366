use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use super::client::{FeedbackClient, SubmissionErrorCode, SubmissionResult};

const DEFAULT_SUBSCRIBE_SOURCE: &str = "Subscription Bar";

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub feedback_type: Option<String>,
}

/// Subscription and contact intake endpoints.
pub fn feedback_router(client: Arc<FeedbackClient>) -> Router {
    Router::new()
        .route("/api/v1/subscribe", post(subscribe_handler))
        .route("/api/v1/contact", post(contact_handler))
        .with_state(client)
}

async fn subscribe_handler(
    State(client): State<Arc<FeedbackClient>>,
    Json(request): Json<SubscribeRequest>,
) -> Response {
    let source = request.source.as_deref().unwrap_or(DEFAULT_SUBSCRIBE_SOURCE);
    let result = client
        .submit_subscription(&request.email, source, request.frequency.as_deref())
        .await;
    respond(result)
}

async fn contact_handler(
    State(client): State<Arc<FeedbackClient>>,
    Json(request): Json<ContactRequest>,
) -> Response {
    let result = client
        .submit_contact(
            &request.name,
            &request.email,
            &request.message,
            request.feedback_type.as_deref(),
        )
        .await;
    respond(result)
}

fn respond(result: SubmissionResult) -> Response {
    let status = match result.error {
        None => StatusCode::OK,
        Some(SubmissionErrorCode::MissingFields | SubmissionErrorCode::InvalidEmail) => {
            StatusCode::BAD_REQUEST
        }
        Some(SubmissionErrorCode::Rejected) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(SubmissionErrorCode::ServiceDisabled) => StatusCode::SERVICE_UNAVAILABLE,
        Some(SubmissionErrorCode::Timeout) => StatusCode::GATEWAY_TIMEOUT,
        Some(SubmissionErrorCode::NetworkError | SubmissionErrorCode::HttpError) => {
            StatusCode::BAD_GATEWAY
        }
    };
    (status, Json(result)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedbackConfig;
    use crate::feedback::{EndpointReply, FeedbackError, SubmissionPayload, SubmissionTransport};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::Value;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct AcceptingTransport {
        sent: Mutex<Vec<SubmissionPayload>>,
    }

    #[async_trait]
    impl SubmissionTransport for AcceptingTransport {
        async fn post(&self, payload: &SubmissionPayload) -> Result<EndpointReply, FeedbackError> {
            self.sent.lock().unwrap().push(payload.clone());
            Ok(EndpointReply {
                success: true,
                message: Some("Subscribed".to_string()),
            })
        }
    }

    fn router(transport: Option<Arc<AcceptingTransport>>) -> Router {
        let transport = transport.map(|t| t as Arc<dyn SubmissionTransport>);
        feedback_router(Arc::new(FeedbackClient::new(
            &FeedbackConfig::default(),
            transport,
        )))
    }

    async fn post_json(router: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn subscribe_defaults_source_and_frequency() {
        let transport = Arc::new(AcceptingTransport::default());
        let (status, body) = post_json(
            router(Some(transport.clone())),
            "/api/v1/subscribe",
            r#"{"email":"Reader@Example.com"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Subscribed");
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].source, DEFAULT_SUBSCRIBE_SOURCE);
        assert_eq!(sent[0].frequency, "weekly");
    }

    #[tokio::test]
    async fn contact_validation_failures_are_bad_requests() {
        let transport = Arc::new(AcceptingTransport::default());
        let (status, body) = post_json(
            router(Some(transport.clone())),
            "/api/v1/contact",
            r#"{"name":"Ada","email":"ada@example.com"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "MISSING_FIELDS");

        let (status, body) = post_json(
            router(Some(transport.clone())),
            "/api/v1/contact",
            r#"{"name":"Ada","email":"ada-at-example","message":"hi"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_EMAIL");
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_endpoint_reports_service_disabled() {
        let (status, body) = post_json(
            router(None),
            "/api/v1/subscribe",
            r#"{"email":"reader@example.com"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "SERVICE_DISABLED");
    }
}
