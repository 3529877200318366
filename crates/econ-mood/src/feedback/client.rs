use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::payload::{is_valid_email, SubmissionPayload};
use crate::config::FeedbackConfig;

const USER_AGENT: &str = concat!("econ-mood/", env!("CARGO_PKG_VERSION"));

/// Body returned by the collection endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EndpointReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Posts payloads to the collection endpoint.
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn post(&self, payload: &SubmissionPayload) -> Result<EndpointReply, FeedbackError>;
}

/// Transport-level submission failure.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("submission timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },
    #[error("submission request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("submission endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
}

pub struct HttpSubmissionTransport {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpSubmissionTransport {
    pub fn new(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }

    fn classify(&self, err: reqwest::Error) -> FeedbackError {
        if err.is_timeout() {
            FeedbackError::Timeout {
                after: self.timeout,
            }
        } else {
            FeedbackError::Network(err)
        }
    }
}

#[async_trait]
impl SubmissionTransport for HttpSubmissionTransport {
    async fn post(&self, payload: &SubmissionPayload) -> Result<EndpointReply, FeedbackError> {
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedbackError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<EndpointReply>()
            .await
            .map_err(|err| self.classify(err))
    }
}

/// Machine-readable reason a submission did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionErrorCode {
    MissingFields,
    InvalidEmail,
    ServiceDisabled,
    Timeout,
    NetworkError,
    HttpError,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SubmissionErrorCode>,
}

impl SubmissionResult {
    fn failed(code: SubmissionErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(code),
        }
    }
}

/// Validates and submits subscription and contact requests. Never returns an error;
/// every outcome is a [`SubmissionResult`].
pub struct FeedbackClient {
    enabled: bool,
    page_url: String,
    transport: Option<Arc<dyn SubmissionTransport>>,
}

impl FeedbackClient {
    pub fn new(
        config: &FeedbackConfig,
        transport: Option<Arc<dyn SubmissionTransport>>,
    ) -> Self {
        Self {
            enabled: config.enabled,
            page_url: config.page_url.clone(),
            transport,
        }
    }

    pub fn from_config(config: &FeedbackConfig) -> Result<Self, reqwest::Error> {
        let transport = match &config.endpoint_url {
            Some(url) => {
                let client = Client::builder().user_agent(USER_AGENT).build()?;
                Some(Arc::new(HttpSubmissionTransport::new(client, url.clone(), config.timeout))
                    as Arc<dyn SubmissionTransport>)
            }
            None => None,
        };
        Ok(Self::new(config, transport))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.transport.is_some()
    }

    pub async fn submit_subscription(
        &self,
        email: &str,
        source: &str,
        frequency: Option<&str>,
    ) -> SubmissionResult {
        if !is_valid_email(email.trim()) {
            return SubmissionResult::failed(
                SubmissionErrorCode::InvalidEmail,
                "Please enter a valid email address.",
            );
        }

        let payload = SubmissionPayload::subscription(
            email,
            source,
            frequency,
            &self.page_url,
            USER_AGENT,
            Utc::now(),
        );
        self.dispatch(payload).await
    }

    pub async fn submit_contact(
        &self,
        name: &str,
        email: &str,
        message: &str,
        feedback_type: Option<&str>,
    ) -> SubmissionResult {
        if [name, email, message].iter().any(|field| field.trim().is_empty()) {
            return SubmissionResult::failed(
                SubmissionErrorCode::MissingFields,
                "Please fill in all required fields.",
            );
        }
        if !is_valid_email(email.trim()) {
            return SubmissionResult::failed(
                SubmissionErrorCode::InvalidEmail,
                "Please enter a valid email address.",
            );
        }

        let payload = SubmissionPayload::contact(
            name,
            email,
            message,
            feedback_type,
            &self.page_url,
            USER_AGENT,
            Utc::now(),
        );
        self.dispatch(payload).await
    }

    async fn dispatch(&self, payload: SubmissionPayload) -> SubmissionResult {
        let transport = match (&self.transport, self.enabled) {
            (Some(transport), true) => transport,
            _ => {
                return SubmissionResult::failed(
                    SubmissionErrorCode::ServiceDisabled,
                    "Email collection is currently disabled",
                )
            }
        };

        match transport.post(&payload).await {
            Ok(reply) if reply.success => {
                info!(source = %payload.source, "feedback submission accepted");
                SubmissionResult {
                    success: true,
                    message: reply
                        .message
                        .unwrap_or_else(|| "Submission completed".to_string()),
                    error: None,
                }
            }
            Ok(reply) => {
                warn!(source = %payload.source, message = ?reply.message, "feedback submission rejected");
                SubmissionResult::failed(
                    SubmissionErrorCode::Rejected,
                    reply
                        .message
                        .unwrap_or_else(|| "Submission was not accepted".to_string()),
                )
            }
            Err(err) => {
                warn!(source = %payload.source, error = %err, "feedback submission failed");
                match err {
                    FeedbackError::Timeout { .. } => SubmissionResult::failed(
                        SubmissionErrorCode::Timeout,
                        "Request timed out. Please try again.",
                    ),
                    FeedbackError::Status { .. } => SubmissionResult::failed(
                        SubmissionErrorCode::HttpError,
                        "Failed to submit. Please try again later.",
                    ),
                    FeedbackError::Network(_) => SubmissionResult::failed(
                        SubmissionErrorCode::NetworkError,
                        "Failed to submit. Please try again later.",
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    enum Behaviour {
        Accept,
        Reject,
        Timeout,
        Status(u16),
    }

    struct RecordingTransport {
        behaviour: Behaviour,
        sent: Mutex<Vec<SubmissionPayload>>,
    }

    impl RecordingTransport {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<SubmissionPayload> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SubmissionTransport for RecordingTransport {
        async fn post(&self, payload: &SubmissionPayload) -> Result<EndpointReply, FeedbackError> {
            self.sent.lock().unwrap().push(payload.clone());
            match self.behaviour {
                Behaviour::Accept => Ok(EndpointReply {
                    success: true,
                    message: Some("Thanks!".to_string()),
                }),
                Behaviour::Reject => Ok(EndpointReply {
                    success: false,
                    message: Some("Already subscribed".to_string()),
                }),
                Behaviour::Timeout => Err(FeedbackError::Timeout {
                    after: Duration::from_millis(10),
                }),
                Behaviour::Status(status) => Err(FeedbackError::Status {
                    status,
                    body: "nope".to_string(),
                }),
            }
        }
    }

    fn client(transport: &Arc<RecordingTransport>) -> FeedbackClient {
        let transport: Arc<dyn SubmissionTransport> = transport.clone();
        FeedbackClient::new(&FeedbackConfig::default(), Some(transport))
    }

    #[tokio::test]
    async fn invalid_email_never_reaches_transport() {
        let transport = RecordingTransport::new(Behaviour::Accept);
        let result = client(&transport)
            .submit_subscription("not-an-email", "bar", None)
            .await;
        assert_eq!(result.error, Some(SubmissionErrorCode::InvalidEmail));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn contact_requires_every_field() {
        let transport = RecordingTransport::new(Behaviour::Accept);
        let result = client(&transport)
            .submit_contact("Ada", "ada@example.com", "   ", None)
            .await;
        assert_eq!(result.error, Some(SubmissionErrorCode::MissingFields));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn accepted_subscription_reports_endpoint_message() {
        let transport = RecordingTransport::new(Behaviour::Accept);
        let result = client(&transport)
            .submit_subscription("Ada@Example.com", "bar", Some("monthly"))
            .await;
        assert!(result.success);
        assert_eq!(result.message, "Thanks!");
        let sent = transport.sent();
        assert_eq!(sent[0].email, "ada@example.com");
        assert_eq!(sent[0].frequency, "monthly");
    }

    #[tokio::test]
    async fn failures_map_to_distinct_codes() {
        let cases = [
            (Behaviour::Reject, SubmissionErrorCode::Rejected),
            (Behaviour::Timeout, SubmissionErrorCode::Timeout),
            (Behaviour::Status(500), SubmissionErrorCode::HttpError),
        ];
        for (behaviour, expected) in cases {
            let transport = RecordingTransport::new(behaviour);
            let result = client(&transport)
                .submit_contact("Ada", "ada@example.com", "hi", Some("bug"))
                .await;
            assert!(!result.success);
            assert_eq!(result.error, Some(expected));
        }
    }

    #[tokio::test]
    async fn disabled_or_unconfigured_collection_is_reported() {
        let unconfigured = FeedbackClient::new(&FeedbackConfig::default(), None);
        assert!(!unconfigured.is_enabled());
        let result = unconfigured
            .submit_subscription("ada@example.com", "bar", None)
            .await;
        assert_eq!(result.error, Some(SubmissionErrorCode::ServiceDisabled));

        let transport = RecordingTransport::new(Behaviour::Accept);
        let config = FeedbackConfig {
            enabled: false,
            ..FeedbackConfig::default()
        };
        let dyn_transport: Arc<dyn SubmissionTransport> = transport.clone();
        let disabled = FeedbackClient::new(&config, Some(dyn_transport));
        let result = disabled
            .submit_subscription("ada@example.com", "bar", None)
            .await;
        assert_eq!(result.error, Some(SubmissionErrorCode::ServiceDisabled));
        assert!(transport.sent().is_empty());
    }
}
