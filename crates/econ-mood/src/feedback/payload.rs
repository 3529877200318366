use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FREQUENCY: &str = "weekly";
pub const DEFAULT_FEEDBACK_TYPE: &str = "general";
pub const CONTACT_SOURCE: &str = "Contact Form";

/// `local@domain.tld` with no whitespace and exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let clean = |part: &str| {
        !part.is_empty() && !part.contains('@') && !part.chars().any(char::is_whitespace)
    };
    if !clean(local) || !clean(domain) {
        return false;
    }
    domain
        .char_indices()
        .any(|(idx, c)| c == '.' && idx > 0 && idx + 1 < domain.len())
}

/// JSON body posted to the collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub email: String,
    pub source: String,
    pub frequency: String,
    pub timestamp: String,
    pub page: String,
    pub user_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_type: Option<String>,
}

impl SubmissionPayload {
    pub fn subscription(
        email: &str,
        source: &str,
        frequency: Option<&str>,
        page: &str,
        user_agent: &str,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            email: email.trim().to_lowercase(),
            source: source.to_string(),
            frequency: frequency
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .unwrap_or(DEFAULT_FREQUENCY)
                .to_string(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            page: page.to_string(),
            user_agent: user_agent.to_string(),
            name: None,
            message: None,
            feedback_type: None,
        }
    }

    pub fn contact(
        name: &str,
        email: &str,
        message: &str,
        feedback_type: Option<&str>,
        page: &str,
        user_agent: &str,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: Some(name.trim().to_string()),
            message: Some(message.trim().to_string()),
            feedback_type: Some(
                feedback_type
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .unwrap_or(DEFAULT_FEEDBACK_TYPE)
                    .to_string(),
            ),
            ..Self::subscription(email, CONTACT_SOURCE, None, page, user_agent, at)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("someone@example.com"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(!is_valid_email("someone@example"));
        assert!(!is_valid_email("someone@.com"));
        assert!(!is_valid_email("someone@example."));
        assert!(!is_valid_email("some one@example.com"));
        assert!(!is_valid_email("a@b@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn subscription_payload_normalises_email_and_defaults_frequency() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let payload = SubmissionPayload::subscription(
            "  Person@Example.COM ",
            "Subscription Bar",
            None,
            "https://mood.example/",
            "econ-mood/test",
            at,
        );
        let json = serde_json::to_value(&payload).expect("serializes");
        assert_eq!(json["email"], "person@example.com");
        assert_eq!(json["frequency"], "weekly");
        assert_eq!(json["timestamp"], "2025-01-15T12:00:00.000Z");
        assert_eq!(json["userAgent"], "econ-mood/test");
        assert!(json.get("feedbackType").is_none());
    }

    #[test]
    fn contact_payload_carries_trimmed_fields_and_default_type() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let payload = SubmissionPayload::contact(
            " Ada ",
            "ada@example.com",
            " Love the charts ",
            None,
            "",
            "ua",
            at,
        );
        assert_eq!(payload.source, CONTACT_SOURCE);
        assert_eq!(payload.name.as_deref(), Some("Ada"));
        assert_eq!(payload.message.as_deref(), Some("Love the charts"));
        assert_eq!(payload.feedback_type.as_deref(), Some("general"));
        assert_eq!(payload.frequency, "weekly");
    }
}
