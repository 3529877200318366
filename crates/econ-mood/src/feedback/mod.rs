//! Subscription and contact submissions to the external collection endpoint.

mod client;
mod payload;
mod router;

pub use client::{
    EndpointReply, FeedbackClient, FeedbackError, HttpSubmissionTransport, SubmissionErrorCode,
    SubmissionResult, SubmissionTransport,
};
pub use payload::{is_valid_email, SubmissionPayload, DEFAULT_FEEDBACK_TYPE, DEFAULT_FREQUENCY};
pub use router::{feedback_router, ContactRequest, SubscribeRequest};
