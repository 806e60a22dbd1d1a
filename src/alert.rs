//! Status alerting over SNS.
//!
//! A one-line, human-readable status message goes out at the terminal
//! point of every invocation, success or failure. Delivery is best effort:
//! a sink failure is logged and swallowed so it can never mask the
//! pipeline's own outcome.

use async_trait::async_trait;
use aws_sdk_sns::error::DisplayErrorContext;
use chrono::Local;
use tracing::{debug, info, warn};

use crate::errors::AlertError;

pub const ALERT_SUBJECT: &str = "article-publisher";

/// Fire-and-forget delivery of a status message.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send(&self, subject: &str, message: &str) -> Result<(), AlertError>;
}

/// [`AlertSink`] backed by an SNS topic.
#[derive(Debug, Clone)]
pub struct SnsAlertSink {
    client: aws_sdk_sns::Client,
    topic_arn: String,
}

impl SnsAlertSink {
    pub fn new(client: aws_sdk_sns::Client, topic_arn: String) -> Self {
        Self { client, topic_arn }
    }
}

#[async_trait]
impl AlertSink for SnsAlertSink {
    async fn send(&self, subject: &str, message: &str) -> Result<(), AlertError> {
        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await
            .map_err(|e| AlertError(format!("{}", DisplayErrorContext(&e))))?;

        info!(topic_arn = %self.topic_arn, "Published status alert");
        Ok(())
    }
}

/// Sink used when no alert topic is configured.
#[derive(Debug, Clone, Copy)]
pub struct NullAlertSink;

#[async_trait]
impl AlertSink for NullAlertSink {
    async fn send(&self, _subject: &str, message: &str) -> Result<(), AlertError> {
        debug!(%message, "No alert topic configured; dropping status alert");
        Ok(())
    }
}

/// Emit the terminal status alert, swallowing delivery failures.
pub async fn emit(sink: &dyn AlertSink, message: &str) {
    let stamped = format!("{} {message}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    if let Err(e) = sink.send(ALERT_SUBJECT, &stamped).await {
        warn!(error = %e, "Failed to deliver status alert");
    }
}
