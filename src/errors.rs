//! Error taxonomy for the pipeline.
//!
//! Fatal errors ([`PipelineError`]) abort the remaining steps, trigger one
//! alert emission, and surface as a non-200 [`InvocationResponse`]. The two
//! non-fatal kinds keep the pipeline moving: a [`NotifyError`] is logged and
//! recorded per platform, an [`AlertError`] is logged and swallowed at the
//! call site.
//!
//! [`InvocationResponse`]: crate::models::InvocationResponse

use thiserror::Error;

/// A fatal pipeline error. Any variant aborts the invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A named secret could not be fetched or decrypted.
    #[error("failed to resolve parameter `{name}`: {reason}")]
    ConfigFetch { name: String, reason: String },

    /// The topic catalog errored or returned zero candidates.
    #[error("topic selection failed: {0}")]
    TopicSource(String),

    /// The generative-text service errored or returned no completions.
    #[error("article generation failed: {0}")]
    Generation(String),

    /// The publishing platform did not return an article URL. The response
    /// detail was already logged by the publisher.
    #[error("publishing failed: platform returned no article URL")]
    Publish,
}

impl PipelineError {
    /// HTTP-style status code for the invocation result. Missing
    /// configuration is the caller's problem (400); everything else is a
    /// pipeline failure (500).
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::ConfigFetch { .. } => 400,
            _ => 500,
        }
    }
}

/// A single social platform notification failed. Never fatal.
#[derive(Debug, Error)]
#[error("{platform} notification failed: {reason}")]
pub struct NotifyError {
    pub platform: &'static str,
    pub reason: String,
}

/// The alerting sink could not deliver a status message. Never fatal and
/// never allowed to mask the original pipeline outcome.
#[derive(Debug, Error)]
#[error("alert delivery failed: {0}")]
pub struct AlertError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_fetch_maps_to_400() {
        let err = PipelineError::ConfigFetch {
            name: "medium_api_token".to_string(),
            reason: "ParameterNotFound".to_string(),
        };
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("medium_api_token"));
    }

    #[test]
    fn test_other_fatal_errors_map_to_500() {
        assert_eq!(
            PipelineError::TopicSource("empty catalog".to_string()).status_code(),
            500
        );
        assert_eq!(
            PipelineError::Generation("no completions".to_string()).status_code(),
            500
        );
        assert_eq!(PipelineError::Publish.status_code(), 500);
    }

    #[test]
    fn test_notify_error_names_platform() {
        let err = NotifyError {
            platform: "linkedin",
            reason: "status 401".to_string(),
        };
        assert_eq!(err.to_string(), "linkedin notification failed: status 401");
    }
}
