//! Runtime settings and the per-invocation credential bundle.
//!
//! Two layers of configuration feed the pipeline:
//!
//! 1. [`Settings`]: non-secret knobs (parameter prefix, alert topic, the
//!    active social platform set, API endpoint bases) resolved once at
//!    startup from CLI flags and environment variables.
//! 2. [`Credentials`]: the secret bundle fetched fresh from the parameter
//!    store at the start of every invocation and treated as read-only
//!    afterwards. Tokens never appear in `Debug` output.
//!
//! The store itself sits behind the [`SecretStore`] trait so tests can
//! substitute an in-memory map for SSM. Each secret is fetched exactly
//! once, with decryption, and a missing or undecryptable parameter aborts
//! the invocation.

use async_trait::async_trait;
use aws_sdk_ssm::error::DisplayErrorContext;
use clap::ValueEnum;
use std::fmt;
use tracing::{debug, info};

use crate::errors::PipelineError;

pub const DEFAULT_PARAMETER_PREFIX: &str = "/article_publisher";
pub const DEFAULT_GENERATION_API_BASE: &str = "https://api.openai.com/";
pub const DEFAULT_PUBLISH_API_BASE: &str = "https://api.medium.com/v1/";
pub const DEFAULT_LINKEDIN_API_BASE: &str = "https://api.linkedin.com/";
pub const DEFAULT_X_API_BASE: &str = "https://api.x.com/";

/// A social platform the promotional message can fan out to.
///
/// The active set is external configuration (`--platforms` /
/// `SOCIAL_PLATFORMS`), not a hardcoded pair; credentials are only fetched
/// for platforms that are actually active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    Linkedin,
    X,
}

/// Non-secret runtime configuration, populated once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Parameter-store prefix holding the credentials and topic catalog.
    pub parameter_prefix: String,
    /// SNS topic for status alerts; alerts are skipped when unset.
    pub alert_topic_arn: Option<String>,
    /// Social platforms to cross-post to after publishing.
    pub platforms: Vec<Platform>,
    /// Base URL of the OpenAI-compatible completions API.
    pub generation_api_base: String,
    /// Base URL of the Medium API.
    pub publish_api_base: String,
    /// Base URL of the LinkedIn API.
    pub linkedin_api_base: String,
    /// Base URL of the X API.
    pub x_api_base: String,
}

impl Settings {
    /// Fully-qualified parameter name under the configured prefix.
    pub fn parameter(&self, name: &str) -> String {
        format!("{}/{}", self.parameter_prefix.trim_end_matches('/'), name)
    }

    /// Parameter-store path listing the topic catalog.
    pub fn topics_path(&self) -> String {
        self.parameter("topics")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            parameter_prefix: DEFAULT_PARAMETER_PREFIX.to_string(),
            alert_topic_arn: None,
            platforms: vec![Platform::Linkedin],
            generation_api_base: DEFAULT_GENERATION_API_BASE.to_string(),
            publish_api_base: DEFAULT_PUBLISH_API_BASE.to_string(),
            linkedin_api_base: DEFAULT_LINKEDIN_API_BASE.to_string(),
            x_api_base: DEFAULT_X_API_BASE.to_string(),
        }
    }
}

/// Lookup-by-name secret access, decrypt-on-read, one attempt per secret.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<String, PipelineError>;
}

/// [`SecretStore`] backed by AWS SSM Parameter Store.
#[derive(Debug, Clone)]
pub struct SsmSecretStore {
    client: aws_sdk_ssm::Client,
}

impl SsmSecretStore {
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for SsmSecretStore {
    async fn fetch(&self, name: &str) -> Result<String, PipelineError> {
        debug!(parameter = name, "Retrieving parameter");
        let response = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| PipelineError::ConfigFetch {
                name: name.to_string(),
                reason: format!("{}", DisplayErrorContext(&e)),
            })?;

        response
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| PipelineError::ConfigFetch {
                name: name.to_string(),
                reason: "parameter present but has no value".to_string(),
            })
    }
}

/// LinkedIn credentials: the UGC post author URN travels with the token.
#[derive(Clone)]
pub struct LinkedInCredentials {
    pub access_token: String,
    pub author_urn: String,
}

/// The credential bundle for one invocation.
///
/// Fetched fresh each invocation, never cached across invocations.
#[derive(Clone)]
pub struct Credentials {
    pub generation_api_key: String,
    pub publish_token: String,
    pub publish_user_id: String,
    pub linkedin: Option<LinkedInCredentials>,
    pub x_access_token: Option<String>,
}

impl Credentials {
    /// Resolve the bundle with sequential named lookups. Platform secrets
    /// are only fetched for platforms in the active set. Any failed lookup
    /// aborts the invocation.
    pub async fn load(
        store: &dyn SecretStore,
        settings: &Settings,
    ) -> Result<Self, PipelineError> {
        let generation_api_key = store.fetch(&settings.parameter("openai_api_token")).await?;
        let publish_token = store.fetch(&settings.parameter("medium_api_token")).await?;
        let publish_user_id = store.fetch(&settings.parameter("medium_user_id")).await?;

        let linkedin = if settings.platforms.contains(&Platform::Linkedin) {
            Some(LinkedInCredentials {
                access_token: store
                    .fetch(&settings.parameter("linkedin_access_token"))
                    .await?,
                author_urn: store
                    .fetch(&settings.parameter("linkedin_author_urn"))
                    .await?,
            })
        } else {
            None
        };

        let x_access_token = if settings.platforms.contains(&Platform::X) {
            Some(store.fetch(&settings.parameter("x_access_token")).await?)
        } else {
            None
        };

        info!(
            platforms = ?settings.platforms,
            "Resolved credential bundle"
        );
        Ok(Self {
            generation_api_key,
            publish_token,
            publish_user_id,
            linkedin,
            x_access_token,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("generation_api_key", &"<redacted>")
            .field("publish_token", &"<redacted>")
            .field("publish_user_id", &self.publish_user_id)
            .field("linkedin", &self.linkedin.as_ref().map(|_| "<redacted>"))
            .field(
                "x_access_token",
                &self.x_access_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
