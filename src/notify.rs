//! Social platform fan-out for the promotional message.
//!
//! After a successful publish, each active platform gets one authenticated
//! post-creation request referencing the article URL. The targets are
//! isolated from each other: a failure is logged and recorded in the
//! outcome list, and the remaining targets are still attempted. Nothing
//! here can fail the invocation or roll back the publish.

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info, instrument, warn};
use url::Url;

use crate::config::{Credentials, Platform, Settings};
use crate::errors::{NotifyError, PipelineError};
use crate::models::{NotificationOutcome, PublishedArticle};
use crate::utils::truncate_for_log;

/// One cross-posting target.
#[async_trait]
pub trait SocialNotifier: Send + Sync {
    fn platform(&self) -> &'static str;

    /// Post the promotional message for `article`. One attempt, no retry.
    async fn announce(&self, article: &PublishedArticle) -> Result<(), NotifyError>;
}

/// Issue the promotional post to every notifier, in order, regardless of
/// earlier failures.
pub async fn fan_out(
    notifiers: &[Box<dyn SocialNotifier>],
    article: &PublishedArticle,
) -> Vec<NotificationOutcome> {
    let mut outcomes = Vec::with_capacity(notifiers.len());

    for notifier in notifiers {
        let platform = notifier.platform();
        match notifier.announce(article).await {
            Ok(()) => {
                info!(platform, url = %article.url, "Shared article link");
                outcomes.push(NotificationOutcome {
                    platform,
                    delivered: true,
                    detail: None,
                });
            }
            Err(e) => {
                error!(platform, error = %e, "Failed to share article link");
                outcomes.push(NotificationOutcome {
                    platform,
                    delivered: false,
                    detail: Some(e.reason),
                });
            }
        }
    }

    outcomes
}

/// Assemble the active notifier set from configuration.
///
/// A platform listed in the settings but missing its credentials is skipped
/// with a warning; provisioning mistakes on one platform must not take the
/// others down with them.
pub fn build_notifiers(
    client: &reqwest::Client,
    settings: &Settings,
    credentials: &Credentials,
) -> Result<Vec<Box<dyn SocialNotifier>>, PipelineError> {
    let mut notifiers: Vec<Box<dyn SocialNotifier>> = Vec::new();

    for platform in &settings.platforms {
        match platform {
            Platform::Linkedin => match &credentials.linkedin {
                Some(linkedin) => notifiers.push(Box::new(LinkedInNotifier::new(
                    client.clone(),
                    &settings.linkedin_api_base,
                    linkedin.access_token.clone(),
                    linkedin.author_urn.clone(),
                )?)),
                None => warn!("LinkedIn is active but has no credentials; skipping"),
            },
            Platform::X => match &credentials.x_access_token {
                Some(token) => notifiers.push(Box::new(XNotifier::new(
                    client.clone(),
                    &settings.x_api_base,
                    token.clone(),
                )?)),
                None => warn!("X is active but has no credentials; skipping"),
            },
        }
    }

    Ok(notifiers)
}

fn join_endpoint(api_base: &str, path: &str, setting: &'static str) -> Result<Url, PipelineError> {
    Url::parse(api_base)
        .and_then(|base| base.join(path))
        .map_err(|e| PipelineError::ConfigFetch {
            name: setting.to_string(),
            reason: e.to_string(),
        })
}

/// Shares the article on LinkedIn as a UGC post.
pub struct LinkedInNotifier {
    client: reqwest::Client,
    endpoint: Url,
    token: String,
    author_urn: String,
}

impl LinkedInNotifier {
    pub fn new(
        client: reqwest::Client,
        api_base: &str,
        token: String,
        author_urn: String,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            client,
            endpoint: join_endpoint(api_base, "v2/ugcPosts", "linkedin_api_base")?,
            token,
            author_urn,
        })
    }
}

#[async_trait]
impl SocialNotifier for LinkedInNotifier {
    fn platform(&self) -> &'static str {
        "linkedin"
    }

    #[instrument(level = "info", skip_all)]
    async fn announce(&self, article: &PublishedArticle) -> Result<(), NotifyError> {
        let payload = json!({
            "author": self.author_urn,
            "lifecycleState": "PUBLISHED",
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": {
                        "text": format!("Check out my latest blog post: {}", article.title)
                    },
                    "shareMediaCategory": "ARTICLE",
                    "media": [
                        {
                            "status": "READY",
                            "description": {"text": "A fresh article, hot off the pipeline."},
                            "originalUrl": article.url,
                            "title": {"text": article.title}
                        }
                    ]
                }
            },
            "visibility": {"com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"}
        });

        post_expecting_created(
            &self.client,
            self.endpoint.clone(),
            &self.token,
            &payload,
            self.platform(),
        )
        .await
    }
}

/// Shares the article on X as a plain-text post.
pub struct XNotifier {
    client: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl XNotifier {
    pub fn new(
        client: reqwest::Client,
        api_base: &str,
        token: String,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            client,
            endpoint: join_endpoint(api_base, "2/tweets", "x_api_base")?,
            token,
        })
    }
}

#[async_trait]
impl SocialNotifier for XNotifier {
    fn platform(&self) -> &'static str {
        "x"
    }

    #[instrument(level = "info", skip_all)]
    async fn announce(&self, article: &PublishedArticle) -> Result<(), NotifyError> {
        let payload = json!({
            "text": format!("{} {}", article.title, article.url)
        });

        post_expecting_created(
            &self.client,
            self.endpoint.clone(),
            &self.token,
            &payload,
            self.platform(),
        )
        .await
    }
}

/// POST a JSON payload and treat anything but 201 as failure.
async fn post_expecting_created(
    client: &reqwest::Client,
    endpoint: Url,
    token: &str,
    payload: &serde_json::Value,
    platform: &'static str,
) -> Result<(), NotifyError> {
    let response = client
        .post(endpoint)
        .bearer_auth(token)
        .json(payload)
        .send()
        .await
        .map_err(|e| NotifyError {
            platform,
            reason: e.to_string(),
        })?;

    let status = response.status();
    if status != reqwest::StatusCode::CREATED {
        let body = response.text().await.unwrap_or_default();
        return Err(NotifyError {
            platform,
            reason: format!("status {status}: {}", truncate_for_log(&body, 300)),
        });
    }

    Ok(())
}
