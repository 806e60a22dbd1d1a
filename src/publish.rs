//! Publishing the generated article to Medium.
//!
//! One authenticated create-post request per invocation, fixed tag set,
//! public visibility. The platform answers 201 with the canonical article
//! URL under `data.url`; every other outcome (non-201 status, transport
//! failure, malformed 201 body) is logged here and reported to the caller
//! as `None` rather than an error; the pipeline decides that a missing
//! URL is fatal, this module only observes it.

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument};
use url::Url;

use crate::errors::PipelineError;
use crate::models::Article;
use crate::utils::truncate_for_log;

/// Tags attached to every published post.
const DEFAULT_TAGS: [&str; 3] = ["AWS", "Cloud Computing", "Technology"];

#[derive(Debug, Serialize)]
struct CreatePostRequest<'a> {
    title: &'a str,
    content: &'a str,
    #[serde(rename = "contentFormat")]
    content_format: &'a str,
    tags: Vec<&'a str>,
    #[serde(rename = "publishStatus")]
    publish_status: &'a str,
}

/// Client for the Medium publishing API.
pub struct MediumPublisher {
    client: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl MediumPublisher {
    pub fn new(
        client: reqwest::Client,
        api_base: &str,
        token: String,
        user_id: &str,
    ) -> Result<Self, PipelineError> {
        let endpoint = Url::parse(api_base)
            .and_then(|base| base.join(&format!("users/{user_id}/posts")))
            .map_err(|e| PipelineError::ConfigFetch {
                name: "publish_api_base".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint,
            token,
        })
    }

    /// Publish the article, returning the platform-assigned URL.
    ///
    /// `None` means the article was not published; the reason has already
    /// been logged. No error propagates from here.
    #[instrument(level = "info", skip_all, fields(title = %article.title))]
    pub async fn publish(&self, article: &Article) -> Option<String> {
        let payload = CreatePostRequest {
            title: &article.title,
            content: &article.html,
            content_format: "html",
            tags: DEFAULT_TAGS.to_vec(),
            publish_status: "public",
        };

        let response = match self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Failed to reach publishing platform");
                return None;
            }
        };

        let status = response.status();
        if status != reqwest::StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            error!(
                %status,
                body = %truncate_for_log(&body, 300),
                "Failed to publish article"
            );
            return None;
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Publishing platform returned unreadable body");
                return None;
            }
        };

        match body["data"]["url"].as_str() {
            Some(url) => {
                info!(%url, "Successfully published article");
                Some(url.to_string())
            }
            None => {
                error!(
                    body = %truncate_for_log(&body.to_string(), 300),
                    "Publishing platform response missing data.url"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Topic;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn article() -> Article {
        Article {
            topic: Topic("AWS Lambda".to_string()),
            html: "<html><title>All About Lambda</title><body>...</body></html>".to_string(),
            title: "All About Lambda".to_string(),
        }
    }

    fn publisher(server: &MockServer) -> MediumPublisher {
        MediumPublisher::new(
            reqwest::Client::new(),
            &server.uri(),
            "medium-token".to_string(),
            "user-123",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_created_response_yields_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/user-123/posts"))
            .and(header("authorization", "Bearer medium-token"))
            .and(body_partial_json(json!({
                "title": "All About Lambda",
                "contentFormat": "html",
                "publishStatus": "public"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": {"url": "https://example.com/p/123"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = publisher(&server).publish(&article()).await;
        assert_eq!(url.as_deref(), Some("https://example.com/p/123"));
    }

    #[tokio::test]
    async fn test_non_created_statuses_yield_none() {
        for status in [400u16, 401, 403, 500] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/users/user-123/posts"))
                .respond_with(
                    ResponseTemplate::new(status).set_body_string("denied"),
                )
                .mount(&server)
                .await;

            assert_eq!(publisher(&server).publish(&article()).await, None);
        }
    }

    #[tokio::test]
    async fn test_created_with_malformed_body_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/user-123/posts"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {}})))
            .mount(&server)
            .await;

        assert_eq!(publisher(&server).publish(&article()).await, None);
    }

    #[tokio::test]
    async fn test_unreachable_platform_yields_none() {
        // Nothing listens here; the request fails at the transport level.
        let publisher = MediumPublisher::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1/",
            "medium-token".to_string(),
            "user-123",
        )
        .unwrap();

        assert_eq!(publisher.publish(&article()).await, None);
    }
}
