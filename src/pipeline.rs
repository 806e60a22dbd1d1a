//! The invocation pipeline.
//!
//! One invocation walks a single path: resolve credentials, choose a
//! topic, generate the article, extract its title, publish it, fan the
//! promotional message out to the social platforms, and report. Each
//! step's output feeds the next; a fatal error short-circuits the rest,
//! and every terminal outcome (success or failure) produces exactly one
//! status alert and a structured `{statusCode, body}` result.
//!
//! Nothing in here retries. Every external call is attempted exactly once
//! per invocation.

use std::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::alert::{self, AlertSink};
use crate::config::{Credentials, SecretStore, Settings};
use crate::errors::PipelineError;
use crate::generate::ArticleGenerator;
use crate::models::{InvocationResponse, PublishedArticle};
use crate::notify::{build_notifiers, fan_out};
use crate::publish::MediumPublisher;
use crate::title::extract_title;
use crate::topics::{TopicCatalog, choose_topic};

/// Run one invocation end to end and produce its terminal result.
///
/// Fatal errors are logged, alerted once, and mapped to a 400 (missing
/// configuration) or 500 (any other step failure) response; they never
/// propagate as panics or `Err` to the invoker.
#[instrument(level = "info", skip_all)]
pub async fn run(
    store: &dyn SecretStore,
    catalog: &dyn TopicCatalog,
    alerts: &dyn AlertSink,
    settings: &Settings,
) -> InvocationResponse {
    let start = Instant::now();

    let response = match execute(store, catalog, settings).await {
        Ok(summary) => {
            info!(%summary, "Article pipeline completed");
            alert::emit(alerts, &summary).await;
            InvocationResponse::ok(summary)
        }
        Err(e) => {
            error!(error = %e, "Article pipeline failed");
            let message = format!("article pipeline failed: {e}");
            alert::emit(alerts, &message).await;
            InvocationResponse::error(e.status_code(), message)
        }
    };

    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        status = response.status_code,
        "Invocation complete"
    );
    response
}

/// The fatal-error path of the pipeline; returns the success summary.
async fn execute(
    store: &dyn SecretStore,
    catalog: &dyn TopicCatalog,
    settings: &Settings,
) -> Result<String, PipelineError> {
    let credentials = Credentials::load(store, settings).await?;

    // One connection pool for the whole invocation; all clients are built
    // up front so endpoint misconfiguration fails before any request.
    let client = reqwest::Client::new();
    let generator = ArticleGenerator::new(
        client.clone(),
        &settings.generation_api_base,
        credentials.generation_api_key.clone(),
    )?;
    let publisher = MediumPublisher::new(
        client.clone(),
        &settings.publish_api_base,
        credentials.publish_token.clone(),
        &credentials.publish_user_id,
    )?;
    let notifiers = build_notifiers(&client, settings, &credentials)?;

    let topic = choose_topic(catalog).await?;
    let mut article = generator.generate(&topic).await?;
    info!(topic = %article.topic, bytes = article.html.len(), "Generated article");

    article.title = extract_title(&article.html);
    if article.title.is_empty() {
        warn!("Generated article has no <title> element; publishing without a title");
    }

    let url = publisher
        .publish(&article)
        .await
        .ok_or(PipelineError::Publish)?;
    let published = PublishedArticle {
        title: article.title.clone(),
        url,
    };

    let outcomes = fan_out(&notifiers, &published).await;
    let delivered = outcomes.iter().filter(|o| o.delivered).count();

    Ok(format!(
        "published \"{}\" at {}; notified {}/{} platform(s)",
        published.title,
        published.url,
        delivered,
        outcomes.len()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::testing::CapturingAlertSink;
    use crate::config::Platform;
    use crate::config::testing::MemorySecretStore;
    use crate::topics::testing::StaticTopicCatalog;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATED_HTML: &str =
        "<html><title>All About Lambda</title><body>...</body></html>";

    fn settings(
        generation: &MockServer,
        medium: &MockServer,
        linkedin: &MockServer,
        x: &MockServer,
    ) -> Settings {
        Settings {
            platforms: vec![Platform::Linkedin, Platform::X],
            generation_api_base: generation.uri(),
            publish_api_base: medium.uri(),
            linkedin_api_base: linkedin.uri(),
            x_api_base: x.uri(),
            ..Settings::default()
        }
    }

    fn secrets(settings: &Settings) -> MemorySecretStore {
        MemorySecretStore::new(&[
            (settings.parameter("openai_api_token").as_str(), "sk-test"),
            (settings.parameter("medium_api_token").as_str(), "medium-token"),
            (settings.parameter("medium_user_id").as_str(), "user-123"),
            (
                settings.parameter("linkedin_access_token").as_str(),
                "li-token",
            ),
            (
                settings.parameter("linkedin_author_urn").as_str(),
                "urn:li:person:abc",
            ),
            (settings.parameter("x_access_token").as_str(), "x-token"),
        ])
    }

    async fn mount_generation(server: &MockServer, html: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": html}}]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_end_to_end_success() {
        let generation = MockServer::start().await;
        let medium = MockServer::start().await;
        let linkedin = MockServer::start().await;
        let x = MockServer::start().await;

        mount_generation(&generation, GENERATED_HTML).await;

        // The publish request must carry the exact extracted title.
        Mock::given(method("POST"))
            .and(path("/users/user-123/posts"))
            .and(body_partial_json(json!({"title": "All About Lambda"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": {"url": "https://example.com/p/123"}
            })))
            .expect(1)
            .mount(&medium)
            .await;

        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&linkedin)
            .await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .and(body_partial_json(json!({
                "text": "All About Lambda https://example.com/p/123"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&x)
            .await;

        let settings = settings(&generation, &medium, &linkedin, &x);
        let store = secrets(&settings);
        let catalog = StaticTopicCatalog {
            topics: vec!["AWS Lambda"],
        };
        let alerts = CapturingAlertSink::new();

        let response = run(&store, &catalog, &alerts, &settings).await;
        assert_eq!(response.status_code, 200);
        assert!(response.body.contains("All About Lambda"));
        assert!(response.body.contains("https://example.com/p/123"));
        assert!(response.body.contains("2/2"));

        // Every notifier saw the published URL.
        let linkedin_requests = linkedin.received_requests().await.unwrap();
        let body: serde_json::Value =
            serde_json::from_slice(&linkedin_requests[0].body).unwrap();
        assert_eq!(
            body["specificContent"]["com.linkedin.ugc.ShareContent"]["media"][0]["originalUrl"],
            "https://example.com/p/123"
        );

        let messages = alerts.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("published \"All About Lambda\""));
    }

    #[tokio::test]
    async fn test_empty_topic_catalog_halts_before_generation() {
        let generation = MockServer::start().await;
        let medium = MockServer::start().await;
        let linkedin = MockServer::start().await;
        let x = MockServer::start().await;

        // The generator must never be reached.
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&generation)
            .await;

        let settings = settings(&generation, &medium, &linkedin, &x);
        let store = secrets(&settings);
        let catalog = StaticTopicCatalog { topics: vec![] };
        let alerts = CapturingAlertSink::new();

        let response = run(&store, &catalog, &alerts, &settings).await;
        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("topic"));
        assert_eq!(alerts.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_configuration_yields_400_and_still_alerts() {
        let generation = MockServer::start().await;
        let medium = MockServer::start().await;
        let linkedin = MockServer::start().await;
        let x = MockServer::start().await;

        let settings = settings(&generation, &medium, &linkedin, &x);
        let store = MemorySecretStore::new(&[]);
        let catalog = StaticTopicCatalog {
            topics: vec!["AWS Lambda"],
        };
        let alerts = CapturingAlertSink::new();

        let response = run(&store, &catalog, &alerts, &settings).await;
        assert_eq!(response.status_code, 400);
        assert!(response.body.contains("openai_api_token"));

        let messages = alerts.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("article pipeline failed"));
    }

    #[tokio::test]
    async fn test_publish_failure_is_fatal_and_skips_notifiers() {
        let generation = MockServer::start().await;
        let medium = MockServer::start().await;
        let linkedin = MockServer::start().await;
        let x = MockServer::start().await;

        mount_generation(&generation, GENERATED_HTML).await;
        Mock::given(method("POST"))
            .and(path("/users/user-123/posts"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .expect(1)
            .mount(&medium)
            .await;
        // No article URL means nothing to promote.
        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&linkedin)
            .await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&x)
            .await;

        let settings = settings(&generation, &medium, &linkedin, &x);
        let store = secrets(&settings);
        let catalog = StaticTopicCatalog {
            topics: vec!["AWS Lambda"],
        };
        let alerts = CapturingAlertSink::new();

        let response = run(&store, &catalog, &alerts, &settings).await;
        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("no article URL"));
        assert_eq!(alerts.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_fail_the_invocation() {
        let generation = MockServer::start().await;
        let medium = MockServer::start().await;
        let linkedin = MockServer::start().await;
        let x = MockServer::start().await;

        mount_generation(&generation, GENERATED_HTML).await;
        Mock::given(method("POST"))
            .and(path("/users/user-123/posts"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": {"url": "https://example.com/p/123"}
            })))
            .mount(&medium)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&linkedin)
            .await;
        // X must still be attempted after LinkedIn fails.
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&x)
            .await;

        let settings = settings(&generation, &medium, &linkedin, &x);
        let store = secrets(&settings);
        let catalog = StaticTopicCatalog {
            topics: vec!["AWS Lambda"],
        };
        let alerts = CapturingAlertSink::new();

        let response = run(&store, &catalog, &alerts, &settings).await;
        assert_eq!(response.status_code, 200);
        assert!(response.body.contains("1/2"));
    }

    #[tokio::test]
    async fn test_untitled_article_still_publishes() {
        let generation = MockServer::start().await;
        let medium = MockServer::start().await;
        let linkedin = MockServer::start().await;
        let x = MockServer::start().await;

        mount_generation(&generation, "<html><body>no title here</body></html>").await;
        Mock::given(method("POST"))
            .and(path("/users/user-123/posts"))
            .and(body_partial_json(json!({"title": ""})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": {"url": "https://example.com/p/456"}
            })))
            .expect(1)
            .mount(&medium)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&linkedin)
            .await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&x)
            .await;

        let settings = settings(&generation, &medium, &linkedin, &x);
        let store = secrets(&settings);
        let catalog = StaticTopicCatalog {
            topics: vec!["AWS Lambda"],
        };
        let alerts = CapturingAlertSink::new();

        let response = run(&store, &catalog, &alerts, &settings).await;
        assert_eq!(response.status_code, 200);
    }
}
