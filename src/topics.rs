//! Topic catalog listing and random selection.
//!
//! Candidate subjects live as parameters under `{prefix}/topics` so new
//! topics can be added without a deploy. The catalog is listed in full,
//! following pagination until the source signals no more pages, and one
//! candidate is chosen uniformly at random per invocation. An empty or
//! unreachable catalog is fatal: there is nothing to write about.

use async_trait::async_trait;
use aws_sdk_ssm::error::DisplayErrorContext;
use rand::{Rng, rng};
use tracing::info;

use crate::errors::PipelineError;
use crate::models::Topic;

/// Enumerates candidate topic identifiers from an external catalog.
#[async_trait]
pub trait TopicCatalog: Send + Sync {
    async fn list(&self) -> Result<Vec<Topic>, PipelineError>;
}

/// [`TopicCatalog`] backed by an SSM parameter path.
#[derive(Debug, Clone)]
pub struct SsmTopicCatalog {
    client: aws_sdk_ssm::Client,
    path: String,
}

impl SsmTopicCatalog {
    pub fn new(client: aws_sdk_ssm::Client, path: String) -> Self {
        Self { client, path }
    }
}

#[async_trait]
impl TopicCatalog for SsmTopicCatalog {
    async fn list(&self) -> Result<Vec<Topic>, PipelineError> {
        let mut topics = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .get_parameters_by_path()
                .path(&self.path)
                .recursive(true)
                .with_decryption(true)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| {
                    PipelineError::TopicSource(format!("{}", DisplayErrorContext(&e)))
                })?;

            for parameter in response.parameters() {
                if let Some(value) = parameter.value() {
                    topics.push(Topic(value.to_string()));
                }
            }

            next_token = response.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        info!(count = topics.len(), path = %self.path, "Listed topic catalog");
        Ok(topics)
    }
}

/// List the catalog and pick one topic uniformly at random.
pub async fn choose_topic(catalog: &dyn TopicCatalog) -> Result<Topic, PipelineError> {
    let mut topics = catalog.list().await?;
    if topics.is_empty() {
        return Err(PipelineError::TopicSource(
            "catalog returned zero candidates".to_string(),
        ));
    }

    let index = rng().random_range(0..topics.len());
    let topic = topics.swap_remove(index);
    info!(%topic, candidates = topics.len() + 1, "Chose article topic");
    Ok(topic)
}
