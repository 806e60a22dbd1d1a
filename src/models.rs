//! Data models for the article publishing pipeline.
//!
//! This module defines the core data structures that flow through one
//! invocation:
//! - [`Topic`]: the subject chosen for the article
//! - [`Article`]: the generated HTML body plus its extracted title
//! - [`PublishedArticle`]: the article once the publishing platform has
//!   assigned it a canonical URL
//! - [`NotificationOutcome`]: the per-platform result of the social fan-out
//! - [`InvocationResponse`]: the structured `{statusCode, body}` terminal
//!   result returned to the invoker

use serde::{Deserialize, Serialize};
use std::fmt;

/// The subject of the article, chosen once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic(pub String);

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A generated blog article.
///
/// Created by the content generator with an empty `title`; the title
/// extractor fills `title` in from the first `<title>` element of `html`.
/// An empty title after extraction is tolerated (the document simply had
/// no title element).
#[derive(Debug)]
pub struct Article {
    /// The topic the article was generated for.
    pub topic: Topic,
    /// The generated HTML body, sent verbatim to the publishing platform.
    pub html: String,
    /// Title text extracted from `html`; empty if none was present.
    pub title: String,
}

/// An article after successful publication.
///
/// Only constructed once the publishing platform returned a canonical URL;
/// the social fan-out operates on this type, which guarantees notifiers
/// never run for an unpublished article.
#[derive(Debug, Clone)]
pub struct PublishedArticle {
    pub title: String,
    pub url: String,
}

/// The result of one social platform notification attempt.
#[derive(Debug, Clone)]
pub struct NotificationOutcome {
    /// Platform identifier, e.g. `"linkedin"`.
    pub platform: &'static str,
    pub delivered: bool,
    /// Failure detail when `delivered` is false.
    pub detail: Option<String>,
}

/// The structured terminal result of an invocation.
///
/// Serialized back to the Lambda invoker (and pretty-printed in local runs):
/// 200 on full success, 400 on missing configuration, 500 on any other
/// fatal step failure, with a human-readable message in `body`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }

    pub fn error(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }
}
