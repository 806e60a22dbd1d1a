//! # Article Publisher
//!
//! A scheduled pipeline that writes a blog article with an LLM, publishes
//! it to Medium, and cross-posts a promotional message to social platforms.
//!
//! ## Pipeline
//!
//! 1. **Resolve**: fetch the credential bundle from SSM Parameter Store
//! 2. **Select**: list the topic catalog and pick one subject at random
//! 3. **Generate**: ask an OpenAI-compatible API for an HTML article
//! 4. **Extract**: pull the document title out of the generated markup
//! 5. **Publish**: create the Medium post, capturing the article URL
//! 6. **Notify**: fan the link out to the configured social platforms
//! 7. **Alert**: emit a one-line status message to SNS, success or failure
//!
//! ## Usage
//!
//! Deployed behind a cron-style EventBridge schedule, the binary serves the
//! Lambda runtime. Run locally (any machine with AWS credentials) it
//! executes a single invocation and prints the structured result:
//!
//! ```sh
//! article_publisher --platforms linkedin,x \
//!     --alert-topic-arn arn:aws:sns:us-east-1:123456789012:article-publisher
//! ```

use clap::Parser;
use lambda_runtime::{LambdaEvent, service_fn};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod alert;
mod cli;
mod config;
mod errors;
mod generate;
mod models;
mod notify;
mod pipeline;
mod publish;
mod title;
mod topics;
mod utils;

use alert::{AlertSink, NullAlertSink, SnsAlertSink};
use cli::Cli;
use config::SsmSecretStore;
use topics::SsmTopicCatalog;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("article_publisher starting up");

    let args = Cli::parse();
    let settings = args.into_settings();
    debug!(?settings, "Parsed runtime settings");

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = SsmSecretStore::new(aws_sdk_ssm::Client::new(&aws_config));
    let catalog = SsmTopicCatalog::new(
        aws_sdk_ssm::Client::new(&aws_config),
        settings.topics_path(),
    );
    let alerts: Box<dyn AlertSink> = match &settings.alert_topic_arn {
        Some(arn) => Box::new(SnsAlertSink::new(
            aws_sdk_sns::Client::new(&aws_config),
            arn.clone(),
        )),
        None => Box::new(NullAlertSink),
    };

    if std::env::var("AWS_LAMBDA_RUNTIME_API").is_ok() {
        info!("Lambda runtime detected; serving invocations");
        let store = &store;
        let catalog = &catalog;
        let alerts = &*alerts;
        let settings = &settings;
        lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
            // Scheduled and on-demand invocations both send an empty payload.
            debug!(payload = %event.payload, "Received invocation event");
            Ok::<_, lambda_runtime::Error>(pipeline::run(store, catalog, alerts, settings).await)
        }))
        .await
    } else {
        info!("No Lambda runtime detected; running one local invocation");
        let response = pipeline::run(&store, &catalog, alerts.as_ref(), &settings).await;
        println!("{}", serde_json::to_string_pretty(&response)?);
        if response.status_code != 200 {
            std::process::exit(1);
        }
        Ok(())
    }
}
