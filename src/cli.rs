//! Command-line interface definitions.
//!
//! Every flag is optional and environment-backed, so the same binary works
//! as a scheduled Lambda (configured purely through environment variables)
//! and as an on-demand local run.

use clap::Parser;

use crate::config::{
    DEFAULT_GENERATION_API_BASE, DEFAULT_LINKEDIN_API_BASE, DEFAULT_PARAMETER_PREFIX,
    DEFAULT_PUBLISH_API_BASE, DEFAULT_X_API_BASE, Platform, Settings,
};

/// Runtime configuration for the article publisher.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Parameter-store prefix holding the credentials and topic catalog
    #[arg(long, env = "PARAMETER_PREFIX", default_value = DEFAULT_PARAMETER_PREFIX)]
    pub parameter_prefix: String,

    /// SNS topic ARN for status alerts (alerts are skipped when unset)
    #[arg(long, env = "ALERT_TOPIC_ARN")]
    pub alert_topic_arn: Option<String>,

    /// Social platforms to cross-post to, comma separated
    #[arg(
        long,
        env = "SOCIAL_PLATFORMS",
        value_enum,
        value_delimiter = ',',
        default_value = "linkedin"
    )]
    pub platforms: Vec<Platform>,

    /// Base URL of the OpenAI-compatible completions API
    #[arg(long, env = "GENERATION_API_BASE", default_value = DEFAULT_GENERATION_API_BASE)]
    pub generation_api_base: String,

    /// Base URL of the Medium API
    #[arg(long, env = "PUBLISH_API_BASE", default_value = DEFAULT_PUBLISH_API_BASE)]
    pub publish_api_base: String,

    /// Base URL of the LinkedIn API
    #[arg(long, env = "LINKEDIN_API_BASE", default_value = DEFAULT_LINKEDIN_API_BASE)]
    pub linkedin_api_base: String,

    /// Base URL of the X API
    #[arg(long, env = "X_API_BASE", default_value = DEFAULT_X_API_BASE)]
    pub x_api_base: String,
}

impl Cli {
    pub fn into_settings(self) -> Settings {
        Settings {
            parameter_prefix: self.parameter_prefix,
            alert_topic_arn: self.alert_topic_arn,
            platforms: self.platforms,
            generation_api_base: self.generation_api_base,
            publish_api_base: self.publish_api_base,
            linkedin_api_base: self.linkedin_api_base,
            x_api_base: self.x_api_base,
        }
    }
}
