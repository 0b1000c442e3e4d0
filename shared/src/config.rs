//! Configuration for the Lambda functions.
//!
//! Every handler loads its configuration once at cold start and passes an
//! immutable struct around, instead of reading the environment per request.

use std::env;

use crate::forecast::Provider;
use crate::{Error, Result};

/// Configuration for the feedback-collecting sample bot.
#[derive(Debug, Clone)]
pub struct FeedbackBotConfig {
    /// DynamoDB table for collected feedback. Persistence is skipped when unset.
    pub table_name: Option<String>,
}

impl FeedbackBotConfig {
    pub fn from_env() -> Self {
        Self {
            table_name: env::var("DDB_TABLE_NAME").ok(),
        }
    }
}

/// Configuration for the weather forecast handlers.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// Which forecast API to call. Stubbed when `API_PROVIDER` is unset.
    pub provider: Provider,
    /// SSM parameter holding the provider API key.
    pub api_key_parameter: Option<String>,
}

impl WeatherConfig {
    pub fn from_env() -> Result<Self> {
        let provider = match env::var("API_PROVIDER") {
            Ok(name) => Provider::parse(&name)?,
            Err(_) => Provider::Stub,
        };

        Ok(Self {
            provider,
            api_key_parameter: env::var("SSM_REFERENCE_TO_API_KEY").ok(),
        })
    }
}

/// Configuration for the Lex fulfillment dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// DynamoDB table for the LeaveFeedback intent.
    pub feedback_table: Option<String>,
    /// DynamoDB table for placed pizza orders.
    pub pizza_orders_table: Option<String>,
    /// Secondary index on the orders table, keyed by customer id.
    pub pizza_orders_index: Option<String>,
    /// When the deployment is child directed, service responses carrying
    /// user data are kept out of the logs.
    pub child_directed: bool,
    pub weather: WeatherConfig,
}

impl DispatcherConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            feedback_table: env::var("FEEDBACK_TABLE").ok(),
            pizza_orders_table: env::var("PIZZA_ORDERS_TABLE").ok(),
            pizza_orders_index: env::var("PIZZA_ORDERS_INDEX").ok(),
            child_directed: env::var("childDirected").map(|v| v == "Yes").unwrap_or(true),
            weather: WeatherConfig::from_env()?,
        })
    }
}

/// Configuration for the Lex bot provisioning custom resource.
#[derive(Debug, Clone)]
pub struct LexBotConfig {
    /// Which brain backs the deployment; only "Amazon Lex" provisions a bot.
    pub bot_brain: String,
    /// Human-readable bot language ("English", "French", ...).
    pub bot_language: String,
    pub bot_name: String,
    pub bot_role_arn: String,
    pub child_directed: bool,
}

impl LexBotConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bot_brain: require("botBrain")?,
            bot_language: require("botLanguage")?,
            bot_name: require("botName")?,
            bot_role_arn: require("botRole")?,
            child_directed: env::var("childDirected").map(|v| v == "Yes").unwrap_or(true),
        })
    }

    pub fn uses_lex(&self) -> bool {
        self.bot_brain == "Amazon Lex"
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("{name} not set")))
}
