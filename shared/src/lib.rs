//! Shared library for the bot framework Lambda functions.
//!
//! This crate provides the dialog engine, locale handling, wire types, and
//! AWS clients used across the sample bots, the Lex dispatcher, and the
//! provisioning custom resources.

pub mod cfn;
pub mod config;
pub mod dialog;
pub mod error;
pub mod forecast;
pub mod lex;
pub mod locale;
pub mod poll;
pub mod storage;

pub use config::{DispatcherConfig, FeedbackBotConfig, LexBotConfig, WeatherConfig};
pub use dialog::{advance, ConversationPayload, DialogScript, SlotAnswer, StepperReply};
pub use error::{Error, Result};
pub use forecast::{Forecast, Provider, WeatherClient};
pub use locale::Locale;
