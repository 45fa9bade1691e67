mod cli;
mod validation;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration: the error log needs a settings mapping")]
    MissingConfiguration,
    #[error("Missing LogId: specify the log's id, e.g. LogId = \"98895825-2516-43de-b514-ffb39ea89a65\"")]
    MissingLogId,
    #[error("Invalid LogId '{0}': expected a UUID such as 98895825-2516-43de-b514-ffb39ea89a65")]
    InvalidLogId(String),
    #[error("Invalid URL '{0}': specify an absolute URL, or leave Url out to use the elmah.io backend")]
    InvalidUrl(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

pub use cli::{Cli, Command};
pub use validation::{
    APPLICATION_NAME_KEY, DEFAULT_URL, ErrorLogConfig, LOG_ID_KEY, URL_KEY, load_settings_file,
};
