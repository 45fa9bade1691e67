use super::validation::{APPLICATION_NAME_KEY, LOG_ID_KEY, URL_KEY, load_settings_file};
use super::{ConfigError, LogLevel};
use crate::sender::ClientConfig;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Log and browse errors in an elmah.io log", long_about = None)]
pub struct Cli {
    /// Id of the log to write to and read from
    #[arg(long, env = "ELMAH_IO_LOG_ID")]
    pub log_id: Option<String>,

    /// Backend base URL (defaults to the elmah.io backend)
    #[arg(long, env = "ELMAH_IO_URL")]
    pub url: Option<String>,

    /// Application name stamped on logged errors that carry none
    #[arg(long, env = "ELMAH_IO_APPLICATION_NAME")]
    pub application_name: Option<String>,

    /// TOML settings file with LogId, Url and ApplicationName keys
    #[arg(long, env = "ELMAH_IO_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "ELMAH_IO_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[arg(long, env = "JSON_LOGS")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log an error and print the id the backend assigned to it
    Log {
        /// Error XML document to submit
        #[arg(long, conflicts_with_all = ["type_name", "message"])]
        xml_file: Option<PathBuf>,

        /// Error type for a new error record
        #[arg(long = "type", default_value = "Error")]
        type_name: String,

        /// Message for a new error record
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Print one logged error as JSON
    Get {
        /// Id assigned by the backend
        id: String,
    },
    /// Print a page of logged errors as JSON
    List {
        /// Zero-based page index
        #[arg(long, default_value = "0")]
        page_index: usize,

        /// Errors per page
        #[arg(long, default_value = "15")]
        page_size: usize,
    },
}

impl Cli {
    /// Settings mapping for the error log: the settings file first, then
    /// command line and environment values on top.
    pub fn settings(&self) -> Result<HashMap<String, String>, ConfigError> {
        let mut settings = match &self.config_file {
            Some(path) => load_settings_file(path)?,
            None => HashMap::new(),
        };

        let overrides = [
            (LOG_ID_KEY, &self.log_id),
            (URL_KEY, &self.url),
            (APPLICATION_NAME_KEY, &self.application_name),
        ];
        for (key, value) in overrides {
            if let Some(value) = value {
                settings.insert(key.to_string(), value.clone());
            }
        }

        Ok(settings)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            ..ClientConfig::default()
        }
    }
}
