pub mod config;
pub mod logging_system;

pub use config::{Cli, Command, ConfigError, ErrorLogConfig, LogLevel};
pub use logging_system::{LoggingError, setup_logging};

use crate::codec::{ErrorCodec, XmlErrorCodec};
use crate::domain::ErrorRecord;
use crate::error_log::ErrorLog;
use crate::sender::HttpWebClientFactory;
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info};

pub struct App {
    error_log: ErrorLog,
    command: Command,
}

impl App {
    pub fn from_args<I, T>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args)?;
        Self::from_cli(cli)
    }

    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let settings = cli.settings()?;
        let config = ErrorLogConfig::from_map(Some(&settings))?;
        let factory = Arc::new(HttpWebClientFactory::new(cli.client_config()));
        let error_log = ErrorLog::from_config(config, factory)?;

        Ok(Self {
            error_log,
            command: cli.command,
        })
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.error_log
    }

    /// Runs the command and returns what it prints.
    pub async fn run(&self) -> anyhow::Result<String> {
        match &self.command {
            Command::Log {
                xml_file,
                type_name,
                message,
            } => {
                let record = match xml_file {
                    Some(path) => {
                        let xml = std::fs::read_to_string(path)
                            .with_context(|| format!("reading {}", path.display()))?;
                        XmlErrorCodec::new()
                            .decode(&xml)
                            .with_context(|| format!("decoding {}", path.display()))?
                    }
                    None => ErrorRecord::new(type_name.clone(), message.clone()),
                };
                Ok(self.error_log.log(&record).await?)
            }
            Command::Get { id } => {
                let entry = self.error_log.get_error(id).await?;
                Ok(serde_json::to_string_pretty(&entry)?)
            }
            Command::List {
                page_index,
                page_size,
            } => {
                let mut entries = Vec::new();
                let count = self
                    .error_log
                    .get_errors(*page_index, *page_size, &mut entries)
                    .await?;
                debug!("Listed {} errors", count);
                Ok(serde_json::to_string_pretty(&entries)?)
            }
        }
    }
}

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Main entry point for the command-line tool
pub async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level, cli.json_logs)?;

    info!("Starting elmah-io v{}", get_version());
    let app = App::from_cli(cli)?;

    let cancel = app.error_log().cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let output = app.run().await?;
    println!("{output}");
    Ok(())
}
