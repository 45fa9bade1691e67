use super::ConfigError;
use std::collections::HashMap;
use std::path::Path;
use url::Url;
use uuid::Uuid;

pub const LOG_ID_KEY: &str = "LogId";
pub const URL_KEY: &str = "Url";
pub const APPLICATION_NAME_KEY: &str = "ApplicationName";

/// Backend used when the settings carry no `Url`.
pub const DEFAULT_URL: &str = "http://elmahio.azurewebsites.net/";

/// Validated, immutable settings of an error log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLogConfig {
    log_id: Uuid,
    base_url: Url,
    application_name: Option<String>,
}

impl ErrorLogConfig {
    /// Settings for `log_id` against the default backend.
    pub fn new(log_id: &str) -> Result<Self, ConfigError> {
        Self::from_map(Some(&HashMap::from([(LOG_ID_KEY.to_string(), log_id)])))
    }

    /// Validates a settings mapping.
    ///
    /// Checks run in a fixed order and stop at the first failure: the mapping
    /// must be present, must contain `LogId`, `LogId` must be a UUID, and
    /// `Url`, when present, must be an absolute URL.
    pub fn from_map<V>(settings: Option<&HashMap<String, V>>) -> Result<Self, ConfigError>
    where
        V: AsRef<str>,
    {
        let settings = settings.ok_or(ConfigError::MissingConfiguration)?;

        let raw_log_id = settings
            .get(LOG_ID_KEY)
            .ok_or(ConfigError::MissingLogId)?
            .as_ref();
        let log_id = Uuid::parse_str(raw_log_id.trim())
            .map_err(|_| ConfigError::InvalidLogId(raw_log_id.to_string()))?;

        let base_url = match settings.get(URL_KEY) {
            Some(raw_url) => parse_base_url(raw_url.as_ref())?,
            None => parse_base_url(DEFAULT_URL)?,
        };

        let application_name = settings
            .get(APPLICATION_NAME_KEY)
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(Self {
            log_id,
            base_url,
            application_name,
        })
    }

    /// Validates settings read from a TOML table. Non-string values are
    /// used in their TOML text form.
    pub fn from_toml_table(table: &toml::Table) -> Result<Self, ConfigError> {
        Self::from_map(Some(&stringify_table(table)))
    }

    pub fn log_id(&self) -> &Uuid {
        &self.log_id
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn application_name(&self) -> Option<&str> {
        self.application_name.as_deref()
    }
}

/// Reads a TOML settings file into a flat string mapping.
pub fn load_settings_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let table: toml::Table = toml::from_str(&content)?;
    Ok(stringify_table(&table))
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl(raw.to_string());
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if url.cannot_be_a_base() {
        return Err(invalid());
    }
    Ok(url)
}

fn stringify_table(table: &toml::Table) -> HashMap<String, String> {
    table
        .iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}
