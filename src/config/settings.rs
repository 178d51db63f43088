//! Validated connector configuration

use super::Properties;
use super::properties::{
    FILTER_MODE, INDEX_NAME, INSTALL_PATH, MAX_OUTPUT, OUTPUT_FORMAT, PASSWORD, USERNAME,
};
use crate::error::{ConfigError, ConfigResult};

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Format the search tool converts exported events into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    Raw,
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub const ALLOWED: &'static [&'static str] = &["raw", "csv", "json"];

    /// Value passed to `-output`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// File extension used when emitted content is written to disk
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Raw => "log",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Raw => "text/plain",
            Self::Csv => "text/csv",
            Self::Json => "application/json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// How the index name and time bounds combine into the search filter
///
/// `Overwrite` keeps the historical behavior where each later bound replaces
/// the whole filter. `Conjunctive` keeps all three conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    Overwrite,
    Conjunctive,
}

impl FilterMode {
    pub const ALLOWED: &'static [&'static str] = &["overwrite", "conjunctive"];
}

impl FromStr for FilterMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "conjunctive" => Ok(Self::Conjunctive),
            _ => Err(()),
        }
    }
}

/// A sensitive string that never prints its value
///
/// `Debug` and `Display` both render `***`. Use [`Secret::expose`] only where
/// the cleartext is genuinely needed (building the command line).
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub const MASK: &'static str = "***";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace every occurrence of the secret in `text` with the mask
    pub fn scrub(&self, text: &str) -> String {
        if self.0.is_empty() {
            return text.to_string();
        }
        text.replace(&self.0, Self::MASK)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::MASK)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::MASK)
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Secret)
    }
}

/// Immutable, validated extraction parameters
///
/// Built once when a schedule starts and shared read-only by every cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    install_path: String,
    index: String,
    output_format: OutputFormat,
    max_output: Option<u64>,
    earliest: Option<String>,
    latest: Option<String>,
    username: Option<String>,
    password: Option<Secret>,
    filter_mode: FilterMode,
}

impl Configuration {
    /// Start building a configuration from the two required properties
    pub fn builder(install_path: impl Into<String>, index: impl Into<String>) -> ConfigurationBuilder {
        ConfigurationBuilder::new(install_path, index)
    }

    /// Validate raw host properties
    ///
    /// # Errors
    /// Returns a [`ConfigError`] naming the first offending property.
    pub fn from_properties(props: &Properties) -> ConfigResult<Self> {
        let install_path = required(INSTALL_PATH.name, props.install_path.as_deref())?;
        let index = required(INDEX_NAME.name, props.index.as_deref())?;

        let mut builder = ConfigurationBuilder::new(install_path, index);

        if let Some(format) = optional(props.output_format.as_deref()) {
            builder = builder.output_format(OutputFormat::from_str(format).map_err(|_| {
                ConfigError::InvalidValue {
                    field: OUTPUT_FORMAT.name,
                    value: format.to_string(),
                    expected: "one of raw, csv, json",
                }
            })?);
        }

        if let Some(max) = optional(props.max_output.as_deref()) {
            let parsed = max
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    field: MAX_OUTPUT.name,
                    value: max.to_string(),
                    expected: "a positive integer",
                })?;
            builder = builder.max_output(parsed);
        }

        if let Some(mode) = optional(props.filter_mode.as_deref()) {
            builder = builder.filter_mode(FilterMode::from_str(mode).map_err(|_| {
                ConfigError::InvalidValue {
                    field: FILTER_MODE.name,
                    value: mode.to_string(),
                    expected: "one of overwrite, conjunctive",
                }
            })?);
        }

        if let Some(earliest) = optional(props.earliest.as_deref()) {
            builder = builder.earliest(earliest);
        }
        if let Some(latest) = optional(props.latest.as_deref()) {
            builder = builder.latest(latest);
        }
        if let Some(username) = optional(props.username.as_deref()) {
            builder = builder.username(username);
        }
        if let Some(password) = props.password.as_ref().filter(|p| !p.is_empty()) {
            builder = builder.password(password.clone());
        }

        builder.build()
    }

    pub fn install_path(&self) -> &str {
        &self.install_path
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn max_output(&self) -> Option<u64> {
        self.max_output
    }

    pub fn earliest(&self) -> Option<&str> {
        self.earliest.as_deref()
    }

    pub fn latest(&self) -> Option<&str> {
        self.latest.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&Secret> {
        self.password.as_ref()
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }
}

/// Builder for [`Configuration`]
#[derive(Debug, Clone)]
pub struct ConfigurationBuilder {
    install_path: String,
    index: String,
    output_format: OutputFormat,
    max_output: Option<u64>,
    earliest: Option<String>,
    latest: Option<String>,
    username: Option<String>,
    password: Option<Secret>,
    filter_mode: FilterMode,
}

impl ConfigurationBuilder {
    pub fn new(install_path: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            install_path: install_path.into(),
            index: index.into(),
            output_format: OutputFormat::default(),
            max_output: None,
            earliest: None,
            latest: None,
            username: None,
            password: None,
            filter_mode: FilterMode::default(),
        }
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn max_output(mut self, max: u64) -> Self {
        self.max_output = Some(max);
        self
    }

    pub fn earliest(mut self, earliest: impl Into<String>) -> Self {
        self.earliest = Some(earliest.into());
        self
    }

    pub fn latest(mut self, latest: impl Into<String>) -> Self {
        self.latest = Some(latest.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<Secret>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    /// Validate and freeze the configuration
    ///
    /// # Errors
    /// - [`ConfigError::Blank`] if the install path or index name is blank
    /// - [`ConfigError::InvalidValue`] if max output is zero
    /// - [`ConfigError::MissingCredential`] if a username has no password
    pub fn build(self) -> ConfigResult<Configuration> {
        if self.install_path.trim().is_empty() {
            return Err(ConfigError::Blank {
                field: INSTALL_PATH.name,
            });
        }
        if self.index.trim().is_empty() {
            return Err(ConfigError::Blank {
                field: INDEX_NAME.name,
            });
        }
        if self.max_output == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: MAX_OUTPUT.name,
                value: "0".to_string(),
                expected: "a positive integer",
            });
        }

        let username = self.username.filter(|u| !u.is_empty());
        let password = self.password.filter(|p| !p.is_empty());
        if username.is_some() && password.is_none() {
            log::error!(
                "{} provided, but {} is missing. Please update account properties.",
                USERNAME.name,
                PASSWORD.name
            );
            return Err(ConfigError::MissingCredential {
                field: PASSWORD.name,
            });
        }

        Ok(Configuration {
            install_path: self.install_path,
            index: self.index,
            output_format: self.output_format,
            max_output: self.max_output,
            earliest: self.earliest.filter(|e| !e.is_empty()),
            latest: self.latest.filter(|l| !l.is_empty()),
            username,
            password,
            filter_mode: self.filter_mode,
        })
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> ConfigResult<&'a str> {
    match value {
        None => Err(ConfigError::Missing { field }),
        Some(v) if v.trim().is_empty() => Err(ConfigError::Blank { field }),
        Some(v) => Ok(v),
    }
}

fn optional(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
