//! Search command construction
//!
//! Turns a [`Configuration`] into the single shell command line handed to
//! the `splunk` CLI:
//!
//! ```text
//! <install>/bin/splunk search "index=<filter>" -output <format>[ -maxout <n>][ -auth '<user>:<password>']
//! ```
//!
//! Values are interpolated as-is. Inputs containing shell metacharacters
//! are reported with a warning but not escaped, so the rendered command
//! stays byte-identical for every input.

use super::{Auth, SearchFilter};
use crate::config::{
    Configuration, EARLIEST, INDEX_NAME, LATEST, OutputFormat, Secret, USERNAME,
};
use crate::error::ConfigResult;

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Name of the search executable under `<install>/bin`
pub const TOOL: &str = "splunk";

static SHELL_META: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[;&|$`<>\\"'\n(){}*?!~]"#).expect("valid regex"));

/// One piece of the rendered command line
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    Credentials { username: String, password: Secret },
}

/// A fully built search command
///
/// The cleartext form is only available through [`SearchCommand::to_shell`];
/// `Display` and `Debug` mask the password.
#[derive(Clone, PartialEq, Eq)]
pub struct SearchCommand {
    tokens: Vec<Token>,
}

impl SearchCommand {
    /// Build the command for a configuration
    ///
    /// Pure: the same configuration always yields the same command.
    ///
    /// # Errors
    /// Returns [`crate::error::ConfigError::MissingCredential`] when a
    /// username is set without a password.
    pub fn from_config(config: &Configuration) -> ConfigResult<Self> {
        let mut builder = SearchCommandBuilder::new(config.install_path(), SearchFilter::from_config(config))
            .output(config.output_format())
            .credentials(config.username(), config.password());
        if let Some(max) = config.max_output() {
            builder = builder.max_out(max);
        }

        warn_on_shell_meta(INDEX_NAME.name, config.index());
        if let Some(earliest) = config.earliest() {
            warn_on_shell_meta(EARLIEST.name, earliest);
        }
        if let Some(latest) = config.latest() {
            warn_on_shell_meta(LATEST.name, latest);
        }
        if let Some(username) = config.username() {
            warn_on_shell_meta(USERNAME.name, username);
        }

        builder.build()
    }

    /// Render the exact command line, credentials included
    pub fn to_shell(&self) -> String {
        self.render(false)
    }

    /// Render the command line with the password masked
    pub fn redacted(&self) -> String {
        self.render(true)
    }

    /// The password embedded in this command, if any
    pub fn secret(&self) -> Option<&Secret> {
        self.tokens.iter().find_map(|t| match t {
            Token::Credentials { password, .. } => Some(password),
            Token::Text(_) => None,
        })
    }

    fn render(&self, redact: bool) -> String {
        self.tokens
            .iter()
            .map(|t| match t {
                Token::Text(text) => text.clone(),
                Token::Credentials { username, password } => {
                    let password = if redact {
                        Secret::MASK
                    } else {
                        password.expose()
                    };
                    format!("'{}:{}'", username, password)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for SearchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for SearchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SearchCommand").field(&self.redacted()).finish()
    }
}

/// Builder for [`SearchCommand`]
#[derive(Debug, Clone)]
pub struct SearchCommandBuilder {
    install_path: String,
    filter: SearchFilter,
    output: OutputFormat,
    max_out: Option<u64>,
    username: Option<String>,
    password: Option<Secret>,
}

impl SearchCommandBuilder {
    pub fn new(install_path: impl Into<String>, filter: SearchFilter) -> Self {
        Self {
            install_path: install_path.into(),
            filter,
            output: OutputFormat::default(),
            max_out: None,
            username: None,
            password: None,
        }
    }

    pub fn output(mut self, format: OutputFormat) -> Self {
        self.output = format;
        self
    }

    pub fn max_out(mut self, max: u64) -> Self {
        self.max_out = Some(max);
        self
    }

    pub fn credentials(mut self, username: Option<&str>, password: Option<&Secret>) -> Self {
        self.username = username.map(str::to_string);
        self.password = password.cloned();
        self
    }

    /// Assemble the command tokens
    ///
    /// # Errors
    /// Returns [`crate::error::ConfigError::MissingCredential`] if a
    /// non-empty username has no password. No command is produced.
    pub fn build(self) -> ConfigResult<SearchCommand> {
        let auth = Auth::new(self.username.as_deref(), self.password.as_ref())?;

        let install = self
            .install_path
            .strip_suffix('/')
            .unwrap_or(&self.install_path);

        let mut tokens = vec![
            Token::Text(format!("{}/bin/{}", install, TOOL)),
            Token::Text("search".to_string()),
            Token::Text(format!("\"index={}\"", self.filter)),
            Token::Text("-output".to_string()),
            Token::Text(self.output.as_str().to_string()),
        ];

        if let Some(max) = self.max_out {
            tokens.push(Token::Text("-maxout".to_string()));
            tokens.push(Token::Text(max.to_string()));
        }

        if let Auth::Basic(username, password) = auth {
            tokens.push(Token::Text("-auth".to_string()));
            tokens.push(Token::Credentials { username, password });
        }

        Ok(SearchCommand { tokens })
    }
}

fn warn_on_shell_meta(field: &str, value: &str) {
    if SHELL_META.is_match(value) {
        log::warn!(
            "Property '{}' contains shell metacharacters and is passed to the shell unescaped",
            field
        );
    }
}
