use crate::config::{PASSWORD, Secret};
use crate::error::{ConfigError, ConfigResult};

/// Credentials passed to the search tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// Use `-auth 'user:password'`
    Basic(String, Secret),
    /// Don't pass any credentials; the tool falls back to its own session
    None,
}

impl Auth {
    /// Resolve credentials from optional username and password
    ///
    /// A blank username means no authentication. A username without a
    /// non-empty password is a configuration error, never silently ignored.
    pub fn new(username: Option<&str>, password: Option<&Secret>) -> ConfigResult<Self> {
        match (username.filter(|u| !u.is_empty()), password) {
            (None, _) => Ok(Self::None),
            (Some(username), Some(password)) if !password.is_empty() => {
                Ok(Self::Basic(username.to_string(), password.clone()))
            }
            (Some(_), _) => {
                log::error!(
                    "Splunk user account provided, but password is missing. Please update account properties."
                );
                Err(ConfigError::MissingCredential {
                    field: PASSWORD.name,
                })
            }
        }
    }
}

impl std::fmt::Display for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic(_, _) => write!(f, "Basic"),
            Self::None => write!(f, "None"),
        }
    }
}
