//! Raw connector properties and their descriptors
//!
//! Properties can come from a YAML file, from the environment, or both.
//! Values stay as strings here; [`super::Configuration::from_properties`]
//! does the validation.
//!
//! Example `consumer.yml`:
//! ```yaml
//! install_path: /opt/splunk
//! index: main
//! output_format: json
//! max_output: 5000
//! earliest: -24h@h
//! username: exporter
//! password: changeme
//! ```

use super::{FilterMode, OutputFormat, Secret};

use eyre::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// Describes one configurable property of the connector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Human-readable name, used in validation errors
    pub name: &'static str,
    /// Key in the YAML properties file
    pub key: &'static str,
    /// Environment variable that overrides the file value
    pub env: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<&'static str>,
    pub allowed: &'static [&'static str],
    /// Sensitive values are masked in every diagnostic
    pub sensitive: bool,
}

const TIME_MODIFIER_HELP: &str = "Supports ISO8601 formatted as yyyy-mm-dd:HH:mm:ss, relative time, \
     and several application-specific modifiers (see Time Modifiers in the Splunk search docs)";

pub(crate) const INSTALL_PATH: PropertyDescriptor = PropertyDescriptor {
    name: "Splunk install path",
    key: "install_path",
    env: "SPLUNK_HOME",
    description: "Path to the directory where Splunk is installed",
    required: true,
    default: None,
    allowed: &[],
    sensitive: false,
};

pub(crate) const INDEX_NAME: PropertyDescriptor = PropertyDescriptor {
    name: "Splunk index name",
    key: "index",
    env: "SPLUNK_INDEX",
    description: "Name of the Splunk index, or bucket, from which records will be consumed",
    required: true,
    default: None,
    allowed: &[],
    sensitive: false,
};

pub(crate) const OUTPUT_FORMAT: PropertyDescriptor = PropertyDescriptor {
    name: "Data output format",
    key: "output_format",
    env: "SPLUNK_OUTPUT_FORMAT",
    description: "Format the data exported from Splunk will be converted into",
    required: true,
    default: Some("csv"),
    allowed: OutputFormat::ALLOWED,
    sensitive: false,
};

pub(crate) const MAX_OUTPUT: PropertyDescriptor = PropertyDescriptor {
    name: "Max records to output",
    key: "max_output",
    env: "SPLUNK_MAX_OUTPUT",
    description: "Maximum number of records to output from a bucket, newest first. \
                  Leave unset to output the entire bucket",
    required: false,
    default: None,
    allowed: &[],
    sensitive: false,
};

pub(crate) const EARLIEST: PropertyDescriptor = PropertyDescriptor {
    name: "Date Range Start",
    key: "earliest",
    env: "SPLUNK_EARLIEST",
    description: TIME_MODIFIER_HELP,
    required: false,
    default: None,
    allowed: &[],
    sensitive: false,
};

pub(crate) const LATEST: PropertyDescriptor = PropertyDescriptor {
    name: "Date Range End",
    key: "latest",
    env: "SPLUNK_LATEST",
    description: TIME_MODIFIER_HELP,
    required: false,
    default: None,
    allowed: &[],
    sensitive: false,
};

pub(crate) const USERNAME: PropertyDescriptor = PropertyDescriptor {
    name: "Splunk Username",
    key: "username",
    env: "SPLUNK_USERNAME",
    description: "Username of the account used to access and export data from Splunk",
    required: false,
    default: None,
    allowed: &[],
    sensitive: false,
};

pub(crate) const PASSWORD: PropertyDescriptor = PropertyDescriptor {
    name: "Splunk User Password",
    key: "password",
    env: "SPLUNK_PASSWORD",
    description: "Password for the account used to access and export data from Splunk",
    required: false,
    default: None,
    allowed: &[],
    sensitive: true,
};

pub(crate) const FILTER_MODE: PropertyDescriptor = PropertyDescriptor {
    name: "Filter mode",
    key: "filter_mode",
    env: "SPLUNK_FILTER_MODE",
    description: "How the index and date range combine: 'overwrite' lets the last bound \
                  replace the filter, 'conjunctive' keeps all conditions",
    required: false,
    default: Some("overwrite"),
    allowed: FilterMode::ALLOWED,
    sensitive: false,
};

/// Every property the connector understands, in display order
pub static DESCRIPTORS: [PropertyDescriptor; 9] = [
    INSTALL_PATH,
    INDEX_NAME,
    OUTPUT_FORMAT,
    MAX_OUTPUT,
    EARLIEST,
    LATEST,
    USERNAME,
    PASSWORD,
    FILTER_MODE,
];

/// Look up a descriptor by its YAML key
pub fn descriptor(key: &str) -> Option<&'static PropertyDescriptor> {
    DESCRIPTORS.iter().find(|d| d.key == key)
}

/// Raw, unvalidated property values as supplied by the host
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Properties {
    #[serde(default)]
    pub install_path: Option<String>,
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default)]
    pub output_format: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub max_output: Option<String>,
    #[serde(default)]
    pub earliest: Option<String>,
    #[serde(default)]
    pub latest: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<Secret>,
    #[serde(default)]
    pub filter_mode: Option<String>,
}

impl Properties {
    /// Read properties from a YAML file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read properties file: {}",
                path.as_ref().display()
            )
        })?;

        // An empty document deserializes to unit, not a map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let props: Self = serde_yaml::from_str(&content)
            .with_context(|| "Failed to parse properties YAML")?;

        Ok(props)
    }

    /// Collect properties from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Collect properties through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            install_path: lookup(INSTALL_PATH.env),
            index: lookup(INDEX_NAME.env),
            output_format: lookup(OUTPUT_FORMAT.env),
            max_output: lookup(MAX_OUTPUT.env),
            earliest: lookup(EARLIEST.env),
            latest: lookup(LATEST.env),
            username: lookup(USERNAME.env),
            password: lookup(PASSWORD.env).map(Secret::new),
            filter_mode: lookup(FILTER_MODE.env),
        }
    }

    /// Layer `other` on top of `self`; values present in `other` win
    pub fn overlay(self, other: Properties) -> Self {
        Self {
            install_path: other.install_path.or(self.install_path),
            index: other.index.or(self.index),
            output_format: other.output_format.or(self.output_format),
            max_output: other.max_output.or(self.max_output),
            earliest: other.earliest.or(self.earliest),
            latest: other.latest.or(self.latest),
            username: other.username.or(self.username),
            password: other.password.or(self.password),
            filter_mode: other.filter_mode.or(self.filter_mode),
        }
    }

    /// Render a commented YAML template listing every property
    pub fn template() -> String {
        let mut out = String::from("# Splunk consumer properties\n");
        for d in DESCRIPTORS.iter() {
            out.push('\n');
            out.push_str(&format!("# {} ({})\n", d.name, d.env));
            out.push_str(&format!("# {}\n", d.description));
            if !d.allowed.is_empty() {
                out.push_str(&format!("# Allowed values: {}\n", d.allowed.join(", ")));
            }
            if d.sensitive {
                out.push_str("# Sensitive: never logged\n");
            }
            match (d.required, d.default) {
                (_, Some(default)) => out.push_str(&format!("{}: {}\n", d.key, default)),
                (true, None) => out.push_str(&format!("{}: \n", d.key)),
                (false, None) => out.push_str(&format!("# {}: \n", d.key)),
            }
        }
        out
    }

    /// Write the YAML template to disk
    pub fn write_template(path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path.as_ref(), Self::template()).with_context(|| {
            format!(
                "Failed to write properties template: {}",
                path.as_ref().display()
            )
        })?;
        Ok(())
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    }))
}
