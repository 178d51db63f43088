//! Connector configuration
//!
//! This module handles everything the host supplies before a schedule starts:
//! - Raw properties from YAML files and the environment
//! - Property descriptors (names, env vars, defaults, sensitivity)
//! - Validation into an immutable [`Configuration`]

mod properties;
mod settings;

pub use properties::{DESCRIPTORS, Properties, PropertyDescriptor, descriptor};
pub(crate) use properties::{EARLIEST, INDEX_NAME, LATEST, PASSWORD, USERNAME};
pub use settings::{Configuration, ConfigurationBuilder, FilterMode, OutputFormat, Secret};
