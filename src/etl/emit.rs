//! Emitter trait and the flow file it carries downstream

use eyre::Result;
use std::collections::BTreeMap;

/// Downstream route a flow file is sent on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    Success,
}

impl Relationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
        }
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of output: a body plus string attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowFile {
    relationship: Relationship,
    content: Vec<u8>,
    attributes: BTreeMap<String, String>,
}

impl FlowFile {
    /// A flow file routed to `success`
    pub fn success(content: Vec<u8>) -> Self {
        Self {
            relationship: Relationship::Success,
            content,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn relationship(&self) -> Relationship {
        self.relationship
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

/// Emitter trait for handing flow files to a destination
///
/// # Example
/// ```no_run
/// use splunk_consumer::etl::{Emitter, FlowFile};
/// use eyre::Result;
///
/// struct Discard;
///
/// impl Emitter for Discard {
///     async fn emit(&self, flowfile: FlowFile) -> Result<()> {
///         log::debug!("Dropping {} byte(s)", flowfile.size());
///         Ok(())
///     }
/// }
/// ```
pub trait Emitter: Send + Sync {
    /// Deliver one flow file
    ///
    /// # Errors
    /// Returns an error if the destination rejects or cannot store it
    fn emit(&self, flowfile: FlowFile) -> impl std::future::Future<Output = Result<()>> + Send;
}
