//! Extractor trait for pulling one unit of data from a source

use eyre::Result;

/// Extractor trait for extracting data from a source
///
/// One call to `extract` is one all-or-nothing extraction: implementors
/// return a single output value, never a partial stream.
///
/// # Example
/// ```no_run
/// use splunk_consumer::etl::Extractor;
/// use eyre::Result;
/// use std::path::PathBuf;
///
/// struct FileExtractor {
///     path: PathBuf,
/// }
///
/// impl Extractor for FileExtractor {
///     type Output = Vec<u8>;
///
///     async fn extract(&self) -> Result<Self::Output> {
///         Ok(std::fs::read(&self.path)?)
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// The type of value extracted
    type Output: Send;

    /// Extract from the source
    ///
    /// # Errors
    /// Returns an error if the source could not be reached at all. Failures
    /// the source itself reports may instead be encoded in `Output`.
    fn extract(&self) -> impl std::future::Future<Output = Result<Self::Output>> + Send;
}
