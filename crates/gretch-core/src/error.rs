//! Error types for the gretch library.
//!
//! This module provides a unified error type with explicit variants for
//! transport, decoding, record access, input validation, and storage
//! failures.

use thiserror::Error;

/// The unified error type for gretch operations.
///
/// Explicit variants allow callers to distinguish a network failure from
/// a malformed response or a misuse of the record model.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, HTTP status).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Response-body decoding errors.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Access to a required record field that is absent.
    #[error("{0}")]
    MissingField(#[from] MissingFieldError),

    /// Input validation errors (URL, change id).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Persistence failures from sink/store collaborators.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Store(StoreError::Io(err))
    }
}

/// Transport-level errors.
///
/// The core never retries these; they surface immediately at the point of
/// failure.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Any other transport failure.
    #[error("transport failure: {message}")]
    Other { message: String },
}

/// Errors decoding a response body. Fatal to the request that produced
/// them.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Body shorter than the fixed anti-XSSI prefix.
    #[error("response body too short for anti-XSSI prefix ({len} bytes)")]
    Truncated { len: usize },

    /// Body is not valid JSON once the prefix is stripped.
    #[error("invalid JSON in response body: {0}")]
    Json(#[from] serde_json::Error),

    /// Body decoded, but not into the shape the protocol requires.
    #[error("unexpected response shape: {reason}")]
    UnexpectedShape { reason: String },
}

/// A required field was absent from a record.
///
/// This is a usage error: callers that want optional semantics must use
/// the default-substituting accessors instead of the required ones.
#[derive(Debug, Error)]
#[error("missing required field '{field}'")]
pub struct MissingFieldError {
    /// Name of the absent field.
    pub field: String,
}

impl MissingFieldError {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid Gerrit base URL.
    #[error("invalid Gerrit URL '{value}': {reason}")]
    Url { value: String, reason: String },

    /// Invalid change identifier.
    #[error("invalid change id '{value}': {reason}")]
    ChangeId { value: String, reason: String },

    /// Generic invalid input.
    #[error("{message}")]
    Other { message: String },
}

/// Persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document could not be serialized or parsed back.
    #[error("malformed stored document: {reason}")]
    Corrupt { reason: String },
}

/// The fetch loop stopped early, but everything retrieved before the
/// failure was persisted.
///
/// This error is carried inside
/// [`FetchSummary`](crate::fetch::FetchSummary) and never raised past the
/// orchestrator: a failed fetch still leaves a valid, usable output, and
/// the count of records actually written is always reported.
#[derive(Debug, Error)]
#[error("fetch stopped after {fetched} records: {source}")]
pub struct PartialFetchError {
    /// Records handed to the sink before the failure.
    pub fetched: usize,

    /// The failure that ended the fetch loop.
    #[source]
    pub source: Box<Error>,
}
