use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The stats endpoint answered with something other than 200, or never
    /// answered at all (`status` is `None` on timeouts and connection errors).
    #[error("remote fetch failed ({}): {url}", status_label(.status))]
    RemoteFetch { status: Option<u16>, url: String },

    #[error("malformed response: {message} (URL: {url})")]
    MalformedResponse { message: String, url: String },

    /// Only raised inside discovery, which degrades it to an empty catalog.
    #[error("failed to fetch page {url}: {message}")]
    PageFetch { message: String, url: String },

    #[error("object store error: {message}")]
    Store { message: String },

    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("schema mismatch in {key}: expected columns {expected:?}, found {found:?}")]
    SchemaMismatch {
        key: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("invalid table: {0}")]
    InvalidTable(String),

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "no response".to_string(),
    }
}

impl Error {
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn not_found(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn malformed(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
            url: url.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
