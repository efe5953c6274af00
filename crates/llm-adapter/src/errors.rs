use thiserror::Error;

use crate::providers::factory::Vendor;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AdapterError {
    /// A required credential or model identifier was not configured
    #[error("{vendor} configuration is missing required field `{field}`")]
    MissingConfig { vendor: Vendor, field: &'static str },

    /// The normalized request failed structural validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to fetch or convert image {url}: {source}")]
    ContentConversion {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{vendor} does not accept {kind} content")]
    UnsupportedContent { vendor: Vendor, kind: &'static str },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{vendor} request failed: {status} - {body}")]
    Api {
        vendor: Vendor,
        status: u16,
        body: String,
    },

    #[error("Malformed response from {vendor}: {reason}")]
    MalformedResponse { vendor: Vendor, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AdapterError {
    pub fn content_conversion<E>(url: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        AdapterError::ContentConversion {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn malformed(vendor: Vendor, reason: impl Into<String>) -> Self {
        AdapterError::MalformedResponse {
            vendor,
            reason: reason.into(),
        }
    }
}

pub type AdapterResult<T> = Result<T, AdapterError>;
