//! Generation errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    /// The endpoint rejected our credentials
    #[error("authorization failed: {0}")]
    Auth(String),

    #[error("no API token configured (set HUGGINGFACEHUB_API_TOKEN or generator.api_token)")]
    MissingToken,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("model returned an empty summary")]
    EmptySummary,

    #[error("model returned no usable subtopics")]
    NoUsableSubtopics,

    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("invalid generation parameters: {0}")]
    InvalidParameters(String),

    #[error("invalid endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),
}

impl GenerationError {
    /// Credential problems, so the caller can point the user at their token
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::MissingToken)
    }

    /// Classify a failed HTTP response.
    ///
    /// 401/403 are auth failures, and so is any body that talks about
    /// authorization (some gateways answer 400/500 with that text).
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 401 || status == 403 || body.to_lowercase().contains("authorization") {
            Self::Auth(format!("HTTP {status}: {body}"))
        } else {
            Self::Api { status, body }
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
