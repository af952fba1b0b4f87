use thiserror::Error;

/// Why a request to the weather provider produced no usable payload.
///
/// None of these abort a refresh: the affected location keeps default values and the error
/// is reported to the user as a notice.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error: {status} - {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("JSON parsing failed: {0}")]
    Malformed(#[from] serde_json::Error),
}
