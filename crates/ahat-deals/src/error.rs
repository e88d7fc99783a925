use thiserror::Error;

/// Errors returned by the `SixSevenDeals` API client.
#[derive(Debug, Error)]
pub enum DealsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered `"success": false` with a message.
    #[error("SixSevenDeals API error: {0}")]
    ApiError(String),

    /// Non-2xx status without an API error message in the body.
    #[error("SixSevenDeals returned HTTP {0}")]
    Status(u16),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
