use serde::de::DeserializeOwned;

/// Failure to turn a success response body into the expected shape.
///
/// Never returned to callers; the executor logs it and retries.
#[derive(Debug, thiserror::Error)]
pub(crate) enum DecodeError {
    #[error("reading response body failed: {0}")]
    Body(reqwest::Error),
    #[error("invalid response JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads the whole body of `response` and parses it as JSON into `T`.
///
/// Consumes the response, so its body is released exactly once whichever way
/// this returns.
pub(crate) async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, DecodeError> {
    let bytes = response.bytes().await.map_err(DecodeError::Body)?;
    decode_json(&bytes)
}

/// Parses `bytes` as JSON into `T`.
pub(crate) fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(bytes).map_err(DecodeError::from)
}
