use reqwest::{Method, StatusCode, Url};

use crate::CentralError;

/// Service label attached to protocol errors.
pub(crate) const SERVICE_LABEL: &str = "Grove";

/// Converts a non-success status into a protocol error.
///
/// `Err` means the caller must stop and surface the error as-is; `Ok` means
/// the body may be decoded. The body is never inspected here.
pub(crate) fn check_status(
    method: &Method,
    url: &Url,
    status: StatusCode,
) -> Result<(), CentralError> {
    if status.is_success() {
        return Ok(());
    }

    Err(CentralError::Http {
        service: SERVICE_LABEL,
        status: status.as_u16(),
        method: method.clone(),
        url: url.to_string(),
    })
}
