//! Classify HTTP status, curl errors, and camera API codes into retry kinds.

use super::error::TransportError;
use super::policy::ErrorKind;

/// Camera is busy serving other sessions or streams.
const RSP_CODE_BUSY: i64 = -12;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify a transport error into an ErrorKind.
pub fn classify(e: &TransportError) -> ErrorKind {
    match e {
        TransportError::Curl(ce) => classify_curl_error(ce),
        TransportError::Http(code) => classify_http_status(*code),
        TransportError::PartialTransfer { .. } => ErrorKind::Connection,
        TransportError::Api { rsp_code, .. } if *rsp_code == RSP_CODE_BUSY => ErrorKind::Throttled,
        TransportError::Api { .. }
        | TransportError::Decode(_)
        | TransportError::InvalidEndpoint(_) => ErrorKind::Other,
    }
}
