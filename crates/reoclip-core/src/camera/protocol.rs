//! Command envelope of the camera's `cgi-bin/api.cgi` endpoint.
//!
//! Requests are `[{"cmd", "action", "param"}]`; replies are arrays of
//! `{"cmd", "code", "value"}` on success or `{"cmd", "code", "error"}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CameraError;
use crate::retry::TransportError;

/// Session token missing or expired.
pub(crate) const RSP_NOT_LOGGED_IN: i64 = -6;
/// Wrong user name or password.
pub(crate) const RSP_LOGIN_FAILED: i64 = -7;

#[derive(Serialize)]
struct Command<'a> {
    cmd: &'a str,
    action: u8,
    param: Value,
}

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    cmd: String,
    code: i64,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    error: Option<ReplyError>,
}

#[derive(Debug, Deserialize)]
struct ReplyError {
    #[serde(rename = "rspCode", default)]
    rsp_code: i64,
    #[serde(default)]
    detail: String,
}

/// Some firmwares answer errors with a bare object instead of an array.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Reply>),
    One(Reply),
}

pub(crate) fn request_body(cmd: &str, param: Value) -> Result<Vec<u8>, TransportError> {
    serde_json::to_vec(&[Command {
        cmd,
        action: 0,
        param,
    }])
    .map_err(|e| TransportError::Decode(e.to_string()))
}

/// Extracts `value` of the reply to `cmd`, or maps the camera's error code.
pub(crate) fn parse_reply(cmd: &str, body: &[u8]) -> Result<Value, CameraError> {
    let replies = match serde_json::from_slice::<OneOrMany>(body) {
        Ok(OneOrMany::Many(v)) => v,
        Ok(OneOrMany::One(r)) => vec![r],
        Err(e) => return Err(TransportError::Decode(format!("{} reply: {}", cmd, e)).into()),
    };
    let reply = replies
        .into_iter()
        .find(|r| r.cmd.is_empty() || r.cmd == cmd)
        .ok_or_else(|| TransportError::Decode(format!("no reply for {}", cmd)))?;

    if reply.code == 0 {
        return reply
            .value
            .ok_or_else(|| TransportError::Decode(format!("{} reply has no value", cmd)).into());
    }

    let (rsp_code, detail) = reply
        .error
        .map(|e| (e.rsp_code, e.detail))
        .unwrap_or((reply.code, String::new()));
    if rsp_code == RSP_LOGIN_FAILED {
        return Err(CameraError::Auth(format!("{} (rspCode {})", detail, rsp_code)));
    }
    Err(TransportError::Api {
        cmd: cmd.to_string(),
        rsp_code,
        detail,
    }
    .into())
}

/// True when the call failed only because the session token is stale.
pub(crate) fn is_session_expired(e: &CameraError) -> bool {
    matches!(
        e,
        CameraError::Transport(TransportError::Api { rsp_code, .. }) if *rsp_code == RSP_NOT_LOGGED_IN
    )
}
