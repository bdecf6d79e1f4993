//! libcurl-backed client for the camera's JSON API.
//!
//! Blocking: every call runs on the current thread. Call from
//! `spawn_blocking` (or a worker thread) when used from async code.

use curl::easy::{Easy, List};
use serde_json::{json, Value};
use std::cell::Cell;
use std::io::Write;
use std::str;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

use super::protocol::{self, is_session_expired};
use super::types::{ApiTime, DeviceInfo, SearchResult};
use super::{CameraClient, CameraError};
use crate::config::{ReoclipConfig, StreamType};
use crate::retry::TransportError;

/// Abort a download that stays below 1 KiB/s for this long.
const LOW_SPEED_TIME: Duration = Duration::from_secs(60);
const LOW_SPEED_LIMIT: u32 = 1024;

#[derive(Debug, Clone, Copy)]
struct Timeouts {
    connect: Duration,
    request: Duration,
    download: Duration,
}

/// Authenticated session with one camera.
///
/// The session token is obtained lazily on first use and renewed once when
/// the camera reports it expired.
pub struct ReolinkHttp {
    base: Url,
    username: String,
    password: String,
    channel: u8,
    stream: StreamType,
    timeouts: Timeouts,
    accept_invalid_certs: bool,
    token: Mutex<Option<String>>,
}

impl ReolinkHttp {
    /// Builds a client for the camera at `host` (IP or hostname). No request
    /// is made until `login` or the first search.
    pub fn new(
        host: &str,
        username: &str,
        password: &str,
        cfg: &ReoclipConfig,
    ) -> Result<Self, CameraError> {
        let base = api_url(host, cfg.use_https, cfg.port)?;
        Ok(Self {
            base,
            username: username.to_string(),
            password: password.to_string(),
            channel: cfg.channel,
            stream: cfg.stream,
            timeouts: Timeouts {
                connect: Duration::from_secs(cfg.connect_timeout_secs),
                request: Duration::from_secs(cfg.request_timeout_secs),
                download: Duration::from_secs(cfg.download_timeout_secs),
            },
            accept_invalid_certs: cfg.accept_invalid_certs,
            token: Mutex::new(None),
        })
    }

    /// API endpoint without query parameters.
    pub fn endpoint(&self) -> &Url {
        &self.base
    }

    /// Authenticates and stores the session token.
    pub fn login(&self) -> Result<(), CameraError> {
        let body = protocol::request_body(
            "Login",
            json!({"User": {"Version": "0", "userName": self.username, "password": self.password}}),
        )?;
        let reply = self.post(&self.command_url("Login", None), &body)?;
        let value = protocol::parse_reply("Login", &reply)?;
        let token = value
            .pointer("/Token/name")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| TransportError::Decode("login reply has no token".to_string()))?;
        *self.token_slot() = Some(token.to_string());
        tracing::debug!(endpoint = %self.base, "logged in");
        Ok(())
    }

    /// Ends the session. Best effort: failures are logged, not returned.
    pub fn logout(&self) {
        let Some(token) = self.token_slot().take() else {
            return;
        };
        if let Err(e) = self.call_once("Logout", json!({}), &token) {
            tracing::debug!("logout failed: {}", e);
        }
    }

    /// Device name, model and firmware, as reported by GetDevInfo.
    pub fn device_info(&self) -> Result<DeviceInfo, CameraError> {
        let value = self.call("GetDevInfo", json!({}))?;
        let info = value
            .get("DevInfo")
            .cloned()
            .ok_or_else(|| TransportError::Decode("GetDevInfo reply has no DevInfo".to_string()))?;
        serde_json::from_value(info).map_err(|e| TransportError::Decode(e.to_string()).into())
    }

    fn token_slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn current_token(&self) -> Result<String, CameraError> {
        if let Some(t) = self.token_slot().clone() {
            return Ok(t);
        }
        self.login()?;
        self.token_slot()
            .clone()
            .ok_or_else(|| CameraError::Auth("no session token after login".to_string()))
    }

    /// Runs `op` with a session token, logging in again once if the camera
    /// says the token expired.
    fn with_session<T>(
        &self,
        mut op: impl FnMut(&str) -> Result<T, CameraError>,
    ) -> Result<T, CameraError> {
        let token = self.current_token()?;
        match op(&token) {
            Err(e) if is_session_expired(&e) => {
                tracing::info!("camera session expired; logging in again");
                self.token_slot().take();
                let token = self.current_token()?;
                op(&token)
            }
            other => other,
        }
    }

    fn call(&self, cmd: &str, param: Value) -> Result<Value, CameraError> {
        self.with_session(|token| self.call_once(cmd, param.clone(), token))
    }

    fn call_once(&self, cmd: &str, param: Value, token: &str) -> Result<Value, CameraError> {
        let body = protocol::request_body(cmd, param)?;
        let reply = self.post(&self.command_url(cmd, Some(token)), &body)?;
        protocol::parse_reply(cmd, &reply)
    }

    fn command_url(&self, cmd: &str, token: Option<&str>) -> Url {
        let mut url = self.base.clone();
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("cmd", cmd);
            if let Some(t) = token {
                q.append_pair("token", t);
            }
        }
        url
    }

    fn easy(&self, url: &Url, timeout: Duration) -> Result<Easy, CameraError> {
        let mut easy = Easy::new();
        easy.url(url.as_str())?;
        easy.connect_timeout(self.timeouts.connect)?;
        easy.timeout(timeout)?;
        if self.accept_invalid_certs {
            easy.ssl_verify_peer(false)?;
            easy.ssl_verify_host(false)?;
        }
        Ok(easy)
    }

    fn post(&self, url: &Url, body: &[u8]) -> Result<Vec<u8>, CameraError> {
        let mut easy = self.easy(url, self.timeouts.request)?;
        easy.post(true)?;
        easy.post_fields_copy(body)?;
        let mut headers = List::new();
        headers.append("Content-Type: application/json")?;
        easy.http_headers(headers)?;

        let mut out = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                out.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }
        check_status(easy.response_code()?)?;
        Ok(out)
    }

    fn download_once(
        &self,
        clip_id: &str,
        token: &str,
        sink: &mut dyn Write,
    ) -> Result<u64, CameraError> {
        let mut url = self.command_url("Download", Some(token));
        url.query_pairs_mut()
            .append_pair("source", clip_id)
            .append_pair("output", output_name(clip_id));

        let mut easy = self.easy(&url, self.timeouts.download)?;
        easy.low_speed_limit(LOW_SPEED_LIMIT)?;
        easy.low_speed_time(LOW_SPEED_TIME)?;

        // The camera reports errors (bad token, unknown file) as a JSON body
        // with 200 OK; that body must never reach the clip sink.
        let is_json = Cell::new(false);
        let mut json_body = Vec::new();
        let mut written = 0u64;
        let mut sink_error: Option<std::io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|line| {
                if let Ok(s) = str::from_utf8(line) {
                    if let Some((name, value)) = s.split_once(':') {
                        if name.trim().eq_ignore_ascii_case("content-type") {
                            is_json.set(value.to_ascii_lowercase().contains("json"));
                        }
                    }
                }
                true
            })?;
            transfer.write_function(|data| {
                if is_json.get() {
                    json_body.extend_from_slice(data);
                    return Ok(data.len());
                }
                match sink.write_all(data) {
                    Ok(()) => {
                        written += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        sink_error = Some(e);
                        Ok(0) // abort transfer
                    }
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = sink_error {
            return Err(CameraError::Sink(e));
        }
        performed?;
        check_status(easy.response_code()?)?;

        if is_json.get() {
            protocol::parse_reply("Download", &json_body)?;
            return Err(TransportError::Decode(format!(
                "camera returned JSON instead of video for {}",
                clip_id
            ))
            .into());
        }
        Ok(written)
    }
}

impl CameraClient for ReolinkHttp {
    fn search(
        &self,
        start: chrono::NaiveDateTime,
        end: chrono::NaiveDateTime,
    ) -> Result<SearchResult, CameraError> {
        let param = json!({
            "Search": {
                "channel": self.channel,
                "onlyStatus": 0,
                "streamType": self.stream.as_str(),
                "StartTime": ApiTime::from_naive(start),
                "EndTime": ApiTime::from_naive(end),
            }
        });
        let value = self.call("Search", param)?;
        let result = value
            .get("SearchResult")
            .cloned()
            .ok_or_else(|| TransportError::Decode("Search reply has no SearchResult".to_string()))?;
        serde_json::from_value(result).map_err(|e| TransportError::Decode(e.to_string()).into())
    }

    fn download(&self, clip_id: &str, sink: &mut dyn Write) -> Result<u64, CameraError> {
        self.with_session(|token| self.download_once(clip_id, token, &mut *sink))
    }
}

impl Drop for ReolinkHttp {
    fn drop(&mut self) {
        self.logout();
    }
}

fn check_status(code: u32) -> Result<(), CameraError> {
    match code {
        200..=299 => Ok(()),
        401 | 403 => Err(CameraError::Auth(format!("HTTP {}", code))),
        _ => Err(TransportError::Http(code).into()),
    }
}

/// `output` parameter: the camera wants a bare file name.
fn output_name(clip_id: &str) -> &str {
    clip_id.rsplit('/').next().unwrap_or(clip_id)
}

/// `http[s]://host[:port]/cgi-bin/api.cgi`; bare IPv6 literals get brackets.
fn api_url(host: &str, use_https: bool, port: Option<u16>) -> Result<Url, CameraError> {
    let scheme = if use_https { "https" } else { "http" };
    let host = host.trim();
    if host.is_empty() {
        return Err(TransportError::InvalidEndpoint("empty camera address".to_string()).into());
    }
    let host = if host.contains(':') && !host.starts_with('[') {
        format!("[{}]", host)
    } else {
        host.to_string()
    };
    let mut url = Url::parse(&format!("{}://{}/cgi-bin/api.cgi", scheme, host))
        .map_err(|e| TransportError::InvalidEndpoint(format!("{}: {}", host, e)))?;
    if let Some(p) = port {
        url.set_port(Some(p))
            .map_err(|_| TransportError::InvalidEndpoint(format!("cannot set port {}", p)))?;
    }
    Ok(url)
}
